//! Schema definitions for the persisted `corvus.config.toml` file.
//!
//! This module provides:
//! - [`OutputFormat`], the rendering mode for model listings
//! - [`CorvusConfig`], a fully resolved configuration
//! - [`PartialConfig`], one configuration source before merging
//! - Serialization to/from the TOML file format

use serde::Serialize;

use crate::{Error, Result};

/// Output format for model listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned table for terminals (default)
    #[default]
    #[value(name = "Table")]
    Table,
    /// JSON array, machine-readable
    #[value(name = "JSON")]
    Json,
}

impl OutputFormat {
    /// Parse from the persisted/environment spelling.
    ///
    /// Matching is exact (`"Table"` or `"JSON"`); anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Table" => Some(OutputFormat::Table),
            "JSON" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    /// Convert to the persisted spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "Table",
            OutputFormat::Json => "JSON",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fully resolved configuration for one command invocation.
///
/// # TOML Schema
///
/// ```toml
/// api_key = "sk-xxxxxxxx"     # optional
/// output_format = "Table"     # or "JSON"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorvusConfig {
    /// API key for the remote registry. `None` means local-only.
    pub api_key: Option<String>,

    /// Rendering mode for model listings.
    pub output_format: OutputFormat,
}

impl CorvusConfig {
    /// Return this config with the API key replaced.
    pub fn set_api_key(self, api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..self
        }
    }

    /// Return this config with the output format replaced.
    pub fn set_format(self, output_format: OutputFormat) -> Self {
        Self {
            output_format,
            ..self
        }
    }

    /// Serialize to the TOML file format. Unset fields are omitted.
    pub fn to_toml(&self) -> Result<String> {
        let file = ConfigFile {
            api_key: self.api_key.as_deref(),
            output_format: Some(self.output_format.as_str()),
        };
        Ok(toml::to_string(&file)?)
    }
}

/// On-disk representation written by [`CorvusConfig::to_toml`].
#[derive(Serialize)]
struct ConfigFile<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_format: Option<&'static str>,
}

/// One configuration source (defaults, file, or environment) before merging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConfig {
    /// API key, if this source supplies one
    pub api_key: Option<String>,

    /// Output format, if this source supplies a recognised one
    pub output_format: Option<OutputFormat>,
}

impl PartialConfig {
    /// Create an empty source with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in defaults: table output, no API key.
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            output_format: Some(OutputFormat::Table),
        }
    }

    /// Parse a source from TOML text.
    ///
    /// Missing keys, keys of the wrong type and unrecognised output formats
    /// all leave the corresponding field unset. Only text that is not TOML at
    /// all is an error.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let table: toml::Table = content.parse()?;

        let api_key = table
            .get("api_key")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let output_format = table
            .get("output_format")
            .and_then(|v| v.as_str())
            .and_then(OutputFormat::parse);

        Ok(Self {
            api_key,
            output_format,
        })
    }

    /// Layer `other` on top of this source.
    ///
    /// Fields set in `other` win; unset fields in `other` never overwrite.
    /// An absent source (`None`) contributes nothing.
    pub fn combine(self, other: Option<PartialConfig>) -> Self {
        let Some(other) = other else {
            return self;
        };
        Self {
            api_key: other.api_key.or(self.api_key),
            output_format: other.output_format.or(self.output_format),
        }
    }

    /// Finalize into a [`CorvusConfig`].
    ///
    /// Fails if no source supplied an output format.
    pub fn build(self) -> Result<CorvusConfig> {
        let output_format = self.output_format.ok_or_else(|| {
            Error::Config("output format was not provided by any config source".to_string())
        })?;
        Ok(CorvusConfig {
            api_key: self.api_key,
            output_format,
        })
    }
}
