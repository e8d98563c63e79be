//! Command implementations for the Corvus CLI.
//!
//! Each command receives the configuration resolved once by the caller and
//! returns a typed result that can be rendered for humans or as JSON:
//! - `set_format` / `set_api_key` - update and persist the config file
//! - `list` - search an artefact registry
//! - `show_config` - report the resolved configuration

use std::path::PathBuf;

use inquire::{Password, PasswordDisplayMode};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{CorvusConfig, Env, OutputFormat, ResolvedConfig, mask_api_key};
use crate::output;
use crate::search::{ANY_REPOSITORY, ArtefactEndpoint, ModelSearchResult, SearchQuery, Searcher};
use crate::{Error, Result};

/// Guidance shown when `list --remote` runs without an API key.
pub const MISSING_API_KEY_MESSAGE: &str =
    "API Key has not been set - please set via `corvus set api_key`";

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

// ============================================================================
// set format / set api_key
// ============================================================================

/// Result of `corvus set format`.
#[derive(Debug, Clone)]
pub struct FormatSaved {
    pub output_format: String,
    pub config_path: PathBuf,
}

impl FormatSaved {
    /// Confirmation line printed after saving.
    pub fn to_human(&self) -> String {
        format!("Output format set to {}", self.output_format)
    }
}

/// Persist a new output format on top of the resolved config.
pub fn set_format(
    config: CorvusConfig,
    output_format: OutputFormat,
    env: &impl Env,
) -> Result<FormatSaved> {
    let config_path = config.set_format(output_format).write_with_env(env)?;
    info!(%output_format, path = %config_path.display(), "saved output format");
    Ok(FormatSaved {
        output_format: output_format.to_string(),
        config_path,
    })
}

/// Result of `corvus set api_key`.
#[derive(Debug, Clone)]
pub struct ApiKeySaved {
    /// Masked key, present only when the key is long enough to mask
    pub api_key: Option<String>,
    pub config_path: PathBuf,
}

impl ApiKeySaved {
    /// Confirmation line printed after saving.
    pub fn to_human(&self) -> String {
        match self.api_key {
            Some(ref masked) => format!("API Key ({}) saved in config", masked),
            None => "API Key saved in config".to_string(),
        }
    }
}

/// Persist a new API key on top of the resolved config.
pub fn set_api_key(config: CorvusConfig, api_key: &str, env: &impl Env) -> Result<ApiKeySaved> {
    let config_path = config.set_api_key(api_key).write_with_env(env)?;
    info!(path = %config_path.display(), "saved API key");
    // Keys of two characters or fewer would be fully revealed by the prefix.
    let masked = (api_key.chars().count() > 2).then(|| mask_api_key(api_key));
    Ok(ApiKeySaved {
        api_key: masked,
        config_path,
    })
}

/// Ask for an API key without echoing it.
pub fn prompt_api_key() -> Result<String> {
    Password::new("API Key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .map_err(|e| Error::Prompt(e.to_string()))
}

// ============================================================================
// list
// ============================================================================

/// Options for `corvus list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    /// Search the remote registry instead of the local one
    pub remote: bool,
    /// Include child artefacts
    pub all: bool,
    /// Repository name filter
    pub repo: Option<String>,
    /// Branch name filter
    pub branch: Option<String>,
}

/// Models found by `corvus list`, rendered in the configured format.
#[derive(Debug, Clone)]
pub struct ModelListing {
    pub models: Vec<ModelSearchResult>,
    pub output_format: OutputFormat,
}

impl ModelListing {
    /// Render in the configured output format.
    pub fn render(&self) -> Result<String> {
        output::render(&self.models, self.output_format, true)
    }
}

/// Outcome of `corvus list`.
#[derive(Debug, Clone)]
pub enum ListOutcome {
    /// The search ran
    Models(ModelListing),
    /// `--remote` was requested without an API key; nothing was searched
    MissingApiKey,
}

/// Build the search query for the given list options.
///
/// A branch without a repository searches every repository.
pub fn build_query(args: &ListArgs) -> SearchQuery {
    let mut query = SearchQuery::new();
    if args.repo.is_some() || args.branch.is_some() {
        let repository = args
            .repo
            .clone()
            .unwrap_or_else(|| ANY_REPOSITORY.to_string());
        query = query.with_repository(repository, args.branch.clone());
    }
    if args.all {
        query = query.with_children();
    }
    query
}

/// List models from the local or remote registry.
///
/// `open` binds the chosen endpoint to a searcher; it is not called when the
/// remote registry is requested without an API key.
pub fn list<F>(config: &CorvusConfig, args: &ListArgs, env: &impl Env, open: F) -> Result<ListOutcome>
where
    F: FnOnce(&ArtefactEndpoint) -> Result<Box<dyn Searcher>>,
{
    let endpoint = if args.remote {
        match config.api_key {
            Some(ref api_key) => ArtefactEndpoint::remote(api_key.as_str(), env),
            None => return Ok(ListOutcome::MissingApiKey),
        }
    } else {
        ArtefactEndpoint::local(env)?
    };
    debug!(?endpoint, "selected endpoint");

    let searcher = open(&endpoint)?;
    let query = build_query(args);
    let models = searcher.models(&query)?;
    info!(count = models.len(), "listed models");

    Ok(ListOutcome::Models(ModelListing {
        models,
        output_format: config.output_format,
    }))
}

// ============================================================================
// show
// ============================================================================

/// Resolved configuration as reported by `corvus show`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    pub output_format: String,
    pub output_format_source: String,
    pub api_key: Option<String>,
    pub api_key_source: Option<String>,
    pub config_path: PathBuf,
}

impl Output for ConfigReport {
    fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Config file:   {}", self.config_path.display()),
            format!(
                "Output format: {} ({})",
                self.output_format, self.output_format_source
            ),
        ];
        match (&self.api_key, &self.api_key_source) {
            (Some(key), Some(source)) => lines.push(format!("API Key:       {} ({})", key, source)),
            _ => lines.push("API Key:       not set".to_string()),
        }
        lines.join("\n")
    }
}

impl ConfigReport {
    /// Render in the given output format.
    pub fn render(&self, output_format: OutputFormat) -> String {
        match output_format {
            OutputFormat::Table => self.to_human(),
            OutputFormat::Json => self.to_json(),
        }
    }
}

/// Describe the resolved configuration. The API key is masked.
pub fn show_config(resolved: &ResolvedConfig) -> ConfigReport {
    ConfigReport {
        output_format: resolved.output_format.value.to_string(),
        output_format_source: resolved.output_format.source.to_string(),
        api_key: resolved.masked_api_key(),
        api_key_source: resolved.api_key.as_ref().map(|r| r.source.to_string()),
        config_path: resolved.config_path.clone(),
    }
}
