//! Precedence resolution and persistence for the Corvus configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Environment (`CORVUS_API_KEY`, `CORVUS_OUPUT_FORMAT`), only when
//!    `CORVUS_API_KEY` is set
//! 2. Config file (`$CORVUS_CONFIG_FILE` or `~/.shareableai/corvus.config.toml`)
//! 3. Built-in defaults
//!
//! Merging is field-wise: a field set by a higher source replaces the lower
//! value, an unset field leaves it alone.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::env::{Env, ProcessEnv};
use crate::config::schema::{CorvusConfig, OutputFormat, PartialConfig};
use crate::{Error, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_FILE_ENV: &str = "CORVUS_CONFIG_FILE";

/// Environment variable supplying the API key.
pub const API_KEY_ENV: &str = "CORVUS_API_KEY";

/// Environment variable supplying the output format.
pub const OUTPUT_FORMAT_ENV: &str = "CORVUS_OUPUT_FORMAT";

/// Required permissions for the config file (Unix: 0600, owner read/write only).
#[cfg(unix)]
pub const CONFIG_FILE_MODE: u32 = 0o600;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from the config file
    File(PathBuf),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File(path) => write!(f, "file:{}", path.display()),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// API key, if any source supplied one
    pub api_key: Option<Resolved<String>>,
    /// Output format
    pub output_format: Resolved<OutputFormat>,
    /// Location of the persisted config file
    pub config_path: PathBuf,
}

impl ResolvedConfig {
    /// The plain config value used by commands.
    pub fn config(&self) -> CorvusConfig {
        CorvusConfig {
            api_key: self.api_key.as_ref().map(|r| r.value.clone()),
            output_format: self.output_format.value,
        }
    }

    /// Get the masked API key for display purposes.
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|r| mask_api_key(&r.value))
    }
}

/// Mask an API key down to its first three characters.
pub fn mask_api_key(key: &str) -> String {
    let prefix: String = key.chars().take(3).collect();
    format!("{}...", prefix)
}

/// Locate the config file, creating its parent directory if needed.
///
/// Uses `CORVUS_CONFIG_FILE` when set, otherwise
/// `~/.shareableai/corvus.config.toml`.
pub fn config_location(env: &impl Env) -> Result<PathBuf> {
    let location = match env.var(CONFIG_FILE_ENV) {
        Some(path) => PathBuf::from(path),
        None => dirs::home_dir()
            .ok_or(Error::HomeDirUnavailable)?
            .join(".shareableai")
            .join("corvus.config.toml"),
    };

    if let Some(parent) = location.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    Ok(location)
}

/// Read the file source. A missing file contributes nothing.
pub fn read_file_source(path: &Path) -> Result<Option<PartialConfig>> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let partial = PartialConfig::from_toml_str(&content).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;
    debug!(
        path = %path.display(),
        output_format = ?partial.output_format,
        has_api_key = partial.api_key.is_some(),
        "read config file"
    );
    Ok(Some(partial))
}

/// Read the environment source.
///
/// The source only applies when `CORVUS_API_KEY` is present, even if empty;
/// without it, `CORVUS_OUPUT_FORMAT` is ignored as well.
pub fn read_env_source(env: &impl Env) -> Option<PartialConfig> {
    let api_key = env.raw_var(API_KEY_ENV)?;
    let output_format = env
        .var(OUTPUT_FORMAT_ENV)
        .and_then(|s| OutputFormat::parse(&s));
    debug!(?output_format, "environment config applies");
    Some(PartialConfig {
        api_key: Some(api_key),
        output_format,
    })
}

/// Resolve configuration from the process environment and config file.
pub fn resolve_config() -> Result<ResolvedConfig> {
    resolve_config_with_env(&ProcessEnv)
}

/// Resolve configuration from the given environment.
///
/// Merges defaults, the config file and the environment in that order and
/// finalizes the result.
pub fn resolve_config_with_env(env: &impl Env) -> Result<ResolvedConfig> {
    let config_path = config_location(env)?;

    let layers = [
        Some((ValueSource::Default, PartialConfig::defaults())),
        read_file_source(&config_path)?.map(|p| (ValueSource::File(config_path.clone()), p)),
        read_env_source(env).map(|p| (ValueSource::EnvVar(API_KEY_ENV.to_string()), p)),
    ];

    resolve_layers(layers.into_iter().flatten(), config_path)
}

/// Merge ordered layers (lowest precedence first) and finalize.
fn resolve_layers(
    layers: impl IntoIterator<Item = (ValueSource, PartialConfig)>,
    config_path: PathBuf,
) -> Result<ResolvedConfig> {
    let mut merged = PartialConfig::new();
    let mut api_key_source = None;
    let mut format_source = ValueSource::Default;

    for (source, layer) in layers {
        if layer.api_key.is_some() {
            api_key_source = Some(source.clone());
        }
        if layer.output_format.is_some() {
            format_source = match &source {
                ValueSource::EnvVar(_) => ValueSource::EnvVar(OUTPUT_FORMAT_ENV.to_string()),
                other => other.clone(),
            };
        }
        merged = merged.combine(Some(layer));
    }

    let config = merged.build()?;
    let api_key = config
        .api_key
        .zip(api_key_source)
        .map(|(key, source)| Resolved::new(key, source));

    Ok(ResolvedConfig {
        api_key,
        output_format: Resolved::new(config.output_format, format_source),
        config_path,
    })
}

/// Write a config to `path`, replacing any existing content.
pub fn write_config_file(path: &Path, config: &CorvusConfig) -> Result<()> {
    let content = config.to_toml()?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(CONFIG_FILE_MODE);
    }

    let mut file = options.open(path)?;
    file.write_all(content.as_bytes())?;

    // mode() only applies on creation; tighten files that already existed.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(CONFIG_FILE_MODE))?;
    }

    debug!(path = %path.display(), "wrote config file");
    Ok(())
}

impl CorvusConfig {
    /// Load the configuration for this invocation.
    pub fn load() -> Result<Self> {
        Self::load_with_env(&ProcessEnv)
    }

    /// Load the configuration using the given environment.
    pub fn load_with_env(env: &impl Env) -> Result<Self> {
        Ok(resolve_config_with_env(env)?.config())
    }

    /// Persist this config to the location given by `env`.
    pub fn write_with_env(&self, env: &impl Env) -> Result<PathBuf> {
        let path = config_location(env)?;
        write_config_file(&path, self)?;
        Ok(path)
    }
}
