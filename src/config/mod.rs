//! Configuration for Corvus.
//!
//! Settings live in a single TOML file at `~/.shareableai/corvus.config.toml`
//! (or `$CORVUS_CONFIG_FILE`):
//!
//! - `api_key` - API key for the remote registry (secret, file is 0600)
//! - `output_format` - `"Table"` or `"JSON"`
//!
//! ## Precedence
//!
//! env (gated on `CORVUS_API_KEY`) > config file > defaults
//!
//! Use the [`resolver`] module for precedence resolution and persistence.

pub mod env;
pub mod resolver;
pub mod schema;

pub use env::{Env, ProcessEnv};
pub use resolver::{
    API_KEY_ENV, CONFIG_FILE_ENV, OUTPUT_FORMAT_ENV, Resolved, ResolvedConfig, ValueSource,
    config_location, mask_api_key, resolve_config, resolve_config_with_env,
};
#[cfg(unix)]
pub use resolver::CONFIG_FILE_MODE;
pub use schema::{CorvusConfig, OutputFormat, PartialConfig};
