//! Corvus - search and explore machine-learning model artefacts.
//!
//! This library provides the core functionality for the `corvus` CLI tool:
//! layered configuration, the search capability over local and remote
//! artefact registries, and table/JSON rendering of search results.

pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
pub mod search;

use std::path::PathBuf;

/// Library-level error type for Corvus operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Could not parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Could not serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Configuration could not be resolved into a complete value.
    #[error("Config error: {0}")]
    Config(String),

    #[error("Could not determine home directory")]
    HomeDirUnavailable,

    #[error("No local artefact registry found at {}", .0.display())]
    RegistryNotFound(PathBuf),

    #[error("Remote registry request failed: {0}")]
    Http(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),
}

/// Result type alias for Corvus operations.
pub type Result<T> = std::result::Result<T, Error>;
