//! Common test utilities for corvus integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's `~/.shareableai/` directory or local artefact registry.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use corvus::search::local::MODELS_TABLE_SCHEMA;
use rusqlite::{Connection, params};
pub use tempfile::TempDir;

/// A model row to seed into a test registry.
pub struct SeedModel<'a> {
    pub name: &'a str,
    pub short_id: &'a str,
    pub size: i64,
    pub created: i64,
    pub branch: &'a str,
    pub sha: &'a str,
    pub repo: Option<(&'a str, &'a str)>,
    pub parent: Option<&'a str>,
}

/// A test environment with an isolated home directory.
///
/// The `corvus()` method returns a `Command` with `HOME` pointed at a temp
/// directory and every `CORVUS_*` variable cleared, making tests
/// parallel-safe.
pub struct TestEnv {
    pub home_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an empty home directory.
    pub fn new() -> Self {
        Self {
            home_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the corvus binary with isolated environment.
    pub fn corvus(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_corvus"));
        cmd.current_dir(self.home_dir.path());
        cmd.env("HOME", self.home_dir.path());
        for var in [
            "CORVUS_CONFIG_FILE",
            "CORVUS_API_KEY",
            "CORVUS_OUPUT_FORMAT",
            "CORVUS_REGISTRY_PATH",
            "CORVUS_REMOTE_URL",
            "CORVUS_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Get the isolated home directory.
    pub fn home(&self) -> &Path {
        self.home_dir.path()
    }

    /// Default config file location under the isolated home.
    pub fn default_config_path(&self) -> PathBuf {
        self.home().join(".shareableai").join("corvus.config.toml")
    }

    /// Default local registry location under the isolated home.
    pub fn default_registry_path(&self) -> PathBuf {
        self.home().join(".artefact_registry.sqlite")
    }

    /// Write raw content to the default config file.
    pub fn write_config(&self, content: &str) {
        let path = self.default_config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// Create the default local registry containing `models`.
    pub fn seed_registry(&self, models: &[SeedModel<'_>]) {
        let conn = Connection::open(self.default_registry_path()).unwrap();
        conn.execute_batch(MODELS_TABLE_SCHEMA).unwrap();
        for m in models {
            conn.execute(
                "INSERT INTO models VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    m.name,
                    m.short_id,
                    m.size,
                    m.created,
                    m.branch,
                    m.sha,
                    m.repo.map(|r| r.0),
                    m.repo.map(|r| r.1),
                    m.parent,
                ],
            )
            .unwrap();
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
