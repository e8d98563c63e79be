//! Environment lookup used by configuration resolution.
//!
//! Resolution never reads `std::env` directly; it goes through [`Env`] so
//! tests can supply an in-memory environment instead of mutating the process.

use std::collections::HashMap;

/// Source of environment variables.
pub trait Env {
    /// Look up a variable exactly as set, including empty values.
    fn raw_var(&self, key: &str) -> Option<String>;

    /// Look up a variable. Empty values are reported as unset.
    fn var(&self, key: &str) -> Option<String> {
        self.raw_var(key).filter(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn raw_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Env for HashMap<String, String> {
    fn raw_var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
