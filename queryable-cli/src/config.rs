//! TOML policy file.
//!
//! ```toml
//! [fields]
//! allow = ["name", "age", "created_at"]   # or allow = "*"
//! hidden = ["password"]
//!
//! [limits]
//! max_fragments = 50
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use queryable::{AllowedFieldSet, Limits};
use serde::Deserialize;

/// Field policy and limits loaded from disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Allowed and hidden fields.
    pub fields: AllowedFieldSet,
    /// Parsing limits; the environment defaults apply when absent.
    pub limits: Option<Limits>,
}

impl Config {
    /// Read and parse a policy file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read policy file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid policy file {}", path.display()))
    }

    /// Parse policy TOML.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse TOML")
    }

    /// Limits to parse with.
    pub fn limits(&self) -> Limits {
        self.limits.unwrap_or_else(Limits::from_env)
    }
}
