//! Configuration loaded from an optional `doc-excerpt.toml`.
//!
//! ```toml
//! [index]
//! test_suffixes = ["_test.rs", "tests.rs"]
//! example_prefix = "example"
//!
//! [render]
//! fence_language = "rust"
//! indent = "    "
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{DocError, Result};

/// Name of the config file looked up in the scanned directory
pub const CONFIG_FILENAME: &str = "doc-excerpt.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub render: RenderConfig,
}

/// Controls which files and functions are treated as examples
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// File name endings that mark a file as test-designated
    pub test_suffixes: Vec<String>,
    /// Function name prefix of example functions (`example`, `example_foo`)
    pub example_prefix: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            test_suffixes: vec!["_test.rs".to_string(), "tests.rs".to_string()],
            example_prefix: "example".to_string(),
        }
    }
}

impl IndexConfig {
    pub fn is_test_file(&self, file_name: &str) -> bool {
        self.test_suffixes
            .iter()
            .any(|suffix| file_name.ends_with(suffix.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Info string of the fenced block produced by annotated rendering
    pub fence_language: String,
    /// One indentation unit, removed from annotated example bodies
    pub indent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fence_language: "rust".to_string(),
            indent: "    ".to_string(),
        }
    }
}

impl Config {
    /// Parse a config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DocError::Config(e.to_string()))
    }

    /// Load an explicit config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DocError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Load `doc-excerpt.toml` from `dir`, or defaults when it is absent
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILENAME);
        if path.is_file() {
            tracing::debug!("Loading config from {}", path.display());
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}
