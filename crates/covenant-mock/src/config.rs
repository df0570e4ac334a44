//! Configuration for the mock service.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Mock service configuration.
///
/// `port` 0 asks the OS for a free port, which is the right default for
/// test runs that start many services concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    /// Fail on object members and array elements the contract does not
    /// declare. Off by default: bodies match with permissive superset
    /// semantics.
    #[serde(default)]
    pub strict: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 0,
            strict: false,
        }
    }
}

impl MockConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config from {}", path.display()))
    }
}
