//! The contract document: all interactions a consumer declares against one
//! provider, in the V2 persisted format, with file read/write helpers.

use crate::interaction::Interaction;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Errors from reading or writing a contract document.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("failed to read contract from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write contract to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("contract document is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A party to the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacticipant {
    pub name: String,
}

impl Pacticipant {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

fn metadata() -> Value {
    serde_json::json!({
        "pactSpecification": { "version": "2.0" }
    })
}

/// The consumer-driven contract: every interaction the consumer expects of
/// the provider, plus document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub consumer: Pacticipant,
    pub provider: Pacticipant,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    #[serde(default = "metadata")]
    pub metadata: Value,
}

impl Contract {
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: Pacticipant::new(consumer),
            provider: Pacticipant::new(provider),
            interactions: Vec::new(),
            metadata: metadata(),
        }
    }

    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interactions.push(interaction);
        self
    }

    pub fn add_interaction(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    /// The conventional file name, `<consumer>-<provider>.json`.
    pub fn file_name(&self) -> String {
        format!("{}-{}.json", self.consumer.name, self.provider.name)
    }

    pub fn from_json(text: &str) -> Result<Self, ContractError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ContractError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a contract document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ContractError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Write the document under `dir` using the conventional file name,
    /// creating the directory if needed. Returns the written path.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ContractError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| ContractError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(self.file_name());
        let text = self.to_json()?;
        fs::write(&path, text).map_err(|source| ContractError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "wrote contract document");
        Ok(path)
    }
}
