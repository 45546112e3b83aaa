//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Discovery and parsing
    #[error("no tern configuration found in {}", root.display())]
    NotFound { root: PathBuf },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid config value for `{field}`{}", fmt_hint(.hint))]
    InvalidValue { field: String, hint: Option<String> },

    #[error("invalid environment override: {message}")]
    Environment { message: String },

    // Profiles
    #[error("unknown profile `{name}` (available: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("invalid profile override: {message}")]
    InvalidProfileOverride { message: String },

    // Schema validation (no filesystem access)
    #[error("no entries specified")]
    NoEntries,

    #[error("{message}{}", fmt_hint(.hint))]
    SchemaValidation {
        message: String,
        hint: Option<String>,
    },

    // Filesystem validation
    #[error("entry `{name}` not found: {}", path.display())]
    EntryNotFound { name: String, path: PathBuf },

    #[error("html template not found: {}", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_hint(hint: &Option<String>) -> String {
    hint.as_ref().map(|h| format!(" ({h})")).unwrap_or_default()
}

impl ConfigError {
    pub(crate) fn schema(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::SchemaValidation {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}
