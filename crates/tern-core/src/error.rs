use tern_config::ConfigError;
use tern_graph::GraphError;
use thiserror::Error;

use crate::fs::FsError;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Error type plugins and hook taps can return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("{hook} tap `{tap}` failed: {message}")]
    Hook {
        hook: &'static str,
        tap: String,
        message: String,
    },

    #[error("plugin `{plugin}` failed: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: BoxError,
    },

    #[error("unknown plugin `{0}`")]
    UnknownPlugin(String),

    #[error("asset `{0}` was emitted twice with different content")]
    AssetConflict(String),

    #[error("invalid compiler options: {0}")]
    InvalidOptions(String),
}

impl CoreError {
    pub fn plugin(plugin: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            source: source.into(),
        }
    }
}
