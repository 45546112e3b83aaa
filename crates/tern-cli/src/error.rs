//! Error handling for the tern CLI.
//!
//! Library errors convert into [`CliError`] through `#[from]`. Messages that
//! users can act on carry a `Hint:` line. `main` turns the final error into a
//! miette report.

mod miette;

use std::path::PathBuf;

use thiserror::Error;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading, parsing or validating configuration failed
    #[error("Configuration error: {0}")]
    Config(#[from] tern::ConfigError),

    /// The compiler or a plugin failed
    #[error("Build error: {0}")]
    Build(#[from] tern::CoreError),

    /// Writing an emitted asset failed
    #[error("Failed to write asset {}: {message}\n\nHint: Check output directory permissions or pass a different --out-dir", .path.display())]
    AssetWrite { path: PathBuf, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a `Hint:` line to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            CliError::Config(tern::ConfigError::Io(io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn config_errors_are_wrapped() {
        let err: CliError = tern::ConfigError::NoEntries.into();
        assert_eq!(err.to_string(), "Configuration error: no entries specified");
    }

    #[test]
    fn asset_write_error_has_hint() {
        let err = CliError::AssetWrite {
            path: PathBuf::from("dist/index.html"),
            message: "permission denied".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("dist/index.html"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn with_path_maps_not_found() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let err = result.with_path("tern.toml").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(path) if path == PathBuf::from("tern.toml")));

        let result: std::result::Result<(), tern::ConfigError> = Err(tern::ConfigError::Io(
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        ));
        assert!(matches!(
            result.with_path("tern.toml").unwrap_err(),
            CliError::FileNotFound(_)
        ));
    }

    #[test]
    fn with_path_keeps_other_errors() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(matches!(result.with_path("x").unwrap_err(), CliError::Io(_)));
    }

    #[test]
    fn with_hint_and_context() {
        let result: Result<()> = Err(CliError::Custom("bad".into()));
        let msg = result.with_hint("try again").unwrap_err().to_string();
        assert_eq!(msg, "bad\n\nHint: try again");

        let result: Result<()> = Err(CliError::Custom("bad".into()));
        let msg = result.context("loading").unwrap_err().to_string();
        assert_eq!(msg, "loading: bad");
    }
}
