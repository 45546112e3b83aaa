//! Pluggable config validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation.

use std::path::{Path, PathBuf};

use crate::config::TernConfig;
use crate::error::{ConfigError, Result};

pub trait ConfigValidator {
    fn validate(&self, config: &TernConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use tern_config::{ConfigValidator, SchemaValidator, TernConfig};
///
/// let mut config = TernConfig::default();
/// config.entry.insert("main".into(), "./src/index.js".into());
///
/// SchemaValidator.validate(&config).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &TernConfig) -> Result<()> {
        if config.entry.is_empty() {
            return Err(ConfigError::NoEntries);
        }

        for (name, path) in &config.entry {
            if name.trim().is_empty() {
                return Err(ConfigError::schema(
                    "entry names cannot be empty",
                    "give every entry a name, e.g. `main`",
                ));
            }
            if path.trim().is_empty() {
                return Err(ConfigError::schema(
                    format!("entry `{name}` has an empty path"),
                    "point the entry at a source file",
                ));
            }
        }

        if let Some(limit) = &config.builtins.limit_chunk_count {
            if limit.max_chunks < 1 {
                return Err(ConfigError::schema(
                    "builtins.limitChunkCount.maxChunks must be at least 1",
                    "use a value greater than or equal to 1",
                ));
            }
        }

        let mut filenames = std::collections::HashSet::new();
        for html in &config.builtins.html {
            if html.filename.trim().is_empty() {
                return Err(ConfigError::schema(
                    "builtins.html filename cannot be empty",
                    "omit `filename` to use index.html",
                ));
            }
            if !filenames.insert(html.filename.as_str()) {
                return Err(ConfigError::schema(
                    format!("builtins.html emits `{}` more than once", html.filename),
                    "give each page a distinct filename",
                ));
            }
        }

        for plugin in &config.plugins {
            if plugin.name.trim().is_empty() {
                return Err(ConfigError::schema(
                    "plugin name cannot be empty",
                    "reference plugins by their registered name",
                ));
            }
        }

        Ok(())
    }
}

/// Filesystem validator (for CLI use)
///
/// Runs [`SchemaValidator`], then checks that entries and HTML templates
/// exist relative to the config's `context` (or `root` when unset).
pub struct FsValidator {
    root: PathBuf,
}

impl FsValidator {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &TernConfig) -> Result<()> {
        SchemaValidator.validate(config)?;

        let context = config.context.as_deref().unwrap_or(&self.root);

        for (name, entry) in &config.entry {
            let path = context.join(entry);
            if !path.exists() {
                return Err(ConfigError::EntryNotFound {
                    name: name.clone(),
                    path,
                });
            }
        }

        for html in &config.builtins.html {
            let path = context.join(&html.template);
            if !path.is_file() {
                return Err(ConfigError::TemplateNotFound { path });
            }
        }

        Ok(())
    }
}

pub fn validate_schema(config: &TernConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

pub fn validate_fs(config: &TernConfig, root: impl AsRef<Path>) -> Result<()> {
    FsValidator::new(root).validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{HtmlConfig, LimitChunkCountConfig};

    fn with_entry() -> TernConfig {
        let mut config = TernConfig::default();
        config.entry.insert("main".into(), "./src/index.js".into());
        config
    }

    #[test]
    fn rejects_empty_entries() {
        let result = SchemaValidator.validate(&TernConfig::default());
        assert!(matches!(result.unwrap_err(), ConfigError::NoEntries));
    }

    #[test]
    fn accepts_valid_config() {
        assert!(validate_schema(&with_entry()).is_ok());
    }

    #[test]
    fn rejects_zero_max_chunks() {
        let mut config = with_entry();
        config.builtins.limit_chunk_count = Some(LimitChunkCountConfig::new(0));
        assert!(matches!(
            SchemaValidator.validate(&config).unwrap_err(),
            ConfigError::SchemaValidation { .. }
        ));
    }

    #[test]
    fn rejects_duplicate_html_filenames() {
        let mut config = with_entry();
        config.builtins.html = vec![HtmlConfig::new("a.html"), HtmlConfig::new("b.html")];
        assert!(SchemaValidator.validate(&config).is_err());
    }

    #[test]
    fn html_chunks_may_name_entries_added_later() {
        // Unknown names are skipped when the page is emitted.
        let mut config = with_entry();
        let mut html = HtmlConfig::new("index.html");
        html.chunks = Some(vec!["main".into(), "admin".into()]);
        config.builtins.html = vec![html];
        assert!(SchemaValidator.validate(&config).is_ok());
    }
}
