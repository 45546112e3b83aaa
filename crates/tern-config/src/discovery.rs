//! File-based config discovery for CLI use
//!
//! Handles finding and loading tern configuration files from the filesystem.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::TernConfig;
use crate::env::EnvOverrides;
use crate::error::{ConfigError, Result};

pub const TOML_CONFIG: &str = "tern.toml";
pub const JSON_CONFIG: &str = "tern.config.json";
pub const PACKAGE_JSON: &str = "package.json";
const PACKAGE_FIELD: &str = "tern";

/// File-based configuration discovery
///
/// Searches for tern configuration files in conventional locations and loads
/// them. The loaded config's `context` defaults to the directory holding the
/// config file. Library users should use [`TernConfig::from_value`] directly.
///
/// # Example
///
/// ```no_run
/// use tern_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. tern.toml
    /// 2. tern.config.json
    /// 3. package.json (tern field)
    pub fn find(&self) -> Option<PathBuf> {
        for name in [TOML_CONFIG, JSON_CONFIG] {
            let path = self.root.join(name);
            if path.is_file() {
                return Some(path);
            }
        }

        let pkg_path = self.root.join(PACKAGE_JSON);
        let content = fs::read_to_string(&pkg_path).ok()?;
        let parsed = serde_json::from_str::<Value>(&content).ok()?;
        parsed
            .get(PACKAGE_FIELD)
            .is_some_and(|field| !field.is_null())
            .then_some(pkg_path)
    }

    /// Load config from the discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<TernConfig> {
        let path = self.find().ok_or_else(|| ConfigError::NotFound {
            root: self.root.clone(),
        })?;
        load_file(&path)
    }

    /// Load config, then merge the named profile over it.
    pub fn load_with_profile(&self, profile: &str) -> Result<TernConfig> {
        self.load()?.materialize_profile(Some(profile))
    }
}

/// Load a specific config file. The format follows the file name.
pub fn load_file(path: &Path) -> Result<TernConfig> {
    let content = fs::read_to_string(path)?;
    let file_name = path.file_name().and_then(OsStr::to_str).unwrap_or_default();

    let value = if file_name == PACKAGE_JSON {
        package_json_field(path, &content)?
    } else if path.extension() == Some(OsStr::new("json")) {
        serde_json::from_str(&content).map_err(|e| parse_error(path, e))?
    } else if path.extension() == Some(OsStr::new("toml")) {
        let toml_value: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
        serde_json::to_value(toml_value).map_err(|e| parse_error(path, e))?
    } else {
        return Err(ConfigError::Parse {
            path: path.to_path_buf(),
            message: "unsupported format, expected .toml or .json".to_string(),
        });
    };

    let config = TernConfig::from_value(value)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config.resolve_context(dir))
}

fn package_json_field(path: &Path, content: &str) -> Result<Value> {
    let parsed: Value = serde_json::from_str(content).map_err(|e| parse_error(path, e))?;
    match parsed.get(PACKAGE_FIELD) {
        Some(value) if !value.is_null() => Ok(value.clone()),
        _ => Err(ConfigError::InvalidValue {
            field: PACKAGE_FIELD.to_string(),
            hint: Some("add a `tern` field to package.json".to_string()),
        }),
    }
}

fn parse_error(path: &Path, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Discover config in `root`, apply an optional profile and `TERN_*`
/// environment overrides, in that order.
pub fn discover(root: impl AsRef<Path>, profile: Option<&str>) -> Result<TernConfig> {
    let config = ConfigDiscovery::new(root).load()?;
    with_overrides(config, profile)
}

/// Load `path`, apply an optional profile and `TERN_*` environment overrides.
pub fn load_with_overrides(path: &Path, profile: Option<&str>) -> Result<TernConfig> {
    with_overrides(load_file(path)?, profile)
}

fn with_overrides(config: TernConfig, profile: Option<&str>) -> Result<TernConfig> {
    let mut config = config.materialize_profile(profile)?;
    let overrides = EnvOverrides::from_env()?;
    if !overrides.is_empty() {
        tracing::debug!(?overrides, "applying environment overrides");
        overrides.apply(&mut config);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn toml_wins_over_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(JSON_CONFIG), "{}").unwrap();
        fs::write(dir.path().join(TOML_CONFIG), "").unwrap();

        let found = ConfigDiscovery::new(dir.path()).find().unwrap();
        assert_eq!(found, dir.path().join(TOML_CONFIG));
    }

    #[test]
    fn package_json_without_field_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PACKAGE_JSON), r#"{ "name": "app" }"#).unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn load_returns_not_found_when_no_config() {
        let dir = TempDir::new().unwrap();
        let err = ConfigDiscovery::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn context_defaults_to_config_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(TOML_CONFIG),
            r#"
[entry]
main = "./src/index.js"
"#,
        )
        .unwrap();

        let config = ConfigDiscovery::new(dir.path()).load().unwrap();
        assert_eq!(config.context.as_deref(), Some(dir.path()));
    }

    #[test]
    fn unsupported_extension_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tern.yaml");
        fs::write(&path, "mode: none").unwrap();
        assert!(matches!(
            load_file(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }
}
