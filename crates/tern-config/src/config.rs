//! The configuration record and profile merging.
//!
//! For file discovery, see the `discovery` module.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::builtins::Builtins;
use crate::error::{ConfigError, Result as ConfigResult};
use crate::plugin::PluginConfig;

/// Named entry points, in declaration order.
pub type EntryMap = IndexMap<String, String>;

/// Name given to a single unnamed entry.
pub const DEFAULT_ENTRY_NAME: &str = "main";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TernConfig {
    /// Base directory for relative paths. Filled in by discovery when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PathBuf>,

    #[serde(default)]
    pub mode: Mode,

    /// `"./src/index.js"` is shorthand for `{ main = "./src/index.js" }`.
    #[serde(default, deserialize_with = "deserialize_entry")]
    pub entry: EntryMap,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub builtins: Builtins,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginConfig>,

    /// Partial configs merged over the base by [`TernConfig::materialize_profile`].
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub profiles: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    #[default]
    Production,
    None,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
            Mode::None => "none",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Mode::Production)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s {
            "development" => Ok(Mode::Development),
            "production" => Ok(Mode::Production),
            "none" => Ok(Mode::None),
            other => Err(ConfigError::InvalidValue {
                field: "mode".to_string(),
                hint: Some(format!(
                    "expected development, production or none, got `{other}`"
                )),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    /// Output directory, relative to `context` (default: "dist")
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Prefix of emitted file URLs in generated HTML.
    #[serde(default)]
    pub public_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            public_path: String::new(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("dist")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntryInput {
    Single(String),
    Named(EntryMap),
}

fn deserialize_entry<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntryMap, D::Error> {
    Ok(match EntryInput::deserialize(deserializer)? {
        EntryInput::Single(path) => {
            let mut entry = EntryMap::new();
            entry.insert(DEFAULT_ENTRY_NAME.to_string(), path);
            entry
        }
        EntryInput::Named(entry) => entry,
    })
}

impl TernConfig {
    /// Create from serde_json::Value (for programmatic config)
    ///
    /// # Example
    ///
    /// ```
    /// use tern_config::TernConfig;
    /// use serde_json::json;
    ///
    /// let value = json!({
    ///     "mode": "development",
    ///     "entry": { "main": "./src/index.js", "test": "./src/index2.js" }
    /// });
    ///
    /// let config = TernConfig::from_value(value).unwrap();
    /// assert_eq!(config.entry.keys().collect::<Vec<_>>(), ["main", "test"]);
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn to_value(&self) -> ConfigResult<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Set `context` from `base`: used as-is when absent, joined when relative.
    pub fn resolve_context(mut self, base: &Path) -> Self {
        self.context = Some(match self.context.take() {
            Some(context) if context.is_absolute() => context,
            Some(context) => base.join(context),
            None => base.to_path_buf(),
        });
        self
    }

    /// Merge the named profile over the base config, then over each plugin
    /// that defines it. A name no profile table mentions is an error.
    pub fn materialize_profile(mut self, profile: Option<&str>) -> ConfigResult<Self> {
        let Some(name) = profile else {
            return Ok(self);
        };

        let in_plugins = self.plugins.iter().any(|p| p.profiles.contains_key(name));
        let overlay = match self.profiles.get(name) {
            Some(overlay) => overlay.clone(),
            None if in_plugins => Value::Null,
            None => {
                return Err(ConfigError::UnknownProfile {
                    name: name.to_string(),
                    available: available_profiles(&self.profiles),
                });
            }
        };

        if !overlay.is_null() {
            let profiles = std::mem::take(&mut self.profiles);
            let mut base = serde_json::to_value(&self).map_err(profile_error)?;
            merge_values(&mut base, &overlay);
            if let Value::Object(map) = &mut base {
                map.remove("profiles");
            }
            self = serde_json::from_value(base).map_err(profile_error)?;
            self.profiles = profiles;
        }

        apply_plugin_profiles(&mut self.plugins, name)?;
        tracing::debug!(profile = name, "materialized profile");
        Ok(self)
    }
}

fn available_profiles(profiles: &IndexMap<String, Value>) -> String {
    if profiles.is_empty() {
        "none".to_string()
    } else {
        profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn profile_error(err: serde_json::Error) -> ConfigError {
    ConfigError::InvalidProfileOverride {
        message: err.to_string(),
    }
}

/// Deep merge of JSON objects; anything else in `update` replaces `target`.
pub(crate) fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

fn apply_plugin_profiles(plugins: &mut [PluginConfig], profile: &str) -> ConfigResult<()> {
    for plugin in plugins {
        let Some(overrides) = plugin.profiles.get(profile).cloned() else {
            continue;
        };

        if overrides.is_null() {
            continue;
        }

        let original_profiles = plugin.profiles.clone();
        let mut merged = serde_json::to_value(&*plugin).map_err(profile_error)?;
        merge_values(&mut merged, &overrides);
        let mut updated: PluginConfig = serde_json::from_value(merged).map_err(profile_error)?;
        updated.profiles = original_profiles;
        *plugin = updated;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_shorthand_becomes_main() {
        let config = TernConfig::from_value(json!({ "entry": "./src/index.js" })).unwrap();
        assert_eq!(config.entry.get("main").unwrap(), "./src/index.js");
    }

    #[test]
    fn entry_keeps_declaration_order() {
        let config = TernConfig::from_value(json!({
            "entry": { "zeta": "./z.js", "alpha": "./a.js", "mid": "./m.js" }
        }))
        .unwrap();
        let names: Vec<_> = config.entry.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn to_value_uses_camel_case() {
        let config = TernConfig::from_value(json!({
            "entry": { "main": "./src/index.js" },
            "builtins": { "limitChunkCount": { "maxChunks": 5 } }
        }))
        .unwrap();

        let value = config.to_value().unwrap();
        assert_eq!(value["builtins"]["limitChunkCount"]["maxChunks"], json!(5));
        assert_eq!(value["output"]["publicPath"], json!(""));
        assert_eq!(value["mode"], json!("production"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(TernConfig::from_value(json!({ "mode": "fast" })).is_err());
        assert!("fast".parse::<Mode>().is_err());
        assert_eq!("none".parse::<Mode>().unwrap(), Mode::None);
    }

    #[test]
    fn resolve_context_joins_relative_paths() {
        let base = Path::new("/project");

        let config = TernConfig::default().resolve_context(base);
        assert_eq!(config.context.as_deref(), Some(base));

        let config = TernConfig {
            context: Some("app".into()),
            ..TernConfig::default()
        }
        .resolve_context(base);
        assert_eq!(config.context, Some(PathBuf::from("/project/app")));

        let config = TernConfig {
            context: Some("/elsewhere".into()),
            ..TernConfig::default()
        }
        .resolve_context(base);
        assert_eq!(config.context, Some(PathBuf::from("/elsewhere")));
    }

    #[test]
    fn profile_merging_works() {
        let config = TernConfig::from_value(json!({
            "mode": "development",
            "entry": { "main": "./src/index.js" },
            "profiles": {
                "ci": {
                    "mode": "production",
                    "builtins": { "limitChunkCount": { "maxChunks": 1 } }
                }
            }
        }))
        .unwrap()
        .materialize_profile(Some("ci"))
        .unwrap();

        assert_eq!(config.mode, Mode::Production);
        assert_eq!(config.builtins.limit_chunk_count.unwrap().max_chunks, 1);
        assert_eq!(config.entry.len(), 1);
        assert!(config.profiles.contains_key("ci"));
    }

    #[test]
    fn unknown_profile_lists_available_ones() {
        let err = TernConfig::from_value(json!({ "profiles": { "ci": {}, "local": {} } }))
            .unwrap()
            .materialize_profile(Some("prod"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown profile `prod` (available: ci, local)"
        );
    }

    #[test]
    fn merge_replaces_arrays_and_scalars() {
        let mut target = json!({ "a": [1, 2], "b": { "c": 1, "d": 2 } });
        merge_values(&mut target, &json!({ "a": [3], "b": { "c": 5 } }));
        assert_eq!(target, json!({ "a": [3], "b": { "c": 5, "d": 2 } }));
    }
}
