use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Reference to a plugin by registered name.
///
/// Accepts either a bare name (`"my-plugin"`) or a table with options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    pub name: String,

    /// Forwarded to the plugin factory as-is.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub options: Value,

    pub enabled: bool,

    /// Per-profile overrides, merged over this plugin entry.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub profiles: HashMap<String, Value>,
}

impl PluginConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Value::Null,
            enabled: true,
            profiles: HashMap::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PluginTable {
    name: String,
    #[serde(default)]
    options: Value,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    profiles: HashMap<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PluginInput {
    Name(String),
    Table(PluginTable),
}

impl<'de> Deserialize<'de> for PluginConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PluginInput::deserialize(deserializer)? {
            PluginInput::Name(name) => PluginConfig::new(name),
            PluginInput::Table(table) => PluginConfig {
                name: table.name,
                options: table.options,
                enabled: table.enabled,
                profiles: table.profiles,
            },
        })
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_name_and_table_forms() {
        let plugins: Vec<PluginConfig> = serde_json::from_value(json!([
            "banner",
            { "name": "define", "options": { "DEBUG": false }, "enabled": false }
        ]))
        .unwrap();

        assert_eq!(plugins[0], PluginConfig::new("banner"));
        assert_eq!(plugins[1].name, "define");
        assert_eq!(plugins[1].options, json!({ "DEBUG": false }));
        assert!(!plugins[1].enabled);
    }
}
