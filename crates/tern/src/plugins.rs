//! Plugins referenced by name from configuration files.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tern_config::{HtmlConfig, LimitChunkCountConfig, PluginConfig};
use tern_core::{BoxPlugin, CompilerOptions, CoreError, Result};
use tern_plugin_html::HtmlPlugin;
use tern_plugin_limit_chunk_count::LimitChunkCountPlugin;

/// Builds a plugin from the `options` of a `plugins` entry.
pub type PluginFactory = Arc<dyn Fn(&Value) -> Result<BoxPlugin> + Send + Sync>;

/// Name → factory table used to resolve `plugins` entries.
#[derive(Clone, Default)]
pub struct PluginFactories {
    factories: FxHashMap<String, PluginFactory>,
}

impl fmt::Debug for PluginFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names();
        names.sort_unstable();
        f.debug_struct("PluginFactories").field("names", &names).finish()
    }
}

impl PluginFactories {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in plugins, under their short and their full names.
    pub fn with_builtins() -> Self {
        let mut factories = Self::new();
        for name in ["html", tern_plugin_html::PLUGIN_NAME] {
            factories.register(name, html_factory);
        }
        for name in ["limitChunkCount", tern_plugin_limit_chunk_count::PLUGIN_NAME] {
            factories.register(name, limit_chunk_count_factory);
        }
        factories
    }

    /// Register a factory, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Value) -> Result<BoxPlugin> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Instantiate a configured plugin. Disabled entries yield `None`.
    pub fn create(&self, config: &PluginConfig) -> Result<Option<BoxPlugin>> {
        if !config.enabled {
            tracing::debug!(plugin = %config.name, "plugin disabled");
            return Ok(None);
        }
        let factory = self
            .factories
            .get(&config.name)
            .ok_or_else(|| CoreError::UnknownPlugin(config.name.clone()))?;
        factory(&config.options).map(Some)
    }
}

fn parse_options<T: serde::de::DeserializeOwned>(plugin: &str, options: &Value) -> Result<T> {
    serde_json::from_value(options.clone())
        .map_err(|err| CoreError::InvalidOptions(format!("plugin `{plugin}`: {err}")))
}

/// Accepts one page object or an array of pages.
fn html_factory(options: &Value) -> Result<BoxPlugin> {
    let pages = match options {
        Value::Array(_) => parse_options::<Vec<HtmlConfig>>(tern_plugin_html::PLUGIN_NAME, options)?,
        _ => vec![parse_options::<HtmlConfig>(tern_plugin_html::PLUGIN_NAME, options)?],
    };
    Ok(Arc::new(HtmlPlugin::new(pages)))
}

fn limit_chunk_count_factory(options: &Value) -> Result<BoxPlugin> {
    let config: LimitChunkCountConfig =
        parse_options(tern_plugin_limit_chunk_count::PLUGIN_NAME, options)?;
    Ok(Arc::new(LimitChunkCountPlugin::new(config)?))
}

/// Plugins declared under `builtins`.
pub fn builtin_plugins(options: &CompilerOptions) -> Result<Vec<BoxPlugin>> {
    let mut plugins: Vec<BoxPlugin> = Vec::new();
    if let Some(limit) = options.builtins.limit_chunk_count {
        plugins.push(Arc::new(LimitChunkCountPlugin::new(limit)?));
    }
    if !options.builtins.html.is_empty() {
        plugins.push(Arc::new(HtmlPlugin::new(options.builtins.html.clone())));
    }
    Ok(plugins)
}

/// Plugins declared under `plugins`, in declaration order.
pub fn configured_plugins(
    options: &CompilerOptions,
    factories: &PluginFactories,
) -> Result<Vec<BoxPlugin>> {
    let mut plugins = Vec::with_capacity(options.plugins.len());
    for config in &options.plugins {
        if let Some(plugin) = factories.create(config)? {
            plugins.push(plugin);
        }
    }
    Ok(plugins)
}
