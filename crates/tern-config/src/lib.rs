//! Configuration for the tern bundler.
//!
//! A [`TernConfig`] comes from `tern.toml`, `tern.config.json`, the `tern`
//! field of `package.json`, or straight from a JSON value. Profiles and
//! `TERN_*` environment variables are layered on top.

pub mod builtins;
pub mod config;
pub mod discovery;
pub mod env;
pub mod error;
pub mod plugin;
pub mod validation;

pub use builtins::{Builtins, HtmlConfig, LimitChunkCountConfig};
pub use config::{EntryMap, Mode, OutputConfig, TernConfig, DEFAULT_ENTRY_NAME};
pub use discovery::{discover, load_file, load_with_overrides, ConfigDiscovery};
pub use env::EnvOverrides;
pub use error::{ConfigError, Result};
pub use plugin::PluginConfig;
pub use validation::{validate_fs, validate_schema, ConfigValidator, FsValidator, SchemaValidator};
