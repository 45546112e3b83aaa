//! Environment overrides (`TERN_*`).
//!
//! Nested keys use a double underscore: `TERN_OUTPUT__PATH=build`.

use std::path::PathBuf;

use figment::providers::Env;
use figment::{Figment, Provider};
use serde::Deserialize;

use crate::builtins::LimitChunkCountConfig;
use crate::config::{Mode, TernConfig};
use crate::error::{ConfigError, Result};

pub const ENV_PREFIX: &str = "TERN_";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EnvOverrides {
    pub mode: Option<Mode>,
    pub context: Option<PathBuf>,
    #[serde(default)]
    pub output: OutputOverrides,
    pub max_chunks: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OutputOverrides {
    pub path: Option<PathBuf>,
    pub public_path: Option<String>,
}

impl EnvOverrides {
    /// Read `TERN_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_provider(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_provider(provider: impl Provider) -> Result<Self> {
        Figment::from(provider)
            .extract()
            .map_err(|e| ConfigError::Environment {
                message: e.to_string(),
            })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, config: &mut TernConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(context) = self.context {
            config.context = Some(context);
        }
        if let Some(path) = self.output.path {
            config.output.path = path;
        }
        if let Some(public_path) = self.output.public_path {
            config.output.public_path = public_path;
        }
        if let Some(max_chunks) = self.max_chunks {
            config
                .builtins
                .limit_chunk_count
                .get_or_insert_with(|| LimitChunkCountConfig::new(max_chunks))
                .max_chunks = max_chunks;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::{Format, Toml};

    #[test]
    fn overrides_apply_over_config() {
        let overrides = EnvOverrides::from_provider(Toml::string(
            r#"
mode = "development"
max_chunks = 3

[output]
path = "build"
"#,
        ))
        .unwrap();

        let mut config = TernConfig::default();
        overrides.apply(&mut config);

        assert_eq!(config.mode, Mode::Development);
        assert_eq!(config.output.path, PathBuf::from("build"));
        assert_eq!(config.builtins.limit_chunk_count.unwrap().max_chunks, 3);
    }

    #[test]
    fn empty_overrides_change_nothing() {
        let overrides = EnvOverrides::from_provider(Toml::string("")).unwrap();
        assert!(overrides.is_empty());

        let mut config = TernConfig::default();
        overrides.apply(&mut config);
        assert_eq!(config, TernConfig::default());
    }

    #[test]
    fn bad_mode_is_an_environment_error() {
        let err = EnvOverrides::from_provider(Toml::string(r#"mode = "turbo""#)).unwrap_err();
        assert!(matches!(err, ConfigError::Environment { .. }));
    }
}
