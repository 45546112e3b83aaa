use std::path::{Path, PathBuf};

use path_clean::PathClean;
use tern_config::{validate_schema, Builtins, EntryMap, Mode, PluginConfig, TernConfig};

use crate::error::{CoreError, Result};

/// Normalized options the compiler runs with.
///
/// Unlike [`TernConfig`], every path here is absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    pub context: PathBuf,
    pub mode: Mode,
    pub entry: EntryMap,
    pub output: OutputOptions,
    pub builtins: Builtins,
    pub plugins: Vec<PluginConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    pub path: PathBuf,
    pub public_path: String,
}

impl CompilerOptions {
    /// Validate `config` and resolve its paths. A relative or missing
    /// `context` is resolved against `cwd`.
    pub fn from_config(config: TernConfig, cwd: &Path) -> Result<Self> {
        validate_schema(&config)?;

        if !cwd.is_absolute() {
            return Err(CoreError::InvalidOptions(format!(
                "working directory must be absolute, got {}",
                cwd.display()
            )));
        }

        let context = match config.context {
            Some(context) if context.is_absolute() => context.clean(),
            Some(context) => cwd.join(context).clean(),
            None => cwd.to_path_buf().clean(),
        };
        let output_path = context.join(&config.output.path).clean();

        Ok(Self {
            context,
            mode: config.mode,
            entry: config.entry,
            output: OutputOptions {
                path: output_path,
                public_path: config.output.public_path,
            },
            builtins: config.builtins,
            plugins: config.plugins,
        })
    }

    /// Absolute path of an entry request.
    pub fn resolve_entry(&self, request: &str) -> PathBuf {
        self.context.join(request).clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_config::ConfigError;

    fn config(context: Option<&str>) -> TernConfig {
        let mut config = TernConfig {
            context: context.map(PathBuf::from),
            ..TernConfig::default()
        };
        config.entry.insert("main".into(), "./src/index.js".into());
        config
    }

    #[test]
    fn relative_context_resolves_against_cwd() {
        let options = CompilerOptions::from_config(config(Some("app")), Path::new("/work")).unwrap();
        assert_eq!(options.context, PathBuf::from("/work/app"));
        assert_eq!(options.output.path, PathBuf::from("/work/app/dist"));
        assert_eq!(
            options.resolve_entry("./src/index.js"),
            PathBuf::from("/work/app/src/index.js")
        );
    }

    #[test]
    fn absolute_context_is_kept() {
        let options = CompilerOptions::from_config(config(Some("/site/./")), Path::new("/work")).unwrap();
        assert_eq!(options.context, PathBuf::from("/site"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = CompilerOptions::from_config(TernConfig::default(), Path::new("/work")).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::NoEntries)));
    }
}
