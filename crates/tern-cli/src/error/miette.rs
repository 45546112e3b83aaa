//! Miette diagnostic conversion for CLI errors.

use miette::Report;
use tern::{ConfigError, CoreError};

use crate::error::CliError;

/// Convert a `CliError` into a miette report, adding hints for the
/// configuration mistakes users hit most.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        CliError::Build(e) => core_error_to_miette(e),
        _ => miette::miette!("{}", err),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::NotFound { root } => miette::miette!(
            "No tern configuration found in {}\n\nHint: Create a tern.toml or pass --config <path>",
            root.display()
        ),
        ConfigError::EntryNotFound { name, path } => miette::miette!(
            "Entry `{}` not found: {}\n\nHint: Check the `entry` table of your config",
            name,
            path.display()
        ),
        ConfigError::UnknownProfile { name, available } => miette::miette!(
            "Unknown profile `{}`\n\nHint: Available profiles: {}",
            name,
            available
        ),
        other => miette::miette!("Configuration error: {}", other),
    }
}

fn core_error_to_miette(err: CoreError) -> Report {
    match err {
        CoreError::Config(e) => config_error_to_miette(e),
        CoreError::UnknownPlugin(name) => miette::miette!(
            "Unknown plugin `{}`\n\nHint: Built-in plugins are `html` and `limitChunkCount`",
            name
        ),
        other => miette::miette!("Build error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_config_gets_a_hint() {
        let report = cli_error_to_miette(CliError::Config(ConfigError::NotFound {
            root: PathBuf::from("/project"),
        }));
        let msg = report.to_string();
        assert!(msg.contains("/project"));
        assert!(msg.contains("--config"));
    }

    #[test]
    fn unknown_plugin_gets_a_hint() {
        let report = cli_error_to_miette(CliError::Build(CoreError::UnknownPlugin("terser".into())));
        let msg = report.to_string();
        assert!(msg.contains("terser"));
        assert!(msg.contains("limitChunkCount"));
    }
}
