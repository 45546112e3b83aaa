//! Command implementations.

pub mod build;
pub mod check;

use std::path::Path;

use tern::TernConfig;

use crate::cli::ConfigArgs;
use crate::error::{Result, ResultExt};

pub use build::execute as build_execute;
pub use check::execute as check_execute;

/// Load the config named by `--config`, or discover one in `cwd`. The
/// profile and `TERN_*` environment overrides are applied either way.
pub fn load_config(args: &ConfigArgs, cwd: &Path) -> Result<TernConfig> {
    let profile = args.profile.as_deref();
    match &args.config {
        Some(path) => {
            let path = cwd.join(path);
            tracing::debug!(path = %path.display(), "loading config");
            tern::load_with_overrides(&path, profile).with_path(&path)
        }
        None => Ok(tern::discover(cwd, profile)?),
    }
}
