//! `tern check`: validate configuration without compiling.

use std::path::Path;

use crate::cli::CheckArgs;
use crate::commands::load_config;
use crate::error::Result;
use crate::ui;

pub async fn execute(args: CheckArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    execute_in(args, &cwd).map(|_| ())
}

/// Validate as if started from `cwd`. Returns the names of the plugins the
/// config resolves to.
pub fn execute_in(args: CheckArgs, cwd: &Path) -> Result<Vec<String>> {
    let config = load_config(&args.config, cwd)?;
    tern::validate_fs(&config, cwd)?;

    let entries = config.entry.len();
    let mode = config.mode;
    // Builds the plugin list, so unknown plugins and bad options fail here.
    let compiler = tern::compiler_from_config(config, cwd, Vec::new())?;
    let plugins: Vec<String> = compiler.plugins().iter().map(|p| p.name().to_string()).collect();

    ui::success(&format!(
        "Configuration is valid ({} entr{}, mode {})",
        entries,
        if entries == 1 { "y" } else { "ies" },
        mode.as_str()
    ));
    if plugins.is_empty() {
        ui::info("No plugins configured");
    } else {
        ui::info(&format!("Plugins: {}", plugins.join(", ")));
    }
    Ok(plugins)
}
