//! `tern build`: compile and write assets.

use std::path::Path;
use std::time::Instant;

use tern::{Compilation, CompilationStats, FileSystem, FsError, LimitChunkCountConfig, TernConfig};

use crate::cli::BuildArgs;
use crate::commands::load_config;
use crate::error::{CliError, Result};
use crate::ui;

pub async fn execute(args: BuildArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    execute_in(args, &cwd).await.map(|_| ())
}

/// Run a build as if started from `cwd`.
pub async fn execute_in(args: BuildArgs, cwd: &Path) -> Result<CompilationStats> {
    let start = Instant::now();

    let mut config = load_config(&args.config, cwd)?;
    apply_overrides(&mut config, &args, cwd);
    tern::validate_fs(&config, cwd)?;

    let compiler = tern::compiler_from_config(config, cwd, Vec::new())?;
    let out_dir = compiler.options.output.path.clone();

    let spinner = ui::Spinner::new("Compiling...");
    let compilation = compiler.compile().await?;
    spinner.finish();

    if compilation.assets.is_empty() {
        ui::warning("No assets emitted; add `builtins.html` to generate pages");
    }
    write_assets(&compilation, &out_dir).await?;
    let stats = compilation.stats()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        ui::print_chunk_summary(&stats, start.elapsed());
        ui::success(&format!(
            "Built {} chunk(s) into {}",
            stats.chunks.len(),
            out_dir.display()
        ));
    }
    Ok(stats)
}

/// Command-line flags win over the config file and the environment.
fn apply_overrides(config: &mut TernConfig, args: &BuildArgs, cwd: &Path) {
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if let Some(out_dir) = &args.out_dir {
        config.output.path = cwd.join(out_dir);
    }
    if let Some(max_chunks) = args.max_chunks {
        config
            .builtins
            .limit_chunk_count
            .get_or_insert_with(|| LimitChunkCountConfig::new(max_chunks))
            .max_chunks = max_chunks;
    }
}

async fn write_assets(compilation: &Compilation, out_dir: &Path) -> Result<()> {
    let fs = &compilation.fs;
    let write_error = |path: &Path, err: FsError| CliError::AssetWrite {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    fs.create_dir_all(out_dir)
        .await
        .map_err(|e| write_error(out_dir, e))?;

    for (name, asset) in &compilation.assets {
        let path = out_dir.join(name);
        if let Some(parent) = path.parent() {
            fs.create_dir_all(parent)
                .await
                .map_err(|e| write_error(parent, e))?;
        }
        fs.write_file(&path, &asset.source)
            .await
            .map_err(|e| write_error(&path, e))?;
        tracing::debug!(asset = %name, path = %path.display(), "wrote asset");
    }
    Ok(())
}
