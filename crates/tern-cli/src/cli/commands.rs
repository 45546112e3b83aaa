use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::ModeArg;

/// Available tern subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile the configured entries
    ///
    /// Loads the configuration, builds the chunk graph, runs the configured
    /// plugins and writes the emitted assets to the output directory.
    Build(BuildArgs),

    /// Validate configuration
    ///
    /// Loads the configuration with its profile and `TERN_*` overrides and
    /// checks that entries and HTML templates exist. Nothing is compiled.
    Check(CheckArgs),
}

/// Where to find the configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a config file
    ///
    /// Accepts `tern.toml`, `tern.config.json` or a `package.json` with a
    /// `tern` field. Without it, the current directory is searched in that
    /// order.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Profile to merge over the base config
    #[arg(short, long, value_name = "NAME")]
    pub profile: Option<String>,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Override the configured mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Output directory for emitted assets
    ///
    /// Relative paths resolve against the current directory. Created if it
    /// doesn't exist.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Merge chunks until at most this many remain
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_chunks: Option<u32>,

    /// Print compilation stats as JSON on stdout instead of the summary
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the check command
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}
