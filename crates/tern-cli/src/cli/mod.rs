//! Command-line interface definition for tern.
//!
//! - `tern build` - compile the configured entries and write assets
//! - `tern check` - load and validate configuration without compiling

mod commands;
pub mod enums;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command, ConfigArgs};
pub use enums::ModeArg;

/// Tern - a small module bundler
#[derive(Parser, Debug)]
#[command(
    name = "tern",
    version,
    about = "A small module bundler",
    long_about = "Tern splits entry points into chunks, keeps the chunk count under a\n\
                  configured ceiling, and emits HTML pages that load the result."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    ///
    /// Outputs plain text without ANSI color codes. Useful for logging to
    /// files or systems that don't support colored terminal output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
