//! Logging setup for the tern CLI.
//!
//! Library crates emit `tracing` events; this module installs the subscriber
//! that prints them to stderr.
//!
//! Filter precedence:
//! 1. `--verbose`: debug for every tern crate
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. info for every tern crate
//!
//! ```rust,no_run
//! use tern_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("starting build");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const TERN_CRATES: &[&str] = &[
    "tern",
    "tern_cli",
    "tern_config",
    "tern_core",
    "tern_graph",
    "tern_plugin_html",
    "tern_plugin_limit_chunk_count",
];

/// Directives setting `level` for every tern crate.
pub fn filter_directives(level: &str) -> String {
    TERN_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn env_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(filter_directives("debug"))
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives("info")))
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(env_filter(verbose, quiet), no_color);
}

pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise ask the terminal.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
