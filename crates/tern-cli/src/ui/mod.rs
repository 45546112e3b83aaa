//! Terminal output: status lines, sizes and the chunk summary.
//!
//! Everything here writes to stderr so that `tern build --json` keeps
//! stdout machine-readable.

mod format;
mod messages;
mod spinner;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size, print_chunk_summary, summary_lines};
pub use messages::{info, success, warning};
pub use spinner::Spinner;

static COLORS: AtomicBool = AtomicBool::new(true);
static QUIET: AtomicBool = AtomicBool::new(false);

/// Apply the global `--quiet` and `--no-color` flags. Call once from `main`.
pub fn init(quiet: bool, no_color: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
    COLORS.store(!no_color && crate::logger::should_use_colors(), Ordering::Relaxed);
}

pub fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "BUILDKITE"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}
