//! Sizes, durations and the build summary.

use std::time::Duration;

use console::Term;
use owo_colors::OwoColorize;
use tern::CompilationStats;

use super::{colors_enabled, is_quiet};

/// Human-readable byte count.
///
/// ```
/// use tern_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// ```
/// use std::time::Duration;
/// use tern_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// One line per chunk and per asset, without styling.
pub fn summary_lines(stats: &CompilationStats) -> Vec<String> {
    let name_width = stats
        .chunks
        .iter()
        .filter_map(|c| c.id.as_deref())
        .chain(stats.assets.iter().map(|a| a.name.as_str()))
        .map(str::len)
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(stats.chunks.len() + stats.assets.len());
    for chunk in &stats.chunks {
        let id = chunk.id.as_deref().unwrap_or("?");
        let kind = if chunk.initial { "initial" } else { "async" };
        lines.push(format!(
            "{id:<name_width$}  {kind:<7}  {:>10}  {}  [{}]",
            format_size(chunk.size),
            plural(chunk.modules.len(), "module"),
            chunk.files.join(", "),
        ));
    }
    for asset in &stats.assets {
        lines.push(format!(
            "{:<name_width$}  {:<7}  {:>10}",
            asset.name,
            "asset",
            format_size(asset.size as u64),
        ));
    }
    lines
}

/// Print the chunk and asset table to stderr. Skipped with `--quiet`.
pub fn print_chunk_summary(stats: &CompilationStats, elapsed: Duration) {
    if is_quiet() {
        return;
    }
    let width = (Term::stderr().size().1 as usize).clamp(20, 80);

    if colors_enabled() {
        eprintln!("\n{}", "Build Summary".bold().underline());
    } else {
        eprintln!("\nBuild Summary");
    }
    eprintln!("{}", "─".repeat(width));
    for line in summary_lines(stats) {
        eprintln!("  {line}");
    }
    eprintln!("{}", "─".repeat(width));

    let total = format!(
        "{}, {} in {}",
        plural(stats.chunks.len(), "chunk"),
        plural(stats.assets.len(), "asset"),
        format_duration(elapsed)
    );
    if colors_enabled() {
        eprintln!("{}", total.bold());
    } else {
        eprintln!("{total}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern::{AssetStats, ChunkStats};

    fn stats() -> CompilationStats {
        CompilationStats {
            chunks: vec![
                ChunkStats {
                    id: Some("main".into()),
                    name: Some("main".into()),
                    initial: true,
                    files: vec!["main.js".into()],
                    size: 2048,
                    modules: vec!["/app/a.js".into(), "/app/b.js".into()],
                },
                ChunkStats {
                    id: Some("1".into()),
                    name: None,
                    initial: false,
                    files: vec!["1.js".into()],
                    size: 10,
                    modules: vec!["/app/c.js".into()],
                },
            ],
            entrypoints: Default::default(),
            assets: vec![AssetStats {
                name: "index.html".into(),
                size: 120,
            }],
        }
    }

    #[test]
    fn summary_has_a_line_per_chunk_and_asset() {
        let lines = summary_lines(&stats());
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("main "));
        assert!(lines[0].contains("initial"));
        assert!(lines[0].contains("2.00 KB"));
        assert!(lines[0].contains("2 modules"));
        assert!(lines[0].ends_with("[main.js]"));
        assert!(lines[1].contains("async"));
        assert!(lines[1].contains("1 module "));
        assert!(lines[2].starts_with("index.html"));
        assert!(lines[2].contains("120 B"));
    }

    #[test]
    fn empty_stats_have_no_lines() {
        let stats = CompilationStats {
            chunks: Vec::new(),
            entrypoints: Default::default(),
            assets: Vec::new(),
        };
        assert!(summary_lines(&stats).is_empty());
    }

    #[test]
    fn sizes_switch_units() {
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }
}
