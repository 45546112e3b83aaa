use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Built-in plugins, configured declaratively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Builtins {
    /// One HTML page per item.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub html: Vec<HtmlConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_chunk_count: Option<LimitChunkCountConfig>,
}

/// Template-based HTML generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlConfig {
    /// Template path, relative to `context`.
    pub template: PathBuf,

    /// Emitted asset name (default: "index.html")
    #[serde(default = "default_html_filename")]
    pub filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Entry names whose chunks get script tags. All entries when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<String>>,
}

impl HtmlConfig {
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            filename: default_html_filename(),
            title: None,
            chunks: None,
        }
    }
}

fn default_html_filename() -> String {
    "index.html".to_string()
}

/// Ceiling on the number of emitted chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitChunkCountConfig {
    pub max_chunks: u32,

    /// Constant cost of a chunk (default 10000).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_overhead: Option<u64>,

    /// Weight of modules in initial chunks (default 10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_chunk_multiplicator: Option<u64>,
}

impl LimitChunkCountConfig {
    pub fn new(max_chunks: u32) -> Self {
        Self {
            max_chunks,
            chunk_overhead: None,
            entry_chunk_multiplicator: None,
        }
    }
}
