//! Tern plugin that emits HTML pages.
//!
//! Each configured page reads a template relative to `context`, gets its
//! `<title>` set when one is configured, and a deferred script tag for
//! every file of the selected entrypoints. The result is emitted as an
//! asset during `processAssets`.
//!
//! ```rust
//! use tern_core::tern_config::HtmlConfig;
//! use tern_plugin_html::HtmlPlugin;
//!
//! let mut page = HtmlConfig::new("./public/index.html");
//! page.title = Some("Dashboard".into());
//! let plugin = HtmlPlugin::new(vec![page]);
//! assert_eq!(plugin.pages().len(), 1);
//! ```

mod template;

use std::path::PathBuf;

use async_trait::async_trait;
use indexmap::IndexSet;
use path_clean::PathClean;
use tern_core::tern_config::HtmlConfig;
use tern_core::{Asset, Compilation, CoreError, FsError, Plugin, PluginPhase, Result};
use thiserror::Error;

pub use template::{inject_before_body_end, inject_title, public_url, script_tag};

pub const PLUGIN_NAME: &str = "HtmlPlugin";

#[derive(Debug, Error)]
pub enum HtmlError {
    #[error("HTML template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("failed to read HTML template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: FsError,
    },
}

#[derive(Debug, Clone, Default)]
pub struct HtmlPlugin {
    pages: Vec<HtmlConfig>,
}

impl HtmlPlugin {
    pub fn new(pages: Vec<HtmlConfig>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[HtmlConfig] {
        &self.pages
    }

    async fn render(&self, compilation: &Compilation, page: &HtmlConfig) -> Result<String> {
        let path = compilation.options.context.join(&page.template).clean();
        let template = match compilation.fs.read_to_string(&path).await {
            Ok(template) => template,
            Err(FsError::FileNotFound(_)) => {
                return Err(CoreError::plugin(PLUGIN_NAME, HtmlError::TemplateNotFound(path)));
            }
            Err(source) => {
                return Err(CoreError::plugin(PLUGIN_NAME, HtmlError::Read { path, source }));
            }
        };

        let public_path = &compilation.options.output.public_path;
        let tags: Vec<String> = entry_files(compilation, page)?
            .iter()
            .map(|file| script_tag(&public_url(public_path, file)))
            .collect();

        let html = match &page.title {
            Some(title) => inject_title(&template, title),
            None => template,
        };
        Ok(inject_before_body_end(&html, &tags))
    }
}

/// Files of the page's entrypoints, in entry order and without repeats.
fn entry_files(compilation: &Compilation, page: &HtmlConfig) -> Result<IndexSet<String>> {
    let names: Vec<&str> = match &page.chunks {
        Some(chunks) => chunks.iter().map(String::as_str).collect(),
        None => compilation.entrypoints.keys().map(String::as_str).collect(),
    };

    let mut files = IndexSet::new();
    for name in names {
        if !compilation.entrypoints.contains_key(name) {
            tracing::warn!(page = %page.filename, entry = name, "HTML page references an unknown entry");
            continue;
        }
        files.extend(compilation.entrypoint_files(name)?);
    }
    Ok(files)
}

#[async_trait]
impl Plugin for HtmlPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Emit
    }

    async fn process_assets(&self, compilation: &mut Compilation) -> Result<()> {
        for page in &self.pages {
            let html = self.render(compilation, page).await?;
            tracing::debug!(page = %page.filename, template = %page.template.display(), "rendered HTML page");
            compilation.emit_asset(page.filename.clone(), Asset::new(html))?;
        }
        Ok(())
    }
}
