use std::sync::Arc;
use std::time::Instant;

use tern_graph::{Module, ModuleGraph, ModuleIdentifier, SourceType};

use crate::compilation::Compilation;
use crate::error::Result;
use crate::fs::{FileSystem, NativeFileSystem};
use crate::hooks::CompilerHooks;
use crate::options::CompilerOptions;
use crate::plugin::{ApplyContext, BoxPlugin};
use crate::registry::PluginRegistry;

/// Owns the options, the applied plugins and their hook taps.
#[derive(Debug)]
pub struct Compiler {
    pub options: Arc<CompilerOptions>,
    pub hooks: CompilerHooks,
    plugins: Vec<BoxPlugin>,
    fs: Arc<dyn FileSystem>,
}

impl Compiler {
    /// Apply every plugin, then call the `entryOption` taps with the
    /// configured context and entries.
    pub fn new(options: CompilerOptions, plugins: Vec<BoxPlugin>) -> Result<Self> {
        Self::with_file_system(options, plugins, Arc::new(NativeFileSystem))
    }

    pub fn with_file_system(
        options: CompilerOptions,
        plugins: Vec<BoxPlugin>,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let plugins = plugins.into_iter().collect::<PluginRegistry>().into_plugins();
        let mut hooks = CompilerHooks::default();

        for plugin in &plugins {
            tracing::debug!(plugin = plugin.name(), phase = ?plugin.phase(), "applying plugin");
            plugin.apply(&mut ApplyContext {
                hooks: &mut hooks,
                options: &options,
            })?;
        }

        hooks.entry_option.call(&options.context, &options.entry)?;

        Ok(Self {
            options: Arc::new(options),
            hooks,
            plugins,
            fs,
        })
    }

    pub fn plugins(&self) -> &[BoxPlugin] {
        &self.plugins
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Run a compilation over the entry modules.
    pub async fn compile(&self) -> Result<Compilation> {
        self.compile_with(ModuleGraph::new(), |_| Ok(())).await
    }

    /// Run a compilation over a pre-populated module graph. `prepare` runs
    /// after the entrypoints exist and before chunk optimization, e.g. to add
    /// async chunks.
    pub async fn compile_with<F>(&self, mut module_graph: ModuleGraph, prepare: F) -> Result<Compilation>
    where
        F: FnOnce(&mut Compilation) -> Result<()>,
    {
        let start = Instant::now();
        let entry_modules = self.seed_module_graph(&mut module_graph).await?;

        let mut compilation = Compilation::new(self.options.clone(), self.fs.clone(), module_graph);
        for (name, module) in entry_modules {
            compilation.add_entrypoint(&name, module)?;
        }
        prepare(&mut compilation)?;

        let mut rounds = 0usize;
        loop {
            rounds += 1;
            let mut changed = false;
            for plugin in &self.plugins {
                if plugin.optimize_chunks(&mut compilation).await? {
                    tracing::debug!(plugin = plugin.name(), round = rounds, "chunks changed");
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        compilation.assign_chunk_ids();

        for plugin in &self.plugins {
            plugin.process_assets(&mut compilation).await?;
        }

        tracing::info!(
            chunks = compilation.chunk_count(),
            assets = compilation.assets.len(),
            optimize_rounds = rounds,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "compilation finished"
        );
        Ok(compilation)
    }

    /// Make sure every entry has a module. Entry files missing from the graph
    /// are added with their byte length as size (0 when unreadable).
    async fn seed_module_graph(
        &self,
        module_graph: &mut ModuleGraph,
    ) -> Result<Vec<(String, ModuleIdentifier)>> {
        let mut entry_modules = Vec::with_capacity(self.options.entry.len());
        for (name, request) in &self.options.entry {
            let path = self.options.resolve_entry(request);
            let identifier = ModuleIdentifier::from_path(&path);

            if !module_graph.contains(&identifier) {
                let size = match self.fs.metadata(&path).await {
                    Ok(metadata) => metadata.size,
                    Err(err) => {
                        tracing::warn!(entry = %name, error = %err, "entry not readable, assuming size 0");
                        0
                    }
                };
                module_graph.add_module(
                    Module::builder(identifier.clone())
                        .size(SourceType::from_path(&path), size)
                        .build(),
                );
            }
            entry_modules.push((name.clone(), identifier));
        }
        Ok(entry_modules)
    }
}
