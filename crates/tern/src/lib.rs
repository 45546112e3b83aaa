//! # tern
//!
//! A small module bundler core: configuration loading, a compiler with
//! tap-able hooks, a chunk graph, and the built-in `limitChunkCount` and
//! `html` plugins.
//!
//! This crate ties the workspace together. It turns a [`TernConfig`] into a
//! [`Compiler`] whose plugins come from three places, in this order:
//!
//! 1. `builtins` (`limitChunkCount`, `html`)
//! 2. `plugins`, resolved by name through [`PluginFactories`]
//! 3. plugins handed over by the embedder
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use tern::{compiler_from_config, TernConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = tern::load_with_overrides(Path::new("tern.toml"), None)?;
//! let compiler = compiler_from_config(config, &std::env::current_dir()?, Vec::new())?;
//! let compilation = compiler.compile().await?;
//! for chunk in compilation.stats()?.chunks {
//!     println!("{:?}: {} bytes", chunk.id, chunk.size);
//! }
//! # let _ = TernConfig::default();
//! # Ok(()) }
//! ```

mod plugins;

use std::path::Path;
use std::sync::Arc;

pub use plugins::{PluginFactories, PluginFactory, builtin_plugins, configured_plugins};

pub use tern_config::{
    Builtins, ConfigDiscovery, ConfigError, EntryMap, EnvOverrides, HtmlConfig,
    LimitChunkCountConfig, Mode, PluginConfig, TernConfig, discover, load_file,
    load_with_overrides, validate_fs, validate_schema,
};
pub use tern_core::{
    ApplyContext, Asset, AssetStats, BoxError, BoxPlugin, ChunkStats, Compilation,
    CompilationStats, Compiler, CompilerHooks, CompilerOptions, CoreError, FileSystem, FsError,
    MemoryFileSystem, NativeFileSystem, Plugin, PluginPhase, Result,
};
pub use tern_plugin_html::HtmlPlugin;
pub use tern_plugin_limit_chunk_count::LimitChunkCountPlugin;

pub use tern_config as config;
pub use tern_graph as graph;

/// Create a compiler over the real file system with the built-in factories.
pub fn create_compiler(options: CompilerOptions, plugins: Vec<BoxPlugin>) -> Result<Compiler> {
    create_compiler_with(
        options,
        plugins,
        &PluginFactories::with_builtins(),
        Arc::new(NativeFileSystem),
    )
}

/// Create a compiler with explicit factories and file system.
pub fn create_compiler_with(
    options: CompilerOptions,
    plugins: Vec<BoxPlugin>,
    factories: &PluginFactories,
    fs: Arc<dyn FileSystem>,
) -> Result<Compiler> {
    let mut all = builtin_plugins(&options)?;
    all.extend(configured_plugins(&options, factories)?);
    all.extend(plugins);
    tracing::debug!(plugins = all.len(), "creating compiler");
    Compiler::with_file_system(options, all, fs)
}

/// Normalize `config` against `cwd` and create a compiler for it.
pub fn compiler_from_config(
    config: TernConfig,
    cwd: &Path,
    plugins: Vec<BoxPlugin>,
) -> Result<Compiler> {
    create_compiler(CompilerOptions::from_config(config, cwd)?, plugins)
}
