//! # tern-core
//!
//! The compiler of the tern bundler.
//!
//! ## Lifecycle
//!
//! ```text
//! Compiler::new ─ apply plugins ─ entryOption(context, entry)
//!       │
//! compile ─ seed module graph ─ entrypoints ─ optimizeChunks* ─ chunk ids ─ processAssets
//! ```
//!
//! `optimizeChunks` repeats until no plugin reports a change.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use tern_config::TernConfig;
//! use tern_core::{Compiler, CompilerOptions};
//!
//! # async fn run() -> tern_core::Result<()> {
//! let mut config = TernConfig::default();
//! config.entry.insert("main".into(), "./src/index.js".into());
//!
//! let options = CompilerOptions::from_config(config, Path::new("/project"))?;
//! let compiler = Compiler::new(options, Vec::new())?;
//! let compilation = compiler.compile().await?;
//! assert_eq!(compilation.chunk_count(), 1);
//! # Ok(())
//! # }
//! ```

mod compilation;
mod compiler;
mod error;
pub mod fs;
mod hooks;
mod options;
mod plugin;
mod registry;

pub use compilation::{Asset, AssetStats, ChunkStats, Compilation, CompilationStats};
pub use compiler::Compiler;
pub use error::{BoxError, CoreError, Result};
pub use fs::{FileSystem, FsError, MemoryFileSystem, NativeFileSystem};
pub use hooks::{CompilerHooks, EntryOptionHook};
pub use options::{CompilerOptions, OutputOptions};
pub use plugin::{ApplyContext, BoxPlugin, Plugin};
pub use registry::{PluginPhase, PluginRegistry};

// Re-exported so plugin crates depend on one version of each.
pub use tern_config;
pub use tern_graph;
