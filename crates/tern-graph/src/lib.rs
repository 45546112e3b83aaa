//! # tern-graph
//!
//! Graph data structures for the tern bundler: modules, chunks, chunk groups
//! and the chunk graph that links them.
//!
//! ## Overview
//!
//! - **Keyed arenas**: chunks and chunk groups live in a [`Database`] and refer
//!   to each other through copyable [`Ukey`]s, so no reference cycles exist.
//! - **Module graph**: [`ModuleGraph`] stores modules with per source type
//!   sizes and their outgoing dependencies.
//! - **Chunk graph**: [`ChunkGraph`] records which modules live in which chunks,
//!   which modules are entry modules, and answers the sizing and integration
//!   questions chunk optimizations ask.
//!
//! ## Architecture
//!
//! ```text
//!   ChunkGroupByUkey ──parents/children──┐
//!        │  chunks                       │
//!        ▼                               │
//!   ChunkByUkey ──groups─────────────────┘
//!        │
//!        ▼
//!   ChunkGraph ──modules──▶ ModuleGraph
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use tern_graph::{
//!     Chunk, ChunkByUkey, ChunkGraph, ChunkGroup, ChunkGroupByUkey, Module, ModuleGraph,
//!     SourceType,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut module_graph = ModuleGraph::new();
//! module_graph.add_module(Module::builder("/src/index.js").size(SourceType::JavaScript, 120).build());
//!
//! let mut chunks = ChunkByUkey::default();
//! let mut groups = ChunkGroupByUkey::default();
//! let mut chunk_graph = ChunkGraph::default();
//!
//! let mut entrypoint = ChunkGroup::new_entrypoint(Some("main".into()));
//! let mut chunk = Chunk::new(Some("main".into()));
//! chunk.add_group(entrypoint.ukey);
//! entrypoint.push_chunk(chunk.ukey);
//! entrypoint.set_runtime_chunk(chunk.ukey);
//! entrypoint.set_entry_point_chunk(chunk.ukey);
//!
//! chunk_graph.add_chunk(chunk.ukey);
//! chunk_graph.connect_chunk_and_module(chunk.ukey, "/src/index.js".into())?;
//! let size = chunk_graph.get_chunk_modules_size(&chunk.ukey, &module_graph)?;
//! assert_eq!(size, 120);
//!
//! chunks.add(chunk);
//! groups.add(entrypoint);
//! # Ok(())
//! # }
//! ```

mod chunk;
mod chunk_graph;
mod chunk_group;
pub mod comparators;
mod database;
mod error;
mod module;
mod module_graph;
mod runtime;

pub use chunk::{Chunk, ChunkByUkey, ChunkUkey};
pub use chunk_graph::{ChunkGraph, ChunkGraphChunk, ChunkGraphModule, ChunkSizeOptions};
pub use chunk_group::{ChunkGroup, ChunkGroupByUkey, ChunkGroupKind, ChunkGroupUkey};
pub use database::{Database, DatabaseItem, Ukey};
pub use error::{GraphError, Result};
pub use module::{Module, ModuleBuilder, ModuleIdentifier, SourceType};
pub use module_graph::{find_graph_roots, ModuleGraph};
pub use runtime::{merge_runtime, RuntimeGlobals, RuntimeSpec};

/// Insertion-ordered set with the Fx hasher.
pub type FxIndexSet<T> = indexmap::IndexSet<T, rustc_hash::FxBuildHasher>;

/// Insertion-ordered map with the Fx hasher.
pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, rustc_hash::FxBuildHasher>;
