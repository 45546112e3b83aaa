//! Relations between chunks and modules.
//!
//! The chunk graph is split by the side a method starts from, like the
//! module graph in other bundlers:
//!
//! - `chunk` - methods whose subject is a chunk (`ChunkGraphChunk`)
//! - `module` - methods whose subject is a module (`ChunkGraphModule`)

mod chunk;
mod module;

use rustc_hash::FxHashMap;

use crate::chunk::ChunkUkey;
use crate::module::ModuleIdentifier;

pub use chunk::ChunkGraphChunk;
pub use module::ChunkGraphModule;

const DEFAULT_CHUNK_OVERHEAD: u64 = 10_000;
const DEFAULT_ENTRY_CHUNK_MULTIPLICATOR: u64 = 10;

/// Knobs of the chunk size model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkSizeOptions {
    /// Constant cost of every chunk (default 10000).
    pub chunk_overhead: Option<u64>,
    /// Weight of modules in initial chunks (default 10).
    pub entry_chunk_multiplicator: Option<u64>,
}

impl ChunkSizeOptions {
    pub fn chunk_overhead(&self) -> u64 {
        self.chunk_overhead.unwrap_or(DEFAULT_CHUNK_OVERHEAD)
    }

    pub fn entry_chunk_multiplicator(&self) -> u64 {
        self.entry_chunk_multiplicator
            .unwrap_or(DEFAULT_ENTRY_CHUNK_MULTIPLICATOR)
    }
}

#[derive(Debug, Default)]
pub struct ChunkGraph {
    chunk_graph_chunk_by_chunk_ukey: FxHashMap<ChunkUkey, ChunkGraphChunk>,
    chunk_graph_module_by_module_identifier: FxHashMap<ModuleIdentifier, ChunkGraphModule>,
}

impl ChunkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_graph_chunk_by_chunk_ukey.len()
    }
}
