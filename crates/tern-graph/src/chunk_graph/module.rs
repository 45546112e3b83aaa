//! Methods whose subject is a module.

use super::ChunkGraph;
use crate::chunk::ChunkUkey;
use crate::module::ModuleIdentifier;
use crate::FxIndexSet;

#[derive(Debug, Clone, Default)]
pub struct ChunkGraphModule {
    pub chunks: FxIndexSet<ChunkUkey>,
    pub entry_in_chunks: FxIndexSet<ChunkUkey>,
    pub runtime_in_chunks: FxIndexSet<ChunkUkey>,
}

impl ChunkGraph {
    /// Register a module. Connecting a module to a chunk registers it too.
    pub fn add_module(&mut self, module_identifier: ModuleIdentifier) {
        self.chunk_graph_module_by_module_identifier
            .entry(module_identifier)
            .or_default();
    }

    pub fn get_chunk_graph_module(
        &self,
        module_identifier: &ModuleIdentifier,
    ) -> Option<&ChunkGraphModule> {
        self.chunk_graph_module_by_module_identifier
            .get(module_identifier)
    }

    pub(crate) fn get_chunk_graph_module_mut(
        &mut self,
        module_identifier: ModuleIdentifier,
    ) -> &mut ChunkGraphModule {
        self.chunk_graph_module_by_module_identifier
            .entry(module_identifier)
            .or_default()
    }

    pub fn get_module_chunks(&self, module_identifier: &ModuleIdentifier) -> Vec<ChunkUkey> {
        self.get_chunk_graph_module(module_identifier)
            .map(|cgm| cgm.chunks.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn get_number_of_module_chunks(&self, module_identifier: &ModuleIdentifier) -> usize {
        self.get_chunk_graph_module(module_identifier)
            .map(|cgm| cgm.chunks.len())
            .unwrap_or(0)
    }

    pub fn is_module_in_chunk(&self, module_identifier: &ModuleIdentifier, chunk: &ChunkUkey) -> bool {
        self.get_chunk_graph_module(module_identifier)
            .is_some_and(|cgm| cgm.chunks.contains(chunk))
    }

    pub fn is_entry_module(&self, module_identifier: &ModuleIdentifier) -> bool {
        self.get_chunk_graph_module(module_identifier)
            .is_some_and(|cgm| !cgm.entry_in_chunks.is_empty())
    }
}
