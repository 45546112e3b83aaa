//! Error types for graph lookups and mutations.

use thiserror::Error;

use crate::module::ModuleIdentifier;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A keyed arena was asked for an item it does not hold.
    #[error("{kind} not found: #{key}")]
    ItemNotFound { kind: &'static str, key: u32 },

    /// A chunk was used before `ChunkGraph::add_chunk` registered it.
    #[error("chunk #{0} has not been added to the chunk graph")]
    ChunkNotInGraph(u32),

    #[error("module not found: {0}")]
    ModuleNotFound(ModuleIdentifier),

    /// Chunk ids are assigned late; reading one earlier is a pipeline bug.
    #[error("chunk #{0} has no id assigned yet")]
    ChunkIdMissing(u32),
}
