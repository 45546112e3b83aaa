use crate::chunk::ChunkUkey;
use crate::database::{Database, DatabaseItem, Ukey};
use crate::FxIndexSet;

pub type ChunkGroupUkey = Ukey<ChunkGroup>;
pub type ChunkGroupByUkey = Database<ChunkGroup>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkGroupKind {
    /// Loaded by the page itself; carries the runtime.
    Entrypoint,
    /// Loaded on demand by a parent group.
    Normal,
}

/// A set of chunks that are loaded together.
#[derive(Debug, Clone)]
pub struct ChunkGroup {
    pub ukey: ChunkGroupUkey,
    pub kind: ChunkGroupKind,
    pub name: Option<String>,
    pub chunks: Vec<ChunkUkey>,
    pub parents: FxIndexSet<ChunkGroupUkey>,
    pub children: FxIndexSet<ChunkGroupUkey>,
    runtime_chunk: Option<ChunkUkey>,
    entry_point_chunk: Option<ChunkUkey>,
}

impl DatabaseItem for ChunkGroup {
    const KIND: &'static str = "chunk group";

    fn ukey(&self) -> Ukey<Self> {
        self.ukey
    }
}

impl ChunkGroup {
    fn new(kind: ChunkGroupKind, name: Option<String>) -> Self {
        Self {
            ukey: Ukey::new(),
            kind,
            name,
            chunks: Vec::new(),
            parents: FxIndexSet::default(),
            children: FxIndexSet::default(),
            runtime_chunk: None,
            entry_point_chunk: None,
        }
    }

    pub fn new_entrypoint(name: Option<String>) -> Self {
        Self::new(ChunkGroupKind::Entrypoint, name)
    }

    pub fn new_normal(name: Option<String>) -> Self {
        Self::new(ChunkGroupKind::Normal, name)
    }

    pub fn is_initial(&self) -> bool {
        matches!(self.kind, ChunkGroupKind::Entrypoint)
    }

    /// Append a chunk. Returns `false` if it was already a member.
    pub fn push_chunk(&mut self, chunk: ChunkUkey) -> bool {
        if self.chunks.contains(&chunk) {
            return false;
        }
        self.chunks.push(chunk);
        true
    }

    /// Move (or insert) a chunk to the front. Returns `false` if it already
    /// was first.
    pub fn unshift_chunk(&mut self, chunk: ChunkUkey) -> bool {
        match self.chunks.iter().position(|c| *c == chunk) {
            Some(0) => false,
            Some(index) => {
                self.chunks.remove(index);
                self.chunks.insert(0, chunk);
                true
            }
            None => {
                self.chunks.insert(0, chunk);
                true
            }
        }
    }

    /// Put `new_chunk` where `old_chunk` was. If `new_chunk` is already a
    /// member, the earlier of the two positions is kept and the other
    /// dropped.
    pub fn replace_chunk(&mut self, old_chunk: ChunkUkey, new_chunk: ChunkUkey) -> bool {
        if self.runtime_chunk == Some(old_chunk) {
            self.runtime_chunk = Some(new_chunk);
        }
        if self.entry_point_chunk == Some(old_chunk) {
            self.entry_point_chunk = Some(new_chunk);
        }

        let Some(index) = self.chunks.iter().position(|c| *c == old_chunk) else {
            return false;
        };
        match self.chunks.iter().position(|c| *c == new_chunk) {
            None => {
                self.chunks[index] = new_chunk;
            }
            Some(new_index) if new_index < index => {
                self.chunks.remove(index);
            }
            Some(new_index) if new_index != index => {
                self.chunks[index] = new_chunk;
                self.chunks.remove(new_index);
            }
            Some(_) => {}
        }
        true
    }

    pub fn remove_chunk(&mut self, chunk: &ChunkUkey) -> bool {
        match self.chunks.iter().position(|c| c == chunk) {
            Some(index) => {
                self.chunks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn add_parent(&mut self, parent: ChunkGroupUkey) -> bool {
        self.parents.insert(parent)
    }

    pub fn add_child(&mut self, child: ChunkGroupUkey) -> bool {
        self.children.insert(child)
    }

    pub fn set_runtime_chunk(&mut self, chunk: ChunkUkey) {
        self.runtime_chunk = Some(chunk);
    }

    /// Chunk carrying the runtime; only entrypoints have one.
    pub fn get_runtime_chunk(&self) -> Option<ChunkUkey> {
        self.runtime_chunk
    }

    pub fn set_entry_point_chunk(&mut self, chunk: ChunkUkey) {
        self.entry_point_chunk = Some(chunk);
    }

    pub fn get_entry_point_chunk(&self) -> Option<ChunkUkey> {
        self.entry_point_chunk
    }
}
