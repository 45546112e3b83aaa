use std::collections::BTreeSet;

use crate::chunk_group::{ChunkGroupByUkey, ChunkGroupUkey};
use crate::database::{Database, DatabaseItem, Ukey};
use crate::error::{GraphError, Result};
use crate::runtime::RuntimeSpec;
use crate::FxIndexSet;

pub type ChunkUkey = Ukey<Chunk>;
pub type ChunkByUkey = Database<Chunk>;

/// An output unit grouping one or more modules.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub ukey: ChunkUkey,
    pub name: Option<String>,
    pub id: Option<String>,
    pub id_name_hints: BTreeSet<String>,
    pub runtime: RuntimeSpec,
    pub files: FxIndexSet<String>,
    /// Chunks with this flag are never merged with another chunk.
    pub prevent_integration: bool,
    pub groups: FxIndexSet<ChunkGroupUkey>,
}

impl DatabaseItem for Chunk {
    const KIND: &'static str = "chunk";

    fn ukey(&self) -> Ukey<Self> {
        self.ukey
    }
}

impl Chunk {
    pub fn new(name: Option<String>) -> Self {
        Self {
            ukey: Ukey::new(),
            name,
            id: None,
            id_name_hints: BTreeSet::new(),
            runtime: RuntimeSpec::default(),
            files: FxIndexSet::default(),
            prevent_integration: false,
            groups: FxIndexSet::default(),
        }
    }

    /// The chunk id; fails if ids have not been assigned yet.
    pub fn require_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or(GraphError::ChunkIdMissing(self.ukey.as_u32()))
    }

    pub fn add_group(&mut self, group: ChunkGroupUkey) -> bool {
        self.groups.insert(group)
    }

    pub fn remove_group(&mut self, group: &ChunkGroupUkey) -> bool {
        self.groups.shift_remove(group)
    }

    pub fn is_in_group(&self, group: &ChunkGroupUkey) -> bool {
        self.groups.contains(group)
    }

    /// Whether any group containing this chunk is loaded initially.
    pub fn can_be_initial(&self, chunk_group_by_ukey: &ChunkGroupByUkey) -> bool {
        self.groups
            .iter()
            .filter_map(|ukey| chunk_group_by_ukey.get(ukey))
            .any(|group| group.is_initial())
    }

    /// Whether every group containing this chunk is loaded initially.
    pub fn is_only_initial(&self, chunk_group_by_ukey: &ChunkGroupByUkey) -> bool {
        !self.groups.is_empty()
            && self
                .groups
                .iter()
                .filter_map(|ukey| chunk_group_by_ukey.get(ukey))
                .all(|group| group.is_initial())
    }

    /// Whether this chunk is the runtime chunk of one of its entrypoints.
    pub fn has_runtime(&self, chunk_group_by_ukey: &ChunkGroupByUkey) -> bool {
        self.groups
            .iter()
            .filter_map(|ukey| chunk_group_by_ukey.get(ukey))
            .any(|group| group.is_initial() && group.get_runtime_chunk() == Some(self.ukey))
    }

    /// Detach from every group, on both sides.
    pub fn disconnect_from_groups(&mut self, chunk_group_by_ukey: &mut ChunkGroupByUkey) {
        for group_ukey in self.groups.drain(..) {
            if let Some(group) = chunk_group_by_ukey.get_mut(&group_ukey) {
                group.remove_chunk(&self.ukey);
            }
        }
    }

    /// Every chunk of every group reachable from this chunk's groups
    /// through child links, this chunk included.
    pub fn get_all_referenced_chunks(
        &self,
        chunk_group_by_ukey: &ChunkGroupByUkey,
    ) -> FxIndexSet<ChunkUkey> {
        let mut chunks = FxIndexSet::default();
        let mut queue: FxIndexSet<ChunkGroupUkey> = self.groups.clone();
        let mut index = 0;
        while let Some(group_ukey) = queue.get_index(index).copied() {
            index += 1;
            let Some(group) = chunk_group_by_ukey.get(&group_ukey) else {
                continue;
            };
            chunks.extend(group.chunks.iter().copied());
            queue.extend(group.children.iter().copied());
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_group::ChunkGroup;

    struct Fixture {
        groups: ChunkGroupByUkey,
        entry: ChunkGroupUkey,
        lazy: ChunkGroupUkey,
        main: Chunk,
        async_chunk: Chunk,
    }

    fn fixture() -> Fixture {
        let mut groups = ChunkGroupByUkey::default();
        let mut main = Chunk::new(Some("main".into()));
        let mut async_chunk = Chunk::new(None);

        let mut entry = ChunkGroup::new_entrypoint(Some("main".into()));
        entry.push_chunk(main.ukey);
        entry.set_runtime_chunk(main.ukey);
        entry.set_entry_point_chunk(main.ukey);
        main.add_group(entry.ukey);

        let mut lazy = ChunkGroup::new_normal(None);
        lazy.push_chunk(async_chunk.ukey);
        async_chunk.add_group(lazy.ukey);

        lazy.add_parent(entry.ukey);
        entry.add_child(lazy.ukey);

        let entry = groups.add(entry);
        let lazy = groups.add(lazy);
        Fixture {
            groups,
            entry,
            lazy,
            main,
            async_chunk,
        }
    }

    #[test]
    fn initial_and_runtime_flags() {
        let f = fixture();
        assert!(f.main.can_be_initial(&f.groups));
        assert!(f.main.is_only_initial(&f.groups));
        assert!(f.main.has_runtime(&f.groups));

        assert!(!f.async_chunk.can_be_initial(&f.groups));
        assert!(!f.async_chunk.is_only_initial(&f.groups));
        assert!(!f.async_chunk.has_runtime(&f.groups));
    }

    #[test]
    fn chunk_without_groups_is_not_only_initial() {
        let groups = ChunkGroupByUkey::default();
        let chunk = Chunk::new(None);
        assert!(!chunk.is_only_initial(&groups));
    }

    #[test]
    fn referenced_chunks_follow_children() {
        let f = fixture();
        let referenced = f.main.get_all_referenced_chunks(&f.groups);
        assert_eq!(
            referenced.into_iter().collect::<Vec<_>>(),
            vec![f.main.ukey, f.async_chunk.ukey]
        );

        let referenced = f.async_chunk.get_all_referenced_chunks(&f.groups);
        assert_eq!(referenced.len(), 1);
    }

    #[test]
    fn disconnect_from_groups_updates_both_sides() {
        let mut f = fixture();
        f.async_chunk.disconnect_from_groups(&mut f.groups);
        assert!(f.async_chunk.groups.is_empty());
        assert!(f.groups.get(&f.lazy).unwrap().chunks.is_empty());
        assert_eq!(f.groups.get(&f.entry).unwrap().chunks, vec![f.main.ukey]);
    }

    #[test]
    fn require_id_before_assignment_fails() {
        let mut chunk = Chunk::new(None);
        assert!(chunk.require_id().is_err());
        chunk.id = Some("0".into());
        assert_eq!(chunk.require_id().unwrap(), "0");
    }
}
