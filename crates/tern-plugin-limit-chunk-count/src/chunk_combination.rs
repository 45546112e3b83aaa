use tern_core::tern_graph::{ChunkUkey, Database, DatabaseItem, Ukey};

use crate::lazy_bucket_sorted_set::BucketKeys;

pub(crate) type ChunkCombinationUkey = Ukey<ChunkCombination>;
pub(crate) type ChunkCombinationByUkey = Database<ChunkCombination>;

/// A candidate merge of chunk `b` into chunk `a`.
#[derive(Debug, Clone)]
pub(crate) struct ChunkCombination {
    pub ukey: ChunkCombinationUkey,
    pub deleted: bool,
    /// `a_size + b_size - integrated_size`: what merging saves.
    pub size_diff: i64,
    pub integrated_size: u64,
    pub a: ChunkUkey,
    pub b: ChunkUkey,
    pub a_idx: usize,
    pub b_idx: usize,
    pub a_size: u64,
    pub b_size: u64,
}

impl DatabaseItem for ChunkCombination {
    const KIND: &'static str = "chunk combination";

    fn ukey(&self) -> Ukey<Self> {
        self.ukey
    }
}

impl ChunkCombination {
    pub fn new(
        (a, a_idx, a_size): (ChunkUkey, usize, u64),
        (b, b_idx, b_size): (ChunkUkey, usize, u64),
        integrated_size: u64,
    ) -> Self {
        Self {
            ukey: Ukey::new(),
            deleted: false,
            size_diff: size_diff(a_size, b_size, integrated_size),
            integrated_size,
            a,
            b,
            a_idx,
            b_idx,
            a_size,
            b_size,
        }
    }
}

pub(crate) fn size_diff(a_size: u64, b_size: u64, integrated_size: u64) -> i64 {
    signed(a_size)
        .saturating_add(signed(b_size))
        .saturating_sub(signed(integrated_size))
}

fn signed(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}

/// Largest saving first, then the smallest merged chunk, then the pair that
/// sits closest together in chunk order.
///
/// Combinations are only flagged `deleted`, never removed from the database,
/// so every queued key resolves.
impl BucketKeys<ChunkCombinationUkey> for ChunkCombinationByUkey {
    fn depth(&self) -> usize {
        3
    }

    fn bucket_key(&self, item: &ChunkCombinationUkey, layer: usize) -> i64 {
        let Some(combination) = self.get(item) else {
            return 0;
        };
        match layer {
            0 => -combination.size_diff,
            1 => signed(combination.integrated_size),
            _ => signed(combination.b_idx.saturating_sub(combination.a_idx) as u64),
        }
    }

    fn leaf_key(&self, item: &ChunkCombinationUkey) -> i64 {
        self.get(item)
            .map_or(0, |combination| signed(combination.b_idx as u64))
    }
}
