//! Tern plugin that merges chunks until at most `maxChunks` remain.
//!
//! Every pair of chunks that may be merged becomes a candidate. Candidates
//! are ranked by how much merging saves under the chunk size model
//! (`overhead + modules * (initial ? multiplicator : 1)`), and the best one
//! is merged first. Merging a pair invalidates the candidates of both chunks:
//! those of the surviving chunk are dropped, those of the absorbed chunk are
//! retargeted to the survivor with recomputed sizes.
//!
//! ```text
//! chunks ── pairs ── LazyBucketSortedSet ── pop best ── integrate ── retarget
//!                          ▲                                            │
//!                          └────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tern_core::tern_config::LimitChunkCountConfig;
//! use tern_plugin_limit_chunk_count::LimitChunkCountPlugin;
//!
//! let plugin = LimitChunkCountPlugin::new(LimitChunkCountConfig::new(5)).unwrap();
//! assert_eq!(plugin.max_chunks(), 5);
//!
//! assert!(LimitChunkCountPlugin::new(LimitChunkCountConfig::new(0)).is_err());
//! ```

mod chunk_combination;
mod lazy_bucket_sorted_set;

use async_trait::async_trait;
use rustc_hash::{FxHashMap, FxHashSet};
use tern_core::tern_config::LimitChunkCountConfig;
use tern_core::tern_graph::{ChunkGroupUkey, ChunkSizeOptions, ChunkUkey, FxIndexSet};
use tern_core::{Compilation, CoreError, Plugin, PluginPhase, Result};

use crate::chunk_combination::{
    ChunkCombination, ChunkCombinationByUkey, ChunkCombinationUkey, size_diff,
};
use crate::lazy_bucket_sorted_set::LazyBucketSortedSet;

pub const PLUGIN_NAME: &str = "LimitChunkCountPlugin";

/// Limits the number of chunks by merging the cheapest pairs.
#[derive(Debug, Clone)]
pub struct LimitChunkCountPlugin {
    options: LimitChunkCountConfig,
}

impl LimitChunkCountPlugin {
    /// Fails when `max_chunks` is below 1.
    pub fn new(options: LimitChunkCountConfig) -> Result<Self> {
        if options.max_chunks < 1 {
            return Err(CoreError::InvalidOptions(format!(
                "{PLUGIN_NAME}: maxChunks must be at least 1, got {}",
                options.max_chunks
            )));
        }
        Ok(Self { options })
    }

    pub fn max_chunks(&self) -> usize {
        self.options.max_chunks as usize
    }

    fn size_options(&self) -> ChunkSizeOptions {
        ChunkSizeOptions {
            chunk_overhead: self.options.chunk_overhead,
            entry_chunk_multiplicator: self.options.entry_chunk_multiplicator,
        }
    }

    /// One pass of merging. Returns whether any chunk was merged.
    fn limit_chunk_count(&self, compilation: &mut Compilation) -> Result<bool> {
        let max_chunks = self.max_chunks();
        let chunk_count = compilation.chunk_count();
        if chunk_count <= max_chunks {
            return Ok(false);
        }
        let mut remaining_chunks_to_merge = chunk_count - max_chunks;
        let size_options = self.size_options();

        let Compilation {
            module_graph,
            chunk_graph,
            chunk_by_ukey,
            chunk_group_by_ukey,
            ..
        } = compilation;

        let ordered_chunks = chunk_graph.sort_chunks(chunk_by_ukey.keys().copied())?;
        let mut chunk_sizes = Vec::with_capacity(ordered_chunks.len());
        for ukey in &ordered_chunks {
            let chunk = chunk_by_ukey.require(ukey)?;
            chunk_sizes.push(chunk_graph.get_chunk_size(
                chunk,
                &size_options,
                module_graph,
                chunk_group_by_ukey,
            )?);
        }

        let mut combinations_db = ChunkCombinationByUkey::default();
        let mut combinations = LazyBucketSortedSet::new();
        let mut combinations_by_chunk: FxHashMap<ChunkUkey, FxIndexSet<ChunkCombinationUkey>> =
            FxHashMap::default();

        for (b_idx, b) in ordered_chunks.iter().enumerate() {
            let chunk_b = chunk_by_ukey.require(b)?;
            for (a_idx, a) in ordered_chunks[..b_idx].iter().enumerate() {
                let chunk_a = chunk_by_ukey.require(a)?;
                if !chunk_graph.can_chunks_be_integrated(chunk_group_by_ukey, chunk_a, chunk_b)? {
                    continue;
                }
                let integrated_size = chunk_graph.get_integrated_chunks_size(
                    chunk_a,
                    chunk_b,
                    &size_options,
                    module_graph,
                    chunk_group_by_ukey,
                )?;
                let ukey = combinations_db.add(ChunkCombination::new(
                    (*a, a_idx, chunk_sizes[a_idx]),
                    (*b, b_idx, chunk_sizes[b_idx]),
                    integrated_size,
                ));
                combinations.add(ukey);
                combinations_by_chunk.entry(*a).or_default().insert(ukey);
                combinations_by_chunk.entry(*b).or_default().insert(ukey);
            }
        }
        tracing::debug!(
            chunks = chunk_count,
            max_chunks,
            combinations = combinations.len(),
            "limiting chunk count"
        );

        let mut modified_chunks: FxHashSet<ChunkUkey> = FxHashSet::default();
        let mut changed = false;

        while let Some(combination_ukey) = combinations.pop_first(&combinations_db) {
            let combination = combinations_db.require_mut(&combination_ukey)?;
            combination.deleted = true;
            let (a, b) = (combination.a, combination.b);
            let integrated_size = combination.integrated_size;

            // Merging next to an already modified chunk could undo the
            // savings computed for it; spend budget on this pair instead.
            if !modified_chunks.is_empty() {
                let chunk_a = chunk_by_ukey.require(&a)?;
                let chunk_b = chunk_by_ukey.require(&b)?;
                let mut queue: FxIndexSet<ChunkGroupUkey> =
                    chunk_a.groups.iter().chain(chunk_b.groups.iter()).copied().collect();
                let mut index = 0;
                let mut blocked = false;
                while let Some(group_ukey) = queue.get_index(index).copied() {
                    index += 1;
                    blocked = modified_chunks.iter().any(|modified| {
                        *modified != a
                            && *modified != b
                            && chunk_by_ukey
                                .get(modified)
                                .is_some_and(|chunk| chunk.is_in_group(&group_ukey))
                    });
                    if blocked {
                        break;
                    }
                    if let Some(group) = chunk_group_by_ukey.get(&group_ukey) {
                        queue.extend(group.parents.iter().copied());
                    }
                }
                if blocked {
                    remaining_chunks_to_merge -= 1;
                    if remaining_chunks_to_merge == 0 {
                        break;
                    }
                    modified_chunks.insert(a);
                    modified_chunks.insert(b);
                    continue;
                }
            }

            let can_integrate = chunk_graph.can_chunks_be_integrated(
                chunk_group_by_ukey,
                chunk_by_ukey.require(&a)?,
                chunk_by_ukey.require(&b)?,
            )?;
            if !can_integrate {
                continue;
            }

            let Some(mut chunk_b) = chunk_by_ukey.remove(&b) else {
                continue;
            };
            let chunk_a = chunk_by_ukey.require_mut(&a)?;
            chunk_graph.integrate_chunks(chunk_a, &mut chunk_b, chunk_group_by_ukey)?;

            modified_chunks.insert(a);
            changed = true;
            remaining_chunks_to_merge -= 1;
            if remaining_chunks_to_merge == 0 {
                break;
            }

            // The other candidates of `a` were sized for the old `a`.
            for stale in combinations_by_chunk.remove(&a).unwrap_or_default() {
                if combinations_db.require(&stale)?.deleted {
                    continue;
                }
                combinations.delete(&stale, &combinations_db);
                combinations_db.require_mut(&stale)?.deleted = true;
            }

            // Candidates of `b` now pair the other chunk with `a`.
            let retargeted = combinations_by_chunk.remove(&b).unwrap_or_default();
            for ukey in &retargeted {
                let combination = combinations_db.require(ukey)?;
                if combination.deleted {
                    continue;
                }
                let b_was_first = combination.a == b;
                let other = if b_was_first { combination.b } else { combination.a };

                let chunk_a = chunk_by_ukey.require(&a)?;
                let chunk_other = chunk_by_ukey.require(&other)?;
                let (first, second) = if b_was_first {
                    (chunk_a, chunk_other)
                } else {
                    (chunk_other, chunk_a)
                };
                if !chunk_graph.can_chunks_be_integrated(chunk_group_by_ukey, first, second)? {
                    combinations.delete(ukey, &combinations_db);
                    combinations_db.require_mut(ukey)?.deleted = true;
                    continue;
                }
                let new_integrated_size = chunk_graph.get_integrated_chunks_size(
                    first,
                    second,
                    &size_options,
                    module_graph,
                    chunk_group_by_ukey,
                )?;

                let update = combinations.start_update(*ukey, &combinations_db);
                let combination = combinations_db.require_mut(ukey)?;
                if b_was_first {
                    combination.a = a;
                    combination.a_size = integrated_size;
                    combination.size_diff =
                        size_diff(combination.b_size, integrated_size, new_integrated_size);
                } else {
                    combination.b = a;
                    combination.b_size = integrated_size;
                    combination.size_diff =
                        size_diff(combination.a_size, integrated_size, new_integrated_size);
                }
                combination.integrated_size = new_integrated_size;
                combinations.finish_update(update);
            }
            combinations_by_chunk.insert(a, retargeted);
        }

        if changed {
            tracing::debug!(
                chunks = chunk_by_ukey.len(),
                max_chunks,
                "merged chunks"
            );
        }
        Ok(changed)
    }
}

#[async_trait]
impl Plugin for LimitChunkCountPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn phase(&self) -> PluginPhase {
        PluginPhase::Optimize
    }

    async fn optimize_chunks(&self, compilation: &mut Compilation) -> Result<bool> {
        self.limit_chunk_count(compilation)
    }
}
