//! Methods whose subject is a chunk.

use std::cmp::Ordering;

use super::{ChunkGraph, ChunkSizeOptions};
use crate::chunk::{Chunk, ChunkByUkey, ChunkUkey};
use crate::chunk_group::{ChunkGroupByUkey, ChunkGroupUkey};
use crate::comparators::{compare_modules_by_identifier, compare_modules_by_identifier_iter};
use crate::error::{GraphError, Result};
use crate::module::{Module, ModuleIdentifier, SourceType};
use crate::module_graph::{find_graph_roots, ModuleGraph};
use crate::runtime::{merge_runtime, RuntimeGlobals};
use crate::{FxIndexMap, FxIndexSet};

#[derive(Debug, Clone, Default)]
pub struct ChunkGraphChunk {
    /// Entry module => the entrypoint it starts.
    ///
    /// Ordered to keep the order of the `entry` configuration.
    pub(crate) entry_modules: FxIndexMap<ModuleIdentifier, ChunkGroupUkey>,
    pub modules: FxIndexSet<ModuleIdentifier>,
    pub(crate) runtime_requirements: RuntimeGlobals,
    pub(crate) runtime_modules: Vec<ModuleIdentifier>,
}

impl ChunkGraph {
    pub fn add_chunk(&mut self, chunk_ukey: ChunkUkey) {
        self.chunk_graph_chunk_by_chunk_ukey
            .entry(chunk_ukey)
            .or_default();
    }

    /// Forget a chunk: its module links and its own record.
    pub fn remove_chunk(&mut self, chunk_ukey: &ChunkUkey) -> Option<ChunkGraphChunk> {
        let cgc = self.chunk_graph_chunk_by_chunk_ukey.remove(chunk_ukey)?;
        for module in cgc
            .modules
            .iter()
            .chain(cgc.entry_modules.keys())
            .chain(cgc.runtime_modules.iter())
        {
            if let Some(cgm) = self.chunk_graph_module_by_module_identifier.get_mut(module) {
                cgm.chunks.shift_remove(chunk_ukey);
                cgm.entry_in_chunks.shift_remove(chunk_ukey);
                cgm.runtime_in_chunks.shift_remove(chunk_ukey);
            }
        }
        Some(cgc)
    }

    pub fn contains_chunk(&self, chunk_ukey: &ChunkUkey) -> bool {
        self.chunk_graph_chunk_by_chunk_ukey.contains_key(chunk_ukey)
    }

    pub(crate) fn get_chunk_graph_chunk(&self, chunk_ukey: &ChunkUkey) -> Result<&ChunkGraphChunk> {
        self.chunk_graph_chunk_by_chunk_ukey
            .get(chunk_ukey)
            .ok_or(GraphError::ChunkNotInGraph(chunk_ukey.as_u32()))
    }

    pub(crate) fn get_chunk_graph_chunk_mut(
        &mut self,
        chunk_ukey: &ChunkUkey,
    ) -> Result<&mut ChunkGraphChunk> {
        self.chunk_graph_chunk_by_chunk_ukey
            .get_mut(chunk_ukey)
            .ok_or(GraphError::ChunkNotInGraph(chunk_ukey.as_u32()))
    }

    pub fn get_chunk_entry_modules(&self, chunk_ukey: &ChunkUkey) -> Result<Vec<ModuleIdentifier>> {
        let cgc = self.get_chunk_graph_chunk(chunk_ukey)?;
        Ok(cgc.entry_modules.keys().cloned().collect())
    }

    pub fn get_chunk_entry_modules_with_chunk_group_iterable(
        &self,
        chunk_ukey: &ChunkUkey,
    ) -> Result<&FxIndexMap<ModuleIdentifier, ChunkGroupUkey>> {
        Ok(&self.get_chunk_graph_chunk(chunk_ukey)?.entry_modules)
    }

    pub fn connect_chunk_and_entry_module(
        &mut self,
        chunk: ChunkUkey,
        module_identifier: ModuleIdentifier,
        entrypoint: ChunkGroupUkey,
    ) -> Result<()> {
        self.get_chunk_graph_chunk_mut(&chunk)?
            .entry_modules
            .insert(module_identifier.clone(), entrypoint);
        self.get_chunk_graph_module_mut(module_identifier)
            .entry_in_chunks
            .insert(chunk);
        Ok(())
    }

    pub fn disconnect_chunk_and_entry_module(
        &mut self,
        chunk: ChunkUkey,
        module_identifier: ModuleIdentifier,
    ) -> Result<()> {
        self.get_chunk_graph_chunk_mut(&chunk)?
            .entry_modules
            .shift_remove(&module_identifier);
        self.get_chunk_graph_module_mut(module_identifier)
            .entry_in_chunks
            .shift_remove(&chunk);
        Ok(())
    }

    pub fn connect_chunk_and_module(
        &mut self,
        chunk: ChunkUkey,
        module_identifier: ModuleIdentifier,
    ) -> Result<()> {
        self.get_chunk_graph_chunk_mut(&chunk)?
            .modules
            .insert(module_identifier.clone());
        self.get_chunk_graph_module_mut(module_identifier)
            .chunks
            .insert(chunk);
        Ok(())
    }

    pub fn disconnect_chunk_and_module(
        &mut self,
        chunk: &ChunkUkey,
        module_identifier: ModuleIdentifier,
    ) -> Result<()> {
        self.get_chunk_graph_chunk_mut(chunk)?
            .modules
            .shift_remove(&module_identifier);
        self.get_chunk_graph_module_mut(module_identifier)
            .chunks
            .shift_remove(chunk);
        Ok(())
    }

    pub fn connect_chunk_and_runtime_module(
        &mut self,
        chunk: ChunkUkey,
        identifier: ModuleIdentifier,
    ) -> Result<()> {
        let cgc = self.get_chunk_graph_chunk_mut(&chunk)?;
        if !cgc.runtime_modules.contains(&identifier) {
            cgc.runtime_modules.push(identifier.clone());
        }
        self.get_chunk_graph_module_mut(identifier)
            .runtime_in_chunks
            .insert(chunk);
        Ok(())
    }

    /// Modules of a chunk that exist in the module graph.
    pub fn get_chunk_modules<'module>(
        &self,
        chunk: &ChunkUkey,
        module_graph: &'module ModuleGraph,
    ) -> Result<Vec<&'module Module>> {
        let cgc = self.get_chunk_graph_chunk(chunk)?;
        Ok(cgc
            .modules
            .iter()
            .filter_map(|identifier| module_graph.module_by_identifier(identifier))
            .collect())
    }

    pub fn get_chunk_module_identifiers(
        &self,
        chunk: &ChunkUkey,
    ) -> Result<&FxIndexSet<ModuleIdentifier>> {
        Ok(&self.get_chunk_graph_chunk(chunk)?.modules)
    }

    /// [`ChunkGraph::get_chunk_modules`] sorted by identifier.
    pub fn get_ordered_chunk_modules<'module>(
        &self,
        chunk: &ChunkUkey,
        module_graph: &'module ModuleGraph,
    ) -> Result<Vec<&'module Module>> {
        let mut modules = self.get_chunk_modules(chunk, module_graph)?;
        modules.sort_unstable_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(modules)
    }

    pub fn get_chunk_modules_by_source_type<'module>(
        &self,
        chunk: &ChunkUkey,
        source_type: SourceType,
        module_graph: &'module ModuleGraph,
    ) -> Result<Vec<&'module Module>> {
        Ok(self
            .get_chunk_modules(chunk, module_graph)?
            .into_iter()
            .filter(|module| module.source_types().any(|t| t == source_type))
            .collect())
    }

    pub fn get_chunk_modules_size(&self, chunk: &ChunkUkey, module_graph: &ModuleGraph) -> Result<u64> {
        let cgc = self.get_chunk_graph_chunk(chunk)?;
        Ok(self.get_modules_size(cgc.modules.iter(), module_graph))
    }

    pub fn get_number_of_chunk_modules(&self, chunk: &ChunkUkey) -> Result<usize> {
        Ok(self.get_chunk_graph_chunk(chunk)?.modules.len())
    }

    pub fn get_number_of_entry_modules(&self, chunk: &ChunkUkey) -> Result<usize> {
        Ok(self.get_chunk_graph_chunk(chunk)?.entry_modules.len())
    }

    pub fn add_chunk_runtime_requirements(
        &mut self,
        chunk_ukey: &ChunkUkey,
        runtime_requirements: RuntimeGlobals,
    ) -> Result<()> {
        self.get_chunk_graph_chunk_mut(chunk_ukey)?
            .runtime_requirements
            .insert(runtime_requirements);
        Ok(())
    }

    pub fn add_tree_runtime_requirements(
        &mut self,
        chunk_ukey: &ChunkUkey,
        runtime_requirements: RuntimeGlobals,
    ) -> Result<()> {
        self.add_chunk_runtime_requirements(chunk_ukey, runtime_requirements)
    }

    pub fn get_chunk_runtime_requirements(&self, chunk_ukey: &ChunkUkey) -> Result<RuntimeGlobals> {
        Ok(self.get_chunk_graph_chunk(chunk_ukey)?.runtime_requirements)
    }

    pub fn get_chunk_runtime_modules_in_order(
        &self,
        chunk_ukey: &ChunkUkey,
    ) -> Result<&[ModuleIdentifier]> {
        Ok(&self.get_chunk_graph_chunk(chunk_ukey)?.runtime_modules)
    }

    /// Map the id of every chunk referenced by `chunk_ukey` to `filter`'s
    /// verdict for it.
    pub fn get_chunk_condition_map<F>(
        &self,
        chunk_ukey: &ChunkUkey,
        chunk_by_ukey: &ChunkByUkey,
        chunk_group_by_ukey: &ChunkGroupByUkey,
        module_graph: &ModuleGraph,
        filter: F,
    ) -> Result<FxIndexMap<String, bool>>
    where
        F: Fn(&ChunkUkey, &ChunkGraph, &ModuleGraph) -> bool,
    {
        let chunk = chunk_by_ukey.require(chunk_ukey)?;
        let mut map = FxIndexMap::default();
        for referenced in chunk.get_all_referenced_chunks(chunk_group_by_ukey) {
            let referenced_chunk = chunk_by_ukey.require(&referenced)?;
            map.insert(
                referenced_chunk.require_id()?.to_string(),
                filter(&referenced, self, module_graph),
            );
        }
        Ok(map)
    }

    /// Modules of the chunk that no other module of the chunk depends on.
    pub fn get_chunk_root_modules(
        &self,
        chunk: &ChunkUkey,
        module_graph: &ModuleGraph,
    ) -> Result<Vec<ModuleIdentifier>> {
        let cgc = self.get_chunk_graph_chunk(chunk)?;
        let mut input: Vec<ModuleIdentifier> = cgc.modules.iter().cloned().collect();
        input.sort_unstable();
        Ok(find_graph_roots(input, |module| {
            module_graph
                .get_outgoing_connections(module)
                .map(|deps| deps.to_vec())
                .unwrap_or_default()
        }))
    }

    /// Drop all module links of a chunk and detach it from its groups.
    pub fn disconnect_chunk(
        &mut self,
        chunk: &mut Chunk,
        chunk_group_by_ukey: &mut ChunkGroupByUkey,
    ) -> Result<()> {
        let cgc = self.get_chunk_graph_chunk_mut(&chunk.ukey)?;
        let modules = std::mem::take(&mut cgc.modules);
        for module in modules {
            self.get_chunk_graph_module_mut(module)
                .chunks
                .shift_remove(&chunk.ukey);
        }
        chunk.disconnect_from_groups(chunk_group_by_ukey);
        Ok(())
    }

    /// Whether an entrypoint started by this chunk spans other chunks.
    pub fn has_chunk_entry_dependent_chunks(
        &self,
        chunk_ukey: &ChunkUkey,
        chunk_group_by_ukey: &ChunkGroupByUkey,
    ) -> Result<bool> {
        let cgc = self.get_chunk_graph_chunk(chunk_ukey)?;
        for chunk_group_ukey in cgc.entry_modules.values() {
            let chunk_group = chunk_group_by_ukey.require(chunk_group_ukey)?;
            if chunk_group.chunks.iter().any(|c| c != chunk_ukey) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Chunks that must be loaded before the entry modules of this chunk's
    /// entrypoints can run, excluding runtime chunks.
    pub fn get_chunk_entry_dependent_chunks(
        &self,
        chunk_ukey: &ChunkUkey,
        chunk_by_ukey: &ChunkByUkey,
        chunk_group_by_ukey: &ChunkGroupByUkey,
    ) -> Result<FxIndexSet<ChunkUkey>> {
        let chunk = chunk_by_ukey.require(chunk_ukey)?;
        let mut set = FxIndexSet::default();
        for chunk_group_ukey in chunk.groups.iter() {
            let chunk_group = chunk_group_by_ukey.require(chunk_group_ukey)?;
            if !chunk_group.is_initial() {
                continue;
            }
            let Some(entry_point_chunk) = chunk_group.get_entry_point_chunk() else {
                continue;
            };
            let cgc = self.get_chunk_graph_chunk(&entry_point_chunk)?;
            for entry_group_ukey in cgc.entry_modules.values() {
                let entry_group = chunk_group_by_ukey.require(entry_group_ukey)?;
                for c in entry_group.chunks.iter() {
                    let dependent = chunk_by_ukey.require(c)?;
                    if c != chunk_ukey
                        && *c != entry_point_chunk
                        && !dependent.has_runtime(chunk_group_by_ukey)
                    {
                        set.insert(*c);
                    }
                }
            }
        }
        Ok(set)
    }

    /// Total size of `modules` over all their source types.
    pub fn get_modules_size<'a>(
        &self,
        modules: impl IntoIterator<Item = &'a ModuleIdentifier>,
        module_graph: &ModuleGraph,
    ) -> u64 {
        modules
            .into_iter()
            .filter_map(|identifier| module_graph.module_by_identifier(identifier))
            .map(Module::total_size)
            .fold(0, u64::saturating_add)
    }

    /// `overhead + modules * (initial ? multiplicator : 1)`, saturating at
    /// `u64::MAX`.
    pub fn get_chunk_size(
        &self,
        chunk: &Chunk,
        options: &ChunkSizeOptions,
        module_graph: &ModuleGraph,
        chunk_group_by_ukey: &ChunkGroupByUkey,
    ) -> Result<u64> {
        let modules_size = self.get_chunk_modules_size(&chunk.ukey, module_graph)?;
        let multiplicator = if chunk.can_be_initial(chunk_group_by_ukey) {
            options.entry_chunk_multiplicator()
        } else {
            1
        };
        Ok(options
            .chunk_overhead()
            .saturating_add(modules_size.saturating_mul(multiplicator)))
    }

    /// Size of the chunk that merging `chunk_a` and `chunk_b` would produce.
    pub fn get_integrated_chunks_size(
        &self,
        chunk_a: &Chunk,
        chunk_b: &Chunk,
        options: &ChunkSizeOptions,
        module_graph: &ModuleGraph,
        chunk_group_by_ukey: &ChunkGroupByUkey,
    ) -> Result<u64> {
        let cgc_a = self.get_chunk_graph_chunk(&chunk_a.ukey)?;
        let cgc_b = self.get_chunk_graph_chunk(&chunk_b.ukey)?;
        let mut all_modules = cgc_a.modules.clone();
        all_modules.extend(cgc_b.modules.iter().cloned());

        let modules_size = self.get_modules_size(all_modules.iter(), module_graph);
        let multiplicator = if chunk_a.can_be_initial(chunk_group_by_ukey)
            || chunk_b.can_be_initial(chunk_group_by_ukey)
        {
            options.entry_chunk_multiplicator()
        } else {
            1
        };
        Ok(options
            .chunk_overhead()
            .saturating_add(modules_size.saturating_mul(multiplicator)))
    }

    /// Whether `chunk_a` is always loaded before `chunk_b`: walking up from
    /// `chunk_b`'s groups meets a group of `chunk_a` before any initial group.
    pub fn is_available_chunk(
        &self,
        chunk_group_by_ukey: &ChunkGroupByUkey,
        chunk_a: &Chunk,
        chunk_b: &Chunk,
    ) -> bool {
        let mut queue: FxIndexSet<ChunkGroupUkey> = chunk_b.groups.clone();
        let mut index = 0;
        while let Some(group_ukey) = queue.get_index(index).copied() {
            index += 1;
            if chunk_a.is_in_group(&group_ukey) {
                continue;
            }
            let Some(chunk_group) = chunk_group_by_ukey.get(&group_ukey) else {
                continue;
            };
            if chunk_group.is_initial() {
                return false;
            }
            queue.extend(chunk_group.parents.iter().copied());
        }
        true
    }

    pub fn can_chunks_be_integrated(
        &self,
        chunk_group_by_ukey: &ChunkGroupByUkey,
        chunk_a: &Chunk,
        chunk_b: &Chunk,
    ) -> Result<bool> {
        if chunk_a.prevent_integration || chunk_b.prevent_integration {
            return Ok(false);
        }

        let has_runtime_a = chunk_a.has_runtime(chunk_group_by_ukey);
        let has_runtime_b = chunk_b.has_runtime(chunk_group_by_ukey);

        if has_runtime_a != has_runtime_b {
            return Ok(if has_runtime_a {
                self.is_available_chunk(chunk_group_by_ukey, chunk_a, chunk_b)
            } else {
                self.is_available_chunk(chunk_group_by_ukey, chunk_b, chunk_a)
            });
        }

        if self.get_number_of_entry_modules(&chunk_a.ukey)? > 0
            || self.get_number_of_entry_modules(&chunk_b.ukey)? > 0
        {
            return Ok(false);
        }

        Ok(true)
    }

    /// Chunks with more modules first, then by their sorted module
    /// identifiers.
    pub fn compare_chunks(&self, chunk_a: &ChunkUkey, chunk_b: &ChunkUkey) -> Result<Ordering> {
        let cgc_a = self.get_chunk_graph_chunk(chunk_a)?;
        let cgc_b = self.get_chunk_graph_chunk(chunk_b)?;
        let by_size = cgc_b.modules.len().cmp(&cgc_a.modules.len());
        if by_size != Ordering::Equal {
            return Ok(by_size);
        }
        let sorted_a = sorted_identifiers(&cgc_a.modules);
        let sorted_b = sorted_identifiers(&cgc_b.modules);
        Ok(compare_modules_by_identifier_iter(
            sorted_a.into_iter(),
            sorted_b.into_iter(),
        ))
    }

    /// Stable sort of `chunks` by [`ChunkGraph::compare_chunks`].
    pub fn sort_chunks(&self, chunks: impl IntoIterator<Item = ChunkUkey>) -> Result<Vec<ChunkUkey>> {
        let mut keyed = chunks
            .into_iter()
            .map(|ukey| {
                let cgc = self.get_chunk_graph_chunk(&ukey)?;
                Ok((ukey, sorted_identifiers(&cgc.modules)))
            })
            .collect::<Result<Vec<_>>>()?;

        keyed.sort_by(|(_, a), (_, b)| {
            b.len()
                .cmp(&a.len())
                .then_with(|| compare_modules_by_identifier_iter(a.iter().copied(), b.iter().copied()))
        });
        Ok(keyed.into_iter().map(|(ukey, _)| ukey).collect())
    }

    /// Merge `chunk_b` into `chunk_a`. `chunk_b` ends up empty and detached;
    /// the caller removes it from the chunk database.
    pub fn integrate_chunks(
        &mut self,
        chunk_a: &mut Chunk,
        chunk_b: &mut Chunk,
        chunk_group_by_ukey: &mut ChunkGroupByUkey,
    ) -> Result<()> {
        let a_has_entry = self.get_number_of_entry_modules(&chunk_a.ukey)? > 0;
        let b_has_entry = self.get_number_of_entry_modules(&chunk_b.ukey)? > 0;

        // Pick one name, deterministically.
        match (chunk_a.name.take(), chunk_b.name.take()) {
            (Some(name_a), Some(name_b)) => {
                chunk_a.name = Some(if a_has_entry == b_has_entry {
                    if name_a.len() != name_b.len() {
                        if name_a.len() < name_b.len() { name_a } else { name_b }
                    } else if name_a < name_b {
                        name_a
                    } else {
                        name_b
                    }
                } else if b_has_entry {
                    name_b
                } else {
                    name_a
                });
            }
            (name_a, None) => chunk_a.name = name_a,
            (_, Some(name_b)) => chunk_a.name = Some(name_b),
        }

        chunk_a
            .id_name_hints
            .extend(std::mem::take(&mut chunk_b.id_name_hints));
        chunk_a.runtime = merge_runtime(&chunk_a.runtime, &chunk_b.runtime);

        let modules: Vec<ModuleIdentifier> = self
            .get_chunk_module_identifiers(&chunk_b.ukey)?
            .iter()
            .cloned()
            .collect();
        for module in modules {
            self.disconnect_chunk_and_module(&chunk_b.ukey, module.clone())?;
            self.connect_chunk_and_module(chunk_a.ukey, module)?;
        }

        let entry_modules: Vec<(ModuleIdentifier, ChunkGroupUkey)> = self
            .get_chunk_entry_modules_with_chunk_group_iterable(&chunk_b.ukey)?
            .iter()
            .map(|(module, group)| (module.clone(), *group))
            .collect();
        for (module, entrypoint) in entry_modules {
            self.disconnect_chunk_and_entry_module(chunk_b.ukey, module.clone())?;
            self.connect_chunk_and_entry_module(chunk_a.ukey, module, entrypoint)?;
        }

        let groups: Vec<ChunkGroupUkey> = chunk_b.groups.iter().copied().collect();
        for group_ukey in groups {
            let chunk_group = chunk_group_by_ukey.require_mut(&group_ukey)?;
            chunk_group.replace_chunk(chunk_b.ukey, chunk_a.ukey);
            chunk_a.add_group(group_ukey);
            chunk_b.remove_group(&group_ukey);
        }

        self.remove_chunk(&chunk_b.ukey);
        tracing::debug!(
            into = chunk_a.ukey.as_u32(),
            from = chunk_b.ukey.as_u32(),
            name = ?chunk_a.name,
            "integrated chunks"
        );
        Ok(())
    }
}

fn sorted_identifiers(modules: &FxIndexSet<ModuleIdentifier>) -> Vec<&ModuleIdentifier> {
    let mut sorted: Vec<&ModuleIdentifier> = modules.iter().collect();
    sorted.sort_by(|a, b| compare_modules_by_identifier(a, b));
    sorted
}
