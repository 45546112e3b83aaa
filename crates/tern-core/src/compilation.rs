//! One run of the compiler: the graphs, the chunks and the emitted assets.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tern_graph::{
    Chunk, ChunkByUkey, ChunkGraph, ChunkGroup, ChunkGroupByUkey, ChunkGroupUkey, ChunkUkey,
    ModuleGraph, ModuleIdentifier, RuntimeSpec,
};

use crate::error::{CoreError, Result};
use crate::fs::FileSystem;
use crate::options::CompilerOptions;

/// An emitted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub source: Vec<u8>,
}

impl Asset {
    pub fn new(source: impl Into<Vec<u8>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.source.len()
    }
}

#[derive(Debug)]
pub struct Compilation {
    pub options: Arc<CompilerOptions>,
    pub fs: Arc<dyn FileSystem>,
    pub module_graph: ModuleGraph,
    pub chunk_graph: ChunkGraph,
    pub chunk_by_ukey: ChunkByUkey,
    pub chunk_group_by_ukey: ChunkGroupByUkey,
    /// Entry name -> entrypoint chunk group, in `entry` order.
    pub entrypoints: IndexMap<String, ChunkGroupUkey>,
    pub assets: IndexMap<String, Asset>,
}

impl Compilation {
    pub fn new(
        options: Arc<CompilerOptions>,
        fs: Arc<dyn FileSystem>,
        module_graph: ModuleGraph,
    ) -> Self {
        Self {
            options,
            fs,
            module_graph,
            chunk_graph: ChunkGraph::new(),
            chunk_by_ukey: ChunkByUkey::default(),
            chunk_group_by_ukey: ChunkGroupByUkey::default(),
            entrypoints: IndexMap::new(),
            assets: IndexMap::new(),
        }
    }

    /// Create an entrypoint group with a single chunk holding `entry_module`
    /// and everything reachable from it.
    pub fn add_entrypoint(
        &mut self,
        name: &str,
        entry_module: ModuleIdentifier,
    ) -> Result<ChunkGroupUkey> {
        let mut entrypoint = ChunkGroup::new_entrypoint(Some(name.to_string()));
        let mut chunk = Chunk::new(Some(name.to_string()));
        chunk.runtime = RuntimeSpec::from_name(name);

        chunk.add_group(entrypoint.ukey);
        entrypoint.push_chunk(chunk.ukey);
        entrypoint.set_runtime_chunk(chunk.ukey);
        entrypoint.set_entry_point_chunk(chunk.ukey);

        let chunk_ukey = self.chunk_by_ukey.add(chunk);
        let group_ukey = self.chunk_group_by_ukey.add(entrypoint);
        self.chunk_graph.add_chunk(chunk_ukey);

        self.chunk_graph
            .connect_chunk_and_entry_module(chunk_ukey, entry_module.clone(), group_ukey)?;
        self.connect_reachable(chunk_ukey, &entry_module)?;

        self.entrypoints.insert(name.to_string(), group_ukey);
        tracing::debug!(
            entry = name,
            modules = self.chunk_graph.get_number_of_chunk_modules(&chunk_ukey)?,
            "created entrypoint"
        );
        Ok(group_ukey)
    }

    /// Create an on-demand chunk group below `parent`, holding `modules` and
    /// everything reachable from them. The chunk inherits the runtimes of
    /// the parent's chunks.
    pub fn add_async_chunk(
        &mut self,
        parent: ChunkGroupUkey,
        name: Option<&str>,
        modules: &[ModuleIdentifier],
    ) -> Result<ChunkUkey> {
        let runtime = self
            .chunk_group_by_ukey
            .require(&parent)?
            .chunks
            .iter()
            .filter_map(|c| self.chunk_by_ukey.get(c))
            .flat_map(|c| c.runtime.iter().map(str::to_string))
            .collect::<RuntimeSpec>();

        let mut group = ChunkGroup::new_normal(name.map(str::to_string));
        let mut chunk = Chunk::new(name.map(str::to_string));
        chunk.runtime = runtime;
        chunk.add_group(group.ukey);
        group.push_chunk(chunk.ukey);
        group.add_parent(parent);

        let group_ukey = self.chunk_group_by_ukey.add(group);
        self.chunk_group_by_ukey
            .require_mut(&parent)?
            .add_child(group_ukey);

        let chunk_ukey = self.chunk_by_ukey.add(chunk);
        self.chunk_graph.add_chunk(chunk_ukey);
        for module in modules {
            self.connect_reachable(chunk_ukey, module)?;
        }
        Ok(chunk_ukey)
    }

    fn connect_reachable(&mut self, chunk: ChunkUkey, root: &ModuleIdentifier) -> Result<()> {
        if !self.module_graph.contains(root) {
            self.chunk_graph.connect_chunk_and_module(chunk, root.clone())?;
            return Ok(());
        }
        for module in self.module_graph.collect_reachable(root)? {
            self.chunk_graph.connect_chunk_and_module(chunk, module)?;
        }
        Ok(())
    }

    /// Remove a chunk from the compilation, detaching it from the chunk
    /// graph and its groups.
    pub fn remove_chunk(&mut self, chunk_ukey: &ChunkUkey) -> Result<Option<Chunk>> {
        let Some(mut chunk) = self.chunk_by_ukey.remove(chunk_ukey) else {
            return Ok(None);
        };
        if self.chunk_graph.contains_chunk(chunk_ukey) {
            self.chunk_graph
                .disconnect_chunk(&mut chunk, &mut self.chunk_group_by_ukey)?;
            self.chunk_graph.remove_chunk(chunk_ukey);
        } else {
            chunk.disconnect_from_groups(&mut self.chunk_group_by_ukey);
        }
        Ok(Some(chunk))
    }

    /// Give every chunk an id (its name, or an ordinal for unnamed chunks)
    /// and record its `<id>.js` file.
    pub fn assign_chunk_ids(&mut self) {
        let mut next_ordinal = 0usize;
        for chunk in self.chunk_by_ukey.values_mut() {
            let id = match &chunk.name {
                Some(name) => name.clone(),
                None => {
                    let id = next_ordinal.to_string();
                    next_ordinal += 1;
                    id
                }
            };
            chunk.files.insert(format!("{id}.js"));
            chunk.id = Some(id);
        }
    }

    /// Files of the chunks of an entrypoint, in chunk order.
    pub fn entrypoint_files(&self, name: &str) -> Result<Vec<String>> {
        let Some(group_ukey) = self.entrypoints.get(name) else {
            return Ok(Vec::new());
        };
        let group = self.chunk_group_by_ukey.require(group_ukey)?;
        let mut files = Vec::new();
        for chunk_ukey in &group.chunks {
            let chunk = self.chunk_by_ukey.require(chunk_ukey)?;
            files.extend(chunk.files.iter().cloned());
        }
        Ok(files)
    }

    /// Emit an asset. Emitting the same name again is only allowed with
    /// identical content.
    pub fn emit_asset(&mut self, filename: impl Into<String>, asset: Asset) -> Result<()> {
        let filename = filename.into();
        if let Some(existing) = self.assets.get(&filename) {
            if *existing != asset {
                return Err(CoreError::AssetConflict(filename));
            }
            return Ok(());
        }
        tracing::debug!(asset = %filename, size = asset.size(), "emitted asset");
        self.assets.insert(filename, asset);
        Ok(())
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_by_ukey.len()
    }

    pub fn stats(&self) -> Result<CompilationStats> {
        let mut chunks = Vec::with_capacity(self.chunk_by_ukey.len());
        for chunk in self.chunk_by_ukey.values() {
            let modules = self
                .chunk_graph
                .get_ordered_chunk_modules(&chunk.ukey, &self.module_graph)?;
            let mut identifiers: Vec<String> = self
                .chunk_graph
                .get_chunk_module_identifiers(&chunk.ukey)?
                .iter()
                .map(|m| m.to_string())
                .collect();
            identifiers.sort();
            chunks.push(ChunkStats {
                id: chunk.id.clone(),
                name: chunk.name.clone(),
                initial: chunk.can_be_initial(&self.chunk_group_by_ukey),
                files: chunk.files.iter().cloned().collect(),
                size: modules.iter().map(|m| m.total_size()).fold(0, u64::saturating_add),
                modules: identifiers,
            });
        }

        let mut entrypoints = IndexMap::new();
        for name in self.entrypoints.keys() {
            entrypoints.insert(name.clone(), self.entrypoint_files(name)?);
        }

        Ok(CompilationStats {
            chunks,
            entrypoints,
            assets: self
                .assets
                .iter()
                .map(|(name, asset)| AssetStats {
                    name: name.clone(),
                    size: asset.size(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationStats {
    pub chunks: Vec<ChunkStats>,
    pub entrypoints: IndexMap<String, Vec<String>>,
    pub assets: Vec<AssetStats>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkStats {
    pub id: Option<String>,
    pub name: Option<String>,
    pub initial: bool,
    pub files: Vec<String>,
    /// Sum of module sizes, without overhead.
    pub size: u64,
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetStats {
    pub name: String,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use std::path::Path;
    use tern_config::TernConfig;
    use tern_graph::{Module, SourceType};

    fn compilation() -> Compilation {
        let mut config = TernConfig::default();
        config.entry.insert("main".into(), "./index.js".into());
        let options = CompilerOptions::from_config(config, Path::new("/app")).unwrap();

        let mut module_graph = ModuleGraph::new();
        for (id, deps) in [("/app/index.js", vec!["/app/a.js"]), ("/app/a.js", vec![]), ("/app/lazy.js", vec!["/app/a.js"])] {
            let mut builder = Module::builder(id).size(SourceType::JavaScript, 10);
            for dep in deps {
                builder = builder.dependency(dep);
            }
            module_graph.add_module(builder.build());
        }

        Compilation::new(
            Arc::new(options),
            Arc::new(MemoryFileSystem::new("/app")),
            module_graph,
        )
    }

    #[test]
    fn entrypoint_collects_reachable_modules() {
        let mut compilation = compilation();
        let group = compilation.add_entrypoint("main", "/app/index.js".into()).unwrap();

        let group = compilation.chunk_group_by_ukey.get(&group).unwrap();
        let chunk = group.get_entry_point_chunk().unwrap();
        assert_eq!(group.get_runtime_chunk(), Some(chunk));
        assert_eq!(
            compilation.chunk_graph.get_number_of_chunk_modules(&chunk).unwrap(),
            2
        );
        assert_eq!(
            compilation.chunk_graph.get_chunk_entry_modules(&chunk).unwrap(),
            vec![ModuleIdentifier::from("/app/index.js")]
        );
        assert!(compilation.chunk_by_ukey.get(&chunk).unwrap().runtime.contains("main"));
    }

    #[test]
    fn async_chunk_hangs_below_parent_and_inherits_runtime() {
        let mut compilation = compilation();
        let entry = compilation.add_entrypoint("main", "/app/index.js".into()).unwrap();
        let lazy = compilation
            .add_async_chunk(entry, Some("lazy"), &["/app/lazy.js".into()])
            .unwrap();

        let chunk = compilation.chunk_by_ukey.get(&lazy).unwrap();
        assert!(chunk.runtime.contains("main"));
        assert!(!chunk.can_be_initial(&compilation.chunk_group_by_ukey));
        let group = compilation.chunk_group_by_ukey.get(&chunk.groups[0]).unwrap();
        assert!(group.parents.contains(&entry));
        assert_eq!(
            compilation.chunk_graph.get_number_of_chunk_modules(&lazy).unwrap(),
            2
        );
    }

    #[test]
    fn chunk_ids_use_names_then_ordinals() {
        let mut compilation = compilation();
        let entry = compilation.add_entrypoint("main", "/app/index.js".into()).unwrap();
        compilation.add_async_chunk(entry, None, &["/app/lazy.js".into()]).unwrap();
        compilation.add_async_chunk(entry, None, &["/app/a.js".into()]).unwrap();
        compilation.assign_chunk_ids();

        let ids: Vec<_> = compilation
            .chunk_by_ukey
            .values()
            .map(|c| c.id.clone().unwrap())
            .collect();
        assert_eq!(ids, ["main", "0", "1"]);
        assert_eq!(compilation.entrypoint_files("main").unwrap(), ["main.js"]);
    }

    #[test]
    fn emitting_different_content_twice_conflicts() {
        let mut compilation = compilation();
        compilation.emit_asset("index.html", Asset::new("a")).unwrap();
        compilation.emit_asset("index.html", Asset::new("a")).unwrap();
        let err = compilation.emit_asset("index.html", Asset::new("b")).unwrap_err();
        assert!(matches!(err, CoreError::AssetConflict(name) if name == "index.html"));
    }

    #[test]
    fn remove_chunk_detaches_it() {
        let mut compilation = compilation();
        let entry = compilation.add_entrypoint("main", "/app/index.js".into()).unwrap();
        let lazy = compilation.add_async_chunk(entry, None, &["/app/lazy.js".into()]).unwrap();

        let removed = compilation.remove_chunk(&lazy).unwrap().unwrap();
        assert!(removed.groups.is_empty());
        assert_eq!(compilation.chunk_count(), 1);
        assert!(!compilation.chunk_graph.contains_chunk(&lazy));
        assert!(compilation.remove_chunk(&lazy).unwrap().is_none());
    }

    #[test]
    fn stats_list_chunks_and_entrypoints() {
        let mut compilation = compilation();
        compilation.add_entrypoint("main", "/app/index.js".into()).unwrap();
        compilation.assign_chunk_ids();
        compilation.emit_asset("index.html", Asset::new("<html>")).unwrap();

        let stats = compilation.stats().unwrap();
        assert_eq!(stats.chunks.len(), 1);
        assert_eq!(stats.chunks[0].size, 20);
        assert_eq!(stats.chunks[0].modules, ["/app/a.js", "/app/index.js"]);
        assert!(stats.chunks[0].initial);
        assert_eq!(stats.entrypoints["main"], ["main.js"]);
        assert_eq!(stats.assets[0].size, 6);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["chunks"][0]["id"], "main");
    }
}
