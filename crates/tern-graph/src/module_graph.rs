//! In-memory module graph.

use std::collections::VecDeque;
use std::hash::Hash;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;

use crate::error::{GraphError, Result};
use crate::module::{Module, ModuleIdentifier};
use crate::{FxIndexMap, FxIndexSet};

/// Modules by identifier, in insertion order.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: FxIndexMap<ModuleIdentifier, Module>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module, replacing (and returning) any module with the same
    /// identifier.
    pub fn add_module(&mut self, module: Module) -> Option<Module> {
        self.modules.insert(module.identifier.clone(), module)
    }

    pub fn module_by_identifier(&self, identifier: &ModuleIdentifier) -> Option<&Module> {
        self.modules.get(identifier)
    }

    pub fn contains(&self, identifier: &ModuleIdentifier) -> bool {
        self.modules.contains_key(identifier)
    }

    /// Record that `from` depends on `to`. `to` does not have to exist yet.
    pub fn add_connection(&mut self, from: &ModuleIdentifier, to: ModuleIdentifier) -> Result<()> {
        let module = self
            .modules
            .get_mut(from)
            .ok_or_else(|| GraphError::ModuleNotFound(from.clone()))?;
        if !module.dependencies.contains(&to) {
            module.dependencies.push(to);
        }
        Ok(())
    }

    pub fn get_outgoing_connections(
        &self,
        identifier: &ModuleIdentifier,
    ) -> Result<&[ModuleIdentifier]> {
        self.modules
            .get(identifier)
            .map(|module| module.dependencies.as_slice())
            .ok_or_else(|| GraphError::ModuleNotFound(identifier.clone()))
    }

    /// Every module reachable from `entry` (inclusive), breadth first.
    ///
    /// Dependencies that are not part of the graph are skipped.
    pub fn collect_reachable(&self, entry: &ModuleIdentifier) -> Result<Vec<ModuleIdentifier>> {
        if !self.contains(entry) {
            return Err(GraphError::ModuleNotFound(entry.clone()));
        }

        let mut visited = FxIndexSet::default();
        let mut queue = VecDeque::from([entry.clone()]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for dependency in self.get_outgoing_connections(&current)? {
                if !self.contains(dependency) {
                    tracing::trace!(%current, %dependency, "skipping dependency outside the module graph");
                    continue;
                }
                if !visited.contains(dependency) {
                    queue.push_back(dependency.clone());
                }
            }
        }
        Ok(visited.into_iter().collect())
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Find the roots of the subgraph spanned by `items`.
///
/// Dependencies that are not in `items` are ignored. A node without incoming
/// edges is a root. A strongly connected component without incoming edges from
/// outside contributes the members with the most incoming edges from inside
/// the component. The result is sorted.
pub fn find_graph_roots<T, F>(items: Vec<T>, get_dependencies: F) -> Vec<T>
where
    T: Clone + Eq + Hash + Ord,
    F: Fn(&T) -> Vec<T>,
{
    let mut graph = DiGraph::<T, ()>::new();
    let mut node_of: FxHashMap<T, NodeIndex> = FxHashMap::default();
    for item in items {
        if !node_of.contains_key(&item) {
            let node = graph.add_node(item.clone());
            node_of.insert(item, node);
        }
    }

    let nodes: Vec<NodeIndex> = graph.node_indices().collect();
    for node in nodes {
        for dependency in get_dependencies(&graph[node]) {
            if let Some(&target) = node_of.get(&dependency) {
                graph.update_edge(node, target, ());
            }
        }
    }

    let components = tarjan_scc(&graph);
    let mut component_of = vec![0usize; graph.node_count()];
    for (index, component) in components.iter().enumerate() {
        for node in component {
            component_of[node.index()] = index;
        }
    }

    let mut roots = Vec::new();
    for (index, component) in components.iter().enumerate() {
        let has_external_incoming = component.iter().any(|&node| {
            graph
                .neighbors_directed(node, Direction::Incoming)
                .any(|source| component_of[source.index()] != index)
        });
        if has_external_incoming {
            continue;
        }

        let incoming_within = |node: NodeIndex| {
            graph
                .neighbors_directed(node, Direction::Incoming)
                .filter(|source| component_of[source.index()] == index)
                .count()
        };

        let max = component.iter().map(|&node| incoming_within(node)).max();
        for &node in component {
            if Some(incoming_within(node)) == max {
                roots.push(graph[node].clone());
            }
        }
    }

    roots.sort();
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::SourceType;

    fn graph_of(edges: &[(&str, &[&str])]) -> ModuleGraph {
        let mut graph = ModuleGraph::new();
        for (id, deps) in edges {
            let mut builder = Module::builder(*id).size(SourceType::JavaScript, 1);
            for dep in *deps {
                builder = builder.dependency(*dep);
            }
            graph.add_module(builder.build());
        }
        graph
    }

    #[test]
    fn collect_reachable_walks_breadth_first_and_skips_missing() {
        let graph = graph_of(&[
            ("a", &["b", "c"]),
            ("b", &["d", "missing"]),
            ("c", &["d"]),
            ("d", &["a"]),
        ]);
        let reachable = graph.collect_reachable(&"a".into()).unwrap();
        let ids: Vec<&str> = reachable.iter().map(|m| m.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn collect_reachable_requires_entry() {
        let graph = ModuleGraph::new();
        assert_eq!(
            graph.collect_reachable(&"nope".into()),
            Err(GraphError::ModuleNotFound("nope".into()))
        );
    }

    #[test]
    fn add_connection_requires_source_module() {
        let mut graph = graph_of(&[("a", &[])]);
        graph.add_connection(&"a".into(), "b".into()).unwrap();
        graph.add_connection(&"a".into(), "b".into()).unwrap();
        assert_eq!(graph.get_outgoing_connections(&"a".into()).unwrap().len(), 1);
        assert!(graph.add_connection(&"x".into(), "a".into()).is_err());
    }

    #[test]
    fn roots_of_a_tree() {
        let deps = |n: &u32| match n {
            1 => vec![2, 3],
            2 => vec![4],
            _ => vec![],
        };
        assert_eq!(find_graph_roots(vec![4, 3, 2, 1], deps), vec![1]);
    }

    #[test]
    fn dependencies_outside_items_are_ignored() {
        let deps = |n: &u32| match n {
            1 => vec![99],
            2 => vec![1],
            _ => vec![],
        };
        assert_eq!(find_graph_roots(vec![1, 2], deps), vec![2]);
    }

    #[test]
    fn root_cycle_prefers_most_referenced_members() {
        // 1 -> 2 -> 3 -> 1 and 3 -> 2: node 2 has two incoming edges in the cycle.
        let deps = |n: &u32| match n {
            1 => vec![2],
            2 => vec![3],
            3 => vec![1, 2],
            _ => vec![],
        };
        assert_eq!(find_graph_roots(vec![1, 2, 3], deps), vec![2]);
    }

    #[test]
    fn cycle_below_a_root_is_not_a_root() {
        let deps = |n: &u32| match n {
            1 => vec![2],
            2 => vec![3],
            3 => vec![2],
            _ => vec![],
        };
        assert_eq!(find_graph_roots(vec![1, 2, 3], deps), vec![1]);
    }

    #[test]
    fn balanced_cycle_reports_every_member() {
        let deps = |n: &u32| match n {
            1 => vec![2],
            2 => vec![1],
            _ => vec![],
        };
        assert_eq!(find_graph_roots(vec![2, 1], deps), vec![1, 2]);
    }
}
