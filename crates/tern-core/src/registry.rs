//! Plugin registry with execution phases.

use std::sync::Arc;

use crate::plugin::{BoxPlugin, Plugin};

/// Plugin execution phases
///
/// Plugins run in phase order (lower numbers first); within a phase they
/// keep registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluginPhase {
    /// Plugins that only inspect or adjust options through hooks.
    Options = 0,

    /// Chunk optimizations.
    Optimize = 10,

    /// Asset generation (HTML pages and the like).
    Emit = 20,
}

/// Plugin registry that maintains plugins in phase order
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<(PluginPhase, BoxPlugin)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin at the phase it reports. Sorting happens once, in
    /// [`PluginRegistry::into_plugins`].
    pub fn add<P: Plugin + 'static>(&mut self, plugin: P) {
        let phase = plugin.phase();
        self.plugins.push((phase, Arc::new(plugin)));
    }

    pub fn add_shared(&mut self, plugin: BoxPlugin) {
        let phase = plugin.phase();
        self.plugins.push((phase, plugin));
    }

    /// Add a plugin with an explicit phase, overriding its own.
    pub fn add_with_phase(&mut self, plugin: BoxPlugin, phase: PluginPhase) {
        self.plugins.push((phase, plugin));
    }

    /// Plugins sorted by phase (stable).
    pub fn into_plugins(mut self) -> Vec<BoxPlugin> {
        self.plugins.sort_by_key(|(phase, _)| *phase);
        self.plugins.into_iter().map(|(_, plugin)| plugin).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl FromIterator<BoxPlugin> for PluginRegistry {
    fn from_iter<I: IntoIterator<Item = BoxPlugin>>(iter: I) -> Self {
        let mut registry = Self::new();
        for plugin in iter {
            registry.add_shared(plugin);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Named(&'static str, PluginPhase);

    impl Plugin for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn phase(&self) -> PluginPhase {
            self.1
        }
    }

    #[test]
    fn plugins_sort_by_phase_and_keep_order_within_a_phase() {
        let mut registry = PluginRegistry::new();
        registry.add(Named("html", PluginPhase::Emit));
        registry.add(Named("limit", PluginPhase::Optimize));
        registry.add(Named("options", PluginPhase::Options));
        registry.add(Named("split", PluginPhase::Optimize));
        registry.add_with_phase(Arc::new(Named("late", PluginPhase::Options)), PluginPhase::Emit);
        assert_eq!(registry.len(), 5);

        let names: Vec<String> = registry
            .into_plugins()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, ["options", "limit", "split", "html", "late"]);
    }
}
