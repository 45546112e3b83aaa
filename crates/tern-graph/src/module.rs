use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Unique identifier of a module, usually its absolute path.
///
/// Backed by `Arc<str>` so that the many sets keyed by module stay cheap to
/// clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleIdentifier(Arc<str>);

impl ModuleIdentifier {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(path.to_string_lossy())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ModuleIdentifier {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl AsRef<str> for ModuleIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kind of output a module contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    JavaScript,
    Css,
    Asset,
    Runtime,
}

impl SourceType {
    /// Guess the source type from a file extension. Unknown extensions are
    /// treated as JavaScript.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("css") | Some("scss") | Some("less") => Self::Css,
            Some("png") | Some("jpg") | Some("jpeg") | Some("gif") | Some("svg")
            | Some("woff") | Some("woff2") => Self::Asset,
            _ => Self::JavaScript,
        }
    }
}

/// A module as seen by chunking: an identifier, sizes per source type and
/// the modules it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub identifier: ModuleIdentifier,
    sizes: BTreeMap<SourceType, u64>,
    pub dependencies: Vec<ModuleIdentifier>,
}

impl Module {
    pub fn builder(identifier: impl Into<ModuleIdentifier>) -> ModuleBuilder {
        ModuleBuilder {
            identifier: identifier.into(),
            sizes: BTreeMap::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &ModuleIdentifier {
        &self.identifier
    }

    /// Size in bytes for one source type; 0 when the module has none.
    pub fn size(&self, source_type: SourceType) -> u64 {
        self.sizes.get(&source_type).copied().unwrap_or(0)
    }

    pub fn source_types(&self) -> impl Iterator<Item = SourceType> + '_ {
        self.sizes.keys().copied()
    }

    /// Sum of the sizes of all source types.
    pub fn total_size(&self) -> u64 {
        self.sizes.values().fold(0, |total, size| total.saturating_add(*size))
    }
}

/// Builder for [`Module`].
#[derive(Debug)]
pub struct ModuleBuilder {
    identifier: ModuleIdentifier,
    sizes: BTreeMap<SourceType, u64>,
    dependencies: Vec<ModuleIdentifier>,
}

impl ModuleBuilder {
    pub fn size(mut self, source_type: SourceType, bytes: u64) -> Self {
        self.sizes.insert(source_type, bytes);
        self
    }

    pub fn dependency(mut self, dependency: impl Into<ModuleIdentifier>) -> Self {
        let dependency = dependency.into();
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
        self
    }

    pub fn build(self) -> Module {
        Module {
            identifier: self.identifier,
            sizes: self.sizes,
            dependencies: self.dependencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_defaults_to_zero_for_missing_source_type() {
        let module = Module::builder("a.js")
            .size(SourceType::JavaScript, 10)
            .build();
        assert_eq!(module.size(SourceType::JavaScript), 10);
        assert_eq!(module.size(SourceType::Css), 0);
        assert_eq!(module.total_size(), 10);
    }

    #[test]
    fn builder_deduplicates_dependencies() {
        let module = Module::builder("a.js")
            .dependency("b.js")
            .dependency("b.js")
            .dependency("c.js")
            .build();
        assert_eq!(
            module.dependencies,
            vec![ModuleIdentifier::from("b.js"), ModuleIdentifier::from("c.js")]
        );
    }

    #[test]
    fn source_type_from_extension() {
        assert_eq!(SourceType::from_path(Path::new("a.css")), SourceType::Css);
        assert_eq!(SourceType::from_path(Path::new("a.svg")), SourceType::Asset);
        assert_eq!(
            SourceType::from_path(Path::new("a.mjs")),
            SourceType::JavaScript
        );
    }
}
