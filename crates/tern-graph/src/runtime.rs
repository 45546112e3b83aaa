use std::collections::BTreeSet;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// The set of runtimes a chunk is loaded in (one per entrypoint by default).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeSpec(BTreeSet<String>);

impl RuntimeSpec {
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(BTreeSet::from([name.into()]))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for RuntimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        f.write_str(&names.join("|"))
    }
}

impl<S: Into<String>> FromIterator<S> for RuntimeSpec {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Union of two runtimes.
pub fn merge_runtime(a: &RuntimeSpec, b: &RuntimeSpec) -> RuntimeSpec {
    RuntimeSpec(a.0.union(&b.0).cloned().collect())
}

bitflags! {
    /// Runtime helpers a chunk needs at load time.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct RuntimeGlobals: u32 {
        const REQUIRE = 1 << 0;
        const MODULE_FACTORIES = 1 << 1;
        const ENSURE_CHUNK = 1 << 2;
        const LOAD_SCRIPT = 1 << 3;
        const PUBLIC_PATH = 1 << 4;
        const GET_CHUNK_SCRIPT_FILENAME = 1 << 5;
        const ON_CHUNKS_LOADED = 1 << 6;
        const HAS_OWN_PROPERTY = 1 << 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_runtime_is_a_union() {
        let a: RuntimeSpec = ["main"].into_iter().collect();
        let b: RuntimeSpec = ["test", "main"].into_iter().collect();
        let merged = merge_runtime(&a, &b);
        assert_eq!(merged.iter().collect::<Vec<_>>(), vec!["main", "test"]);
        assert_eq!(merged.to_string(), "main|test");
    }

    #[test]
    fn runtime_globals_accumulate() {
        let mut globals = RuntimeGlobals::default();
        globals.insert(RuntimeGlobals::REQUIRE);
        globals.insert(RuntimeGlobals::ENSURE_CHUNK | RuntimeGlobals::LOAD_SCRIPT);
        assert!(globals.contains(RuntimeGlobals::REQUIRE | RuntimeGlobals::LOAD_SCRIPT));
        assert!(!globals.contains(RuntimeGlobals::PUBLIC_PATH));
    }
}
