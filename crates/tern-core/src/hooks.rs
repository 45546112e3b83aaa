//! Tap-able compiler hooks.
//!
//! Plugins register taps while they are applied; the compiler calls them in
//! registration order.

use std::fmt;
use std::path::Path;

use tern_config::EntryMap;

use crate::error::{BoxError, CoreError, Result};

type EntryOptionTap = Box<dyn Fn(&Path, &EntryMap) -> std::result::Result<(), BoxError> + Send + Sync>;

/// Called once per compiler with `(context, entry)` after all plugins are
/// applied.
#[derive(Default)]
pub struct EntryOptionHook {
    taps: Vec<(String, EntryOptionTap)>,
}

impl EntryOptionHook {
    pub const NAME: &'static str = "entryOption";

    pub fn tap<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Path, &EntryMap) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.taps.push((name.into(), Box::new(f)));
    }

    pub fn is_used(&self) -> bool {
        !self.taps.is_empty()
    }

    /// Call every tap; the first failure stops the call.
    pub fn call(&self, context: &Path, entry: &EntryMap) -> Result<()> {
        for (name, tap) in &self.taps {
            tracing::trace!(hook = Self::NAME, tap = %name, "calling tap");
            tap(context, entry).map_err(|err| CoreError::Hook {
                hook: Self::NAME,
                tap: name.clone(),
                message: err.to_string(),
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for EntryOptionHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryOptionHook")
            .field("taps", &self.taps.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct CompilerHooks {
    pub entry_option: EntryOptionHook,
}
