use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::compilation::Compilation;
use crate::error::Result;
use crate::hooks::CompilerHooks;
use crate::options::CompilerOptions;
use crate::registry::PluginPhase;

/// What a plugin sees while it is applied.
pub struct ApplyContext<'a> {
    pub hooks: &'a mut CompilerHooks,
    pub options: &'a CompilerOptions,
}

/// A compiler plugin.
///
/// `apply` runs once, when the compiler is created, and is the place to tap
/// hooks. The async methods run once per compilation, in phase order.
#[async_trait]
pub trait Plugin: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn phase(&self) -> PluginPhase {
        PluginPhase::Optimize
    }

    fn apply(&self, _ctx: &mut ApplyContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Return `true` when chunks changed; the compiler then runs the
    /// optimization round again.
    async fn optimize_chunks(&self, _compilation: &mut Compilation) -> Result<bool> {
        Ok(false)
    }

    async fn process_assets(&self, _compilation: &mut Compilation) -> Result<()> {
        Ok(())
    }
}

pub type BoxPlugin = Arc<dyn Plugin>;
