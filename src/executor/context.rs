use std::fmt;
use std::sync::{Arc, LazyLock};

use super::pool::ThreadPoolSubstrate;
use super::substrate::{InlineSubstrate, Rejected, Substrate, Work};
use crate::config;
use crate::policy::Launch;

static GLOBAL: LazyLock<ExecutionContext> = LazyLock::new(|| {
    let config = config::global();
    match ThreadPoolSubstrate::from_config(config) {
        Ok(pool) => ExecutionContext::new("global", Arc::new(pool), Launch::Async),
        Err(e) => {
            tracing::warn!("default thread pool unavailable, running inline: {}", e);
            ExecutionContext::new("global-inline", Arc::new(InlineSubstrate), Launch::Sync)
        }
    }
});

/// Handle to a scheduling substrate plus the launch tag it submits with.
///
/// Cloning is cheap; the substrate is shared, never owned by dispatch.
#[derive(Clone)]
pub struct ExecutionContext {
    name: Arc<str>,
    substrate: Arc<dyn Substrate>,
    launch: Launch,
}

impl ExecutionContext {
    pub fn new(name: impl Into<String>, substrate: Arc<dyn Substrate>, launch: Launch) -> Self {
        let name: String = name.into();
        Self {
            name: name.into(),
            substrate,
            launch,
        }
    }

    /// Context that runs everything on the submitting thread
    pub fn inline() -> Self {
        Self::new("inline", Arc::new(InlineSubstrate), Launch::Sync)
    }

    /// Deferred submission onto a thread pool
    pub fn thread_pool(pool: Arc<ThreadPoolSubstrate>) -> Self {
        Self::new("thread-pool", pool, Launch::Async)
    }

    /// Process-wide default pool, built on first use from [`config::global`]
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    /// Same substrate, different launch tag
    pub fn with_launch(mut self, launch: Launch) -> Self {
        self.launch = launch;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn launch(&self) -> Launch {
        self.launch
    }

    pub fn parallelism(&self) -> usize {
        self.substrate.parallelism().max(1)
    }

    pub fn is_accepting(&self) -> bool {
        self.substrate.is_accepting()
    }

    /// Whether the calling thread is already one of this context's workers
    pub fn is_worker_thread(&self) -> bool {
        self.substrate.is_worker_thread()
    }

    pub fn substrate(&self) -> &Arc<dyn Substrate> {
        &self.substrate
    }

    pub(crate) fn submit(&self, work: Work) -> Result<(), Rejected> {
        self.substrate.submit(work, self.launch)
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("name", &self.name)
            .field("launch", &self.launch)
            .field("parallelism", &self.parallelism())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_context() {
        let context = ExecutionContext::inline();
        assert_eq!(context.name(), "inline");
        assert_eq!(context.launch(), Launch::Sync);
        assert_eq!(context.parallelism(), 1);
        assert!(context.is_accepting());
    }

    #[test]
    fn test_global_context_is_shared() {
        let a = ExecutionContext::global();
        let b = ExecutionContext::global();
        assert!(Arc::ptr_eq(a.substrate(), b.substrate()));
        assert!(a.parallelism() >= 1);
    }
}
