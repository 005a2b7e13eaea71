use std::sync::atomic::{AtomicBool, Ordering};

use super::substrate::{Rejected, Substrate, Work};
use crate::config::ParallelConfig;
use crate::error::SubmitError;
use crate::policy::Launch;

/// Substrate backed by a rayon thread pool.
pub struct ThreadPoolSubstrate {
    pool: rayon::ThreadPool,
    accepting: AtomicBool,
}

impl ThreadPoolSubstrate {
    /// Build a pool with exactly `threads` workers (at least one)
    pub fn new(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        Self::build(threads, "parex-worker")
    }

    /// Build a pool sized from the configuration's worker calculation
    pub fn from_config(config: &ParallelConfig) -> Result<Self, rayon::ThreadPoolBuildError> {
        Self::build(config.optimal_workers(), &config.thread_name_prefix)
    }

    fn build(threads: usize, prefix: &str) -> Result<Self, rayon::ThreadPoolBuildError> {
        let threads = threads.max(1);
        let prefix = prefix.to_string();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(move |index| format!("{prefix}-{index}"))
            .build()?;

        tracing::debug!("built thread pool substrate with {} workers", threads);
        Ok(Self {
            pool,
            accepting: AtomicBool::new(true),
        })
    }

    /// Refuse all later submissions; work already queued still runs
    pub fn shutdown(&self) {
        self.accepting.store(false, Ordering::Release);
    }
}

impl Substrate for ThreadPoolSubstrate {
    fn submit(&self, work: Work, launch: Launch) -> Result<(), Rejected> {
        if !self.is_accepting() {
            return Err(Rejected {
                work,
                reason: SubmitError::ShutDown,
            });
        }

        match launch {
            Launch::Sync => work.run(),
            Launch::Async => self.pool.spawn(move || work.run()),
        }
        Ok(())
    }

    fn parallelism(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    fn is_worker_thread(&self) -> bool {
        self.pool.current_thread_index().is_some()
    }
}

impl std::fmt::Debug for ThreadPoolSubstrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPoolSubstrate")
            .field("threads", &self.parallelism())
            .field("accepting", &self.is_accepting())
            .finish()
    }
}
