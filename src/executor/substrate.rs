use std::fmt;

use crate::error::{Error, SubmitError};
use crate::operation::{Outcome, Promise};
use crate::policy::Launch;

/// The part of a unit of work a substrate sees: run it, or reject it.
trait Job: Send {
    fn run(self: Box<Self>);
    fn reject(self: Box<Self>, reason: SubmitError);
}

struct PromiseJob<T, F> {
    promise: Promise<T>,
    body: F,
}

impl<T, F> Job for PromiseJob<T, F>
where
    T: Send + 'static,
    F: FnOnce() -> Outcome<T> + Send,
{
    fn run(self: Box<Self>) {
        let PromiseJob { promise, body } = *self;
        if !promise.is_pending() {
            tracing::trace!("skipping unit of work whose operation already resolved");
            return;
        }
        promise.fulfil(body());
    }

    fn reject(self: Box<Self>, reason: SubmitError) {
        self.promise
            .fulfil(Outcome::Error(Error::SubmissionFailed(reason)));
    }
}

/// A unit of work handed to a [`Substrate`].
///
/// Running it resolves the operation it belongs to. Dropping it without
/// running resolves that operation to `SubmissionFailed(ShutDown)`, so work
/// lost by a torn-down substrate never leaves an operation pending.
pub struct Work {
    job: Option<Box<dyn Job>>,
}

impl Work {
    pub(crate) fn new<T, F>(promise: Promise<T>, body: F) -> Self
    where
        T: Send + 'static,
        F: FnOnce() -> Outcome<T> + Send + 'static,
    {
        Self {
            job: Some(Box::new(PromiseJob { promise, body })),
        }
    }

    /// Run the work on the current thread
    pub fn run(mut self) {
        if let Some(job) = self.job.take() {
            job.run();
        }
    }

    /// Resolve the owning operation to `SubmissionFailed(reason)` without running
    pub fn reject(mut self, reason: SubmitError) {
        if let Some(job) = self.job.take() {
            job.reject(reason);
        }
    }
}

impl Drop for Work {
    fn drop(&mut self) {
        if let Some(job) = self.job.take() {
            job.reject(SubmitError::ShutDown);
        }
    }
}

impl fmt::Debug for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Work")
            .field("armed", &self.job.is_some())
            .finish()
    }
}

/// Work a substrate refused, handed back with the reason.
#[derive(Debug)]
pub struct Rejected {
    pub work: Work,
    pub reason: SubmitError,
}

/// The external scheduling substrate: accepts work and runs it eventually.
///
/// `launch` is the context's tag: `Sync` lets the substrate run the work on
/// the submitting thread, `Async` asks for it to be deferred.
pub trait Substrate: Send + Sync {
    fn submit(&self, work: Work, launch: Launch) -> Result<(), Rejected>;

    /// How many units this substrate can run at once
    fn parallelism(&self) -> usize;

    /// False once the substrate is shutting down
    fn is_accepting(&self) -> bool {
        true
    }

    /// True when the calling thread is one of this substrate's own workers
    fn is_worker_thread(&self) -> bool {
        false
    }
}

/// Runs every unit on the submitting thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineSubstrate;

impl Substrate for InlineSubstrate {
    fn submit(&self, work: Work, _launch: Launch) -> Result<(), Rejected> {
        work.run();
        Ok(())
    }

    fn parallelism(&self) -> usize {
        1
    }
}
