use super::context::ExecutionContext;
use super::substrate::Work;
use crate::error::Result;
use crate::operation::{AsyncOperation, Outcome, Promise};
use crate::operation::state::guarded;
use crate::policy::Launch;

/// Submission surface bound to one execution context.
#[derive(Debug, Clone)]
pub struct Executor {
    context: ExecutionContext,
    launch: Launch,
}

/// Bind `context` for calls made with the given launch descriptor.
pub fn bind(context: ExecutionContext, launch: Launch) -> Executor {
    Executor { context, launch }
}

impl Executor {
    /// Schedule `body` and return its operation immediately.
    ///
    /// Never blocks on the substrate. A refused submission resolves the
    /// returned operation to `SubmissionFailed`; a panic in `body` resolves
    /// it to a domain error.
    pub fn submit<T, F>(&self, body: F) -> AsyncOperation<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (promise, op) = AsyncOperation::pending();
        self.enqueue(Work::new(promise, move || guarded(body)));
        op
    }

    /// Deliver an already-known outcome from this executor's context
    pub(crate) fn forward<T: Send + 'static>(&self, outcome: Outcome<T>, promise: Promise<T>) {
        self.enqueue(Work::new(promise, move || outcome));
    }

    fn enqueue(&self, work: Work) {
        tracing::trace!("submitting unit of work to `{}`", self.context.name());
        if let Err(rejected) = self.context.submit(work) {
            tracing::warn!(
                "context `{}` refused work: {}",
                self.context.name(),
                rejected.reason
            );
            rejected.work.reject(rejected.reason);
        }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Launch descriptor of the calls this executor serves
    pub fn launch(&self) -> Launch {
        self.launch
    }

    /// Parallelism hint of the bound substrate
    pub fn parallelism(&self) -> usize {
        self.context.parallelism()
    }
}
