use std::sync::Arc;

use super::chunk::{Chunk, Range, partition};
use super::cursor::Cursor;
use crate::aggregate;
use crate::error::Result;
use crate::executor::{ExecutionContext, Executor, bind};
use crate::operation::{AsyncOperation, Outcome, await_all, start_with};
use crate::policy::{ExecutionPolicy, Launch};

/// What a bulk algorithm supplies to the dispatch engine.
///
/// `per_chunk` may be called concurrently from any thread, once per chunk,
/// so implementations hold no mutable shared state.
pub trait AlgorithmContract<C: Cursor>: Send + Sync + 'static {
    /// Result of one chunk
    type Partial: Send + 'static;
    type Output: Send + 'static;

    fn per_chunk(&self, chunk: Chunk<C>) -> Result<Self::Partial>;

    /// Fold successful partials, given in chunk order. Called with an empty
    /// vector for an empty input, so it must produce the identity result.
    fn merge(&self, partials: Vec<Self::Partial>) -> Result<Self::Output>;

    /// Classify the ordered chunk outcomes, then [`merge`](Self::merge) the values
    fn combine(&self, outcomes: Vec<Outcome<Self::Partial>>) -> Result<Self::Output> {
        self.merge(aggregate::collect(outcomes)?)
    }
}

/// Partition `range`, submit one unit of work per chunk and fold the outcomes.
///
/// Always returns a handle; [`execute`] applies the launch descriptor. An
/// empty range submits nothing and resolves to the algorithm's identity.
pub fn dispatch<C, A>(range: Range<C>, policy: &ExecutionPolicy, algorithm: A) -> AsyncOperation<A::Output>
where
    C: Cursor,
    A: AlgorithmContract<C>,
{
    dispatch_on(range, policy, policy.executor(), algorithm)
}

fn dispatch_on<C, A>(
    range: Range<C>,
    policy: &ExecutionPolicy,
    executor: Executor,
    algorithm: A,
) -> AsyncOperation<A::Output>
where
    C: Cursor,
    A: AlgorithmContract<C>,
{
    let algorithm = Arc::new(algorithm);
    let params = policy.params();
    let mode = policy.mode();
    let parallelism = executor.parallelism();

    let partition = partition(range, params.min_chunk_size, |len| {
        params.chunk_count(mode, len, parallelism)
    });

    tracing::debug!(
        "dispatching {} element(s) as {} chunk(s) under {} (capability {:?}, hint {})",
        partition.len,
        partition.chunks.len(),
        policy,
        partition.capability,
        parallelism
    );

    if partition.is_empty() {
        return start_with(()).then(move |()| algorithm.combine(Vec::new()));
    }

    let operations: Vec<AsyncOperation<A::Partial>> = partition
        .chunks
        .into_iter()
        .map(|chunk| {
            tracing::trace!(
                "chunk {}: offset {} len {}",
                chunk.index,
                chunk.offset,
                chunk.len
            );
            let algorithm = Arc::clone(&algorithm);
            executor.submit(move || algorithm.per_chunk(chunk))
        })
        .collect();

    await_all(operations).then(move |outcomes| algorithm.combine(outcomes))
}

/// Run a dispatch and honour the policy's launch descriptor.
///
/// A blocking call made from a worker of the policy's own context runs its
/// chunks inline on that worker: a parked worker cannot run the chunks it is
/// waiting for.
pub fn execute<C, A>(range: Range<C>, policy: &ExecutionPolicy, algorithm: A) -> Completion<A::Output>
where
    C: Cursor,
    A: AlgorithmContract<C>,
{
    let executor = policy.executor();
    if !policy.is_blocking() {
        return Completion::Deferred(dispatch_on(range, policy, executor, algorithm));
    }

    let executor = if executor.context().is_worker_thread() {
        tracing::debug!(
            "blocking call from a worker of `{}`, running chunks inline",
            executor.context().name()
        );
        bind(ExecutionContext::inline(), Launch::Sync)
    } else {
        executor
    };
    Completion::Ready(dispatch_on(range, policy, executor, algorithm).wait())
}

/// Result of a bulk algorithm call: materialized for `Sync`, a handle for `Async`.
#[must_use = "a deferred completion only reports its outcome when observed"]
pub enum Completion<T> {
    Ready(Result<T>),
    Deferred(AsyncOperation<T>),
}

impl<T: Send + 'static> Completion<T> {
    /// The result, blocking first if it was deferred
    pub fn get(self) -> Result<T> {
        match self {
            Completion::Ready(result) => result,
            Completion::Deferred(operation) => operation.wait(),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Completion::Deferred(_))
    }

    /// View either form as an operation, so it can be chained further
    pub fn into_operation(self) -> AsyncOperation<T> {
        match self {
            Completion::Ready(result) => AsyncOperation::ready(Outcome::from(result)),
            Completion::Deferred(operation) => operation,
        }
    }
}

impl<T> std::fmt::Debug for Completion<T>
where
    T: std::fmt::Debug + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Completion::Deferred(operation) => f.debug_tuple("Deferred").field(operation).finish(),
        }
    }
}
