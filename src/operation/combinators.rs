use std::sync::{Arc, Mutex, PoisonError};

use super::handle::AsyncOperation;
use super::state::{Outcome, Promise, guarded};
use crate::error::Result;
use crate::executor::Executor;

/// An already-resolved operation carrying `values` (use a tuple for several).
pub fn start_with<T: Send + 'static>(values: T) -> AsyncOperation<T> {
    AsyncOperation::ready(Outcome::Value(values))
}

/// Chain `f` after `op` resolves with a value.
///
/// `f` runs wherever `op` completed, or on the caller when `op` is already
/// resolved. Errors and cancellation pass through without calling `f`.
pub fn then<T, U, F>(op: AsyncOperation<T>, f: F) -> AsyncOperation<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnOnce(T) -> Result<U> + Send + 'static,
{
    let (promise, next) = AsyncOperation::pending();
    promise.add_upstream(op.canceller());

    op.on_resolve(move |outcome| {
        let outcome = match outcome {
            Outcome::Value(value) => guarded(move || f(value)),
            Outcome::Error(error) => Outcome::Error(error),
            Outcome::Cancelled => Outcome::Cancelled,
        };
        promise.fulfil(outcome);
    });
    next
}

/// Like [`then`], for continuations that start another operation.
pub fn then_async<T, U, F>(op: AsyncOperation<T>, f: F) -> AsyncOperation<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnOnce(T) -> AsyncOperation<U> + Send + 'static,
{
    let (promise, next) = AsyncOperation::pending();
    promise.add_upstream(op.canceller());

    op.on_resolve(move |outcome| match outcome {
        Outcome::Value(value) => match guarded(move || Ok(f(value))) {
            Outcome::Value(inner) => {
                promise.add_upstream(inner.canceller());
                if !promise.is_pending() {
                    // the outer handle was cancelled while `f` ran
                    inner.cancel();
                }
                inner.on_resolve(move |outcome| {
                    promise.fulfil(outcome);
                });
            }
            Outcome::Error(error) => {
                promise.fulfil(Outcome::Error(error));
            }
            Outcome::Cancelled => {
                promise.fulfil(Outcome::Cancelled);
            }
        },
        Outcome::Error(error) => {
            promise.fulfil(Outcome::Error(error));
        }
        Outcome::Cancelled => {
            promise.fulfil(Outcome::Cancelled);
        }
    });
    next
}

/// Deliver `op`'s outcome through `executor`, so whatever is chained next runs there.
pub fn on<T>(op: AsyncOperation<T>, executor: &Executor) -> AsyncOperation<T>
where
    T: Send + 'static,
{
    let (promise, next) = AsyncOperation::pending();
    promise.add_upstream(op.canceller());

    let executor = executor.clone();
    op.on_resolve(move |outcome| executor.forward(outcome, promise));
    next
}

struct Gather<T> {
    slots: Vec<Option<Outcome<T>>>,
    remaining: usize,
    promise: Option<Promise<Vec<Outcome<T>>>>,
}

/// Resolve once every operation in `ops` is terminal.
///
/// The output keeps input order whatever the completion order. A failing or
/// cancelled member never cancels its siblings; cancelling the returned
/// operation is forwarded to all members.
pub fn await_all<T>(ops: Vec<AsyncOperation<T>>) -> AsyncOperation<Vec<Outcome<T>>>
where
    T: Send + 'static,
{
    if ops.is_empty() {
        return start_with(Vec::new());
    }

    let (promise, all) = AsyncOperation::pending();
    for op in &ops {
        promise.add_upstream(op.canceller());
    }

    let gather = Arc::new(Mutex::new(Gather {
        slots: (0..ops.len()).map(|_| None).collect(),
        remaining: ops.len(),
        promise: Some(promise),
    }));

    for (index, op) in ops.into_iter().enumerate() {
        let gather = Arc::clone(&gather);
        op.on_resolve(move |outcome| {
            let finished = {
                let mut gather = gather.lock().unwrap_or_else(PoisonError::into_inner);
                gather.slots[index] = Some(outcome);
                gather.remaining -= 1;
                if gather.remaining == 0 {
                    let outcomes: Vec<Outcome<T>> =
                        std::mem::take(&mut gather.slots).into_iter().flatten().collect();
                    gather.promise.take().map(|promise| (promise, outcomes))
                } else {
                    None
                }
            };

            if let Some((promise, outcomes)) = finished {
                promise.fulfil(Outcome::Value(outcomes));
            }
        });
    }
    all
}

/// Block the calling thread until `op` is terminal.
pub fn block_until_done<T>(op: AsyncOperation<T>) -> Outcome<T>
where
    T: Send + 'static,
{
    op.shared.wait()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_start_with_is_resolved() {
        let op = start_with((1, "two"));
        assert!(op.is_ready());
        assert_eq!(op.wait().unwrap(), (1, "two"));
    }

    #[test]
    fn test_then_chains_on_resolution() {
        let (promise, op) = AsyncOperation::pending();
        let chained = op.then(|x: i32| Ok(x * 10)).then(|x| Ok(x + 1));
        assert!(!chained.is_ready());

        promise.fulfil(Outcome::Value(4));
        assert_eq!(chained.wait().unwrap(), 41);
    }

    #[test]
    fn test_then_skips_on_error() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let op = AsyncOperation::<i32>::ready(Outcome::Error(Error::domain("nope")));
        let chained = op.then(move |x| {
            flag.store(true, Ordering::SeqCst);
            Ok(x)
        });

        assert!(matches!(chained.block(), Outcome::Error(Error::Domain(_))));
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_then_turns_panic_into_error() {
        let chained = start_with(1).then(|_: i32| -> Result<i32> { panic!("exploded") });
        match chained.block() {
            Outcome::Error(Error::Domain(err)) => assert!(err.message().contains("exploded")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_await_all_preserves_input_order() {
        let (first, a) = AsyncOperation::pending();
        let (second, b) = AsyncOperation::pending();
        let (third, c) = AsyncOperation::pending();
        let all = await_all(vec![a, b, c]);

        third.fulfil(Outcome::Value(3));
        first.fulfil(Outcome::Error(Error::domain("one")));
        assert!(!all.is_ready());
        second.fulfil(Outcome::Value(2));

        let outcomes = all.wait().unwrap();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_error());
        assert!(matches!(outcomes[1], Outcome::Value(2)));
        assert!(matches!(outcomes[2], Outcome::Value(3)));
    }

    #[test]
    fn test_await_all_empty() {
        let all = await_all(Vec::<AsyncOperation<u8>>::new());
        assert!(all.is_ready());
        assert!(all.wait().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_propagates_downstream() {
        let (promise, op) = AsyncOperation::<i32>::pending();
        let canceller = op.canceller();
        let chained = op.then(|x| Ok(x + 1));

        canceller.cancel();
        assert!(!promise.is_pending());
        assert!(chained.block().is_cancelled());
        // late resolution is ignored
        assert!(!promise.fulfil(Outcome::Value(1)));
    }

    #[test]
    fn test_cancel_propagates_upstream() {
        let (first, a) = AsyncOperation::<i32>::pending();
        let (second, b) = AsyncOperation::<i32>::pending();
        let all = await_all(vec![a, b]).then(|outcomes| Ok(outcomes.len()));

        all.cancel();
        assert!(!first.is_pending());
        assert!(!second.is_pending());
        assert!(all.block().is_cancelled());
    }

    #[test]
    fn test_then_async_flattens() {
        let (promise, inner) = AsyncOperation::pending();
        let outer = start_with(5).then_async(move |x: i32| inner.then(move |y: i32| Ok(x * y)));
        assert!(!outer.is_ready());

        promise.fulfil(Outcome::Value(7));
        assert_eq!(outer.wait().unwrap(), 35);
    }
}
