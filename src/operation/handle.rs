use std::sync::Arc;

use super::combinators;
use super::state::{Canceller, Outcome, Promise, Shared};
use crate::error::Result;
use crate::executor::Executor;

/// A computation that will produce a value, an error, or be cancelled.
///
/// Handles are single-consumption: chaining, awaiting or blocking takes the
/// handle by value. Use [`canceller`](Self::canceller) to keep a way of
/// cancelling it after it has been handed on.
#[must_use = "an operation's outcome is only observed through its handle"]
pub struct AsyncOperation<T> {
    pub(crate) shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> AsyncOperation<T> {
    /// An unresolved operation together with the promise that resolves it
    pub fn pending() -> (Promise<T>, Self) {
        let shared = Shared::new();
        (Promise::new(Arc::clone(&shared)), Self { shared })
    }

    pub fn ready(outcome: Outcome<T>) -> Self {
        Self {
            shared: Shared::resolved(outcome),
        }
    }

    /// Non-blocking probe
    pub fn is_ready(&self) -> bool {
        !self.shared.is_pending()
    }

    pub fn canceller(&self) -> Canceller {
        self.shared.canceller()
    }

    pub fn cancel(&self) {
        self.canceller().cancel();
    }

    pub fn then<U, F>(self, f: F) -> AsyncOperation<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        combinators::then(self, f)
    }

    pub fn then_async<U, F>(self, f: F) -> AsyncOperation<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> AsyncOperation<U> + Send + 'static,
    {
        combinators::then_async(self, f)
    }

    pub fn on(self, executor: &Executor) -> AsyncOperation<T> {
        combinators::on(self, executor)
    }

    /// Block until resolved and return the raw outcome
    pub fn block(self) -> Outcome<T> {
        combinators::block_until_done(self)
    }

    /// Block until resolved; cancellation surfaces as [`Error::Cancelled`](crate::Error::Cancelled)
    pub fn wait(self) -> Result<T> {
        self.block().into_result()
    }

    pub(crate) fn on_resolve(self, continuation: impl FnOnce(Outcome<T>) + Send + 'static) {
        self.shared.on_resolve(Box::new(continuation));
    }
}

impl<T> std::fmt::Debug for AsyncOperation<T>
where
    T: Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncOperation")
            .field("ready", &self.is_ready())
            .finish()
    }
}
