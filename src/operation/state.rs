use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};

use crate::error::{Error, Result};

/// Terminal outcome of an [`AsyncOperation`](super::AsyncOperation).
#[derive(Debug)]
pub enum Outcome<T> {
    Value(T),
    Error(Error),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn into_result(self) -> Result<T> {
        match self {
            Outcome::Value(value) => Ok(value),
            Outcome::Error(error) => Err(error),
            Outcome::Cancelled => Err(Error::Cancelled),
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn value(self) -> Option<T> {
        match self {
            Outcome::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Value(value) => Outcome::Value(f(value)),
            Outcome::Error(error) => Outcome::Error(error),
            Outcome::Cancelled => Outcome::Cancelled,
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Value(value),
            Err(Error::Cancelled) => Outcome::Cancelled,
            Err(error) => Outcome::Error(error),
        }
    }
}

/// Run `f`, turning a panic into a domain error so the owning operation still resolves.
pub(crate) fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Outcome<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result.into(),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            tracing::warn!("unit of work panicked: {}", message);
            Outcome::Error(Error::domain(format!("panicked: {message}")))
        }
    }
}

pub(crate) type Continuation<T> = Box<dyn FnOnce(Outcome<T>) + Send>;

/// Something that can be asked to stop.
pub(crate) trait Cancel: Send + Sync {
    fn cancel(&self);
}

/// Cloneable, best-effort cancellation handle for one operation.
///
/// Cancelling an unresolved operation resolves it to `Cancelled`, which flows
/// to everything chained from it, and forwards the request to the operations
/// it was built from. Work that is already running is never interrupted.
#[derive(Clone)]
pub struct Canceller {
    target: Weak<dyn Cancel>,
}

impl Canceller {
    pub fn cancel(&self) {
        if let Some(target) = self.target.upgrade() {
            target.cancel();
        }
    }
}

impl std::fmt::Debug for Canceller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canceller")
            .field("live", &(self.target.strong_count() > 0))
            .finish()
    }
}

enum State<T> {
    Pending {
        continuation: Option<Continuation<T>>,
        upstream: Vec<Canceller>,
    },
    Resolved(Outcome<T>),
    Consumed,
}

/// State machine shared by an operation handle and whoever resolves it.
pub(crate) struct Shared<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T: Send + 'static> Shared<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::Pending {
                continuation: None,
                upstream: Vec::new(),
            }),
            ready: Condvar::new(),
        })
    }

    pub(crate) fn resolved(outcome: Outcome<T>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::Resolved(outcome)),
            ready: Condvar::new(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn canceller(self: &Arc<Self>) -> Canceller {
        let target: Weak<dyn Cancel> = Arc::downgrade(self) as Weak<dyn Cancel>;
        Canceller { target }
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(*self.lock(), State::Pending { .. })
    }

    /// Remember an operation this one was derived from, for cancellation
    pub(crate) fn add_upstream(&self, canceller: Canceller) {
        if let State::Pending { upstream, .. } = &mut *self.lock() {
            upstream.push(canceller);
        }
    }

    /// First resolution wins; returns the upstream handles when this call won.
    fn settle(&self, outcome: Outcome<T>) -> Option<Vec<Canceller>> {
        let mut state = self.lock();
        let (continuation, upstream) = match &mut *state {
            State::Pending {
                continuation,
                upstream,
            } => (continuation.take(), std::mem::take(upstream)),
            _ => return None,
        };

        match continuation {
            Some(continuation) => {
                *state = State::Consumed;
                drop(state);
                continuation(outcome);
            }
            None => {
                *state = State::Resolved(outcome);
                drop(state);
                self.ready.notify_all();
            }
        }
        Some(upstream)
    }

    pub(crate) fn resolve(&self, outcome: Outcome<T>) -> bool {
        self.settle(outcome).is_some()
    }

    /// Register the single consumer; runs immediately when already resolved.
    pub(crate) fn on_resolve(&self, continuation: Continuation<T>) {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, State::Consumed) {
            State::Pending { upstream, .. } => {
                *state = State::Pending {
                    continuation: Some(continuation),
                    upstream,
                };
            }
            State::Resolved(outcome) => {
                drop(state);
                continuation(outcome);
            }
            State::Consumed => {
                tracing::warn!("operation consumed twice; continuation dropped");
            }
        }
    }

    /// Block the calling thread until resolved, then take the outcome.
    pub(crate) fn wait(&self) -> Outcome<T> {
        let mut state = self.lock();
        loop {
            match std::mem::replace(&mut *state, State::Consumed) {
                State::Resolved(outcome) => return outcome,
                pending @ State::Pending { .. } => {
                    *state = pending;
                    state = self
                        .ready
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                State::Consumed => {
                    return Outcome::Error(Error::domain("operation outcome already consumed"));
                }
            }
        }
    }
}

impl<T: Send + 'static> Cancel for Shared<T> {
    fn cancel(&self) {
        if let Some(upstream) = self.settle(Outcome::Cancelled) {
            tracing::trace!("operation cancelled; forwarding to {} upstream", upstream.len());
            for canceller in upstream {
                canceller.cancel();
            }
        }
    }
}

/// Write side of an operation. First resolution wins; later ones are ignored.
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> Promise<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    pub fn fulfil(&self, outcome: Outcome<T>) -> bool {
        self.shared.resolve(outcome)
    }

    /// False once the operation has resolved, including by cancellation
    pub fn is_pending(&self) -> bool {
        self.shared.is_pending()
    }

    pub(crate) fn add_upstream(&self, canceller: Canceller) {
        self.shared.add_upstream(canceller);
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}
