//! Asynchronous operation composition
//!
//! An [`AsyncOperation`] is an explicit state machine (pending, value, error,
//! cancelled) with a single consumer. Combinators build pipelines out of it
//! without committing to a particular concurrency primitive:
//!
//! - [`start_with`] seeds a pipeline with values that are already available
//! - [`on`] moves the continuation of an operation onto an executor
//! - [`then`] / [`then_async`] chain work after an operation resolves
//! - [`await_all`] fans in a sequence of operations, keeping input order
//! - [`block_until_done`] is the only combinator that blocks the calling thread
//!
//! ```rust
//! use parex::operation::{await_all, start_with};
//!
//! let total = await_all(vec![start_with(1), start_with(2)])
//!     .then(|outcomes| Ok(outcomes.into_iter().filter_map(|o| o.value()).sum::<i32>()));
//! assert_eq!(total.wait().unwrap(), 3);
//! ```

pub mod combinators;
pub mod handle;
pub mod state;

pub use combinators::{await_all, block_until_done, on, start_with, then, then_async};
pub use handle::AsyncOperation;
pub use state::{Canceller, Outcome, Promise};
