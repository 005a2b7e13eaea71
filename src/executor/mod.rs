//! Executor binding and scheduling substrates
//!
//! The crate owns no threads. A [`Substrate`] is whatever actually runs work
//! (a rayon pool, the calling thread, a hand-driven queue); an
//! [`ExecutionContext`] pairs one with the launch tag it submits under; and
//! [`bind`] turns a context into an [`Executor`], the surface dispatch submits
//! through.
//!
//! ```text
//! ExecutionPolicy ──▶ ExecutionContext ──▶ Executor::submit ──▶ Substrate
//!   (mode, launch)     (substrate, tag)     (AsyncOperation)     (runs Work)
//! ```

pub mod binding;
pub mod context;
pub mod manual;
pub mod pool;
pub mod substrate;

pub use binding::{Executor, bind};
pub use context::ExecutionContext;
pub use manual::ManualSubstrate;
pub use pool::ThreadPoolSubstrate;
pub use substrate::{InlineSubstrate, Rejected, Substrate, Work};
