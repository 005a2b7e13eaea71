//! # parex - policy-driven parallel algorithm execution
//!
//! A runtime-agnostic engine for bulk algorithms. Callers hand it an
//! [`ExecutionPolicy`], a range of cursors and an operation; it partitions the
//! range into chunks, submits one unit of work per chunk to an existing
//! scheduling substrate, and folds the ordered chunk outcomes into one
//! deterministic result or error.
//!
//! ## Features
//!
//! - **Four execution modes**: sequential, unsequenced, parallel and parallel-unsequenced
//! - **Blocking or deferred**: `Sync` calls return the value, `Async` calls return an [`AsyncOperation`]
//! - **Forward or random access**: chunk boundaries by arithmetic or by one linear pre-pass
//! - **Deterministic errors**: chunk failures aggregate in chunk order, fatal errors preempt
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use parex::algorithms::transform;
//! use parex::partition::SliceCursor;
//! use parex::ExecutionPolicy;
//!
//! let a: Arc<[i32]> = (0..1000).collect::<Vec<_>>().into();
//! let b: Arc<[i32]> = (0..1000).collect::<Vec<_>>().into();
//!
//! let sums = transform(
//!     &ExecutionPolicy::par(),
//!     SliceCursor::begin(&a),
//!     SliceCursor::end(&a),
//!     SliceCursor::begin(&b),
//!     |x, y| x + y,
//! )
//! .get()
//! .unwrap();
//! assert_eq!(sums[10], 20);
//! ```

pub mod aggregate;
pub mod algorithms;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod operation;
pub mod partition;
pub mod policy;

pub use error::{AggregateError, ConfigurationError, Error, FatalError, Result, SubmitError};
pub use executor::{ExecutionContext, Executor, bind};
pub use operation::{AsyncOperation, Outcome};
pub use partition::{AlgorithmContract, Completion, dispatch};
pub use policy::{ChunkingParams, ExecutionPolicy, Launch, Mode};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
