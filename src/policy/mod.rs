//! Execution policies and launch descriptors
//!
//! A policy answers three questions for the dispatch engine, without side effects:
//! - may more than one unit of work run at once ([`Mode::is_concurrent`])
//! - may chunk work reorder or vectorize element operations ([`Mode::is_unsequenced`])
//! - does the call hand back a value or a handle ([`Launch`])
//!
//! ```rust
//! use parex::policy::{ExecutionPolicy, Launch, Mode};
//!
//! let policy = ExecutionPolicy::par().task();
//! assert_eq!(policy.mode(), Mode::Parallel);
//! assert_eq!(policy.launch(), Launch::Async);
//! ```

pub mod core;
pub mod launch;

pub use self::core::{ChunkingParams, ExecutionPolicy, Mode};
pub use launch::Launch;
