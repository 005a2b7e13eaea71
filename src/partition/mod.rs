//! Range partitioning and chunk dispatch
//!
//! [`dispatch`] splits a [`Range`] into ordered, disjoint [`Chunk`]s sized for
//! the policy and the cursor's [`Capability`], submits one unit of work per
//! chunk and folds the ordered outcomes through an [`AlgorithmContract`].
//! Algorithms with a destination write through an [`OutputRange`], at the
//! same offset and length as the input chunk.
//!
//! ```rust
//! use std::sync::Arc;
//! use parex::partition::{AlgorithmContract, Chunk, Range, SliceCursor, execute};
//! use parex::{ExecutionPolicy, Result};
//!
//! struct Count;
//!
//! impl AlgorithmContract<SliceCursor<u8>> for Count {
//!     type Partial = usize;
//!     type Output = usize;
//!
//!     fn per_chunk(&self, chunk: Chunk<SliceCursor<u8>>) -> Result<usize> {
//!         Ok(chunk.len)
//!     }
//!
//!     fn merge(&self, partials: Vec<usize>) -> Result<usize> {
//!         Ok(partials.into_iter().sum())
//!     }
//! }
//!
//! let data: Arc<[u8]> = vec![0; 1000].into();
//! let (begin, end) = SliceCursor::range(&data);
//! let total = execute(Range::new(begin, end), &ExecutionPolicy::par(), Count).get().unwrap();
//! assert_eq!(total, 1000);
//! ```

pub mod chunk;
pub mod cursor;
pub mod dispatch;
pub mod output;

pub use chunk::{Chunk, ChunkIter, Extent, Partition, Range, partition};
pub use cursor::{Capability, Cursor, ForwardCursor, SliceCursor, Zip, distance};
pub use dispatch::{AlgorithmContract, Completion, dispatch, execute};
pub use output::OutputRange;
