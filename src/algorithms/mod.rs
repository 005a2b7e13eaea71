//! Bulk algorithms built on the dispatch engine
//!
//! - [`transform`]: independent chunks, outputs concatenated positionally
//! - [`transform_into`]: the same, written into a caller-supplied [`OutputRange`](crate::partition::OutputRange)
//! - [`lexicographical_compare`]: order-dependent chunks, resolved left to right

pub mod lexicographical;
pub mod transform;

pub use lexicographical::{
    lexicographical_compare, lexicographical_compare_after, lexicographical_compare_by,
};
pub use transform::{transform, transform_after, transform_into, try_transform, try_transform_into};
