//! Folding per-chunk outcomes into one deterministic result
//!
//! Precedence, whatever order chunks finished in:
//!
//! 1. the first [`Fatal`](crate::Error::Fatal) outcome by chunk index, alone
//! 2. [`Cancelled`](crate::Error::Cancelled) if any chunk was cancelled
//! 3. every ordinary failure, in chunk order, as an [`AggregateError`]
//! 4. otherwise the values, in chunk order

use crate::error::{AggregateError, Error, Result};
use crate::operation::Outcome;

/// Classify `outcomes` (indexed by position) and return the values or a single error.
pub fn collect<T>(outcomes: Vec<Outcome<T>>) -> Result<Vec<T>> {
    let mut values = Vec::with_capacity(outcomes.len());
    let mut failures = AggregateError::default();
    let mut cancelled = false;

    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Outcome::Value(value) => values.push(value),
            Outcome::Error(error) if error.is_fatal() => {
                tracing::debug!("chunk {} failed fatally, discarding the rest", index);
                return Err(error);
            }
            Outcome::Error(Error::Cancelled) | Outcome::Cancelled => cancelled = true,
            Outcome::Error(error) => failures.push(index, error),
        }
    }

    if cancelled {
        return Err(Error::Cancelled);
    }
    if !failures.is_empty() {
        tracing::debug!("{} chunk(s) failed: {:?}", failures.len(), failures.indices());
        return Err(failures.into());
    }
    Ok(values)
}

/// What one chunk of an order-dependent algorithm concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<V> {
    /// The chunk settles the whole answer, unless an earlier chunk already did
    Decided(V),
    /// Nothing in this chunk distinguishes the inputs
    Undecided,
}

impl<V> Verdict<V> {
    pub fn is_decided(&self) -> bool {
        matches!(self, Verdict::Decided(_))
    }
}

/// Left-to-right resolution: the first decided verdict wins, later ones are discarded.
pub fn first_decided<V>(verdicts: impl IntoIterator<Item = Verdict<V>>) -> Option<V> {
    verdicts.into_iter().find_map(|verdict| match verdict {
        Verdict::Decided(value) => Some(value),
        Verdict::Undecided => None,
    })
}
