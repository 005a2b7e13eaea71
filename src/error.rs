//! Error taxonomy for policy construction, submission, chunk work and aggregation.

use std::fmt;

use crate::policy::Mode;

/// Result type alias for parex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a dispatch can surface.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The execution policy could not be constructed
    #[error("invalid execution policy: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The scheduling substrate refused a unit of work
    #[error("submission failed: {0}")]
    SubmissionFailed(#[from] SubmitError),

    /// An ordinary failure raised by chunk work
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Resource exhaustion; preempts aggregation
    #[error("fatal: {0}")]
    Fatal(#[from] FatalError),

    /// Ordinary failures of several chunks, in chunk order
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// The operation was cancelled before it resolved
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Build a domain error from a message
    pub fn domain(message: impl Into<String>) -> Self {
        Error::Domain(DomainError::new(message))
    }

    /// Wrap any error as a domain error, keeping it as the source
    pub fn from_source<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Domain(DomainError::from_source(source))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// The aggregate, if this is one
    pub fn as_aggregate(&self) -> Option<&AggregateError> {
        match self {
            Error::Aggregate(aggregate) => Some(aggregate),
            _ => None,
        }
    }
}

/// Invalid policy construction, detected eagerly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{mode} mode cannot run on a context tagged for synchronous submission")]
    SerialContext { mode: Mode },

    #[error("execution context `{name}` has been shut down")]
    ContextShutDown { name: String },

    #[error("minimum chunk size must be at least 1")]
    ZeroChunkSize,

    #[error("chunks per worker must be at least 1")]
    ZeroChunksPerWorker,

    #[error("maximum chunk count must be at least 1")]
    ZeroMaxChunks,
}

/// Why a substrate refused to enqueue work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("scheduling substrate is exhausted")]
    Exhausted,

    #[error("scheduling substrate is shut down")]
    ShutDown,
}

/// Resource-exhaustion class failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FatalError {
    #[error("memory allocation failed")]
    AllocationFailure,

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
}

/// An ordinary computation failure raised inside a chunk.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DomainError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DomainError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn from_source<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One failed chunk inside an [`AggregateError`].
#[derive(Debug)]
pub struct ChunkFailure {
    pub index: usize,
    pub error: Error,
}

/// Ordinary failures collected from every failing chunk, ordered by chunk index.
#[derive(Debug, Default)]
pub struct AggregateError {
    failures: Vec<ChunkFailure>,
}

impl AggregateError {
    /// Failures must be pushed in ascending chunk order
    pub(crate) fn push(&mut self, index: usize, error: Error) {
        debug_assert!(self.failures.last().is_none_or(|last| last.index < index));
        self.failures.push(ChunkFailure { index, error });
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChunkFailure> {
        self.failures.iter()
    }

    /// Chunk indices that failed, ascending
    pub fn indices(&self) -> Vec<usize> {
        self.failures.iter().map(|failure| failure.index).collect()
    }

    pub fn into_failures(self) -> Vec<ChunkFailure> {
        self.failures
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} chunk(s) failed", self.failures.len())?;
        for (position, failure) in self.failures.iter().enumerate() {
            let separator = if position == 0 { ": " } else { "; " };
            write!(f, "{separator}chunk {}: {}", failure.index, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

impl<'a> IntoIterator for &'a AggregateError {
    type Item = &'a ChunkFailure;
    type IntoIter = std::slice::Iter<'a, ChunkFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}
