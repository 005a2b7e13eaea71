use std::fmt;

/// Call convention of a bulk algorithm invocation, and the tag a context uses
/// to decide between inline and deferred submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Launch {
    /// The caller blocks until the result is materialized
    #[default]
    Sync,
    /// The caller receives a handle and observes the outcome later
    Async,
}

impl Launch {
    pub fn is_sync(self) -> bool {
        matches!(self, Launch::Sync)
    }
}

impl fmt::Display for Launch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Launch::Sync => f.write_str("sync"),
            Launch::Async => f.write_str("async"),
        }
    }
}
