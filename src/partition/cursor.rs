//! Range cursors and their traversal capability
//!
//! A [`Cursor`] marks a position in a sequence. Every cursor can step forward
//! one element at a time; random-access cursors additionally answer
//! [`distance_to`](Cursor::distance_to) and jump with
//! [`advance_by`](Cursor::advance_by) in constant time. Partitioning branches
//! on that capability.

use std::sync::Arc;

/// How a cursor can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// One step at a time; distances need a traversal
    Forward,
    /// Constant-time distance and jumps
    RandomAccess,
}

impl Capability {
    /// The weaker of two capabilities
    pub const fn meet(self, other: Capability) -> Capability {
        match (self, other) {
            (Capability::RandomAccess, Capability::RandomAccess) => Capability::RandomAccess,
            _ => Capability::Forward,
        }
    }
}

/// A position in a sequence.
///
/// Reading never mutates the sequence, so clones of a cursor may be used from
/// different threads at once.
pub trait Cursor: Clone + PartialEq + Send + 'static {
    type Item;

    const CAPABILITY: Capability = Capability::Forward;

    /// The element at this position; the position must not be an end.
    fn read(&self) -> Self::Item;

    fn advance_one(&mut self);

    /// Elements between `self` and `end`, when computable without traversal
    fn distance_to(&self, _end: &Self) -> Option<usize> {
        None
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance_one();
        }
    }

    /// A copy of this cursor moved `n` elements forward
    fn advanced(&self, n: usize) -> Self {
        let mut cursor = self.clone();
        cursor.advance_by(n);
        cursor
    }
}

/// Number of elements in `[begin, end)`.
///
/// Constant time for random-access cursors; a full traversal otherwise, so
/// `end` must be reachable from `begin`.
pub fn distance<C: Cursor>(begin: &C, end: &C) -> usize {
    if let Some(n) = begin.distance_to(end) {
        return n;
    }

    let mut cursor = begin.clone();
    let mut n = 0;
    while cursor != *end {
        cursor.advance_one();
        n += 1;
    }
    n
}

/// Random-access cursor over shared, immutable storage.
pub struct SliceCursor<T> {
    data: Arc<[T]>,
    pos: usize,
}

impl<T> SliceCursor<T> {
    pub fn begin(data: &Arc<[T]>) -> Self {
        Self {
            data: Arc::clone(data),
            pos: 0,
        }
    }

    pub fn end(data: &Arc<[T]>) -> Self {
        Self {
            data: Arc::clone(data),
            pos: data.len(),
        }
    }

    /// `(begin, end)` over all of `data`
    pub fn range(data: &Arc<[T]>) -> (Self, Self) {
        (Self::begin(data), Self::end(data))
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<T> Clone for SliceCursor<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            pos: self.pos,
        }
    }
}

impl<T> PartialEq for SliceCursor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos && Arc::ptr_eq(&self.data, &other.data)
    }
}

impl<T> std::fmt::Debug for SliceCursor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliceCursor")
            .field("pos", &self.pos)
            .field("len", &self.data.len())
            .finish()
    }
}

impl<T> Cursor for SliceCursor<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    const CAPABILITY: Capability = Capability::RandomAccess;

    fn read(&self) -> T {
        self.data[self.pos].clone()
    }

    fn advance_one(&mut self) {
        self.pos += 1;
    }

    fn distance_to(&self, end: &Self) -> Option<usize> {
        Some(end.pos.saturating_sub(self.pos))
    }

    fn advance_by(&mut self, n: usize) {
        self.pos += n;
    }
}

/// Restricts any cursor to forward-only traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardCursor<C>(pub C);

impl<C: Cursor> Cursor for ForwardCursor<C> {
    type Item = C::Item;

    fn read(&self) -> C::Item {
        self.0.read()
    }

    fn advance_one(&mut self) {
        self.0.advance_one();
    }
}

/// Two cursors moving in lockstep, led by the first.
///
/// Equality and distance consult only the leading cursor, so an end position
/// may carry any second component.
#[derive(Debug, Clone)]
pub struct Zip<A, B> {
    pub lead: A,
    pub follow: B,
}

impl<A, B> Zip<A, B> {
    pub fn new(lead: A, follow: B) -> Self {
        Self { lead, follow }
    }
}

impl<A: PartialEq, B> PartialEq for Zip<A, B> {
    fn eq(&self, other: &Self) -> bool {
        self.lead == other.lead
    }
}

impl<A: Cursor, B: Cursor> Cursor for Zip<A, B> {
    type Item = (A::Item, B::Item);

    const CAPABILITY: Capability = A::CAPABILITY.meet(B::CAPABILITY);

    fn read(&self) -> Self::Item {
        (self.lead.read(), self.follow.read())
    }

    fn advance_one(&mut self) {
        self.lead.advance_one();
        self.follow.advance_one();
    }

    fn distance_to(&self, end: &Self) -> Option<usize> {
        match Self::CAPABILITY {
            Capability::RandomAccess => self.lead.distance_to(&end.lead),
            Capability::Forward => None,
        }
    }

    fn advance_by(&mut self, n: usize) {
        self.lead.advance_by(n);
        self.follow.advance_by(n);
    }
}
