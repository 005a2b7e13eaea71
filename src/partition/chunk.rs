use super::cursor::{Capability, Cursor};

/// The far side of a [`Range`].
#[derive(Debug, Clone)]
pub enum Extent<C> {
    End(C),
    Count(usize),
}

/// Input range for a dispatch.
#[derive(Debug, Clone)]
pub struct Range<C> {
    pub begin: C,
    pub extent: Extent<C>,
}

impl<C: Cursor> Range<C> {
    /// `[begin, end)`; `end` must be reachable from `begin`
    pub fn new(begin: C, end: C) -> Self {
        Self {
            begin,
            extent: Extent::End(end),
        }
    }

    /// `len` elements starting at `begin`
    pub fn counted(begin: C, len: usize) -> Self {
        Self {
            begin,
            extent: Extent::Count(len),
        }
    }

    /// Element count if it is known without traversal
    pub fn known_len(&self) -> Option<usize> {
        match &self.extent {
            Extent::Count(len) => Some(*len),
            Extent::End(end) => self.begin.distance_to(end),
        }
    }
}

/// A contiguous, disjoint slice of the input assigned to one unit of work.
#[derive(Debug, Clone)]
pub struct Chunk<C> {
    pub begin: C,
    pub end: C,
    /// Position of this chunk in the overall ordering
    pub index: usize,
    /// Position of the chunk's first element in the range
    pub offset: usize,
    pub len: usize,
}

impl<C: Cursor> Chunk<C> {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The chunk's elements, in order
    pub fn iter(&self) -> ChunkIter<C> {
        ChunkIter {
            cursor: self.begin.clone(),
            remaining: self.len,
        }
    }
}

/// Reads a chunk element by element.
pub struct ChunkIter<C> {
    cursor: C,
    remaining: usize,
}

impl<C: Cursor> Iterator for ChunkIter<C> {
    type Item = C::Item;

    fn next(&mut self) -> Option<C::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.cursor.read();
        self.cursor.advance_one();
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<C: Cursor> ExactSizeIterator for ChunkIter<C> {}

/// Ordered chunks covering a range exactly.
#[derive(Debug)]
pub struct Partition<C> {
    pub chunks: Vec<Chunk<C>>,
    /// Total number of elements
    pub len: usize,
    /// Whether boundaries came from arithmetic rather than a traversal
    pub capability: Capability,
}

impl<C> Partition<C> {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Split `range` into at most `chunk_count(len)` ordered, non-overlapping chunks.
///
/// `chunk_count` maps the total length to the number of chunks wanted.
/// Random-access and counted ranges have sizes that differ by at most one
/// element. A forward-only range with an end cursor is measured by a single
/// linear pre-pass that keeps a checkpoint every `grain` elements; chunks are
/// then cut at checkpoints, so their sizes are multiples of `grain` except for
/// the last one. The pre-pass is a precondition of forward-only input, not a
/// cost this function can avoid.
pub fn partition<C, K>(range: Range<C>, grain: usize, chunk_count: K) -> Partition<C>
where
    C: Cursor,
    K: FnOnce(usize) -> usize,
{
    let grain = grain.max(1);
    match range.extent {
        Extent::Count(len) => split_known(range.begin, len, chunk_count(len), C::CAPABILITY),
        Extent::End(end) => match range.begin.distance_to(&end) {
            Some(len) => split_known(range.begin, len, chunk_count(len), C::CAPABILITY),
            None => split_by_checkpoints(range.begin, &end, grain, chunk_count),
        },
    }
}

fn split_known<C: Cursor>(begin: C, len: usize, k: usize, capability: Capability) -> Partition<C> {
    let k = k.min(len);
    let mut chunks = Vec::with_capacity(k);
    if k == 0 {
        return Partition {
            chunks,
            len,
            capability,
        };
    }

    let base = len / k;
    let extra = len % k;
    let mut cursor = begin;
    let mut offset = 0;

    for index in 0..k {
        let size = base + usize::from(index < extra);
        let next = cursor.advanced(size);
        chunks.push(Chunk {
            begin: cursor,
            end: next.clone(),
            index,
            offset,
            len: size,
        });
        cursor = next;
        offset += size;
    }

    Partition {
        chunks,
        len,
        capability,
    }
}

fn split_by_checkpoints<C, K>(begin: C, end: &C, grain: usize, chunk_count: K) -> Partition<C>
where
    C: Cursor,
    K: FnOnce(usize) -> usize,
{
    // one traversal: count elements, remember every grain-th position
    let mut checkpoints = Vec::new();
    let mut cursor = begin;
    let mut len = 0;
    while cursor != *end {
        if len % grain == 0 {
            checkpoints.push(cursor.clone());
        }
        cursor.advance_one();
        len += 1;
    }

    let k = chunk_count(len).min(checkpoints.len());
    let mut chunks = Vec::with_capacity(k);
    if k == 0 {
        return Partition {
            chunks,
            len,
            capability: Capability::Forward,
        };
    }

    let groups = checkpoints.len();
    let base = groups / k;
    let extra = groups % k;
    let mut first = 0;
    let mut slots: Vec<Option<C>> = checkpoints.into_iter().map(Some).collect();

    for index in 0..k {
        let count = base + usize::from(index < extra);
        let next = first + count;
        let chunk_begin = slots[first].take();
        let chunk_end = if next < groups {
            slots[next].clone()
        } else {
            Some(end.clone())
        };
        let offset = first * grain;
        let stop = if next < groups { next * grain } else { len };

        if let (Some(begin), Some(end)) = (chunk_begin, chunk_end) {
            chunks.push(Chunk {
                begin,
                end,
                index,
                offset,
                len: stop - offset,
            });
        }
        first = next;
    }

    Partition {
        chunks,
        len,
        capability: Capability::Forward,
    }
}
