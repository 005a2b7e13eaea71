use std::marker::PhantomData;

use crate::error::{Error, Result};
use crate::operation::{AsyncOperation, Outcome};
use crate::partition::{
    AlgorithmContract, Chunk, Completion, Cursor, OutputRange, Range, Zip, dispatch, execute,
};
use crate::policy::ExecutionPolicy;

/// Elementwise binary transform. Chunks are independent; the merge
/// concatenates their outputs positionally.
struct BinaryTransform<A, B, F> {
    op: F,
    unsequenced: bool,
    _cursors: PhantomData<fn(A, B)>,
}

impl<A, B, U, F> AlgorithmContract<Zip<A, B>> for BinaryTransform<A, B, F>
where
    A: Cursor,
    B: Cursor,
    U: Send + 'static,
    F: Fn(A::Item, B::Item) -> Result<U> + Send + Sync + 'static,
{
    type Partial = Vec<U>;
    type Output = Vec<U>;

    fn per_chunk(&self, chunk: Chunk<Zip<A, B>>) -> Result<Vec<U>> {
        if self.unsequenced {
            // read the whole slice first, then map it in one pass
            let pairs: Vec<(A::Item, B::Item)> = chunk.iter().collect();
            return pairs.into_iter().map(|(a, b)| (self.op)(a, b)).collect();
        }

        let mut out = Vec::with_capacity(chunk.len);
        for (a, b) in chunk.iter() {
            out.push((self.op)(a, b)?);
        }
        Ok(out)
    }

    fn merge(&self, partials: Vec<Vec<U>>) -> Result<Vec<U>> {
        let total = partials.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(total);
        for partial in partials {
            out.extend(partial);
        }
        Ok(out)
    }
}

/// Binary transform writing into a caller-supplied destination. Each chunk
/// commits the values it produced, up to its first failure, to the
/// destination slots matching its own input positions.
struct TransformInto<A, B, U, F> {
    op: F,
    unsequenced: bool,
    dest: OutputRange<U>,
    _cursors: PhantomData<fn(A, B)>,
}

impl<A, B, U, F> TransformInto<A, B, U, F>
where
    A: Cursor,
    B: Cursor,
    F: Fn(A::Item, B::Item) -> Result<U>,
{
    fn apply<I>(&self, pairs: I, capacity: usize) -> (Vec<U>, Option<Error>)
    where
        I: IntoIterator<Item = (A::Item, B::Item)>,
    {
        let mut produced = Vec::with_capacity(capacity);
        for (a, b) in pairs {
            match (self.op)(a, b) {
                Ok(value) => produced.push(value),
                Err(error) => return (produced, Some(error)),
            }
        }
        (produced, None)
    }
}

impl<A, B, U, F> AlgorithmContract<Zip<A, B>> for TransformInto<A, B, U, F>
where
    A: Cursor,
    B: Cursor,
    U: Send + 'static,
    F: Fn(A::Item, B::Item) -> Result<U> + Send + Sync + 'static,
{
    /// Destination position one past the chunk's last slot
    type Partial = usize;
    type Output = usize;

    fn per_chunk(&self, chunk: Chunk<Zip<A, B>>) -> Result<usize> {
        let available = self.dest.len();
        if chunk.offset + chunk.len > available {
            return Err(destination_too_short(available, chunk.offset + chunk.len));
        }

        let (produced, failure) = if self.unsequenced {
            let pairs: Vec<(A::Item, B::Item)> = chunk.iter().collect();
            self.apply(pairs, chunk.len)
        } else {
            self.apply(chunk.iter(), chunk.len)
        };

        let end = self.dest.write_at(chunk.offset, produced)?;
        match failure {
            Some(error) => Err(error),
            None => Ok(end),
        }
    }

    fn merge(&self, partials: Vec<usize>) -> Result<usize> {
        Ok(partials.last().copied().unwrap_or(0))
    }
}

fn destination_too_short(available: usize, needed: usize) -> Error {
    Error::domain(format!(
        "destination holds {available} element(s), input needs {needed}"
    ))
}

fn contract<A, B, F>(policy: &ExecutionPolicy, op: F) -> BinaryTransform<A, B, F> {
    BinaryTransform {
        op,
        unsequenced: policy.is_unsequenced(),
        _cursors: PhantomData,
    }
}

fn zipped<A: Cursor, B: Cursor>(first1: A, last1: A, first2: B) -> Range<Zip<A, B>> {
    // the end only needs its leading component
    let end = Zip::new(last1, first2.clone());
    Range::new(Zip::new(first1, first2), end)
}

/// Apply `op` to each pair `([first1, last1), first2..)`, returning the results in order.
///
/// The second range must hold at least as many elements as the first.
pub fn transform<A, B, U, F>(
    policy: &ExecutionPolicy,
    first1: A,
    last1: A,
    first2: B,
    op: F,
) -> Completion<Vec<U>>
where
    A: Cursor,
    B: Cursor,
    U: Send + 'static,
    F: Fn(A::Item, B::Item) -> U + Send + Sync + 'static,
{
    try_transform(policy, first1, last1, first2, move |a, b| Ok(op(a, b)))
}

/// Like [`transform`], for operations that can fail.
///
/// Every chunk runs to completion even when another fails; ordinary failures
/// come back as one [`AggregateError`](crate::AggregateError) in chunk order,
/// a [`FatalError`](crate::FatalError) comes back alone.
pub fn try_transform<A, B, U, F>(
    policy: &ExecutionPolicy,
    first1: A,
    last1: A,
    first2: B,
    op: F,
) -> Completion<Vec<U>>
where
    A: Cursor,
    B: Cursor,
    U: Send + 'static,
    F: Fn(A::Item, B::Item) -> Result<U> + Send + Sync + 'static,
{
    execute(zipped(first1, last1, first2), policy, contract(policy, op))
}

/// Apply `op` to each pair and write the results into `dest` at matching positions.
///
/// Resolves to the destination position one past the last element written,
/// which equals the input length on success.
pub fn transform_into<A, B, U, F>(
    policy: &ExecutionPolicy,
    first1: A,
    last1: A,
    first2: B,
    dest: &OutputRange<U>,
    op: F,
) -> Completion<usize>
where
    A: Cursor,
    B: Cursor,
    U: Send + 'static,
    F: Fn(A::Item, B::Item) -> U + Send + Sync + 'static,
{
    try_transform_into(policy, first1, last1, first2, dest, move |a, b| Ok(op(a, b)))
}

/// Like [`transform_into`], for operations that can fail.
///
/// Chunks that succeed keep their writes when others fail, and a failing
/// chunk keeps the values it produced before its first failure.
pub fn try_transform_into<A, B, U, F>(
    policy: &ExecutionPolicy,
    first1: A,
    last1: A,
    first2: B,
    dest: &OutputRange<U>,
    op: F,
) -> Completion<usize>
where
    A: Cursor,
    B: Cursor,
    U: Send + 'static,
    F: Fn(A::Item, B::Item) -> Result<U> + Send + Sync + 'static,
{
    let range = zipped(first1, last1, first2);
    let available = dest.len();
    if let Some(needed) = range.known_len().filter(|needed| *needed > available) {
        let error = destination_too_short(available, needed);
        return if policy.is_blocking() {
            Completion::Ready(Err(error))
        } else {
            Completion::Deferred(AsyncOperation::ready(Outcome::Error(error)))
        };
    }

    let algorithm = TransformInto {
        op,
        unsequenced: policy.is_unsequenced(),
        dest: dest.clone(),
        _cursors: PhantomData,
    };
    execute(range, policy, algorithm)
}

/// Transform over cursors produced by `upstream`, continuing the pipeline.
pub fn transform_after<A, B, U, F>(
    upstream: AsyncOperation<(A, A, B)>,
    policy: &ExecutionPolicy,
    op: F,
) -> AsyncOperation<Vec<U>>
where
    A: Cursor,
    B: Cursor,
    U: Send + 'static,
    F: Fn(A::Item, B::Item) -> Result<U> + Send + Sync + 'static,
{
    let policy = policy.clone();
    upstream.then_async(move |(first1, last1, first2)| {
        let algorithm = contract(&policy, op);
        dispatch(zipped(first1, last1, first2), &policy, algorithm)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, FatalError};
    use crate::executor::{ExecutionContext, ThreadPoolSubstrate};
    use crate::partition::{ForwardCursor, SliceCursor};
    use crate::policy::ChunkingParams;
    use std::sync::Arc;

    fn data(n: i64) -> Arc<[i64]> {
        (0..n).collect::<Vec<_>>().into()
    }

    fn chunked(policy: ExecutionPolicy) -> ExecutionPolicy {
        policy.with_params(ChunkingParams::new(8, 4)).unwrap()
    }

    #[test]
    fn test_transform_matches_sequential_in_every_mode() {
        let a = data(1000);
        let b: Arc<[i64]> = (0..1000).map(|x| x * 3).collect::<Vec<_>>().into();
        let expected: Vec<i64> = a.iter().zip(b.iter()).map(|(x, y)| x + y).collect();

        for policy in [
            ExecutionPolicy::seq(),
            ExecutionPolicy::unseq(),
            ExecutionPolicy::par(),
            ExecutionPolicy::par_unseq(),
        ] {
            let policy = chunked(policy);
            let out = transform(
                &policy,
                SliceCursor::begin(&a),
                SliceCursor::end(&a),
                SliceCursor::begin(&b),
                |x, y| x + y,
            )
            .get()
            .unwrap();
            assert_eq!(out, expected, "{policy}");
        }
    }

    #[test]
    fn test_transform_forward_cursors() {
        let a = data(257);
        let b = data(300);
        let out = transform(
            &chunked(ExecutionPolicy::par().task()),
            ForwardCursor(SliceCursor::begin(&a)),
            ForwardCursor(SliceCursor::end(&a)),
            ForwardCursor(SliceCursor::begin(&b)),
            |x, y| x * y,
        )
        .get()
        .unwrap();

        let expected: Vec<i64> = (0..257).map(|x| x * x).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_transform_empty_input() {
        let a = data(0);
        let b = data(5);
        let completion = transform(
            &ExecutionPolicy::par(),
            SliceCursor::begin(&a),
            SliceCursor::end(&a),
            SliceCursor::begin(&b),
            |x, y| x + y,
        );
        assert!(completion.get().unwrap().is_empty());
    }

    #[test]
    fn test_try_transform_fatal_wins() {
        let a = data(200);
        let err = try_transform(
            &chunked(ExecutionPolicy::par()),
            SliceCursor::begin(&a),
            SliceCursor::end(&a),
            SliceCursor::begin(&a),
            |x, _| match x {
                10 => Err(Error::domain("ordinary")),
                150 => Err(FatalError::AllocationFailure.into()),
                _ => Ok(x),
            },
        )
        .get()
        .unwrap_err();

        assert!(err.is_fatal());
    }

    #[test]
    fn test_transform_into_every_mode() {
        let a = data(333);
        let b = data(333);
        let expected: Vec<i64> = (0..333).map(|x| x * 2).collect();

        for policy in [
            ExecutionPolicy::seq(),
            ExecutionPolicy::unseq(),
            ExecutionPolicy::par(),
            ExecutionPolicy::par_unseq().task(),
        ] {
            let dest = OutputRange::new(vec![0; 333]);
            let end = transform_into(
                &chunked(policy),
                SliceCursor::begin(&a),
                SliceCursor::end(&a),
                SliceCursor::begin(&b),
                &dest,
                |x, y| x + y,
            )
            .get()
            .unwrap();
            assert_eq!(end, dest.len());
            assert_eq!(dest.into_vec(), expected);
        }
    }

    #[test]
    fn test_transform_into_longer_destination() {
        let a = data(5);
        let dest = OutputRange::new(vec![-1; 8]);
        let end = transform_into(
            &ExecutionPolicy::par(),
            SliceCursor::begin(&a),
            SliceCursor::end(&a),
            SliceCursor::begin(&a),
            &dest,
            |x, _| x,
        )
        .get()
        .unwrap();

        assert_eq!(end, 5);
        assert_eq!(dest.snapshot(), vec![0, 1, 2, 3, 4, -1, -1, -1]);
    }

    #[test]
    fn test_transform_into_short_destination_writes_nothing() {
        let a = data(10);
        let dest = OutputRange::new(vec![0; 4]);
        let err = transform_into(
            &ExecutionPolicy::par().task(),
            SliceCursor::begin(&a),
            SliceCursor::end(&a),
            SliceCursor::begin(&a),
            &dest,
            |x, y| x + y,
        )
        .get()
        .unwrap_err();

        assert!(err.to_string().contains("input needs 10"));
        assert_eq!(dest.into_vec(), vec![0; 4]);
    }

    #[test]
    fn test_transform_into_short_destination_forward() {
        let a = data(40);
        let dest = OutputRange::new(vec![0; 25]);
        let pool = Arc::new(ThreadPoolSubstrate::new(4).unwrap());
        let policy = ExecutionPolicy::par()
            .on(ExecutionContext::thread_pool(pool))
            .unwrap()
            .with_params(ChunkingParams::new(10, 1).with_max_chunks(4))
            .unwrap();
        let err = transform_into(
            &policy,
            ForwardCursor(SliceCursor::begin(&a)),
            ForwardCursor(SliceCursor::end(&a)),
            ForwardCursor(SliceCursor::begin(&a)),
            &dest,
            |x, _| x,
        )
        .get()
        .unwrap_err();

        // the length is only known after the pre-pass, so the overflowing chunks fail
        assert_eq!(err.as_aggregate().unwrap().indices(), vec![2, 3]);
        let written = dest.into_vec();
        assert_eq!(written[..20], (0..20).collect::<Vec<i64>>()[..]);
        assert!(written[20..].iter().all(|x| *x == 0));
    }

    #[test]
    fn test_transform_after_pipeline() {
        let a = data(64);
        let seeded = crate::operation::start_with((
            SliceCursor::begin(&a),
            SliceCursor::end(&a),
            SliceCursor::begin(&a),
        ));
        let out = transform_after(seeded, &chunked(ExecutionPolicy::par().task()), |x, y| Ok(x - y))
            .wait()
            .unwrap();
        assert_eq!(out, vec![0; 64]);
    }
}
