use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::aggregate::{Verdict, first_decided};
use crate::error::Result;
use crate::operation::AsyncOperation;
use crate::partition::{AlgorithmContract, Chunk, Completion, Cursor, Range, Zip, dispatch, distance, execute};
use crate::policy::ExecutionPolicy;

/// Order-dependent comparison over the common prefix of two ranges.
///
/// Each chunk reports its local first difference, or, if it is the last
/// chunk and found none, the exhaustion verdict `len1 < len2`. The merge
/// takes the leftmost decided chunk.
struct LexicographicalCompare<A, B, F> {
    cmp: F,
    common: usize,
    exhausted: bool,
    _cursors: PhantomData<fn(A, B)>,
}

impl<A, B, F> AlgorithmContract<Zip<A, B>> for LexicographicalCompare<A, B, F>
where
    A: Cursor,
    B: Cursor,
    F: Fn(&A::Item, &B::Item) -> Option<Ordering> + Send + Sync + 'static,
{
    type Partial = Verdict<bool>;
    type Output = bool;

    fn per_chunk(&self, chunk: Chunk<Zip<A, B>>) -> Result<Verdict<bool>> {
        for (a, b) in chunk.iter() {
            match (self.cmp)(&a, &b) {
                Some(Ordering::Less) => return Ok(Verdict::Decided(true)),
                Some(Ordering::Greater) => return Ok(Verdict::Decided(false)),
                // incomparable pairs are neither less nor greater
                Some(Ordering::Equal) | None => {}
            }
        }

        if chunk.offset + chunk.len == self.common {
            Ok(Verdict::Decided(self.exhausted))
        } else {
            Ok(Verdict::Undecided)
        }
    }

    fn merge(&self, verdicts: Vec<Verdict<bool>>) -> Result<bool> {
        // no chunks at all: one side is empty
        Ok(first_decided(verdicts).unwrap_or(self.exhausted))
    }
}

fn prepare<A, B, F>(
    first1: A,
    last1: A,
    first2: B,
    last2: B,
    cmp: F,
) -> (Range<Zip<A, B>>, LexicographicalCompare<A, B, F>)
where
    A: Cursor,
    B: Cursor,
{
    let len1 = distance(&first1, &last1);
    let len2 = distance(&first2, &last2);
    let common = len1.min(len2);
    tracing::trace!("comparing {} against {} element(s)", len1, len2);

    let algorithm = LexicographicalCompare {
        cmp,
        common,
        exhausted: len1 < len2,
        _cursors: PhantomData,
    };
    (Range::counted(Zip::new(first1, first2), common), algorithm)
}

/// Whether `[first1, last1)` is lexicographically less than `[first2, last2)`.
///
/// Forward-only cursors are measured once up front to find the common prefix.
pub fn lexicographical_compare<A, B>(
    policy: &ExecutionPolicy,
    first1: A,
    last1: A,
    first2: B,
    last2: B,
) -> Completion<bool>
where
    A: Cursor,
    B: Cursor,
    A::Item: PartialOrd<B::Item>,
{
    let (range, algorithm) = prepare(first1, last1, first2, last2, |a: &A::Item, b: &B::Item| {
        a.partial_cmp(b)
    });
    execute(range, policy, algorithm)
}

/// [`lexicographical_compare`] with a caller-supplied ordering.
pub fn lexicographical_compare_by<A, B, F>(
    policy: &ExecutionPolicy,
    first1: A,
    last1: A,
    first2: B,
    last2: B,
    cmp: F,
) -> Completion<bool>
where
    A: Cursor,
    B: Cursor,
    F: Fn(&A::Item, &B::Item) -> Ordering + Send + Sync + 'static,
{
    let (range, algorithm) = prepare(first1, last1, first2, last2, move |a: &A::Item, b: &B::Item| {
        Some(cmp(a, b))
    });
    execute(range, policy, algorithm)
}

/// Compare ranges whose cursors are produced by `upstream`.
pub fn lexicographical_compare_after<A, B>(
    upstream: AsyncOperation<(A, A, B, B)>,
    policy: &ExecutionPolicy,
) -> AsyncOperation<bool>
where
    A: Cursor,
    B: Cursor,
    A::Item: PartialOrd<B::Item>,
{
    let policy = policy.clone();
    upstream.then_async(move |(first1, last1, first2, last2)| {
        let (range, algorithm) = prepare(first1, last1, first2, last2, |a: &A::Item, b: &B::Item| {
            a.partial_cmp(b)
        });
        dispatch(range, &policy, algorithm)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{ForwardCursor, SliceCursor};
    use crate::policy::ChunkingParams;
    use std::sync::Arc;

    fn policies() -> Vec<ExecutionPolicy> {
        let params = ChunkingParams::new(16, 4);
        [
            ExecutionPolicy::seq(),
            ExecutionPolicy::unseq(),
            ExecutionPolicy::par(),
            ExecutionPolicy::par_unseq().task(),
        ]
        .into_iter()
        .map(|policy| policy.with_params(params).unwrap())
        .collect()
    }

    fn compare(policy: &ExecutionPolicy, a: &Arc<[i32]>, b: &Arc<[i32]>) -> bool {
        lexicographical_compare(
            policy,
            SliceCursor::begin(a),
            SliceCursor::end(a),
            SliceCursor::begin(b),
            SliceCursor::end(b),
        )
        .get()
        .unwrap()
    }

    #[test]
    fn test_prefix_and_empty_scenarios() {
        let a: Arc<[i32]> = (0..10007).collect::<Vec<_>>().into();
        let b: Arc<[i32]> = (0..10006).collect::<Vec<_>>().into();
        let empty: Arc<[i32]> = Vec::new().into();

        for policy in policies() {
            assert!(!compare(&policy, &a, &b), "{policy}");
            assert!(compare(&policy, &b, &a), "{policy}");
            assert!(compare(&policy, &empty, &b), "{policy}");
            assert!(!compare(&policy, &a, &empty), "{policy}");
            assert!(!compare(&policy, &empty, &empty), "{policy}");
            assert!(!compare(&policy, &a, &a), "{policy}");
        }
    }

    #[test]
    fn test_leftmost_difference_wins() {
        // chunk 0 is equal, a later chunk says "less", a still later one says "greater"
        let a: Arc<[i32]> = (0..1000).collect::<Vec<_>>().into();
        let mut values: Vec<i32> = (0..1000).collect();
        values[500] += 1;
        values[900] -= 1;
        let b: Arc<[i32]> = values.into();

        for policy in policies() {
            assert!(compare(&policy, &a, &b), "{policy}");
            assert!(!compare(&policy, &b, &a), "{policy}");
        }
    }

    #[test]
    fn test_forward_cursors_and_custom_order() {
        let a: Arc<[i32]> = vec![5, 4, 3].into();
        let b: Arc<[i32]> = vec![5, 4, 2, 9].into();

        let reversed = lexicographical_compare_by(
            &ExecutionPolicy::par(),
            ForwardCursor(SliceCursor::begin(&a)),
            ForwardCursor(SliceCursor::end(&a)),
            ForwardCursor(SliceCursor::begin(&b)),
            ForwardCursor(SliceCursor::end(&b)),
            |x: &i32, y: &i32| y.cmp(x),
        )
        .get()
        .unwrap();
        // under the reversed order 3 sorts before 2
        assert!(reversed);
    }

    #[test]
    fn test_incomparable_elements_are_skipped() {
        let a: Arc<[f64]> = vec![1.0, f64::NAN, 2.0].into();
        let b: Arc<[f64]> = vec![1.0, 0.0, 3.0].into();
        let less = lexicographical_compare(
            &ExecutionPolicy::seq(),
            SliceCursor::begin(&a),
            SliceCursor::end(&a),
            SliceCursor::begin(&b),
            SliceCursor::end(&b),
        )
        .get()
        .unwrap();
        assert!(less);
    }

    #[test]
    fn test_compare_after_pipeline() {
        let a: Arc<[i32]> = (0..300).collect::<Vec<_>>().into();
        let b: Arc<[i32]> = (0..301).collect::<Vec<_>>().into();
        let seeded = crate::operation::start_with((
            SliceCursor::begin(&a),
            SliceCursor::end(&a),
            SliceCursor::begin(&b),
            SliceCursor::end(&b),
        ));
        let less = lexicographical_compare_after(seeded, &ExecutionPolicy::par().task())
            .wait()
            .unwrap();
        assert!(less);
    }
}
