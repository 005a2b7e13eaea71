//! Integration tests for operation composition, submission failures and cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parex::algorithms::{
    lexicographical_compare_after, transform, transform_after, transform_into, try_transform,
    try_transform_into,
};
use parex::error::{ConfigurationError, Error, SubmitError};
use parex::executor::{ExecutionContext, ManualSubstrate, ThreadPoolSubstrate, bind};
use parex::operation::{AsyncOperation, Outcome, await_all, start_with};
use parex::partition::{OutputRange, SliceCursor};
use parex::{ChunkingParams, ExecutionPolicy, Launch};

fn manual_policy(substrate: &Arc<ManualSubstrate>) -> ExecutionPolicy {
    let context = ExecutionContext::new("manual", substrate.clone(), Launch::Async);
    ExecutionPolicy::par()
        .task()
        .on(context)
        .unwrap()
        .with_params(ChunkingParams::new(10, 1))
        .unwrap()
}

fn data(n: i64) -> Arc<[i64]> {
    (0..n).collect::<Vec<_>>().into()
}

#[test]
fn test_await_all_preserves_input_order() {
    let (first, a) = AsyncOperation::<u32>::pending();
    let (second, b) = AsyncOperation::pending();
    let (third, c) = AsyncOperation::pending();
    let all = await_all(vec![a, b, c]);

    third.fulfil(Outcome::Value(3));
    assert!(!all.is_ready());
    first.fulfil(Outcome::Error(Error::domain("first failed")));
    assert!(!all.is_ready());
    second.fulfil(Outcome::Value(2));

    let outcomes = all.wait().unwrap();
    assert!(outcomes[0].is_error());
    assert!(matches!(outcomes[1], Outcome::Value(2)));
    assert!(matches!(outcomes[2], Outcome::Value(3)));
}

#[test]
fn test_failing_sibling_does_not_cancel_others() {
    let substrate = Arc::new(ManualSubstrate::new(2));
    let executor = bind(
        ExecutionContext::new("manual", substrate.clone(), Launch::Async),
        Launch::Async,
    );

    let ran = Arc::new(AtomicUsize::new(0));
    let ops: Vec<AsyncOperation<usize>> = (0..3)
        .map(|i| {
            let ran = Arc::clone(&ran);
            executor.submit(move || {
                ran.fetch_add(1, Ordering::SeqCst);
                if i == 0 { Err(Error::domain("early")) } else { Ok(i) }
            })
        })
        .collect();
    let all = await_all(ops);

    substrate.run_pending();
    let outcomes = all.wait().unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 3);
    assert!(outcomes[0].is_error());
    assert!(outcomes[1].is_value() && outcomes[2].is_value());
}

#[test]
fn test_cancellation_flows_downstream() {
    let (promise, op) = AsyncOperation::<u32>::pending();
    let canceller = op.canceller();
    let next = op.then(|x| Ok(x + 1)).then(|x| Ok(x * 2));

    canceller.cancel();
    assert!(!promise.fulfil(Outcome::Value(1)));
    assert!(next.wait().unwrap_err().is_cancelled());
}

#[test]
fn test_cancelling_a_dispatch_skips_queued_chunks() {
    let substrate = Arc::new(ManualSubstrate::new(4));
    let policy = manual_policy(&substrate);
    let a = data(40);
    let visited = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&visited);
    let op = transform(
        &policy,
        SliceCursor::begin(&a),
        SliceCursor::end(&a),
        SliceCursor::begin(&a),
        move |x, y| {
            counter.fetch_add(1, Ordering::SeqCst);
            x + y
        },
    )
    .into_operation();
    assert_eq!(substrate.queued(), 4);

    // first chunk runs to completion, then the caller gives up
    assert!(substrate.run_one());
    op.cancel();
    assert_eq!(substrate.run_pending(), 3);

    assert_eq!(visited.load(Ordering::SeqCst), 10);
    assert!(matches!(op.wait(), Err(Error::Cancelled)));
}

#[test]
fn test_refused_chunks_become_submission_failures() {
    let substrate = Arc::new(ManualSubstrate::with_capacity(4, 2));
    let policy = manual_policy(&substrate);
    let a = data(40);

    let completion = transform(
        &policy,
        SliceCursor::begin(&a),
        SliceCursor::end(&a),
        SliceCursor::begin(&a),
        |x, y| x + y,
    );
    substrate.run_pending();

    let err = completion.get().unwrap_err();
    let aggregate = err.as_aggregate().expect("aggregate error");
    assert_eq!(aggregate.indices(), vec![2, 3]);
    for failure in aggregate {
        assert!(matches!(
            failure.error,
            Error::SubmissionFailed(SubmitError::Exhausted)
        ));
    }
}

#[test]
fn test_shutdown_rejects_queued_and_later_work() {
    let substrate = Arc::new(ManualSubstrate::new(4));
    let policy = manual_policy(&substrate);
    let a = data(40);

    let completion = transform(
        &policy,
        SliceCursor::begin(&a),
        SliceCursor::end(&a),
        SliceCursor::begin(&a),
        |x, y| x + y,
    );
    substrate.close();

    let err = completion.get().unwrap_err();
    assert_eq!(err.as_aggregate().unwrap().len(), 4);

    let context = ExecutionContext::new("manual", substrate, Launch::Async);
    assert_eq!(
        ExecutionPolicy::par().on(context).unwrap_err(),
        ConfigurationError::ContextShutDown {
            name: "manual".to_string()
        }
    );
}

#[test]
fn test_parallel_policy_rejects_synchronous_context() {
    let pool = Arc::new(ThreadPoolSubstrate::new(2).unwrap());
    let context = ExecutionContext::thread_pool(pool).with_launch(Launch::Sync);

    let err = ExecutionPolicy::par_unseq().on(context.clone()).unwrap_err();
    assert!(matches!(err, ConfigurationError::SerialContext { .. }));
    assert!(ExecutionPolicy::unseq().on(context).is_ok());
}

#[test]
fn test_shut_down_pool_fails_submissions() {
    let pool = Arc::new(ThreadPoolSubstrate::new(2).unwrap());
    let policy = ExecutionPolicy::par()
        .on(ExecutionContext::thread_pool(pool.clone()))
        .unwrap()
        .with_params(ChunkingParams::new(10, 1))
        .unwrap();
    pool.shutdown();

    let a = data(20);
    let err = transform(
        &policy,
        SliceCursor::begin(&a),
        SliceCursor::end(&a),
        SliceCursor::begin(&a),
        |x, y| x + y,
    )
    .get()
    .unwrap_err();

    assert!(err.as_aggregate().unwrap().iter().all(|failure| matches!(
        failure.error,
        Error::SubmissionFailed(SubmitError::ShutDown)
    )));
}

#[test]
fn test_panicking_chunk_is_a_domain_error() {
    let a = data(40);
    let policy = ExecutionPolicy::par()
        .with_params(ChunkingParams::new(10, 1).with_max_chunks(4))
        .unwrap();

    let err = try_transform(
        &policy,
        SliceCursor::begin(&a),
        SliceCursor::end(&a),
        SliceCursor::begin(&a),
        |x, _| {
            if x == 25 {
                panic!("element 25 is cursed");
            }
            Ok(x)
        },
    )
    .get()
    .unwrap_err();

    let aggregate = err.as_aggregate().expect("aggregate error");
    assert_eq!(aggregate.len(), 1);
    assert!(aggregate.iter().all(|failure| matches!(failure.error, Error::Domain(_))));
    assert!(err.to_string().contains("element 25 is cursed"));
}

#[test]
fn test_algorithms_compose_after_seeded_pipeline() {
    let policy = ExecutionPolicy::par()
        .task()
        .with_params(ChunkingParams::new(16, 2))
        .unwrap();
    let a = data(500);
    let b: Arc<[i64]> = (0..500).map(|x| 500 - x).collect::<Vec<_>>().into();

    let seeded = start_with((SliceCursor::begin(&a), SliceCursor::end(&a), SliceCursor::begin(&b)));
    let sums = transform_after(seeded, &policy, |x, y| Ok(x + y));

    let compare_policy = policy.clone();
    let verdict = sums.then_async(move |sums| {
        let sums: Arc<[i64]> = sums.into();
        let flat: Arc<[i64]> = vec![500; 501].into();
        lexicographical_compare_after(
            start_with((
                SliceCursor::begin(&sums),
                SliceCursor::end(&sums),
                SliceCursor::begin(&flat),
                SliceCursor::end(&flat),
            )),
            &compare_policy,
        )
    });

    // 500 copies of 500 is a strict prefix of 501 copies
    assert!(verdict.wait().unwrap());
}

#[test]
fn test_each_chunk_writes_only_its_own_slice() {
    let substrate = Arc::new(ManualSubstrate::new(4));
    let policy = manual_policy(&substrate);
    let a = data(40);
    let dest = OutputRange::new(vec![-1; 40]);

    let completion = transform_into(
        &policy,
        SliceCursor::begin(&a),
        SliceCursor::end(&a),
        SliceCursor::begin(&a),
        &dest,
        |x, y| x + y,
    );
    assert_eq!(substrate.queued(), 4);

    for finished in 1..=4 {
        assert!(substrate.run_one());
        let snapshot = dest.snapshot();
        let mut written = 0;
        for (block, slots) in snapshot.chunks(10).enumerate() {
            let base = block as i64 * 10;
            if slots[0] == -1 {
                assert!(slots.iter().all(|x| *x == -1), "block {block} partly written");
            } else {
                let wanted: Vec<i64> = (base..base + 10).map(|x| x * 2).collect();
                assert_eq!(slots, &wanted[..]);
                written += 1;
            }
        }
        assert_eq!(written, finished);
    }

    assert_eq!(completion.get().unwrap(), 40);
}

#[test]
fn test_failing_chunk_leaves_other_writes_in_place() {
    let pool = Arc::new(ThreadPoolSubstrate::new(4).unwrap());
    let policy = ExecutionPolicy::par()
        .on(ExecutionContext::thread_pool(pool))
        .unwrap()
        .with_params(ChunkingParams::new(10, 1).with_max_chunks(4))
        .unwrap();
    let a = data(40);
    let dest = OutputRange::new(vec![-1; 40]);

    let err = try_transform_into(
        &policy,
        SliceCursor::begin(&a),
        SliceCursor::end(&a),
        SliceCursor::begin(&a),
        &dest,
        |x, _| if x == 25 { Err(Error::domain("element 25")) } else { Ok(x) },
    )
    .get()
    .unwrap_err();

    let aggregate = match err {
        Error::Aggregate(aggregate) => aggregate,
        other => panic!("expected an aggregate error, got {other}"),
    };
    let failures = aggregate.into_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].index, 2);

    let written = dest.into_vec();
    assert_eq!(written[..25], (0..25).collect::<Vec<i64>>()[..]);
    assert!(written[25..30].iter().all(|x| *x == -1));
    assert_eq!(written[30..], (30..40).collect::<Vec<i64>>()[..]);
}

#[test]
fn test_nested_blocking_call_on_the_same_pool_completes() {
    let pool = Arc::new(ThreadPoolSubstrate::new(1).unwrap());
    let policy = ExecutionPolicy::par()
        .on(ExecutionContext::thread_pool(pool))
        .unwrap()
        .with_params(ChunkingParams::new(4, 2))
        .unwrap();
    let outer = data(16);
    let inner = data(8);

    let (sender, receiver) = crossbeam::channel::bounded(1);
    let nested = policy.clone();
    std::thread::spawn(move || {
        let result = transform(
            &policy,
            SliceCursor::begin(&outer),
            SliceCursor::end(&outer),
            SliceCursor::begin(&outer),
            move |x, _| {
                let sums = transform(
                    &nested,
                    SliceCursor::begin(&inner),
                    SliceCursor::end(&inner),
                    SliceCursor::begin(&inner),
                    |a, b| a + b,
                )
                .get()
                .unwrap_or_default();
                x + sums.iter().sum::<i64>()
            },
        )
        .get();
        let _ = sender.send(result);
    });

    let result = receiver
        .recv_timeout(Duration::from_secs(10))
        .expect("nested call on a one-worker pool returned");
    // 2 * (0 + 1 + ... + 7) == 56
    assert_eq!(result.unwrap(), (0..16).map(|x| x + 56).collect::<Vec<i64>>());
}
