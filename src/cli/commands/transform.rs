use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ModeArg, Session};
use crate::algorithms::transform;
use crate::partition::{Cursor, ForwardCursor, SliceCursor};
use crate::policy::ExecutionPolicy;

#[derive(Args)]
pub struct TransformArgs {
    /// Number of elements per input range
    #[arg(long, default_value_t = 100_000)]
    pub len: usize,

    #[arg(long, value_enum, default_value = "par")]
    pub mode: ModeArg,

    /// Return a handle and wait on it instead of blocking inside the call
    #[arg(long)]
    pub task: bool,

    /// Hide random access so chunks are found with a forward pre-pass
    #[arg(long)]
    pub forward: bool,
}

pub fn execute(args: TransformArgs, session: &Session) -> Result<()> {
    let output = &session.output;
    let mut rng = StdRng::seed_from_u64(session.seed);
    let a: Arc<[i64]> = (0..args.len).map(|_| rng.gen_range(-1000..1000)).collect::<Vec<_>>().into();
    let b: Arc<[i64]> = (0..args.len).map(|_| rng.gen_range(-1000..1000)).collect::<Vec<_>>().into();

    let policy = session.policy(args.mode, args.task)?;
    output.step(&format!("transform of {} element(s) under {}", args.len, policy));

    let result = if args.forward {
        run(
            &policy,
            ForwardCursor(SliceCursor::begin(&a)),
            ForwardCursor(SliceCursor::end(&a)),
            ForwardCursor(SliceCursor::begin(&b)),
        )?
    } else {
        run(&policy, SliceCursor::begin(&a), SliceCursor::end(&a), SliceCursor::begin(&b))?
    };

    let expected: Vec<i64> = a.iter().zip(b.iter()).map(|(x, y)| x + y).collect();
    if result != expected {
        let first = result
            .iter()
            .zip(&expected)
            .position(|(got, want)| got != want)
            .unwrap_or(result.len().min(expected.len()));
        output.error(&format!("results differ from the sequential run at element {first}"));
        bail!("transform verification failed");
    }

    output.success(&format!("transform verified ({} element(s))", result.len()));
    Ok(())
}

fn run<A, B>(policy: &ExecutionPolicy, first1: A, last1: A, first2: B) -> Result<Vec<i64>>
where
    A: Cursor<Item = i64>,
    B: Cursor<Item = i64>,
{
    Ok(transform(policy, first1, last1, first2, |x, y| x + y).get()?)
}
