use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ModeArg, Session};
use crate::algorithms::lexicographical_compare;
use crate::partition::{ForwardCursor, SliceCursor};
use crate::policy::ExecutionPolicy;

#[derive(Args)]
pub struct CompareArgs {
    #[arg(long, value_enum, default_value = "par")]
    pub mode: ModeArg,

    /// Return a handle and wait on it instead of blocking inside the call
    #[arg(long)]
    pub task: bool,

    /// Hide random access so lengths are measured by traversal
    #[arg(long)]
    pub forward: bool,
}

struct Scenario {
    name: String,
    left: Arc<[u32]>,
    right: Arc<[u32]>,
    expected: bool,
}

fn scenarios(seed: u64) -> Vec<Scenario> {
    let a: Arc<[u32]> = (0..10007).collect::<Vec<_>>().into();
    let b: Arc<[u32]> = (0..10006).collect::<Vec<_>>().into();
    let empty: Arc<[u32]> = Vec::new().into();

    // same length as `a`, one element bumped somewhere
    let mut rng = StdRng::seed_from_u64(seed);
    let bumped_at = rng.gen_range(0..a.len());
    let mut bumped: Vec<u32> = a.to_vec();
    bumped[bumped_at] += 1;
    let bumped: Arc<[u32]> = bumped.into();

    vec![
        Scenario {
            name: "longer vs its prefix".into(),
            left: a.clone(),
            right: b.clone(),
            expected: false,
        },
        Scenario {
            name: "empty vs non-empty".into(),
            left: empty.clone(),
            right: b.clone(),
            expected: true,
        },
        Scenario {
            name: "non-empty vs empty".into(),
            left: a.clone(),
            right: empty.clone(),
            expected: false,
        },
        Scenario {
            name: "empty vs empty".into(),
            left: empty.clone(),
            right: empty,
            expected: false,
        },
        Scenario {
            name: format!("differs at {bumped_at}"),
            left: a,
            right: bumped,
            expected: true,
        },
    ]
}

pub fn execute(args: CompareArgs, session: &Session) -> Result<()> {
    let output = &session.output;
    let policy = session.policy(args.mode, args.task)?;
    output.step(&format!("lexicographical compare under {policy}"));

    let mut failed = 0;
    for scenario in scenarios(session.seed) {
        let got = compare(&policy, &scenario.left, &scenario.right, args.forward)?;
        let passed = got == scenario.expected;
        if !passed {
            failed += 1;
        }
        output.status_indicator(
            if passed { "PASS" } else { "FAIL" },
            &format!("{}: got {}, expected {}", scenario.name, got, scenario.expected),
            passed,
        );
    }

    if failed > 0 {
        output.error(&format!("{failed} scenario(s) failed"));
        bail!("compare verification failed");
    }
    output.success("all compare scenarios passed");
    Ok(())
}

fn compare(policy: &ExecutionPolicy, left: &Arc<[u32]>, right: &Arc<[u32]>, forward: bool) -> Result<bool> {
    let completion = if forward {
        lexicographical_compare(
            policy,
            ForwardCursor(SliceCursor::begin(left)),
            ForwardCursor(SliceCursor::end(left)),
            ForwardCursor(SliceCursor::begin(right)),
            ForwardCursor(SliceCursor::end(right)),
        )
    } else {
        lexicographical_compare(
            policy,
            SliceCursor::begin(left),
            SliceCursor::end(left),
            SliceCursor::begin(right),
            SliceCursor::end(right),
        )
    };
    Ok(completion.get()?)
}
