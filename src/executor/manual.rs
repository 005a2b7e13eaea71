use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::{Receiver, Sender, TryRecvError, TrySendError, bounded, unbounded};

use super::substrate::{Rejected, Substrate, Work};
use crate::error::SubmitError;
use crate::policy::Launch;

/// Substrate that only queues work; the owner decides when it runs.
///
/// Useful for driving interleavings deterministically: submissions stay
/// queued until [`run_one`](Self::run_one) or [`run_pending`](Self::run_pending)
/// is called, whatever the launch tag.
pub struct ManualSubstrate {
    work_tx: Sender<Work>,
    work_rx: Receiver<Work>,
    parallelism: usize,
    open: AtomicBool,
}

impl ManualSubstrate {
    /// Unbounded queue reporting `parallelism` as its hint
    pub fn new(parallelism: usize) -> Self {
        let (work_tx, work_rx) = unbounded();
        Self::from_channel(work_tx, work_rx, parallelism)
    }

    /// Queue holding at most `capacity` units; further submissions are `Exhausted`
    pub fn with_capacity(parallelism: usize, capacity: usize) -> Self {
        let (work_tx, work_rx) = bounded(capacity);
        Self::from_channel(work_tx, work_rx, parallelism)
    }

    fn from_channel(work_tx: Sender<Work>, work_rx: Receiver<Work>, parallelism: usize) -> Self {
        Self {
            work_tx,
            work_rx,
            parallelism: parallelism.max(1),
            open: AtomicBool::new(true),
        }
    }

    /// Number of queued units
    pub fn queued(&self) -> usize {
        self.work_rx.len()
    }

    /// Run the oldest queued unit; false when nothing was queued
    pub fn run_one(&self) -> bool {
        match self.work_rx.try_recv() {
            Ok(work) => {
                work.run();
                true
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => false,
        }
    }

    /// Drain the queue, including work submitted while draining; returns units run
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        ran
    }

    /// Refuse later submissions and reject everything still queued
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
        while let Ok(work) = self.work_rx.try_recv() {
            work.reject(SubmitError::ShutDown);
        }
    }
}

impl Substrate for ManualSubstrate {
    fn submit(&self, work: Work, _launch: Launch) -> Result<(), Rejected> {
        if !self.is_accepting() {
            return Err(Rejected {
                work,
                reason: SubmitError::ShutDown,
            });
        }

        self.work_tx.try_send(work).map_err(|err| match err {
            TrySendError::Full(work) => Rejected {
                work,
                reason: SubmitError::Exhausted,
            },
            TrySendError::Disconnected(work) => Rejected {
                work,
                reason: SubmitError::ShutDown,
            },
        })
    }

    fn parallelism(&self) -> usize {
        self.parallelism
    }

    fn is_accepting(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ManualSubstrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualSubstrate")
            .field("queued", &self.queued())
            .field("parallelism", &self.parallelism)
            .field("open", &self.is_accepting())
            .finish()
    }
}
