// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deferred-callback scheduler running on a single driver task.
//!
//! Every job is "run this after duration D". Jobs execute one at a time on
//! the driver, ordered by `(deadline, scheduling sequence)`, so a job
//! scheduled earlier with an equal or shorter delay always runs first.
//! Jobs can be cancelled one by one, and [`Scheduler::shutdown`] discards
//! everything still outstanding.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn, Instrument};

type JobFn = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Identifies a scheduled job for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobHandle(u64);

enum Command {
    Schedule {
        handle: JobHandle,
        deadline: Instant,
        job: JobFn,
    },
    Cancel(JobHandle),
}

/// Cloneable handle to a session's scheduler driver.
#[derive(Clone)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<Command>,
    next_handle: Arc<AtomicU64>,
    pending: Arc<AtomicUsize>,
    token: CancellationToken,
    driver: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Scheduler {
    /// Spawns the driver task on the current Tokio runtime.
    ///
    /// Jobs run inside the span that was current when the scheduler started.
    pub fn start() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let pending = Arc::new(AtomicUsize::new(0));

        let driver = tokio::spawn(drive(rx, token.clone(), pending.clone()).in_current_span());

        Self {
            tx,
            next_handle: Arc::new(AtomicU64::new(1)),
            pending,
            token,
            driver: Arc::new(Mutex::new(Some(driver))),
        }
    }

    /// Runs `job` after `delay` on the driver task.
    ///
    /// After shutdown the job is discarded and the returned handle is inert.
    pub fn schedule<F, Fut>(&self, delay: Duration, job: F) -> JobHandle
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = JobHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        if self.token.is_cancelled() {
            debug!(job = handle.0, "scheduler shut down, discarding job");
            return handle;
        }

        let deadline = Instant::now() + delay;
        let job: JobFn = Box::new(move || job().boxed());
        self.pending.fetch_add(1, Ordering::AcqRel);
        if self
            .tx
            .send(Command::Schedule {
                handle,
                deadline,
                job,
            })
            .is_err()
        {
            // Driver is gone; nothing will ever run this job.
            self.pending.fetch_sub(1, Ordering::AcqRel);
            debug!(job = handle.0, "scheduler driver stopped, discarding job");
        } else {
            trace!(job = handle.0, delay_ms = delay.as_millis() as u64, "job scheduled");
        }
        handle
    }

    /// Cancels one job if it has not started yet.
    pub fn cancel(&self, handle: JobHandle) {
        let _ = self.tx.send(Command::Cancel(handle));
    }

    /// Number of jobs scheduled but not yet run or cancelled.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Discards every outstanding job and waits for the driver to exit.
    ///
    /// A job that is mid-flight is dropped at its next suspension point.
    /// Calling this more than once is harmless.
    pub async fn shutdown(&self) {
        self.token.cancel();
        let driver = self
            .driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(driver) = driver
            && let Err(e) = driver.await
        {
            warn!(error = %e, "scheduler driver ended abnormally");
        }
    }

    /// Signals shutdown without waiting, for use from synchronous contexts.
    pub fn cancel_all(&self) {
        self.token.cancel();
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

/// Driver state: a min-heap of deadlines plus the job bodies by handle.
#[derive(Default)]
struct Queue {
    order: BinaryHeap<Reverse<(Instant, JobHandle)>>,
    jobs: HashMap<JobHandle, JobFn>,
}

impl Queue {
    fn apply(&mut self, cmd: Command, pending: &AtomicUsize) {
        match cmd {
            Command::Schedule {
                handle,
                deadline,
                job,
            } => {
                self.order.push(Reverse((deadline, handle)));
                self.jobs.insert(handle, job);
            }
            Command::Cancel(handle) => {
                if self.jobs.remove(&handle).is_some() {
                    pending.fetch_sub(1, Ordering::AcqRel);
                    debug!(job = handle.0, "job cancelled");
                }
            }
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.order.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Pops the earliest job whose deadline has passed.
    fn pop_due(&mut self, now: Instant) -> Option<(JobHandle, JobFn)> {
        while let Some(Reverse((deadline, handle))) = self.order.peek().copied() {
            if deadline > now {
                return None;
            }
            self.order.pop();
            // Cancelled jobs leave a stale heap entry behind.
            if let Some(job) = self.jobs.remove(&handle) {
                return Some((handle, job));
            }
        }
        None
    }
}

async fn drive(
    mut rx: mpsc::UnboundedReceiver<Command>,
    token: CancellationToken,
    pending: Arc<AtomicUsize>,
) {
    let mut queue = Queue::default();
    let mut open = true;

    'driver: loop {
        if !open && queue.jobs.is_empty() {
            break;
        }

        let next = queue.next_deadline();
        tokio::select! {
            biased;
            _ = token.cancelled() => break 'driver,
            _ = tokio::time::sleep_until(next.unwrap_or_else(Instant::now)), if next.is_some() => {
                // Pick up anything scheduled in the meantime so equal
                // deadlines resolve by scheduling order.
                while let Ok(cmd) = rx.try_recv() {
                    queue.apply(cmd, &pending);
                }
                let now = Instant::now();
                while let Some((handle, job)) = queue.pop_due(now) {
                    pending.fetch_sub(1, Ordering::AcqRel);
                    trace!(job = handle.0, "job running");
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break 'driver,
                        _ = job() => {}
                    }
                }
            }
            cmd = rx.recv(), if open => match cmd {
                Some(cmd) => queue.apply(cmd, &pending),
                None => open = false,
            },
        }
    }

    let discarded = queue.jobs.len();
    pending.store(0, Ordering::Release);
    if discarded > 0 {
        debug!(discarded, "scheduler stopped with outstanding jobs");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn push(
        log: &Arc<Mutex<Vec<&'static str>>>,
        tag: &'static str,
    ) -> impl FnOnce() -> futures::future::Ready<()> + Send + 'static {
        let log = log.clone();
        move || {
            log.lock().unwrap().push(tag);
            futures::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_job_after_delay() {
        let scheduler = Scheduler::start();
        let ran = log();
        scheduler.schedule(Duration::from_millis(1000), push(&ran, "a"));
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(ran.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*ran.lock().unwrap(), vec!["a"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn orders_by_deadline_then_sequence() {
        let scheduler = Scheduler::start();
        let ran = log();
        scheduler.schedule(Duration::from_millis(300), push(&ran, "late"));
        scheduler.schedule(Duration::from_millis(100), push(&ran, "first-100"));
        scheduler.schedule(Duration::from_millis(100), push(&ran, "second-100"));
        scheduler.schedule(Duration::from_millis(0), push(&ran, "now"));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(
            *ran.lock().unwrap(),
            vec!["now", "first-100", "second-100", "late"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn jobs_can_schedule_follow_ups() {
        let scheduler = Scheduler::start();
        let ran = log();

        let inner = scheduler.clone();
        let sink = ran.clone();
        scheduler.schedule(Duration::from_millis(100), move || async move {
            sink.lock().unwrap().push("outer");
            let sink = sink.clone();
            inner.schedule(Duration::from_millis(100), move || async move {
                sink.lock().unwrap().push("inner");
            });
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(*ran.lock().unwrap(), vec!["outer"]);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*ran.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_single_job() {
        let scheduler = Scheduler::start();
        let ran = log();
        let doomed = scheduler.schedule(Duration::from_millis(100), push(&ran, "doomed"));
        scheduler.schedule(Duration::from_millis(100), push(&ran, "kept"));
        scheduler.cancel(doomed);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*ran.lock().unwrap(), vec!["kept"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_discards_outstanding_jobs() {
        let scheduler = Scheduler::start();
        let ran = log();
        scheduler.schedule(Duration::from_millis(100), push(&ran, "never"));

        scheduler.shutdown().await;
        assert!(scheduler.is_shut_down());
        assert_eq!(scheduler.pending(), 0);

        scheduler.schedule(Duration::from_millis(0), push(&ran, "after"));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(ran.lock().unwrap().is_empty());

        // Second shutdown is a no-op.
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_running_job() {
        let scheduler = Scheduler::start();
        let ran = log();
        let sink = ran.clone();
        scheduler.schedule(Duration::from_millis(10), move || async move {
            sink.lock().unwrap().push("started");
            tokio::time::sleep(Duration::from_secs(60)).await;
            sink.lock().unwrap().push("finished");
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        scheduler.shutdown().await;
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(*ran.lock().unwrap(), vec!["started"]);
    }
}
