//! Fixed-capacity worker pool
//!
//! A bounded set of reusable execution slots sharing one FIFO queue.
//! Tasks from all trials queue for slots; the pool has no knowledge of
//! trial boundaries. Teardown is a two-stage escalation: drain wait,
//! then force-cancel and a second wait, then best-effort exit.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use super::handle::{CompletionLatch, TaskHandle, TaskOutcome};
use crate::utils::{HarnessError, PoolError, Result};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// A queued unit of work plus the latch its joiner waits on
struct Job {
    task: Task,
    latch: Arc<CompletionLatch>,
}

/// State shared between the pool facade and its workers
struct PoolShared {
    /// Cleared once shutdown begins; submissions are rejected after.
    accepting: AtomicBool,
    /// Set by force-cancel: queued jobs resolve Cancelled unrun.
    cancelled: AtomicBool,
    /// Workers still inside their loop.
    live_workers: AtomicUsize,
    /// Panics caught inside task bodies. The slot survives a panic.
    task_panics: AtomicUsize,
    idle_lock: Mutex<()>,
    idle_cond: Condvar,
}

/// Fixed-capacity worker pool with joinable task handles
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    /// Dropped at shutdown to close the queue; workers drain and exit.
    sender: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    capacity: usize,
}

impl WorkerPool {
    /// Spawn a pool with exactly `capacity` worker threads.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(HarnessError::Config(
                "worker pool requires at least one slot".to_string(),
            ));
        }

        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let shared = Arc::new(PoolShared {
            accepting: AtomicBool::new(true),
            cancelled: AtomicBool::new(false),
            live_workers: AtomicUsize::new(capacity),
            task_panics: AtomicUsize::new(0),
            idle_lock: Mutex::new(()),
            idle_cond: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(capacity);
        for worker_id in 0..capacity {
            let shared = Arc::clone(&shared);
            let receiver = Arc::clone(&receiver);

            let handle = thread::Builder::new()
                .name(format!("pool-worker-{}", worker_id))
                .spawn(move || worker_loop(&shared, &receiver))?;

            workers.push(handle);
        }

        debug!("worker pool started with {} slots", capacity);

        Ok(Self {
            shared,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            capacity,
        })
    }

    /// Number of concurrent execution slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Panics caught inside task bodies so far
    pub fn task_panics(&self) -> usize {
        self.shared.task_panics.load(Ordering::Relaxed)
    }

    /// Schedule a task onto one of the slots. Returns a handle joinable
    /// for exactly this task. Rejected once shutdown has begun.
    pub fn submit<F>(&self, task: F) -> Result<TaskHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.shared.accepting.load(Ordering::Acquire) {
            return Err(PoolError::ShuttingDown.into());
        }

        let latch = CompletionLatch::new();
        let job = Job {
            task: Box::new(task),
            latch: Arc::clone(&latch),
        };

        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(tx) => tx.send(job).map_err(|_| PoolError::Disconnected)?,
            None => return Err(PoolError::ShuttingDown.into()),
        }

        Ok(TaskHandle::new(latch))
    }

    /// Stop accepting tasks and close the queue. Workers drain what is
    /// already queued and then exit.
    pub fn begin_shutdown(&self) {
        self.shared.accepting.store(false, Ordering::Release);
        self.sender.lock().take();
    }

    /// Escalation stage: queued-but-unstarted jobs resolve Cancelled
    /// without running. A task already on a slot cannot be interrupted.
    pub fn force_cancel(&self) {
        self.shared.cancelled.store(true, Ordering::Release);
    }

    /// Block until every worker has exited or the timeout elapses.
    /// Returns true if the pool is fully terminated.
    pub fn await_termination(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.shared.idle_lock.lock();
        while self.shared.live_workers.load(Ordering::Acquire) != 0 {
            if self
                .shared
                .idle_cond
                .wait_until(&mut guard, deadline)
                .timed_out()
            {
                return self.shared.live_workers.load(Ordering::Acquire) == 0;
            }
        }
        true
    }

    /// Full teardown: drain wait, then force-cancel and a second wait,
    /// each stage bounded by `stage_timeout`. Stage failures are
    /// reported on stderr but never block process exit; only a worker
    /// found panicked is fatal.
    pub fn shutdown(&self, stage_timeout: Duration) -> Result<()> {
        self.begin_shutdown();

        if !self.await_termination(stage_timeout) {
            eprintln!(
                "Pool did not complete within {} seconds",
                stage_timeout.as_secs()
            );
            self.force_cancel();

            if !self.await_termination(stage_timeout) {
                eprintln!("Pool did not terminate");
                // Leave stragglers detached rather than blocking exit.
                return Ok(());
            }
        }

        let panics = self.task_panics();
        if panics > 0 {
            warn!("{} task(s) panicked during the run", panics);
        }

        self.reap_workers()
    }

    fn reap_workers(&self) -> Result<()> {
        let workers = std::mem::take(&mut *self.workers.lock());
        for handle in workers {
            let name = handle
                .thread()
                .name()
                .unwrap_or("pool-worker")
                .to_string();
            if handle.join().is_err() {
                return Err(PoolError::WorkerPanicked(name).into());
            }
        }
        debug!("worker pool terminated");
        Ok(())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Close the queue so workers exit instead of blocking forever.
        self.begin_shutdown();
    }
}

fn worker_loop(shared: &PoolShared, receiver: &Mutex<Receiver<Job>>) {
    loop {
        // Holding the lock across recv serializes dequeue, not
        // execution: the slot releases it as soon as a job arrives.
        let job = receiver.lock().recv();
        let job = match job {
            Ok(job) => job,
            // Queue closed and drained: normal exit.
            Err(_) => break,
        };

        if shared.cancelled.load(Ordering::Acquire) {
            job.latch.resolve(TaskOutcome::Cancelled);
            continue;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(job.task));
        if result.is_err() {
            shared.task_panics.fetch_add(1, Ordering::Relaxed);
            warn!("task panicked; worker slot recovered");
        }

        // Resolve after the task body so joiners observe its writes.
        // A panicking task must still release its latch, or join_all
        // would hang.
        job.latch.resolve(TaskOutcome::Completed);
    }

    shared.live_workers.fetch_sub(1, Ordering::AcqRel);
    let _guard = shared.idle_lock.lock();
    shared.idle_cond.notify_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::join_all;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_submit_runs_task() {
        let pool = WorkerPool::new(2).unwrap();
        let ran = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&ran);
        let handle = pool.submit(move || flag.store(true, Ordering::Release)).unwrap();

        assert_eq!(handle.wait(), TaskOutcome::Completed);
        assert!(ran.load(Ordering::Acquire));

        pool.shutdown(Duration::from_secs(10)).unwrap();
    }

    #[test]
    fn test_tasks_run_on_named_pool_threads() {
        let pool = WorkerPool::new(1).unwrap();

        let handle = pool
            .submit(|| {
                let name = thread::current().name().unwrap_or("").to_string();
                assert!(name.starts_with("pool-worker-"), "ran on {}", name);
            })
            .unwrap();

        assert_eq!(handle.wait(), TaskOutcome::Completed);
        pool.shutdown(Duration::from_secs(10)).unwrap();
    }

    #[test]
    fn test_join_all_over_two_tasks() {
        let pool = WorkerPool::new(4).unwrap();
        let total = Arc::new(AtomicU64::new(0));

        let a = Arc::clone(&total);
        let b = Arc::clone(&total);
        let handles = vec![
            pool.submit(move || {
                a.fetch_add(1, Ordering::AcqRel);
            })
            .unwrap(),
            pool.submit(move || {
                b.fetch_add(1, Ordering::AcqRel);
            })
            .unwrap(),
        ];

        assert_eq!(join_all(&handles), TaskOutcome::Completed);
        assert_eq!(total.load(Ordering::Acquire), 2);

        pool.shutdown(Duration::from_secs(10)).unwrap();
    }

    #[test]
    fn test_submit_after_shutdown_rejected() {
        let pool = WorkerPool::new(1).unwrap();
        pool.begin_shutdown();

        let result = pool.submit(|| {});
        assert!(matches!(
            result,
            Err(HarnessError::Pool(PoolError::ShuttingDown))
        ));

        pool.shutdown(Duration::from_secs(10)).unwrap();
    }

    #[test]
    fn test_idle_pool_shutdown_is_bounded() {
        let pool = WorkerPool::new(4).unwrap();

        let start = Instant::now();
        pool.shutdown(Duration::from_secs(10)).unwrap();

        // No pending work: teardown must finish inside the first
        // stage, nowhere near the timeout.
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_shutdown_drains_queued_tasks() {
        let pool = WorkerPool::new(1).unwrap();
        let total = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let t = Arc::clone(&total);
                pool.submit(move || {
                    t.fetch_add(1, Ordering::AcqRel);
                })
                .unwrap()
            })
            .collect();

        pool.shutdown(Duration::from_secs(10)).unwrap();

        assert_eq!(join_all(&handles), TaskOutcome::Completed);
        assert_eq!(total.load(Ordering::Acquire), 8);
    }

    #[test]
    fn test_force_cancel_skips_queued_tasks() {
        let pool = WorkerPool::new(1).unwrap();

        let started = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&started);
        let blocker = pool
            .submit(move || {
                flag.store(true, Ordering::Release);
                thread::sleep(Duration::from_millis(100));
            })
            .unwrap();

        // Make sure the single slot is occupied before queuing more.
        while !started.load(Ordering::Acquire) {
            thread::yield_now();
        }

        let queued_ran = Arc::new(AtomicBool::new(false));
        let ran = Arc::clone(&queued_ran);
        let queued = pool
            .submit(move || ran.store(true, Ordering::Release))
            .unwrap();

        pool.force_cancel();

        assert_eq!(blocker.wait(), TaskOutcome::Completed);
        assert_eq!(queued.wait(), TaskOutcome::Cancelled);
        assert!(!queued_ran.load(Ordering::Acquire));

        pool.shutdown(Duration::from_secs(10)).unwrap();
    }

    #[test]
    fn test_panicking_task_releases_latch_and_slot() {
        let pool = WorkerPool::new(1).unwrap();

        let bad = pool.submit(|| panic!("boom")).unwrap();
        assert_eq!(bad.wait(), TaskOutcome::Completed);
        assert_eq!(pool.task_panics(), 1);

        // The slot must still be usable afterwards.
        let ok = pool.submit(|| {}).unwrap();
        assert_eq!(ok.wait(), TaskOutcome::Completed);

        pool.shutdown(Duration::from_secs(10)).unwrap();
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            WorkerPool::new(0),
            Err(HarnessError::Config(_))
        ));
    }

    #[test]
    fn test_capacity_accessor() {
        let pool = WorkerPool::new(4).unwrap();
        assert_eq!(pool.capacity(), 4);
        pool.shutdown(Duration::from_secs(10)).unwrap();
    }
}
