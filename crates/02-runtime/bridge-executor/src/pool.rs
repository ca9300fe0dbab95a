//! Fixed worker pool fed by an unbounded job channel.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Sizing for an [`Executor`].
#[derive(Clone, Copy, Debug)]
pub struct ExecutorConfig {
    /// Number of worker threads servicing the job queue.
    pub workers: NonZeroUsize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
            .clamp(1, 4);
        Self {
            workers: NonZeroUsize::new(workers).expect("clamped to at least 1"),
        }
    }
}

/// Pool of worker threads executing submitted jobs.
///
/// Submission enqueues on an unbounded channel and returns immediately;
/// the pool makes no ordering promise between jobs. Workers survive
/// panicking jobs: the unwind is caught, logged, and the loop continues.
/// Dropping the executor closes the queue, lets queued jobs drain, and
/// joins every worker.
pub struct Executor {
    queue: Option<Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl Executor {
    /// Spawns the configured number of workers.
    pub fn new(config: ExecutorConfig) -> Self {
        let (queue, jobs) = unbounded::<Job>();
        let workers = (0..config.workers.get())
            .map(|idx| {
                let jobs = jobs.clone();
                thread::Builder::new()
                    .name(format!("bridge-worker-{idx}"))
                    .spawn(move || worker_loop(idx, jobs))
                    .expect("spawn bridge worker")
            })
            .collect();
        log::debug!("executor started with {} workers", config.workers);
        Self {
            queue: Some(queue),
            workers,
        }
    }

    /// Enqueues a job without blocking.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        // `queue` is only `None` mid-drop, and send on the unbounded
        // channel only fails once every worker is gone; neither is
        // reachable through a live `&self`.
        let Some(queue) = self.queue.as_ref() else {
            log::error!("job submitted while executor is shutting down; dropped");
            return;
        };
        if queue.send(Box::new(job)).is_err() {
            log::error!("job submitted after workers exited; dropped");
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        // Closing the queue ends each worker loop after the backlog drains.
        self.queue.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("bridge worker terminated abnormally");
            }
        }
    }
}

fn worker_loop(idx: usize, jobs: Receiver<Job>) {
    log::trace!("bridge-worker-{idx} up");
    while let Ok(job) = jobs.recv() {
        // Backstop: dispatch already contains routine panics, but nothing
        // that escapes a job may take the worker down.
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            log::error!("bridge-worker-{idx}: job panicked past containment");
        }
    }
    log::trace!("bridge-worker-{idx} drained and stopped");
}
