//! Bounded worker pool for the parallel batch phases.
//!
//! Every phase is a parallel map over independent items followed by a
//! merge on the calling thread. Workers only ever see shared references to
//! read-only context built before the phase starts.

use crate::error::{ReuseError, Result};

/// Fixed-size rayon pool.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Create a pool with at most `max_workers` threads (0 = available parallelism).
    pub fn new(max_workers: usize) -> Result<Self> {
        let num_threads = if max_workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            max_workers
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("textreuse-worker-{i}"))
            .build()
            .map_err(|e| ReuseError::failed("create worker pool", e))?;

        tracing::debug!(workers = num_threads, "worker_pool");
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run a parallel phase inside this pool; returns once every worker is done.
    pub fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.pool.install(op)
    }
}
