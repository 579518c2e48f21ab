//! Fixed-size worker pool.
//!
//! Wraps a private rayon::ThreadPool (never the global pool). Jobs are
//! dispatched FIFO and each runs to completion on one worker, so work inside
//! a job stays ordered while jobs themselves interleave across at most
//! `size` threads.

use std::sync::mpsc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool size must be at least 1")]
    ZeroWorkers,

    #[error("failed to build worker pool: {0}")]
    Build(String),
}

pub struct WorkerPool {
    pool: rayon::ThreadPool,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::ZeroWorkers);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|i| format!("klinedl-worker-{i}"))
            .build()
            .map_err(|e| PoolError::Build(e.to_string()))?;
        Ok(Self { pool, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `f(index, job)` once per job and return results in job order.
    ///
    /// Blocks until every job has finished. With `size == 1` jobs run one
    /// after another in submission order.
    pub fn map<J, R, F>(&self, jobs: Vec<J>, f: F) -> Vec<R>
    where
        J: Send,
        R: Send,
        F: Fn(usize, J) -> R + Sync,
    {
        let (tx, rx) = mpsc::channel();
        let f = &f;

        self.pool.scope_fifo(|scope| {
            for (index, job) in jobs.into_iter().enumerate() {
                let tx = tx.clone();
                scope.spawn_fifo(move |_| {
                    // The receiver outlives the scope, so send cannot fail here.
                    let _ = tx.send((index, f(index, job)));
                });
            }
        });
        drop(tx);

        let mut results: Vec<(usize, R)> = rx.into_iter().collect();
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, r)| r).collect()
    }
}
