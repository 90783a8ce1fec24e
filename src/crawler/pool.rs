//! Bounded worker pool
//!
//! A fixed number of workers drain a shared queue. Each outcome goes to a
//! result channel, and the pool waits for every worker before returning, so a
//! caller sees either all outcomes or none.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Runs jobs with at most `workers` in flight
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Creates a pool; zero workers is treated as one
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `task` over every job and collects the `Some` outcomes
    ///
    /// Outcomes come back in job order regardless of completion order. A
    /// worker that panics is logged; outcomes already delivered are kept and
    /// the remaining jobs are drained by the other workers.
    pub async fn run<T, R, F, Fut>(&self, jobs: Vec<T>, task: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<R>> + Send + 'static,
    {
        let total = jobs.len();
        if total == 0 {
            return Vec::new();
        }

        let queue = Arc::new(Mutex::new(
            jobs.into_iter().enumerate().collect::<VecDeque<_>>(),
        ));
        let task = Arc::new(task);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let worker_count = self.workers.min(total);
        tracing::debug!("Starting {} workers for {} jobs", worker_count, total);

        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            let queue = Arc::clone(&queue);
            let task = Arc::clone(&task);
            let tx = tx.clone();

            workers.spawn(async move {
                loop {
                    let next = queue.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                    let Some((index, job)) = next else {
                        break;
                    };

                    if let Some(outcome) = (*task)(job).await {
                        if tx.send((index, outcome)).is_err() {
                            break;
                        }
                    }
                }
                tracing::trace!("Worker {} finished", worker_id);
            });
        }
        drop(tx);

        // Barrier: every worker has stopped before results are read
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::error!("Worker panicked: {}", e);
                } else {
                    tracing::warn!("Worker cancelled: {}", e);
                }
            }
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }
        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }
}
