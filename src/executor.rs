//! Parallel dispatch of batches with a single merging consumer.
//!
//! Batches are pulled from the source on the pool, each one is processed by
//! a separate task, and the partial results travel over a channel to one
//! merging thread. The first error stops the run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use hinv_accumulator::ResultAccumulator;
use hinv_primitives::EventSource;
use log::{debug, info};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Error;
use crate::processor::CountingProcessor;

pub struct Executor {
    pool: ThreadPool,
}

impl Executor {
    /// Build a pool of `workers` threads; 0 uses one thread per core.
    pub fn new(workers: usize) -> Result<Self, Error> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("counting-worker-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Process every batch of `source` and merge the results.
    ///
    /// The merged result does not depend on the order in which batches
    /// finish.
    pub fn run<S: EventSource>(
        &self,
        processor: &CountingProcessor,
        mut source: S,
    ) -> Result<ResultAccumulator, Error> {
        info!(
            "processing {} batches on {} workers",
            source
                .remaining()
                .map_or_else(|| "an unknown number of".to_string(), |n| n.to_string()),
            self.workers()
        );

        let failed = AtomicBool::new(false);
        let failed = &failed;
        let (tx, rx) = mpsc::channel::<Result<ResultAccumulator, Error>>();

        let (read, merged) = thread::scope(|scope| {
            let merger = scope.spawn(move || {
                let mut total = ResultAccumulator::new();
                let mut n_batches = 0usize;
                for part in rx {
                    match part {
                        Ok(acc) => {
                            total.merge_in(acc);
                            n_batches += 1;
                        }
                        Err(e) => {
                            failed.store(true, Ordering::SeqCst);
                            return Err(e);
                        }
                    }
                }
                Ok((total, n_batches))
            });

            let read = self.pool.scope(|pool| {
                while let Some(next) = source.next_batch() {
                    if failed.load(Ordering::SeqCst) {
                        break;
                    }
                    let batch = match next {
                        Ok(batch) => batch,
                        Err(e) => {
                            failed.store(true, Ordering::SeqCst);
                            return Err(Error::from(e));
                        }
                    };
                    let tx = tx.clone();
                    pool.spawn(move |_| {
                        if failed.load(Ordering::SeqCst) {
                            return;
                        }
                        // the merger only hangs up after an error
                        let _ = tx.send(processor.process(&batch));
                    });
                }
                Ok(())
            });
            drop(tx);

            let merged = merger
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (read, merged)
        });

        let (total, n_batches) = merged?;
        read?;
        debug!("merged {n_batches} partial results");
        info!(
            "processed {n_batches} batches from {} datasets",
            total.datasets().count()
        );
        Ok(total)
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("workers", &self.workers())
            .finish()
    }
}
