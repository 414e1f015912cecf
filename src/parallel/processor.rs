use anyhow::{Context, Result, anyhow};
use crossbeam::channel::{Receiver, Sender, bounded};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Bounded pool of scoped worker threads
///
/// Work items are tagged with their position before they are handed out and
/// results are written back into that position, so the returned vector always
/// follows input order no matter which worker finishes first. Any failed item
/// (an `Err` or a panicking worker) fails the whole call.
pub struct ParallelProcessor {
    workers: usize,
    channel_buffer_multiplier: usize,
}

/// Context for worker threads to avoid too many function parameters
struct WorkerContext<'a, T, R, F, P> {
    worker_id: usize,
    work_rx: Receiver<(usize, T)>,
    result_tx: Sender<(usize, Result<R>)>,
    progress_counter: &'a AtomicUsize,
    total_items: usize,
    worker_fn: &'a F,
    progress_reporter: Option<&'a P>,
}

impl ParallelProcessor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            channel_buffer_multiplier: 2,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Process `work_items` on the pool and return results in input order.
    ///
    /// `progress_reporter` receives `(completed, total, worker_id)`.
    pub fn process<T, R, F, P>(
        &self,
        work_items: Vec<T>,
        worker_fn: F,
        progress_reporter: Option<P>,
    ) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Sync,
        P: Fn(usize, usize, usize) + Sync,
    {
        let total_items = work_items.len();
        if total_items == 0 {
            return Ok(Vec::new());
        }

        let workers = self.workers.min(total_items);
        let buffer = workers * self.channel_buffer_multiplier;
        let (work_tx, work_rx): (Sender<(usize, T)>, Receiver<(usize, T)>) = bounded(buffer);
        let (result_tx, result_rx): (Sender<(usize, Result<R>)>, Receiver<(usize, Result<R>)>) =
            bounded(buffer * 2);

        let progress_counter = AtomicUsize::new(0);
        let worker_fn = &worker_fn;
        let progress_reporter = progress_reporter.as_ref();

        tracing::trace!("Starting {} workers for {} work items", workers, total_items);

        let collected = crossbeam::thread::scope(|s| {
            for worker_id in 0..workers {
                let ctx = WorkerContext {
                    worker_id,
                    work_rx: work_rx.clone(),
                    result_tx: result_tx.clone(),
                    progress_counter: &progress_counter,
                    total_items,
                    worker_fn,
                    progress_reporter,
                };
                s.spawn(move |_| Self::worker_thread(ctx));
            }

            // Producer thread: send work to workers
            s.spawn(move |_| {
                for item in work_items.into_iter().enumerate() {
                    if work_tx.send(item).is_err() {
                        break; // Workers dropped
                    }
                }
            });

            // Only the workers may hold these, otherwise the channels never close
            drop(work_rx);
            drop(result_tx);

            Self::collect_results(result_rx, total_items)
        })
        .map_err(|_| anyhow!("Worker thread panicked during parallel processing"))?;

        collected
    }

    fn worker_thread<T, R, F, P>(ctx: WorkerContext<'_, T, R, F, P>)
    where
        F: Fn(T) -> Result<R>,
        P: Fn(usize, usize, usize),
    {
        while let Ok((index, item)) = ctx.work_rx.recv() {
            let outcome = (ctx.worker_fn)(item);
            let failed = outcome.is_err();

            if ctx.result_tx.send((index, outcome)).is_err() {
                break; // Collector gave up
            }
            if failed {
                break;
            }

            let current = ctx.progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(reporter) = ctx.progress_reporter {
                reporter(current, ctx.total_items, ctx.worker_id);
            }
        }
    }

    /// Place results by index; stop at the first failure
    fn collect_results<R>(
        result_rx: Receiver<(usize, Result<R>)>,
        total_items: usize,
    ) -> Result<Vec<R>> {
        let mut slots: Vec<Option<R>> = (0..total_items).map(|_| None).collect();
        let mut received = 0;

        while received < total_items {
            let Ok((index, outcome)) = result_rx.recv() else {
                break; // every worker exited
            };
            let value = outcome.with_context(|| format!("Work item {index} failed"))?;
            slots[index] = Some(value);
            received += 1;
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or_else(|| anyhow!("Work item {index} produced no result")))
            .collect()
    }
}

/// In-order execution on the calling thread
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn execute<T, R, F, P>(
        work_items: Vec<T>,
        worker_fn: F,
        progress_reporter: Option<P>,
    ) -> Result<Vec<R>>
    where
        F: Fn(T) -> Result<R>,
        P: Fn(usize, usize, usize),
    {
        let total_items = work_items.len();
        let mut results = Vec::with_capacity(total_items);

        for (index, item) in work_items.into_iter().enumerate() {
            let value = worker_fn(item).with_context(|| format!("Work item {index} failed"))?;
            results.push(value);

            if let Some(reporter) = &progress_reporter {
                reporter(index + 1, total_items, 0);
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_PROGRESS: Option<fn(usize, usize, usize)> = None;

    #[test]
    fn test_parallel_processor_keeps_input_order() {
        let items: Vec<u64> = (0..200).collect();
        let results = ParallelProcessor::new(4)
            .process(
                items,
                |x| {
                    // Uneven work so completion order differs from input order
                    if x % 7 == 0 {
                        std::thread::sleep(std::time::Duration::from_millis(2));
                    }
                    Ok(x * 2)
                },
                NO_PROGRESS,
            )
            .unwrap();
        assert_eq!(results, (0..200).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_parallel_processor_borrows_shared_state() {
        let table = vec![10, 20, 30];
        let results = ParallelProcessor::new(2)
            .process(vec![2usize, 0, 1], |i| Ok(table[i]), NO_PROGRESS)
            .unwrap();
        assert_eq!(results, vec![30, 10, 20]);
    }

    #[test]
    fn test_parallel_processor_fails_whole_call() {
        let items: Vec<u32> = (0..50).collect();
        let result = ParallelProcessor::new(4).process(
            items,
            |x| {
                if x == 17 {
                    Err(anyhow!("Error at 17"))
                } else {
                    Ok(x)
                }
            },
            NO_PROGRESS,
        );
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("Error at 17"));
    }

    #[test]
    fn test_parallel_processor_reports_panics() {
        let result = ParallelProcessor::new(3).process(
            (0..10).collect::<Vec<u32>>(),
            |x| {
                if x == 5 {
                    panic!("worker blew up");
                }
                Ok(x)
            },
            NO_PROGRESS,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_progress_reaches_total() {
        let last = AtomicUsize::new(0);
        ParallelProcessor::new(2)
            .process(
                vec![1, 2, 3, 4, 5],
                |x| Ok(x),
                Some(|current: usize, total: usize, _worker: usize| {
                    assert_eq!(total, 5);
                    last.fetch_max(current, Ordering::Relaxed);
                }),
            )
            .unwrap();
        assert_eq!(last.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_sequential_executor_stops_at_first_error() {
        let calls = AtomicUsize::new(0);
        let result = SequentialExecutor::execute(
            vec![1, 2, 3, 4],
            |x| {
                calls.fetch_add(1, Ordering::Relaxed);
                if x == 2 { Err(anyhow!("bad item")) } else { Ok(x) }
            },
            NO_PROGRESS,
        );
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_empty_work() {
        let results: Vec<u8> = ParallelProcessor::new(4)
            .process(Vec::<u8>::new(), Ok, NO_PROGRESS)
            .unwrap();
        assert!(results.is_empty());
    }
}
