use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::processor::{ParallelProcessor, SequentialExecutor};

/// Requested size of the worker pool
///
/// Mirrors the `workers` setting: `-1` means every available core, `1`
/// forces sequential evaluation and any other positive `N` is a fixed pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerCount {
    #[default]
    All,
    Fixed(usize),
}

impl WorkerCount {
    pub fn from_signed(value: i64) -> Result<Self> {
        match value {
            -1 => Ok(WorkerCount::All),
            n if n >= 1 => Ok(WorkerCount::Fixed(n as usize)),
            other => bail!("Invalid worker count {other}: expected -1 (all cores) or a positive number"),
        }
    }

    pub fn as_signed(self) -> i64 {
        match self {
            WorkerCount::All => -1,
            WorkerCount::Fixed(n) => n as i64,
        }
    }

    /// Number of worker threads this request maps to on the current machine
    pub fn resolve(self) -> usize {
        match self {
            WorkerCount::All => num_cpus::get().max(1),
            WorkerCount::Fixed(n) => n.max(1),
        }
    }

    pub fn is_sequential(self) -> bool {
        matches!(self, WorkerCount::Fixed(1))
    }
}

impl Serialize for WorkerCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_signed())
    }
}

impl<'de> Deserialize<'de> for WorkerCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        WorkerCount::from_signed(raw).map_err(serde::de::Error::custom)
    }
}

/// Execution strategy enum for choosing between parallel and sequential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Sequential,
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    /// Pick a strategy for `item_count` rows split into chunks of `chunk_size`.
    ///
    /// A single worker, or a workload that fits into one chunk, runs on the
    /// calling thread. Otherwise the pool never exceeds the chunk count.
    pub fn for_chunks(item_count: usize, chunk_size: usize, workers: WorkerCount) -> Self {
        if workers.is_sequential() || item_count <= chunk_size {
            return ExecutionStrategy::Sequential;
        }

        let chunk_count = item_count.div_ceil(chunk_size.max(1));
        let workers = workers.resolve().min(chunk_count);
        if workers <= 1 {
            ExecutionStrategy::Sequential
        } else {
            ExecutionStrategy::Parallel { workers }
        }
    }

    pub fn execute<T, R, F, P>(
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
        match self {
            ExecutionStrategy::Sequential => {
                SequentialExecutor::execute(work_items, worker_fn, progress_reporter)
            }
            ExecutionStrategy::Parallel { workers } => ParallelProcessor::new(*workers)
                .process(work_items, worker_fn, progress_reporter),
        }
    }

    pub fn workers(&self) -> usize {
        match self {
            ExecutionStrategy::Sequential => 1,
            ExecutionStrategy::Parallel { workers } => *workers,
        }
    }
}
