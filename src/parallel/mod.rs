//! Generic parallel execution framework
//!
//! This module only knows about system resources and execution strategy. It
//! has no notion of rows, keywords or chunks; callers hand it a list of work
//! items and a worker function.
//!
//! ## What This Module Does:
//! - **Resource Discovery**: resolves `-1` workers to `num_cpus::get()`
//! - **Execution Strategy**: sequential on the calling thread, or a bounded
//!   pool of scoped `crossbeam` threads fed through channels
//! - **Ordering**: results come back in work-item order, never completion order
//! - **Failure**: the first failed item (error or panic) fails the whole call;
//!   there is no partial result and no retry
//!
//! ```rust
//! use textsieve::parallel::{ExecutionStrategy, WorkerCount};
//!
//! let strategy = ExecutionStrategy::for_chunks(25, 10, WorkerCount::Fixed(4));
//! let doubled = strategy
//!     .execute(vec![1, 2, 3], |x| Ok(x * 2), None::<fn(usize, usize, usize)>)
//!     .unwrap();
//! assert_eq!(doubled, vec![2, 4, 6]);
//! ```

pub mod processor;
pub mod strategy;

pub use processor::{ParallelProcessor, SequentialExecutor};
pub use strategy::{ExecutionStrategy, WorkerCount};
