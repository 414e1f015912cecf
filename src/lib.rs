//! # textsieve - keyword filtering and sentence compression for text corpora
//!
//! Keeps only the rows of a corpus that mention any configured keyword, and
//! shrinks their over-long text fields by dropping the least informative
//! sentences.
//!
//! ## Features
//!
//! - **Single-pass matching**: an Aho-Corasick automaton finds every keyword in
//!   time linear in the text, regardless of how many keywords are configured
//! - **Deterministic parallelism**: rows are scanned in contiguous chunks on a
//!   worker pool and the retention mask is assembled in chunk order
//! - **Extractive compression**: sentences are scored by the mean frequency of
//!   their tokens and removed lowest-first until the text fits its budget
//! - **Layered configuration**: defaults, user and repository files, env vars, flags
//!
//! ## Quick Start
//!
//! ```bash
//! # Keep rows mentioning either keyword, compress to 200 characters
//! textsieve filter reviews.jsonl -k battery,screen --max-length 200 -o kept.jsonl
//!
//! # Process every *.jsonl file in a directory
//! textsieve run data/ out/
//! ```

pub mod cli;
pub mod compress;
pub mod config;
pub mod filter;
pub mod matcher;
pub mod parallel;
pub mod pipeline;

pub use cli::{Cli, Output};
pub use compress::{FrequencyDictionary, SentenceCompressor};
pub use config::{ConfigLoader, SieveConfig};
pub use filter::{RetentionMask, Row, RowFilterEngine};
pub use matcher::PatternAutomaton;
pub use pipeline::Pipeline;

/// Result type alias for textsieve operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
