//! Configuration management for textsieve
//!
//! Typed settings for the filter, compression and output stages. Values are
//! layered by [`ConfigLoader`]: embedded defaults, user file, repository
//! file, an explicit `--config` file, `TEXTSIEVE_` environment variables and
//! finally command line flags.

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::compress::{DEFAULT_TERMINATOR, TokenizerKind};
use crate::parallel::WorkerCount;

pub mod core;
pub mod smart_load;

pub use self::core::ConfigLoader;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SieveConfig {
    pub filter: FilterConfig,
    pub compress: CompressConfig,
    pub output: OutputConfig,
}

/// Keyword filtering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// Keywords; a row is kept when any of them occurs in a text column
    pub keywords: Vec<String>,

    /// Match keywords with exact case
    pub case_sensitive: bool,

    /// Columns scanned for keywords and compressed afterwards
    pub text_columns: Vec<String>,

    /// Maximum rows per unit of parallel work
    pub chunk_size: usize,

    /// -1 = all cores, 1 = sequential, N = fixed pool
    pub workers: WorkerCount,
}

/// Sentence compression of retained rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompressConfig {
    pub enabled: bool,

    /// Character budget per text value
    pub max_length: usize,

    pub terminator: char,

    pub tokenizer: TokenizerKind,

    /// JSON frequency tables, later tables override earlier ones
    pub dictionaries: Vec<PathBuf>,

    /// Every `*.json` here is loaded (by name) before `dictionaries`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary_dir: Option<PathBuf>,
}

/// Output naming
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Column added to every retained row
    pub matched_keywords_column: String,

    /// Batch output files are named `<prefix>_<NNN>.jsonl`
    pub file_prefix: String,

    /// Glob selecting batch input files inside the input directory
    pub input_glob: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            keywords: vec![],
            case_sensitive: false,
            text_columns: vec!["text".to_string()],
            chunk_size: 10_000,
            workers: WorkerCount::All,
        }
    }
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_length: 512,
            terminator: DEFAULT_TERMINATOR,
            tokenizer: TokenizerKind::Unicode,
            dictionaries: vec![],
            dictionary_dir: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            matched_keywords_column: "matched_keywords".to_string(),
            file_prefix: "filtered".to_string(),
            input_glob: "*.jsonl".to_string(),
        }
    }
}

impl SieveConfig {
    /// Reject settings that would fail later, before any data is read
    pub fn validate(&self) -> Result<()> {
        ensure!(self.filter.chunk_size >= 1, "filter.chunk_size must be at least 1");
        ensure!(
            !self.filter.text_columns.is_empty(),
            "filter.text_columns must name at least one column"
        );
        ensure!(
            !self.output.matched_keywords_column.is_empty(),
            "output.matched_keywords_column must not be empty"
        );
        Ok(())
    }

    /// Ordered dictionary files: `dictionary_dir` contents, then `dictionaries`
    pub fn dictionary_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = match &self.compress.dictionary_dir {
            Some(dir) => crate::compress::dictionary::table_files_in(dir)?,
            None => vec![],
        };
        files.extend(self.compress.dictionaries.iter().cloned());
        Ok(files)
    }
}
