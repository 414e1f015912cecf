//! End-to-end processing of row collections
//!
//! read rows → keyword filter → matched keywords → sentence compression → write

pub mod batch;

pub use batch::{BatchJob, BatchPlan, discover_inputs, output_path_for};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::compress::{FrequencyDictionary, SentenceCompressor};
use crate::config::SieveConfig;
use crate::filter::{RetentionMask, Row, RowFilterEngine, RowReader, RowWriter};
use crate::matcher::PatternAutomaton;

/// Counters for one or more processed row collections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub rows_read: usize,
    pub rows_retained: usize,
    /// Text values that compression actually shortened
    pub texts_compressed: usize,
    pub chars_before: usize,
    pub chars_after: usize,
    /// Retained rows per matched keyword
    pub keyword_hits: BTreeMap<String, usize>,
}

impl PipelineStats {
    pub fn merge(&mut self, other: &PipelineStats) {
        self.rows_read += other.rows_read;
        self.rows_retained += other.rows_retained;
        self.texts_compressed += other.texts_compressed;
        self.chars_before += other.chars_before;
        self.chars_after += other.chars_after;
        for (keyword, hits) in &other.keyword_hits {
            *self.keyword_hits.entry(keyword.clone()).or_default() += hits;
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Retained rows in input order, augmented
    pub rows: Vec<Row>,
    pub mask: RetentionMask,
    pub stats: PipelineStats,
}

#[derive(Default)]
struct RowCompression {
    compressed: usize,
    chars_before: usize,
    chars_after: usize,
}

/// Filter and compression stages built once from a configuration
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: SieveConfig,
    engine: RowFilterEngine,
    compressor: Option<SentenceCompressor>,
}

impl Pipeline {
    pub fn new(config: SieveConfig, dictionary: Arc<FrequencyDictionary>) -> Result<Self> {
        config.validate()?;

        let automaton = PatternAutomaton::build(&config.filter.keywords, config.filter.case_sensitive)
            .context("Invalid keyword configuration")?;
        if automaton.keywords().is_empty() {
            tracing::warn!("No keywords configured; every row will be dropped");
        }

        let compressor = config.compress.enabled.then(|| {
            SentenceCompressor::new(
                dictionary,
                config.compress.tokenizer.build(),
                config.compress.max_length,
            )
            .with_terminator(config.compress.terminator)
        });

        Ok(Self {
            engine: RowFilterEngine::new(Arc::new(automaton)),
            compressor,
            config,
        })
    }

    /// Build with the dictionaries named in `config`
    pub fn from_config(config: SieveConfig) -> Result<Self> {
        let dictionary = if config.compress.enabled {
            let files = config.dictionary_files()?;
            FrequencyDictionary::load_files(&files)?
        } else {
            FrequencyDictionary::default()
        };
        Self::new(config, Arc::new(dictionary))
    }

    pub fn config(&self) -> &SieveConfig {
        &self.config
    }

    pub fn engine(&self) -> &RowFilterEngine {
        &self.engine
    }

    pub fn compressor(&self) -> Option<&SentenceCompressor> {
        self.compressor.as_ref()
    }

    pub fn process_rows(&self, rows: &[Row]) -> Result<PipelineOutput> {
        self.process_rows_with_progress(rows, None::<fn(usize, usize, usize)>)
    }

    /// [`process_rows`](Self::process_rows) reporting filter chunk progress
    pub fn process_rows_with_progress<P>(
        &self,
        rows: &[Row],
        progress_reporter: Option<P>,
    ) -> Result<PipelineOutput>
    where
        P: Fn(usize, usize, usize) + Sync,
    {
        let filter = &self.config.filter;
        let mask = self.engine.filter_mask_with_progress(
            rows,
            &filter.text_columns,
            filter.chunk_size,
            filter.workers,
            progress_reporter,
        )?;
        let retained = self.engine.retained(rows, &mask, &filter.text_columns)?;

        let mut stats = PipelineStats {
            rows_read: rows.len(),
            rows_retained: retained.len(),
            ..Default::default()
        };
        for entry in &retained {
            for keyword in &entry.keywords {
                *stats.keyword_hits.entry(keyword.clone()).or_default() += 1;
            }
        }

        let keyword_column = &self.config.output.matched_keywords_column;
        let augmented: Vec<(Row, RowCompression)> = retained
            .par_iter()
            .map(|entry| {
                let keywords: Vec<Value> =
                    entry.keywords.iter().cloned().map(Value::String).collect();
                let row = entry.row.with_field(keyword_column, Value::Array(keywords));
                self.compress_row(row)
            })
            .collect();

        let mut out_rows = Vec::with_capacity(augmented.len());
        for (row, compression) in augmented {
            stats.texts_compressed += compression.compressed;
            stats.chars_before += compression.chars_before;
            stats.chars_after += compression.chars_after;
            out_rows.push(row);
        }

        if self.compressor.is_some() {
            tracing::info!(
                "Compressed {} text value(s): {} -> {} chars",
                stats.texts_compressed,
                stats.chars_before,
                stats.chars_after
            );
        }

        Ok(PipelineOutput {
            rows: out_rows,
            mask,
            stats,
        })
    }

    /// Replace each configured string column with its compressed text
    fn compress_row(&self, mut row: Row) -> (Row, RowCompression) {
        let mut summary = RowCompression::default();
        let Some(compressor) = &self.compressor else {
            return (row, summary);
        };

        for column in &self.config.filter.text_columns {
            let Some(Value::String(text)) = row.fields().get(column) else {
                continue;
            };
            let result = compressor.compress_to(text, compressor.max_length());
            summary.chars_before += result.original_chars;
            summary.chars_after += result.compressed_chars;
            if result.changed() {
                summary.compressed += 1;
                row = row.with_field(column, Value::String(result.text));
            }
        }
        (row, summary)
    }

    pub fn process_file(&self, input: &Path, output: &Path) -> Result<PipelineStats> {
        let rows = RowReader::read_path(input)?;
        let result = self
            .process_rows(&rows)
            .with_context(|| format!("Failed to process {}", input.display()))?;
        RowWriter::write_path(output, &result.rows)?;
        tracing::info!(
            "{} -> {}: kept {}/{} rows",
            input.display(),
            output.display(),
            result.stats.rows_retained,
            result.stats.rows_read
        );
        Ok(result.stats)
    }
}
