use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{load_config, report_stats};
use crate::cli::Output;
use crate::filter::{RowReader, RowWriter};
use crate::parallel::WorkerCount;
use crate::pipeline::Pipeline;

#[derive(Args)]
pub struct FilterArgs {
    /// JSON Lines file to filter
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Write retained rows here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Keywords (comma-separated or repeated)
    #[arg(short, long = "keyword", value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Text columns to scan and compress
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Match keywords with exact case
    #[arg(long)]
    pub case_sensitive: bool,

    /// Maximum rows per unit of parallel work
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Worker threads: -1 for all cores, 1 for sequential
    #[arg(long, allow_negative_numbers = true)]
    pub workers: Option<i64>,

    /// Keep retained text as-is
    #[arg(long)]
    pub no_compress: bool,

    /// Character budget per text value
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Frequency table (JSON) replacing the configured list, may be repeated
    #[arg(short, long = "dictionary", value_name = "FILE")]
    pub dictionaries: Vec<PathBuf>,
}

impl FilterArgs {
    fn overrides(&self) -> Result<serde_json::Value> {
        let workers = self.workers.map(WorkerCount::from_signed).transpose()?;
        Ok(json!({
            "filter": {
                "keywords": (!self.keywords.is_empty()).then_some(&self.keywords),
                "text_columns": (!self.columns.is_empty()).then_some(&self.columns),
                "case_sensitive": self.case_sensitive.then_some(true),
                "chunk_size": self.chunk_size,
                "workers": workers,
            },
            "compress": {
                "enabled": self.no_compress.then_some(false),
                "max_length": self.max_length,
                "dictionaries": (!self.dictionaries.is_empty()).then_some(&self.dictionaries),
            },
        }))
    }
}

pub fn execute(args: FilterArgs, custom_config: Option<&Path>, output: &Output) -> Result<()> {
    let config = load_config(custom_config, args.overrides()?)?;
    if config.filter.keywords.is_empty() {
        output.warning("No keywords configured; no rows will be retained");
    }
    let pipeline = Pipeline::from_config(config)?;

    let rows = RowReader::read_path(&args.input)?;
    output.verbose(&format!("Read {} rows from {}", rows.len(), args.input.display()));

    let chunk_size = pipeline.config().filter.chunk_size;
    let progress = output.progress_bar(rows.len().div_ceil(chunk_size) as u64, "chunks");
    let result = pipeline
        .process_rows_with_progress(
            &rows,
            Some(|done: usize, total: usize, _worker: usize| {
                progress.set_length(total as u64);
                progress.set_position(done as u64);
            }),
        )
        .with_context(|| format!("Failed to filter {}", args.input.display()))?;
    progress.finish_and_clear();

    match &args.output {
        Some(path) => {
            RowWriter::write_path(path, &result.rows)?;
            output.success(&format!(
                "Kept {}/{} rows -> {}",
                result.stats.rows_retained,
                result.stats.rows_read,
                path.display()
            ));
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            RowWriter::write(&mut writer, &result.rows)?;
            writer.flush()?;
        }
    }

    report_stats(output, &result.stats);
    Ok(())
}
