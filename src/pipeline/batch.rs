use anyhow::{Context, Result, bail};
use globset::Glob;
use std::path::{Path, PathBuf};

use super::{Pipeline, PipelineStats};
use crate::config::OutputConfig;

/// Files directly inside `dir` whose name matches `pattern`, sorted by path
pub fn discover_inputs(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = Glob::new(pattern)
        .with_context(|| format!("Invalid input glob: {pattern}"))?
        .compile_matcher();

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory {}", dir.display()))?;

    let mut inputs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.file_name().is_some_and(|name| matcher.is_match(name)) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// `<dir>/<prefix>_<NNN>.jsonl`, `ordinal` counting from 1
pub fn output_path_for(dir: &Path, prefix: &str, ordinal: usize) -> PathBuf {
    dir.join(format!("{prefix}_{ordinal:03}.jsonl"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Input/output pairing for a directory run
#[derive(Debug, Clone)]
pub struct BatchPlan {
    jobs: Vec<BatchJob>,
}

impl BatchPlan {
    pub fn new(input_dir: &Path, output_dir: &Path, output: &OutputConfig) -> Result<Self> {
        if !input_dir.is_dir() {
            bail!("Input directory not found: {}", input_dir.display());
        }

        let jobs = discover_inputs(input_dir, &output.input_glob)?
            .into_iter()
            .enumerate()
            .map(|(index, input)| BatchJob {
                input,
                output: output_path_for(output_dir, &output.file_prefix, index + 1),
            })
            .collect();
        Ok(Self { jobs })
    }

    pub fn jobs(&self) -> &[BatchJob] {
        &self.jobs
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Process every job in order, stopping at the first failing file.
    ///
    /// `on_file` sees each finished job with its stats.
    pub fn run<F>(&self, pipeline: &Pipeline, mut on_file: F) -> Result<PipelineStats>
    where
        F: FnMut(&BatchJob, &PipelineStats),
    {
        let mut total = PipelineStats::default();
        for job in &self.jobs {
            if let Some(parent) = job.output.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory {}", parent.display())
                })?;
            }
            let stats = pipeline
                .process_file(&job.input, &job.output)
                .with_context(|| format!("Batch aborted at {}", job.input.display()))?;
            on_file(job, &stats);
            total.merge(&stats);
        }
        Ok(total)
    }
}
