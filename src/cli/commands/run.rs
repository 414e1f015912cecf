use anyhow::Result;
use clap::Args;
use serde_json::json;
use std::path::{Path, PathBuf};

use super::{load_config, report_stats};
use crate::cli::Output;
use crate::pipeline::{BatchPlan, Pipeline};

#[derive(Args)]
pub struct RunArgs {
    /// Directory holding the input files
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory receiving `<prefix>_<NNN>.jsonl` files
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Glob selecting input files
    #[arg(long)]
    pub glob: Option<String>,

    /// List the planned input/output pairs without processing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(args: RunArgs, custom_config: Option<&Path>, output: &Output) -> Result<()> {
    let config = load_config(custom_config, json!({"output": {"input_glob": args.glob}}))?;
    let plan = BatchPlan::new(&args.input_dir, &args.output_dir, &config.output)?;

    if plan.is_empty() {
        output.warning(&format!(
            "No files matching {} in {}",
            config.output.input_glob,
            args.input_dir.display()
        ));
        return Ok(());
    }

    output.header(&format!("{} file(s) to process", plan.jobs().len()));
    for job in plan.jobs() {
        output.step(&format!("{} -> {}", job.input.display(), job.output.display()));
    }
    if args.dry_run {
        output.info("Dry run: nothing written");
        return Ok(());
    }

    let pipeline = Pipeline::from_config(config)?;
    let progress = output.progress_bar(plan.jobs().len() as u64, "files");
    let total = plan.run(&pipeline, |job, stats| {
        progress.inc(1);
        progress.set_message(format!(
            "{}: kept {}/{}",
            job.input.display(),
            stats.rows_retained,
            stats.rows_read
        ));
    });
    progress.finish_and_clear();

    let total = total?;
    output.success(&format!(
        "Processed {} file(s) into {}",
        plan.jobs().len(),
        args.output_dir.display()
    ));
    report_stats(output, &total);
    Ok(())
}
