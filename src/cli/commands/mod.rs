use anyhow::Result;
use serde_json::Value;
use std::path::Path;

use crate::cli::Output;
use crate::config::{ConfigLoader, SieveConfig};
use crate::pipeline::PipelineStats;

pub mod compress;
pub mod config;
pub mod filter;
pub mod run;

/// Load the layered configuration with flags the user actually passed on top
pub(crate) fn load_config(custom_config: Option<&Path>, overrides: Value) -> Result<SieveConfig> {
    let overrides = prune_nulls(overrides);
    tracing::trace!("CLI overrides: {}", overrides);
    ConfigLoader::load_with(custom_config, Some(overrides))?.extract()
}

/// Drop `null` leaves and objects left empty, so unset flags don't mask
/// lower configuration layers
fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, prune_nulls(value)))
                .filter(|(_, value)| match value {
                    Value::Null => false,
                    Value::Object(inner) => !inner.is_empty(),
                    _ => true,
                })
                .collect(),
        ),
        other => other,
    }
}

pub(crate) fn report_stats(output: &Output, stats: &PipelineStats) {
    output.summary_stats("Rows read", stats.rows_read);
    output.summary_stats("Rows retained", stats.rows_retained);
    output.summary_stats("Texts compressed", stats.texts_compressed);
    if stats.chars_before > 0 {
        output.table_row(
            "Characters",
            &format!("{} -> {}", stats.chars_before, stats.chars_after),
        );
    }
    for (keyword, hits) in &stats.keyword_hits {
        output.verbose(&format!("{keyword}: {hits} row(s)"));
    }
}
