use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::load_config;
use crate::cli::Output;
use crate::compress::{FrequencyDictionary, SentenceCompressor, TokenizerKind};

#[derive(Args)]
pub struct CompressArgs {
    /// Text to compress; read from stdin when omitted
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Character budget
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Tokenizer used to score sentences
    #[arg(long, value_enum)]
    pub tokenizer: Option<TokenizerKind>,

    /// Frequency table (JSON) replacing the configured list, may be repeated
    #[arg(short, long = "dictionary", value_name = "FILE")]
    pub dictionaries: Vec<PathBuf>,
}

pub fn execute(args: CompressArgs, custom_config: Option<&Path>, output: &Output) -> Result<()> {
    let config = load_config(
        custom_config,
        json!({
            "compress": {
                "max_length": args.max_length,
                "tokenizer": args.tokenizer,
                "dictionaries": (!args.dictionaries.is_empty()).then_some(&args.dictionaries),
            }
        }),
    )?;

    let text = match args.text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer
        }
    };

    let dictionary = FrequencyDictionary::load_files(&config.dictionary_files()?)?;
    if dictionary.is_empty() {
        output.warning("No frequency dictionary loaded; all sentences score 0");
    }

    let compressor = SentenceCompressor::new(
        Arc::new(dictionary),
        config.compress.tokenizer.build(),
        config.compress.max_length,
    )
    .with_terminator(config.compress.terminator);

    let result = compressor.compress_to(&text, compressor.max_length());
    println!("{}", result.text);

    output.verbose(&format!(
        "{} -> {} chars, removed {}/{} sentences",
        result.original_chars,
        result.compressed_chars,
        result.sentences_removed,
        result.sentences_total
    ));
    Ok(())
}
