//! Word-splitting seam for sentence scoring
//!
//! Segmentation rules belong to the tokenizer; the compressor only asks for
//! a list of tokens per sentence.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Error)]
#[error("Tokenizer failed: {0}")]
pub struct TokenizeError(pub String);

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizeError>;

    fn name(&self) -> &'static str;
}

/// Unicode (UAX #29) word boundaries, punctuation dropped
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeWordTokenizer;

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizeError> {
        Ok(text.unicode_words().map(str::to_string).collect())
    }

    fn name(&self) -> &'static str {
        "unicode"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizeError> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}

/// Every non-whitespace character is a token
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizeError> {
        Ok(text
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .map(String::from)
            .collect())
    }

    fn name(&self) -> &'static str {
        "chars"
    }
}

/// Tokenizer selection as it appears in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Unicode,
    Whitespace,
    Chars,
}

impl TokenizerKind {
    pub fn build(self) -> Arc<dyn Tokenizer> {
        match self {
            TokenizerKind::Unicode => Arc::new(UnicodeWordTokenizer),
            TokenizerKind::Whitespace => Arc::new(WhitespaceTokenizer),
            TokenizerKind::Chars => Arc::new(CharTokenizer),
        }
    }
}
