//! Frequency-guided extractive compression
//!
//! Over-long texts are cut down sentence by sentence. A
//! [`FrequencyDictionary`] built once at startup scores tokens, a
//! [`Tokenizer`] splits sentences into tokens and the [`SentenceCompressor`]
//! repeatedly drops the sentence with the lowest mean score.

pub mod compressor;
pub mod dictionary;
pub mod sentence;
pub mod tokenizer;

pub use compressor::{Compression, SentenceCompressor};
pub use dictionary::{DictionaryError, FrequencyDictionary, FrequencyTable};
pub use sentence::DEFAULT_TERMINATOR;
pub use tokenizer::{
    CharTokenizer, TokenizeError, Tokenizer, TokenizerKind, UnicodeWordTokenizer,
    WhitespaceTokenizer,
};
