use std::sync::Arc;

use super::dictionary::FrequencyDictionary;
use super::sentence::{DEFAULT_TERMINATOR, char_len, join_sentences, split_sentences};
use super::tokenizer::Tokenizer;

/// Outcome of one compression call
#[derive(Debug, Clone, PartialEq)]
pub struct Compression {
    pub text: String,
    pub original_chars: usize,
    pub compressed_chars: usize,
    pub sentences_total: usize,
    pub sentences_removed: usize,
}

impl Compression {
    fn unchanged(text: &str, chars: usize) -> Self {
        Self {
            text: text.to_string(),
            original_chars: chars,
            compressed_chars: chars,
            sentences_total: 0,
            sentences_removed: 0,
        }
    }

    pub fn changed(&self) -> bool {
        self.sentences_removed > 0 || self.compressed_chars != self.original_chars
    }
}

struct ScoredSentence<'a> {
    text: &'a str,
    chars: usize,
    score: f64,
}

/// Extractive compressor: drops the least informative sentence until the
/// text fits its character budget.
///
/// A sentence's score is the mean dictionary score of its tokens. The lowest
/// score goes first; among equal scores the earliest sentence goes first.
/// Sentences are never cut, so a single sentence longer than the budget is
/// returned whole.
#[derive(Clone)]
pub struct SentenceCompressor {
    dictionary: Arc<FrequencyDictionary>,
    tokenizer: Arc<dyn Tokenizer>,
    max_length: usize,
    terminator: char,
}

impl SentenceCompressor {
    pub fn new(
        dictionary: Arc<FrequencyDictionary>,
        tokenizer: Arc<dyn Tokenizer>,
        max_length: usize,
    ) -> Self {
        Self {
            dictionary,
            tokenizer,
            max_length,
            terminator: DEFAULT_TERMINATOR,
        }
    }

    pub fn with_terminator(mut self, terminator: char) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Compress to the configured `max_length`
    pub fn compress(&self, text: &str) -> String {
        self.compress_to(text, self.max_length).text
    }

    pub fn compress_to(&self, text: &str, budget: usize) -> Compression {
        let original_chars = char_len(text);
        if original_chars <= budget {
            return Compression::unchanged(text, original_chars);
        }

        // Scores only depend on the sentence and the immutable dictionary,
        // so they are computed once up front.
        let mut working: Vec<ScoredSentence<'_>> = split_sentences(text, self.terminator)
            .into_iter()
            .map(|sentence| ScoredSentence {
                text: sentence,
                chars: char_len(sentence),
                score: self.score(sentence),
            })
            .collect();
        let sentences_total = working.len();

        // Each kept sentence contributes its characters plus one terminator
        let mut joined_chars: usize = working.iter().map(|s| s.chars + 1).sum();

        while working.len() > 1 {
            let victim = Self::lowest_scoring(&working);
            let removed = working.remove(victim);
            joined_chars -= removed.chars + 1;
            if joined_chars <= budget {
                break;
            }
        }

        // A lone survivor that still overflows comes back as-is, without a
        // terminator the input may never have had
        let text = match working.as_slice() {
            [only] if joined_chars > budget => only.text.to_string(),
            _ => {
                let kept: Vec<&str> = working.iter().map(|s| s.text).collect();
                join_sentences(&kept, self.terminator)
            }
        };
        let compressed_chars = char_len(&text);
        let sentences_removed = sentences_total - working.len();
        tracing::trace!(
            "Compressed {} -> {} chars, removed {}/{} sentences",
            original_chars,
            compressed_chars,
            sentences_removed,
            sentences_total
        );

        Compression {
            text,
            original_chars,
            compressed_chars,
            sentences_total,
            sentences_removed,
        }
    }

    /// First position holding the minimum score
    fn lowest_scoring(sentences: &[ScoredSentence<'_>]) -> usize {
        let mut best = 0;
        for (index, sentence) in sentences.iter().enumerate().skip(1) {
            if sentence.score < sentences[best].score {
                best = index;
            }
        }
        best
    }

    /// Mean dictionary score of the sentence's tokens; zero without tokens
    /// or when the tokenizer fails
    pub fn score(&self, sentence: &str) -> f64 {
        let tokens = match self.tokenizer.tokenize(sentence) {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::debug!("Scoring sentence as 0 after tokenizer error: {}", err);
                return 0.0;
            }
        };
        if tokens.is_empty() {
            return 0.0;
        }
        let total: f64 = tokens.iter().map(|token| self.dictionary.lookup(token)).sum();
        total / tokens.len() as f64
    }
}

impl std::fmt::Debug for SentenceCompressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceCompressor")
            .field("dictionary_tokens", &self.dictionary.len())
            .field("tokenizer", &self.tokenizer.name())
            .field("max_length", &self.max_length)
            .field("terminator", &self.terminator)
            .finish()
    }
}
