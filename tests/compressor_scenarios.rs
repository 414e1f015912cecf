//! Sentence compression behaviour on realistic inputs

use std::sync::Arc;
use tempfile::TempDir;

use textsieve::compress::{
    CharTokenizer, FrequencyDictionary, FrequencyTable, SentenceCompressor, UnicodeWordTokenizer,
    dictionary::table_files_in,
};

fn table(entries: &[(&str, f64)]) -> FrequencyTable {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn compressor(entries: &[(&str, f64)], budget: usize) -> SentenceCompressor {
    let dictionary = FrequencyDictionary::load([table(entries)]).unwrap();
    SentenceCompressor::new(Arc::new(dictionary), Arc::new(UnicodeWordTokenizer), budget)
}

const REVIEW: &str = "The battery lasts two days。\
The box was blue。\
Screen brightness is excellent outdoors。\
I bought it on a Tuesday。\
Battery charging is fast。";

fn review_compressor(budget: usize) -> SentenceCompressor {
    compressor(
        &[
            ("battery", 8.0),
            ("Battery", 8.0),
            ("Screen", 7.0),
            ("brightness", 6.0),
            ("charging", 5.0),
            ("excellent", 4.0),
            ("fast", 3.0),
            ("days", 2.0),
            ("box", 0.5),
            ("Tuesday", 0.1),
        ],
        budget,
    )
}

#[test]
fn test_three_sentence_example() {
    let c = compressor(&[("A", 5.0), ("B", 1.0), ("C", 3.0)], 4);
    assert_eq!(c.compress("A。B。C。"), "A。C。");
}

#[test]
fn test_result_respects_budget_for_many_budgets() {
    let total = REVIEW.chars().count();
    for budget in (0..=total + 5).step_by(7) {
        let c = review_compressor(budget);
        let result = c.compress_to(REVIEW, budget);
        if result.sentences_total - result.sentences_removed > 1 {
            assert!(
                result.compressed_chars <= budget,
                "budget {budget} produced {:?}",
                result.text
            );
        }
        assert!(!result.text.is_empty());
    }
}

#[test]
fn test_review_keeps_informative_sentences() {
    let c = review_compressor(70);
    let text = c.compress(REVIEW);
    assert!(text.contains("Screen brightness"));
    assert!(!text.contains("Tuesday"));
    assert!(!text.contains("box"));
    assert!(text.chars().count() <= 70);
}

#[test]
fn test_no_op_and_idempotence() {
    for budget in [10, 40, 80, 500] {
        let c = review_compressor(budget);
        let once = c.compress(REVIEW);
        assert_eq!(c.compress(&once), once, "budget {budget}");
    }
    let c = review_compressor(500);
    assert_eq!(c.compress(REVIEW), REVIEW);
}

#[test]
fn test_sentence_order_is_preserved() {
    let c = review_compressor(90);
    let text = c.compress(REVIEW);
    let screen = text.find("Screen").unwrap();
    let charging = text.find("charging").unwrap();
    assert!(screen < charging);
}

#[test]
fn test_line_breaks_split_sentences() {
    let c = compressor(&[("keep", 1.0)], 6);
    assert_eq!(c.compress("drop this\n keep \n\n"), "keep。");
}

#[test]
fn test_japanese_with_char_tokens() {
    let dictionary = FrequencyDictionary::load([table(&[("電", 5.0), ("池", 5.0), ("箱", 0.5)])]).unwrap();
    let c = SentenceCompressor::new(Arc::new(dictionary), Arc::new(CharTokenizer), 5);
    assert_eq!(c.compress("箱が青い。電池が長持ち。"), "電池が長持ち");
}

#[test]
fn test_dictionary_directory_later_file_wins() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("01_base.json"), r#"{"A": 1, "B": 9}"#).unwrap();
    std::fs::write(dir.path().join("02_override.json"), r#"{"B": 0}"#).unwrap();

    let files = table_files_in(dir.path()).unwrap();
    let dictionary = FrequencyDictionary::load_files(&files).unwrap();
    let c = SentenceCompressor::new(Arc::new(dictionary), Arc::new(UnicodeWordTokenizer), 2);
    assert_eq!(c.compress("A。B。"), "A。");
}
