//! Multi-pattern keyword matching
//!
//! [`PatternAutomaton`] is compiled once from a keyword list and then shared
//! read-only by every scan. Case folding is applied identically to keywords
//! at build time and to text at scan time.

pub mod automaton;
pub mod keywords;

pub use automaton::PatternAutomaton;
pub use keywords::{CaseMode, KeywordError, KeywordSet};
