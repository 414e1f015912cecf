use std::borrow::Cow;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors raised while assembling a keyword set
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeywordError {
    #[error("keyword #{index} is empty; empty patterns are not allowed")]
    Empty { index: usize },
}

/// Case policy shared by keyword folding and text folding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseMode {
    Sensitive,
    #[default]
    Insensitive,
}

impl CaseMode {
    pub fn from_sensitive(case_sensitive: bool) -> Self {
        if case_sensitive {
            CaseMode::Sensitive
        } else {
            CaseMode::Insensitive
        }
    }

    pub fn is_sensitive(self) -> bool {
        matches!(self, CaseMode::Sensitive)
    }

    /// Bring `text` into the canonical form the automaton was built with
    pub fn fold(self, text: &str) -> Cow<'_, str> {
        match self {
            CaseMode::Sensitive => Cow::Borrowed(text),
            CaseMode::Insensitive => Cow::Owned(fold_case(text)),
        }
    }
}

/// Per-character upper-then-lower mapping.
///
/// Lowercasing alone is not stable under case changes: `ß` uppercases to
/// `SS`, and `str::to_lowercase` picks `ς` or `σ` from context. Going through
/// the uppercase form of every char collapses all of these.
fn fold_case(text: &str) -> String {
    text.chars()
        .flat_map(char::to_uppercase)
        .flat_map(char::to_lowercase)
        .collect()
}

/// Immutable, de-duplicated set of keywords plus the case policy used to fold them.
///
/// Each keyword's identity is its folded form: with case-insensitive matching
/// `"Alpha"` and `"ALPHA"` collapse into the single keyword `"alpha"`.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    keywords: Vec<String>,
    case: CaseMode,
}

impl KeywordSet {
    /// Fold and de-duplicate `keywords`. Order of first occurrence is kept.
    pub fn new<I, S>(keywords: I, case_sensitive: bool) -> Result<Self, KeywordError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let case = CaseMode::from_sensitive(case_sensitive);
        let mut seen = BTreeSet::new();
        let mut folded = Vec::new();

        for (index, keyword) in keywords.into_iter().enumerate() {
            let keyword = keyword.as_ref();
            if keyword.is_empty() {
                return Err(KeywordError::Empty { index });
            }
            let canonical = case.fold(keyword).into_owned();
            if seen.insert(canonical.clone()) {
                folded.push(canonical);
            }
        }

        Ok(Self {
            keywords: folded,
            case,
        })
    }

    pub fn case_mode(&self) -> CaseMode {
        self.case
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.keywords.get(id).map(String::as_str)
    }

}
