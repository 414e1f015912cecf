/// Ideographic full stop, the terminator used by the source corpora
pub const DEFAULT_TERMINATOR: char = '。';

/// Split on line breaks, then on `terminator`; fragments are trimmed and
/// empty ones dropped. Order is preserved.
pub fn split_sentences(text: &str, terminator: char) -> Vec<&str> {
    text.split('\n')
        .flat_map(|line| line.split(terminator))
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

/// Join with `terminator`, closing the last sentence too
pub fn join_sentences<S: AsRef<str>>(sentences: &[S], terminator: char) -> String {
    let mut joined = String::new();
    for sentence in sentences {
        joined.push_str(sentence.as_ref());
        joined.push(terminator);
    }
    joined
}

/// Length in characters, the unit budgets are expressed in
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
