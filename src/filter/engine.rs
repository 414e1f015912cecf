use anyhow::{Result, bail, ensure};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::row::{RetentionMask, Row};
use crate::matcher::PatternAutomaton;
use crate::parallel::{ExecutionStrategy, WorkerCount};

/// A retained row together with every keyword found across its text columns
#[derive(Debug, Clone)]
pub struct RetainedRow<'a> {
    pub row: &'a Row,
    pub keywords: BTreeSet<String>,
}

/// Applies a [`PatternAutomaton`] to row collections
#[derive(Debug, Clone)]
pub struct RowFilterEngine {
    automaton: Arc<PatternAutomaton>,
}

impl RowFilterEngine {
    pub fn new(automaton: Arc<PatternAutomaton>) -> Self {
        Self { automaton }
    }

    pub fn automaton(&self) -> &PatternAutomaton {
        &self.automaton
    }

    /// One retention flag per row, in input order.
    ///
    /// A row is retained when any of `text_columns` contains a keyword.
    /// Missing columns and null values never match. With more than one
    /// worker and more rows than `chunk_size`, contiguous chunks are scanned
    /// on a worker pool and their flags concatenated in chunk order.
    pub fn filter_mask<S>(
        &self,
        rows: &[Row],
        text_columns: &[S],
        chunk_size: usize,
        workers: WorkerCount,
    ) -> Result<RetentionMask>
    where
        S: AsRef<str> + Sync,
    {
        self.filter_mask_with_progress(
            rows,
            text_columns,
            chunk_size,
            workers,
            None::<fn(usize, usize, usize)>,
        )
    }

    /// [`filter_mask`](Self::filter_mask) reporting `(chunks done, chunk total, worker)`
    pub fn filter_mask_with_progress<S, P>(
        &self,
        rows: &[Row],
        text_columns: &[S],
        chunk_size: usize,
        workers: WorkerCount,
        progress_reporter: Option<P>,
    ) -> Result<RetentionMask>
    where
        S: AsRef<str> + Sync,
        P: Fn(usize, usize, usize) + Sync,
    {
        if chunk_size == 0 {
            bail!("Chunk size must be at least 1");
        }

        let strategy = ExecutionStrategy::for_chunks(rows.len(), chunk_size, workers);
        let chunks: Vec<&[Row]> = match strategy {
            ExecutionStrategy::Sequential => vec![rows],
            ExecutionStrategy::Parallel { .. } => rows.chunks(chunk_size).collect(),
        };

        tracing::debug!(
            "Filtering {} rows over {} columns: {} chunk(s), {} worker(s)",
            rows.len(),
            text_columns.len(),
            chunks.len(),
            strategy.workers()
        );

        let flags = strategy.execute(
            chunks,
            |chunk| Ok(self.evaluate_chunk(chunk, text_columns)),
            progress_reporter,
        )?;

        let mask: RetentionMask = flags.into_iter().flatten().collect();
        ensure!(
            mask.len() == rows.len(),
            "Retention mask has {} entries for {} rows",
            mask.len(),
            rows.len()
        );

        tracing::debug!("Retained {}/{} rows", mask.retained_count(), rows.len());
        Ok(mask)
    }

    fn evaluate_chunk<S: AsRef<str>>(&self, chunk: &[Row], text_columns: &[S]) -> Vec<bool> {
        chunk
            .iter()
            .map(|row| self.row_matches(row, text_columns))
            .collect()
    }

    /// Logical OR of `contains_any` over the configured columns
    pub fn row_matches<S: AsRef<str>>(&self, row: &Row, text_columns: &[S]) -> bool {
        text_columns
            .iter()
            .any(|column| self.automaton.contains_any(row.text(column.as_ref()).as_deref()))
    }

    /// Union of keywords found in any of `text_columns`.
    ///
    /// Meant for rows already known to be retained.
    pub fn matched_keywords_for<S: AsRef<str>>(
        &self,
        row: &Row,
        text_columns: &[S],
    ) -> BTreeSet<String> {
        let mut matches = BTreeSet::new();
        for column in text_columns {
            matches.extend(self.automaton.find_all(row.text(column.as_ref()).as_deref()));
        }
        matches
    }

    /// Retained rows in input order, each with its matched keywords
    pub fn retained<'a, S: AsRef<str>>(
        &self,
        rows: &'a [Row],
        mask: &RetentionMask,
        text_columns: &[S],
    ) -> Result<Vec<RetainedRow<'a>>> {
        ensure!(
            mask.len() == rows.len(),
            "Retention mask has {} entries for {} rows",
            mask.len(),
            rows.len()
        );

        Ok(mask
            .retained_indices()
            .map(|index| {
                let row = &rows[index];
                RetainedRow {
                    row,
                    keywords: self.matched_keywords_for(row, text_columns),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(keywords: &[&str]) -> RowFilterEngine {
        RowFilterEngine::new(Arc::new(PatternAutomaton::build(keywords, false).unwrap()))
    }

    #[test]
    fn test_basic_mask_with_null() {
        let rows = vec![
            Row::from_texts(0, [("text", Some("alpha here"))]),
            Row::from_texts(1, [("text", Some("no match"))]),
            Row::from_texts(2, [("text", None)]),
        ];
        let mask = engine(&["alpha"])
            .filter_mask(&rows, &["text"], 100, WorkerCount::Fixed(1))
            .unwrap();
        assert_eq!(mask.as_slice(), &[true, false, false]);
    }

    #[test]
    fn test_any_column_retains_row() {
        let rows = vec![
            Row::from_texts(0, [("title", Some("nothing")), ("body", Some("Beta inside"))]),
            Row::from_texts(1, [("title", Some("nothing")), ("body", Some("nothing"))]),
        ];
        let mask = engine(&["beta"])
            .filter_mask(&rows, &["title", "body"], 10, WorkerCount::Fixed(1))
            .unwrap();
        assert_eq!(mask.as_slice(), &[true, false]);
    }

    #[test]
    fn test_missing_column_is_not_an_error() {
        let rows = vec![Row::from_texts(0, [("other", Some("alpha"))])];
        let mask = engine(&["alpha"])
            .filter_mask(&rows, &["text"], 10, WorkerCount::All)
            .unwrap();
        assert_eq!(mask.as_slice(), &[false]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows: Vec<Row> = (0..5)
            .map(|i| {
                let text = if i == 1 || i == 4 { "has alpha" } else { "plain" };
                Row::from_texts(i, [("text", Some(text))])
            })
            .collect();
        let engine = engine(&["alpha"]);
        let parallel = engine
            .filter_mask(&rows, &["text"], 2, WorkerCount::Fixed(4))
            .unwrap();
        let sequential = engine
            .filter_mask(&rows, &["text"], 100, WorkerCount::Fixed(1))
            .unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.as_slice(), &[false, true, false, false, true]);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let rows = vec![Row::from_texts(0, [("text", Some("alpha"))])];
        assert!(engine(&["alpha"]).filter_mask(&rows, &["text"], 0, WorkerCount::All).is_err());
    }

    #[test]
    fn test_empty_rows() {
        let mask = engine(&["alpha"])
            .filter_mask(&[], &["text"], 10, WorkerCount::All)
            .unwrap();
        assert!(mask.is_empty());
    }

    #[test]
    fn test_matched_keywords_union_across_columns() {
        let row = Row::from_texts(0, [("title", Some("ALPHA")), ("body", Some("beta and alpha"))]);
        let keywords = engine(&["alpha", "beta", "gamma"]).matched_keywords_for(&row, &["title", "body"]);
        assert_eq!(keywords.into_iter().collect::<Vec<_>>(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_retained_skips_rejected_rows() {
        let rows = vec![
            Row::from_texts(0, [("text", Some("gamma"))]),
            Row::from_texts(1, [("text", Some("nothing"))]),
        ];
        let engine = engine(&["gamma"]);
        let mask = engine.filter_mask(&rows, &["text"], 10, WorkerCount::Fixed(1)).unwrap();
        let retained = engine.retained(&rows, &mask, &["text"]).unwrap();
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].row.index(), 0);
        assert!(retained[0].keywords.contains("gamma"));
    }
}
