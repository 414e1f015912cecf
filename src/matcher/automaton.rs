//! Aho-Corasick automaton over Unicode scalar values
//!
//! The trie stores one node per distinct keyword prefix. Failure links are
//! resolved breadth-first so every node's link points at a shallower node, and
//! each node's output list already contains the outputs of its whole failure
//! chain. A scan therefore touches every input character once and reports all
//! keywords ending at that character without walking the chain again.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::keywords::{CaseMode, KeywordError, KeywordSet};

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct Node {
    goto: BTreeMap<char, usize>,
    fail: usize,
    /// Keyword ids ending here, including those inherited along the failure chain
    outputs: Vec<usize>,
}

/// Read-only multi-pattern matcher built once from a [`KeywordSet`]
///
/// The automaton holds no interior mutability, so a single instance can be
/// shared by reference (or `Arc`) across any number of scanning threads.
#[derive(Debug, Clone)]
pub struct PatternAutomaton {
    keywords: KeywordSet,
    nodes: Vec<Node>,
}

impl PatternAutomaton {
    /// Fold, de-duplicate and compile `keywords`.
    ///
    /// Fails fast with [`KeywordError::Empty`] if any keyword is the empty
    /// string. An empty keyword list is accepted and matches nothing.
    pub fn build<I, S>(keywords: I, case_sensitive: bool) -> Result<Self, KeywordError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = KeywordSet::new(keywords, case_sensitive)?;
        Ok(Self::from_keyword_set(keywords))
    }

    pub fn from_keyword_set(keywords: KeywordSet) -> Self {
        let mut nodes = vec![Node::default()];

        for (id, keyword) in keywords.iter().enumerate() {
            let mut state = ROOT;
            for ch in keyword.chars() {
                state = match nodes[state].goto.get(&ch) {
                    Some(&next) => next,
                    None => {
                        nodes.push(Node::default());
                        let next = nodes.len() - 1;
                        nodes[state].goto.insert(ch, next);
                        next
                    }
                };
            }
            nodes[state].outputs.push(id);
        }

        Self::link_failures(&mut nodes);

        tracing::debug!(
            "Built pattern automaton: {} keywords, {} states, case {}",
            keywords.len(),
            nodes.len(),
            if keywords.case_mode().is_sensitive() { "sensitive" } else { "insensitive" }
        );

        Self { keywords, nodes }
    }

    /// Breadth-first failure link construction with output merging
    fn link_failures(nodes: &mut [Node]) {
        let mut queue = VecDeque::new();

        let depth_one: Vec<usize> = nodes[ROOT].goto.values().copied().collect();
        for child in depth_one {
            nodes[child].fail = ROOT;
            queue.push_back(child);
        }

        while let Some(state) = queue.pop_front() {
            let children: Vec<(char, usize)> =
                nodes[state].goto.iter().map(|(&ch, &next)| (ch, next)).collect();

            for (ch, child) in children {
                let mut fallback = nodes[state].fail;
                let target = loop {
                    if let Some(&next) = nodes[fallback].goto.get(&ch) {
                        break next;
                    }
                    if fallback == ROOT {
                        break ROOT;
                    }
                    fallback = nodes[fallback].fail;
                };

                nodes[child].fail = target;
                let inherited = nodes[target].outputs.clone();
                nodes[child].outputs.extend(inherited);
                queue.push_back(child);
            }
        }
    }

    #[inline]
    fn step(&self, mut state: usize, ch: char) -> usize {
        loop {
            if let Some(&next) = self.nodes[state].goto.get(&ch) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.nodes[state].fail;
        }
    }

    /// True as soon as any keyword occurs in `text`; absent text is `false`.
    ///
    /// Accepts `&str` or `Option<&str>`.
    pub fn contains_any<'a>(&self, text: impl Into<Option<&'a str>>) -> bool {
        let Some(text) = text.into() else {
            return false;
        };
        if self.keywords.is_empty() {
            return false;
        }

        let folded = self.keywords.case_mode().fold(text);
        let mut state = ROOT;
        for ch in folded.chars() {
            state = self.step(state, ch);
            if !self.nodes[state].outputs.is_empty() {
                return true;
            }
        }
        false
    }

    /// Distinct keywords (in folded form) occurring anywhere in `text`.
    /// Absent text yields an empty set.
    pub fn find_all<'a>(&self, text: impl Into<Option<&'a str>>) -> BTreeSet<String> {
        let Some(text) = text.into() else {
            return BTreeSet::new();
        };
        if self.keywords.is_empty() {
            return BTreeSet::new();
        }

        let folded = self.keywords.case_mode().fold(text);
        let mut seen = vec![false; self.keywords.len()];
        let mut state = ROOT;
        for ch in folded.chars() {
            state = self.step(state, ch);
            for &id in &self.nodes[state].outputs {
                seen[id] = true;
            }
        }

        seen.iter()
            .enumerate()
            .filter(|&(_, hit)| *hit)
            .filter_map(|(id, _)| self.keywords.get(id))
            .map(str::to_string)
            .collect()
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn case_mode(&self) -> CaseMode {
        self.keywords.case_mode()
    }

    /// Number of trie states, root included
    pub fn state_count(&self) -> usize {
        self.nodes.len()
    }
}
