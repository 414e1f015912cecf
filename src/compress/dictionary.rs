use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Token → score table as stored on disk (a flat JSON object)
pub type FrequencyTable = HashMap<String, f64>;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Failed to read frequency table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Frequency table {} is not a JSON object of token scores: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Token {token:?} has invalid score {score}; scores must be finite and non-negative")]
    InvalidScore { token: String, score: f64 },
}

/// Immutable token importance scores
///
/// Built once from an ordered list of tables; a later table wins on key
/// collision. Tokens never seen in any table score `0.0`.
#[derive(Debug, Clone, Default)]
pub struct FrequencyDictionary {
    scores: HashMap<String, f64>,
}

impl FrequencyDictionary {
    pub fn load<I>(sources: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = FrequencyTable>,
    {
        let mut scores = HashMap::new();
        for table in sources {
            for (token, score) in table {
                if !score.is_finite() || score < 0.0 {
                    return Err(DictionaryError::InvalidScore { token, score });
                }
                scores.insert(token, score);
            }
        }
        Ok(Self { scores })
    }

    /// Load JSON tables in the given order
    pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, DictionaryError> {
        let tables = paths
            .iter()
            .map(|path| read_table(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let dictionary = Self::load(tables)?;
        tracing::info!(
            "Loaded frequency dictionary: {} tables, {} tokens",
            paths.len(),
            dictionary.len()
        );
        Ok(dictionary)
    }

    pub fn lookup(&self, token: &str) -> f64 {
        self.scores.get(token).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

pub fn read_table(path: &Path) -> Result<FrequencyTable, DictionaryError> {
    let content = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DictionaryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Every `*.json` file directly inside `dir`, sorted by file name
pub fn table_files_in(dir: &Path) -> Result<Vec<PathBuf>, DictionaryError> {
    let entries = std::fs::read_dir(dir).map_err(|source| DictionaryError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DictionaryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table(entries: &[(&str, f64)]) -> FrequencyTable {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_later_table_wins() {
        let dict = FrequencyDictionary::load([
            table(&[("a", 1.0), ("b", 2.0)]),
            table(&[("b", 5.0), ("c", 3.0)]),
        ])
        .unwrap();
        assert_eq!(dict.lookup("a"), 1.0);
        assert_eq!(dict.lookup("b"), 5.0);
        assert_eq!(dict.lookup("c"), 3.0);
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn test_unknown_token_scores_zero() {
        let dict = FrequencyDictionary::default();
        assert_eq!(dict.lookup("never-seen"), 0.0);
    }

    #[test]
    fn test_negative_score_rejected() {
        let err = FrequencyDictionary::load([table(&[("bad", -1.0)])]).unwrap_err();
        assert!(matches!(err, DictionaryError::InvalidScore { .. }));
    }

    #[test]
    fn test_load_files_and_directory_order() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{"x": 2, "y": 7}"#).unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"x": 1}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = table_files_in(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.json"));

        let dict = FrequencyDictionary::load_files(&files).unwrap();
        assert_eq!(dict.lookup("x"), 2.0);
        assert_eq!(dict.lookup("y"), 7.0);
    }

    #[test]
    fn test_malformed_table_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let err = FrequencyDictionary::load_files(&[&path]).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
