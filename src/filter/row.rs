use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// One input record: a stable position plus named, optionally-null fields.
///
/// Text access goes through [`Row::text`], which defines the schema rules
/// for the whole crate: a missing column and a `null` value both read as
/// absent text, strings read as-is and any other JSON value reads as its
/// JSON encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    index: usize,
    fields: Map<String, Value>,
}

impl Row {
    pub fn new(index: usize, fields: Map<String, Value>) -> Self {
        Self { index, fields }
    }

    /// Build a row of text columns, `None` standing for a null value
    pub fn from_texts<'a, I>(index: usize, columns: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let fields = columns
            .into_iter()
            .map(|(name, value)| {
                let value = value.map_or(Value::Null, |text| Value::String(text.to_string()));
                (name.to_string(), value)
            })
            .collect();
        Self { index, fields }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn text(&self, column: &str) -> Option<Cow<'_, str>> {
        match self.fields.get(column)? {
            Value::Null => None,
            Value::String(text) => Some(Cow::Borrowed(text.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Copy of this row with `column` set to `value`
    pub fn with_field(&self, column: &str, value: Value) -> Row {
        let mut fields = self.fields.clone();
        fields.insert(column.to_string(), value);
        Row {
            index: self.index,
            fields,
        }
    }
}

/// Ordered retention flags, one per input row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionMask(Vec<bool>);

impl RetentionMask {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn retained_count(&self) -> usize {
        self.0.iter().filter(|&&keep| keep).count()
    }

    /// Positions of retained rows in ascending order
    pub fn retained_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(index, &keep)| keep.then_some(index))
    }
}

impl From<Vec<bool>> for RetentionMask {
    fn from(flags: Vec<bool>) -> Self {
        Self(flags)
    }
}

impl FromIterator<bool> for RetentionMask {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// JSON Lines row source
pub struct RowReader;

impl RowReader {
    pub fn read_path(path: &Path) -> Result<Vec<Row>> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Self::read(BufReader::new(file))
            .with_context(|| format!("Failed to read rows from {}", path.display()))
    }

    /// One JSON object per non-blank line
    pub fn read<R: BufRead>(reader: R) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(&line)
                .with_context(|| format!("Line {}: invalid JSON", line_no + 1))?;
            let Value::Object(fields) = value else {
                bail!("Line {}: expected a JSON object", line_no + 1);
            };
            rows.push(Row::new(rows.len(), fields));
        }
        Ok(rows)
    }
}

/// JSON Lines row sink
pub struct RowWriter;

impl RowWriter {
    pub fn write<W: Write>(mut writer: W, rows: &[Row]) -> Result<()> {
        for row in rows {
            serde_json::to_writer(&mut writer, row.fields())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_path(path: &Path, rows: &[Row]) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Self::write(std::io::BufWriter::new(file), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_schema_rules() {
        let Value::Object(fields) = json!({"title": "hello", "body": null, "views": 42})
        else {
            unreachable!()
        };
        let row = Row::new(0, fields);
        assert_eq!(row.text("title").as_deref(), Some("hello"));
        assert_eq!(row.text("body"), None);
        assert_eq!(row.text("views").as_deref(), Some("42"));
        assert_eq!(row.text("missing"), None);
        assert!(row.has_column("body"));
        assert!(!row.has_column("missing"));
    }

    #[test]
    fn test_with_field_leaves_original_untouched() {
        let row = Row::from_texts(3, [("text", Some("abc"))]);
        let updated = row.with_field("text", json!("xyz"));
        assert_eq!(row.text("text").as_deref(), Some("abc"));
        assert_eq!(updated.text("text").as_deref(), Some("xyz"));
        assert_eq!(updated.index(), 3);
    }

    #[test]
    fn test_mask_helpers() {
        let mask = RetentionMask::from(vec![true, false, true, false]);
        assert_eq!(mask.len(), 4);
        assert_eq!(mask.retained_count(), 2);
        assert_eq!(mask.retained_indices().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(mask.get(1), Some(false));
        assert_eq!(mask.get(9), None);
    }

    #[test]
    fn test_reader_skips_blank_lines_and_indexes_rows() {
        let input = "{\"text\":\"a\"}\n\n{\"text\":null}\n";
        let rows = RowReader::read(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].index(), 1);
        assert_eq!(rows[1].text("text"), None);
    }

    #[test]
    fn test_reader_rejects_non_objects() {
        let err = RowReader::read("{\"a\":1}\n[1,2]\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_writer_round_trip() {
        let rows = vec![Row::from_texts(0, [("text", Some("x"))])];
        let mut buffer = Vec::new();
        RowWriter::write(&mut buffer, &rows).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "{\"text\":\"x\"}\n");
    }
}
