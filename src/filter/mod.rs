//! Row filtering
//!
//! Rows are read-only inputs. Filtering produces a [`RetentionMask`] aligned
//! with the input and, for retained rows only, the set of matched keywords.

pub mod engine;
pub mod row;

pub use engine::{RetainedRow, RowFilterEngine};
pub use row::{RetentionMask, Row, RowReader, RowWriter};
