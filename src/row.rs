//! Worksheet rows
//!
//! Rows arrive as a JSON export of a worksheet: an array of rows, each an
//! array of cells. Rows carry no identity beyond their position in the input.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SchemaError};

/// One record's ordered cell values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for Row {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

/// Anything the validator can read cells from.
///
/// `index` is the row's position in the input and is used only for fault
/// messages.
pub trait RowSource {
    fn cells(&self, index: usize) -> Result<Cow<'_, [String]>>;
}

impl RowSource for Row {
    fn cells(&self, _index: usize) -> Result<Cow<'_, [String]>> {
        Ok(Cow::Borrowed(&self.0))
    }
}

impl RowSource for Vec<String> {
    fn cells(&self, _index: usize) -> Result<Cow<'_, [String]>> {
        Ok(Cow::Borrowed(self.as_slice()))
    }
}

/// Raw JSON rows. Scalars are read as their text, `null` as an empty cell;
/// a row that is not an array, or holds a nested array or object, faults.
impl RowSource for Value {
    fn cells(&self, index: usize) -> Result<Cow<'_, [String]>> {
        let Value::Array(items) = self else {
            return Err(SchemaError::RowFault {
                row: index,
                reason: format!("expected an array of cells, got {}", kind_of(self)),
            });
        };

        items
            .iter()
            .enumerate()
            .map(|(column, cell)| match cell {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                Value::Bool(b) => Ok(b.to_string()),
                Value::Null => Ok(String::new()),
                other => Err(SchemaError::RowFault {
                    row: index,
                    reason: format!("cell {} is {}, not a scalar", column, kind_of(other)),
                }),
            })
            .collect::<Result<Vec<_>>>()
            .map(Cow::Owned)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse a worksheet export. Only the top level must be an array; individual
/// rows are checked when they are validated.
pub fn from_json_str(content: &str) -> Result<Vec<Value>> {
    match serde_json::from_str(content)? {
        Value::Array(rows) => Ok(rows),
        other => Err(SchemaError::InvalidRows(format!(
            "expected an array of rows, got {}",
            kind_of(&other)
        ))),
    }
}

/// Read a worksheet export from disk
pub fn load_rows(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let rows = from_json_str(&content)?;
    debug!(path = %path.display(), rows = rows.len(), "loaded worksheet rows");
    Ok(rows)
}
