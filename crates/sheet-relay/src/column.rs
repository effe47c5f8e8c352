//! Column arguments that may be given by index or by letter label.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use sheet_relay_protocol::column_index;

use crate::error::SheetsError;

/// A column addressed either by numeric index or by letter label (`"C"`).
///
/// The variant picks which remote operation is used; the value itself is
/// passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnRef {
    Index(u32),
    Label(String),
}

impl ColumnRef {
    pub fn index(index: u32) -> Self {
        ColumnRef::Index(index)
    }

    pub fn label(label: impl Into<String>) -> Self {
        ColumnRef::Label(label.into())
    }

    /// Numeric index of this column; `None` for a label that is not valid.
    pub fn to_index(&self) -> Option<u32> {
        match self {
            ColumnRef::Index(i) => Some(*i),
            ColumnRef::Label(l) => column_index(l),
        }
    }
}

impl From<u32> for ColumnRef {
    fn from(index: u32) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(label: &str) -> Self {
        ColumnRef::Label(label.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(label: String) -> Self {
        ColumnRef::Label(label)
    }
}

/// Dynamically-typed input: numbers become indices, strings become labels,
/// everything else is rejected.
impl TryFrom<Value> for ColumnRef {
    type Error = SheetsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(label) => Ok(ColumnRef::Label(label)),
            Value::Number(ref n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(ColumnRef::Index)
                .ok_or_else(|| {
                    SheetsError::InvalidColumnRef(format!("{n} is not a valid column index"))
                }),
            Value::Null => Err(SheetsError::InvalidColumnRef(
                "expected a number or a string, got null".into(),
            )),
            Value::Bool(b) => Err(SheetsError::InvalidColumnRef(format!(
                "expected a number or a string, got boolean {b}"
            ))),
            Value::Array(_) => Err(SheetsError::InvalidColumnRef(
                "expected a number or a string, got an array".into(),
            )),
            Value::Object(_) => Err(SheetsError::InvalidColumnRef(
                "expected a number or a string, got an object".into(),
            )),
        }
    }
}

/// Parses text input: all digits is an index, all letters is a label.
impl FromStr for ColumnRef {
    type Err = SheetsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<u32>()
                .map(ColumnRef::Index)
                .map_err(|e| SheetsError::InvalidColumnRef(format!("{s}: {e}")));
        }
        if column_index(s).is_some() {
            return Ok(ColumnRef::Label(s.to_ascii_uppercase()));
        }
        Err(SheetsError::InvalidColumnRef(format!(
            "`{s}` is neither a column index nor a column label"
        )))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "{i}"),
            ColumnRef::Label(l) => write!(f, "{l}"),
        }
    }
}
