//! Value shapes carried inside parameter records and responses.

use serde::{Deserialize, Serialize};

/// Rectangular block of cell values, row- or column-major depending on the
/// operation that carries it.
pub type Table = Vec<Vec<String>>;

/// A `[column, row]` cell position.
///
/// Indices are passed through untouched; whether they are 0- or 1-based is
/// up to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Coordinate {
    pub column: u32,
    pub row: u32,
}

impl Coordinate {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

impl From<(u32, u32)> for Coordinate {
    fn from((column, row): (u32, u32)) -> Self {
        Self { column, row }
    }
}

impl From<Coordinate> for (u32, u32) {
    fn from(c: Coordinate) -> Self {
        (c.column, c.row)
    }
}

impl From<[u32; 2]> for Coordinate {
    fn from([column, row]: [u32; 2]) -> Self {
        Self { column, row }
    }
}

/// Extent of a sheet's populated area, serialized as `[highestColumn, highestRow]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct SheetRange {
    pub highest_column: u32,
    pub highest_row: u32,
}

impl From<(u32, u32)> for SheetRange {
    fn from((highest_column, highest_row): (u32, u32)) -> Self {
        Self {
            highest_column,
            highest_row,
        }
    }
}

impl From<SheetRange> for (u32, u32) {
    fn from(r: SheetRange) -> Self {
        (r.highest_column, r.highest_row)
    }
}

/// Half-open `[start, end)` run of row or column indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

impl From<(u32, u32)> for Span {
    fn from((start, end): (u32, u32)) -> Self {
        Self { start, end }
    }
}

impl From<Span> for (u32, u32) {
    fn from(s: Span) -> Self {
        (s.start, s.end)
    }
}

/// Parse a column label like `"C"` or `"AB"` into its 1-based index.
///
/// Returns `None` for empty input, non-letters, or labels past `u32::MAX`.
pub fn column_index(label: &str) -> Option<u32> {
    if label.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for ch in label.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    Some(col)
}

/// Render a 1-based column index as its letter label. Index 0 has no label.
pub fn column_label(index: u32) -> Option<String> {
    if index == 0 {
        return None;
    }
    let mut n = index;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    Some(letters.iter().rev().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn coordinate_is_a_pair_on_the_wire() {
        let c = Coordinate::new(2, 5);
        assert_eq!(serde_json::to_value(c).unwrap(), json!([2, 5]));
        let back: Coordinate = serde_json::from_value(json!([0, 0])).unwrap();
        assert_eq!(back, Coordinate::new(0, 0));
    }

    #[test]
    fn sheet_range_is_column_then_row() {
        let r: SheetRange = serde_json::from_value(json!([4, 10])).unwrap();
        assert_eq!(r.highest_column, 4);
        assert_eq!(r.highest_row, 10);
    }

    #[test]
    fn column_labels() {
        assert_eq!(column_index("A"), Some(1));
        assert_eq!(column_index("c"), Some(3));
        assert_eq!(column_index("Z"), Some(26));
        assert_eq!(column_index("AA"), Some(27));
        assert_eq!(column_index("XFD"), Some(16384));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);

        assert_eq!(column_label(1).as_deref(), Some("A"));
        assert_eq!(column_label(28).as_deref(), Some("AB"));
        assert_eq!(column_label(16384).as_deref(), Some("XFD"));
        assert_eq!(column_label(0), None);
    }
}
