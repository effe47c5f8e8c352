//! In-memory workbook store backing every protocol command.
//!
//! Workbooks are keyed by the path they were created for or read from. Cell,
//! row and column indices are 1-based; index 0 is out of range.

use std::collections::BTreeMap;
use std::path::Path;

use sheet_relay_protocol::{column_index, Coordinate, SheetRange, Span, Table};
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::error::{EngineError, Result};

/// Every workbook currently open, by path.
#[derive(Default)]
pub struct Engine {
    books: BTreeMap<String, Spreadsheet>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    fn book_mut(&mut self, path: &str) -> Result<&mut Spreadsheet> {
        self.books
            .get_mut(path)
            .ok_or_else(|| EngineError::NotOpen(path.to_string()))
    }

    fn sheet(&self, path: &str, sheet_name: &str) -> Result<&Worksheet> {
        self.books
            .get(path)
            .ok_or_else(|| EngineError::NotOpen(path.to_string()))?
            .get_sheet_by_name(sheet_name)
            .ok_or_else(|| EngineError::SheetNotFound {
                path: path.to_string(),
                sheet: sheet_name.to_string(),
            })
    }

    fn sheet_mut(&mut self, path: &str, sheet_name: &str) -> Result<&mut Worksheet> {
        self.book_mut(path)?
            .get_sheet_by_name_mut(sheet_name)
            .ok_or_else(|| EngineError::SheetNotFound {
                path: path.to_string(),
                sheet: sheet_name.to_string(),
            })
    }

    // -- Files --

    pub fn new_xlsx(&mut self, path: &str) -> Result<String> {
        if self.books.contains_key(path) {
            return Err(EngineError::AlreadyOpen(path.to_string()));
        }
        self.books
            .insert(path.to_string(), umya_spreadsheet::new_file());
        tracing::info!("Created workbook {path}");
        Ok(format!("created {path}"))
    }

    /// Load `path` from disk. Reading a path that is already open is a no-op.
    pub fn read_xlsx(&mut self, path: &str) -> Result<String> {
        if self.books.contains_key(path) {
            tracing::debug!("{path} already open");
            return Ok(path.to_string());
        }
        let book = umya_spreadsheet::reader::xlsx::read(Path::new(path)).map_err(|e| {
            EngineError::ReadFailed {
                path: path.to_string(),
                reason: e.to_string(),
            }
        })?;
        self.books.insert(path.to_string(), book);
        tracing::info!("Read workbook {path}");
        Ok(path.to_string())
    }

    pub fn write_xlsx(&mut self, path: &str) -> Result<()> {
        let book = self.book_mut(path)?;
        umya_spreadsheet::writer::xlsx::write(book, Path::new(path)).map_err(|e| {
            EngineError::WriteFailed {
                path: path.to_string(),
                reason: e.to_string(),
            }
        })?;
        tracing::info!("Saved workbook {path}");
        Ok(())
    }

    /// Forget `path`. Closing a path that is not open succeeds.
    pub fn close_xlsx(&mut self, path: &str) {
        if self.books.remove(path).is_some() {
            tracing::info!("Closed workbook {path}");
        }
    }

    pub fn close_all_xlsx(&mut self) {
        tracing::info!("Closing {} workbook(s)", self.books.len());
        self.books.clear();
    }

    /// Open paths, in sorted order.
    pub fn list_xlsx(&self) -> Vec<String> {
        self.books.keys().cloned().collect()
    }

    // -- Sheets --

    pub fn new_sheet(&mut self, path: &str, sheet_name: &str) -> Result<String> {
        self.book_mut(path)?
            .new_sheet(sheet_name)
            .map_err(|reason| EngineError::SheetRejected {
                sheet: sheet_name.to_string(),
                reason: reason.to_string(),
            })?;
        tracing::debug!("Created sheet {sheet_name} in {path}");
        Ok(sheet_name.to_string())
    }

    pub fn copy_sheet(&mut self, path: &str, source: &str, target: &str) -> Result<()> {
        let mut copy = self.sheet(path, source)?.clone();
        copy.set_name(target);
        self.book_mut(path)?
            .add_sheet(copy)
            .map_err(|reason| EngineError::SheetRejected {
                sheet: target.to_string(),
                reason: reason.to_string(),
            })?;
        tracing::debug!("Copied sheet {source} to {target} in {path}");
        Ok(())
    }

    pub fn highest_row(&self, path: &str, sheet_name: &str) -> Result<u32> {
        Ok(self.sheet(path, sheet_name)?.get_highest_row())
    }

    pub fn highest_column(&self, path: &str, sheet_name: &str) -> Result<u32> {
        Ok(self.sheet(path, sheet_name)?.get_highest_column())
    }

    pub fn highest_column_and_row(&self, path: &str, sheet_name: &str) -> Result<SheetRange> {
        Ok(self.sheet(path, sheet_name)?.get_highest_column_and_row().into())
    }

    // -- Cells --

    pub fn get_value(&self, path: &str, sheet_name: &str, local: Coordinate) -> Result<String> {
        check_coordinate(local)?;
        Ok(self
            .sheet(path, sheet_name)?
            .get_value((local.column, local.row)))
    }

    pub fn set_value(
        &mut self,
        path: &str,
        sheet_name: &str,
        local: Coordinate,
        value: &str,
    ) -> Result<()> {
        check_coordinate(local)?;
        self.sheet_mut(path, sheet_name)?
            .get_cell_mut((local.column, local.row))
            .set_value(value);
        Ok(())
    }

    /// Rows `range.start..range.end`, each padded to the sheet's highest column.
    ///
    /// The range stops at the highest populated row.
    pub fn rows(&self, path: &str, sheet_name: &str, range: Span) -> Result<Table> {
        check_span("row", range)?;
        let sheet = self.sheet(path, sheet_name)?;
        let width = sheet.get_highest_column();
        let end = clamp_end(range, sheet.get_highest_row());
        Ok((range.start..end)
            .map(|row| {
                (1..=width)
                    .map(|col| sheet.get_value((col, row)))
                    .collect::<Vec<String>>()
            })
            .collect())
    }

    /// Columns `range.start..range.end`, each padded to the sheet's highest row.
    ///
    /// The range stops at the highest populated column.
    pub fn columns(&self, path: &str, sheet_name: &str, range: Span) -> Result<Table> {
        check_span("column", range)?;
        let sheet = self.sheet(path, sheet_name)?;
        let height = sheet.get_highest_row();
        let end = clamp_end(range, sheet.get_highest_column());
        Ok((range.start..end)
            .map(|col| {
                (1..=height)
                    .map(|row| sheet.get_value((col, row)))
                    .collect::<Vec<String>>()
            })
            .collect())
    }

    // -- Rows --

    pub fn append_row(&mut self, path: &str, sheet_name: &str, data: &Table) -> Result<()> {
        check_rectangular(data)?;
        let sheet = self.sheet_mut(path, sheet_name)?;
        let first = sheet.get_highest_row() + 1;
        write_rows(sheet, first, data);
        Ok(())
    }

    pub fn insert_row(
        &mut self,
        path: &str,
        sheet_name: &str,
        row_index: u32,
        data: &Table,
        is_add: bool,
    ) -> Result<()> {
        check_index("row", row_index)?;
        check_rectangular(data)?;
        let sheet = self.sheet_mut(path, sheet_name)?;
        if is_add {
            let num_rows = table_len(data)?;
            sheet.insert_new_row(&row_index, &num_rows);
            tracing::debug!("Inserted {num_rows} row(s) at {row_index}");
        }
        write_rows(sheet, row_index, data);
        Ok(())
    }

    pub fn insert_new_row(
        &mut self,
        path: &str,
        sheet_name: &str,
        row_index: u32,
        num_rows: u32,
    ) -> Result<()> {
        check_index("row", row_index)?;
        self.sheet_mut(path, sheet_name)?
            .insert_new_row(&row_index, &num_rows);
        Ok(())
    }

    /// Remove up to `num_rows` rows starting at `row_index`.
    ///
    /// The count is clamped to the rows that exist; a start past the highest
    /// row is rejected.
    pub fn remove_row(
        &mut self,
        path: &str,
        sheet_name: &str,
        row_index: u32,
        num_rows: u32,
    ) -> Result<()> {
        check_index("row", row_index)?;
        if num_rows < 1 {
            return Err(EngineError::InvalidArgument(
                "numRows must be at least 1".into(),
            ));
        }
        let sheet = self.sheet_mut(path, sheet_name)?;
        let highest_row = sheet.get_highest_row();
        if row_index > highest_row {
            return Err(EngineError::OutOfRange(format!(
                "row {row_index} is past the highest row {highest_row}"
            )));
        }
        let num_rows = num_rows.min(highest_row - row_index + 1);
        sheet.remove_row(&row_index, &num_rows);
        tracing::debug!("Removed {num_rows} row(s) at {row_index}");
        Ok(())
    }

    // -- Columns --

    pub fn append_column(&mut self, path: &str, sheet_name: &str, data: &Table) -> Result<()> {
        check_rectangular(data)?;
        let sheet = self.sheet_mut(path, sheet_name)?;
        let first = sheet.get_highest_column() + 1;
        write_columns(sheet, first, data);
        Ok(())
    }

    pub fn insert_column(
        &mut self,
        path: &str,
        sheet_name: &str,
        column_index: u32,
        data: &Table,
        is_add: bool,
    ) -> Result<()> {
        check_index("column", column_index)?;
        check_rectangular(data)?;
        let sheet = self.sheet_mut(path, sheet_name)?;
        if is_add {
            let num_columns = table_len(data)?;
            sheet.insert_new_column_by_index(&column_index, &num_columns);
            tracing::debug!("Inserted {num_columns} column(s) at {column_index}");
        }
        write_columns(sheet, column_index, data);
        Ok(())
    }

    pub fn insert_new_column(
        &mut self,
        path: &str,
        sheet_name: &str,
        column: &str,
        num_columns: u32,
    ) -> Result<()> {
        check_label(column)?;
        self.sheet_mut(path, sheet_name)?
            .insert_new_column(column, &num_columns);
        Ok(())
    }

    pub fn insert_new_column_by_index(
        &mut self,
        path: &str,
        sheet_name: &str,
        column_index: u32,
        num_columns: u32,
    ) -> Result<()> {
        check_index("column", column_index)?;
        self.sheet_mut(path, sheet_name)?
            .insert_new_column_by_index(&column_index, &num_columns);
        Ok(())
    }

    pub fn remove_column(
        &mut self,
        path: &str,
        sheet_name: &str,
        column: &str,
        num_columns: u32,
    ) -> Result<()> {
        check_label(column)?;
        self.sheet_mut(path, sheet_name)?
            .remove_column(column, &num_columns);
        Ok(())
    }

    pub fn remove_column_by_index(
        &mut self,
        path: &str,
        sheet_name: &str,
        column_index: u32,
        num_columns: u32,
    ) -> Result<()> {
        check_index("column", column_index)?;
        self.sheet_mut(path, sheet_name)?
            .remove_column_by_index(&column_index, &num_columns);
        Ok(())
    }
}

fn check_index(kind: &str, index: u32) -> Result<()> {
    if index < 1 {
        return Err(EngineError::OutOfRange(format!(
            "{kind} indices start at 1, got {index}"
        )));
    }
    Ok(())
}

fn check_coordinate(local: Coordinate) -> Result<()> {
    check_index("column", local.column)?;
    check_index("row", local.row)
}

fn check_span(kind: &str, range: Span) -> Result<()> {
    if range.start < range.end {
        check_index(kind, range.start)?;
    }
    Ok(())
}

fn clamp_end(range: Span, highest: u32) -> u32 {
    range.end.min(highest.saturating_add(1))
}

fn check_label(column: &str) -> Result<()> {
    if column_index(column).is_none() {
        return Err(EngineError::InvalidArgument(format!(
            "\"{column}\" is not a column label"
        )));
    }
    Ok(())
}

fn check_rectangular(data: &Table) -> Result<()> {
    let Some(expected) = data.first().map(Vec::len) else {
        return Ok(());
    };
    for (index, entry) in data.iter().enumerate() {
        if entry.len() != expected {
            return Err(EngineError::RaggedPayload {
                index,
                len: entry.len(),
                expected,
            });
        }
    }
    Ok(())
}

fn table_len(data: &Table) -> Result<u32> {
    u32::try_from(data.len())
        .map_err(|_| EngineError::InvalidArgument(format!("{} entries is too many", data.len())))
}

/// Write `data` row by row, starting at `first_row`, column 1.
fn write_rows(sheet: &mut Worksheet, first_row: u32, data: &Table) {
    for (row, values) in (first_row..).zip(data) {
        for (col, value) in (1u32..).zip(values) {
            sheet.get_cell_mut((col, row)).set_value(value.as_str());
        }
    }
}

/// Write `data` column by column, starting at `first_column`, row 1.
fn write_columns(sheet: &mut Worksheet, first_column: u32, data: &Table) {
    for (col, values) in (first_column..).zip(data) {
        for (row, value) in (1u32..).zip(values) {
            sheet.get_cell_mut((col, row)).set_value(value.as_str());
        }
    }
}
