//! Spreadsheet handle: the per-file API forwarded to the backend.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use sheet_relay_protocol::{Command, Coordinate, SheetRange, Span, Table};

use crate::client::{decode, invoke};
use crate::column::ColumnRef;
use crate::error::Result;
use crate::transport::Transport;

/// A handle to a spreadsheet file held by the backend.
///
/// The handle stores only the file `path` and the target `sheet_name`; every
/// method is a single remote call with both merged into its parameters.
/// Both fields may be changed at any time. Pointing `sheet_name` at another
/// sheet simply redirects later calls; nothing is sent to the backend.
///
/// Handles are cheap to clone and several may refer to the same file.
/// Closing the file through one of them closes it for all.
#[derive(Clone)]
pub struct Spreadsheet {
    transport: Arc<dyn Transport>,
    /// File this handle targets.
    pub path: String,
    /// Sheet targeted by sheet-level operations.
    pub sheet_name: String,
}

impl fmt::Debug for Spreadsheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("path", &self.path)
            .field("sheet_name", &self.sheet_name)
            .finish_non_exhaustive()
    }
}

impl Spreadsheet {
    pub fn new(
        transport: Arc<dyn Transport>,
        path: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }

    /// Retarget later sheet-level calls at `sheet_name`.
    pub fn set_sheet_name(&mut self, sheet_name: impl Into<String>) {
        self.sheet_name = sheet_name.into();
    }

    async fn call(&self, command: Command) -> Result<()> {
        invoke(self.transport.as_ref(), command).await?;
        Ok(())
    }

    async fn query<T: DeserializeOwned>(&self, command: Command) -> Result<T> {
        let operation = command.operation();
        let data = invoke(self.transport.as_ref(), command).await?;
        decode(&operation, data)
    }

    fn path(&self) -> String {
        self.path.clone()
    }

    fn sheet(&self) -> String {
        self.sheet_name.clone()
    }

    // -- File lifecycle --

    /// Create a new, empty file at `path` on the backend.
    pub async fn create(&self) -> Result<()> {
        self.call(Command::NewXlsx { path: self.path() }).await
    }

    /// Load the existing file at `path` into the backend.
    pub async fn read(&self) -> Result<()> {
        self.call(Command::ReadXlsx { path: self.path() }).await
    }

    /// Persist the backend's copy of the file to `path`.
    pub async fn write(&self) -> Result<()> {
        self.call(Command::WriteXlsx { path: self.path() }).await
    }

    /// Release the file on the backend, for every handle that refers to it.
    pub async fn close(&self) -> Result<()> {
        self.call(Command::CloseXlsx { path: self.path() }).await
    }

    // -- Sheets --

    /// Add a sheet named `sheet_name` to the file.
    ///
    /// The handle keeps targeting its current sheet.
    pub async fn new_sheet(&self, sheet_name: impl Into<String>) -> Result<()> {
        self.call(Command::NewSheet {
            path: self.path(),
            sheet_name: sheet_name.into(),
        })
        .await
    }

    /// Duplicate `source_sheet_name` (the handle's sheet when `None`) as
    /// `target_sheet_name`.
    pub async fn copy_sheet(
        &self,
        target_sheet_name: impl Into<String>,
        source_sheet_name: Option<&str>,
    ) -> Result<()> {
        let source_sheet_name = source_sheet_name
            .map(str::to_string)
            .unwrap_or_else(|| self.sheet());
        self.call(Command::CopySheet {
            path: self.path(),
            source_sheet_name,
            target_sheet_name: target_sheet_name.into(),
        })
        .await
    }

    /// Highest populated row of the current sheet.
    pub async fn get_sheet_row(&self) -> Result<u32> {
        self.query(Command::GetSheetHighestRow {
            path: self.path(),
            sheet_name: self.sheet(),
        })
        .await
    }

    /// Highest populated column of the current sheet.
    pub async fn get_sheet_column(&self) -> Result<u32> {
        self.query(Command::GetSheetHighestColumn {
            path: self.path(),
            sheet_name: self.sheet(),
        })
        .await
    }

    pub async fn get_sheet_range(&self) -> Result<SheetRange> {
        self.query(Command::GetSheetHighestColumnAndRow {
            path: self.path(),
            sheet_name: self.sheet(),
        })
        .await
    }

    // -- Cells --

    pub async fn get_value(&self, local: impl Into<Coordinate>) -> Result<String> {
        self.query(Command::GetValueByColumnAndRow {
            path: self.path(),
            sheet_name: self.sheet(),
            local: local.into(),
        })
        .await
    }

    pub async fn set_value(
        &self,
        local: impl Into<Coordinate>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.call(Command::SetValueByColumnAndRow {
            path: self.path(),
            sheet_name: self.sheet(),
            local: local.into(),
            value: value.into(),
        })
        .await
    }

    /// Read rows `start..end` of the current sheet.
    pub async fn get_rows(&self, start: u32, end: u32) -> Result<Table> {
        self.query(Command::GetCollectionByRow {
            path: self.path(),
            sheet_name: self.sheet(),
            range: Span::new(start, end),
        })
        .await
    }

    /// Read columns `start..end` of the current sheet.
    pub async fn get_columns(&self, start: u32, end: u32) -> Result<Table> {
        self.query(Command::GetCollectionByColumn {
            path: self.path(),
            sheet_name: self.sheet(),
            range: Span::new(start, end),
        })
        .await
    }

    // -- Rows --

    /// Write each entry of `data` as a new row after the highest row.
    pub async fn append_row(&self, data: Table) -> Result<()> {
        self.call(Command::AppendRow {
            path: self.path(),
            sheet_name: self.sheet(),
            data,
        })
        .await
    }

    /// Insert `data` as rows at `row_index`, shifting existing rows down.
    pub async fn insert_row(&self, row_index: u32, data: Table) -> Result<()> {
        self.insert_row_with(row_index, data, true).await
    }

    /// Write `data` as rows at `row_index`; existing rows are shifted down
    /// when `is_add` is set and overwritten otherwise.
    pub async fn insert_row_with(&self, row_index: u32, data: Table, is_add: bool) -> Result<()> {
        self.call(Command::InsertRow {
            path: self.path(),
            sheet_name: self.sheet(),
            row_index,
            data,
            is_add,
        })
        .await
    }

    /// Insert `num_rows` blank rows at `row_index`.
    pub async fn insert_new_row(&self, row_index: u32, num_rows: u32) -> Result<()> {
        self.call(Command::InsertNewRow {
            path: self.path(),
            sheet_name: self.sheet(),
            row_index,
            num_rows,
        })
        .await
    }

    /// Remove `num_rows` rows starting at `row_index`, shifting later rows up.
    pub async fn remove_row(&self, row_index: u32, num_rows: u32) -> Result<()> {
        self.call(Command::RemoveRow {
            path: self.path(),
            sheet_name: self.sheet(),
            row_index,
            num_rows,
        })
        .await
    }

    // -- Columns --

    /// Write each entry of `data` as a new column after the highest column.
    pub async fn append_column(&self, data: Table) -> Result<()> {
        self.call(Command::AppendColumn {
            path: self.path(),
            sheet_name: self.sheet(),
            data,
        })
        .await
    }

    /// Insert `data` as columns at `column_index`, shifting existing columns right.
    pub async fn insert_column(&self, column_index: u32, data: Table) -> Result<()> {
        self.insert_column_with(column_index, data, true).await
    }

    pub async fn insert_column_with(
        &self,
        column_index: u32,
        data: Table,
        is_add: bool,
    ) -> Result<()> {
        self.call(Command::InsertColumn {
            path: self.path(),
            sheet_name: self.sheet(),
            column_index,
            data,
            is_add,
        })
        .await
    }

    /// Insert `num_columns` blank columns at `column`.
    pub async fn insert_new_column(
        &self,
        column: impl Into<ColumnRef>,
        num_columns: u32,
    ) -> Result<()> {
        let command = match column.into() {
            ColumnRef::Index(column_index) => Command::InsertNewColumnByIndex {
                path: self.path(),
                sheet_name: self.sheet(),
                column_index,
                num_columns,
            },
            ColumnRef::Label(column) => Command::InsertNewColumn {
                path: self.path(),
                sheet_name: self.sheet(),
                column,
                num_columns,
            },
        };
        self.call(command).await
    }

    /// Remove `num_columns` columns starting at `column`, shifting later
    /// columns left.
    pub async fn remove_column(&self, column: impl Into<ColumnRef>, num_columns: u32) -> Result<()> {
        let command = match column.into() {
            ColumnRef::Index(column_index) => Command::RemoveColumnByIndex {
                path: self.path(),
                sheet_name: self.sheet(),
                column_index,
                num_columns,
            },
            ColumnRef::Label(column) => Command::RemoveColumn {
                path: self.path(),
                sheet_name: self.sheet(),
                column,
                num_columns,
            },
        };
        self.call(command).await
    }
}
