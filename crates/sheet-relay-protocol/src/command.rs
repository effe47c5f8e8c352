//! The closed set of remote spreadsheet operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Coordinate, Span, Table};
use crate::{command_name, qualify, ProtocolError};

/// Operations the client can ask the backend to perform.
///
/// Serialized adjacently tagged, e.g.
/// `{"cmd": "copy_sheet", "params": {"path": ..., "sourceSheetName": ..., "targetSheetName": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "cmd",
    content = "params",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    /// Create a new in-memory workbook for `path`. Fails if already open.
    NewXlsx { path: String },

    /// Load the workbook stored at `path`.
    ReadXlsx { path: String },

    /// Persist the in-memory workbook back to `path`.
    WriteXlsx { path: String },

    /// Release the workbook open at `path`.
    CloseXlsx { path: String },

    /// Release every open workbook.
    CloseAllXlsx,

    /// List the paths of every open workbook.
    ListXlsx,

    NewSheet {
        path: String,
        sheet_name: String,
    },

    CopySheet {
        path: String,
        source_sheet_name: String,
        target_sheet_name: String,
    },

    GetSheetHighestRow {
        path: String,
        sheet_name: String,
    },

    GetSheetHighestColumn {
        path: String,
        sheet_name: String,
    },

    GetSheetHighestColumnAndRow {
        path: String,
        sheet_name: String,
    },

    GetValueByColumnAndRow {
        path: String,
        sheet_name: String,
        local: Coordinate,
    },

    SetValueByColumnAndRow {
        path: String,
        sheet_name: String,
        local: Coordinate,
        value: String,
    },

    /// Read rows `range.start..range.end` as dense string rows.
    GetCollectionByRow {
        path: String,
        sheet_name: String,
        range: Span,
    },

    /// Read columns `range.start..range.end` as dense string columns.
    GetCollectionByColumn {
        path: String,
        sheet_name: String,
        range: Span,
    },

    AppendRow {
        path: String,
        sheet_name: String,
        data: Table,
    },

    AppendColumn {
        path: String,
        sheet_name: String,
        data: Table,
    },

    /// Write `data` starting at `row_index`, shifting existing rows down first
    /// when `is_add` is set.
    InsertRow {
        path: String,
        sheet_name: String,
        row_index: u32,
        data: Table,
        is_add: bool,
    },

    InsertColumn {
        path: String,
        sheet_name: String,
        column_index: u32,
        data: Table,
        is_add: bool,
    },

    InsertNewRow {
        path: String,
        sheet_name: String,
        row_index: u32,
        num_rows: u32,
    },

    /// Insert blank columns before a lettered column.
    InsertNewColumn {
        path: String,
        sheet_name: String,
        column: String,
        num_columns: u32,
    },

    InsertNewColumnByIndex {
        path: String,
        sheet_name: String,
        column_index: u32,
        num_columns: u32,
    },

    RemoveRow {
        path: String,
        sheet_name: String,
        row_index: u32,
        num_rows: u32,
    },

    RemoveColumn {
        path: String,
        sheet_name: String,
        column: String,
        num_columns: u32,
    },

    RemoveColumnByIndex {
        path: String,
        sheet_name: String,
        column_index: u32,
        num_columns: u32,
    },
}

impl Command {
    /// Bare command name, as registered with the backend.
    pub fn name(&self) -> &'static str {
        match self {
            Command::NewXlsx { .. } => "new_xlsx",
            Command::ReadXlsx { .. } => "read_xlsx",
            Command::WriteXlsx { .. } => "write_xlsx",
            Command::CloseXlsx { .. } => "close_xlsx",
            Command::CloseAllXlsx => "close_all_xlsx",
            Command::ListXlsx => "list_xlsx",
            Command::NewSheet { .. } => "new_sheet",
            Command::CopySheet { .. } => "copy_sheet",
            Command::GetSheetHighestRow { .. } => "get_sheet_highest_row",
            Command::GetSheetHighestColumn { .. } => "get_sheet_highest_column",
            Command::GetSheetHighestColumnAndRow { .. } => "get_sheet_highest_column_and_row",
            Command::GetValueByColumnAndRow { .. } => "get_value_by_column_and_row",
            Command::SetValueByColumnAndRow { .. } => "set_value_by_column_and_row",
            Command::GetCollectionByRow { .. } => "get_collection_by_row",
            Command::GetCollectionByColumn { .. } => "get_collection_by_column",
            Command::AppendRow { .. } => "append_row",
            Command::AppendColumn { .. } => "append_column",
            Command::InsertRow { .. } => "insert_row",
            Command::InsertColumn { .. } => "insert_column",
            Command::InsertNewRow { .. } => "insert_new_row",
            Command::InsertNewColumn { .. } => "insert_new_column",
            Command::InsertNewColumnByIndex { .. } => "insert_new_column_by_index",
            Command::RemoveRow { .. } => "remove_row",
            Command::RemoveColumn { .. } => "remove_column",
            Command::RemoveColumnByIndex { .. } => "remove_column_by_index",
        }
    }

    /// Qualified operation name, e.g. `plugin:spreadsheet|new_xlsx`.
    pub fn operation(&self) -> String {
        qualify(self.name())
    }

    /// The parameter record, or `Value::Null` for operations that take none.
    pub fn params(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut tagged)) => tagged.remove("params").unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Rebuild a command from a qualified operation name and its parameters.
    pub fn decode(operation: &str, params: Value) -> Result<Self, ProtocolError> {
        let name = command_name(operation)
            .ok_or_else(|| ProtocolError::ForeignOperation(operation.to_string()))?;

        let mut tagged = Map::new();
        tagged.insert("cmd".to_string(), Value::String(name.to_string()));
        match params {
            Value::Null => {}
            Value::Object(ref m) if m.is_empty() => {}
            other => {
                tagged.insert("params".to_string(), other);
            }
        }

        serde_json::from_value(Value::Object(tagged)).map_err(|source| {
            ProtocolError::InvalidParams {
                operation: operation.to_string(),
                source,
            }
        })
    }
}
