//! Maps protocol requests onto [`Engine`] calls.

use serde_json::Value;
use sheet_relay_protocol::{Command, Request, Response};

use crate::engine::Engine;
use crate::error::{EngineError, Result};

/// Run one command against the engine, returning its result data.
pub fn execute(engine: &mut Engine, command: Command) -> Result<Value> {
    let data = match command {
        Command::NewXlsx { path } => serde_json::to_value(engine.new_xlsx(&path)?)?,
        Command::ReadXlsx { path } => serde_json::to_value(engine.read_xlsx(&path)?)?,
        Command::WriteXlsx { path } => {
            engine.write_xlsx(&path)?;
            Value::Null
        }
        Command::CloseXlsx { path } => {
            engine.close_xlsx(&path);
            Value::Null
        }
        Command::CloseAllXlsx => {
            engine.close_all_xlsx();
            Value::Null
        }
        Command::ListXlsx => serde_json::to_value(engine.list_xlsx())?,
        Command::NewSheet { path, sheet_name } => {
            serde_json::to_value(engine.new_sheet(&path, &sheet_name)?)?
        }
        Command::CopySheet {
            path,
            source_sheet_name,
            target_sheet_name,
        } => {
            engine.copy_sheet(&path, &source_sheet_name, &target_sheet_name)?;
            Value::Null
        }
        Command::GetSheetHighestRow { path, sheet_name } => {
            serde_json::to_value(engine.highest_row(&path, &sheet_name)?)?
        }
        Command::GetSheetHighestColumn { path, sheet_name } => {
            serde_json::to_value(engine.highest_column(&path, &sheet_name)?)?
        }
        Command::GetSheetHighestColumnAndRow { path, sheet_name } => {
            serde_json::to_value(engine.highest_column_and_row(&path, &sheet_name)?)?
        }
        Command::GetValueByColumnAndRow {
            path,
            sheet_name,
            local,
        } => serde_json::to_value(engine.get_value(&path, &sheet_name, local)?)?,
        Command::SetValueByColumnAndRow {
            path,
            sheet_name,
            local,
            value,
        } => {
            engine.set_value(&path, &sheet_name, local, &value)?;
            Value::Null
        }
        Command::GetCollectionByRow {
            path,
            sheet_name,
            range,
        } => serde_json::to_value(engine.rows(&path, &sheet_name, range)?)?,
        Command::GetCollectionByColumn {
            path,
            sheet_name,
            range,
        } => serde_json::to_value(engine.columns(&path, &sheet_name, range)?)?,
        Command::AppendRow {
            path,
            sheet_name,
            data,
        } => {
            engine.append_row(&path, &sheet_name, &data)?;
            Value::Null
        }
        Command::AppendColumn {
            path,
            sheet_name,
            data,
        } => {
            engine.append_column(&path, &sheet_name, &data)?;
            Value::Null
        }
        Command::InsertRow {
            path,
            sheet_name,
            row_index,
            data,
            is_add,
        } => {
            engine.insert_row(&path, &sheet_name, row_index, &data, is_add)?;
            Value::Null
        }
        Command::InsertColumn {
            path,
            sheet_name,
            column_index,
            data,
            is_add,
        } => {
            engine.insert_column(&path, &sheet_name, column_index, &data, is_add)?;
            Value::Null
        }
        Command::InsertNewRow {
            path,
            sheet_name,
            row_index,
            num_rows,
        } => {
            engine.insert_new_row(&path, &sheet_name, row_index, num_rows)?;
            Value::Null
        }
        Command::InsertNewColumn {
            path,
            sheet_name,
            column,
            num_columns,
        } => {
            engine.insert_new_column(&path, &sheet_name, &column, num_columns)?;
            Value::Null
        }
        Command::InsertNewColumnByIndex {
            path,
            sheet_name,
            column_index,
            num_columns,
        } => {
            engine.insert_new_column_by_index(&path, &sheet_name, column_index, num_columns)?;
            Value::Null
        }
        Command::RemoveRow {
            path,
            sheet_name,
            row_index,
            num_rows,
        } => {
            engine.remove_row(&path, &sheet_name, row_index, num_rows)?;
            Value::Null
        }
        Command::RemoveColumn {
            path,
            sheet_name,
            column,
            num_columns,
        } => {
            engine.remove_column(&path, &sheet_name, &column, num_columns)?;
            Value::Null
        }
        Command::RemoveColumnByIndex {
            path,
            sheet_name,
            column_index,
            num_columns,
        } => {
            engine.remove_column_by_index(&path, &sheet_name, column_index, num_columns)?;
            Value::Null
        }
    };
    Ok(data)
}

/// Decode and run a request, producing the response to send back.
pub fn handle_request(engine: &mut Engine, request: &Request) -> Response {
    let outcome = request
        .command()
        .map_err(EngineError::from)
        .and_then(|command| execute(engine, command));

    match outcome {
        Ok(data) => Response::ok(request.id, data),
        Err(e) => {
            tracing::warn!("{} #{} failed: {e}", request.cmd, request.id);
            Response::error(request.id, e.to_string())
        }
    }
}

/// Handle one line of input. Blank lines produce no response; lines that are
/// not a request get an error response with id 0.
pub fn handle_line(engine: &mut Engine, line: &str) -> Option<Response> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<Request>(line) {
        Ok(request) => Some(handle_request(engine, &request)),
        Err(e) => {
            tracing::error!("JSON parse error: {e}; line was: {line}");
            Some(Response::error(0, format!("JSON parse error: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sheet_relay_protocol::ResponseResult;

    fn send(engine: &mut Engine, id: u64, cmd: &str, params: Value) -> Response {
        let line = serde_json::to_string(&Request::new(
            id,
            sheet_relay_protocol::qualify(cmd),
            params,
        ))
        .unwrap();
        handle_line(engine, &line).unwrap()
    }

    #[test]
    fn requests_are_answered_with_their_id() {
        let mut engine = Engine::new();
        let resp = send(&mut engine, 1, "new_xlsx", json!({"path": "/tmp/d.xlsx"}));
        assert_eq!(resp, Response::ok(1, json!("created /tmp/d.xlsx")));

        let resp = send(
            &mut engine,
            2,
            "set_value_by_column_and_row",
            json!({"path": "/tmp/d.xlsx", "sheetName": "Sheet1", "local": [1, 1], "value": "v"}),
        );
        assert_eq!(resp, Response::ok(2, Value::Null));

        let resp = send(
            &mut engine,
            3,
            "get_sheet_highest_column_and_row",
            json!({"path": "/tmp/d.xlsx", "sheetName": "Sheet1"}),
        );
        assert_eq!(resp, Response::ok(3, json!([1, 1])));

        let resp = send(&mut engine, 4, "list_xlsx", Value::Null);
        assert_eq!(resp, Response::ok(4, json!(["/tmp/d.xlsx"])));
    }

    #[test]
    fn engine_errors_become_error_responses() {
        let mut engine = Engine::new();
        let resp = send(&mut engine, 5, "write_xlsx", json!({"path": "/tmp/none.xlsx"}));
        assert_eq!(resp.id, 5);
        assert_eq!(
            resp.result,
            ResponseResult::Error {
                message: "file \"/tmp/none.xlsx\" not found".into()
            }
        );
    }

    #[test]
    fn unknown_and_malformed_requests() {
        let mut engine = Engine::new();

        let resp = send(&mut engine, 6, "explode", Value::Null);
        assert_eq!(resp.id, 6);
        assert!(matches!(resp.result, ResponseResult::Error { .. }));

        let resp = handle_line(&mut engine, "{not json").unwrap();
        assert_eq!(resp.id, 0);
        assert!(matches!(resp.result, ResponseResult::Error { ref message }
            if message.starts_with("JSON parse error")));

        assert!(handle_line(&mut engine, "   ").is_none());
    }
}
