//! Call-shape tests for `Spreadsheet` against a recording transport.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sheet_relay::transport::RecordedCall;
use sheet_relay::{
    ColumnRef, MockTransport, SheetRange, SheetsClient, SheetsError, Spreadsheet,
};

const PATH: &str = "/tmp/handle.xlsx";

fn setup() -> (Arc<MockTransport>, Spreadsheet) {
    let mock = Arc::new(MockTransport::new());
    let client = SheetsClient::with_transport(mock.clone());
    let sheet = client.spreadsheet(PATH, "Sheet1");
    (mock, sheet)
}

fn only_call(mock: &MockTransport) -> RecordedCall {
    let calls = mock.calls();
    assert_eq!(calls.len(), 1, "expected exactly one call, got {calls:?}");
    calls.into_iter().next().unwrap()
}

fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect()
}

#[tokio::test]
async fn file_operations_send_only_the_path() {
    let (mock, sheet) = setup();
    sheet.create().await.unwrap();
    sheet.read().await.unwrap();
    sheet.write().await.unwrap();
    sheet.close().await.unwrap();

    let calls = mock.calls();
    let ops: Vec<&str> = calls.iter().map(RecordedCall::command).collect();
    assert_eq!(ops, ["new_xlsx", "read_xlsx", "write_xlsx", "close_xlsx"]);
    for call in &calls {
        assert!(call.operation.starts_with("plugin:spreadsheet|"));
        assert_eq!(call.params, json!({"path": PATH}));
    }
}

#[tokio::test]
async fn new_sheet_keeps_the_current_target() {
    let (mock, sheet) = setup();
    sheet.new_sheet("Data").await.unwrap();

    let call = only_call(&mock);
    assert_eq!(call.operation, "plugin:spreadsheet|new_sheet");
    assert_eq!(call.params, json!({"path": PATH, "sheetName": "Data"}));
    assert_eq!(sheet.sheet_name, "Sheet1");
}

#[tokio::test]
async fn copy_sheet_defaults_source_to_current_sheet() {
    let (mock, sheet) = setup();
    sheet.copy_sheet("Copy", None).await.unwrap();
    sheet.copy_sheet("Other", Some("Data")).await.unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].command(), "copy_sheet");
    assert_eq!(
        calls[0].params,
        json!({"path": PATH, "sourceSheetName": "Sheet1", "targetSheetName": "Copy"})
    );
    assert_eq!(
        calls[1].params,
        json!({"path": PATH, "sourceSheetName": "Data", "targetSheetName": "Other"})
    );
}

#[tokio::test]
async fn extent_queries_return_backend_values() {
    let (mock, sheet) = setup();
    mock.reply("get_sheet_highest_row", json!(12))
        .reply("get_sheet_highest_column", json!(4))
        .reply("get_sheet_highest_column_and_row", json!([4, 12]));

    assert_eq!(sheet.get_sheet_row().await.unwrap(), 12);
    assert_eq!(sheet.get_sheet_column().await.unwrap(), 4);
    let range = sheet.get_sheet_range().await.unwrap();
    assert_eq!(range, SheetRange::from((4, 12)));
    assert_eq!(range.highest_column, 4);
    assert_eq!(range.highest_row, 12);

    for call in mock.calls() {
        assert_eq!(call.params, json!({"path": PATH, "sheetName": "Sheet1"}));
    }
}

#[tokio::test]
async fn cell_access_sends_column_then_row() {
    let (mock, sheet) = setup();
    mock.reply("get_value_by_column_and_row", json!("42"));

    sheet.set_value([2, 7], "42").await.unwrap();
    let value = sheet.get_value((2, 7)).await.unwrap();
    assert_eq!(value, "42");

    let calls = mock.calls();
    assert_eq!(calls[0].command(), "set_value_by_column_and_row");
    assert_eq!(
        calls[0].params,
        json!({"path": PATH, "sheetName": "Sheet1", "local": [2, 7], "value": "42"})
    );
    assert_eq!(calls[1].command(), "get_value_by_column_and_row");
    assert_eq!(
        calls[1].params,
        json!({"path": PATH, "sheetName": "Sheet1", "local": [2, 7]})
    );
}

#[tokio::test]
async fn collections_send_a_range() {
    let (mock, sheet) = setup();
    mock.reply("get_collection_by_row", json!([["a", "b"]]))
        .reply("get_collection_by_column", json!([["a"], ["b"]]));

    assert_eq!(sheet.get_rows(1, 2).await.unwrap(), table(&[&["a", "b"]]));
    assert_eq!(
        sheet.get_columns(1, 3).await.unwrap(),
        table(&[&["a"], &["b"]])
    );

    let calls = mock.calls();
    assert_eq!(calls[0].params["range"], json!([1, 2]));
    assert_eq!(calls[1].params["range"], json!([1, 3]));
}

#[tokio::test]
async fn row_operations() {
    let (mock, sheet) = setup();
    let data = table(&[&["a", "b"], &["c", "d"]]);

    sheet.append_row(data.clone()).await.unwrap();
    sheet.insert_row(3, data.clone()).await.unwrap();
    sheet.insert_row_with(3, data.clone(), false).await.unwrap();
    sheet.insert_new_row(5, 2).await.unwrap();
    sheet.remove_row(1, 4).await.unwrap();

    let calls = mock.calls();
    let ops: Vec<&str> = calls.iter().map(RecordedCall::command).collect();
    assert_eq!(
        ops,
        ["append_row", "insert_row", "insert_row", "insert_new_row", "remove_row"]
    );
    assert_eq!(
        calls[0].params,
        json!({"path": PATH, "sheetName": "Sheet1", "data": [["a", "b"], ["c", "d"]]})
    );
    assert_eq!(
        calls[1].params,
        json!({
            "path": PATH,
            "sheetName": "Sheet1",
            "rowIndex": 3,
            "data": [["a", "b"], ["c", "d"]],
            "isAdd": true,
        })
    );
    assert_eq!(calls[2].params["isAdd"], json!(false));
    assert_eq!(
        calls[3].params,
        json!({"path": PATH, "sheetName": "Sheet1", "rowIndex": 5, "numRows": 2})
    );
    assert_eq!(
        calls[4].params,
        json!({"path": PATH, "sheetName": "Sheet1", "rowIndex": 1, "numRows": 4})
    );
}

#[tokio::test]
async fn column_data_operations() {
    let (mock, sheet) = setup();
    let data = table(&[&["x", "y"]]);

    sheet.append_column(data.clone()).await.unwrap();
    sheet.insert_column(2, data.clone()).await.unwrap();
    sheet.insert_column_with(2, data, false).await.unwrap();

    let calls = mock.calls();
    assert_eq!(calls[0].command(), "append_column");
    assert_eq!(calls[1].command(), "insert_column");
    assert_eq!(
        calls[1].params,
        json!({
            "path": PATH,
            "sheetName": "Sheet1",
            "columnIndex": 2,
            "data": [["x", "y"]],
            "isAdd": true,
        })
    );
    assert_eq!(calls[2].params["isAdd"], json!(false));
}

#[tokio::test]
async fn insert_new_column_by_index() {
    let (mock, sheet) = setup();
    sheet.insert_new_column(3u32, 2).await.unwrap();

    let call = only_call(&mock);
    assert_eq!(call.operation, "plugin:spreadsheet|insert_new_column_by_index");
    assert_eq!(
        call.params,
        json!({"path": PATH, "sheetName": "Sheet1", "columnIndex": 3, "numColumns": 2})
    );
}

#[tokio::test]
async fn insert_new_column_by_label() {
    let (mock, sheet) = setup();
    sheet.insert_new_column("C", 2).await.unwrap();

    let call = only_call(&mock);
    assert_eq!(call.operation, "plugin:spreadsheet|insert_new_column");
    assert_eq!(
        call.params,
        json!({"path": PATH, "sheetName": "Sheet1", "column": "C", "numColumns": 2})
    );
}

#[tokio::test]
async fn remove_column_deletes_rather_than_inserts() {
    let (mock, sheet) = setup();
    sheet.remove_column(ColumnRef::index(2), 1).await.unwrap();
    sheet.remove_column("B", 3).await.unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].command(), "remove_column_by_index");
    assert_eq!(
        calls[0].params,
        json!({"path": PATH, "sheetName": "Sheet1", "columnIndex": 2, "numColumns": 1})
    );
    assert_eq!(calls[1].command(), "remove_column");
    assert_eq!(
        calls[1].params,
        json!({"path": PATH, "sheetName": "Sheet1", "column": "B", "numColumns": 3})
    );
}

#[tokio::test]
async fn non_column_values_are_rejected_before_any_call() {
    let (mock, sheet) = setup();

    for bad in [json!(true), json!(-1), json!(1.5), json!(null), json!(["A"])] {
        let err = ColumnRef::try_from(bad).unwrap_err();
        assert!(matches!(err, SheetsError::InvalidColumnRef(_)));
    }

    let column = ColumnRef::try_from(json!("D")).unwrap();
    sheet.insert_new_column(column, 1).await.unwrap();
    assert_eq!(only_call(&mock).command(), "insert_new_column");
}

#[tokio::test]
async fn retargeting_affects_only_later_calls() {
    let (mock, mut sheet) = setup();
    mock.reply("get_sheet_highest_row", json!(3));
    assert_eq!(sheet.get_sheet_row().await.unwrap(), 3);
    sheet.set_sheet_name("Data");
    sheet.set_value([1, 1], "x").await.unwrap();
    sheet.path = "/tmp/other.xlsx".to_string();
    sheet.write().await.unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].params["sheetName"], json!("Sheet1"));
    assert_eq!(calls[1].params["sheetName"], json!("Data"));
    assert_eq!(calls[1].params["path"], json!(PATH));
    assert_eq!(calls[2].params, json!({"path": "/tmp/other.xlsx"}));
}

#[tokio::test]
async fn create_then_write_to_a_new_sheet() {
    let (mock, mut sheet) = setup();
    mock.reply("new_xlsx", json!(format!("created {PATH}")))
        .reply("get_value_by_column_and_row", json!("hello"));

    sheet.create().await.unwrap();
    sheet.new_sheet("Data").await.unwrap();
    sheet.sheet_name = "Data".to_string();
    sheet.set_value([0, 0], "hello").await.unwrap();
    let value = sheet.get_value([0, 0]).await.unwrap();
    assert_eq!(value, "hello");

    let calls = mock.calls();
    let ops: Vec<&str> = calls.iter().map(RecordedCall::command).collect();
    assert_eq!(
        ops,
        [
            "new_xlsx",
            "new_sheet",
            "set_value_by_column_and_row",
            "get_value_by_column_and_row"
        ]
    );
    assert_eq!(
        calls[3].params,
        json!({"path": PATH, "sheetName": "Data", "local": [0, 0]})
    );
}

#[tokio::test]
async fn backend_rejections_propagate() {
    let (mock, sheet) = setup();
    mock.fail("read_xlsx", "file \"/tmp/handle.xlsx\" not found");

    let err = sheet.read().await.unwrap_err();
    assert!(matches!(err, SheetsError::Remote(ref m) if m.contains("not found")));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn malformed_results_are_reported() {
    let (mock, sheet) = setup();
    mock.reply("get_sheet_highest_row", json!("many"));

    let err = sheet.get_sheet_row().await.unwrap_err();
    assert!(matches!(err, SheetsError::UnexpectedResponse { .. }));
}

#[tokio::test]
async fn handles_share_one_transport() {
    let (mock, sheet) = setup();
    let copy = sheet.clone();
    sheet.close().await.unwrap();
    copy.close().await.unwrap();

    assert_eq!(mock.call_count(), 2);
    assert!(mock.calls().iter().all(|c| c.params == json!({"path": PATH})));
    assert_eq!(mock.last_call().map(|c| c.params["path"].clone()), Some(Value::from(PATH)));
}
