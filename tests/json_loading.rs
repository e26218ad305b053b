use std::fs::File;
use std::io::BufReader;

use refdata_store::loader::{FormatLoader, JsonLoader, JsonOptions};
use refdata_store::types::Value;
use refdata_store::RefDataError;

fn loader(params: serde_json::Value) -> JsonLoader {
    JsonLoader::new(JsonOptions::from_parameters(params.as_object().unwrap()).unwrap())
}

fn read_str(
    loader: &JsonLoader,
    input: &str,
    columns: &[&str],
) -> Result<Vec<Vec<Value>>, RefDataError> {
    let mut stream = input.as_bytes();
    loader.read(&mut stream, columns)
}

#[test]
fn load_json_records_at_record_path() {
    let loader = loader(serde_json::json!({"recordPath": "data.cities"}));
    let mut stream = BufReader::new(File::open("tests/fixtures/cities.json").unwrap());

    let rows = loader.read(&mut stream, &["city", "state"]).unwrap();

    assert_eq!(rows.len(), 7);
    assert_eq!(rows[0], vec![Value::from("Albany"), Value::from("NY")]);
    assert_eq!(rows[6], vec![Value::from("Springfield"), Value::from("IL")]);
}

#[test]
fn load_json_missing_key_yields_null() {
    let loader = loader(serde_json::json!({"recordPath": "data.cities"}));
    let mut stream = BufReader::new(File::open("tests/fixtures/cities.json").unwrap());

    let rows = loader.read(&mut stream, &["city", "state"]).unwrap();

    // Portland has no state in the fixture.
    assert_eq!(rows[5], vec![Value::from("Portland"), Value::Null]);
}

#[test]
fn load_json_references_map_columns_to_nested_paths() {
    let loader = loader(serde_json::json!({
        "recordPath": "data.cities",
        "references": {"lat": "location.lat"}
    }));
    let mut stream = BufReader::new(File::open("tests/fixtures/cities.json").unwrap());

    let rows = loader.read(&mut stream, &["lat", "city"]).unwrap();

    assert_eq!(rows[0], vec![Value::Float64(42.65), Value::from("Albany")]);
    // Boston has no location object at all.
    assert_eq!(rows[2], vec![Value::Null, Value::from("Boston")]);
}

#[test]
fn load_ndjson_skips_blank_lines() {
    let loader = loader(serde_json::json!({}));
    let mut stream = BufReader::new(File::open("tests/fixtures/cities.ndjson").unwrap());

    let rows = loader.read(&mut stream, &["city"]).unwrap();

    assert_eq!(rows.len(), 7);
    assert_eq!(rows[3], vec![Value::from("Chicago")]);
}

#[test]
fn load_json_top_level_array() {
    let loader = loader(serde_json::json!({}));
    let rows = read_str(&loader, r#"[{"id": 1, "ok": true}, {"id": 2}]"#, &["ok", "id"]).unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Value::Bool(true), Value::Int64(1)],
            vec![Value::Null, Value::Int64(2)],
        ]
    );
}

#[test]
fn load_json_errors_on_non_object_record() {
    let loader = loader(serde_json::json!({}));
    let err = read_str(&loader, r#"[{"id": 1}, 7]"#, &["id"]).unwrap_err();
    assert!(matches!(err, RefDataError::MalformedRecord { row: 2, .. }));
}

#[test]
fn load_json_errors_on_missing_record_path() {
    let loader = loader(serde_json::json!({"recordPath": "data.rows"}));
    let err = read_str(&loader, r#"{"data": {"cities": []}}"#, &["id"]).unwrap_err();
    assert!(err.to_string().contains("record path 'data.rows' not found"));
}

#[test]
fn load_ndjson_reports_bad_line() {
    let loader = loader(serde_json::json!({}));
    let err = read_str(&loader, "{\"id\": 1}\n{\"id\": \n", &["id"]).unwrap_err();
    assert!(matches!(err, RefDataError::MalformedRecord { row: 2, .. }));
}

#[test]
fn load_json_empty_input_has_no_rows() {
    let loader = loader(serde_json::json!({}));
    assert!(read_str(&loader, "  \n", &["id"]).unwrap().is_empty());
}

#[test]
fn load_json_truncated_array_reports_syntax_error() {
    let loader = loader(serde_json::json!({}));
    let err = read_str(&loader, "[{\"id\": 1}, {\"id\": 2}", &["id"]).unwrap_err();
    assert!(matches!(err, RefDataError::Json(ref e) if e.is_eof()), "got {err}");
    assert!(!err.to_string().contains("ndjson"));
}
