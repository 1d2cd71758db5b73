//! Tests for input module

use super::*;
use crate::context::StorageLocation;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

// ============================================================================
// Pattern Compilation Tests
// ============================================================================

#[test]
fn test_literal_prefix_stops_at_wildcard() {
    assert_eq!(literal_prefix("song-data/A/A/A/*.json"), "song-data/A/A/A");
    assert_eq!(literal_prefix("log_data/*/*/*.json"), "log_data");
    assert_eq!(literal_prefix("*.json"), "");
    assert_eq!(literal_prefix("a/b/c.json"), "a/b/c.json");
}

#[test]
fn test_compile_pattern_matches_segments() {
    let re = compile_pattern("log_data/*/*/*.json").unwrap();
    assert!(re.is_match("log_data/2018/11/2018-11-12-events.json"));
    assert!(re.is_match("log_data/2018/12/x.json"));
    assert!(!re.is_match("log_data/2018/11/extra/x.json"));
    assert!(!re.is_match("log_data/2018/x.json"));
    assert!(!re.is_match("song-data/2018/11/x.json"));
}

#[test]
fn test_compile_pattern_escapes_literals() {
    let re = compile_pattern("song-data/A/A/A/*.json").unwrap();
    assert!(re.is_match("song-data/A/A/A/TRAAAAW128F429D538.json"));
    assert!(!re.is_match("song-data/A/A/B/TRAAAAW128F429D538.json"));
    // The dot must not act as a regex wildcard
    assert!(!re.is_match("song-data/A/A/A/TRAAAAWxjson"));
}

// ============================================================================
// Record Parsing Tests
// ============================================================================

#[test]
fn test_parse_single_object() {
    let data = br#"{"song_id": "S1", "title": "Test"}"#;
    let records = parse_records(data, "x.json").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["song_id"], "S1");
}

#[test]
fn test_parse_array() {
    let data = br#"[{"a": 1}, {"a": 2}]"#;
    let records = parse_records(data, "x.json").unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_parse_ndjson() {
    let data = b"{\"a\": 1}\n{\"a\": 2}\n\n{\"a\": 3}\n";
    let records = parse_records(data, "x.json").unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2]["a"], 3);
}

#[test]
fn test_parse_malformed_line_is_fatal() {
    let data = b"{\"a\": 1}\nnot json\n";
    let err = parse_records(data, "x.json").unwrap_err();
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_parse_scalar_is_fatal() {
    let err = parse_records(b"42", "x.json").unwrap_err();
    assert!(err.to_string().contains("expected JSON object or array"));
}

// ============================================================================
// Reader Tests
// ============================================================================

fn write_file(root: &std::path::Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn test_read_pattern_selects_by_glob() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_file(root, "log_data/2018/11/a.json", "{\"ts\": 1}\n{\"ts\": 2}\n");
    write_file(root, "log_data/2018/12/b.json", "{\"ts\": 3}\n");
    // Wrong depth, must not match
    write_file(root, "log_data/2018/c.json", "{\"ts\": 99}\n");

    let location = StorageLocation::parse(root.to_str().unwrap(), None).unwrap();
    let reader = JsonDatasetReader::new(&location);
    let records = reader.read_pattern("log_data/*/*/*.json").await.unwrap();

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r["ts"] != json!(99)));
}

#[tokio::test]
async fn test_read_pattern_lexicographic_order() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_file(root, "data/b.json", "{\"n\": 2}\n");
    write_file(root, "data/a.json", "{\"n\": 1}\n");

    let location = StorageLocation::parse(root.to_str().unwrap(), None).unwrap();
    let reader = JsonDatasetReader::new(&location);
    let records = reader.read_pattern("data/*.json").await.unwrap();

    assert_eq!(records[0]["n"], 1);
    assert_eq!(records[1]["n"], 2);
}

#[tokio::test]
async fn test_missing_input_is_fatal() {
    let temp = tempdir().unwrap();
    let location = StorageLocation::parse(temp.path().to_str().unwrap(), None).unwrap();
    let reader = JsonDatasetReader::new(&location);

    let err = reader.read_pattern("song-data/A/A/A/*.json").await.unwrap_err();
    assert!(err.to_string().contains("no files match pattern"));
}
