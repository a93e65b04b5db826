//! Strict-loading integration tests: corruption is fatal, never skipped.

use mull_jsonl::{Error, read_jsonl};
use rstest::rstest;
use serde::Deserialize;
use tempfile::tempdir;

#[derive(Debug, Deserialize, PartialEq)]
struct Record {
    id: u64,
}

#[rstest]
#[case::malformed_json("{broken")]
#[case::blank_line("")]
#[case::whitespace_only("   ")]
#[case::wrong_shape("[1,2,3]")]
#[case::wrong_type("\"just a string\"")]
#[tokio::test]
async fn any_bad_second_line_aborts_with_its_line_number(#[case] bad_line: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.jsonl");
    std::fs::write(&path, format!("{{\"id\":1}}\n{bad_line}\n{{\"id\":3}}\n")).unwrap();

    let err = read_jsonl::<Record, _>(&path).await.unwrap_err();
    match err {
        Error::Parse { line_number, .. } => assert_eq!(line_number, 2),
        other => panic!("expected Parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_file_surfaces_as_io_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("does-not-exist.jsonl");

    let err = read_jsonl::<Record, _>(&path).await.unwrap_err();
    match err {
        Error::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_file_yields_empty_set() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.jsonl");
    std::fs::write(&path, "").unwrap();

    let records: Vec<Record> = read_jsonl(&path).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn valid_file_loads_every_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.jsonl");
    std::fs::write(&path, "{\"id\":1}\n{\"id\":2}\n{\"id\":3}\n").unwrap();

    let records: Vec<Record> = read_jsonl(&path).await.unwrap();
    assert_eq!(
        records,
        vec![Record { id: 1 }, Record { id: 2 }, Record { id: 3 }]
    );
}
