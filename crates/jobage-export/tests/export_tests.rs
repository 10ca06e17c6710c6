//! Exports read back through the ingest adapters.

use jobage_export::{ExportFormat, write_export};
use jobage_ingest_csv::CsvSource;
use jobage_ingest_json::JsonlSource;
use jobage_ports::RecordSource;
use jobage_schema::ServiceRecord;
use jobage_testkit::mixed_centers;

#[test]
fn tsv_export_loads_as_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filtered.tsv");
    let records = mixed_centers();
    let subset: Vec<&ServiceRecord> = records.iter().filter(|r| r.warranty_status.as_deref() == Some("IW")).collect();

    write_export(&path, &subset, ExportFormat::Tsv).unwrap();
    let loaded = CsvSource::new(&path).load().unwrap();

    let expected: Vec<ServiceRecord> = subset.into_iter().cloned().collect();
    assert_eq!(loaded, expected);
}

#[test]
fn jsonl_export_loads_as_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filtered.jsonl");
    let records = mixed_centers();
    let subset: Vec<&ServiceRecord> = records.iter().collect();

    write_export(&path, &subset, ExportFormat::Jsonl).unwrap();
    assert_eq!(JsonlSource::new(&path).load().unwrap(), records);
}

#[test]
fn json_export_is_an_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filtered.json");
    let records = mixed_centers();
    let subset: Vec<&ServiceRecord> = records.iter().take(2).collect();

    write_export(&path, &subset, ExportFormat::Json).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let parsed: Vec<ServiceRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.len(), 2);
    insta::assert_snapshot!(parsed[0].order_id.to_string(), @"SO-1001");
}
