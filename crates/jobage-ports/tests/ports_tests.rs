//! Tests for jobage-ports crate.

use jobage_config::EngineConfig;
use jobage_ports::{RecordExporter, RecordSource, ReportRenderer};
use jobage_report::{Report, ReportRequest, build_report};
use jobage_schema::ServiceRecord;
use jobage_testkit::{reference, ten_record_scenario};

/// Mock source that returns a fixed fixture.
struct MockSource(Vec<ServiceRecord>);

impl RecordSource for MockSource {
    fn load(&self) -> anyhow::Result<Vec<ServiceRecord>> {
        Ok(self.0.clone())
    }
}

/// Mock renderer that returns a one-line summary.
struct MockRenderer;

impl ReportRenderer for MockRenderer {
    fn render(&self, report: &Report) -> anyhow::Result<String> {
        Ok(format!(
            "records={} banded={}",
            report.total_records, report.overall_duration.total
        ))
    }
}

/// Mock exporter that writes one order id per line.
struct MockExporter;

impl RecordExporter for MockExporter {
    fn export(&self, records: &[&ServiceRecord]) -> anyhow::Result<Vec<u8>> {
        let ids: Vec<_> = records.iter().map(|r| r.order_id.0.as_str()).collect();
        Ok(ids.join("\n").into_bytes())
    }
}

#[test]
fn mock_source_loads_records() {
    let source = MockSource(ten_record_scenario());
    let records = source.load().unwrap();
    assert_eq!(records.len(), 10);
    assert_eq!(source.describe(), "records");
}

#[test]
fn boxed_source_delegates() {
    let source: Box<dyn RecordSource> = Box::new(MockSource(Vec::new()));
    assert!(source.load().unwrap().is_empty());
}

#[test]
fn mock_renderer_produces_output() {
    let records = ten_record_scenario();
    let report = build_report(&records, &ReportRequest::new(reference()), &EngineConfig::default()).unwrap();
    let out = MockRenderer.render(&report).unwrap();
    assert_eq!(out, "records=10 banded=10");
}

#[test]
fn mock_exporter_preserves_order() {
    let records = ten_record_scenario();
    let subset: Vec<&ServiceRecord> = records.iter().rev().take(2).collect();
    let bytes = MockExporter.export(&subset).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "SO-0010\nSO-0009");
}
