//! Export of filtered service records.
//!
//! Delimited formats use the spreadsheet's column headers so an export can be
//! loaded straight back as input; JSON formats use the snake_case field names.

use anyhow::{Context, Result, anyhow};
use jobage_ports::RecordExporter;
use jobage_schema::ServiceRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    /// Tab-separated, the form spreadsheet applications open directly.
    Tsv,
    Json,
    Jsonl,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" | "tab" | "spreadsheet" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            "jsonl" | "ndjson" => Ok(ExportFormat::Jsonl),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

impl ExportFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
            ExportFormat::Jsonl => "jsonl",
        }
    }

    /// Format implied by a path's extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|e| e.to_str()).and_then(|e| e.parse().ok())
    }

    pub fn exporter(&self) -> Box<dyn RecordExporter> {
        match self {
            ExportFormat::Csv => Box::new(DelimitedExporter::csv()),
            ExportFormat::Tsv => Box::new(DelimitedExporter::tsv()),
            ExportFormat::Json => Box::new(JsonExporter { pretty: true }),
            ExportFormat::Jsonl => Box::new(JsonlExporter),
        }
    }
}

/// Column headers of delimited exports, in column order.
pub const COLUMNS: [&str; 9] = [
    "Service Order Number",
    "Creation Time",
    "服务网点",
    "Service Order Status",
    "Engineer",
    "保内/保外",
    "Picking Parts Status",
    "Service Type",
    "Comments",
];

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn columns(record: &ServiceRecord) -> [&str; 9] {
    [
        record.order_id.0.as_str(),
        record.creation_time.as_str(),
        opt(&record.service_center),
        opt(&record.status),
        opt(&record.engineer),
        opt(&record.warranty_status),
        opt(&record.parts_picking_status),
        opt(&record.service_type),
        opt(&record.comments),
    ]
}

/// CSV or TSV exporter with a header row.
pub struct DelimitedExporter {
    pub delimiter: u8,
}

impl DelimitedExporter {
    pub fn csv() -> Self {
        Self { delimiter: b',' }
    }

    pub fn tsv() -> Self {
        Self { delimiter: b'\t' }
    }
}

impl RecordExporter for DelimitedExporter {
    fn export(&self, records: &[&ServiceRecord]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(COLUMNS).context("write header row")?;
        for record in records {
            writer
                .write_record(columns(record))
                .with_context(|| format!("write record {}", record.order_id))?;
        }
        writer
            .into_inner()
            .map_err(|e| anyhow!("flush delimited export: {}", e.error()))
    }
}

/// JSON array exporter.
pub struct JsonExporter {
    pub pretty: bool,
}

impl RecordExporter for JsonExporter {
    fn export(&self, records: &[&ServiceRecord]) -> Result<Vec<u8>> {
        let mut out = if self.pretty {
            serde_json::to_vec_pretty(records)
        } else {
            serde_json::to_vec(records)
        }
        .context("JSON export failed")?;
        out.push(b'\n');
        Ok(out)
    }
}

/// One JSON object per line.
pub struct JsonlExporter;

impl RecordExporter for JsonlExporter {
    fn export(&self, records: &[&ServiceRecord]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for record in records {
            serde_json::to_writer(&mut out, record)
                .with_context(|| format!("JSONL export failed at {}", record.order_id))?;
            out.push(b'\n');
        }
        Ok(out)
    }
}

/// Serialize `records` in `format`.
pub fn export_records(records: &[&ServiceRecord], format: ExportFormat) -> Result<Vec<u8>> {
    format.exporter().export(records)
}

/// Serialize `records` in `format` and write them to `path`.
pub fn write_export(path: &Path, records: &[&ServiceRecord], format: ExportFormat) -> Result<()> {
    let bytes = export_records(records, format)?;
    std::fs::write(path, &bytes).with_context(|| format!("write {path:?}"))?;
    tracing::info!(path = %path.display(), records = records.len(), %format, "export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ServiceRecord {
        ServiceRecord {
            service_center: Some("MM-1.Care-MSC-Yangon-Hledan".into()),
            status: Some("Pending Parts".into()),
            warranty_status: Some("IW".into()),
            service_type: Some("Repair".into()),
            comments: Some("needs board, screen".into()),
            ..ServiceRecord::new("SO-1", "2025-05-01 09:30:00")
        }
    }

    #[test]
    fn format_parsing_and_extensions() {
        assert_eq!("TSV".parse::<ExportFormat>(), Ok(ExportFormat::Tsv));
        assert_eq!("ndjson".parse::<ExportFormat>(), Ok(ExportFormat::Jsonl));
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::from_path(Path::new("out/orders.csv")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_path(Path::new("orders")), None);
        assert_eq!(ExportFormat::Jsonl.to_string(), "jsonl");
    }

    #[test]
    fn csv_uses_spreadsheet_headers_and_quotes() {
        let r = record();
        let bytes = export_records(&[&r], ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "Service Order Number,Creation Time,服务网点,Service Order Status,Engineer,保内/保外,Picking Parts Status,Service Type,Comments\n\
             SO-1,2025-05-01 09:30:00,MM-1.Care-MSC-Yangon-Hledan,Pending Parts,,IW,,Repair,\"needs board, screen\"\n"
        );
    }

    #[test]
    fn tsv_separates_with_tabs() {
        let r = record();
        let text = String::from_utf8(export_records(&[&r], ExportFormat::Tsv).unwrap()).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row.split('\t').count(), COLUMNS.len());
        assert!(row.ends_with("\tneeds board, screen"));
    }

    #[test]
    fn empty_subset_still_has_header() {
        let text = String::from_utf8(export_records(&[], ExportFormat::Csv).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
        let jsonl = export_records(&[], ExportFormat::Jsonl).unwrap();
        assert!(jsonl.is_empty());
        let json = export_records(&[], ExportFormat::Json).unwrap();
        assert_eq!(json, b"[]\n");
    }
}
