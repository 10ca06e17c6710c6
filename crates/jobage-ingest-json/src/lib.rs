use anyhow::{Context, Result};
use jobage_ports::RecordSource;
use jobage_schema::ServiceRecord;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Record source reading one JSON object per line.
///
/// Keys may be snake_case field names or the spreadsheet column headers.
/// Blank lines are skipped. Null cells count as absent, and numeric or
/// boolean cells are read as their text.
pub struct JsonlSource {
    pub path: PathBuf,
}

impl JsonlSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonlSource {
    fn load(&self) -> Result<Vec<ServiceRecord>> {
        read_records(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Read and parse a JSONL file.
pub fn read_records(path: &Path) -> Result<Vec<ServiceRecord>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {path:?}"))?;
    let records = parse_records(&text).with_context(|| format!("parse {path:?}"))?;
    tracing::debug!(path = %path.display(), records = records.len(), "loaded jsonl records");
    Ok(records)
}

/// Parse JSONL text; errors name the offending line.
pub fn parse_records(text: &str) -> Result<Vec<ServiceRecord>> {
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value =
            serde_json::from_str(line).with_context(|| format!("parse record json line {}", i + 1))?;
        let record: ServiceRecord = serde_json::from_value(normalize(value))
            .with_context(|| format!("parse record json line {}", i + 1))?;
        out.push(record);
    }
    Ok(out)
}

/// Spreadsheet exports write empty cells as `null` and order numbers as
/// numbers; the record type only takes text.
fn normalize(value: Value) -> Value {
    let Value::Object(fields) = value else {
        return value;
    };
    let fields: Map<String, Value> = fields
        .into_iter()
        .filter_map(|(key, cell)| match cell {
            Value::Null => None,
            Value::Number(n) => Some((key, Value::String(n.to_string()))),
            Value::Bool(b) => Some((key, Value::String(b.to_string()))),
            other => Some((key, other)),
        })
        .collect();
    Value::Object(fields)
}
