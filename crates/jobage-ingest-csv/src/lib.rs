//! Service-order spreadsheet exports as a record source.
//!
//! The first row holds column headers, either the spreadsheet's own
//! (`Service Order Number`, `服务网点`, ...) or snake_case field names.
//! Unknown columns are ignored and empty cells read as missing values.

use anyhow::{Context, Result};
use jobage_ports::RecordSource;
use jobage_schema::ServiceRecord;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Field delimiter implied by a file extension: tab for `.tsv`/`.tab`,
/// comma otherwise.
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => b'\t',
        _ => b',',
    }
}

/// Record source over a delimited text file with a header row.
pub struct CsvSource {
    pub path: PathBuf,
    pub delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let delimiter = delimiter_for(&path);
        Self { path, delimiter }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl RecordSource for CsvSource {
    fn load(&self) -> Result<Vec<ServiceRecord>> {
        let file = std::fs::File::open(&self.path).with_context(|| format!("open {:?}", self.path))?;
        let records = parse_records(file, self.delimiter).with_context(|| format!("parse {:?}", self.path))?;
        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            delimiter = %char::from(self.delimiter).escape_default(),
            "loaded delimited records"
        );
        Ok(records)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Parse delimited text with a header row.
pub fn parse_records(input: impl Read, delimiter: u8) -> Result<Vec<ServiceRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let headers = reader.headers().context("read header row")?.clone();
    if !headers.iter().any(is_order_id_header) {
        anyhow::bail!("no service order number column in header row");
    }

    let mut out = Vec::new();
    for (i, row) in reader.deserialize::<ServiceRecord>().enumerate() {
        let record = row.with_context(|| format!("read row {}", i + 1))?;
        out.push(record);
    }
    Ok(out)
}

fn is_order_id_header(header: &str) -> bool {
    header == "order_id" || header == "Service Order Number"
}
