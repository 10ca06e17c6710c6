//! Service-order workbooks as a record source.
//!
//! Reads the first worksheet of an `.xlsx`, `.xlsm`, `.xls` or `.ods` file.
//! The first row holds the column headers, as in the delimited exports, and
//! the rows go through the same header handling as [`jobage_ingest_csv`].

use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, open_workbook_auto};
use jobage_ports::RecordSource;
use jobage_schema::ServiceRecord;
use std::path::{Path, PathBuf};

/// Record source over the first worksheet of a workbook.
pub struct XlsxSource {
    pub path: PathBuf,
}

impl XlsxSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for XlsxSource {
    fn load(&self) -> Result<Vec<ServiceRecord>> {
        let records = read_records(&self.path)?;
        tracing::debug!(path = %self.path.display(), records = records.len(), "loaded workbook records");
        Ok(records)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Read the first worksheet of the workbook at `path`.
pub fn read_records(path: &Path) -> Result<Vec<ServiceRecord>> {
    let mut workbook = open_workbook_auto(path).with_context(|| format!("open workbook {path:?}"))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook {path:?} has no worksheets"))?
        .with_context(|| format!("read first worksheet of {path:?}"))?;
    parse_rows(range.rows()).with_context(|| format!("parse {path:?}"))
}

/// Parse worksheet rows, header row first. Rows with no values are skipped.
pub fn parse_rows<'a>(rows: impl IntoIterator<Item = &'a [Data]>) -> Result<Vec<ServiceRecord>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        writer.write_record(&cells).context("buffer worksheet row")?;
    }
    let buffered = writer
        .into_inner()
        .map_err(|e| anyhow!("buffer worksheet rows: {}", e.error()))?;
    jobage_ingest_csv::parse_records(buffered.as_slice(), b',')
}

/// Text of one cell as the delimited exports would write it.
///
/// Whole floats lose their `.0`, so order numbers stored as numbers read
/// back as written. Date cells use the `YYYY-MM-DD HH:MM:SS` layout.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
    }
}
