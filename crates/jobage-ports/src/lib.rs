use anyhow::Result;
use jobage_report::Report;
use jobage_schema::ServiceRecord;

/// Where service records come from.
///
/// Adapters live in `jobage-ingest-*` crates. Loading is all-or-nothing:
/// a malformed row fails the load, while an unreadable creation time is
/// left for the report to count.
pub trait RecordSource {
    fn load(&self) -> Result<Vec<ServiceRecord>>;

    /// Short description for logs, usually the input path.
    fn describe(&self) -> String {
        "records".to_string()
    }
}

/// Rendering.
///
/// Renderers should be pure: report in, text out.
pub trait ReportRenderer {
    fn render(&self, report: &Report) -> Result<String>;
}

/// Serialization of a record subset for download.
pub trait RecordExporter {
    fn export(&self, records: &[&ServiceRecord]) -> Result<Vec<u8>>;
}

impl<T: RecordSource + ?Sized> RecordSource for Box<T> {
    fn load(&self) -> Result<Vec<ServiceRecord>> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
