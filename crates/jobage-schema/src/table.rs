use crate::record::RecordField;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grouping dimension of a frequency table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Fixed, ordered band catalog; every band is always present.
    DurationBand,
    /// Open categorical field; only observed values are present.
    Category(RecordField),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::DurationBand => f.write_str("duration_band"),
            Dimension::Category(field) => field.fmt(f),
        }
    }
}

/// One line of a frequency table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregationRow {
    pub category: String,
    pub count: usize,
    /// Share of the table total, rounded to one decimal place.
    pub percentage: f64,
}

impl AggregationRow {
    /// `"30.0%"`.
    pub fn percentage_label(&self) -> String {
        format!("{:.1}%", self.percentage)
    }
}

/// Complete frequency table for one dimension over one record subset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub dimension: Dimension,
    /// Number of records counted; the percentage denominator.
    pub total: usize,
    pub rows: Vec<AggregationRow>,
}

impl FrequencyTable {
    pub fn row(&self, category: &str) -> Option<&AggregationRow> {
        self.rows.iter().find(|r| r.category == category)
    }

    pub fn count(&self, category: &str) -> usize {
        self.row(category).map_or(0, |r| r.count)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
