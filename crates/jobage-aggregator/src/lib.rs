//! Frequency-table aggregation for jobage.
//!
//! Two shapes of table come out of here:
//!
//! - duration tables, which always list every band of the catalog in catalog
//!   order, with explicit zero rows;
//! - categorical tables, which list only observed values, ordered by
//!   descending count with ties broken by first appearance.
//!
//! Percentages are computed against the number of records counted and never
//! divide by zero.

use jobage_schema::{AggregationRow, BandCatalog, Dimension, FrequencyTable, RecordField, RecordView};
use std::collections::HashMap;

/// Anything that carries an already-assigned duration band.
///
/// `None` means the record has no band (unparseable or rejected duration)
/// and is left out of duration tables.
pub trait BandView {
    fn band(&self) -> Option<usize>;
}

impl<T: BandView + ?Sized> BandView for &T {
    fn band(&self) -> Option<usize> {
        (**self).band()
    }
}

/// `count / total * 100`, rounded half-to-even to one decimal place; 0 when
/// `total` is 0.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 / total as f64 * 100.0;
    (raw * 10.0).round_ties_even() / 10.0
}

fn rows(counts: impl IntoIterator<Item = (String, usize)>, total: usize) -> Vec<AggregationRow> {
    counts
        .into_iter()
        .map(|(category, count)| AggregationRow {
            category,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Duration table from band indices.
///
/// The result always has exactly `catalog.len()` rows in catalog order.
/// Indices outside the catalog are ignored.
pub fn duration_table(catalog: &BandCatalog, bands: impl IntoIterator<Item = usize>) -> FrequencyTable {
    let mut counts = vec![0usize; catalog.len()];
    for index in bands {
        if let Some(slot) = counts.get_mut(index) {
            *slot += 1;
        }
    }
    let total = counts.iter().sum();
    let labelled = catalog
        .labels()
        .map(str::to_string)
        .zip(counts)
        .collect::<Vec<_>>();
    FrequencyTable {
        dimension: Dimension::DurationBand,
        total,
        rows: rows(labelled, total),
    }
}

/// Counts values while remembering the order they were first seen.
#[derive(Debug, Default)]
pub struct KeyedCounter<'a> {
    index: HashMap<&'a str, usize>,
    counts: Vec<(&'a str, usize)>,
}

impl<'a> KeyedCounter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &'a str) {
        match self.index.get(key) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(key, self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn get(&self, key: &str) -> usize {
        self.index.get(key).map_or(0, |&i| self.counts[i].1)
    }

    /// Entries by descending count; equal counts keep first-seen order.
    pub fn ranked(&self) -> Vec<(&'a str, usize)> {
        let mut ranked = self.counts.clone();
        // sort_by is stable, which is what keeps the first-seen tie-break.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

impl<'a> FromIterator<&'a str> for KeyedCounter<'a> {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut counter = Self::new();
        for key in iter {
            counter.add(key);
        }
        counter
    }
}

/// Categorical table for `field` from the grouped values of a subset.
pub fn category_table<'a>(field: RecordField, values: impl IntoIterator<Item = &'a str>) -> FrequencyTable {
    let counter: KeyedCounter<'a> = values.into_iter().collect();
    let total = counter.total();
    let ranked = counter
        .ranked()
        .into_iter()
        .map(|(k, c)| (k.to_string(), c));
    FrequencyTable {
        dimension: Dimension::Category(field),
        total,
        rows: rows(ranked, total),
    }
}

/// Aggregate a record subset along `dimension`.
///
/// For the duration dimension, items without a band are not counted, so the
/// table total is `items.len()` minus the excluded records. Categorical
/// dimensions count every item; missing values group as `"Unspecified"`.
pub fn aggregate<T>(items: &[T], dimension: Dimension, catalog: &BandCatalog) -> FrequencyTable
where
    T: RecordView + BandView,
{
    match dimension {
        Dimension::DurationBand => duration_table(catalog, items.iter().filter_map(|i| i.band())),
        Dimension::Category(field) => {
            category_table(field, items.iter().map(|i| i.record().category(field)))
        }
    }
}
