//! Report composition for jobage.
//!
//! A [`ReportContext`] derives pending durations and bands for the active
//! subset once; [`build_report`] turns it into a [`Report`] holding the
//! center summary, aging tables per scope, status tables, and any requested
//! drill-downs.

mod context;
mod scope;
mod summary;

pub use context::{DerivedRecord, ExcludedRecord, Exclusions, ReportContext};
pub use scope::{BandScope, BandSelection};
pub use summary::{CenterKind, CenterShare, CenterSummary};

use chrono::NaiveDateTime;
use jobage_config::EngineConfig;
use jobage_duration::reference_now;
use jobage_error::Result;
use jobage_filter::PredicateSet;
use jobage_schema::{DisplayRow, FrequencyTable, ServiceRecord};
use serde::{Deserialize, Serialize};

/// Inputs of one report beyond the records and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub filters: PredicateSet,
    pub reference: NaiveDateTime,
    #[serde(default)]
    pub selections: Vec<BandSelection>,
}

impl ReportRequest {
    pub fn new(reference: NaiveDateTime) -> Self {
        Self {
            filters: PredicateSet::new(),
            reference,
            selections: Vec::new(),
        }
    }

    /// Request anchored at the local wall clock.
    pub fn now() -> Self {
        Self::new(reference_now())
    }

    pub fn with_filters(mut self, filters: PredicateSet) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_selection(mut self, selection: BandSelection) -> Self {
        self.selections.push(selection);
        self
    }
}

/// A frequency table bound to the scope it was computed over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedTable {
    pub scope: BandScope,
    pub table: FrequencyTable,
}

/// Records of one band within one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillDown {
    pub selection: BandSelection,
    pub rows: Vec<DisplayRow>,
}

/// Complete output of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub reference: NaiveDateTime,
    pub filters: PredicateSet,
    /// Records loaded, before filtering.
    pub total_records: usize,
    /// Records in the active subset.
    pub filtered_records: usize,
    pub center_summary: CenterSummary,
    pub exclusions: Exclusions,
    pub warnings: Vec<String>,
    pub overall_duration: FrequencyTable,
    /// One table per configured main center, in configured order.
    pub center_durations: Vec<ScopedTable>,
    pub other_centers_duration: FrequencyTable,
    pub overall_status: FrequencyTable,
    /// Main centers in configured order, then Other Centers.
    pub status_by_center: Vec<ScopedTable>,
    pub drill_downs: Vec<DrillDown>,
}

impl Report {
    pub fn center_duration(&self, center: &str) -> Option<&FrequencyTable> {
        find_scoped(&self.center_durations, &BandScope::center(center))
    }

    pub fn status_for(&self, scope: &BandScope) -> Option<&FrequencyTable> {
        find_scoped(&self.status_by_center, scope)
    }
}

fn find_scoped<'r>(tables: &'r [ScopedTable], scope: &BandScope) -> Option<&'r FrequencyTable> {
    tables.iter().find(|t| t.scope == *scope).map(|t| &t.table)
}

impl ReportContext<'_> {
    /// Compose the report, resolving each selection into a drill-down.
    ///
    /// An unknown band label in `selections` fails the whole report.
    pub fn report(&self, selections: &[BandSelection]) -> Result<Report> {
        let drill_downs = selections
            .iter()
            .map(|selection| {
                Ok(DrillDown {
                    rows: self.records_in_band(&selection.scope, &selection.band)?,
                    selection: selection.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let main_scopes: Vec<BandScope> = self
            .config()
            .main_centers
            .iter()
            .map(BandScope::center)
            .collect();

        let center_durations = main_scopes
            .iter()
            .map(|scope| ScopedTable {
                scope: scope.clone(),
                table: self.duration_table(scope),
            })
            .collect();

        let status_by_center = main_scopes
            .iter()
            .chain(std::iter::once(&BandScope::OtherCenters))
            .map(|scope| ScopedTable {
                scope: scope.clone(),
                table: self.status_table(scope),
            })
            .collect();

        let exclusions = self.exclusions();
        let mut warnings = Vec::new();
        if let Some(err) = self.filter_error() {
            tracing::warn!(%err, "filters can never match; all views are empty");
            warnings.push(err.to_string());
        }
        if !exclusions.is_empty() {
            tracing::info!(
                invalid_timestamps = exclusions.invalid_timestamps,
                negative_durations = exclusions.negative_durations,
                "records left out of duration tables"
            );
            warnings.push(format!(
                "{} record(s) left out of duration tables: {} invalid creation time(s), {} creation time(s) after the reference",
                exclusions.total(),
                exclusions.invalid_timestamps,
                exclusions.negative_durations
            ));
        }

        let report = Report {
            reference: self.reference(),
            filters: self.filters().clone(),
            total_records: self.records().len(),
            filtered_records: self.derived().len(),
            center_summary: self.center_summary(),
            exclusions,
            warnings,
            overall_duration: self.duration_table(&BandScope::Overall),
            center_durations,
            other_centers_duration: self.duration_table(&BandScope::OtherCenters),
            overall_status: self.status_table(&BandScope::Overall),
            status_by_center,
            drill_downs,
        };
        tracing::info!(
            total = report.total_records,
            filtered = report.filtered_records,
            drill_downs = report.drill_downs.len(),
            "report built"
        );
        Ok(report)
    }
}

/// Build a report for `records` in one call.
pub fn build_report(records: &[ServiceRecord], request: &ReportRequest, config: &EngineConfig) -> Result<Report> {
    ReportContext::new(records, config, request.filters.clone(), request.reference)?.report(&request.selections)
}
