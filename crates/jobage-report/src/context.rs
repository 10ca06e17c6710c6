use crate::scope::BandScope;
use crate::summary::CenterSummary;
use chrono::NaiveDateTime;
use jobage_aggregator::{BandView, aggregate};
use jobage_bucket::Bucketer;
use jobage_config::EngineConfig;
use jobage_duration::pending_days;
use jobage_error::{EngineError, Result};
use jobage_filter::{PredicateSet, apply};
use jobage_schema::{
    BandCatalog, Dimension, DisplayRow, FrequencyTable, OrderId, RecordField, RecordView, ServiceRecord,
};
use serde::{Deserialize, Serialize};

/// A record of the active subset together with its derived duration.
///
/// Derivation happens once per report; every table reads from here.
#[derive(Clone, Debug)]
pub struct DerivedRecord<'a> {
    pub record: &'a ServiceRecord,
    /// Whole days pending, when the creation time parsed.
    pub pending_days: Option<i64>,
    /// Band index, when the record takes part in duration views.
    pub band: Option<usize>,
    /// Why the record is left out of duration views.
    pub exclusion: Option<EngineError>,
}

impl<'a> DerivedRecord<'a> {
    pub fn derive(record: &'a ServiceRecord, reference: NaiveDateTime, bucketer: &Bucketer<'_>) -> Self {
        match pending_days(record, reference) {
            Err(err) => Self {
                record,
                pending_days: None,
                band: None,
                exclusion: Some(err),
            },
            Ok(days) => {
                let (band, exclusion) = match bucketer.assign(days) {
                    Ok(band) => (Some(band), None),
                    Err(err) => (None, Some(err)),
                };
                Self {
                    record,
                    pending_days: Some(days),
                    band,
                    exclusion,
                }
            }
        }
    }
}

impl RecordView for DerivedRecord<'_> {
    fn record(&self) -> &ServiceRecord {
        self.record
    }
}

impl BandView for DerivedRecord<'_> {
    fn band(&self) -> Option<usize> {
        self.band
    }
}

/// A record left out of duration views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedRecord {
    pub order_id: OrderId,
    pub reason: String,
}

/// Records of the active subset that have no duration band.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusions {
    pub invalid_timestamps: usize,
    pub negative_durations: usize,
    pub records: Vec<ExcludedRecord>,
}

impl Exclusions {
    pub fn total(&self) -> usize {
        self.invalid_timestamps + self.negative_durations
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Everything one report invocation needs, derived once.
///
/// Borrows the loaded records; the active subset is the records matching
/// `filters` under the configured exclusion rules.
#[derive(Debug)]
pub struct ReportContext<'a> {
    records: &'a [ServiceRecord],
    config: &'a EngineConfig,
    catalog: BandCatalog,
    filters: PredicateSet,
    reference: NaiveDateTime,
    filter_error: Option<EngineError>,
    derived: Vec<DerivedRecord<'a>>,
}

impl<'a> ReportContext<'a> {
    pub fn new(
        records: &'a [ServiceRecord],
        config: &'a EngineConfig,
        filters: PredicateSet,
        reference: NaiveDateTime,
    ) -> Result<Self> {
        let catalog = config.band_catalog()?;
        config.check_main_centers()?;
        let filter_error = filters.validate(&config.exclusion_rules).err();
        let bucketer = Bucketer::new(&catalog, config.negative_durations);
        let derived: Vec<_> = apply(records, &filters, &config.exclusion_rules)
            .into_iter()
            .map(|record| DerivedRecord::derive(record, reference, &bucketer))
            .collect();

        tracing::debug!(
            loaded = records.len(),
            active = derived.len(),
            filters = %filters,
            %reference,
            "report context derived"
        );

        Ok(Self {
            records,
            config,
            catalog,
            filters,
            reference,
            filter_error,
            derived,
        })
    }

    pub fn records(&self) -> &'a [ServiceRecord] {
        self.records
    }

    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    pub fn catalog(&self) -> &BandCatalog {
        &self.catalog
    }

    pub fn filters(&self) -> &PredicateSet {
        &self.filters
    }

    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    /// Set when the filters combine values an exclusion rule forbids.
    pub fn filter_error(&self) -> Option<&EngineError> {
        self.filter_error.as_ref()
    }

    pub fn derived(&self) -> &[DerivedRecord<'a>] {
        &self.derived
    }

    /// The active subset, in input order.
    pub fn filtered_records(&self) -> Vec<&'a ServiceRecord> {
        self.derived.iter().map(|d| d.record).collect()
    }

    fn in_scope(&self, scope: &BandScope, record: &ServiceRecord) -> bool {
        let center = record.category(RecordField::ServiceCenter);
        match scope {
            BandScope::Overall => true,
            BandScope::Center(name) => center == name,
            BandScope::OtherCenters => !self.config.is_main_center(center),
        }
    }

    /// Active records inside `scope`, in input order.
    pub fn members(&self, scope: &BandScope) -> Vec<&DerivedRecord<'a>> {
        self.derived
            .iter()
            .filter(|d| self.in_scope(scope, d.record))
            .collect()
    }

    pub fn duration_table(&self, scope: &BandScope) -> FrequencyTable {
        aggregate(&self.members(scope), Dimension::DurationBand, &self.catalog)
    }

    pub fn category_table(&self, scope: &BandScope, field: RecordField) -> FrequencyTable {
        aggregate(&self.members(scope), Dimension::Category(field), &self.catalog)
    }

    pub fn status_table(&self, scope: &BandScope) -> FrequencyTable {
        self.category_table(scope, RecordField::Status)
    }

    /// Display rows of the records in `scope` whose band is `band_label`.
    pub fn records_in_band(&self, scope: &BandScope, band_label: &str) -> Result<Vec<DisplayRow>> {
        let index = self.catalog.index_of(band_label)?;
        Ok(self
            .members(scope)
            .into_iter()
            .filter(|d| d.band == Some(index))
            .map(|d| d.record.display_row())
            .collect())
    }

    /// Summary over every loaded record, ignoring the filters.
    pub fn center_summary(&self) -> CenterSummary {
        CenterSummary::compute(self.records, &self.config.main_centers)
    }

    pub fn exclusions(&self) -> Exclusions {
        let mut exclusions = Exclusions::default();
        for d in &self.derived {
            let Some(err) = &d.exclusion else { continue };
            match err {
                EngineError::InvalidTimestamp { .. } | EngineError::MissingRequiredField { .. } => {
                    exclusions.invalid_timestamps += 1
                }
                EngineError::InvalidDuration { .. } => exclusions.negative_durations += 1,
                _ => {}
            }
            tracing::debug!(
                order = %d.record.order_id,
                category = %err.category(),
                %err,
                "excluded from duration views"
            );
            exclusions.records.push(ExcludedRecord {
                order_id: d.record.order_id.clone(),
                reason: err.to_string(),
            });
        }
        exclusions
    }
}
