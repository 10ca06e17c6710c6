//! Categorical filtering of service records.
//!
//! A [`PredicateSet`] holds one [`Selection`] per filterable field. Selections
//! combine with logical AND and `All` imposes no constraint. Domain rules that
//! forbid certain combinations (out-of-warranty units are never inspected)
//! are expressed as [`ExclusionRule`]s: they narrow the options offered for a
//! field and turn an impossible predicate set into an empty result.

use jobage_error::{EngineError, Result};
use jobage_schema::{RecordField, RecordView, ServiceRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel selection value meaning "no constraint".
pub const ALL: &str = "All";

/// Accepted value for one field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selection::All => ALL,
            Selection::Only(v) => v,
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        Selection::from(value.as_str())
    }
}

impl From<Selection> for String {
    fn from(value: Selection) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields a predicate set may constrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    WarrantyStatus,
    ServiceType,
    ServiceCenter,
    PartsPickingStatus,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [
        FilterField::WarrantyStatus,
        FilterField::ServiceType,
        FilterField::ServiceCenter,
        FilterField::PartsPickingStatus,
    ];

    pub fn record_field(&self) -> RecordField {
        match self {
            FilterField::WarrantyStatus => RecordField::WarrantyStatus,
            FilterField::ServiceType => RecordField::ServiceType,
            FilterField::ServiceCenter => RecordField::ServiceCenter,
            FilterField::PartsPickingStatus => RecordField::PartsPickingStatus,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.record_field().fmt(f)
    }
}

impl TryFrom<RecordField> for FilterField {
    type Error = EngineError;

    fn try_from(field: RecordField) -> Result<Self> {
        FilterField::ALL
            .into_iter()
            .find(|f| f.record_field() == field)
            .ok_or_else(|| EngineError::UnknownField(format!("{field} is not filterable")))
    }
}

impl FromStr for FilterField {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<RecordField>().and_then(FilterField::try_from)
    }
}

/// One selection per filterable field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateSet {
    #[serde(default)]
    pub warranty_status: Selection,
    #[serde(default)]
    pub service_type: Selection,
    #[serde(default)]
    pub service_center: Selection,
    #[serde(default)]
    pub parts_picking_status: Selection,
}

impl PredicateSet {
    /// Unconstrained predicate set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(field name, value)` pairs; unknown field names are errors.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        pairs.into_iter().try_fold(Self::new(), |set, (field, value)| {
            Ok(set.with(field.parse()?, value))
        })
    }

    pub fn with(mut self, field: FilterField, value: impl Into<Selection>) -> Self {
        *self.selection_mut(field) = value.into();
        self
    }

    pub fn with_warranty(self, value: impl Into<Selection>) -> Self {
        self.with(FilterField::WarrantyStatus, value)
    }

    pub fn with_service_type(self, value: impl Into<Selection>) -> Self {
        self.with(FilterField::ServiceType, value)
    }

    pub fn with_center(self, value: impl Into<Selection>) -> Self {
        self.with(FilterField::ServiceCenter, value)
    }

    pub fn with_parts_status(self, value: impl Into<Selection>) -> Self {
        self.with(FilterField::PartsPickingStatus, value)
    }

    pub fn selection(&self, field: FilterField) -> &Selection {
        match field {
            FilterField::WarrantyStatus => &self.warranty_status,
            FilterField::ServiceType => &self.service_type,
            FilterField::ServiceCenter => &self.service_center,
            FilterField::PartsPickingStatus => &self.parts_picking_status,
        }
    }

    fn selection_mut(&mut self, field: FilterField) -> &mut Selection {
        match field {
            FilterField::WarrantyStatus => &mut self.warranty_status,
            FilterField::ServiceType => &mut self.service_type,
            FilterField::ServiceCenter => &mut self.service_center,
            FilterField::PartsPickingStatus => &mut self.parts_picking_status,
        }
    }

    /// Constrained fields with their accepted value.
    pub fn active(&self) -> impl Iterator<Item = (FilterField, &str)> {
        FilterField::ALL.into_iter().filter_map(|f| match self.selection(f) {
            Selection::All => None,
            Selection::Only(v) => Some((f, v.as_str())),
        })
    }

    pub fn is_unconstrained(&self) -> bool {
        self.active().next().is_none()
    }

    /// Check a record against every selection.
    ///
    /// Missing record values are compared as `"Unspecified"`.
    pub fn matches(&self, record: &ServiceRecord) -> bool {
        FilterField::ALL
            .into_iter()
            .all(|f| self.selection(f).matches(record.category(f.record_field())))
    }

    /// First rule this predicate set violates, as an error.
    pub fn validate(&self, rules: &[ExclusionRule]) -> Result<()> {
        match rules.iter().find(|r| r.violated_by(self)) {
            Some(rule) => Err(rule.to_error()),
            None => Ok(()),
        }
    }
}

impl fmt::Display for PredicateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unconstrained() {
            return f.write_str(ALL);
        }
        for (i, (field, value)) in self.active().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}={value}")?;
        }
        Ok(())
    }
}

/// "When `when_field` is `when_value`, `excluded_field` may not be
/// `excluded_value`."
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub when_field: FilterField,
    pub when_value: String,
    pub excluded_field: FilterField,
    pub excluded_value: String,
}

impl ExclusionRule {
    /// Out-of-warranty units are repaired, never inspected.
    pub fn oow_excludes_inspection() -> Self {
        Self {
            when_field: FilterField::WarrantyStatus,
            when_value: "OOW".into(),
            excluded_field: FilterField::ServiceType,
            excluded_value: "Inspection".into(),
        }
    }

    pub fn default_rules() -> Vec<ExclusionRule> {
        vec![Self::oow_excludes_inspection()]
    }

    fn triggered_by(&self, predicates: &PredicateSet) -> bool {
        matches!(predicates.selection(self.when_field), Selection::Only(v) if *v == self.when_value)
    }

    pub fn violated_by(&self, predicates: &PredicateSet) -> bool {
        self.triggered_by(predicates)
            && matches!(
                predicates.selection(self.excluded_field),
                Selection::Only(v) if *v == self.excluded_value
            )
    }

    pub fn to_error(&self) -> EngineError {
        EngineError::InvalidFilterCombination {
            when: format!("{}={}", self.when_field, self.when_value),
            excluded: format!("{}={}", self.excluded_field, self.excluded_value),
        }
    }
}

/// Records matching every predicate, in input order.
///
/// A predicate set that violates an exclusion rule yields no records rather
/// than an error, so interactive views render empty instead of failing.
pub fn apply<'a, T: RecordView>(
    records: &'a [T],
    predicates: &PredicateSet,
    rules: &[ExclusionRule],
) -> Vec<&'a T> {
    if let Err(err) = predicates.validate(rules) {
        tracing::debug!(%err, "filter combination excluded; view is empty");
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| predicates.matches(r.record()))
        .collect()
}

/// Options offered for `field` given the other current selections.
///
/// Always starts with `"All"`; values excluded by a triggered rule are
/// dropped (with warranty `OOW`, service types narrow to `All, Repair`).
pub fn selectable_options(
    field: FilterField,
    base: &[&str],
    predicates: &PredicateSet,
    rules: &[ExclusionRule],
) -> Vec<String> {
    let excluded: Vec<&str> = rules
        .iter()
        .filter(|r| r.excluded_field == field && r.triggered_by(predicates))
        .map(|r| r.excluded_value.as_str())
        .collect();
    std::iter::once(ALL)
        .chain(base.iter().copied().filter(|v| *v != ALL))
        .filter(|v| !excluded.contains(v))
        .map(str::to_string)
        .collect()
}

/// Distinct values of `field` in first-seen order, for data-driven options.
pub fn distinct_values<T: RecordView>(records: &[T], field: FilterField) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for r in records {
        let value = r.record().category(field.record_field());
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}
