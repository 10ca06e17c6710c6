use crate::{MANDALAY, MAWLAMYINE, YANGON, created_days_ago};
use jobage_schema::ServiceRecord;
use proptest::prelude::*;

// ============================================================================
// Field Strategies
// ============================================================================

/// Wrap a value strategy so roughly one draw in six is missing.
pub fn strategy_optional<S>(inner: S) -> impl Strategy<Value = Option<String>>
where
    S: Strategy<Value = String>,
{
    prop_oneof![
        5 => inner.prop_map(Some),
        1 => Just(None),
    ]
}

/// Pending days, mostly spread over every standard band.
pub fn strategy_days() -> impl Strategy<Value = i64> {
    prop_oneof![
        4 => 0i64..60,
        1 => 60i64..2_000,
    ]
}

pub fn strategy_center() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(YANGON.to_string()),
        Just(MANDALAY.to_string()),
        Just(MAWLAMYINE.to_string()),
        "MM-2\\.Partner-[A-Z][a-z]{3,8}",
    ]
}

pub fn strategy_warranty() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => Just("IW".to_string()),
        4 => Just("OOW".to_string()),
        1 => Just("Extended".to_string()),
    ]
}

pub fn strategy_service_type() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => Just("Repair".to_string()),
        3 => Just("Inspection".to_string()),
        1 => Just("Installation".to_string()),
    ]
}

pub fn strategy_status() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Pending Parts".to_string()),
        Just("In Repair".to_string()),
        Just("Waiting Customer".to_string()),
        Just("Ready for Pickup".to_string()),
    ]
}

/// Creation time text: usually a parseable timestamp, sometimes garbage.
pub fn strategy_creation_time() -> impl Strategy<Value = String> {
    prop_oneof![
        9 => strategy_days().prop_map(created_days_ago),
        1 => prop_oneof![Just(String::new()), Just("n/a".to_string()), "[a-z]{1,10}"],
    ]
}

// ============================================================================
// Record Strategies
// ============================================================================

fn record_from(
    index: usize,
    creation_time: String,
    fields: (
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
    ),
) -> ServiceRecord {
    let (center, warranty, service_type, status, parts) = fields;
    ServiceRecord {
        service_center: center,
        warranty_status: warranty,
        service_type,
        status,
        parts_picking_status: parts,
        engineer: Some(format!("eng-{}", index % 7)),
        ..ServiceRecord::new(format!("SO-{index:05}"), creation_time)
    }
}

fn strategy_fields() -> impl Strategy<
    Value = (
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
    ),
> {
    (
        strategy_optional(strategy_center()),
        strategy_optional(strategy_warranty()),
        strategy_optional(strategy_service_type()),
        strategy_optional(strategy_status()),
        strategy_optional(prop_oneof![
            Just("Picked".to_string()),
            Just("Not Picked".to_string())
        ]),
    )
}

/// A record whose creation time may be unparseable.
pub fn strategy_record() -> impl Strategy<Value = ServiceRecord> {
    (0usize..100_000, strategy_creation_time(), strategy_fields())
        .prop_map(|(i, created, fields)| record_from(i, created, fields))
}

/// A record with a parseable, non-future creation time.
pub fn strategy_valid_record() -> impl Strategy<Value = ServiceRecord> {
    (0usize..100_000, strategy_days(), strategy_fields())
        .prop_map(|(i, days, fields)| record_from(i, created_days_ago(days), fields))
}

/// Up to `max` records with unique, ordered ids.
pub fn strategy_records(max: usize) -> impl Strategy<Value = Vec<ServiceRecord>> {
    prop::collection::vec(strategy_record(), 0..=max).prop_map(renumber)
}

/// Up to `max` records that all have valid creation times.
pub fn strategy_valid_records(max: usize) -> impl Strategy<Value = Vec<ServiceRecord>> {
    prop::collection::vec(strategy_valid_record(), 0..=max).prop_map(renumber)
}

fn renumber(mut records: Vec<ServiceRecord>) -> Vec<ServiceRecord> {
    for (i, r) in records.iter_mut().enumerate() {
        r.order_id.0 = format!("SO-{:05}", i + 1);
    }
    records
}
