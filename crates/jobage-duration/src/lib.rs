//! Pending-duration calculation for service orders.
//!
//! Parses the timezone-naive creation timestamps found in service-order
//! exports and computes whole elapsed days up to a caller-supplied reference
//! instant. Nothing here reads the clock except [`reference_now`], which the
//! caller invokes once per report.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta};
use jobage_error::{EngineError, Result};
use jobage_schema::ServiceRecord;

const SECONDS_PER_DAY: i64 = 86_400;
const MICROS_PER_DAY: i64 = SECONDS_PER_DAY * 1_000_000;

/// Date-time layouts accepted for creation times, tried in order.
///
/// `%.f` also matches when no fractional part is present.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a creation timestamp.
///
/// Bare dates are taken as midnight. RFC 3339 values keep their wall-clock
/// time and drop the offset, since source data is timezone-naive.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
}

/// Parse the creation time of a record, naming the order on failure.
///
/// A blank creation time is a missing field rather than a bad value.
pub fn parse_creation_time(record: &ServiceRecord) -> Result<NaiveDateTime> {
    if record.creation_time.trim().is_empty() {
        return Err(EngineError::MissingRequiredField {
            order_id: record.order_id.to_string(),
            field: "creation_time".into(),
        });
    }
    parse_timestamp(&record.creation_time).ok_or_else(|| EngineError::InvalidTimestamp {
        order_id: record.order_id.to_string(),
        value: record.creation_time.clone(),
    })
}

/// Whole days elapsed from `creation` to `reference`, floored.
///
/// Flooring applies to negative spans too: a creation time 1 hour after the
/// reference yields `-1`, not `0`.
pub fn compute_pending_days(creation: NaiveDateTime, reference: NaiveDateTime) -> i64 {
    floor_days(reference - creation)
}

fn floor_days(delta: TimeDelta) -> i64 {
    match delta.num_microseconds() {
        Some(us) => us.div_euclid(MICROS_PER_DAY),
        None => delta.num_seconds().div_euclid(SECONDS_PER_DAY),
    }
}

/// Parse and compute in one step.
pub fn pending_days(record: &ServiceRecord, reference: NaiveDateTime) -> Result<i64> {
    let creation = parse_creation_time(record)?;
    let days = compute_pending_days(creation, reference);
    if days < 0 {
        tracing::trace!(order = %record.order_id, days, "creation time is after the reference instant");
    }
    Ok(days)
}

/// Local wall-clock "now", the usual reference instant.
pub fn reference_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn parses_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        for raw in [
            "2025-03-04 10:30:00",
            "2025-03-04T10:30:00",
            "2025/03/04 10:30:00",
            "2025-03-04 10:30",
            "03/04/2025 10:30",
            "  2025-03-04 10:30:00  ",
            "2025-03-04T10:30:00+06:30",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{raw}");
        }
    }

    #[test]
    fn parses_fractional_seconds_and_bare_dates() {
        let t = at("2025-03-04 10:30:00.250");
        assert_eq!(t.and_utc().timestamp_subsec_millis(), 250);
        assert_eq!(at("2025-03-04"), at("2025-03-04 00:00:00"));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2025-13-01"), None);
    }

    #[test]
    fn invalid_timestamp_names_the_order() {
        let record = ServiceRecord::new("SO-77", "n/a");
        let err = parse_creation_time(&record).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTimestamp {
                order_id: "SO-77".into(),
                value: "n/a".into()
            }
        );
    }

    #[test]
    fn blank_creation_time_is_a_missing_field() {
        let record = ServiceRecord::new("SO-78", "  ");
        let err = parse_creation_time(&record).unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingRequiredField {
                order_id: "SO-78".into(),
                field: "creation_time".into()
            }
        );
    }

    #[test]
    fn floors_partial_days() {
        let reference = at("2025-06-10 12:00:00");
        assert_eq!(compute_pending_days(at("2025-06-10 12:00:00"), reference), 0);
        assert_eq!(compute_pending_days(at("2025-06-09 12:00:01"), reference), 0);
        assert_eq!(compute_pending_days(at("2025-06-09 12:00:00"), reference), 1);
        assert_eq!(compute_pending_days(at("2025-06-07 13:00:00"), reference), 2);
        assert_eq!(compute_pending_days(at("2025-06-07 11:00:00"), reference), 3);
    }

    #[test]
    fn future_creation_floors_below_zero() {
        let reference = at("2025-06-10 12:00:00");
        assert_eq!(compute_pending_days(at("2025-06-10 13:00:00"), reference), -1);
        assert_eq!(compute_pending_days(at("2025-06-12 12:00:00"), reference), -2);
    }

    #[test]
    fn pending_days_composes_parse_and_compute() {
        let record = ServiceRecord::new("SO-1", "2025-06-01 08:00:00");
        assert_eq!(pending_days(&record, at("2025-06-11 09:00:00")).unwrap(), 10);
    }

    proptest! {
        #[test]
        fn whole_day_offsets_round_trip(days in 0i64..5_000, secs in 0i64..SECONDS_PER_DAY) {
            let reference = at("2030-01-01 00:00:00");
            let creation = reference - TimeDelta::days(days) - TimeDelta::seconds(secs);
            prop_assert_eq!(compute_pending_days(creation, reference), days);
        }

        #[test]
        fn later_creation_never_increases_days(a in 0i64..1_000_000, b in 0i64..1_000_000) {
            let reference = at("2030-01-01 00:00:00");
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let d_early = compute_pending_days(reference - TimeDelta::minutes(late), reference);
            let d_late = compute_pending_days(reference - TimeDelta::minutes(early), reference);
            prop_assert!(d_early >= d_late);
        }
    }
}
