use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use jobage_schema::ServiceRecord;

pub mod proptest;

/// Main centers used by the default configuration.
pub const YANGON: &str = "MM-1.Care-MSC-Yangon-Hledan";
pub const MANDALAY: &str = "MM-1.Care-MSC-Mandalay-35street";
pub const MAWLAMYINE: &str = "MM-1.Care-MSC-MawLaMyine";

/// Layout fixtures use for creation times.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed reference instant so fixtures never depend on the clock.
pub fn reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid fixture date")
}

/// Creation time that is exactly `days` whole days before [`reference`],
/// plus one hour so floor arithmetic is exercised.
pub fn created_days_ago(days: i64) -> String {
    (reference() - TimeDelta::days(days) - TimeDelta::hours(1))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Small helpers for building fixtures in tests.
///
/// Keeping these in a microcrate avoids copy-paste across filter, aggregator,
/// and report tests.
#[derive(Clone, Debug)]
pub struct RecordBuilder {
    record: ServiceRecord,
}

impl RecordBuilder {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            record: ServiceRecord::new(order_id, created_days_ago(0)),
        }
    }

    pub fn days_pending(mut self, days: i64) -> Self {
        self.record.creation_time = created_days_ago(days);
        self
    }

    pub fn created(mut self, raw: impl Into<String>) -> Self {
        self.record.creation_time = raw.into();
        self
    }

    pub fn center(mut self, center: impl Into<String>) -> Self {
        self.record.service_center = Some(center.into());
        self
    }

    pub fn warranty(mut self, warranty: impl Into<String>) -> Self {
        self.record.warranty_status = Some(warranty.into());
        self
    }

    pub fn service_type(mut self, service_type: impl Into<String>) -> Self {
        self.record.service_type = Some(service_type.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.record.status = Some(status.into());
        self
    }

    pub fn engineer(mut self, engineer: impl Into<String>) -> Self {
        self.record.engineer = Some(engineer.into());
        self
    }

    pub fn parts_status(mut self, parts: impl Into<String>) -> Self {
        self.record.parts_picking_status = Some(parts.into());
        self
    }

    pub fn comments(mut self, comments: impl Into<String>) -> Self {
        self.record.comments = Some(comments.into());
        self
    }

    pub fn build(self) -> ServiceRecord {
        self.record
    }
}

/// One record per entry of `days`, ids `SO-0001`, `SO-0002`, ...
pub fn records_with_days(days: &[i64]) -> Vec<ServiceRecord> {
    days.iter()
        .enumerate()
        .map(|(i, d)| RecordBuilder::new(format!("SO-{:04}", i + 1)).days_pending(*d).build())
        .collect()
}

/// Ten records: three pending 2 days, four pending 4 days, three pending 60.
pub fn ten_record_scenario() -> Vec<ServiceRecord> {
    records_with_days(&[2, 2, 2, 4, 4, 4, 4, 60, 60, 60])
}

/// Mixed fixture across main centers, warranty, and service types.
pub fn mixed_centers() -> Vec<ServiceRecord> {
    vec![
        RecordBuilder::new("SO-1001")
            .days_pending(1)
            .center(YANGON)
            .warranty("IW")
            .service_type("Repair")
            .status("Pending Parts")
            .engineer("Aung")
            .build(),
        RecordBuilder::new("SO-1002")
            .days_pending(4)
            .center(YANGON)
            .warranty("OOW")
            .service_type("Repair")
            .status("In Repair")
            .engineer("Aung")
            .parts_status("Picked")
            .build(),
        RecordBuilder::new("SO-1003")
            .days_pending(12)
            .center(MANDALAY)
            .warranty("IW")
            .service_type("Inspection")
            .status("Pending Parts")
            .engineer("Hla")
            .build(),
        RecordBuilder::new("SO-1004")
            .days_pending(35)
            .center("MM-2.Partner-Bago")
            .warranty("OOW")
            .service_type("Repair")
            .status("Waiting Customer")
            .comments("customer abroad")
            .build(),
        RecordBuilder::new("SO-1005")
            .days_pending(70)
            .center("MM-2.Partner-Taunggyi")
            .warranty("IW")
            .service_type("Repair")
            .status("Pending Parts")
            .build(),
        RecordBuilder::new("SO-1006")
            .created("not a timestamp")
            .center(MANDALAY)
            .warranty("IW")
            .service_type("Repair")
            .status("In Repair")
            .build(),
    ]
}
