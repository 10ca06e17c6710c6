use jobage_error::EngineError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category used for records that have no value for a grouped field.
///
/// Grouping never drops a record, so the sum of grouped counts always
/// reconciles with the subset size.
pub const UNSPECIFIED: &str = "Unspecified";

/// Service order number as it appears in the source table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One service-order row.
///
/// Field names accept both snake_case and the column headers of the
/// service-order spreadsheet export, so JSON and CSV sources share this type.
/// Blank cells deserialize as `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    #[serde(alias = "Service Order Number")]
    pub order_id: OrderId,
    /// Raw creation time text. Parsed per report so that an unreadable value
    /// only excludes this record from duration views.
    #[serde(alias = "Creation Time", default)]
    pub creation_time: String,
    #[serde(alias = "服务网点", default, deserialize_with = "blank_as_none")]
    pub service_center: Option<String>,
    #[serde(alias = "保内/保外", default, deserialize_with = "blank_as_none")]
    pub warranty_status: Option<String>,
    #[serde(alias = "Service Type", default, deserialize_with = "blank_as_none")]
    pub service_type: Option<String>,
    #[serde(alias = "Service Order Status", default, deserialize_with = "blank_as_none")]
    pub status: Option<String>,
    #[serde(alias = "Engineer", default, deserialize_with = "blank_as_none")]
    pub engineer: Option<String>,
    #[serde(alias = "Picking Parts Status", default, deserialize_with = "blank_as_none")]
    pub parts_picking_status: Option<String>,
    #[serde(alias = "Comments", default, deserialize_with = "blank_as_none")]
    pub comments: Option<String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

impl ServiceRecord {
    pub fn new(order_id: impl Into<String>, creation_time: impl Into<String>) -> Self {
        Self {
            order_id: OrderId(order_id.into()),
            creation_time: creation_time.into(),
            ..Self::default()
        }
    }

    /// Raw value of a categorical field, if present.
    pub fn field(&self, field: RecordField) -> Option<&str> {
        let value = match field {
            RecordField::ServiceCenter => &self.service_center,
            RecordField::WarrantyStatus => &self.warranty_status,
            RecordField::ServiceType => &self.service_type,
            RecordField::Status => &self.status,
            RecordField::PartsPickingStatus => &self.parts_picking_status,
            RecordField::Engineer => &self.engineer,
        };
        value.as_deref()
    }

    /// Grouping category for a field; missing values fall into [`UNSPECIFIED`].
    pub fn category(&self, field: RecordField) -> &str {
        self.field(field).unwrap_or(UNSPECIFIED)
    }

    pub fn display_row(&self) -> DisplayRow {
        DisplayRow {
            order_id: self.order_id.clone(),
            creation_time: self.creation_time.clone(),
            service_center: self.category(RecordField::ServiceCenter).to_string(),
            status: self.category(RecordField::Status).to_string(),
            engineer: self.engineer.clone().unwrap_or_default(),
            warranty_status: self.category(RecordField::WarrantyStatus).to_string(),
            parts_picking_status: self.parts_picking_status.clone().unwrap_or_default(),
            service_type: self.category(RecordField::ServiceType).to_string(),
            comments: self.comments.clone().unwrap_or_default(),
        }
    }
}

/// Anything that wraps a [`ServiceRecord`].
///
/// Lets filters and aggregations run over plain records and over records
/// carrying derived fields with the same code.
pub trait RecordView {
    fn record(&self) -> &ServiceRecord;
}

impl RecordView for ServiceRecord {
    fn record(&self) -> &ServiceRecord {
        self
    }
}

impl<T: RecordView + ?Sized> RecordView for &T {
    fn record(&self) -> &ServiceRecord {
        (**self).record()
    }
}

/// Categorical fields of a [`ServiceRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    ServiceCenter,
    WarrantyStatus,
    ServiceType,
    Status,
    PartsPickingStatus,
    Engineer,
}

impl RecordField {
    pub const ALL: [RecordField; 6] = [
        RecordField::ServiceCenter,
        RecordField::WarrantyStatus,
        RecordField::ServiceType,
        RecordField::Status,
        RecordField::PartsPickingStatus,
        RecordField::Engineer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::ServiceCenter => "service_center",
            RecordField::WarrantyStatus => "warranty_status",
            RecordField::ServiceType => "service_type",
            RecordField::Status => "status",
            RecordField::PartsPickingStatus => "parts_picking_status",
            RecordField::Engineer => "engineer",
        }
    }

    /// Column header used by the spreadsheet export.
    pub fn column_header(&self) -> &'static str {
        match self {
            RecordField::ServiceCenter => "服务网点",
            RecordField::WarrantyStatus => "保内/保外",
            RecordField::ServiceType => "Service Type",
            RecordField::Status => "Service Order Status",
            RecordField::PartsPickingStatus => "Picking Parts Status",
            RecordField::Engineer => "Engineer",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        RecordField::ALL
            .into_iter()
            .find(|f| f.as_str() == normalized || f.column_header() == s.trim())
            .ok_or_else(|| EngineError::UnknownField(s.to_string()))
    }
}

/// Display fields listed when drilling into a duration band.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub order_id: OrderId,
    pub creation_time: String,
    pub service_center: String,
    pub status: String,
    pub engineer: String,
    pub warranty_status: String,
    pub parts_picking_status: String,
    pub service_type: String,
    pub comments: String,
}
