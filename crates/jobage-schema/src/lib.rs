//! Canonical data model for the jobage report engine.
//!
//! Defines the service-order record, the duration band catalog, and the
//! frequency-table shapes the aggregator produces. Every other crate depends
//! on these types.

pub mod band;
pub mod record;
pub mod table;

pub use band::{BandCatalog, DurationBand};
pub use record::{DisplayRow, OrderId, RecordField, RecordView, ServiceRecord, UNSPECIFIED};
pub use table::{AggregationRow, Dimension, FrequencyTable};
