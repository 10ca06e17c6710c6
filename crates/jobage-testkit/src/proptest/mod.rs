//! Proptest strategies for jobage property-based testing
//!
//! Reusable strategies for generating service records across the engine
//! crates.

pub mod strategies;

pub use strategies::{
    strategy_center, strategy_creation_time, strategy_days, strategy_optional, strategy_record,
    strategy_records, strategy_service_type, strategy_status, strategy_valid_record,
    strategy_valid_records, strategy_warranty,
};
