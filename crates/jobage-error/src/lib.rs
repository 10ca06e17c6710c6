//! Error taxonomy for the jobage report engine.
//!
//! Every engine crate returns [`EngineError`]. Timestamp, duration and
//! missing-field errors describe one record, which the report composer
//! leaves out of duration views; the rest fail the operation that raised
//! them.

use std::fmt;
use thiserror::Error;

/// Broad category of an engine error. The CLI maps it to an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Parse,
    Validation,
    Config,
    Query,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Parse => write!(f, "parse"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Query => write!(f, "query"),
        }
    }
}

/// Errors raised by the duration, bucketing, filter, aggregation and report
/// components.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid creation time {value:?} for order {order_id}")]
    InvalidTimestamp { order_id: String, value: String },

    #[error("pending duration of {days} days is outside every duration band")]
    InvalidDuration { days: i64 },

    #[error("filter {excluded} cannot be combined with {when}")]
    InvalidFilterCombination { when: String, excluded: String },

    #[error("order {order_id} has no {field}")]
    MissingRequiredField { order_id: String, field: String },

    #[error("invalid duration band catalog: {0}")]
    InvalidBandCatalog(String),

    #[error("unknown duration band: {0}")]
    UnknownBand(String),

    #[error("unknown record field: {0}")]
    UnknownField(String),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::InvalidTimestamp { .. } => ErrorCategory::Parse,
            EngineError::InvalidDuration { .. } | EngineError::MissingRequiredField { .. } => {
                ErrorCategory::Validation
            }
            EngineError::InvalidFilterCombination { .. }
            | EngineError::UnknownBand(_)
            | EngineError::UnknownField(_) => ErrorCategory::Query,
            EngineError::InvalidBandCatalog(_) | EngineError::InvalidConfig(_) => ErrorCategory::Config,
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_display() {
        assert_eq!(ErrorCategory::Parse.to_string(), "parse");
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::Config.to_string(), "config");
        assert_eq!(ErrorCategory::Query.to_string(), "query");
    }

    #[test]
    fn invalid_timestamp_message_names_order_and_value() {
        let err = EngineError::InvalidTimestamp {
            order_id: "SO-1".into(),
            value: "not a date".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("SO-1"));
        assert!(msg.contains("\"not a date\""));
        assert_eq!(err.category(), ErrorCategory::Parse);
    }

    #[test]
    fn filter_combination_message() {
        let err = EngineError::InvalidFilterCombination {
            when: "warranty_status=OOW".into(),
            excluded: "service_type=Inspection".into(),
        };
        assert_eq!(
            err.to_string(),
            "filter service_type=Inspection cannot be combined with warranty_status=OOW"
        );
        assert_eq!(err.category(), ErrorCategory::Query);
    }

    #[test]
    fn config_errors_share_a_category() {
        assert_eq!(EngineError::InvalidBandCatalog("empty".into()).category(), ErrorCategory::Config);
        let err = EngineError::InvalidConfig("duplicate main center \"A\"".into());
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.to_string(), "invalid engine configuration: duplicate main center \"A\"");
        assert_eq!(EngineError::InvalidDuration { days: -1 }.category(), ErrorCategory::Validation);
    }

    #[test]
    fn converts_into_anyhow() {
        let err: anyhow::Error = EngineError::UnknownField("colour".into()).into();
        assert_eq!(err.to_string(), "unknown record field: colour");
        assert!(err.downcast_ref::<EngineError>().is_some());
    }
}
