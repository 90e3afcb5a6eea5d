/// Rejected construction of a state record.
///
/// Identity-defining fields are never clamped; out-of-range input fails here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    #[error("invalid {field}: {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl StateError {
    pub fn check_positive(field: &'static str, value: f64) -> Result<f64, StateError> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(StateError::InvalidValue {
                field,
                value,
                reason: "must be finite and > 0",
            })
        }
    }

    pub fn check_non_negative(field: &'static str, value: f64) -> Result<f64, StateError> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(StateError::InvalidValue {
                field,
                value,
                reason: "must be finite and >= 0",
            })
        }
    }

    pub fn check_finite(field: &'static str, value: f64) -> Result<f64, StateError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(StateError::InvalidValue {
                field,
                value,
                reason: "must be finite",
            })
        }
    }
}
