//! Flow relation errors.

use nc_core::NcError;
use thiserror::Error;

pub type FlowResult<T> = Result<T, FlowError>;

/// Errors raised by the isentropic and sizing relations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// Input outside the real-valued domain of a relation (e.g. ambient ≥ chamber pressure).
    #[error("Outside physical domain: {what} = {value}")]
    Domain { what: &'static str, value: f64 },

    /// Derived quantity zero, negative or non-finite where positivity is required.
    #[error("Computation failed: {what} = {value}")]
    Computation { what: &'static str, value: f64 },
}

impl FlowError {
    pub fn what(&self) -> &'static str {
        match self {
            FlowError::Domain { what, .. } | FlowError::Computation { what, .. } => what,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            FlowError::Domain { value, .. } | FlowError::Computation { value, .. } => *value,
        }
    }
}

impl From<NcError> for FlowError {
    fn from(e: NcError) -> Self {
        FlowError::Computation {
            what: e.what(),
            value: e.value().unwrap_or(f64::NAN),
        }
    }
}

impl From<FlowError> for NcError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Domain { what, .. } => NcError::InvalidArg { what },
            FlowError::Computation { what, value } => NcError::NonPositive { what, value },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FlowError::Domain {
            what: "ambient pressure",
            value: 3.0e6,
        };
        assert!(err.to_string().contains("ambient pressure"));
        assert_eq!(err.value(), 3.0e6);
    }

    #[test]
    fn core_errors_become_computation_errors() {
        let err: FlowError = NcError::NonFinite {
            what: "exit velocity",
            value: f64::INFINITY,
        }
        .into();
        assert!(matches!(
            err,
            FlowError::Computation {
                what: "exit velocity",
                ..
            }
        ));
    }
}
