use thiserror::Error;

pub type NcResult<T> = Result<T, NcError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NcError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Non-positive value for {what}: {value}")]
    NonPositive { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl NcError {
    /// Offending numeric value, when the error carries one.
    pub fn value(&self) -> Option<f64> {
        match self {
            NcError::NonFinite { value, .. } | NcError::NonPositive { value, .. } => Some(*value),
            NcError::InvalidArg { .. } => None,
        }
    }

    /// Name of the quantity the error refers to.
    pub fn what(&self) -> &'static str {
        match self {
            NcError::NonFinite { what, .. }
            | NcError::NonPositive { what, .. }
            | NcError::InvalidArg { what } => what,
        }
    }
}
