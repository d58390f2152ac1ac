//! Geometry construction errors.

use nc_core::NcError;
use thiserror::Error;

pub type GeometryResult<T> = Result<T, GeometryError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Caller supplied a parameter outside its allowed range.
    #[error("Invalid argument: {what} = {value}")]
    InvalidArg { what: &'static str, value: f64 },

    #[error("Unsupported bell length class: {percent}% (expected 60, 70, 80, 90 or 100)")]
    UnsupportedPercent { percent: u32 },

    /// A derived dimension came out zero, negative or non-finite.
    #[error("Non-physical geometry: {what} = {value}")]
    NonPhysical { what: &'static str, value: f64 },

    #[error("Degenerate construction: {what}")]
    Degenerate { what: &'static str },

    #[error("Rao coefficient table error: {message}")]
    Table { message: String },

    #[error("Calibration failed: {message}")]
    Calibration { message: String },
}

impl GeometryError {
    /// True for errors caused by the caller's parameters rather than by the
    /// construction itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            GeometryError::InvalidArg { .. }
                | GeometryError::UnsupportedPercent { .. }
                | GeometryError::Table { .. }
        )
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            GeometryError::InvalidArg { value, .. } | GeometryError::NonPhysical { value, .. } => {
                Some(*value)
            }
            GeometryError::UnsupportedPercent { percent } => Some(f64::from(*percent)),
            _ => None,
        }
    }
}

impl From<NcError> for GeometryError {
    fn from(e: NcError) -> Self {
        GeometryError::NonPhysical {
            what: e.what(),
            value: e.value().unwrap_or(f64::NAN),
        }
    }
}

impl From<serde_json::Error> for GeometryError {
    fn from(e: serde_json::Error) -> Self {
        GeometryError::Table {
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for GeometryError {
    fn from(e: std::io::Error) -> Self {
        GeometryError::Table {
            message: e.to_string(),
        }
    }
}
