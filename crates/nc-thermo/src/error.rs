//! Thermochemical provider errors.

use nc_core::NcError;
use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors raised while producing a chamber state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// No data for the requested propellant pair / flow mode.
    #[error("Unknown propellant combination: fuel '{fuel}', oxidizer '{oxidizer}' ({mode})")]
    UnknownPropellant {
        fuel: String,
        oxidizer: String,
        mode: String,
    },

    /// Requested point lies outside the data the provider can answer for.
    #[error("{what} = {value} outside provider range [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Non-physical value in provider data or output.
    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    /// Malformed table data.
    #[error("Invalid thermochemical table: {message}")]
    InvalidTable { message: String },

    /// Backend (solver) failure or non-convergence.
    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("I/O error reading thermochemical table: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for ProviderError {
    fn from(e: std::io::Error) -> Self {
        ProviderError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ProviderError {
    fn from(e: serde_yaml::Error) -> Self {
        ProviderError::InvalidTable {
            message: e.to_string(),
        }
    }
}

impl From<NcError> for ProviderError {
    fn from(e: NcError) -> Self {
        ProviderError::NonPhysical {
            what: e.what(),
            value: e.value().unwrap_or(f64::NAN),
        }
    }
}
