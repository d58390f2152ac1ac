//! Sweep failure taxonomy.
//!
//! Every failure aborts the whole sweep. Per-point failures carry the mixture
//! ratio and the pipeline step that failed.

use nc_flow::FlowError;
use nc_geometry::GeometryError;
use nc_project::ValidationError;
use nc_thermo::ProviderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InputValidation,
    PhysicalValidity,
    Provider,
    Computation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InputValidation => write!(f, "input validation"),
            ErrorKind::PhysicalValidity => write!(f, "physical validity"),
            ErrorKind::Provider => write!(f, "provider"),
            ErrorKind::Computation => write!(f, "computation"),
        }
    }
}

/// Stage of the per-mixture-ratio pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepStep {
    Thermo,
    Isentropic,
    Performance,
    Geometry,
}

impl fmt::Display for SweepStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepStep::Thermo => write!(f, "thermochemistry"),
            SweepStep::Isentropic => write!(f, "isentropic expansion"),
            SweepStep::Performance => write!(f, "performance"),
            SweepStep::Geometry => write!(f, "geometry"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SweepError {
    #[error("Invalid input {field} = {value}: {reason}")]
    InputValidation {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Physically invalid at O/F {mixture_ratio} during {step}: {what} = {value}")]
    PhysicalValidity {
        mixture_ratio: f64,
        step: SweepStep,
        what: String,
        value: f64,
    },

    #[error("Thermochemical provider failed at O/F {mixture_ratio}: {source}")]
    Provider {
        mixture_ratio: f64,
        #[source]
        source: ProviderError,
    },

    #[error("Computation failed at O/F {mixture_ratio} during {step}: {what} = {value}")]
    Computation {
        mixture_ratio: f64,
        step: SweepStep,
        what: String,
        value: f64,
    },
}

pub type SweepResult<T> = Result<T, SweepError>;

impl SweepError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SweepError::InputValidation { .. } => ErrorKind::InputValidation,
            SweepError::PhysicalValidity { .. } => ErrorKind::PhysicalValidity,
            SweepError::Provider { .. } => ErrorKind::Provider,
            SweepError::Computation { .. } => ErrorKind::Computation,
        }
    }

    /// Failing mixture ratio; `None` for input errors raised before the sweep.
    pub fn mixture_ratio(&self) -> Option<f64> {
        match self {
            SweepError::InputValidation { .. } => None,
            SweepError::PhysicalValidity { mixture_ratio, .. }
            | SweepError::Provider { mixture_ratio, .. }
            | SweepError::Computation { mixture_ratio, .. } => Some(*mixture_ratio),
        }
    }

    pub fn step(&self) -> Option<SweepStep> {
        match self {
            SweepError::PhysicalValidity { step, .. } | SweepError::Computation { step, .. } => {
                Some(*step)
            }
            SweepError::Provider { .. } => Some(SweepStep::Thermo),
            SweepError::InputValidation { .. } => None,
        }
    }

    pub(crate) fn provider(mixture_ratio: f64, source: ProviderError) -> Self {
        SweepError::Provider {
            mixture_ratio,
            source,
        }
    }

    pub(crate) fn flow(mixture_ratio: f64, step: SweepStep, e: FlowError) -> Self {
        match e {
            FlowError::Domain { what, value } => SweepError::PhysicalValidity {
                mixture_ratio,
                step,
                what: what.to_string(),
                value,
            },
            FlowError::Computation { what, value } => SweepError::Computation {
                mixture_ratio,
                step,
                what: what.to_string(),
                value,
            },
        }
    }

    pub(crate) fn geometry(mixture_ratio: f64, e: GeometryError) -> Self {
        if e.is_input_error() {
            return SweepError::InputValidation {
                field: "geometry".to_string(),
                value: e.value().map(|v| v.to_string()).unwrap_or_default(),
                reason: e.to_string(),
            };
        }
        let value = e.value().unwrap_or(f64::NAN);
        let what = match e {
            GeometryError::NonPhysical { what, .. } => what.to_string(),
            GeometryError::Degenerate { what } => what.to_string(),
            other => other.to_string(),
        };
        SweepError::Computation {
            mixture_ratio,
            step: SweepStep::Geometry,
            what,
            value,
        }
    }
}

impl From<ValidationError> for SweepError {
    fn from(e: ValidationError) -> Self {
        SweepError::InputValidation {
            field: e.field().to_string(),
            value: e.value().unwrap_or_default(),
            reason: e.to_string(),
        }
    }
}
