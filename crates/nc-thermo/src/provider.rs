//! Thermochemical provider trait.

use crate::error::ProviderResult;
use crate::point::{ChamberState, FlowMode, ThermoPoint};
use nc_core::units::Pressure;

/// One request to a thermochemical provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermoQuery<'a> {
    pub mixture_ratio: f64,
    pub chamber_pressure: Pressure,
    pub fuel: &'a str,
    pub oxidizer: &'a str,
    pub mode: FlowMode,
}

/// Boundary to a combustion equilibrium solver.
///
/// Implementations must be thread-safe (Send + Sync) so sweep points can be
/// evaluated in parallel. A call may be expensive; it is synchronous and
/// deterministic for identical queries.
pub trait ThermoProvider: Send + Sync {
    /// Provider name (for logging and run identity).
    fn name(&self) -> &str;

    /// Chamber state for one mixture ratio.
    ///
    /// Fails on unknown propellant identifiers or solver non-convergence.
    fn evaluate(&self, query: &ThermoQuery<'_>) -> ProviderResult<ChamberState>;

    /// Evaluate and pair the state with the query's mixture ratio and pressure.
    fn thermo_point(&self, query: &ThermoQuery<'_>) -> ProviderResult<ThermoPoint> {
        let state = self.evaluate(query)?;
        Ok(ThermoPoint::new(
            query.mixture_ratio,
            query.chamber_pressure,
            state,
        ))
    }
}

impl<T: ThermoProvider + ?Sized> ThermoProvider for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(&self, query: &ThermoQuery<'_>) -> ProviderResult<ChamberState> {
        (**self).evaluate(query)
    }
}

impl<T: ThermoProvider + ?Sized> ThermoProvider for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(&self, query: &ThermoQuery<'_>) -> ProviderResult<ChamberState> {
        (**self).evaluate(query)
    }
}

impl<T: ThermoProvider + ?Sized> ThermoProvider for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(&self, query: &ThermoQuery<'_>) -> ProviderResult<ChamberState> {
        (**self).evaluate(query)
    }
}
