//! Chamber state and per-mixture-ratio thermochemical point.

use crate::error::ProviderResult;
use nc_core::numeric::ensure_positive;
use nc_core::units::{Density, MolecularWeight, Pressure, SpecHeatCapacity, Temperature};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chemistry assumption used by the equilibrium solver through the nozzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowMode {
    /// Composition frozen at chamber conditions.
    Frozen,
    /// Shifting equilibrium.
    Equilibrium,
}

impl FlowMode {
    pub fn from_frozen_flag(frozen: bool) -> Self {
        if frozen { Self::Frozen } else { Self::Equilibrium }
    }
}

impl fmt::Display for FlowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frozen => write!(f, "frozen"),
            Self::Equilibrium => write!(f, "equilibrium"),
        }
    }
}

/// Chamber properties returned by a provider for one mixture ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChamberState {
    /// Adiabatic flame temperature [K]
    pub chamber_temperature: Temperature,
    /// Ratio of specific heats γ = cp/cv
    pub gamma: f64,
    /// Molecular weight [kg/kmol]
    pub molecular_weight: MolecularWeight,
    /// Chamber gas density [kg/m³]
    pub density: Density,
    /// Specific heat at constant pressure [J/(kg·K)]
    pub specific_heat: SpecHeatCapacity,
}

impl ChamberState {
    /// Check every property is finite and positive.
    ///
    /// γ is only required to be positive here; the isentropic relations
    /// reject γ ≤ 1 themselves.
    pub fn validate(&self) -> ProviderResult<()> {
        ensure_positive(self.chamber_temperature.value, "chamber temperature")?;
        ensure_positive(self.gamma, "gamma")?;
        ensure_positive(self.molecular_weight, "molecular weight")?;
        ensure_positive(self.density.value, "chamber density")?;
        ensure_positive(self.specific_heat, "specific heat")?;
        Ok(())
    }
}

/// One mixture ratio paired with its chamber state. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermoPoint {
    /// Oxidizer-to-fuel mass ratio
    pub mixture_ratio: f64,
    /// Chamber pressure [Pa]
    pub chamber_pressure: Pressure,
    #[serde(flatten)]
    pub state: ChamberState,
}

impl ThermoPoint {
    pub fn new(mixture_ratio: f64, chamber_pressure: Pressure, state: ChamberState) -> Self {
        Self {
            mixture_ratio,
            chamber_pressure,
            state,
        }
    }

    pub fn chamber_temperature_k(&self) -> f64 {
        self.state.chamber_temperature.value
    }

    pub fn chamber_pressure_pa(&self) -> f64 {
        self.chamber_pressure.value
    }

    pub fn gamma(&self) -> f64 {
        self.state.gamma
    }

    pub fn molecular_weight(&self) -> f64 {
        self.state.molecular_weight
    }

    pub fn density_kg_m3(&self) -> f64 {
        self.state.density.value
    }

    pub fn specific_heat(&self) -> f64 {
        self.state.specific_heat
    }
}
