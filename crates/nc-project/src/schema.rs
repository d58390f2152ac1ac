//! Engine design file schema (serde) and the resolved, SI-only inputs.

use crate::units::{Quantity, UnitError, parse_quantity};
use nc_core::units::{Force, Pressure, newtons, pa};
use nc_geometry::{
    ChamberParams, ConicalParams, ContourResolution, NozzleKind, NozzleShape, RaoPercent,
};
use nc_thermo::{FlowMode, MixtureRatioSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A dimensional value: bare number (canonical units) or unit-tagged text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantityValue {
    Number(f64),
    Text(String),
}

impl QuantityValue {
    pub fn resolve(&self, quantity: Quantity) -> Result<f64, UnitError> {
        match self {
            QuantityValue::Number(v) => Ok(*v),
            QuantityValue::Text(text) => parse_quantity(text, quantity),
        }
    }
}

impl From<f64> for QuantityValue {
    fn from(v: f64) -> Self {
        QuantityValue::Number(v)
    }
}

impl From<&str> for QuantityValue {
    fn from(s: &str) -> Self {
        QuantityValue::Text(s.to_string())
    }
}

/// Top-level design document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineDesignFile {
    pub version: u32,
    pub name: String,
    pub engine: EngineDef,
    /// Tabulated thermochemistry (YAML), relative to the design file
    pub thermo: PathBuf,
    /// Calibrated Rao coefficient table (JSON); built-in table when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rao_table: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ContourResolution>,
}

impl EngineDesignFile {
    pub fn thermo_path(&self, design_dir: &Path) -> PathBuf {
        design_dir.join(&self.thermo)
    }

    pub fn rao_table_path(&self, design_dir: &Path) -> Option<PathBuf> {
        self.rao_table.as_ref().map(|p| design_dir.join(p))
    }
}

/// Engine parameters as written in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineDef {
    pub fuel: String,
    pub oxidizer: String,
    #[serde(default)]
    pub frozen: bool,
    pub chamber_pressure: QuantityValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient_pressure: Option<QuantityValue>,
    /// Use 101 325 Pa regardless of `ambient_pressure`
    #[serde(default)]
    pub standard_ambient: bool,
    pub thrust: QuantityValue,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub mixture_ratio: MixtureRatioSpec,
    pub nozzle_type: NozzleKind,
    pub contraction_ratio: f64,
    pub convergent_angle: QuantityValue,
    pub l_star: QuantityValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divergent_angle: Option<QuantityValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throat_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bell_percent: Option<u32>,
}

/// Variant-specific resolved nozzle inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NozzleInputs {
    Conical {
        divergent_angle_deg: f64,
        throat_ratio: f64,
    },
    Bell {
        bell_percent: RaoPercent,
    },
}

impl NozzleInputs {
    pub fn kind(&self) -> NozzleKind {
        match self {
            NozzleInputs::Conical { .. } => NozzleKind::Conical,
            NozzleInputs::Bell { .. } => NozzleKind::Bell,
        }
    }

    pub fn shape(&self) -> NozzleShape {
        match *self {
            NozzleInputs::Conical {
                divergent_angle_deg,
                throat_ratio,
            } => NozzleShape::Conical(ConicalParams {
                divergent_angle_deg,
                throat_ratio,
            }),
            NozzleInputs::Bell { bell_percent } => NozzleShape::Bell {
                percent: bell_percent,
            },
        }
    }
}

/// Fully resolved engine inputs, SI units, immutable for a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineInputs {
    pub fuel: String,
    pub oxidizer: String,
    pub mode: FlowMode,
    pub chamber_pressure: Pressure,
    pub ambient_pressure: Pressure,
    pub thrust: Force,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub mixture_ratio: MixtureRatioSpec,
    pub nozzle: NozzleInputs,
    pub contraction_ratio: f64,
    pub convergent_angle_deg: f64,
    pub l_star_m: f64,
    #[serde(default)]
    pub resolution: ContourResolution,
}

impl EngineInputs {
    pub fn nozzle_kind(&self) -> NozzleKind {
        self.nozzle.kind()
    }

    pub fn chamber_params(&self) -> ChamberParams {
        ChamberParams {
            contraction_ratio: self.contraction_ratio,
            convergent_angle_deg: self.convergent_angle_deg,
            l_star: self.l_star_m,
        }
    }

    /// Convenience for tests and tools: a conical LOX/RP-1 engine at 20 bar.
    pub fn example_conical() -> Self {
        Self {
            fuel: "RP-1".to_string(),
            oxidizer: "LOX".to_string(),
            mode: FlowMode::Frozen,
            chamber_pressure: pa(2.0e6),
            ambient_pressure: pa(101_325.0),
            thrust: newtons(5_000.0),
            mixture_ratio: MixtureRatioSpec::Single(2.4),
            nozzle: NozzleInputs::Conical {
                divergent_angle_deg: 15.0,
                throat_ratio: 0.5,
            },
            contraction_ratio: 4.0,
            convergent_angle_deg: 30.0,
            l_star_m: 1.1,
            resolution: ContourResolution::default(),
        }
    }
}
