//! Design point and sweep result containers.

use nc_flow::PerformancePoint;
use nc_geometry::{NozzleGeometry, NozzleKind};
use nc_thermo::ThermoPoint;
use serde::{Deserialize, Serialize};

/// Everything computed for one mixture ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignPoint {
    pub thermo: ThermoPoint,
    pub performance: PerformancePoint,
    pub geometry: NozzleGeometry,
}

impl DesignPoint {
    pub fn mixture_ratio(&self) -> f64 {
        self.thermo.mixture_ratio
    }

    pub fn specific_impulse_s(&self) -> f64 {
        self.performance.specific_impulse_s
    }
}

/// Ordered design points of one sweep, ascending in mixture ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSweepResult {
    pub nozzle_kind: NozzleKind,
    /// Name of the thermochemical provider that produced the chamber states
    pub provider: String,
    /// Rao coefficient table version, bell sweeps only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rao_table_version: Option<String>,
    pub points: Vec<DesignPoint>,
}

impl DesignSweepResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn mixture_ratios(&self) -> Vec<f64> {
        self.points.iter().map(DesignPoint::mixture_ratio).collect()
    }

    /// Point with the highest specific impulse. Ties keep the lowest O/F.
    pub fn best_isp(&self) -> Option<&DesignPoint> {
        self.points.iter().fold(None, |best, p| match best {
            Some(b) if b.specific_impulse_s() >= p.specific_impulse_s() => Some(b),
            _ => Some(p),
        })
    }
}
