//! Combustion chamber sizing shared by both nozzle variants.

use crate::error::{GeometryError, GeometryResult};
use crate::shapes::{area_from_radius, diameter_from_area, radius_from_diameter};
use nc_core::numeric::ensure_positive;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Design parameters for the chamber and converging section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChamberParams {
    /// Chamber area / throat area, must exceed 1
    pub contraction_ratio: f64,
    /// Converging half angle [deg]
    pub convergent_angle_deg: f64,
    /// Characteristic length L* [m]
    pub l_star: f64,
}

impl ChamberParams {
    pub fn validate(&self) -> GeometryResult<()> {
        if !self.contraction_ratio.is_finite() || self.contraction_ratio <= 1.0 {
            return Err(GeometryError::InvalidArg {
                what: "contraction ratio",
                value: self.contraction_ratio,
            });
        }
        check_half_angle(self.convergent_angle_deg, "convergent angle")?;
        if !self.l_star.is_finite() || self.l_star <= 0.0 {
            return Err(GeometryError::InvalidArg {
                what: "L*",
                value: self.l_star,
            });
        }
        Ok(())
    }
}

pub(crate) fn check_half_angle(deg: f64, what: &'static str) -> GeometryResult<f64> {
    if !deg.is_finite() || deg <= 0.0 || deg >= 90.0 {
        return Err(GeometryError::InvalidArg { what, value: deg });
    }
    Ok(deg)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChamberDimensions {
    pub diameter_throat: f64,
    pub radius_throat: f64,
    pub diameter_chamber: f64,
    pub radius_chamber: f64,
    pub area_chamber: f64,
    pub length_chamber: f64,
}

/// Chamber diameter from the contraction ratio and chamber length from L*.
///
/// L_ch = (L* − (1/3)·sqrt(At/π)·cot(α)·(CR^(1/3) − 1)) / CR
pub fn size_chamber(throat_area: f64, params: &ChamberParams) -> GeometryResult<ChamberDimensions> {
    params.validate()?;
    let throat_area = ensure_positive(throat_area, "throat area")?;

    let diameter_throat = diameter_from_area(throat_area);
    let diameter_chamber = diameter_throat * params.contraction_ratio.sqrt();
    let radius_chamber = radius_from_diameter(diameter_chamber);

    let cot = 1.0 / params.convergent_angle_deg.to_radians().tan();
    let converging_volume_term =
        (throat_area / PI).sqrt() * cot * (params.contraction_ratio.cbrt() - 1.0) / 3.0;
    let length_chamber = (params.l_star - converging_volume_term) / params.contraction_ratio;
    let length_chamber = ensure_positive(length_chamber, "chamber length")?;

    Ok(ChamberDimensions {
        diameter_throat,
        radius_throat: radius_from_diameter(diameter_throat),
        diameter_chamber,
        radius_chamber,
        area_chamber: area_from_radius(radius_chamber),
        length_chamber,
    })
}
