//! Conical nozzle: straight converging and diverging tapers.
//!
//! The contour starts at the injector face (x = 0) and runs to the exit
//! through four line segments: chamber, convergent taper, throat, divergent
//! taper.

use crate::chamber::{ChamberParams, check_half_angle, size_chamber};
use crate::contour::{Contour, ContourPoint, ContourResolution, SegmentKind, line_segment};
use crate::error::{GeometryError, GeometryResult};
use crate::shapes::{diameter_from_area, radius_from_diameter};
use crate::SEAM_TOLERANCE;
use nc_core::numeric::ensure_positive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConicalParams {
    /// Diverging half angle [deg]
    pub divergent_angle_deg: f64,
    /// Throat straight length / throat diameter
    pub throat_ratio: f64,
}

/// Dimensions in metres, angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConicalGeometry {
    pub diameter_throat: f64,
    pub diameter_chamber: f64,
    pub diameter_exit: f64,
    pub radius_throat: f64,
    pub radius_chamber: f64,
    pub radius_exit: f64,
    pub area_chamber: f64,
    pub length_chamber: f64,
    pub length_convergent: f64,
    pub length_throat: f64,
    pub length_divergent: f64,
    pub length_total: f64,
    pub convergent_angle_deg: f64,
    pub divergent_angle_deg: f64,
    pub contour: Contour,
}

pub fn build_conical(
    throat_area: f64,
    exit_area: f64,
    chamber: &ChamberParams,
    params: &ConicalParams,
    resolution: &ContourResolution,
) -> GeometryResult<ConicalGeometry> {
    resolution.validate()?;
    check_half_angle(params.divergent_angle_deg, "divergent angle")?;
    if !params.throat_ratio.is_finite() || params.throat_ratio <= 0.0 {
        return Err(GeometryError::InvalidArg {
            what: "throat ratio",
            value: params.throat_ratio,
        });
    }
    let exit_area = ensure_positive(exit_area, "exit area")?;
    if exit_area <= throat_area {
        return Err(GeometryError::NonPhysical {
            what: "exit area (must exceed throat area)",
            value: exit_area,
        });
    }

    let dims = size_chamber(throat_area, chamber)?;
    let diameter_exit = diameter_from_area(exit_area);
    let radius_exit = radius_from_diameter(diameter_exit);
    let (rc, rt, re) = (dims.radius_chamber, dims.radius_throat, radius_exit);

    let length_convergent = ensure_positive(
        (rc - rt) / chamber.convergent_angle_deg.to_radians().tan(),
        "convergent length",
    )?;
    let length_divergent = ensure_positive(
        (re - rt) / params.divergent_angle_deg.to_radians().tan(),
        "divergent length",
    )?;
    let length_throat = ensure_positive(params.throat_ratio * dims.diameter_throat, "throat length")?;
    let length_chamber = dims.length_chamber;
    let length_total = length_chamber + length_convergent + length_throat + length_divergent;

    let x1 = length_chamber;
    let x2 = x1 + length_convergent;
    let x3 = x2 + length_throat;
    let n = resolution.line_points;
    let segments = vec![
        line_segment(
            SegmentKind::Chamber,
            ContourPoint::new(0.0, rc),
            ContourPoint::new(x1, rc),
            n,
        )?,
        line_segment(
            SegmentKind::Convergent,
            ContourPoint::new(x1, rc),
            ContourPoint::new(x2, rt),
            n,
        )?,
        line_segment(
            SegmentKind::Throat,
            ContourPoint::new(x2, rt),
            ContourPoint::new(x3, rt),
            n,
        )?,
        line_segment(
            SegmentKind::Divergent,
            ContourPoint::new(x3, rt),
            ContourPoint::new(length_total, re),
            n,
        )?,
    ];

    Ok(ConicalGeometry {
        diameter_throat: dims.diameter_throat,
        diameter_chamber: dims.diameter_chamber,
        diameter_exit,
        radius_throat: rt,
        radius_chamber: rc,
        radius_exit: re,
        area_chamber: dims.area_chamber,
        length_chamber,
        length_convergent,
        length_throat,
        length_divergent,
        length_total,
        convergent_angle_deg: chamber.convergent_angle_deg,
        divergent_angle_deg: params.divergent_angle_deg,
        contour: Contour::from_segments(segments, SEAM_TOLERANCE)?,
    })
}
