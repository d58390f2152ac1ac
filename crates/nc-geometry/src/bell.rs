//! Rao bell nozzle (thrust-optimised parabola approximation).
//!
//! Frame: throat plane at x = 0, chamber at negative x. Segments in order:
//!
//! 1. constant-radius chamber
//! 2. quadratic Bezier from horizontal wall into the throat entry arc
//! 3. throat entry arc, radius 1.5·rt, −135° → −90°
//! 4. throat exit arc, radius 0.382·rt, −90° → θn − 90°
//! 5. quadratic Bezier from slope tan θn to the exit at slope tan θe
//!
//! Both Bezier control points are tangent-line intersections, so every seam
//! from 2 onwards is C¹.

use crate::chamber::{ChamberParams, size_chamber};
use crate::contour::{
    Contour, ContourPoint, ContourResolution, SegmentKind, arc_segment, line_segment,
    quadratic_bezier,
};
use crate::error::{GeometryError, GeometryResult};
use crate::rao::{RaoCoefficientTable, RaoPercent};
use crate::shapes::{diameter_from_area, radius_from_diameter};
use crate::SEAM_TOLERANCE;
use nc_core::numeric::ensure_positive;
use serde::{Deserialize, Serialize};

/// Entry arc radius / throat radius.
pub const ENTRY_ARC_RATIO: f64 = 1.5;
/// Exit arc radius / throat radius.
pub const EXIT_ARC_RATIO: f64 = 0.382;
/// Half angle of the reference cone the bell length is measured against.
pub const REFERENCE_CONE_DEG: f64 = 15.0;

const PARALLEL_SLOPE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BellGeometry {
    pub diameter_throat: f64,
    pub diameter_chamber: f64,
    pub diameter_exit: f64,
    pub radius_throat: f64,
    pub radius_chamber: f64,
    pub radius_exit: f64,
    pub area_chamber: f64,
    pub length_chamber: f64,
    /// Chamber end to throat plane
    pub length_convergent: f64,
    /// Throat plane to exit
    pub nozzle_length: f64,
    pub length_total: f64,
    pub initial_angle_deg: f64,
    pub exit_angle_deg: f64,
    pub percent: RaoPercent,
    pub expansion_ratio: f64,
    pub rao_table_version: String,
    pub contour: Contour,
}

/// Bell divergent length: (re − rt)/tan 15° scaled by the length class.
pub fn bell_divergent_length(radius_throat: f64, radius_exit: f64, percent: RaoPercent) -> f64 {
    (radius_exit - radius_throat) / REFERENCE_CONE_DEG.to_radians().tan() * percent.fraction()
}

/// Intersection of the lines through `a` with slope `ma` and through `b`
/// with slope `mb`.
fn tangent_intersection(
    a: ContourPoint,
    ma: f64,
    b: ContourPoint,
    mb: f64,
) -> GeometryResult<ContourPoint> {
    if (ma - mb).abs() < PARALLEL_SLOPE_EPS {
        return Err(GeometryError::Degenerate {
            what: "divergence tangents are parallel",
        });
    }
    let ca = a.r - ma * a.x;
    let cb = b.r - mb * b.x;
    Ok(ContourPoint::new(
        (cb - ca) / (ma - mb),
        (ma * cb - mb * ca) / (ma - mb),
    ))
}

pub fn build_bell(
    throat_area: f64,
    exit_area: f64,
    chamber: &ChamberParams,
    percent: RaoPercent,
    table: &RaoCoefficientTable,
    resolution: &ContourResolution,
) -> GeometryResult<BellGeometry> {
    resolution.validate()?;
    let throat_area = ensure_positive(throat_area, "throat area")?;
    let exit_area = ensure_positive(exit_area, "exit area")?;
    let expansion_ratio = exit_area / throat_area;
    let angles = table.angles(percent, expansion_ratio)?;

    let dims = size_chamber(throat_area, chamber)?;
    let diameter_exit = diameter_from_area(exit_area);
    let (rt, rc) = (dims.radius_throat, dims.radius_chamber);
    let re = radius_from_diameter(diameter_exit);
    let nozzle_length = ensure_positive(bell_divergent_length(rt, re, percent), "nozzle length")?;

    let throat = ContourPoint::new(0.0, rt);

    let mut entry = arc_segment(
        SegmentKind::ThroatEntryArc,
        ContourPoint::new(0.0, rt * (1.0 + ENTRY_ARC_RATIO)),
        ENTRY_ARC_RATIO * rt,
        -135.0,
        -90.0,
        resolution.arc_points,
    )?;
    let last = entry.points.len() - 1;
    entry.points[last] = throat;

    let mut exit_arc = arc_segment(
        SegmentKind::ThroatExitArc,
        ContourPoint::new(0.0, rt * (1.0 + EXIT_ARC_RATIO)),
        EXIT_ARC_RATIO * rt,
        -90.0,
        angles.initial_deg - 90.0,
        resolution.arc_points,
    )?;
    exit_arc.points[0] = throat;

    // Divergence curve
    let n = exit_arc.last();
    let e = ContourPoint::new(nozzle_length, re);
    let q = tangent_intersection(n, exit_arc.end_slope, e, angles.exit_deg.to_radians().tan())?;
    if !(q.x > n.x && q.x < e.x) {
        return Err(GeometryError::NonPhysical {
            what: "divergence control point axial position",
            value: q.x,
        });
    }
    let divergence = quadratic_bezier(
        SegmentKind::DivergenceBezier,
        n,
        q,
        e,
        resolution.bezier_points,
    )?;

    // Converging curve: horizontal at rc, ending tangent to the entry arc.
    let entry_start = entry.first();
    if rc <= entry_start.r {
        return Err(GeometryError::NonPhysical {
            what: "chamber radius (must exceed throat entry arc start)",
            value: rc,
        });
    }
    let control = ContourPoint::new(
        entry_start.x + (rc - entry_start.r) / entry.start_slope,
        rc,
    );
    let chamber_end = ContourPoint::new(2.0 * control.x - entry_start.x, rc);
    let converging = quadratic_bezier(
        SegmentKind::ConvergingBezier,
        chamber_end,
        control,
        entry_start,
        resolution.bezier_points,
    )?;
    let length_convergent = ensure_positive(-chamber_end.x, "convergent length")?;

    let chamber_section = line_segment(
        SegmentKind::Chamber,
        ContourPoint::new(chamber_end.x - dims.length_chamber, rc),
        chamber_end,
        resolution.line_points,
    )?;

    let contour = Contour::from_segments(
        vec![chamber_section, converging, entry, exit_arc, divergence],
        SEAM_TOLERANCE,
    )?;

    Ok(BellGeometry {
        diameter_throat: dims.diameter_throat,
        diameter_chamber: dims.diameter_chamber,
        diameter_exit,
        radius_throat: rt,
        radius_chamber: rc,
        radius_exit: re,
        area_chamber: dims.area_chamber,
        length_chamber: dims.length_chamber,
        length_convergent,
        nozzle_length,
        length_total: dims.length_chamber + length_convergent + nozzle_length,
        initial_angle_deg: angles.initial_deg,
        exit_angle_deg: angles.exit_deg,
        percent,
        expansion_ratio,
        rao_table_version: table.version.clone(),
        contour,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chamber() -> ChamberParams {
        ChamberParams {
            contraction_ratio: 4.0,
            convergent_angle_deg: 30.0,
            l_star: 1.1,
        }
    }

    fn build(expansion_ratio: f64, percent: RaoPercent) -> GeometryResult<BellGeometry> {
        build_bell(
            0.002,
            0.002 * expansion_ratio,
            &chamber(),
            percent,
            RaoCoefficientTable::builtin(),
            &ContourResolution::default(),
        )
    }

    #[test]
    fn seams_are_exact_and_tangent() {
        let g = build(8.0, RaoPercent::P80).unwrap();
        assert!(g.contour.max_seam_gap() < 1e-9);
        let mismatch = g
            .contour
            .slope_mismatch_into(SegmentKind::DivergenceBezier)
            .unwrap();
        assert!(mismatch < 1e-6, "slope mismatch {mismatch}");
        for kind in [
            SegmentKind::ConvergingBezier,
            SegmentKind::ThroatEntryArc,
            SegmentKind::ThroatExitArc,
        ] {
            assert!(g.contour.slope_mismatch_into(kind).unwrap() < 1e-9);
        }
    }

    #[test]
    fn contour_ends_at_exit_radius_and_throat_is_minimum() {
        let g = build(8.0, RaoPercent::P80).unwrap();
        let pts = g.contour.points();
        let end = pts[pts.len() - 1];
        assert!((end.x - g.nozzle_length).abs() < 1e-15);
        assert!((end.r - g.radius_exit).abs() < 1e-15);
        let min_r = pts.iter().map(|p| p.r).fold(f64::INFINITY, f64::min);
        assert!((min_r - g.radius_throat).abs() < 1e-12);
        assert!(pts.windows(2).all(|w| w[1].x >= w[0].x));
    }

    #[test]
    fn segment_resolution_is_respected() {
        let g = build(8.0, RaoPercent::P80).unwrap();
        let counts: Vec<usize> = g.contour.segments().iter().map(|s| s.points.len()).collect();
        assert_eq!(counts, vec![100, 100, 50, 50, 100]);
        assert_eq!(g.contour.len(), 400 - 4);
    }

    #[test]
    fn nozzle_length_scales_with_class() {
        let short = build(8.0, RaoPercent::P60).unwrap();
        let full = build(8.0, RaoPercent::P100).unwrap();
        assert!((short.nozzle_length / full.nozzle_length - 0.6).abs() < 1e-12);
    }

    #[test]
    fn low_contraction_ratio_cannot_reach_entry_arc() {
        let mut c = chamber();
        c.contraction_ratio = 2.0;
        let err = build_bell(
            0.002,
            0.016,
            &c,
            RaoPercent::P80,
            RaoCoefficientTable::builtin(),
            &ContourResolution::default(),
        );
        assert!(matches!(err, Err(GeometryError::NonPhysical { .. })));
    }

    #[test]
    fn tangent_lines_intersect() {
        let q = tangent_intersection(
            ContourPoint::new(0.0, 0.0),
            1.0,
            ContourPoint::new(2.0, 0.0),
            -1.0,
        )
        .unwrap();
        assert!((q.x - 1.0).abs() < 1e-15 && (q.r - 1.0).abs() < 1e-15);
        assert!(tangent_intersection(
            ContourPoint::new(0.0, 0.0),
            0.3,
            ContourPoint::new(1.0, 1.0),
            0.3
        )
        .is_err());
    }
}
