//! Meridian contour primitives and the piecewise contour container.
//!
//! A contour is an ordered list of segments running from the chamber to the
//! nozzle exit. Each segment keeps its own samples plus the analytic tangent
//! slope dr/dx at both ends so continuity can be checked without finite
//! differences. Adjoining segments share the exact same seam point.

use crate::error::{GeometryError, GeometryResult};
use serde::{Deserialize, Serialize};

/// One (axial, radial) sample [m].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourPoint {
    pub x: f64,
    pub r: f64,
}

impl ContourPoint {
    pub const fn new(x: f64, r: f64) -> Self {
        Self { x, r }
    }

    pub fn distance(&self, other: &ContourPoint) -> f64 {
        (self.x - other.x).hypot(self.r - other.r)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Chamber,
    Convergent,
    Throat,
    Divergent,
    ConvergingBezier,
    ThroatEntryArc,
    ThroatExitArc,
    DivergenceBezier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourSegment {
    pub kind: SegmentKind,
    pub points: Vec<ContourPoint>,
    /// dr/dx at the first sample
    pub start_slope: f64,
    /// dr/dx at the last sample
    pub end_slope: f64,
}

impl ContourSegment {
    pub fn first(&self) -> ContourPoint {
        self.points[0]
    }

    pub fn last(&self) -> ContourPoint {
        self.points[self.points.len() - 1]
    }
}

/// Samples per segment family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourResolution {
    pub line_points: usize,
    pub arc_points: usize,
    pub bezier_points: usize,
}

impl Default for ContourResolution {
    fn default() -> Self {
        Self {
            line_points: 100,
            arc_points: 50,
            bezier_points: 100,
        }
    }
}

impl ContourResolution {
    pub fn validate(&self) -> GeometryResult<()> {
        for (what, n) in [
            ("line points", self.line_points),
            ("arc points", self.arc_points),
            ("bezier points", self.bezier_points),
        ] {
            if n < 2 {
                return Err(GeometryError::InvalidArg {
                    what,
                    value: n as f64,
                });
            }
        }
        Ok(())
    }
}

/// `n` evenly spaced values with both ends exact.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
    out[n - 1] = end;
    out
}

/// Straight segment between two points.
pub fn line_segment(
    kind: SegmentKind,
    from: ContourPoint,
    to: ContourPoint,
    n: usize,
) -> GeometryResult<ContourSegment> {
    let dx = to.x - from.x;
    if dx.is_nan() || dx <= 0.0 {
        return Err(GeometryError::NonPhysical {
            what: "segment axial length",
            value: dx,
        });
    }
    let slope = (to.r - from.r) / dx;
    let points = linspace(0.0, 1.0, n)
        .into_iter()
        .map(|t| ContourPoint::new(from.x + t * dx, from.r + t * (to.r - from.r)))
        .collect::<Vec<_>>();
    Ok(pin_ends(
        ContourSegment {
            kind,
            points,
            start_slope: slope,
            end_slope: slope,
        },
        from,
        to,
    ))
}

/// Circular arc about `center`, swept from `start_deg` to `end_deg`
/// (angles measured from +x, counter-clockwise).
pub fn arc_segment(
    kind: SegmentKind,
    center: ContourPoint,
    radius: f64,
    start_deg: f64,
    end_deg: f64,
    n: usize,
) -> GeometryResult<ContourSegment> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(GeometryError::NonPhysical {
            what: "arc radius",
            value: radius,
        });
    }
    let at = |theta: f64| {
        ContourPoint::new(
            center.x + radius * theta.cos(),
            center.r + radius * theta.sin(),
        )
    };
    // Tangent of (R cos θ, R sin θ) is (−sin θ, cos θ).
    let slope = |theta: f64| -theta.cos() / theta.sin();

    let (t0, t1) = (start_deg.to_radians(), end_deg.to_radians());
    let points = linspace(t0, t1, n).into_iter().map(at).collect();
    let (start_slope, end_slope) = (slope(t0), slope(t1));
    if !start_slope.is_finite() || !end_slope.is_finite() {
        return Err(GeometryError::Degenerate {
            what: "arc endpoint tangent is vertical",
        });
    }
    Ok(ContourSegment {
        kind,
        points,
        start_slope,
        end_slope,
    })
}

/// Quadratic Bezier B(t) = (1−t)²·p0 + 2(1−t)t·p1 + t²·p2.
pub fn quadratic_bezier(
    kind: SegmentKind,
    p0: ContourPoint,
    p1: ContourPoint,
    p2: ContourPoint,
    n: usize,
) -> GeometryResult<ContourSegment> {
    let start_dx = p1.x - p0.x;
    let end_dx = p2.x - p1.x;
    if start_dx.abs() < f64::EPSILON || end_dx.abs() < f64::EPSILON {
        return Err(GeometryError::Degenerate {
            what: "Bezier control point is vertically aligned with an endpoint",
        });
    }
    let points = linspace(0.0, 1.0, n)
        .into_iter()
        .map(|t| {
            let u = 1.0 - t;
            let (w0, w1, w2) = (u * u, 2.0 * u * t, t * t);
            ContourPoint::new(
                w0 * p0.x + w1 * p1.x + w2 * p2.x,
                w0 * p0.r + w1 * p1.r + w2 * p2.r,
            )
        })
        .collect();
    Ok(pin_ends(
        ContourSegment {
            kind,
            points,
            start_slope: (p1.r - p0.r) / start_dx,
            end_slope: (p2.r - p1.r) / end_dx,
        },
        p0,
        p2,
    ))
}

fn pin_ends(mut segment: ContourSegment, first: ContourPoint, last: ContourPoint) -> ContourSegment {
    let n = segment.points.len();
    segment.points[0] = first;
    segment.points[n - 1] = last;
    segment
}

/// Ordered piecewise contour, chamber to exit.
///
/// Deserialization goes through [`Contour::from_segments`], so a stored
/// contour is held to the same invariants as a freshly built one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredContour")]
pub struct Contour {
    segments: Vec<ContourSegment>,
}

#[derive(Deserialize)]
struct StoredContour {
    segments: Vec<ContourSegment>,
}

impl TryFrom<StoredContour> for Contour {
    type Error = GeometryError;

    fn try_from(stored: StoredContour) -> GeometryResult<Self> {
        Contour::from_segments(stored.segments, crate::SEAM_TOLERANCE)
    }
}

impl Contour {
    /// Assemble segments in order. The first sample of every segment is
    /// overwritten with the last sample of its predecessor, so seams are
    /// bit-identical. Seams further apart than `seam_tolerance` are rejected.
    pub fn from_segments(
        mut segments: Vec<ContourSegment>,
        seam_tolerance: f64,
    ) -> GeometryResult<Self> {
        if segments.is_empty() {
            return Err(GeometryError::Degenerate {
                what: "contour has no segments",
            });
        }
        if segments.iter().any(|s| s.points.len() < 2) {
            return Err(GeometryError::Degenerate {
                what: "contour segment has fewer than two points",
            });
        }
        for i in 1..segments.len() {
            let seam = segments[i - 1].last();
            let gap = seam.distance(&segments[i].first());
            if gap.is_nan() || gap > seam_tolerance {
                return Err(GeometryError::NonPhysical {
                    what: "contour seam gap",
                    value: gap,
                });
            }
            segments[i].points[0] = seam;
        }
        if let Some(p) = segments
            .iter()
            .flat_map(|s| s.points.iter())
            .find(|p| !p.x.is_finite() || !p.r.is_finite() || p.r <= 0.0)
        {
            return Err(GeometryError::NonPhysical {
                what: "contour radius",
                value: p.r,
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[ContourSegment] {
        &self.segments
    }

    /// Flattened samples with shared seam points emitted once.
    pub fn points(&self) -> Vec<ContourPoint> {
        let mut out = Vec::with_capacity(self.len());
        for (i, seg) in self.segments.iter().enumerate() {
            let skip = usize::from(i > 0);
            out.extend(seg.points.iter().skip(skip).copied());
        }
        out
    }

    pub fn len(&self) -> usize {
        let total: usize = self.segments.iter().map(|s| s.points.len()).sum();
        total - (self.segments.len() - 1)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start(&self) -> ContourPoint {
        self.segments[0].first()
    }

    pub fn end(&self) -> ContourPoint {
        self.segments[self.segments.len() - 1].last()
    }

    /// Largest endpoint distance between consecutive segments.
    pub fn max_seam_gap(&self) -> f64 {
        self.segments
            .windows(2)
            .map(|w| w[0].last().distance(&w[1].first()))
            .fold(0.0, f64::max)
    }

    /// Tangent slope mismatch at the seam entering the first segment of `kind`.
    pub fn slope_mismatch_into(&self, kind: SegmentKind) -> Option<f64> {
        let idx = self.segments.iter().position(|s| s.kind == kind)?;
        let prev = self.segments.get(idx.checked_sub(1)?)?;
        Some((prev.end_slope - self.segments[idx].start_slope).abs())
    }

    pub fn axial_span(&self) -> f64 {
        self.end().x - self.start().x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_hits_both_ends() {
        let v = linspace(0.1, 0.7, 7);
        assert_eq!(v.len(), 7);
        assert_eq!(v[0], 0.1);
        assert_eq!(v[6], 0.7);
    }

    #[test]
    fn line_segment_slope() {
        let seg = line_segment(
            SegmentKind::Divergent,
            ContourPoint::new(0.0, 1.0),
            ContourPoint::new(2.0, 2.0),
            10,
        )
        .unwrap();
        assert_eq!(seg.points.len(), 10);
        assert!((seg.start_slope - 0.5).abs() < 1e-15);
        assert_eq!(seg.last(), ContourPoint::new(2.0, 2.0));
    }

    #[test]
    fn backwards_line_is_rejected() {
        let err = line_segment(
            SegmentKind::Chamber,
            ContourPoint::new(1.0, 1.0),
            ContourPoint::new(1.0, 1.0),
            5,
        );
        assert!(matches!(err, Err(GeometryError::NonPhysical { .. })));
    }

    #[test]
    fn arc_tangents_follow_angle() {
        // Quarter circle below its centre, −135° → −90°: slope −1 → 0.
        let seg = arc_segment(
            SegmentKind::ThroatEntryArc,
            ContourPoint::new(0.0, 2.5),
            1.5,
            -135.0,
            -90.0,
            50,
        )
        .unwrap();
        assert!((seg.start_slope + 1.0).abs() < 1e-12);
        assert!(seg.end_slope.abs() < 1e-12);
        assert!((seg.last().r - 1.0).abs() < 1e-12);
        assert!(seg.last().x.abs() < 1e-12);
    }

    #[test]
    fn bezier_tangents_point_at_control() {
        let seg = quadratic_bezier(
            SegmentKind::DivergenceBezier,
            ContourPoint::new(0.0, 1.0),
            ContourPoint::new(1.0, 1.5),
            ContourPoint::new(3.0, 1.8),
            20,
        )
        .unwrap();
        assert!((seg.start_slope - 0.5).abs() < 1e-15);
        assert!((seg.end_slope - 0.15).abs() < 1e-12);
        assert_eq!(seg.first(), ContourPoint::new(0.0, 1.0));
        assert_eq!(seg.last(), ContourPoint::new(3.0, 1.8));
    }

    #[test]
    fn contour_snaps_and_deduplicates_seams() {
        let a = line_segment(
            SegmentKind::Chamber,
            ContourPoint::new(0.0, 2.0),
            ContourPoint::new(1.0, 2.0),
            5,
        )
        .unwrap();
        let mut b = line_segment(
            SegmentKind::Convergent,
            ContourPoint::new(1.0, 2.0),
            ContourPoint::new(2.0, 1.0),
            5,
        )
        .unwrap();
        b.points[0].x += 1e-13;
        let contour = Contour::from_segments(vec![a, b], 1e-9).unwrap();
        assert_eq!(contour.max_seam_gap(), 0.0);
        assert_eq!(contour.len(), 9);
        assert_eq!(contour.points().len(), 9);
        assert_eq!(contour.slope_mismatch_into(SegmentKind::Convergent), Some(1.0));
    }

    #[test]
    fn contour_rejects_gaps() {
        let a = line_segment(
            SegmentKind::Chamber,
            ContourPoint::new(0.0, 2.0),
            ContourPoint::new(1.0, 2.0),
            5,
        )
        .unwrap();
        let b = line_segment(
            SegmentKind::Throat,
            ContourPoint::new(1.5, 2.0),
            ContourPoint::new(2.0, 2.0),
            5,
        )
        .unwrap();
        assert!(Contour::from_segments(vec![a, b], 1e-9).is_err());
    }

    #[test]
    fn stored_contour_is_revalidated() {
        let a = line_segment(
            SegmentKind::Chamber,
            ContourPoint::new(0.0, 2.0),
            ContourPoint::new(1.0, 2.0),
            5,
        )
        .unwrap();
        let b = line_segment(
            SegmentKind::Convergent,
            ContourPoint::new(1.0, 2.0),
            ContourPoint::new(2.0, 1.0),
            5,
        )
        .unwrap();
        let contour = Contour::from_segments(vec![a, b], 1e-9).unwrap();
        let json = serde_json::to_string(&contour).unwrap();
        let back: Contour = serde_json::from_str(&json).unwrap();
        assert_eq!(back, contour);

        let err = serde_json::from_str::<Contour>(r#"{"segments":[]}"#).unwrap_err();
        assert!(err.to_string().contains("no segments"));

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["segments"][1]["points"][0]["x"] = serde_json::json!(1.5);
        assert!(serde_json::from_value::<Contour>(value).is_err());
    }
}
