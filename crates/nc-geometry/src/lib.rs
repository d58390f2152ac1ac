//! nc-geometry: nozzle envelope sizing and meridian contours.
//!
//! - `shapes`: area/diameter/radius helpers
//! - `chamber`: contraction-ratio and L* chamber sizing
//! - `contour`: line, arc and quadratic Bezier segments
//! - `conical` / `bell`: the two nozzle variants
//! - `rao`: bell divergence-angle model and coefficient table
//! - `calibrate`: offline least-squares fit of the Rao coefficients

pub mod bell;
pub mod calibrate;
pub mod chamber;
pub mod conical;
pub mod contour;
pub mod error;
pub mod rao;
pub mod shapes;

pub use bell::{BellGeometry, build_bell};
pub use chamber::{ChamberDimensions, ChamberParams, size_chamber};
pub use conical::{ConicalGeometry, ConicalParams, build_conical};
pub use contour::{Contour, ContourPoint, ContourResolution, ContourSegment, SegmentKind};
pub use error::{GeometryError, GeometryResult};
pub use rao::{AngleCoefficients, BellAngles, RaoClassFit, RaoCoefficientTable, RaoPercent};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest seam gap accepted when assembling a contour [m].
pub const SEAM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NozzleKind {
    Conical,
    Bell,
}

impl fmt::Display for NozzleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NozzleKind::Conical => write!(f, "conical"),
            NozzleKind::Bell => write!(f, "bell"),
        }
    }
}

/// Variant-specific design parameters, fixed for a whole sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NozzleShape {
    Conical(ConicalParams),
    Bell { percent: RaoPercent },
}

impl NozzleShape {
    pub fn kind(&self) -> NozzleKind {
        match self {
            NozzleShape::Conical(_) => NozzleKind::Conical,
            NozzleShape::Bell { .. } => NozzleKind::Bell,
        }
    }
}

/// Built nozzle, one variant per sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NozzleGeometry {
    Conical(ConicalGeometry),
    Bell(BellGeometry),
}

impl NozzleGeometry {
    pub fn kind(&self) -> NozzleKind {
        match self {
            NozzleGeometry::Conical(_) => NozzleKind::Conical,
            NozzleGeometry::Bell(_) => NozzleKind::Bell,
        }
    }

    pub fn contour(&self) -> &Contour {
        match self {
            NozzleGeometry::Conical(g) => &g.contour,
            NozzleGeometry::Bell(g) => &g.contour,
        }
    }

    pub fn radius_throat(&self) -> f64 {
        match self {
            NozzleGeometry::Conical(g) => g.radius_throat,
            NozzleGeometry::Bell(g) => g.radius_throat,
        }
    }

    pub fn radius_chamber(&self) -> f64 {
        match self {
            NozzleGeometry::Conical(g) => g.radius_chamber,
            NozzleGeometry::Bell(g) => g.radius_chamber,
        }
    }

    pub fn radius_exit(&self) -> f64 {
        match self {
            NozzleGeometry::Conical(g) => g.radius_exit,
            NozzleGeometry::Bell(g) => g.radius_exit,
        }
    }

    pub fn length_chamber(&self) -> f64 {
        match self {
            NozzleGeometry::Conical(g) => g.length_chamber,
            NozzleGeometry::Bell(g) => g.length_chamber,
        }
    }

    pub fn length_convergent(&self) -> f64 {
        match self {
            NozzleGeometry::Conical(g) => g.length_convergent,
            NozzleGeometry::Bell(g) => g.length_convergent,
        }
    }

    pub fn length_total(&self) -> f64 {
        match self {
            NozzleGeometry::Conical(g) => g.length_total,
            NozzleGeometry::Bell(g) => g.length_total,
        }
    }

    pub fn as_conical(&self) -> Option<&ConicalGeometry> {
        match self {
            NozzleGeometry::Conical(g) => Some(g),
            NozzleGeometry::Bell(_) => None,
        }
    }

    pub fn as_bell(&self) -> Option<&BellGeometry> {
        match self {
            NozzleGeometry::Bell(g) => Some(g),
            NozzleGeometry::Conical(_) => None,
        }
    }
}

/// Builds the selected nozzle variant from throat and exit areas.
#[derive(Debug, Clone)]
pub struct GeometryBuilder {
    chamber: ChamberParams,
    shape: NozzleShape,
    resolution: ContourResolution,
    rao: RaoCoefficientTable,
}

impl GeometryBuilder {
    pub fn new(chamber: ChamberParams, shape: NozzleShape) -> Self {
        Self {
            chamber,
            shape,
            resolution: ContourResolution::default(),
            rao: RaoCoefficientTable::builtin().clone(),
        }
    }

    pub fn with_resolution(mut self, resolution: ContourResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_rao_table(mut self, table: RaoCoefficientTable) -> Self {
        self.rao = table;
        self
    }

    pub fn kind(&self) -> NozzleKind {
        self.shape.kind()
    }

    pub fn rao_table(&self) -> &RaoCoefficientTable {
        &self.rao
    }

    /// Parameter checks that do not depend on any sized area.
    pub fn validate(&self) -> GeometryResult<()> {
        self.chamber.validate()?;
        self.resolution.validate()?;
        match self.shape {
            NozzleShape::Conical(params) => {
                chamber::check_half_angle(params.divergent_angle_deg, "divergent angle")?;
                if !params.throat_ratio.is_finite() || params.throat_ratio <= 0.0 {
                    return Err(GeometryError::InvalidArg {
                        what: "throat ratio",
                        value: params.throat_ratio,
                    });
                }
            }
            NozzleShape::Bell { percent } => {
                self.rao.lookup(percent)?;
            }
        }
        Ok(())
    }

    pub fn build(&self, throat_area: f64, exit_area: f64) -> GeometryResult<NozzleGeometry> {
        match self.shape {
            NozzleShape::Conical(params) => build_conical(
                throat_area,
                exit_area,
                &self.chamber,
                &params,
                &self.resolution,
            )
            .map(NozzleGeometry::Conical),
            NozzleShape::Bell { percent } => build_bell(
                throat_area,
                exit_area,
                &self.chamber,
                percent,
                &self.rao,
                &self.resolution,
            )
            .map(NozzleGeometry::Bell),
        }
    }
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

    #[test]
    fn builder_dispatches_on_shape() {
        let conical = GeometryBuilder::new(
            chamber(),
            NozzleShape::Conical(ConicalParams {
                divergent_angle_deg: 15.0,
                throat_ratio: 0.5,
            }),
        );
        let bell = GeometryBuilder::new(
            chamber(),
            NozzleShape::Bell {
                percent: RaoPercent::P80,
            },
        );
        let c = conical.build(0.002, 0.016).unwrap();
        let b = bell.build(0.002, 0.016).unwrap();
        assert_eq!(c.kind(), NozzleKind::Conical);
        assert_eq!(b.kind(), NozzleKind::Bell);
        assert!((c.radius_throat() - b.radius_throat()).abs() < 1e-15);
        assert!(c.as_bell().is_none() && b.as_conical().is_none());
        // Same chamber sizing, different divergent section.
        assert!((c.length_chamber() - b.length_chamber()).abs() < 1e-15);
    }

    #[test]
    fn bell_is_shorter_than_its_reference_cone() {
        let b = GeometryBuilder::new(
            chamber(),
            NozzleShape::Bell {
                percent: RaoPercent::P80,
            },
        )
        .build(0.002, 0.016)
        .unwrap();
        let cone = GeometryBuilder::new(
            chamber(),
            NozzleShape::Conical(ConicalParams {
                divergent_angle_deg: 15.0,
                throat_ratio: 0.5,
            }),
        )
        .build(0.002, 0.016)
        .unwrap();
        let cone_div = cone.as_conical().unwrap().length_divergent;
        assert!((b.as_bell().unwrap().nozzle_length / cone_div - 0.8).abs() < 1e-12);
    }

    #[test]
    fn validate_flags_bad_divergent_angle() {
        let builder = GeometryBuilder::new(
            chamber(),
            NozzleShape::Conical(ConicalParams {
                divergent_angle_deg: 0.0,
                throat_ratio: 0.5,
            }),
        );
        assert!(matches!(
            builder.validate(),
            Err(GeometryError::InvalidArg {
                what: "divergent angle",
                ..
            })
        ));
    }

    #[test]
    fn geometry_serializes_with_type_tag() {
        let g = GeometryBuilder::new(
            chamber(),
            NozzleShape::Bell {
                percent: RaoPercent::P90,
            },
        )
        .build(0.002, 0.02)
        .unwrap();
        let json = serde_json::to_string(&g).unwrap();
        assert!(json.contains("\"type\":\"bell\""));
        let back: NozzleGeometry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), NozzleKind::Bell);
    }
}
