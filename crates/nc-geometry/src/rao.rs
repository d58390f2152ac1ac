//! Rao bell divergence-angle model.
//!
//! For each bell length class the initial (θn) and exit (θe) wall angles are
//! regressions in the expansion ratio ε:
//!
//! - θn(ε) = a + b·log10(ε) + c·log10(ε)²
//! - θe(ε) = a + b·exp(−c·ε)
//!
//! Coefficients come from an offline calibration (see [`crate::calibrate`])
//! and are only read at run time.

use crate::error::{GeometryError, GeometryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// Version tag of the coefficient table compiled into the crate.
pub const BUILTIN_TABLE_VERSION: &str = "rao-2024.1";

/// Bell length as a percentage of the equivalent 15° cone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RaoPercent {
    P60,
    P70,
    P80,
    P90,
    P100,
}

impl RaoPercent {
    pub const ALL: [RaoPercent; 5] = [
        RaoPercent::P60,
        RaoPercent::P70,
        RaoPercent::P80,
        RaoPercent::P90,
        RaoPercent::P100,
    ];

    pub fn from_percent(percent: u32) -> GeometryResult<Self> {
        match percent {
            60 => Ok(RaoPercent::P60),
            70 => Ok(RaoPercent::P70),
            80 => Ok(RaoPercent::P80),
            90 => Ok(RaoPercent::P90),
            100 => Ok(RaoPercent::P100),
            other => Err(GeometryError::UnsupportedPercent { percent: other }),
        }
    }

    pub fn percent(self) -> u32 {
        match self {
            RaoPercent::P60 => 60,
            RaoPercent::P70 => 70,
            RaoPercent::P80 => 80,
            RaoPercent::P90 => 90,
            RaoPercent::P100 => 100,
        }
    }

    pub fn fraction(self) -> f64 {
        f64::from(self.percent()) / 100.0
    }
}

impl TryFrom<u32> for RaoPercent {
    type Error = GeometryError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        RaoPercent::from_percent(value)
    }
}

impl From<RaoPercent> for u32 {
    fn from(p: RaoPercent) -> Self {
        p.percent()
    }
}

impl fmt::Display for RaoPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Coefficient triple (a, b, c) of one angle regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl AngleCoefficients {
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// θn(ε) in degrees.
    pub fn initial_angle(&self, expansion_ratio: f64) -> f64 {
        let l = expansion_ratio.log10();
        self.a + self.b * l + self.c * l * l
    }

    /// θe(ε) in degrees.
    pub fn exit_angle(&self, expansion_ratio: f64) -> f64 {
        self.a + self.b * (-self.c * expansion_ratio).exp()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaoClassFit {
    pub percent: RaoPercent,
    pub initial: AngleCoefficients,
    pub exit: AngleCoefficients,
}

/// Wall angles for one bell nozzle [deg].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BellAngles {
    pub initial_deg: f64,
    pub exit_deg: f64,
}

/// Versioned, immutable set of per-class fits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaoCoefficientTable {
    pub version: String,
    pub classes: Vec<RaoClassFit>,
}

impl RaoCoefficientTable {
    /// Table compiled into the crate, initialised once per process.
    pub fn builtin() -> &'static RaoCoefficientTable {
        static BUILTIN: OnceLock<RaoCoefficientTable> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let fit = |percent, n: [f64; 3], e: [f64; 3]| RaoClassFit {
                percent,
                initial: AngleCoefficients::new(n[0], n[1], n[2]),
                exit: AngleCoefficients::new(e[0], e[1], e[2]),
            };
            RaoCoefficientTable {
                version: BUILTIN_TABLE_VERSION.to_string(),
                classes: vec![
                    fit(
                        RaoPercent::P60,
                        [25.38122, 15.45578, -2.41793],
                        [11.84008, 10.37225, 0.102654],
                    ),
                    fit(
                        RaoPercent::P70,
                        [23.43466, 13.09155, -1.54022],
                        [9.20012, 9.6289, 0.108466],
                    ),
                    fit(
                        RaoPercent::P80,
                        [19.78431, 10.12162, -0.968714],
                        [6.48333, 7.82595, 0.122249],
                    ),
                    fit(
                        RaoPercent::P90,
                        [21.10044, 11.15402, -0.991682],
                        [5.84611, 8.11254, 0.143292],
                    ),
                    fit(
                        RaoPercent::P100,
                        [20.37189, 9.84689, -0.37436],
                        [4.38196, 7.29628, 0.148981],
                    ),
                ],
            }
        })
    }

    pub fn from_json_str(content: &str) -> GeometryResult<Self> {
        let table: RaoCoefficientTable = serde_json::from_str(content)?;
        table.validate()?;
        Ok(table)
    }

    pub fn load(path: &Path) -> GeometryResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GeometryError::Table {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> GeometryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every class at most once, every coefficient finite.
    pub fn validate(&self) -> GeometryResult<()> {
        if self.version.trim().is_empty() {
            return Err(GeometryError::Table {
                message: "missing version".to_string(),
            });
        }
        for (i, class) in self.classes.iter().enumerate() {
            if self.classes[..i].iter().any(|c| c.percent == class.percent) {
                return Err(GeometryError::Table {
                    message: format!("duplicate entry for {}", class.percent),
                });
            }
            let coeffs = class.initial.to_array().into_iter().chain(class.exit.to_array());
            if coeffs.into_iter().any(|v| !v.is_finite()) {
                return Err(GeometryError::Table {
                    message: format!("non-finite coefficient for {}", class.percent),
                });
            }
        }
        Ok(())
    }

    pub fn lookup(&self, percent: RaoPercent) -> GeometryResult<&RaoClassFit> {
        self.classes
            .iter()
            .find(|c| c.percent == percent)
            .ok_or(GeometryError::UnsupportedPercent {
                percent: percent.percent(),
            })
    }

    /// θn and θe for a bell of class `percent` at expansion ratio ε.
    pub fn angles(&self, percent: RaoPercent, expansion_ratio: f64) -> GeometryResult<BellAngles> {
        if !expansion_ratio.is_finite() || expansion_ratio <= 1.0 {
            return Err(GeometryError::InvalidArg {
                what: "expansion ratio",
                value: expansion_ratio,
            });
        }
        let fit = self.lookup(percent)?;
        let angles = BellAngles {
            initial_deg: fit.initial.initial_angle(expansion_ratio),
            exit_deg: fit.exit.exit_angle(expansion_ratio),
        };
        for (what, value) in [
            ("initial divergence angle", angles.initial_deg),
            ("exit divergence angle", angles.exit_deg),
        ] {
            if !value.is_finite() || value <= 0.0 || value >= 90.0 {
                return Err(GeometryError::NonPhysical { what, value });
            }
        }
        Ok(angles)
    }
}
