//! Offline calibration of the Rao angle regressions.
//!
//! Reads digitised chart samples, fits θn (log-quadratic) and θe
//! (exponential) per bell length class with a bounded Levenberg–Marquardt
//! least-squares solve, and emits a versioned [`RaoCoefficientTable`].
//! Nothing here runs during a sweep.

use crate::error::{GeometryError, GeometryResult};
use crate::rao::{AngleCoefficients, RaoClassFit, RaoCoefficientTable, RaoPercent};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleKind {
    #[serde(alias = "theta_n")]
    Initial,
    #[serde(alias = "theta_e")]
    Exit,
}

/// One digitised chart reading: `percent, kind, expansion_ratio, angle_deg`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartSample {
    pub percent: u32,
    pub kind: AngleKind,
    pub expansion_ratio: f64,
    pub angle_deg: f64,
}

/// Read chart samples from CSV with a header row.
pub fn read_chart_samples<R: Read>(reader: R) -> GeometryResult<Vec<ChartSample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut samples = Vec::new();
    for (line, row) in rdr.deserialize::<ChartSample>().enumerate() {
        let sample = row.map_err(|e| GeometryError::Calibration {
            message: format!("row {}: {e}", line + 1),
        })?;
        if !sample.expansion_ratio.is_finite()
            || sample.expansion_ratio <= 1.0
            || !sample.angle_deg.is_finite()
        {
            return Err(GeometryError::Calibration {
                message: format!("row {}: non-physical sample {sample:?}", line + 1),
            });
        }
        samples.push(sample);
    }
    Ok(samples)
}

/// Box constraints on (a, b, c).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientBounds {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
}

impl CoefficientBounds {
    fn clamp(&self, p: [f64; 3]) -> [f64; 3] {
        std::array::from_fn(|i| p[i].clamp(self.lower[i], self.upper[i]))
    }
}

pub struct CalibrationConfig {
    pub max_iterations: usize,
    /// Relative cost change or step norm below which the fit stops
    pub tolerance: f64,
    pub initial_damping: f64,
    pub initial_bounds: CoefficientBounds,
    pub exit_bounds: CoefficientBounds,
    /// Minimum samples per (class, kind)
    pub min_samples: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-12,
            initial_damping: 1e-3,
            initial_bounds: CoefficientBounds {
                lower: [0.0, -60.0, -20.0],
                upper: [60.0, 60.0, 20.0],
            },
            exit_bounds: CoefficientBounds {
                lower: [0.0, -45.0, 1e-4],
                upper: [45.0, 45.0, 5.0],
            },
            min_samples: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub coefficients: AngleCoefficients,
    pub rms_residual_deg: f64,
    pub iterations: usize,
    pub samples: usize,
}

/// θ(x; p) and ∂θ/∂p.
type Model = fn(f64, &[f64; 3]) -> (f64, [f64; 3]);

fn initial_model(eps: f64, p: &[f64; 3]) -> (f64, [f64; 3]) {
    let l = eps.log10();
    (p[0] + p[1] * l + p[2] * l * l, [1.0, l, l * l])
}

fn exit_model(eps: f64, p: &[f64; 3]) -> (f64, [f64; 3]) {
    let e = (-p[2] * eps).exp();
    (p[0] + p[1] * e, [1.0, e, -p[1] * eps * e])
}

fn residuals(model: Model, data: &[(f64, f64)], p: &[f64; 3]) -> (DVector<f64>, DMatrix<f64>) {
    let mut r = DVector::zeros(data.len());
    let mut jac = DMatrix::zeros(data.len(), 3);
    for (i, &(x, y)) in data.iter().enumerate() {
        let (value, grad) = model(x, p);
        r[i] = y - value;
        for (j, g) in grad.iter().enumerate() {
            jac[(i, j)] = *g;
        }
    }
    (r, jac)
}

fn levenberg_marquardt(
    model: Model,
    data: &[(f64, f64)],
    start: [f64; 3],
    bounds: &CoefficientBounds,
    config: &CalibrationConfig,
) -> GeometryResult<FitReport> {
    let mut p = bounds.clamp(start);
    let (mut r, mut jac) = residuals(model, data, &p);
    let mut cost = r.norm_squared();
    let mut lambda = config.initial_damping;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        iterations += 1;
        let jt = jac.transpose();
        let mut normal = &jt * &jac;
        let gradient = &jt * &r;
        for i in 0..3 {
            normal[(i, i)] += lambda * normal[(i, i)].max(1e-12);
        }
        let step = normal
            .lu()
            .solve(&gradient)
            .ok_or_else(|| GeometryError::Calibration {
                message: "normal equations are singular".to_string(),
            })?;

        let trial = bounds.clamp(std::array::from_fn(|i| p[i] + step[i]));
        let (r_trial, jac_trial) = residuals(model, data, &trial);
        let trial_cost = r_trial.norm_squared();

        if trial_cost.is_finite() && trial_cost <= cost {
            let improvement = cost - trial_cost;
            let moved = (0..3).map(|i| (trial[i] - p[i]).powi(2)).sum::<f64>().sqrt();
            p = trial;
            r = r_trial;
            jac = jac_trial;
            cost = trial_cost;
            lambda = (lambda * 0.1).max(1e-12);
            if improvement <= config.tolerance * (1.0 + cost) || moved <= config.tolerance {
                break;
            }
        } else {
            lambda *= 10.0;
            if lambda > 1e12 {
                break;
            }
        }
    }

    if !cost.is_finite() {
        return Err(GeometryError::Calibration {
            message: "fit diverged".to_string(),
        });
    }
    Ok(FitReport {
        coefficients: AngleCoefficients::new(p[0], p[1], p[2]),
        rms_residual_deg: (cost / data.len() as f64).sqrt(),
        iterations,
        samples: data.len(),
    })
}

/// Fit θn = a + b·log10 ε + c·log10² ε to (ε, θ) pairs.
pub fn fit_initial_angle(data: &[(f64, f64)], config: &CalibrationConfig) -> GeometryResult<FitReport> {
    levenberg_marquardt(
        initial_model,
        data,
        [20.0, 10.0, -1.0],
        &config.initial_bounds,
        config,
    )
}

/// Fit θe = a + b·exp(−c·ε) to (ε, θ) pairs.
pub fn fit_exit_angle(data: &[(f64, f64)], config: &CalibrationConfig) -> GeometryResult<FitReport> {
    levenberg_marquardt(exit_model, data, [6.0, 8.0, 0.12], &config.exit_bounds, config)
}

#[derive(Debug, Clone)]
pub struct CalibrationOutput {
    pub table: RaoCoefficientTable,
    pub reports: Vec<(RaoPercent, AngleKind, FitReport)>,
}

/// Fit every bell class present in `samples`.
pub fn calibrate(
    samples: &[ChartSample],
    version: &str,
    config: &CalibrationConfig,
) -> GeometryResult<CalibrationOutput> {
    if version.trim().is_empty() {
        return Err(GeometryError::Calibration {
            message: "table version must not be empty".to_string(),
        });
    }
    for s in samples {
        RaoPercent::from_percent(s.percent)?;
    }

    let mut classes = Vec::new();
    let mut reports = Vec::new();
    for percent in RaoPercent::ALL {
        let pick = |kind: AngleKind| -> Vec<(f64, f64)> {
            samples
                .iter()
                .filter(|s| s.percent == percent.percent() && s.kind == kind)
                .map(|s| (s.expansion_ratio, s.angle_deg))
                .collect()
        };
        let (initial, exit) = (pick(AngleKind::Initial), pick(AngleKind::Exit));
        if initial.is_empty() && exit.is_empty() {
            continue;
        }
        for (kind, data) in [(AngleKind::Initial, &initial), (AngleKind::Exit, &exit)] {
            if data.len() < config.min_samples {
                return Err(GeometryError::Calibration {
                    message: format!(
                        "{percent} {kind:?}: {} samples, need at least {}",
                        data.len(),
                        config.min_samples
                    ),
                });
            }
        }

        let n_fit = fit_initial_angle(&initial, config)?;
        let e_fit = fit_exit_angle(&exit, config)?;
        debug!(
            %percent,
            initial_rms = n_fit.rms_residual_deg,
            exit_rms = e_fit.rms_residual_deg,
            "Fitted Rao class"
        );
        classes.push(RaoClassFit {
            percent,
            initial: n_fit.coefficients,
            exit: e_fit.coefficients,
        });
        reports.push((percent, AngleKind::Initial, n_fit));
        reports.push((percent, AngleKind::Exit, e_fit));
    }

    if classes.is_empty() {
        return Err(GeometryError::Calibration {
            message: "no chart samples".to_string(),
        });
    }
    let table = RaoCoefficientTable {
        version: version.to_string(),
        classes,
    };
    table.validate()?;
    info!(version, classes = table.classes.len(), "Rao calibration complete");
    Ok(CalibrationOutput { table, reports })
}
