//! Mixture-ratio grid generation.
//!
//! A design run evaluates either one mixture ratio or an arithmetic sweep
//! `min, min + step, …, max`. The final point is kept even when floating
//! round-off leaves `min + n·step` a hair above or below `max`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Relative slack when deciding whether the last step lands on `max`.
const ENDPOINT_TOLERANCE: f64 = 1e-9;

/// Upper bound on generated points; anything larger is a typo in the increment.
pub const MAX_GRID_POINTS: usize = 100_000;

/// Mixture-ratio selection as written in a design file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixtureRatioSpec {
    /// One design point.
    Single(f64),
    /// Arithmetic sweep, inclusive of `max`.
    Sweep { min: f64, max: f64, increment: f64 },
}

/// Invalid grid definition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Invalid {field}: {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Sweep would generate {points} points (limit {limit})")]
    TooManyPoints { points: usize, limit: usize },
}

impl GridError {
    pub fn field(&self) -> &'static str {
        match self {
            GridError::InvalidValue { field, .. } => field,
            GridError::TooManyPoints { .. } => "mixture_ratio.increment",
        }
    }
}

/// Ordered, strictly increasing, non-empty list of mixture ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixtureRatioGrid {
    values: Vec<f64>,
}

impl MixtureRatioGrid {
    /// Build the grid for a single point or a sweep.
    pub fn from_spec(spec: &MixtureRatioSpec) -> Result<Self, GridError> {
        match *spec {
            MixtureRatioSpec::Single(value) => Self::single(value),
            MixtureRatioSpec::Sweep {
                min,
                max,
                increment,
            } => Self::sweep(min, max, increment),
        }
    }

    pub fn single(value: f64) -> Result<Self, GridError> {
        check_positive("mixture_ratio", value)?;
        Ok(Self {
            values: vec![value],
        })
    }

    pub fn sweep(min: f64, max: f64, increment: f64) -> Result<Self, GridError> {
        check_positive("mixture_ratio.min", min)?;
        check_positive("mixture_ratio.max", max)?;
        check_positive("mixture_ratio.increment", increment)?;
        if min > max {
            return Err(GridError::InvalidValue {
                field: "mixture_ratio.min",
                value: min,
                reason: "must not exceed mixture_ratio.max",
            });
        }

        let span = (max - min) / increment;
        let steps = (span + ENDPOINT_TOLERANCE * span.max(1.0)).floor();
        if !steps.is_finite() || steps >= MAX_GRID_POINTS as f64 {
            return Err(GridError::TooManyPoints {
                points: if steps.is_finite() {
                    steps as usize + 1
                } else {
                    usize::MAX
                },
                limit: MAX_GRID_POINTS,
            });
        }
        let steps = steps as usize;

        let mut values = Vec::with_capacity(steps + 1);
        for i in 0..=steps {
            values.push(min + i as f64 * increment);
        }

        // Snap the last point onto max when it only differs by round-off
        if let Some(last) = values.last_mut() {
            if (*last - max).abs() <= ENDPOINT_TOLERANCE * increment.max(max.abs()) {
                *last = max;
            }
        }

        // An increment below the ulp of min collapses neighbouring points
        if values.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GridError::InvalidValue {
                field: "mixture_ratio.increment",
                value: increment,
                reason: "too small to produce strictly increasing values",
            });
        }

        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed grid; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), GridError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GridError::InvalidValue {
            field,
            value,
            reason: "must be positive and finite",
        });
    }
    Ok(())
}

impl fmt::Display for MixtureRatioSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(v) => write!(f, "O/F {}", v),
            Self::Sweep {
                min,
                max,
                increment,
            } => write!(f, "O/F {} to {} step {}", min, max, increment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_includes_final_point() {
        let grid = MixtureRatioGrid::sweep(0.8, 3.8, 0.2).unwrap();
        assert_eq!(grid.len(), 16);
        assert_eq!(grid.values()[0], 0.8);
        assert_eq!(*grid.values().last().unwrap(), 3.8);
    }

    #[test]
    fn sweep_with_min_equal_max_is_single_point() {
        let grid = MixtureRatioGrid::sweep(2.5, 2.5, 0.1).unwrap();
        assert_eq!(grid.values(), &[2.5]);
    }

    #[test]
    fn sweep_not_landing_on_max_stops_below() {
        let grid = MixtureRatioGrid::sweep(1.0, 2.0, 0.3).unwrap();
        assert_eq!(grid.len(), 4);
        assert!((grid.values()[3] - 1.9).abs() < 1e-12);
    }

    #[test]
    fn single_point() {
        let grid = MixtureRatioGrid::from_spec(&MixtureRatioSpec::Single(2.5)).unwrap();
        assert_eq!(grid.values(), &[2.5]);
        assert!(!grid.is_empty());
    }

    #[test]
    fn reject_non_positive_single() {
        let err = MixtureRatioGrid::single(0.0).unwrap_err();
        assert_eq!(err.field(), "mixture_ratio");
        assert!(MixtureRatioGrid::single(-1.0).is_err());
        assert!(MixtureRatioGrid::single(f64::NAN).is_err());
    }

    #[test]
    fn reject_inverted_bounds() {
        let err = MixtureRatioGrid::sweep(3.0, 2.0, 0.1).unwrap_err();
        assert_eq!(err.field(), "mixture_ratio.min");
    }

    #[test]
    fn reject_zero_increment() {
        let err = MixtureRatioGrid::sweep(1.0, 2.0, 0.0).unwrap_err();
        assert_eq!(err.field(), "mixture_ratio.increment");
    }

    #[test]
    fn reject_increment_below_resolution() {
        let err = MixtureRatioGrid::sweep(1.0, 1.0 + 1e-15, 1e-17).unwrap_err();
        assert_eq!(err.field(), "mixture_ratio.increment");
        assert!(matches!(err, GridError::InvalidValue { .. }));
    }

    #[test]
    fn reject_absurd_point_count() {
        assert!(matches!(
            MixtureRatioGrid::sweep(1.0, 1000.0, 1e-6),
            Err(GridError::TooManyPoints { .. })
        ));
    }

    fn spec_yaml(text: &str) -> MixtureRatioSpec {
        serde_yaml::with::singleton_map::deserialize(serde_yaml::Deserializer::from_str(text))
            .unwrap()
    }

    #[test]
    fn spec_from_yaml() {
        let spec = spec_yaml("sweep: { min: 0.8, max: 3.8, increment: 0.2 }");
        assert_eq!(
            spec,
            MixtureRatioSpec::Sweep {
                min: 0.8,
                max: 3.8,
                increment: 0.2
            }
        );
        let spec = spec_yaml("single: 2.5");
        assert_eq!(spec, MixtureRatioSpec::Single(2.5));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sweep_is_strictly_increasing_and_bounded(
            min in 0.1_f64..5.0,
            span in 0.0_f64..5.0,
            increment in 0.01_f64..1.0,
        ) {
            let max = min + span;
            let grid = MixtureRatioGrid::sweep(min, max, increment).unwrap();
            prop_assert!(!grid.is_empty());
            prop_assert_eq!(grid.values()[0], min);
            for pair in grid.values().windows(2) {
                prop_assert!(pair[1] > pair[0]);
            }
            let last = *grid.values().last().unwrap();
            prop_assert!(last <= max);
            prop_assert!(max - last < increment * (1.0 + 1e-9));
        }
    }
}
