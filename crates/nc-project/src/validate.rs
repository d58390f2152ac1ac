//! Design file resolution and input validation.
//!
//! Everything here runs before any physics: failures name the offending
//! field so the user can fix the file.

use crate::schema::{EngineDesignFile, EngineInputs, NozzleInputs, QuantityValue};
use crate::units::{Quantity, UnitError};
use crate::LATEST_VERSION;
use nc_core::units::constants::STANDARD_ATMOSPHERE_PA;
use nc_core::units::{newtons, pa};
use nc_geometry::{NozzleKind, RaoPercent};
use nc_thermo::{FlowMode, MixtureRatioGrid};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing field: {field} ({reason})")]
    Missing { field: String, reason: String },

    #[error("Invalid quantity for {field}: {source}")]
    Unit {
        field: String,
        #[source]
        source: UnitError,
    },

    #[error("Unsupported version: {version} (latest supported is {latest})")]
    UnsupportedVersion { version: u32, latest: u32 },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::InvalidValue { field, .. }
            | ValidationError::Missing { field, .. }
            | ValidationError::Unit { field, .. } => field,
            ValidationError::UnsupportedVersion { .. } => "version",
        }
    }

    /// Offending value rendered as text, when there is one.
    pub fn value(&self) -> Option<String> {
        match self {
            ValidationError::InvalidValue { value, .. } => Some(value.clone()),
            ValidationError::UnsupportedVersion { version, .. } => Some(version.to_string()),
            _ => None,
        }
    }

    fn invalid(field: &str, value: f64, reason: &str) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn resolve(value: &QuantityValue, quantity: Quantity, field: &str) -> Result<f64, ValidationError> {
    value.resolve(quantity).map_err(|source| ValidationError::Unit {
        field: field.to_string(),
        source,
    })
}

fn require_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::invalid(field, value, "must be positive and finite"));
    }
    Ok(())
}

fn require_half_angle(field: &str, deg: f64) -> Result<(), ValidationError> {
    if !deg.is_finite() || deg <= 0.0 || deg >= 90.0 {
        return Err(ValidationError::invalid(
            field,
            deg,
            "half angle must lie strictly between 0 and 90 degrees",
        ));
    }
    Ok(())
}

/// Parse units, apply defaults and validate, producing SI engine inputs.
pub fn resolve_design(file: &EngineDesignFile) -> Result<EngineInputs, ValidationError> {
    if file.version == 0 || file.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: file.version,
            latest: LATEST_VERSION,
        });
    }
    let engine = &file.engine;

    let ambient_pa = if engine.standard_ambient {
        STANDARD_ATMOSPHERE_PA
    } else {
        let value = engine
            .ambient_pressure
            .as_ref()
            .ok_or_else(|| ValidationError::Missing {
                field: "ambient_pressure".to_string(),
                reason: "required unless standard_ambient is true".to_string(),
            })?;
        resolve(value, Quantity::Pressure, "ambient_pressure")?
    };

    let nozzle = match engine.nozzle_type {
        NozzleKind::Conical => {
            let divergent = engine
                .divergent_angle
                .as_ref()
                .ok_or_else(|| ValidationError::Missing {
                    field: "divergent_angle".to_string(),
                    reason: "required for a conical nozzle".to_string(),
                })?;
            let throat_ratio = engine.throat_ratio.ok_or_else(|| ValidationError::Missing {
                field: "throat_ratio".to_string(),
                reason: "required for a conical nozzle".to_string(),
            })?;
            NozzleInputs::Conical {
                divergent_angle_deg: resolve(divergent, Quantity::Angle, "divergent_angle")?,
                throat_ratio,
            }
        }
        NozzleKind::Bell => {
            let percent = engine.bell_percent.ok_or_else(|| ValidationError::Missing {
                field: "bell_percent".to_string(),
                reason: "required for a bell nozzle".to_string(),
            })?;
            let bell_percent =
                RaoPercent::from_percent(percent).map_err(|e| ValidationError::InvalidValue {
                    field: "bell_percent".to_string(),
                    value: percent.to_string(),
                    reason: e.to_string(),
                })?;
            NozzleInputs::Bell { bell_percent }
        }
    };

    let inputs = EngineInputs {
        fuel: engine.fuel.clone(),
        oxidizer: engine.oxidizer.clone(),
        mode: FlowMode::from_frozen_flag(engine.frozen),
        chamber_pressure: pa(resolve(
            &engine.chamber_pressure,
            Quantity::Pressure,
            "chamber_pressure",
        )?),
        ambient_pressure: pa(ambient_pa),
        thrust: newtons(resolve(&engine.thrust, Quantity::Force, "thrust")?),
        mixture_ratio: engine.mixture_ratio,
        nozzle,
        contraction_ratio: engine.contraction_ratio,
        convergent_angle_deg: resolve(
            &engine.convergent_angle,
            Quantity::Angle,
            "convergent_angle",
        )?,
        l_star_m: resolve(&engine.l_star, Quantity::Length, "l_star")?,
        resolution: file.resolution.unwrap_or_default(),
    };
    validate_inputs(&inputs)?;
    Ok(inputs)
}

/// Domain checks on resolved inputs.
///
/// Ambient at or above chamber pressure is deliberately not checked here:
/// it is reported by the expansion step as a physical-validity failure.
pub fn validate_inputs(inputs: &EngineInputs) -> Result<(), ValidationError> {
    for (field, name) in [("fuel", &inputs.fuel), ("oxidizer", &inputs.oxidizer)] {
        if name.trim().is_empty() {
            return Err(ValidationError::Missing {
                field: field.to_string(),
                reason: "propellant identifier must not be empty".to_string(),
            });
        }
    }

    require_positive("chamber_pressure", inputs.chamber_pressure.value)?;
    require_positive("ambient_pressure", inputs.ambient_pressure.value)?;
    require_positive("thrust", inputs.thrust.value)?;
    require_positive("l_star", inputs.l_star_m)?;
    require_half_angle("convergent_angle", inputs.convergent_angle_deg)?;

    if !inputs.contraction_ratio.is_finite() || inputs.contraction_ratio <= 1.0 {
        return Err(ValidationError::invalid(
            "contraction_ratio",
            inputs.contraction_ratio,
            "must exceed 1",
        ));
    }

    if let NozzleInputs::Conical {
        divergent_angle_deg,
        throat_ratio,
    } = inputs.nozzle
    {
        require_half_angle("divergent_angle", divergent_angle_deg)?;
        require_positive("throat_ratio", throat_ratio)?;
    }

    MixtureRatioGrid::from_spec(&inputs.mixture_ratio).map_err(|e| {
        ValidationError::InvalidValue {
            field: e.field().to_string(),
            value: match e {
                nc_thermo::GridError::InvalidValue { value, .. } => value.to_string(),
                nc_thermo::GridError::TooManyPoints { points, .. } => points.to_string(),
            },
            reason: e.to_string(),
        }
    })?;

    let r = &inputs.resolution;
    for (field, n) in [
        ("resolution.line_points", r.line_points),
        ("resolution.arc_points", r.arc_points),
        ("resolution.bezier_points", r.bezier_points),
    ] {
        if n < 2 {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: n.to_string(),
                reason: "at least two samples per segment".to_string(),
            });
        }
    }
    Ok(())
}
