//! Unit-tagged numeric inputs.
//!
//! Design files may give dimensional values either as bare numbers (already
//! SI) or as text with a unit suffix (`"20 bar"`, `"5 kN"`, `"1.1 m"`,
//! `"30 deg"`). [`parse_quantity`] is the single parsing boundary; it returns
//! the canonical value for the quantity family.

use std::fmt;
use thiserror::Error;

/// Dimension/quantity family for a numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Absolute pressure (canonical: Pa)
    Pressure,
    /// Force (canonical: N)
    Force,
    /// Length (canonical: m)
    Length,
    /// Plane angle (canonical: degrees)
    Angle,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pressure => write!(f, "Pressure"),
            Self::Force => write!(f, "Force"),
            Self::Length => write!(f, "Length"),
            Self::Angle => write!(f, "Angle"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown unit '{unit}' for {quantity}")]
    UnknownUnit { unit: String, quantity: Quantity },

    #[error("Ambiguous unit '{unit}': {reason}")]
    AmbiguousUnit { unit: String, reason: String },
}

/// Parse `raw_text` as a value of `quantity`, converting to canonical units.
///
/// No unit suffix means the value is already canonical. Range checks belong
/// to the caller, which knows the field.
pub fn parse_quantity(raw_text: &str, quantity: Quantity) -> Result<f64, UnitError> {
    let trimmed = raw_text.trim();
    match quantity {
        Quantity::Pressure => parse_pressure(trimmed),
        Quantity::Force => parse_force(trimmed),
        Quantity::Length => parse_length(trimmed),
        Quantity::Angle => parse_angle(trimmed),
    }
}

fn unknown(unit: &str, quantity: Quantity) -> UnitError {
    UnitError::UnknownUnit {
        unit: unit.to_string(),
        quantity,
    }
}

fn parse_pressure(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;
    let pa = match unit.to_lowercase().as_str() {
        "pa" | "pascal" => value,
        "kpa" => value * 1e3,
        "mpa" => value * 1e6,
        "bar" => value * 1e5,
        "mbar" | "millibar" => value * 100.0,
        "atm" => value * 101_325.0,
        "psia" => value * 6_894.757,
        "psi" | "psig" => {
            return Err(UnitError::AmbiguousUnit {
                unit,
                reason: "Use 'psia'; chamber and ambient pressures are absolute".to_string(),
            });
        }
        "" => value,
        _ => return Err(unknown(&unit, Quantity::Pressure)),
    };
    Ok(pa)
}

fn parse_force(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;
    let n = match unit.to_lowercase().as_str() {
        "n" | "newton" => value,
        "kn" => value * 1e3,
        "mn" => value * 1e6,
        "lbf" => value * 4.448_222,
        "kgf" => value * 9.806_65,
        "lb" => {
            return Err(UnitError::AmbiguousUnit {
                unit,
                reason: "Use 'lbf' for force".to_string(),
            });
        }
        "" => value,
        _ => return Err(unknown(&unit, Quantity::Force)),
    };
    Ok(n)
}

fn parse_length(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;
    let m = match unit.to_lowercase().as_str() {
        "m" | "meter" | "metre" => value,
        "cm" => value * 1e-2,
        "mm" => value * 1e-3,
        "in" | "inch" => value * 0.0254,
        "ft" | "foot" => value * 0.3048,
        "" => value,
        _ => return Err(unknown(&unit, Quantity::Length)),
    };
    Ok(m)
}

fn parse_angle(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;
    let deg = match unit.to_lowercase().as_str() {
        "deg" | "°" | "degree" | "degrees" => value,
        "rad" | "radian" | "radians" => value.to_degrees(),
        "" => value,
        _ => return Err(unknown(&unit, Quantity::Angle)),
    };
    Ok(deg)
}

/// Split "14.7 psia" into (14.7, "psia"); "300" gives (300.0, "").
fn split_value_and_unit(input: &str) -> Result<(f64, String), UnitError> {
    let trimmed = input.trim();

    // Exponent markers only count when followed by a digit or sign.
    let bytes = trimmed.as_bytes();
    let split_idx = trimmed
        .char_indices()
        .find(|&(i, c)| {
            if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' {
                return false;
            }
            if c == 'e' || c == 'E' {
                let next = bytes.get(i + 1).copied();
                return !matches!(next, Some(b'0'..=b'9' | b'-' | b'+'));
            }
            true
        })
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    let (num_part, unit_part) = trimmed.split_at(split_idx);
    let value: f64 = num_part.trim().parse().map_err(|_| {
        UnitError::ParseError(format!("Could not parse numeric value from '{}'", input))
    })?;
    Ok((value, unit_part.trim().to_string()))
}
