//! Isentropic expansion relations for a perfectly expanded nozzle.
//!
//! All relations are closed form. The exit Mach number follows from the
//! chamber-to-ambient pressure ratio, so the exit plane is always matched to
//! ambient pressure.

use crate::error::{FlowError, FlowResult};
use nc_core::numeric::ensure_positive;
use nc_core::units::constants::R_UNIVERSAL_J_PER_KMOL_K;
use nc_core::units::{Pressure, Temperature, Velocity, k, mps, pa};
use nc_thermo::ThermoPoint;
use serde::{Deserialize, Serialize};

/// Inputs to the expansion solve for one mixture ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpansionInputs {
    pub chamber_pressure: Pressure,
    pub chamber_temperature: Temperature,
    pub gamma: f64,
    /// kg/kmol
    pub molecular_weight: f64,
    pub ambient_pressure: Pressure,
}

impl ExpansionInputs {
    pub fn from_thermo(point: &ThermoPoint, ambient_pressure: Pressure) -> Self {
        Self {
            chamber_pressure: point.chamber_pressure,
            chamber_temperature: point.state.chamber_temperature,
            gamma: point.state.gamma,
            molecular_weight: point.state.molecular_weight,
            ambient_pressure,
        }
    }
}

/// Static conditions at one nozzle station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationState {
    pub mach: f64,
    pub temperature: Temperature,
    pub pressure: Pressure,
}

/// Throat and exit conditions of the expansion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpansionResult {
    /// Specific gas constant [J/(kg·K)]
    pub gas_constant: f64,
    pub throat: StationState,
    pub exit: StationState,
    pub exit_velocity: Velocity,
    /// Exit area / throat area
    pub expansion_ratio: f64,
}

impl ExpansionResult {
    pub fn exit_mach(&self) -> f64 {
        self.exit.mach
    }
}

fn check_gamma(gamma: f64) -> FlowResult<()> {
    if !gamma.is_finite() || gamma <= 1.0 {
        return Err(FlowError::Computation {
            what: "gamma (γ − 1 must be positive)",
            value: gamma,
        });
    }
    Ok(())
}

fn check_input(value: f64, what: &'static str) -> FlowResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FlowError::Domain { what, value });
    }
    Ok(value)
}

/// R = R_universal / MW, with MW in kg/kmol.
pub fn specific_gas_constant(molecular_weight: f64) -> FlowResult<f64> {
    let mw = ensure_positive(molecular_weight, "molecular weight")?;
    Ok(R_UNIVERSAL_J_PER_KMOL_K / mw)
}

/// Alternate form R = cp·(1 − 1/γ). Agrees with the molecular-weight form for
/// a calorically perfect gas.
pub fn gas_constant_from_specific_heat(specific_heat: f64, gamma: f64) -> FlowResult<f64> {
    check_gamma(gamma)?;
    let cp = ensure_positive(specific_heat, "specific heat")?;
    Ok(cp * (1.0 - 1.0 / gamma))
}

/// T0/T = 1 + (γ − 1)/2 · M²
pub fn stagnation_temperature_ratio(gamma: f64, mach: f64) -> f64 {
    1.0 + 0.5 * (gamma - 1.0) * mach * mach
}

/// P0/P = (T0/T)^(γ/(γ − 1))
pub fn stagnation_pressure_ratio(gamma: f64, mach: f64) -> f64 {
    stagnation_temperature_ratio(gamma, mach).powf(gamma / (gamma - 1.0))
}

/// Exit Mach number for expansion from chamber to ambient pressure.
///
/// M_e = sqrt( 2/(γ − 1) · ((Pc/Pa)^((γ − 1)/γ) − 1) )
pub fn exit_mach(chamber_pa: f64, ambient_pa: f64, gamma: f64) -> FlowResult<f64> {
    check_gamma(gamma)?;
    let pc = check_input(chamber_pa, "chamber pressure")?;
    let pa = check_input(ambient_pa, "ambient pressure")?;
    if pa >= pc {
        return Err(FlowError::Domain {
            what: "ambient pressure (must be below chamber pressure)",
            value: pa,
        });
    }

    let radicand = (2.0 / (gamma - 1.0)) * ((pc / pa).powf((gamma - 1.0) / gamma) - 1.0);
    if !radicand.is_finite() || radicand <= 0.0 {
        return Err(FlowError::Domain {
            what: "exit Mach radicand",
            value: radicand,
        });
    }
    Ok(radicand.sqrt())
}

/// Static state at Mach `mach` from stagnation (chamber) conditions.
pub fn station_state(
    chamber_pa: f64,
    chamber_k: f64,
    gamma: f64,
    mach: f64,
) -> FlowResult<StationState> {
    check_gamma(gamma)?;
    let pc = check_input(chamber_pa, "chamber pressure")?;
    let tc = check_input(chamber_k, "chamber temperature")?;
    if !mach.is_finite() || mach < 0.0 {
        return Err(FlowError::Domain {
            what: "Mach number",
            value: mach,
        });
    }

    let temperature = tc / stagnation_temperature_ratio(gamma, mach);
    let pressure = pc * stagnation_pressure_ratio(gamma, mach).powi(-1);
    ensure_positive(temperature, "static temperature")?;
    ensure_positive(pressure, "static pressure")?;
    Ok(StationState {
        mach,
        temperature: k(temperature),
        pressure: pa(pressure),
    })
}

/// Sonic (throat) conditions, written directly in critical-ratio form.
///
/// T* = Tc · 2/(γ + 1), P* = Pc · (2/(γ + 1))^(γ/(γ − 1))
pub fn sonic_state(chamber_pa: f64, chamber_k: f64, gamma: f64) -> FlowResult<StationState> {
    check_gamma(gamma)?;
    let pc = check_input(chamber_pa, "chamber pressure")?;
    let tc = check_input(chamber_k, "chamber temperature")?;
    let critical = 2.0 / (gamma + 1.0);
    Ok(StationState {
        mach: 1.0,
        temperature: k(tc * critical),
        pressure: pa(pc * critical.powf(gamma / (gamma - 1.0))),
    })
}

/// Isentropic area–Mach relation A/A*.
///
/// ε = (1/M) · [ (2/(γ + 1)) · (1 + (γ − 1)/2 · M²) ]^((γ + 1)/(2(γ − 1)))
pub fn area_ratio(gamma: f64, mach: f64) -> FlowResult<f64> {
    check_gamma(gamma)?;
    if !mach.is_finite() || mach <= 0.0 {
        return Err(FlowError::Domain {
            what: "Mach number",
            value: mach,
        });
    }
    let exponent = (gamma + 1.0) / (2.0 * (gamma - 1.0));
    let ratio =
        ((2.0 / (gamma + 1.0)) * stagnation_temperature_ratio(gamma, mach)).powf(exponent) / mach;
    Ok(ensure_positive(ratio, "expansion ratio")?)
}

/// Solve throat and exit conditions for one chamber state.
pub fn solve_expansion(inputs: &ExpansionInputs) -> FlowResult<ExpansionResult> {
    let gamma = inputs.gamma;
    let pc = inputs.chamber_pressure.value;
    let tc = inputs.chamber_temperature.value;

    let gas_constant = specific_gas_constant(inputs.molecular_weight)?;
    let mach_exit = exit_mach(pc, inputs.ambient_pressure.value, gamma)?;

    let throat = sonic_state(pc, tc, gamma)?;
    let exit = station_state(pc, tc, gamma, mach_exit)?;

    let exit_velocity = mach_exit * (gamma * gas_constant * exit.temperature.value).sqrt();
    let exit_velocity = ensure_positive(exit_velocity, "exit velocity")?;
    let expansion_ratio = area_ratio(gamma, mach_exit)?;

    Ok(ExpansionResult {
        gas_constant,
        throat,
        exit,
        exit_velocity: mps(exit_velocity),
        expansion_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_core::numeric::relative_difference;

    fn reference_inputs() -> ExpansionInputs {
        ExpansionInputs {
            chamber_pressure: pa(2.0e6),
            chamber_temperature: k(3_500.0),
            gamma: 1.22,
            molecular_weight: 22.5,
            ambient_pressure: pa(101_325.0),
        }
    }

    #[test]
    fn textbook_ratios_for_air() {
        // γ = 1.4, M = 2: T0/T = 1.8, P0/P = 7.824, A/A* = 1.6875
        assert!((stagnation_temperature_ratio(1.4, 2.0) - 1.8).abs() < 1e-12);
        assert!((stagnation_pressure_ratio(1.4, 2.0) - 7.824).abs() < 1e-3);
        assert!((area_ratio(1.4, 2.0).unwrap() - 1.6875).abs() < 1e-4);
    }

    #[test]
    fn area_ratio_is_unity_at_sonic() {
        for gamma in [1.1, 1.22, 1.4, 1.67] {
            assert!((area_ratio(gamma, 1.0).unwrap() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn sonic_state_matches_station_state_at_mach_one() {
        for gamma in [1.12, 1.22, 1.4] {
            let sonic = sonic_state(2.0e6, 3_500.0, gamma).unwrap();
            let station = station_state(2.0e6, 3_500.0, gamma, 1.0).unwrap();
            assert!(relative_difference(sonic.temperature.value, station.temperature.value) < 1e-12);
            assert!(relative_difference(sonic.pressure.value, station.pressure.value) < 1e-12);
        }
    }

    #[test]
    fn exit_is_matched_to_ambient() {
        let result = solve_expansion(&reference_inputs()).unwrap();
        assert!(relative_difference(result.exit.pressure.value, 101_325.0) < 1e-9);
        assert!(result.exit_mach() > 1.0);
        assert!(result.expansion_ratio > 1.0);
        assert!(result.exit.temperature.value < result.throat.temperature.value);
    }

    #[test]
    fn gas_constant_forms_agree_for_consistent_data() {
        let r_mw = specific_gas_constant(22.5).unwrap();
        let cp = 1.22 * r_mw / 0.22;
        let r_cp = gas_constant_from_specific_heat(cp, 1.22).unwrap();
        assert!(relative_difference(r_mw, r_cp) < 1e-12);
    }

    #[test]
    fn ambient_at_or_above_chamber_is_domain_error() {
        let mut inputs = reference_inputs();
        inputs.ambient_pressure = pa(2.0e6);
        assert!(matches!(
            solve_expansion(&inputs),
            Err(FlowError::Domain { value, .. }) if value == 2.0e6
        ));
        inputs.ambient_pressure = pa(3.0e6);
        assert!(matches!(
            solve_expansion(&inputs),
            Err(FlowError::Domain { .. })
        ));
    }

    #[test]
    fn unit_gamma_is_computation_error() {
        let mut inputs = reference_inputs();
        inputs.gamma = 1.0;
        assert!(matches!(
            solve_expansion(&inputs),
            Err(FlowError::Computation { .. })
        ));
    }

    #[test]
    fn zero_molecular_weight_is_computation_error() {
        let mut inputs = reference_inputs();
        inputs.molecular_weight = 0.0;
        assert!(matches!(
            solve_expansion(&inputs),
            Err(FlowError::Computation {
                what: "molecular weight",
                ..
            })
        ));
    }
}
