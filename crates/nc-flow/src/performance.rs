//! Inverse sizing: from a target thrust and a solved expansion to mass flow,
//! specific impulse and throat/exit areas.

use crate::error::{FlowError, FlowResult};
use crate::isentropic::{ExpansionInputs, ExpansionResult};
use nc_core::numeric::ensure_positive;
use nc_core::units::constants::G0_MPS2;
use nc_core::units::{
    Area, Force, MassRate, Pressure, Temperature, Velocity, kgps, m2, mps,
};
use serde::{Deserialize, Serialize};

/// What the engine must deliver at one operating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingTarget {
    pub thrust: Force,
    pub mixture_ratio: f64,
}

/// Performance and sizing for one mixture ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub mixture_ratio: f64,
    pub thrust: Force,
    pub gas_constant: f64,
    pub exit_mach: f64,
    pub throat_temperature: Temperature,
    pub throat_pressure: Pressure,
    pub exit_temperature: Temperature,
    pub exit_pressure: Pressure,
    pub exit_velocity: Velocity,
    pub mass_flow: MassRate,
    pub oxidizer_mass_flow: MassRate,
    pub fuel_mass_flow: MassRate,
    pub throat_area: Area,
    pub exit_area: Area,
    pub expansion_ratio: f64,
    pub specific_impulse_s: f64,
    pub characteristic_velocity: Velocity,
}

/// Γ = (2/(γ + 1))^((γ + 1)/(2(γ − 1)))
pub fn choked_flow_parameter(gamma: f64) -> FlowResult<f64> {
    if !gamma.is_finite() || gamma <= 1.0 {
        return Err(FlowError::Computation {
            what: "gamma (γ − 1 must be positive)",
            value: gamma,
        });
    }
    Ok((2.0 / (gamma + 1.0)).powf((gamma + 1.0) / (2.0 * (gamma - 1.0))))
}

/// c* = sqrt(R·Tc/γ) / Γ
pub fn characteristic_velocity_closed_form(
    gamma: f64,
    gas_constant: f64,
    chamber_k: f64,
) -> FlowResult<f64> {
    let big_gamma = choked_flow_parameter(gamma)?;
    let c_star = (gas_constant * chamber_k / gamma).sqrt() / big_gamma;
    Ok(ensure_positive(c_star, "characteristic velocity")?)
}

/// Split total mass flow into (oxidizer, fuel) by mixture ratio O/F.
pub fn propellant_split(mass_flow: f64, mixture_ratio: f64) -> FlowResult<(f64, f64)> {
    if !mixture_ratio.is_finite() || mixture_ratio <= 0.0 {
        return Err(FlowError::Domain {
            what: "mixture ratio",
            value: mixture_ratio,
        });
    }
    let mdot = ensure_positive(mass_flow, "mass flow")?;
    let fuel = mdot / (1.0 + mixture_ratio);
    Ok((mdot - fuel, fuel))
}

/// Size the engine so that it produces `target.thrust` with the given expansion.
///
/// ṁ = F / v_e, Isp = F / (ṁ·g0),
/// A_t = ṁ·sqrt(Tc) / (Pc·sqrt(γ/R)·Γ), A_e = A_t·ε
pub fn characterize(
    inputs: &ExpansionInputs,
    expansion: &ExpansionResult,
    target: &SizingTarget,
) -> FlowResult<PerformancePoint> {
    let thrust = target.thrust.value;
    if !thrust.is_finite() || thrust <= 0.0 {
        return Err(FlowError::Domain {
            what: "thrust",
            value: thrust,
        });
    }

    let gamma = inputs.gamma;
    let pc = inputs.chamber_pressure.value;
    let tc = inputs.chamber_temperature.value;
    let r = expansion.gas_constant;
    let ve = ensure_positive(expansion.exit_velocity.value, "exit velocity")?;

    let mass_flow = ensure_positive(thrust / ve, "mass flow")?;
    let isp = ensure_positive(thrust / (mass_flow * G0_MPS2), "specific impulse")?;

    let big_gamma = choked_flow_parameter(gamma)?;
    let throat_area = mass_flow * tc.sqrt() / (pc * (gamma / r).sqrt() * big_gamma);
    let throat_area = ensure_positive(throat_area, "throat area")?;
    let exit_area = ensure_positive(throat_area * expansion.expansion_ratio, "exit area")?;
    let c_star = ensure_positive(pc * throat_area / mass_flow, "characteristic velocity")?;

    let (oxidizer, fuel) = propellant_split(mass_flow, target.mixture_ratio)?;

    Ok(PerformancePoint {
        mixture_ratio: target.mixture_ratio,
        thrust: target.thrust,
        gas_constant: r,
        exit_mach: expansion.exit.mach,
        throat_temperature: expansion.throat.temperature,
        throat_pressure: expansion.throat.pressure,
        exit_temperature: expansion.exit.temperature,
        exit_pressure: expansion.exit.pressure,
        exit_velocity: expansion.exit_velocity,
        mass_flow: kgps(mass_flow),
        oxidizer_mass_flow: kgps(oxidizer),
        fuel_mass_flow: kgps(fuel),
        throat_area: m2(throat_area),
        exit_area: m2(exit_area),
        expansion_ratio: expansion.expansion_ratio,
        specific_impulse_s: isp,
        characteristic_velocity: mps(c_star),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isentropic::solve_expansion;
    use nc_core::numeric::relative_difference;
    use nc_core::units::{k, newtons, pa};

    fn sized(gamma: f64) -> (ExpansionInputs, PerformancePoint) {
        let inputs = ExpansionInputs {
            chamber_pressure: pa(2.0e6),
            chamber_temperature: k(3_400.0),
            gamma,
            molecular_weight: 22.0,
            ambient_pressure: pa(101_325.0),
        };
        let expansion = solve_expansion(&inputs).unwrap();
        let target = SizingTarget {
            thrust: newtons(5_000.0),
            mixture_ratio: 2.4,
        };
        (inputs, characterize(&inputs, &expansion, &target).unwrap())
    }

    #[test]
    fn isp_equals_exit_velocity_over_g0() {
        let (_, perf) = sized(1.22);
        let expected = perf.exit_velocity.value / G0_MPS2;
        assert!(relative_difference(perf.specific_impulse_s, expected) < 1e-12);
    }

    #[test]
    fn characteristic_velocity_matches_closed_form() {
        for gamma in [1.15, 1.22, 1.3] {
            let (inputs, perf) = sized(gamma);
            let closed = characteristic_velocity_closed_form(
                gamma,
                perf.gas_constant,
                inputs.chamber_temperature.value,
            )
            .unwrap();
            assert!(relative_difference(perf.characteristic_velocity.value, closed) < 1e-9);
        }
    }

    #[test]
    fn exit_area_scales_throat_by_expansion_ratio() {
        let (_, perf) = sized(1.22);
        let ratio = perf.exit_area.value / perf.throat_area.value;
        assert!(relative_difference(ratio, perf.expansion_ratio) < 1e-12);
    }

    #[test]
    fn split_recovers_total_and_ratio() {
        let (ox, fuel) = propellant_split(3.4, 2.4).unwrap();
        assert!((ox + fuel - 3.4).abs() < 1e-12);
        assert!((ox / fuel - 2.4).abs() < 1e-12);
    }

    #[test]
    fn non_positive_mixture_ratio_rejected() {
        assert!(matches!(
            propellant_split(1.0, 0.0),
            Err(FlowError::Domain { what: "mixture ratio", .. })
        ));
    }

    #[test]
    fn zero_thrust_rejected() {
        let inputs = ExpansionInputs {
            chamber_pressure: pa(2.0e6),
            chamber_temperature: k(3_400.0),
            gamma: 1.22,
            molecular_weight: 22.0,
            ambient_pressure: pa(101_325.0),
        };
        let expansion = solve_expansion(&inputs).unwrap();
        let target = SizingTarget {
            thrust: newtons(0.0),
            mixture_ratio: 2.4,
        };
        assert!(characterize(&inputs, &expansion, &target).is_err());
    }
}
