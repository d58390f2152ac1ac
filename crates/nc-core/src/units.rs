// nc-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Force as UomForce, MassDensity as UomMassDensity, MassRate as UomMassRate,
    Pressure as UomPressure, ThermodynamicTemperature as UomThermodynamicTemperature,
    Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Density = UomMassDensity;
pub type Force = UomForce;
pub type MassRate = UomMassRate;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Velocity = UomVelocity;

/// Specific heat capacity [J/(kg·K)].
pub type SpecHeatCapacity = f64;

/// Molecular weight [kg/kmol].
pub type MolecularWeight = f64;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn newtons(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

pub mod constants {
    /// Standard gravity [m/s²].
    pub const G0_MPS2: f64 = 9.806_65;

    /// Universal gas constant [J/(kmol·K)].
    pub const R_UNIVERSAL_J_PER_KMOL_K: f64 = 8_314.462_618;

    /// Standard sea-level atmosphere [Pa].
    pub const STANDARD_ATMOSPHERE_PA: f64 = 101_325.0;
}
