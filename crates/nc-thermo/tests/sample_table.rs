use std::path::PathBuf;

use nc_core::units::bar;
use nc_thermo::{
    CachedProvider, FlowMode, MixtureRatioGrid, TabulatedProvider, ThermoProvider, ThermoQuery,
};

fn sample_table_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/lox_rp1.yaml")
}

#[test]
fn sample_table_loads_and_covers_reference_sweep() {
    let provider = TabulatedProvider::load(&sample_table_path()).expect("failed to load table");
    let propellants = provider.propellants();
    assert!(propellants.iter().any(|(_, _, mode)| *mode == FlowMode::Frozen));
    assert!(propellants.iter().any(|(_, _, mode)| *mode == FlowMode::Equilibrium));

    let grid = MixtureRatioGrid::sweep(0.8, 3.8, 0.2).expect("valid grid");
    let cached = CachedProvider::new(provider);
    for of in grid.iter() {
        let query = ThermoQuery {
            mixture_ratio: of,
            chamber_pressure: bar(20.0),
            fuel: "RP-1",
            oxidizer: "LOX",
            mode: FlowMode::Frozen,
        };
        let point = cached.thermo_point(&query).expect("point inside table");
        assert!(point.gamma() > 1.0);
        assert!(point.chamber_temperature_k() > 2_000.0);
    }
    assert_eq!(cached.len(), grid.len());
}

#[test]
fn reference_point_has_expected_gamma() {
    let provider = TabulatedProvider::load(&sample_table_path()).expect("failed to load table");
    let query = ThermoQuery {
        mixture_ratio: 2.5,
        chamber_pressure: bar(20.0),
        fuel: "RP-1",
        oxidizer: "LOX",
        mode: FlowMode::Frozen,
    };
    let state = provider.evaluate(&query).expect("reference point");
    assert!((state.gamma - 1.22).abs() < 0.01);
}
