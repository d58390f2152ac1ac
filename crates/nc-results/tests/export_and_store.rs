use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use nc_core::units::{k, kg_per_m3};
use nc_geometry::{RaoCoefficientTable, RaoPercent};
use nc_pipeline::{DesignSweepResult, SweepOrchestrator};
use nc_project::{EngineInputs, NozzleInputs};
use nc_results::{
    ENGINE_COLUMNS, NOT_APPLICABLE, RunManifest, RunStore, compute_run_id, export_sweep,
    write_contour_table, write_engine_table, write_thermo_table,
};
use nc_thermo::{
    ChamberState, MixtureRatioSpec, ProviderResult, ThermoProvider, ThermoQuery, ThermoTableFile,
};

struct Fixed;

impl ThermoProvider for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    fn evaluate(&self, query: &ThermoQuery<'_>) -> ProviderResult<ChamberState> {
        Ok(ChamberState {
            chamber_temperature: k(3_200.0 + 40.0 * query.mixture_ratio),
            gamma: 1.22,
            molecular_weight: 22.0,
            density: kg_per_m3(1.6),
            specific_heat: 2_000.0,
        })
    }
}

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn conical_inputs() -> EngineInputs {
    let mut inputs = EngineInputs::example_conical();
    inputs.mixture_ratio = MixtureRatioSpec::Sweep {
        min: 2.0,
        max: 2.8,
        increment: 0.4,
    };
    inputs
}

fn sweep(inputs: &EngineInputs) -> DesignSweepResult {
    SweepOrchestrator::new(Fixed)
        .run(inputs)
        .expect("sweep should succeed")
}

fn parse(bytes: Vec<u8>) -> Vec<Vec<String>> {
    let text = String::from_utf8(bytes).expect("utf-8 csv");
    text.lines()
        .map(|l| l.split(',').map(str::to_string).collect())
        .collect()
}

#[test]
fn thermo_table_has_one_row_per_point() {
    let result = sweep(&conical_inputs());
    let mut buf = Vec::new();
    write_thermo_table(&mut buf, &result).expect("write thermo table");

    let rows = parse(buf);
    assert_eq!(rows.len(), 4);
    assert_eq!(
        rows[0],
        [
            "OF",
            "P_chamber(Pa)",
            "T_chamber(K)",
            "gamma",
            "density(kg/m^3)",
            "mw(kg/kmol)"
        ]
    );
    assert_eq!(rows[1][0], "2");
    assert_eq!(rows[1][1], "2000000");
    assert_eq!(rows[1][3], "1.22");
}

#[test]
fn conical_engine_table_marks_bell_columns_not_applicable() {
    let result = sweep(&conical_inputs());
    let mut buf = Vec::new();
    write_engine_table(&mut buf, &result).expect("write engine table");

    let rows = parse(buf);
    assert_eq!(rows[0].len(), ENGINE_COLUMNS.len());
    let col = |name: &str| {
        ENGINE_COLUMNS
            .iter()
            .position(|c| *c == name)
            .expect("known column")
    };
    for row in &rows[1..] {
        assert_eq!(row.len(), ENGINE_COLUMNS.len());
        assert_eq!(row[col("nozzle_type")], "conical");
        assert_eq!(row[col("theta_n(deg)")], NOT_APPLICABLE);
        assert_eq!(row[col("bell_percent")], NOT_APPLICABLE);
        assert_ne!(row[col("L_divergent(m)")], NOT_APPLICABLE);
        assert_eq!(row[col("divergent_angle(deg)")], "15");
    }
}

#[test]
fn bell_engine_table_marks_conical_columns_not_applicable() {
    let mut inputs = conical_inputs();
    inputs.nozzle = NozzleInputs::Bell {
        bell_percent: RaoPercent::P80,
    };
    let result = sweep(&inputs);
    let mut buf = Vec::new();
    write_engine_table(&mut buf, &result).expect("write engine table");

    let rows = parse(buf);
    let col = |name: &str| {
        ENGINE_COLUMNS
            .iter()
            .position(|c| *c == name)
            .expect("known column")
    };
    for row in &rows[1..] {
        assert_eq!(row[col("nozzle_type")], "bell");
        assert_eq!(row[col("bell_percent")], "80");
        assert_eq!(row[col("L_throat(m)")], NOT_APPLICABLE);
        assert_eq!(row[col("L_divergent(m)")], NOT_APPLICABLE);
        assert_eq!(row[col("divergent_angle(deg)")], NOT_APPLICABLE);
        let chamber: f64 = row[col("L_chamber(m)")].parse().expect("bell chamber length");
        let convergent: f64 = row[col("L_convergent(m)")].parse().expect("bell convergent length");
        assert!(chamber > 0.0);
        assert!(convergent > 0.0);
        assert!(row[col("theta_n(deg)")].parse::<f64>().is_ok());
    }
}

#[test]
fn contour_table_lists_every_point() {
    let result = sweep(&conical_inputs());
    let point = &result.points[0];
    let mut buf = Vec::new();
    write_contour_table(&mut buf, point).expect("write contour table");

    let rows = parse(buf);
    assert_eq!(rows[0], ["x_m", "y_m"]);
    assert_eq!(rows.len() - 1, point.geometry.contour().len());
}

#[test]
fn export_writes_all_tables() {
    let dir = unique_temp_dir("nc_results_export");
    let result = sweep(&conical_inputs());

    let written = export_sweep(&dir, &result).expect("export sweep");
    assert_eq!(written.len(), 2 + result.len());
    assert!(dir.join("thermo.csv").exists());
    assert!(dir.join("engine.csv").exists());
    assert!(dir.join("contour_001_of_2.400.csv").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn export_keeps_one_contour_per_point_for_close_ratios() {
    let dir = unique_temp_dir("nc_results_export_close");
    let mut inputs = EngineInputs::example_conical();
    inputs.mixture_ratio = MixtureRatioSpec::Sweep {
        min: 2.0,
        max: 2.0004,
        increment: 0.0001,
    };
    let result = sweep(&inputs);
    assert_eq!(result.len(), 5);

    let written = export_sweep(&dir, &result).expect("export sweep");
    let contours: Vec<_> = written
        .iter()
        .filter(|p| p.file_name().is_some_and(|n| n.to_string_lossy().starts_with("contour_")))
        .collect();
    assert_eq!(contours.len(), result.len());
    for path in &contours {
        assert!(path.exists(), "missing {}", path.display());
    }
    let unique: std::collections::HashSet<_> = contours.iter().collect();
    assert_eq!(unique.len(), result.len());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn save_list_load_roundtrip() {
    let design_dir = unique_temp_dir("nc_results_design");
    fs::create_dir_all(&design_dir).expect("failed to create temp design dir");
    let design_path = design_dir.join("engine.yaml");

    let store = RunStore::for_design(&design_path).expect("failed to create run store");
    assert!(store.root_dir().ends_with(".nozzlecraft/runs"));

    let inputs = conical_inputs();
    let result = sweep(&inputs);
    let thermo = ThermoTableFile {
        source: None,
        tables: Vec::new(),
    };
    let run_id = compute_run_id(
        &inputs,
        "fixed",
        &thermo,
        RaoCoefficientTable::builtin(),
        "0.1.0",
    );
    assert!(!store.has_run(&run_id));

    let manifest = RunManifest::for_sweep(run_id.clone(), "demo", &result, "0.1.0");
    store.save_run(&manifest, &result).expect("failed to save run");
    assert!(store.has_run(&run_id));

    let runs = store.list_runs(Some("demo")).expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, run_id);
    assert_eq!(runs[0].points, 3);
    assert!(store.list_runs(Some("other")).expect("list").is_empty());

    let loaded = store.load_sweep(&run_id).expect("failed to load sweep");
    assert_eq!(loaded.len(), result.len());
    for (a, b) in loaded.points.iter().zip(&result.points) {
        assert!((a.mixture_ratio() - b.mixture_ratio()).abs() < 1e-12);
        let rel = (a.specific_impulse_s() - b.specific_impulse_s()).abs() / b.specific_impulse_s();
        assert!(rel < 1e-12);
        assert_eq!(a.geometry.kind(), b.geometry.kind());
    }

    store.delete_run(&run_id).expect("delete run");
    assert!(!store.has_run(&run_id));
    assert!(store.load_manifest(&run_id).is_err());

    let _ = fs::remove_dir_all(&design_dir);
}
