//! CSV export of a finished sweep.
//!
//! Three tables: thermochemistry per O/F, engine performance and geometry per
//! O/F, and the raw contour of one design point. Engine-table columns that do
//! not apply to the sweep's nozzle variant hold [`NOT_APPLICABLE`], never zero.

use crate::ResultsResult;
use nc_geometry::NozzleGeometry;
use nc_pipeline::{DesignPoint, DesignSweepResult};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const NOT_APPLICABLE: &str = "NA";

pub const THERMO_COLUMNS: [&str; 6] = [
    "OF",
    "P_chamber(Pa)",
    "T_chamber(K)",
    "gamma",
    "density(kg/m^3)",
    "mw(kg/kmol)",
];

pub const ENGINE_COLUMNS: [&str; 26] = [
    "OF",
    "At(m^2)",
    "Ae(m^2)",
    "ER",
    "Isp(s)",
    "cstar(m/s)",
    "v_exit(m/s)",
    "mdot(kg/s)",
    "T_chamber(K)",
    "T_throat(K)",
    "T_exit(K)",
    "nozzle_type",
    "Rc(m)",
    "Rt(m)",
    "Re(m)",
    "L_chamber(m)",
    "L_convergent(m)",
    "L_throat(m)",
    "L_divergent(m)",
    "L_total(m)",
    "divergent_angle(deg)",
    "theta_n(deg)",
    "theta_e(deg)",
    "bell_percent",
    "L_nozzle(m)",
    "Ac(m^2)",
];

pub const CONTOUR_COLUMNS: [&str; 2] = ["x_m", "y_m"];

fn num(v: f64) -> String {
    v.to_string()
}

fn na() -> String {
    NOT_APPLICABLE.to_string()
}

pub fn write_thermo_table<W: Write>(writer: W, sweep: &DesignSweepResult) -> ResultsResult<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(THERMO_COLUMNS)?;
    for point in &sweep.points {
        let t = &point.thermo;
        out.write_record([
            num(t.mixture_ratio),
            num(t.chamber_pressure_pa()),
            num(t.chamber_temperature_k()),
            num(t.gamma()),
            num(t.density_kg_m3()),
            num(t.molecular_weight()),
        ])?;
    }
    out.flush()?;
    Ok(())
}

fn engine_row(point: &DesignPoint) -> Vec<String> {
    let perf = &point.performance;
    let mut row = vec![
        num(point.thermo.mixture_ratio),
        num(perf.throat_area.value),
        num(perf.exit_area.value),
        num(perf.expansion_ratio),
        num(perf.specific_impulse_s),
        num(perf.characteristic_velocity.value),
        num(perf.exit_velocity.value),
        num(perf.mass_flow.value),
        num(point.thermo.chamber_temperature_k()),
        num(perf.throat_temperature.value),
        num(perf.exit_temperature.value),
        point.geometry.kind().to_string(),
        num(point.geometry.radius_chamber()),
        num(point.geometry.radius_throat()),
        num(point.geometry.radius_exit()),
    ];

    match &point.geometry {
        NozzleGeometry::Conical(g) => row.extend([
            num(g.length_chamber),
            num(g.length_convergent),
            num(g.length_throat),
            num(g.length_divergent),
            num(g.length_total),
            num(g.divergent_angle_deg),
            na(),
            na(),
            na(),
            na(),
            na(),
        ]),
        NozzleGeometry::Bell(g) => row.extend([
            num(g.length_chamber),
            num(g.length_convergent),
            na(),
            na(),
            num(g.length_total),
            na(),
            num(g.initial_angle_deg),
            num(g.exit_angle_deg),
            g.percent.percent().to_string(),
            num(g.nozzle_length),
            num(g.area_chamber),
        ]),
    }
    row
}

pub fn write_engine_table<W: Write>(writer: W, sweep: &DesignSweepResult) -> ResultsResult<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(ENGINE_COLUMNS)?;
    for point in &sweep.points {
        out.write_record(engine_row(point))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_contour_table<W: Write>(writer: W, point: &DesignPoint) -> ResultsResult<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CONTOUR_COLUMNS)?;
    for p in point.geometry.contour().points() {
        out.write_record([num(p.x), num(p.r)])?;
    }
    out.flush()?;
    Ok(())
}

fn contour_file_name(index: usize, mixture_ratio: f64) -> String {
    format!("contour_{index:03}_of_{mixture_ratio:.3}.csv")
}

/// Write `thermo.csv`, `engine.csv` and one `contour_<index>_of_<O/F>.csv`
/// per point into `dir`, returning the written paths.
///
/// The zero-padded sweep index keeps names unique when two O/F values round
/// to the same three decimals.
pub fn export_sweep(dir: &Path, sweep: &DesignSweepResult) -> ResultsResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(sweep.len() + 2);

    let thermo_path = dir.join("thermo.csv");
    write_thermo_table(File::create(&thermo_path)?, sweep)?;
    written.push(thermo_path);

    let engine_path = dir.join("engine.csv");
    write_engine_table(File::create(&engine_path)?, sweep)?;
    written.push(engine_path);

    for (index, point) in sweep.points.iter().enumerate() {
        let path = dir.join(contour_file_name(index, point.mixture_ratio()));
        write_contour_table(File::create(&path)?, point)?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "sweep exported");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_columns_split_by_variant() {
        let shared = ["L_chamber(m)", "L_convergent(m)", "L_total(m)"];
        let conical_only = ["L_throat(m)", "L_divergent(m)", "divergent_angle(deg)"];
        let bell_only = ["theta_n(deg)", "theta_e(deg)", "bell_percent", "L_nozzle(m)"];
        for c in shared.iter().chain(&conical_only).chain(&bell_only) {
            assert!(ENGINE_COLUMNS.contains(c), "missing {c}");
        }
        assert_eq!(ENGINE_COLUMNS[0], "OF");
        assert_eq!(THERMO_COLUMNS[0], "OF");
    }

    #[test]
    fn contour_names_stay_unique_for_close_ratios() {
        let a = contour_file_name(0, 2.0001);
        let b = contour_file_name(1, 2.0002);
        assert_ne!(a, b);
        assert_eq!(a, "contour_000_of_2.000.csv");
        assert_eq!(b, "contour_001_of_2.000.csv");
    }

    #[test]
    fn numbers_keep_full_precision() {
        assert_eq!(num(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(na(), "NA");
    }
}
