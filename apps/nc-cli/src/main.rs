mod error;
mod service;

use clap::{Parser, Subcommand};
use error::{CliError, CliResult};
use nc_geometry::calibrate::{CalibrationConfig, calibrate, read_chart_samples};
use nc_geometry::{NozzleGeometry, NozzleKind};
use nc_pipeline::DesignSweepResult;
use service::{RunOptions, RunTiming};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nozzlecraft")]
#[command(about = "nozzlecraft - liquid rocket engine nozzle design sweeps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a design file and the tables it references
    Validate {
        /// Path to the design YAML (or JSON) file
        design_path: PathBuf,
    },
    /// Run the mixture-ratio sweep of a design
    Run {
        /// Path to the design YAML (or JSON) file
        design_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Evaluate design points in parallel
        #[arg(long)]
        parallel: bool,
        /// Directory to export the CSV tables into
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Fit a Rao coefficient table from digitised chart samples
    Calibrate {
        /// CSV with columns percent, kind, expansion_ratio, angle_deg
        samples_path: PathBuf,
        /// Version tag written into the table
        #[arg(long)]
        table_version: String,
        /// Output JSON path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List cached runs for a design
    Runs {
        /// Path to the design YAML (or JSON) file
        design_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the design YAML (or JSON) file
        design_path: PathBuf,
        /// Run ID to display
        run_id: String,
        /// Directory to export the CSV tables into
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { design_path } => cmd_validate(&design_path),
        Commands::Run {
            design_path,
            no_cache,
            parallel,
            out,
        } => cmd_run(
            &design_path,
            &RunOptions {
                use_cache: !no_cache,
                parallel,
            },
            out.as_deref(),
        ),
        Commands::Calibrate {
            samples_path,
            table_version,
            output,
        } => cmd_calibrate(&samples_path, &table_version, output.as_deref()),
        Commands::Runs { design_path } => cmd_runs(&design_path),
        Commands::ShowRun {
            design_path,
            run_id,
            out,
        } => cmd_show_run(&design_path, &run_id, out.as_deref()),
    }
}

fn cmd_validate(design_path: &Path) -> CliResult<()> {
    println!("Validating design: {}", design_path.display());
    let design = service::load_design(design_path)?;
    let inputs = &design.inputs;
    println!("✓ Design is valid");
    println!("  Name: {}", design.file.name);
    println!(
        "  Propellants: {} / {} ({})",
        inputs.oxidizer, inputs.fuel, inputs.mode
    );
    println!("  Nozzle: {}", inputs.nozzle_kind());
    println!("  Thermo provider: {}", nc_thermo::ThermoProvider::name(&design.provider));
    if inputs.nozzle_kind() == NozzleKind::Bell {
        println!("  Rao table: {}", design.rao.version);
    }
    Ok(())
}

fn cmd_run(design_path: &Path, options: &RunOptions, out: Option<&Path>) -> CliResult<()> {
    println!("Running design sweep: {}", design_path.display());

    let response = service::ensure_run(design_path, options)?;
    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.manifest.run_id);
    } else {
        println!("✓ Sweep completed: {}", response.manifest.run_id);
    }
    print_timing_summary(&response.timing);
    print_sweep_summary(&response.sweep);

    if let Some(dir) = out {
        export(dir, &response.sweep)?;
    }
    Ok(())
}

fn cmd_calibrate(samples_path: &Path, version: &str, output: Option<&Path>) -> CliResult<()> {
    let file = File::open(samples_path).map_err(|source| CliError::FileRead {
        path: samples_path.to_path_buf(),
        source,
    })?;
    let samples = read_chart_samples(file)?;
    let calibration = calibrate(&samples, version, &CalibrationConfig::default())?;

    eprintln!("Fitted {} bell classes:", calibration.table.classes.len());
    for (percent, kind, report) in &calibration.reports {
        eprintln!(
            "  {:>4} {:<8} rms={:.4} deg  iterations={}  samples={}",
            percent.to_string(),
            format!("{kind:?}"),
            report.rms_residual_deg,
            report.iterations,
            report.samples
        );
    }

    let json = calibration.table.to_json_string()?;
    if let Some(path) = output {
        std::fs::write(path, json)?;
        eprintln!("✓ Wrote coefficient table to {}", path.display());
    } else {
        println!("{json}");
    }
    Ok(())
}

fn cmd_runs(design_path: &Path) -> CliResult<()> {
    let runs = service::list_runs(design_path)?;

    if runs.is_empty() {
        println!("No cached runs found for design: {}", design_path.display());
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!(
                "  {} ({}, {} {} points, provider {})",
                manifest.run_id,
                manifest.timestamp,
                manifest.points,
                manifest.nozzle_kind,
                manifest.provider
            );
        }
    }
    Ok(())
}

fn cmd_show_run(design_path: &Path, run_id: &str, out: Option<&Path>) -> CliResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, sweep) = service::load_run(design_path, run_id)?;
    println!("\nRun Summary:");
    println!("  Design: {}", manifest.design_name);
    println!("  Created: {}", manifest.timestamp);
    println!("  Tool version: {}", manifest.tool_version);
    if let Some(version) = &manifest.rao_table_version {
        println!("  Rao table: {}", version);
    }
    print_sweep_summary(&sweep);

    if let Some(dir) = out {
        export(dir, &sweep)?;
    }
    Ok(())
}

fn export(dir: &Path, sweep: &DesignSweepResult) -> CliResult<()> {
    let written = nc_results::export_sweep(dir, sweep)?;
    println!("✓ Exported {} files to {}", written.len(), dir.display());
    Ok(())
}

fn print_timing_summary(timing: &RunTiming) {
    println!("\nTiming summary:");
    println!("  Load:  {:.3}s", timing.load_time_s);
    if timing.sweep_time_s > 0.0 {
        println!("  Sweep: {:.3}s", timing.sweep_time_s);
        println!("  Save:  {:.3}s", timing.save_time_s);
    }
    println!("  Total: {:.3}s", timing.total_time_s);
}

fn print_sweep_summary(sweep: &DesignSweepResult) {
    println!(
        "\n{} nozzle, {} design points (provider: {})",
        sweep.nozzle_kind,
        sweep.len(),
        sweep.provider
    );
    println!(
        "  {:>6} {:>8} {:>9} {:>7} {:>9} {:>9} {:>9}",
        "O/F", "Isp(s)", "c*(m/s)", "ER", "mdot", "Rt(mm)", "Re(mm)"
    );
    for point in &sweep.points {
        let perf = &point.performance;
        println!(
            "  {:>6.3} {:>8.2} {:>9.1} {:>7.3} {:>9.4} {:>9.3} {:>9.3}",
            point.mixture_ratio(),
            perf.specific_impulse_s,
            perf.characteristic_velocity.value,
            perf.expansion_ratio,
            perf.mass_flow.value,
            point.geometry.radius_throat() * 1e3,
            point.geometry.radius_exit() * 1e3,
        );
    }

    if let Some(best) = sweep.best_isp() {
        println!(
            "\nBest Isp: {:.2} s at O/F {:.3}",
            best.specific_impulse_s(),
            best.mixture_ratio()
        );
        match &best.geometry {
            NozzleGeometry::Conical(g) => println!(
                "  Conical: L_total={:.4} m, divergent half-angle {:.1} deg",
                g.length_total, g.divergent_angle_deg
            ),
            NozzleGeometry::Bell(g) => println!(
                "  Bell {}: L_nozzle={:.4} m, theta_n={:.2} deg, theta_e={:.2} deg",
                g.percent, g.nozzle_length, g.initial_angle_deg, g.exit_angle_deg
            ),
        }
    }
}
