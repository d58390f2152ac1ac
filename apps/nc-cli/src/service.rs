//! Run execution and caching.

use crate::error::CliResult;
use nc_geometry::RaoCoefficientTable;
use nc_pipeline::{DesignSweepResult, SweepOrchestrator};
use nc_project::{EngineDesignFile, EngineInputs};
use nc_results::{RunManifest, RunStore, compute_run_id};
use nc_thermo::{CachedProvider, TabulatedProvider, ThermoProvider};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Design file with everything it references loaded.
pub struct LoadedDesign {
    pub file: EngineDesignFile,
    pub inputs: EngineInputs,
    pub provider: TabulatedProvider,
    pub rao: RaoCoefficientTable,
}

pub fn load_design(design_path: &Path) -> CliResult<LoadedDesign> {
    let file = nc_project::load(design_path)?;
    let inputs = nc_project::resolve_design(&file)?;
    let design_dir = design_path.parent().unwrap_or_else(|| Path::new("."));

    let provider = TabulatedProvider::load(&file.thermo_path(design_dir))?;
    let rao = match file.rao_table_path(design_dir) {
        Some(path) => RaoCoefficientTable::load(&path)?,
        None => RaoCoefficientTable::builtin().clone(),
    };
    Ok(LoadedDesign {
        file,
        inputs,
        provider,
        rao,
    })
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub parallel: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunTiming {
    pub load_time_s: f64,
    pub sweep_time_s: f64,
    pub save_time_s: f64,
    pub total_time_s: f64,
}

pub struct RunResponse {
    pub manifest: RunManifest,
    pub sweep: DesignSweepResult,
    pub loaded_from_cache: bool,
    pub timing: RunTiming,
}

/// Load a cached sweep for the design or run it and store the result.
pub fn ensure_run(design_path: &Path, options: &RunOptions) -> CliResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTiming::default();

    let design = load_design(design_path)?;
    let run_id = compute_run_id(
        &design.inputs,
        design.provider.name(),
        design.provider.table_file(),
        &design.rao,
        TOOL_VERSION,
    );
    let provider = CachedProvider::new(design.provider);
    let store = RunStore::for_design(design_path)?;
    timing.load_time_s = started.elapsed().as_secs_f64();

    if options.use_cache && store.has_run(&run_id) {
        match (store.load_manifest(&run_id), store.load_sweep(&run_id)) {
            (Ok(manifest), Ok(sweep)) => {
                info!(run_id = %run_id, "loaded cached run");
                timing.total_time_s = started.elapsed().as_secs_f64();
                return Ok(RunResponse {
                    manifest,
                    sweep,
                    loaded_from_cache: true,
                    timing,
                });
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(run_id = %run_id, "cached run unreadable, re-running: {e}");
            }
        }
    } else if !options.use_cache {
        warn!("run cache bypassed");
    }

    let orchestrator = SweepOrchestrator::new(&provider).with_rao_table(design.rao);
    let sweep_started = Instant::now();
    let sweep = if options.parallel {
        orchestrator.run_parallel(&design.inputs)?
    } else {
        orchestrator.run(&design.inputs)?
    };
    timing.sweep_time_s = sweep_started.elapsed().as_secs_f64();

    let save_started = Instant::now();
    let manifest = RunManifest::for_sweep(run_id, &design.file.name, &sweep, TOOL_VERSION);
    store.save_run(&manifest, &sweep)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    Ok(RunResponse {
        manifest,
        sweep,
        loaded_from_cache: false,
        timing,
    })
}

pub fn list_runs(design_path: &Path) -> CliResult<Vec<RunManifest>> {
    let file = nc_project::load(design_path)?;
    let store = RunStore::for_design(design_path)?;
    Ok(store.list_runs(Some(&file.name))?)
}

pub fn load_run(design_path: &Path, run_id: &str) -> CliResult<(RunManifest, DesignSweepResult)> {
    let store = RunStore::for_design(design_path)?;
    let manifest = store.load_manifest(run_id)?;
    let sweep = store.load_sweep(run_id)?;
    Ok((manifest, sweep))
}
