//! Run storage API.
//!
//! Layout: `<root>/<run_id>/manifest.json` and `<root>/<run_id>/sweep.json`.

use crate::types::RunManifest;
use crate::{ResultsError, ResultsResult};
use nc_pipeline::DesignSweepResult;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MANIFEST_FILE: &str = "manifest.json";
const SWEEP_FILE: &str = "sweep.json";

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store next to a design file: `<design dir>/.nozzlecraft/runs`.
    pub fn for_design(design_path: &Path) -> ResultsResult<Self> {
        let design_dir = design_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "design path has no parent directory".to_string(),
            })?;
        let runs_dir = design_dir.join(".nozzlecraft").join("runs");
        Self::new(runs_dir)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    /// A run counts as stored only once both files exist.
    pub fn has_run(&self, run_id: &str) -> bool {
        let dir = self.run_dir(run_id);
        dir.join(MANIFEST_FILE).exists() && dir.join(SWEEP_FILE).exists()
    }

    pub fn save_run(&self, manifest: &RunManifest, sweep: &DesignSweepResult) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        // Sweep first so a manifest never points at a missing sweep.
        let sweep_json = serde_json::to_string(sweep)?;
        fs::write(run_dir.join(SWEEP_FILE), sweep_json)?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join(MANIFEST_FILE), manifest_json)?;

        debug!(run_id = %manifest.run_id, points = sweep.len(), "run stored");
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join(MANIFEST_FILE);

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_sweep(&self, run_id: &str) -> ResultsResult<DesignSweepResult> {
        let sweep_path = self.run_dir(run_id).join(SWEEP_FILE);

        if !sweep_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(sweep_path)?;
        let sweep = serde_json::from_str(&content)?;
        Ok(sweep)
    }

    /// Stored runs, newest first. `design_name` filters by design when given.
    ///
    /// Unreadable manifests are skipped with a warning.
    pub fn list_runs(&self, design_name: Option<&str>) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().to_string();
            match self.load_manifest(&run_id) {
                Ok(manifest) => {
                    if design_name.is_none_or(|name| manifest.design_name == name) {
                        runs.push(manifest);
                    }
                }
                Err(e) => warn!(run_id = %run_id, "skipping unreadable run: {e}"),
            }
        }

        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}
