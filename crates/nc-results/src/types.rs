//! Stored run metadata.

use chrono::{SecondsFormat, Utc};
use nc_geometry::NozzleKind;
use nc_pipeline::DesignSweepResult;
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub design_name: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub nozzle_kind: NozzleKind,
    pub provider: String,
    pub points: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rao_table_version: Option<String>,
    pub tool_version: String,
}

impl RunManifest {
    /// Manifest for a finished sweep, stamped with the current time.
    pub fn for_sweep(
        run_id: RunId,
        design_name: &str,
        sweep: &DesignSweepResult,
        tool_version: &str,
    ) -> Self {
        Self {
            run_id,
            design_name: design_name.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            nozzle_kind: sweep.nozzle_kind,
            provider: sweep.provider.clone(),
            points: sweep.len(),
            rao_table_version: sweep.rao_table_version.clone(),
            tool_version: tool_version.to_string(),
        }
    }
}
