//! Content-based hashing for run IDs.

use nc_geometry::RaoCoefficientTable;
use nc_project::EngineInputs;
use nc_thermo::ThermoTableFile;
use sha2::{Digest, Sha256};

/// SHA-256 over the resolved inputs, provider identity, thermochemical table
/// contents, Rao coefficient table and tool version.
///
/// Editing a table file in place changes the ID even when its `source`
/// label or the coefficient `version` string stay the same.
pub fn compute_run_id(
    inputs: &EngineInputs,
    provider: &str,
    thermo: &ThermoTableFile,
    rao: &RaoCoefficientTable,
    tool_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    let inputs_json = serde_json::to_string(inputs).unwrap_or_default();
    let thermo_json = serde_json::to_string(thermo).unwrap_or_default();
    let rao_json = serde_json::to_string(rao).unwrap_or_default();
    hasher.update(inputs_json.as_bytes());

    for part in [
        provider,
        thermo_json.as_str(),
        rao_json.as_str(),
        tool_version,
    ] {
        hasher.update([0u8]);
        hasher.update(part.as_bytes());
    }

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_thermo::{FlowMode, MixtureRatioSpec, TableRow, ThermoTable};

    fn table() -> ThermoTableFile {
        ThermoTableFile {
            source: Some("unit-test".to_string()),
            tables: vec![ThermoTable {
                fuel: "RP-1".to_string(),
                oxidizer: "LOX".to_string(),
                mode: FlowMode::Frozen,
                rows: vec![TableRow {
                    pc_pa: 2.0e6,
                    of: 2.4,
                    tc_k: 3_500.0,
                    gamma: 1.22,
                    mw: 22.0,
                    rho: 1.6,
                    cp: 2_000.0,
                }],
            }],
        }
    }

    fn rao() -> RaoCoefficientTable {
        RaoCoefficientTable::builtin().clone()
    }

    #[test]
    fn hash_stability() {
        let inputs = EngineInputs::example_conical();
        let hash1 = compute_run_id(&inputs, "table", &table(), &rao(), "v1");
        let hash2 = compute_run_id(&inputs, "table", &table(), &rao(), "v1");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let inputs1 = EngineInputs::example_conical();
        let mut inputs2 = inputs1.clone();
        inputs2.mixture_ratio = MixtureRatioSpec::Single(2.5);

        let hash1 = compute_run_id(&inputs1, "table", &table(), &rao(), "v1");
        let hash2 = compute_run_id(&inputs2, "table", &table(), &rao(), "v1");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn hash_covers_provider_and_version() {
        let inputs = EngineInputs::example_conical();
        let base = compute_run_id(&inputs, "table", &table(), &rao(), "v1");
        assert_ne!(base, compute_run_id(&inputs, "cea", &table(), &rao(), "v1"));
        assert_ne!(base, compute_run_id(&inputs, "table", &table(), &rao(), "v2"));

        let mut renamed = rao();
        renamed.version = "rao-2025.1".to_string();
        assert_ne!(base, compute_run_id(&inputs, "table", &table(), &renamed, "v1"));
    }

    #[test]
    fn hash_covers_edited_thermo_rows() {
        let inputs = EngineInputs::example_conical();
        let base = compute_run_id(&inputs, "table", &table(), &rao(), "v1");

        let mut edited = table();
        edited.tables[0].rows[0].tc_k = 3_550.0;
        assert_eq!(edited.source, table().source);
        assert_ne!(base, compute_run_id(&inputs, "table", &edited, &rao(), "v1"));
    }

    #[test]
    fn hash_covers_rao_coefficients_under_same_version() {
        let inputs = EngineInputs::example_conical();
        let base = compute_run_id(&inputs, "table", &table(), &rao(), "v1");

        let mut refit = rao();
        refit.classes[0].exit.a += 0.5;
        assert_eq!(refit.version, rao().version);
        assert_ne!(base, compute_run_id(&inputs, "table", &table(), &refit, "v1"));
    }
}
