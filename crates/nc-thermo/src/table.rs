//! Table-driven thermochemical provider.
//!
//! Tables hold chamber states computed offline by an equilibrium solver, one
//! table per propellant pair and flow mode. Requests are answered by linear
//! interpolation in mixture ratio, then in chamber pressure between the two
//! recorded pressure levels that bracket the request.

use crate::error::{ProviderError, ProviderResult};
use crate::point::{ChamberState, FlowMode};
use crate::provider::{ThermoProvider, ThermoQuery};
use nc_core::units::{k, kg_per_m3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Relative tolerance for matching a recorded pressure level or O/F exactly.
const MATCH_TOLERANCE: f64 = 1e-9;

/// On-disk table document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThermoTableFile {
    #[serde(default)]
    pub source: Option<String>,
    pub tables: Vec<ThermoTable>,
}

/// Chamber states for one propellant pair and flow mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThermoTable {
    pub fuel: String,
    pub oxidizer: String,
    pub mode: FlowMode,
    pub rows: Vec<TableRow>,
}

/// One tabulated chamber state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TableRow {
    pub pc_pa: f64,
    pub of: f64,
    pub tc_k: f64,
    pub gamma: f64,
    /// kg/kmol
    pub mw: f64,
    /// kg/m³
    pub rho: f64,
    /// J/(kg·K)
    pub cp: f64,
}

impl TableRow {
    fn lerp(&self, other: &TableRow, frac: f64) -> TableRow {
        let mix = |a: f64, b: f64| a + (b - a) * frac;
        TableRow {
            pc_pa: mix(self.pc_pa, other.pc_pa),
            of: mix(self.of, other.of),
            tc_k: mix(self.tc_k, other.tc_k),
            gamma: mix(self.gamma, other.gamma),
            mw: mix(self.mw, other.mw),
            rho: mix(self.rho, other.rho),
            cp: mix(self.cp, other.cp),
        }
    }

    fn to_state(self) -> ChamberState {
        ChamberState {
            chamber_temperature: k(self.tc_k),
            gamma: self.gamma,
            molecular_weight: self.mw,
            density: kg_per_m3(self.rho),
            specific_heat: self.cp,
        }
    }
}

/// Rows of one table sharing a chamber pressure, sorted by O/F.
#[derive(Debug, Clone)]
struct PressureLevel {
    pc_pa: f64,
    rows: Vec<TableRow>,
}

impl PressureLevel {
    fn interpolate(&self, of: f64) -> ProviderResult<TableRow> {
        let first = self.rows[0];
        let last = self.rows[self.rows.len() - 1];
        if let Some(row) = self.rows.iter().find(|r| matches(r.of, of)) {
            return Ok(*row);
        }
        if of < first.of || of > last.of {
            return Err(ProviderError::OutOfRange {
                what: "mixture ratio",
                value: of,
                min: first.of,
                max: last.of,
            });
        }
        let upper = self
            .rows
            .iter()
            .position(|r| r.of > of)
            .ok_or(ProviderError::OutOfRange {
                what: "mixture ratio",
                value: of,
                min: first.of,
                max: last.of,
            })?;
        let lo = self.rows[upper - 1];
        let hi = self.rows[upper];
        Ok(lo.lerp(&hi, (of - lo.of) / (hi.of - lo.of)))
    }
}

#[derive(Debug, Clone)]
struct IndexedTable {
    fuel: String,
    oxidizer: String,
    mode: FlowMode,
    levels: Vec<PressureLevel>,
}

impl IndexedTable {
    fn build(table: &ThermoTable) -> ProviderResult<Self> {
        if table.rows.is_empty() {
            return Err(ProviderError::InvalidTable {
                message: format!(
                    "table {}/{} ({}) has no rows",
                    table.fuel, table.oxidizer, table.mode
                ),
            });
        }

        let mut levels: Vec<PressureLevel> = Vec::new();
        for row in &table.rows {
            row.to_state().validate()?;
            if !row.pc_pa.is_finite() || row.pc_pa <= 0.0 || !row.of.is_finite() || row.of <= 0.0
            {
                return Err(ProviderError::InvalidTable {
                    message: format!(
                        "row with pc_pa = {} and of = {} must have positive pressure and O/F",
                        row.pc_pa, row.of
                    ),
                });
            }
            match levels.iter_mut().find(|l| matches(l.pc_pa, row.pc_pa)) {
                Some(level) => level.rows.push(*row),
                None => levels.push(PressureLevel {
                    pc_pa: row.pc_pa,
                    rows: vec![*row],
                }),
            }
        }

        levels.sort_by(|a, b| a.pc_pa.total_cmp(&b.pc_pa));
        for level in &mut levels {
            level.rows.sort_by(|a, b| a.of.total_cmp(&b.of));
            if level.rows.windows(2).any(|w| matches(w[0].of, w[1].of)) {
                return Err(ProviderError::InvalidTable {
                    message: format!(
                        "duplicate O/F in table {}/{} at {} Pa",
                        table.fuel, table.oxidizer, level.pc_pa
                    ),
                });
            }
        }

        Ok(Self {
            fuel: table.fuel.clone(),
            oxidizer: table.oxidizer.clone(),
            mode: table.mode,
            levels,
        })
    }

    fn accepts(&self, query: &ThermoQuery<'_>) -> bool {
        self.mode == query.mode
            && self.fuel.eq_ignore_ascii_case(query.fuel.trim())
            && self.oxidizer.eq_ignore_ascii_case(query.oxidizer.trim())
    }

    fn interpolate(&self, pc_pa: f64, of: f64) -> ProviderResult<TableRow> {
        if let Some(level) = self.levels.iter().find(|l| matches(l.pc_pa, pc_pa)) {
            return level.interpolate(of);
        }

        let lowest = self.levels[0].pc_pa;
        let highest = self.levels[self.levels.len() - 1].pc_pa;
        let out_of_range = ProviderError::OutOfRange {
            what: "chamber pressure",
            value: pc_pa,
            min: lowest,
            max: highest,
        };
        let upper = self
            .levels
            .iter()
            .position(|l| l.pc_pa > pc_pa)
            .ok_or_else(|| out_of_range.clone())?;
        if upper == 0 {
            return Err(out_of_range);
        }

        let lo = &self.levels[upper - 1];
        let hi = &self.levels[upper];
        let row_lo = lo.interpolate(of)?;
        let row_hi = hi.interpolate(of)?;
        let mut row = row_lo.lerp(&row_hi, (pc_pa - lo.pc_pa) / (hi.pc_pa - lo.pc_pa));
        row.pc_pa = pc_pa;
        row.of = of;
        Ok(row)
    }
}

fn matches(a: f64, b: f64) -> bool {
    (a - b).abs() <= MATCH_TOLERANCE * a.abs().max(b.abs())
}

/// Thermochemical provider backed by precomputed tables.
#[derive(Debug, Clone)]
pub struct TabulatedProvider {
    name: String,
    source: ThermoTableFile,
    tables: Vec<IndexedTable>,
}

impl TabulatedProvider {
    pub fn new(file: &ThermoTableFile) -> ProviderResult<Self> {
        if file.tables.is_empty() {
            return Err(ProviderError::InvalidTable {
                message: "no tables defined".to_string(),
            });
        }
        let tables = file
            .tables
            .iter()
            .map(IndexedTable::build)
            .collect::<ProviderResult<Vec<_>>>()?;
        let name = match &file.source {
            Some(source) => format!("tabulated ({source})"),
            None => "tabulated".to_string(),
        };
        Ok(Self {
            name,
            source: file.clone(),
            tables,
        })
    }

    pub fn from_yaml_str(content: &str) -> ProviderResult<Self> {
        let file: ThermoTableFile = serde_yaml::from_str(content)?;
        Self::new(&file)
    }

    pub fn load(path: &Path) -> ProviderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let provider = Self::from_yaml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            tables = provider.tables.len(),
            "loaded thermochemical tables"
        );
        Ok(provider)
    }

    /// Table document the provider was built from.
    pub fn table_file(&self) -> &ThermoTableFile {
        &self.source
    }

    /// Propellant pairs and modes this provider can answer for.
    pub fn propellants(&self) -> Vec<(String, String, FlowMode)> {
        self.tables
            .iter()
            .map(|t| (t.fuel.clone(), t.oxidizer.clone(), t.mode))
            .collect()
    }
}

impl ThermoProvider for TabulatedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, query: &ThermoQuery<'_>) -> ProviderResult<ChamberState> {
        let table = self
            .tables
            .iter()
            .find(|t| t.accepts(query))
            .ok_or_else(|| ProviderError::UnknownPropellant {
                fuel: query.fuel.to_string(),
                oxidizer: query.oxidizer.to_string(),
                mode: query.mode.to_string(),
            })?;
        let row = table.interpolate(query.chamber_pressure.value, query.mixture_ratio)?;
        let state = row.to_state();
        state.validate()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_core::units::pa;

    const TABLE: &str = r#"
source: unit-test
tables:
  - fuel: RP-1
    oxidizer: LOX
    mode: frozen
    rows:
      - { pc_pa: 1.0e6, of: 2.0, tc_k: 3300.0, gamma: 1.23, mw: 21.0, rho: 0.80, cp: 2100.0 }
      - { pc_pa: 1.0e6, of: 3.0, tc_k: 3500.0, gamma: 1.21, mw: 24.0, rho: 0.85, cp: 2000.0 }
      - { pc_pa: 2.0e6, of: 3.0, tc_k: 3600.0, gamma: 1.21, mw: 24.0, rho: 1.70, cp: 2000.0 }
      - { pc_pa: 2.0e6, of: 2.0, tc_k: 3400.0, gamma: 1.23, mw: 21.0, rho: 1.60, cp: 2100.0 }
"#;

    fn query(of: f64, pc: f64) -> ThermoQuery<'static> {
        ThermoQuery {
            mixture_ratio: of,
            chamber_pressure: pa(pc),
            fuel: "rp-1",
            oxidizer: "lox",
            mode: FlowMode::Frozen,
        }
    }

    #[test]
    fn exact_row_is_returned_unchanged() {
        let provider = TabulatedProvider::from_yaml_str(TABLE).unwrap();
        let state = provider.evaluate(&query(2.0, 2.0e6)).unwrap();
        assert_eq!(state.chamber_temperature.value, 3400.0);
        assert_eq!(state.gamma, 1.23);
        assert_eq!(provider.name(), "tabulated (unit-test)");
    }

    #[test]
    fn interpolates_in_mixture_ratio() {
        let provider = TabulatedProvider::from_yaml_str(TABLE).unwrap();
        let state = provider.evaluate(&query(2.5, 1.0e6)).unwrap();
        assert!((state.chamber_temperature.value - 3400.0).abs() < 1e-9);
        assert!((state.molecular_weight - 22.5).abs() < 1e-9);
    }

    #[test]
    fn interpolates_between_pressure_levels() {
        let provider = TabulatedProvider::from_yaml_str(TABLE).unwrap();
        let state = provider.evaluate(&query(2.5, 1.5e6)).unwrap();
        assert!((state.chamber_temperature.value - 3450.0).abs() < 1e-9);
        assert!((state.density.value - 1.2375).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_requests_fail() {
        let provider = TabulatedProvider::from_yaml_str(TABLE).unwrap();
        assert!(matches!(
            provider.evaluate(&query(3.5, 1.0e6)),
            Err(ProviderError::OutOfRange {
                what: "mixture ratio",
                ..
            })
        ));
        assert!(matches!(
            provider.evaluate(&query(2.5, 5.0e6)),
            Err(ProviderError::OutOfRange {
                what: "chamber pressure",
                ..
            })
        ));
        assert!(matches!(
            provider.evaluate(&query(2.5, 0.5e6)),
            Err(ProviderError::OutOfRange { .. })
        ));
    }

    #[test]
    fn unknown_mode_or_propellant_fails() {
        let provider = TabulatedProvider::from_yaml_str(TABLE).unwrap();
        let mut q = query(2.5, 1.0e6);
        q.mode = FlowMode::Equilibrium;
        assert!(matches!(
            provider.evaluate(&q),
            Err(ProviderError::UnknownPropellant { .. })
        ));
        q.mode = FlowMode::Frozen;
        q.fuel = "CH4";
        assert!(matches!(
            provider.evaluate(&q),
            Err(ProviderError::UnknownPropellant { .. })
        ));
    }

    #[test]
    fn reject_duplicate_rows() {
        let yaml = r#"
tables:
  - fuel: RP-1
    oxidizer: LOX
    mode: frozen
    rows:
      - { pc_pa: 1.0e6, of: 2.0, tc_k: 3300.0, gamma: 1.23, mw: 21.0, rho: 0.80, cp: 2100.0 }
      - { pc_pa: 1.0e6, of: 2.0, tc_k: 3300.0, gamma: 1.23, mw: 21.0, rho: 0.80, cp: 2100.0 }
"#;
        assert!(matches!(
            TabulatedProvider::from_yaml_str(yaml),
            Err(ProviderError::InvalidTable { .. })
        ));
    }

    #[test]
    fn reject_non_physical_rows() {
        let yaml = r#"
tables:
  - fuel: RP-1
    oxidizer: LOX
    mode: frozen
    rows:
      - { pc_pa: 1.0e6, of: 2.0, tc_k: -5.0, gamma: 1.23, mw: 21.0, rho: 0.80, cp: 2100.0 }
"#;
        assert!(matches!(
            TabulatedProvider::from_yaml_str(yaml),
            Err(ProviderError::NonPhysical { .. })
        ));
    }
}
