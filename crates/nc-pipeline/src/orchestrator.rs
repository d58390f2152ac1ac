//! Sweep orchestration: thermo → expansion → performance → geometry per
//! mixture ratio, aborting the whole sweep on the first failure.

use crate::error::{SweepError, SweepResult, SweepStep};
use crate::point::{DesignPoint, DesignSweepResult};
use nc_flow::{ExpansionInputs, SizingTarget, characterize, solve_expansion};
use nc_geometry::{GeometryBuilder, NozzleKind, RaoCoefficientTable};
use nc_project::{EngineInputs, validate_inputs};
use nc_thermo::{MixtureRatioGrid, ThermoProvider, ThermoQuery};
use rayon::prelude::*;
use tracing::{debug, error, info};

/// Runs design sweeps against one thermochemical provider.
///
/// The provider is an explicit dependency so tests can substitute a
/// deterministic fake. The orchestrator holds no per-sweep state; every call
/// allocates its own result.
#[derive(Debug, Clone)]
pub struct SweepOrchestrator<P> {
    provider: P,
    rao: RaoCoefficientTable,
}

impl<P: ThermoProvider> SweepOrchestrator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            rao: RaoCoefficientTable::builtin().clone(),
        }
    }

    /// Use a calibrated coefficient table instead of the built-in one.
    pub fn with_rao_table(mut self, table: RaoCoefficientTable) -> Self {
        self.rao = table;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn rao_table(&self) -> &RaoCoefficientTable {
        &self.rao
    }

    /// Evaluate every grid point in ascending mixture-ratio order.
    pub fn run(&self, inputs: &EngineInputs) -> SweepResult<DesignSweepResult> {
        let (grid, builder) = self.prepare(inputs)?;
        self.log_start(inputs, &grid, false);

        let mut points = Vec::with_capacity(grid.len());
        for of in grid.iter() {
            match self.evaluate_point(inputs, &builder, of) {
                Ok(point) => points.push(point),
                Err(e) => {
                    log_abort(&e);
                    return Err(e);
                }
            }
        }
        Ok(self.finish(inputs, points))
    }

    /// Evaluate grid points on the rayon pool.
    ///
    /// Output order matches `run`. If several points fail, the error for the
    /// lowest grid index is reported.
    pub fn run_parallel(&self, inputs: &EngineInputs) -> SweepResult<DesignSweepResult> {
        let (grid, builder) = self.prepare(inputs)?;
        self.log_start(inputs, &grid, true);

        let outcomes: Vec<SweepResult<DesignPoint>> = grid
            .values()
            .par_iter()
            .map(|&of| self.evaluate_point(inputs, &builder, of))
            .collect();

        let mut points = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(point) => points.push(point),
                Err(e) => {
                    log_abort(&e);
                    return Err(e);
                }
            }
        }
        Ok(self.finish(inputs, points))
    }

    /// One design point. Exposed for tools that evaluate a single O/F.
    pub fn evaluate_point(
        &self,
        inputs: &EngineInputs,
        builder: &GeometryBuilder,
        mixture_ratio: f64,
    ) -> SweepResult<DesignPoint> {
        let query = ThermoQuery {
            mixture_ratio,
            chamber_pressure: inputs.chamber_pressure,
            fuel: &inputs.fuel,
            oxidizer: &inputs.oxidizer,
            mode: inputs.mode,
        };
        let thermo = self
            .provider
            .thermo_point(&query)
            .map_err(|e| SweepError::provider(mixture_ratio, e))?;
        thermo
            .state
            .validate()
            .map_err(|e| SweepError::provider(mixture_ratio, e))?;

        let expansion_inputs = ExpansionInputs::from_thermo(&thermo, inputs.ambient_pressure);
        let expansion = solve_expansion(&expansion_inputs)
            .map_err(|e| SweepError::flow(mixture_ratio, SweepStep::Isentropic, e))?;

        let target = SizingTarget {
            thrust: inputs.thrust,
            mixture_ratio,
        };
        let performance = characterize(&expansion_inputs, &expansion, &target)
            .map_err(|e| SweepError::flow(mixture_ratio, SweepStep::Performance, e))?;

        let geometry = builder
            .build(performance.throat_area.value, performance.exit_area.value)
            .map_err(|e| SweepError::geometry(mixture_ratio, e))?;

        debug!(
            mixture_ratio,
            isp_s = performance.specific_impulse_s,
            c_star_mps = performance.characteristic_velocity.value,
            expansion_ratio = performance.expansion_ratio,
            "design point evaluated"
        );

        Ok(DesignPoint {
            thermo,
            performance,
            geometry,
        })
    }

    /// Input validation and the per-sweep geometry builder.
    pub fn prepare(
        &self,
        inputs: &EngineInputs,
    ) -> SweepResult<(MixtureRatioGrid, GeometryBuilder)> {
        validate_inputs(inputs)?;
        let grid =
            MixtureRatioGrid::from_spec(&inputs.mixture_ratio).map_err(|e| {
                SweepError::InputValidation {
                    field: e.field().to_string(),
                    value: format!("{:?}", inputs.mixture_ratio),
                    reason: e.to_string(),
                }
            })?;

        let builder = GeometryBuilder::new(inputs.chamber_params(), inputs.nozzle.shape())
            .with_resolution(inputs.resolution)
            .with_rao_table(self.rao.clone());
        builder
            .validate()
            .map_err(|e| SweepError::InputValidation {
                field: "nozzle".to_string(),
                value: e.value().map(|v| v.to_string()).unwrap_or_default(),
                reason: e.to_string(),
            })?;
        Ok((grid, builder))
    }

    fn log_start(&self, inputs: &EngineInputs, grid: &MixtureRatioGrid, parallel: bool) {
        info!(
            points = grid.len(),
            nozzle = %inputs.nozzle_kind(),
            provider = self.provider.name(),
            parallel,
            "starting design sweep"
        );
    }

    fn finish(&self, inputs: &EngineInputs, points: Vec<DesignPoint>) -> DesignSweepResult {
        let nozzle_kind = inputs.nozzle_kind();
        let result = DesignSweepResult {
            nozzle_kind,
            provider: self.provider.name().to_string(),
            rao_table_version: match nozzle_kind {
                NozzleKind::Bell => Some(self.rao.version.clone()),
                NozzleKind::Conical => None,
            },
            points,
        };
        if let Some(best) = result.best_isp() {
            info!(
                points = result.len(),
                best_mixture_ratio = best.mixture_ratio(),
                best_isp_s = best.specific_impulse_s(),
                "design sweep complete"
            );
        }
        result
    }
}

fn log_abort(e: &SweepError) {
    error!(
        kind = %e.kind(),
        mixture_ratio = ?e.mixture_ratio(),
        step = ?e.step(),
        "design sweep aborted: {e}"
    );
}
