//! Memoising wrapper around a thermochemical provider.
//!
//! Equilibrium solves are the only expensive call in a design run. Repeated
//! sweeps over overlapping grids hit the cache instead of the backend. Only
//! successful results are cached; failures are deterministic and cheap to
//! reproduce.

use crate::error::ProviderResult;
use crate::point::{ChamberState, FlowMode};
use crate::provider::{ThermoProvider, ThermoQuery};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    mixture_ratio_bits: u64,
    chamber_pressure_bits: u64,
    fuel: String,
    oxidizer: String,
    mode: FlowMode,
}

impl CacheKey {
    fn new(query: &ThermoQuery<'_>) -> Self {
        Self {
            mixture_ratio_bits: query.mixture_ratio.to_bits(),
            chamber_pressure_bits: query.chamber_pressure.value.to_bits(),
            fuel: query.fuel.to_string(),
            oxidizer: query.oxidizer.to_string(),
            mode: query.mode,
        }
    }
}

/// Provider wrapper that remembers successful evaluations.
pub struct CachedProvider<P> {
    inner: P,
    entries: Mutex<HashMap<CacheKey, ChamberState>>,
}

impl<P: ThermoProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of cached states.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl<P: ThermoProvider> ThermoProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn evaluate(&self, query: &ThermoQuery<'_>) -> ProviderResult<ChamberState> {
        let key = CacheKey::new(query);
        // A poisoned lock only means another thread panicked mid-insert; skip the cache.
        if let Ok(entries) = self.entries.lock() {
            if let Some(state) = entries.get(&key) {
                return Ok(*state);
            }
        }

        // Lock released while the backend runs
        let state = self.inner.evaluate(query)?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, state);
        }
        Ok(state)
    }
}
