//! nc-thermo: thermochemical chamber state for nozzlecraft.
//!
//! Provides:
//! - `ThermoProvider`, the boundary to an external equilibrium solver
//! - `ThermoPoint` (one mixture ratio + its chamber state)
//! - `MixtureRatioGrid` (single point or arithmetic O/F sweep)
//! - `TabulatedProvider`, a table-driven provider loaded from YAML
//! - `CachedProvider`, a memoising wrapper around any provider
//!
//! # Architecture
//!
//! The design pipeline never talks to a combustion solver directly. It asks a
//! `ThermoProvider` for the chamber state at one mixture ratio, so tests and
//! offline tools can substitute a deterministic table or a fixed state.

pub mod cache;
pub mod error;
pub mod grid;
pub mod point;
pub mod provider;
pub mod table;

// Re-exports for ergonomics
pub use cache::CachedProvider;
pub use error::{ProviderError, ProviderResult};
pub use grid::{GridError, MixtureRatioGrid, MixtureRatioSpec};
pub use point::{ChamberState, FlowMode, ThermoPoint};
pub use provider::{ThermoProvider, ThermoQuery};
pub use table::{TableRow, TabulatedProvider, ThermoTable, ThermoTableFile};
