//! nc-pipeline: mixture-ratio design sweeps for nozzlecraft.
//!
//! For each O/F in the grid the orchestrator asks the thermochemical provider
//! for the chamber state, solves the isentropic expansion, sizes the engine
//! for the target thrust and builds the selected nozzle geometry. Any failure
//! aborts the sweep; there are no partial results.

pub mod error;
pub mod orchestrator;
pub mod point;

pub use error::{ErrorKind, SweepError, SweepResult, SweepStep};
pub use orchestrator::SweepOrchestrator;
pub use point::{DesignPoint, DesignSweepResult};
