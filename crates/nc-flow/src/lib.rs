//! nc-flow: quasi-1D isentropic nozzle flow for nozzlecraft.
//!
//! Closed-form relations only, no iteration:
//! - `isentropic`: exit Mach, throat (sonic) and exit states, area ratio
//! - `performance`: inverse sizing from a target thrust (ṁ, Isp, areas, c*)
//!
//! Gas constant convention: R = R_universal / MW with MW in kg/kmol.

pub mod error;
pub mod isentropic;
pub mod performance;

pub use error::{FlowError, FlowResult};
pub use isentropic::{ExpansionInputs, ExpansionResult, StationState, solve_expansion};
pub use performance::{PerformancePoint, SizingTarget, characterize};
