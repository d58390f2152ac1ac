//! nc-core: stable foundation for nozzlecraft.
//!
//! Contains:
//! - units (uom SI types + constructors + physical constants)
//! - numeric (Real + float guards)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{NcError, NcResult};
pub use numeric::*;
pub use units::*;
