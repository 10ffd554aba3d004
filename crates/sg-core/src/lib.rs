//! sg-core: stable foundation for synchroflow.
//!
//! Contains:
//! - units (uom SI types for rated machine data + per-unit base quantities)
//! - numeric (Real + tolerances + float/angle helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
