//! Synchronous-generator electromechanical model.
//!
//! This crate provides the one genuinely dynamic component of the system: a
//! parametrized synchronous machine that computes balanced steady-state
//! operating points from a (P, Q, V) loading point and exposes a
//! sixth-order continuous-time model (rotor swing + transient and
//! subtransient flux decay) as a pure derivative function.
//!
//! The machine object owns nothing but its validated parameters. Steady-state
//! solutions are returned by value, the six-element dynamic state
//! `[δ, ω, Ed′, Eq′, Ed″, Eq″]` is owned by the caller's integrator, and the
//! field voltage is an explicit input on every derivative evaluation, so
//! concurrent evaluation from any number of threads needs no locking.
//!
//! Conventions fixed across the crate:
//! - amplitude-invariant (2/3-scaled) dq transform, q-axis as phasor
//!   reference (see [`frame`]);
//! - all electrical quantities in per-unit on the machine base, angles in
//!   radians, rotor speed in per-unit of synchronous speed;
//! - time constants and the inertia constant in seconds.

pub mod dynamics;
pub mod error;
pub mod frame;
pub mod machine;
pub mod params;
pub mod steady;

// Re-exports for public API
pub use dynamics::{Dynamics, MachineState, STATE_DIM};
pub use error::{MachineError, MachineResult};
pub use frame::{abc_to_dq, dq_to_abc};
pub use machine::SynchronousMachine;
pub use params::MachineParams;
pub use steady::{OperatingPoint, SteadyStateSolution};
