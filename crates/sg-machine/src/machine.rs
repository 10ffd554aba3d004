//! The machine object: validated parameters plus pure evaluation methods.

use crate::error::MachineResult;
use crate::params::MachineParams;

/// A synchronous generator.
///
/// Holds nothing but an immutable, validated [`MachineParams`]. Both
/// [`steady_state`](SynchronousMachine::steady_state) and
/// [`dynamics`](SynchronousMachine::dynamics) are pure functions of their
/// arguments and return results by value, so a single machine can be shared
/// freely across threads and evaluated at intermediate integrator stage
/// points without any synchronization.
#[derive(Clone, Debug)]
pub struct SynchronousMachine {
    params: MachineParams,
}

impl SynchronousMachine {
    /// Build a machine from a fully specified parameter record.
    ///
    /// # Errors
    /// `Domain` if the record violates any invariant of
    /// [`MachineParams::validate`].
    pub fn new(params: MachineParams) -> MachineResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Build a machine from the documented typical 100 MVA parameter set.
    ///
    /// The set is known-valid, so this path cannot fail.
    pub fn with_typical_params() -> Self {
        Self {
            params: MachineParams::typical_100mva(),
        }
    }

    /// Read access to the validated parameter record.
    pub fn params(&self) -> &MachineParams {
        &self.params
    }
}
