//! Sixth-order reduced-order dynamic model.
//!
//! State ordering, fixed for all slice/vector interop:
//!
//! ```text
//! [δ, ω, Ed′, Eq′, Ed″, Eq″]
//! ```
//!
//! with δ the rotor angle (rad), ω the rotor speed (pu, 1.0 = synchronous)
//! and the remaining four the transient/subtransient internal voltages (pu).
//!
//! One evaluation, given terminal phase voltages, mechanical torque and the
//! exogenous field voltage:
//!
//! ```text
//! (Vd, Vq) = abc_to_dq(v_abc, δ)
//! Iq = (Vq − Eq″) / (Xq″ − Xl)
//! Id = (Vd − Ed″ − (Xq″ − Xq′)·(Vq − Eq″)/(Xq″ − Xl)) / Dd
//!      with Dd = Xd″ − (Xd″ − Xd′)² / (Xd″ − Xl)
//! Te = Vd·Id + Vq·Iq + (Xq − Xd)·Id·Iq
//!
//! dδ/dt   = ω − 1
//! dω/dt   = (Tm − Te − D·(ω − 1)) / (2H)
//! dEd′/dt = (−Ed′ − (Xq − Xq′)·Iq) / Tqo′
//! dEq′/dt = (Ef − Eq′ + (Xd − Xd′)·Id) / Tdo′
//! dEd″/dt = (−Ed″ + Ed′ − (Xq′ − Xl)·Iq) / Tqo″
//! dEq″/dt = (−Eq″ + Eq′ + (Xd′ − Xl)·Id) / Tdo″
//! ```
//!
//! The evaluation is a pure function of (state, inputs, parameters), with no
//! interior mutation, so fixed-step, adaptive and implicit integrators can
//! all probe intermediate stage points freely.

use crate::error::{MachineError, MachineResult};
use crate::frame::abc_to_dq;
use crate::machine::SynchronousMachine;
use crate::params::DENOM_EPS;
use nalgebra::{SVector, Vector3};
use sg_core::numeric::{Real, ensure_finite};

/// Arity of the dynamic state vector.
pub const STATE_DIM: usize = 6;

/// Dynamic state of the machine, owned by the caller's integrator.
///
/// Also used to carry the state *derivative*: the same six slots, in the
/// same order, holding d/dt of each entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MachineState {
    /// Rotor angle δ (rad)
    pub delta: Real,
    /// Rotor speed ω (pu, 1.0 = synchronous)
    pub omega: Real,
    /// d-axis transient internal voltage Ed′ (pu)
    pub ed_p: Real,
    /// q-axis transient internal voltage Eq′ (pu)
    pub eq_p: Real,
    /// d-axis subtransient internal voltage Ed″ (pu)
    pub ed_pp: Real,
    /// q-axis subtransient internal voltage Eq″ (pu)
    pub eq_pp: Real,
}

impl MachineState {
    /// Build a state from a flat slice in canonical ordering.
    ///
    /// # Errors
    /// `InputShape` unless the slice has exactly [`STATE_DIM`] elements.
    pub fn from_slice(x: &[Real]) -> MachineResult<Self> {
        if x.len() != STATE_DIM {
            return Err(MachineError::InputShape {
                what: "state vector",
                expected: STATE_DIM,
                got: x.len(),
            });
        }
        Ok(Self {
            delta: x[0],
            omega: x[1],
            ed_p: x[2],
            eq_p: x[3],
            ed_pp: x[4],
            eq_pp: x[5],
        })
    }

    pub fn from_vector(x: &SVector<Real, STATE_DIM>) -> Self {
        Self {
            delta: x[0],
            omega: x[1],
            ed_p: x[2],
            eq_p: x[3],
            ed_pp: x[4],
            eq_pp: x[5],
        }
    }

    pub fn to_vector(&self) -> SVector<Real, STATE_DIM> {
        SVector::from(self.to_array())
    }

    pub fn to_array(&self) -> [Real; STATE_DIM] {
        [
            self.delta, self.omega, self.ed_p, self.eq_p, self.ed_pp, self.eq_pp,
        ]
    }
}

/// Output of one derivative evaluation.
///
/// The electrical torque rides along because callers need it for
/// power-balance bookkeeping and it is not cheaply recoverable from the
/// derivative alone.
#[derive(Clone, Copy, Debug)]
pub struct Dynamics {
    pub derivative: MachineState,
    /// Electrical (air-gap) torque Te (pu)
    pub electrical_torque: Real,
}

impl SynchronousMachine {
    /// Evaluate the state derivative and electrical torque.
    ///
    /// # Arguments
    /// * `state` - Present dynamic state
    /// * `v_abc` - Instantaneous terminal phase voltages (pu)
    /// * `t_mech` - Mechanical torque input Tm (pu)
    /// * `field_voltage` - Field voltage Ef (pu), an exogenous control input;
    ///   callers without excitation control pass the steady-state solution's
    ///   `field_voltage`
    ///
    /// # Errors
    /// `Domain` on non-finite inputs or if the configured reactances leave a
    /// stator-solve denominator at zero.
    pub fn dynamics(
        &self,
        state: &MachineState,
        v_abc: &Vector3<Real>,
        t_mech: Real,
        field_voltage: Real,
    ) -> MachineResult<Dynamics> {
        for (v, what) in [
            (state.delta, "state: rotor angle"),
            (state.omega, "state: rotor speed"),
            (state.ed_p, "state: Ed'"),
            (state.eq_p, "state: Eq'"),
            (state.ed_pp, "state: Ed''"),
            (state.eq_pp, "state: Eq''"),
            (v_abc.x, "terminal voltage (phase a)"),
            (v_abc.y, "terminal voltage (phase b)"),
            (v_abc.z, "terminal voltage (phase c)"),
            (t_mech, "mechanical torque"),
            (field_voltage, "field voltage"),
        ] {
            ensure_finite(v, what)?;
        }

        let prm = self.params();
        let xl = prm.leakage_reactance();
        let xq_den = prm.xq_pp - xl;
        let dd = prm.d_axis_denominator();
        if xq_den.abs() < DENOM_EPS || (prm.xd_pp - xl).abs() < DENOM_EPS || dd.abs() < DENOM_EPS
        {
            return Err(MachineError::Domain {
                what: "stator current solve denominator vanishes for these reactances",
            });
        }

        let v_dq = abc_to_dq(v_abc, state.delta);
        let (vd, vq) = (v_dq.x, v_dq.y);

        // Stator currents from the subtransient voltage-behind-reactance
        // equivalent; the q-axis deviation feeds the d-axis through the
        // saliency cross-coupling term.
        let iq = (vq - state.eq_pp) / xq_den;
        let id = (vd - state.ed_pp - (prm.xq_pp - prm.xq_p) * (vq - state.eq_pp) / xq_den) / dd;

        let te = vd * id + vq * iq + (prm.xq - prm.xd) * id * iq;

        let slip = state.omega - 1.0;
        let derivative = MachineState {
            delta: slip,
            omega: (t_mech - te - prm.damping * slip) / (2.0 * prm.h),
            ed_p: (-state.ed_p - (prm.xq - prm.xq_p) * iq) / prm.tq0_p,
            eq_p: (field_voltage - state.eq_p + (prm.xd - prm.xd_p) * id) / prm.td0_p,
            ed_pp: (-state.ed_pp + state.ed_p - (prm.xq_p - xl) * iq) / prm.tq0_pp,
            eq_pp: (-state.eq_pp + state.eq_p + (prm.xd_p - xl) * id) / prm.td0_pp,
        };

        Ok(Dynamics {
            derivative,
            electrical_torque: te,
        })
    }

    /// Flat-slice entry point for integrators that carry bare arrays.
    ///
    /// Arity-checks both slices, then defers to
    /// [`dynamics`](SynchronousMachine::dynamics). Returns the derivative in
    /// canonical ordering plus the electrical torque.
    pub fn dynamics_flat(
        &self,
        state: &[Real],
        v_abc: &[Real],
        t_mech: Real,
        field_voltage: Real,
    ) -> MachineResult<([Real; STATE_DIM], Real)> {
        let state = MachineState::from_slice(state)?;
        if v_abc.len() != 3 {
            return Err(MachineError::InputShape {
                what: "terminal voltage vector",
                expected: 3,
                got: v_abc.len(),
            });
        }
        let v_abc = Vector3::new(v_abc[0], v_abc[1], v_abc[2]);
        let out = self.dynamics(&state, &v_abc, t_mech, field_voltage)?;
        Ok((out.derivative.to_array(), out.electrical_torque))
    }
}
