//! Closed-form balanced steady-state solver.
//!
//! Given terminal active/reactive power and the terminal voltage phasor, the
//! solver produces the unique operating point consistent with the machine's
//! network equations. No iteration is involved:
//!
//! ```text
//! S = P + jQ
//! I = conj(S / V)
//! δ = arg(V + I·(Rs + jXq))          (round-rotor internal-angle estimate)
//! Vd = |V|·sin(δ − arg V)            Vq = |V|·cos(δ − arg V)
//! Id = |I|·sin(δ − arg I)            Iq = |I|·cos(δ − arg I)
//! Ef = Vq + Rs·Iq + Xd·Id
//! ```
//!
//! The Xq-based δ estimate neglects subtransient saliency; it is the standard
//! initial-condition convention for salient-pole machines and is kept here
//! deliberately instead of iterating to full d/q consistency.
//!
//! The returned operating point also carries transient and subtransient
//! internal-voltage seeds chosen so that the dynamic model's algebraic stator
//! solve reproduces `Id`, `Iq` exactly on its first evaluation.

use crate::dynamics::MachineState;
use crate::error::{MachineError, MachineResult};
use crate::frame::dq_to_abc;
use crate::machine::SynchronousMachine;
use core::fmt;
use nalgebra::{Complex, Vector2, Vector3};
use sg_core::numeric::{Real, ensure_finite};

/// One balanced operating point of the machine.
///
/// A plain value; the machine object never retains one. Feed
/// [`initial_state`](OperatingPoint::initial_state) to the caller's
/// integrator to start a time-domain run from this loading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OperatingPoint {
    /// Rotor angle δ (rad)
    pub rotor_angle: Real,
    /// Field voltage Ef (pu)
    pub field_voltage: Real,
    /// d/q-axis terminal voltage (pu)
    pub vd: Real,
    pub vq: Real,
    /// d/q-axis stator current (pu)
    pub id: Real,
    pub iq: Real,
    /// d/q-axis transient internal voltages Ed′, Eq′ (pu)
    pub ed_p: Real,
    pub eq_p: Real,
    /// d/q-axis subtransient internal voltages Ed″, Eq″ (pu)
    pub ed_pp: Real,
    pub eq_pp: Real,
}

impl OperatingPoint {
    /// Dynamic state vector seeded from this operating point, at synchronous
    /// speed.
    pub fn initial_state(&self) -> MachineState {
        MachineState {
            delta: self.rotor_angle,
            omega: 1.0,
            ed_p: self.ed_p,
            eq_p: self.eq_p,
            ed_pp: self.ed_pp,
            eq_pp: self.eq_pp,
        }
    }
}

impl fmt::Display for OperatingPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Operating point")?;
        writeln!(
            f,
            "  rotor angle      {:9.4} rad ({:.2} deg)",
            self.rotor_angle,
            self.rotor_angle.to_degrees()
        )?;
        writeln!(f, "  field voltage    {:9.4} pu", self.field_voltage)?;
        writeln!(f, "  Vd / Vq          {:9.4} / {:.4} pu", self.vd, self.vq)?;
        writeln!(f, "  Id / Iq          {:9.4} / {:.4} pu", self.id, self.iq)?;
        writeln!(
            f,
            "  Ed' / Eq'        {:9.4} / {:.4} pu",
            self.ed_p, self.eq_p
        )?;
        write!(
            f,
            "  Ed'' / Eq''      {:9.4} / {:.4} pu",
            self.ed_pp, self.eq_pp
        )
    }
}

/// Result of a steady-state solve: the operating point plus the instantaneous
/// three-phase terminal quantities it corresponds to.
#[derive(Clone, Debug)]
pub struct SteadyStateSolution {
    pub operating_point: OperatingPoint,
    /// Terminal phase voltages, amplitude-invariant snapshot (pu)
    pub v_abc: Vector3<Real>,
    /// Terminal phase currents, amplitude-invariant snapshot (pu)
    pub i_abc: Vector3<Real>,
}

impl SynchronousMachine {
    /// Solve the balanced steady state for a given loading.
    ///
    /// # Arguments
    /// * `p` - Active power at the terminals (pu)
    /// * `q` - Reactive power at the terminals (pu)
    /// * `v` - Terminal voltage phasor (pu)
    ///
    /// # Errors
    /// `Domain` if `v` has zero magnitude or any input is non-finite.
    pub fn steady_state(
        &self,
        p: Real,
        q: Real,
        v: Complex<Real>,
    ) -> MachineResult<SteadyStateSolution> {
        ensure_finite(p, "active power")?;
        ensure_finite(q, "reactive power")?;
        ensure_finite(v.re, "terminal voltage (real part)")?;
        ensure_finite(v.im, "terminal voltage (imaginary part)")?;
        if v.norm() == 0.0 {
            return Err(MachineError::Domain {
                what: "terminal voltage magnitude must be nonzero",
            });
        }

        let prm = self.params();

        let s = Complex::new(p, q);
        let i = (s / v).conj();
        let internal = v + i * Complex::new(prm.rs, prm.xq);
        let delta = internal.arg();

        // Project the voltage and current phasors onto the rotor frame.
        let (sv, cv) = (delta - v.arg()).sin_cos();
        let (vd, vq) = (v.norm() * sv, v.norm() * cv);
        let (si, ci) = (delta - i.arg()).sin_cos();
        let (id, iq) = (i.norm() * si, i.norm() * ci);

        let ef = vq + prm.rs * iq + prm.xd * id;

        // Internal-voltage seeds. The transient pair uses the classical
        // relations; the subtransient pair inverts the dynamic model's stator
        // algebra so the first derivative evaluation recovers Id and Iq.
        let xl = prm.leakage_reactance();
        let eq_p = vq + prm.rs * iq + prm.xd_p * id;
        let ed_p = vd + prm.rs * id - prm.xq_p * iq;
        let eq_pp = vq - (prm.xq_pp - xl) * iq;
        let ed_pp = vd - (prm.xq_pp - prm.xq_p) * iq - prm.d_axis_denominator() * id;

        let operating_point = OperatingPoint {
            rotor_angle: delta,
            field_voltage: ef,
            vd,
            vq,
            id,
            iq,
            ed_p,
            eq_p,
            ed_pp,
            eq_pp,
        };

        tracing::debug!(delta, ef, "steady-state operating point");

        Ok(SteadyStateSolution {
            operating_point,
            v_abc: dq_to_abc(&Vector2::new(vd, vq), delta),
            i_abc: dq_to_abc(&Vector2::new(id, iq), delta),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_terminal_voltage_rejected() {
        let machine = SynchronousMachine::with_typical_params();
        let err = machine
            .steady_state(0.8, 0.2, Complex::new(0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, MachineError::Domain { what } if what.contains("voltage")));
    }

    #[test]
    fn non_finite_power_rejected() {
        let machine = SynchronousMachine::with_typical_params();
        assert!(
            machine
                .steady_state(Real::NAN, 0.0, Complex::new(1.0, 0.0))
                .is_err()
        );
    }

    #[test]
    fn no_load_operating_point() {
        // P = Q = 0 at nominal voltage: no current, δ = 0, Ef equals |V|.
        let machine = SynchronousMachine::with_typical_params();
        let sol = machine
            .steady_state(0.0, 0.0, Complex::new(1.0, 0.0))
            .unwrap();
        let op = &sol.operating_point;
        assert!(op.rotor_angle.abs() < 1e-12);
        assert!(op.id.abs() < 1e-12 && op.iq.abs() < 1e-12);
        assert!((op.field_voltage - 1.0).abs() < 1e-12);
    }

    #[test]
    fn voltage_phase_shifts_rotor_angle() {
        // Shifting the terminal phasor by φ shifts δ by exactly φ.
        let machine = SynchronousMachine::with_typical_params();
        let a = machine
            .steady_state(0.5, 0.1, Complex::new(1.0, 0.0))
            .unwrap();
        let phi = 0.4;
        let b = machine
            .steady_state(0.5, 0.1, Complex::from_polar(1.0, phi))
            .unwrap();
        assert!(
            (b.operating_point.rotor_angle - a.operating_point.rotor_angle - phi).abs() < 1e-12
        );
        // dq quantities are frame-relative and must not move.
        assert!((b.operating_point.vd - a.operating_point.vd).abs() < 1e-12);
        assert!((b.operating_point.id - a.operating_point.id).abs() < 1e-12);
    }
}
