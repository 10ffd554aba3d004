//! Integration tests for the dynamic model: equilibrium and torque-step
//! behavior under a caller-owned fixed-step integrator.

use nalgebra::Complex;
use sg_machine::{MachineError, MachineParams, SynchronousMachine, STATE_DIM};

#[test]
fn equilibrium_has_zero_swing_derivatives() {
    // Steady-state seed at ω = 1 with Tm equal to the electrical torque:
    // the swing pair of the derivative must vanish.
    let machine = SynchronousMachine::with_typical_params();
    let sol = machine
        .steady_state(1.0, 0.0, Complex::new(1.0, 0.0))
        .unwrap();
    let state = sol.operating_point.initial_state();
    let ef = sol.operating_point.field_voltage;

    let te = machine
        .dynamics(&state, &sol.v_abc, 0.0, ef)
        .unwrap()
        .electrical_torque;
    let out = machine.dynamics(&state, &sol.v_abc, te, ef).unwrap();

    assert!(out.derivative.delta.abs() < 1e-12);
    assert!(out.derivative.omega.abs() < 1e-12);
}

#[test]
fn seed_reproduces_steady_electrical_torque() {
    // The subtransient seeds are built so the algebraic stator solve hands
    // back the steady-state Id and Iq on the very first evaluation.
    let machine = SynchronousMachine::with_typical_params();
    let sol = machine
        .steady_state(0.8, 0.2, Complex::new(1.0, 0.0))
        .unwrap();
    let op = &sol.operating_point;
    let state = op.initial_state();

    let out = machine
        .dynamics(&state, &sol.v_abc, 0.0, op.field_voltage)
        .unwrap();
    // Te = Vd·Id + Vq·Iq + (Xq − Xd)·Id·Iq at the seeded currents.
    let prm = machine.params();
    let te_expected =
        op.vd * op.id + op.vq * op.iq + (prm.xq - prm.xd) * op.id * op.iq;
    assert!((out.electrical_torque - te_expected).abs() < 1e-9);
}

#[test]
fn mechanical_torque_accelerates_rotor() {
    // dω/dt grows strictly with Tm; the increment is ΔTm / (2H).
    let machine = SynchronousMachine::with_typical_params();
    let sol = machine
        .steady_state(1.0, 0.0, Complex::new(1.0, 0.0))
        .unwrap();
    let state = sol.operating_point.initial_state();
    let ef = sol.operating_point.field_voltage;

    let lo = machine.dynamics(&state, &sol.v_abc, 0.9, ef).unwrap();
    let hi = machine.dynamics(&state, &sol.v_abc, 1.0, ef).unwrap();
    assert!(hi.derivative.omega > lo.derivative.omega);

    let dh = (hi.derivative.omega - lo.derivative.omega)
        - 0.1 / (2.0 * machine.params().h);
    assert!(dh.abs() < 1e-12);
}

#[test]
fn vanishing_denominator_rejected_at_construction() {
    // Explicit leakage reactance equal to Xd'' would divide by zero inside
    // the stator current solve.
    let params = MachineParams {
        xl: Some(0.25),
        ..MachineParams::typical_100mva()
    };
    assert!(matches!(
        SynchronousMachine::new(params),
        Err(MachineError::Domain { .. })
    ));

    // A reactance set that zeroes the d-axis denominator
    // Xd'' − (Xd''−Xd')²/(Xd''−Xl) is equally unusable.
    let params = MachineParams {
        xd: 1.8,
        xd_p: 0.192_195_444_572_928_86, // Xd'' + √(Xd''·(Xd''−Xl))
        xd_pp: 0.1,
        xq_pp: 0.1,
        xl: None,
        ..MachineParams::typical_100mva()
    };
    assert!(matches!(
        SynchronousMachine::new(params),
        Err(MachineError::Domain { .. })
    ));
}

/// One classical RK4 step over the flat state array. The integrator lives
/// out here with the caller; the machine only ever evaluates derivatives.
fn rk4_step(
    machine: &SynchronousMachine,
    x: &[f64; STATE_DIM],
    v_abc: &[f64; 3],
    t_mech: f64,
    ef: f64,
    dt: f64,
) -> [f64; STATE_DIM] {
    let f = |x: &[f64; STATE_DIM]| {
        machine
            .dynamics_flat(x, v_abc, t_mech, ef)
            .expect("finite state stays evaluable")
            .0
    };

    let k1 = f(x);
    let mut x2 = *x;
    for i in 0..STATE_DIM {
        x2[i] = x[i] + 0.5 * dt * k1[i];
    }
    let k2 = f(&x2);
    let mut x3 = *x;
    for i in 0..STATE_DIM {
        x3[i] = x[i] + 0.5 * dt * k2[i];
    }
    let k3 = f(&x3);
    let mut x4 = *x;
    for i in 0..STATE_DIM {
        x4[i] = x[i] + dt * k3[i];
    }
    let k4 = f(&x4);

    let mut out = *x;
    for i in 0..STATE_DIM {
        out[i] = x[i] + dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
    out
}

#[test]
fn torque_step_swings_the_rotor() {
    // Start on the rated operating point, hold the terminal voltage
    // snapshot, bump Tm by 0.1 pu and march half a second at 1 ms.
    let machine = SynchronousMachine::with_typical_params();
    let sol = machine
        .steady_state(1.0, 0.0, Complex::new(1.0, 0.0))
        .unwrap();
    let op = &sol.operating_point;
    let v_abc = [sol.v_abc.x, sol.v_abc.y, sol.v_abc.z];
    let ef = op.field_voltage;

    let te0 = machine
        .dynamics(&op.initial_state(), &sol.v_abc, 0.0, ef)
        .unwrap()
        .electrical_torque;
    let t_mech = te0 + 0.1;

    let mut x = op.initial_state().to_array();
    let dt = 1e-3;
    for _ in 0..500 {
        x = rk4_step(&machine, &x, &v_abc, t_mech, ef, dt);
        assert!(x.iter().all(|v| v.is_finite()));
    }

    // Surplus torque accelerates the rotor and advances the angle.
    assert!(x[1] > 1.0, "rotor speed {} should exceed synchronous", x[1]);
    assert!(x[1] < 1.3);
    assert!(
        x[0] > op.rotor_angle,
        "rotor angle {} should advance past {}",
        x[0],
        op.rotor_angle
    );
    assert!(x[0] < 1.5);
}
