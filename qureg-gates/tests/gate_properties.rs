//! Algebraic properties of the standard gate set

use approx::assert_relative_eq;
use num_complex::Complex64;
use qureg_gates::matrices::{self, Matrix2};
use qureg_gates::*;
use std::f64::consts::PI;

const EPSILON: f64 = 1e-10;

const ROTATIONS: [fn(f64) -> Matrix2; 3] =
    [matrices::rotate_x, matrices::rotate_y, matrices::rotate_z];

fn is_identity(m: &Matrix2) -> bool {
    matrices::approx_eq(m, &matrices::IDENTITY, EPSILON)
}

/// Equal up to a global phase
fn equal_up_to_phase(a: &Matrix2, b: &Matrix2) -> bool {
    let product = matrices::multiply(&matrices::adjoint(b), a);
    let phase = product[0][0];
    phase.norm() > 1.0 - EPSILON
        && (product[1][1] - phase).norm() < EPSILON
        && product[0][1].norm() < EPSILON
        && product[1][0].norm() < EPSILON
}

// ============================================================================
// Self-inverse gates
// ============================================================================

#[test]
fn test_self_inverse_gates_square_to_identity() {
    let gates: [&dyn SingleQubitGate; 4] = [&Hadamard, &SigmaX, &SigmaY, &SigmaZ];
    for gate in gates {
        assert!(gate.is_self_inverse());
        let m = gate.matrix();
        assert!(is_identity(&matrices::multiply(&m, &m)), "{}", gate.name());
    }
}

#[test]
fn test_hadamard_conjugates_x_to_z() {
    let hxh = matrices::multiply(
        &matrices::multiply(&matrices::HADAMARD, &matrices::SIGMA_X),
        &matrices::HADAMARD,
    );
    assert!(matrices::approx_eq(&hxh, &matrices::SIGMA_Z, EPSILON));
}

// ============================================================================
// Rotations
// ============================================================================

#[test]
fn test_rotations_compose_additively() {
    let a = 0.4;
    let b = 1.1;
    for builder in ROTATIONS {
        let composed = matrices::multiply(&builder(a), &builder(b));
        assert!(matrices::approx_eq(&composed, &builder(a + b), EPSILON));
    }
}

#[test]
fn test_full_turn_is_minus_identity() {
    for builder in ROTATIONS {
        let m = builder(2.0 * PI);
        assert_relative_eq!(m[0][0].re, -1.0, epsilon = EPSILON);
        assert_relative_eq!(m[1][1].re, -1.0, epsilon = EPSILON);
    }
}

#[test]
fn test_rotate_z_matches_phase_kick_up_to_phase() {
    let theta = 0.9;
    assert!(equal_up_to_phase(
        &matrices::rotate_z(theta),
        &matrices::phase_kick(theta)
    ));
}

#[test]
fn test_phase_scale_is_global() {
    assert!(equal_up_to_phase(
        &matrices::phase_scale(1.234),
        &matrices::IDENTITY
    ));
}

#[test]
fn test_every_gate_is_unitary() {
    let gates: Vec<Box<dyn SingleQubitGate>> = vec![
        Box::new(Hadamard),
        Box::new(SigmaX),
        Box::new(SigmaY),
        Box::new(SigmaZ),
        Box::new(SqrtX),
        Box::new(RotateX::new(0.3)),
        Box::new(RotateY::new(PI)),
        Box::new(RotateZ::new(-2.2)),
        Box::new(PhaseScale::new(PI / 3.0)),
        Box::new(PhaseKick::new(PI / 7.0)),
    ];
    for gate in gates {
        assert!(
            matrices::is_unitary(&gate.matrix(), EPSILON),
            "{} is not unitary",
            gate.name()
        );
    }
}

// ============================================================================
// Custom gates and registry
// ============================================================================

#[test]
fn test_custom_gate_round_trips_through_registry() {
    let t = CustomGate::new(
        "T",
        [
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::from_polar(1.0, PI / 4.0)],
        ],
    )
    .unwrap();

    let mut registry = GateRegistry::with_standard_gates();
    registry.register("T", t.clone()).unwrap();

    let fetched = registry.lookup("T").unwrap();
    assert_eq!(fetched.matrix(), t.matrix());

    // T^2 = S = PhaseKick(π/2)
    let s = matrices::multiply(&fetched.matrix(), &fetched.matrix());
    assert!(matrices::approx_eq(&s, &matrices::phase_kick(PI / 2.0), EPSILON));
}
