//! Single-qubit gate matrices
//!
//! Matrices are row-major `[[Complex64; 2]; 2]`. Applying `m` to the pair
//! of amplitudes `(a0, a1)` of basis states that differ only in the target
//! bit produces `(m[0][0]·a0 + m[0][1]·a1, m[1][0]·a0 + m[1][1]·a1)`.

use num_complex::Complex64;

/// A 2×2 complex matrix in row-major order
pub type Matrix2 = [[Complex64; 2]; 2];

// Compile-time constant helpers
const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);
const NEG_I: Complex64 = Complex64::new(0.0, -1.0);
const NEG_ONE: Complex64 = Complex64::new(-1.0, 0.0);

const INV_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Hadamard gate matrix
/// H = 1/√2 * [[1,  1],
///             [1, -1]]
pub const HADAMARD: Matrix2 = [
    [
        Complex64::new(INV_SQRT2, 0.0),
        Complex64::new(INV_SQRT2, 0.0),
    ],
    [
        Complex64::new(INV_SQRT2, 0.0),
        Complex64::new(-INV_SQRT2, 0.0),
    ],
];

/// Sigma-X (NOT) gate matrix
/// X = [[0, 1],
///      [1, 0]]
pub const SIGMA_X: Matrix2 = [[ZERO, ONE], [ONE, ZERO]];

/// Sigma-Y gate matrix
/// Y = [[0, -i],
///      [i,  0]]
pub const SIGMA_Y: Matrix2 = [[ZERO, NEG_I], [I, ZERO]];

/// Sigma-Z gate matrix
/// Z = [[1,  0],
///      [0, -1]]
pub const SIGMA_Z: Matrix2 = [[ONE, ZERO], [ZERO, NEG_ONE]];

/// Identity matrix
pub const IDENTITY: Matrix2 = [[ONE, ZERO], [ZERO, ONE]];

/// Square root of NOT
/// √X = 1/2 * [[1+i, 1-i],
///             [1-i, 1+i]]
pub const SQRT_X: Matrix2 = [
    [Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5)],
    [Complex64::new(0.5, -0.5), Complex64::new(0.5, 0.5)],
];

/// Rotation about the X axis
/// RX(γ) = [[cos(γ/2),    -i·sin(γ/2)],
///          [-i·sin(γ/2),  cos(γ/2)]]
#[inline]
pub fn rotate_x(gamma: f64) -> Matrix2 {
    let half = gamma / 2.0;
    let (sin_val, cos_val) = half.sin_cos();

    [
        [Complex64::new(cos_val, 0.0), Complex64::new(0.0, -sin_val)],
        [Complex64::new(0.0, -sin_val), Complex64::new(cos_val, 0.0)],
    ]
}

/// Rotation about the Y axis
/// RY(γ) = [[cos(γ/2), -sin(γ/2)],
///          [sin(γ/2),  cos(γ/2)]]
#[inline]
pub fn rotate_y(gamma: f64) -> Matrix2 {
    let half = gamma / 2.0;
    let (sin_val, cos_val) = half.sin_cos();

    [
        [Complex64::new(cos_val, 0.0), Complex64::new(-sin_val, 0.0)],
        [Complex64::new(sin_val, 0.0), Complex64::new(cos_val, 0.0)],
    ]
}

/// Rotation about the Z axis
/// RZ(γ) = [[e^(-iγ/2), 0        ],
///          [0,         e^(iγ/2)]]
#[inline]
pub fn rotate_z(gamma: f64) -> Matrix2 {
    let half = gamma / 2.0;

    [
        [Complex64::from_polar(1.0, -half), ZERO],
        [ZERO, Complex64::from_polar(1.0, half)],
    ]
}

/// Uniform phase scale
/// PS(θ) = e^(iθ) * I
///
/// A global phase on its own; observable only when controlled.
#[inline]
pub fn phase_scale(theta: f64) -> Matrix2 {
    let phase = Complex64::from_polar(1.0, theta);
    [[phase, ZERO], [ZERO, phase]]
}

/// Relative phase on |1⟩
/// P(θ) = [[1, 0     ],
///         [0, e^(iθ)]]
#[inline]
pub fn phase_kick(theta: f64) -> Matrix2 {
    [[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, theta)]]
}

/// Conjugate transpose
#[inline]
pub fn adjoint(m: &Matrix2) -> Matrix2 {
    [
        [m[0][0].conj(), m[1][0].conj()],
        [m[0][1].conj(), m[1][1].conj()],
    ]
}

/// Matrix product `a · b`
pub fn multiply(a: &Matrix2, b: &Matrix2) -> Matrix2 {
    let mut result = [[ZERO; 2]; 2];
    for (i, row) in result.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j];
        }
    }
    result
}

/// Element-wise comparison within `tolerance`
pub fn approx_eq(a: &Matrix2, b: &Matrix2, tolerance: f64) -> bool {
    a.iter()
        .flatten()
        .zip(b.iter().flatten())
        .all(|(x, y)| (x - y).norm() <= tolerance)
}

/// Largest element deviation of `m† · m` from the identity
pub fn unitarity_deviation(m: &Matrix2) -> f64 {
    let product = multiply(&adjoint(m), m);
    product
        .iter()
        .flatten()
        .zip(IDENTITY.iter().flatten())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

/// Check `m† · m = I` within `tolerance`
#[inline]
pub fn is_unitary(m: &Matrix2, tolerance: f64) -> bool {
    unitarity_deviation(m) <= tolerance
}
