//! Coupled inverse-Newton iteration
//!
//! Fixed-point scheme advancing two coupled sequences: `X` toward
//! `A^(-1/root)` and a residual matrix `M` toward the identity. The
//! initialization scales by a Frobenius-norm bound on the spectral norm,
//! which keeps every eigenvalue of `M_0` inside the iteration's basin of
//! convergence for symmetric positive semi-definite input.

use super::{CoupledNewtonConfig, NewtonConvergenceFlag};
use crate::dtype::{DType, LinalgElement};
use crate::error::{Error, Result};
use crate::fraction::Fraction;
use crate::helpers::validate_square_matrix;
use crate::kernels::{frobenius_norm, identity, matmul_square, matrix_power, max_abs_diff};
use crate::precision::working_dtype;
use crate::tensor::Tensor;

/// Outcome of a coupled iteration run
#[derive(Debug, Clone)]
pub struct CoupledIterationResult {
    /// Estimate of `A^(-1/root)`
    pub root_inverse: Tensor,

    /// Final residual matrix `M` (converges to the identity)
    pub residual: Tensor,

    /// Terminal classification
    pub flag: NewtonConvergenceFlag,

    /// Iterations actually performed
    pub iterations: usize,

    /// Final residual error `||M - I||_max`
    pub error: f64,
}

/// Compute `A^(-1/root)` for an integer `root > 0` by coupled Newton
/// iteration.
pub fn matrix_inverse_root_newton(
    a: &Tensor,
    root: i64,
    epsilon: f64,
    config: &CoupledNewtonConfig,
) -> Result<CoupledIterationResult> {
    let n = validate_square_matrix(a.shape())?;
    if root <= 0 {
        return Err(Error::NonPositiveRoot {
            root: Fraction::from(root),
        });
    }

    let w = a.cast(working_dtype(a.dtype()));
    let result = match w.dtype() {
        DType::F64 => newton_typed::<f64>(&w, n, root, epsilon, config),
        _ => newton_typed::<f32>(&w, n, root, epsilon, config),
    };

    Ok(CoupledIterationResult {
        root_inverse: result.root_inverse.cast(a.dtype()),
        residual: result.residual.cast(a.dtype()),
        ..result
    })
}

fn newton_typed<T: LinalgElement>(
    a: &Tensor,
    n: usize,
    root: i64,
    epsilon: f64,
    config: &CoupledNewtonConfig,
) -> CoupledIterationResult {
    let alpha = -1.0 / root as f64;
    let eye: Vec<T> = identity(n);

    // A_ridge = A + epsilon I
    let mut a_ridge: Vec<T> = a.to_vec();
    for i in 0..n {
        a_ridge[i * n + i] = a_ridge[i * n + i] + T::from_f64(epsilon);
    }

    // z = (root + 1) / (2 ||A_ridge||_F); X_0 = z^(1/root) I; M_0 = z A_ridge
    let z = (root as f64 + 1.0) / (2.0 * frobenius_norm(&a_ridge));
    let x0 = T::from_f64(z.powf(-alpha));
    let zt = T::from_f64(z);

    let mut x: Vec<T> = eye.iter().map(|&v| x0 * v).collect();
    let mut m: Vec<T> = a_ridge.iter().map(|&v| zt * v).collect();
    let mut error = max_abs_diff(&m, &eye);
    let mut iteration = 0usize;

    let alpha_t = T::from_f64(alpha);
    let one_minus_alpha = T::from_f64(1.0 - alpha);

    while error > config.tolerance && iteration < config.max_iterations {
        iteration += 1;

        // M_p = (1 - alpha) I + alpha M
        let m_p: Vec<T> = m
            .iter()
            .zip(eye.iter())
            .map(|(&m_v, &i_v)| one_minus_alpha * i_v + alpha_t * m_v)
            .collect();

        x = matmul_square(&x, &m_p, n);
        m = matmul_square(&matrix_power(&m_p, n, root as u64), &m, n);
        error = max_abs_diff(&m, &eye);
    }

    let flag = if error <= config.tolerance {
        NewtonConvergenceFlag::Converged
    } else {
        NewtonConvergenceFlag::ReachedMaxIters
    };

    CoupledIterationResult {
        root_inverse: Tensor::from_slice(&x, &[n, n]),
        residual: Tensor::from_slice(&m, &[n, n]),
        flag,
        iterations: iteration,
        error,
    }
}
