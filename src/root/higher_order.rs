//! Coupled higher-order iteration
//!
//! Generalizes the coupled Newton scheme to convergence order 2..=6. Each
//! update applies the order-k truncation of the Taylor expansion of
//! `(1 - x)^(-1/p)` to the residual matrix, giving order-k local
//! convergence; order 2 reproduces the Newton update exactly.
//!
//! The rational root `p/q` is split: the iteration computes `A^(-1/p)` for
//! the integer numerator `p`, and the denominator is realized afterwards by
//! integer powering ("powering for fractions"). The powering step is where
//! ill-conditioned input blows up, so the residual is checked against
//! `error_tolerance` first and the powered result is scanned for NaN/Inf.
//!
//! Elevated-precision work inside this method must not be perturbed by the
//! process-wide fast-math mode, so the flag is suspended for the duration
//! and restored on every exit path.

use super::newton::CoupledIterationResult;
use super::{CoupledHigherOrderConfig, NewtonConvergenceFlag};
use crate::dtype::{DType, LinalgElement};
use crate::error::{Error, Result};
use crate::fraction::Fraction;
use crate::helpers::validate_square_matrix;
use crate::kernels::{
    frobenius_norm, has_non_finite, identity, matmul_square, matrix_power, max_abs_diff,
    max_abs_entry,
};
use crate::precision::{working_dtype, FastMathGuard};
use crate::tensor::Tensor;

/// Rational roots with numerator or denominator above this magnitude degrade
/// convergence quality and draw a warning
const ROOT_MAGNITUDE_WARN_THRESHOLD: i64 = 10;

/// Compute `A^(-1/root)` for a rational `root > 0` by coupled higher-order
/// iteration plus powering for fractions.
pub fn matrix_inverse_root_higher_order(
    a: &Tensor,
    root: Fraction,
    epsilon: f64,
    config: &CoupledHigherOrderConfig,
) -> Result<CoupledIterationResult> {
    let _fast_math = FastMathGuard::disable();

    let n = validate_square_matrix(a.shape())?;
    if !root.is_positive() {
        return Err(Error::NonPositiveRoot { root });
    }
    if !(2..=6).contains(&config.order) {
        return Err(Error::InvalidArgument {
            arg: "order",
            reason: format!("order={} must be in [2, 6]", config.order),
        });
    }

    let p = root.numerator();
    let q = root.denominator();
    if p.abs() > ROOT_MAGNITUDE_WARN_THRESHOLD || q.abs() > ROOT_MAGNITUDE_WARN_THRESHOLD {
        log::warn!(
            "abs(root.numerator)={} and abs(root.denominator)={} are probably too big for best performance.",
            p.abs(),
            q.abs()
        );
    }

    let w = a.cast(working_dtype(a.dtype()));
    let result = match w.dtype() {
        DType::F64 => higher_order_typed::<f64>(&w, n, p, q, epsilon, config),
        _ => higher_order_typed::<f32>(&w, n, p, q, epsilon, config),
    }?;

    let root_inverse = result.root_inverse.cast(a.dtype());
    if root_inverse.to_f64_vec().iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFiniteRoot {
            stage: "after powering for fractions",
        });
    }

    Ok(CoupledIterationResult {
        root_inverse,
        residual: result.residual.cast(a.dtype()),
        ..result
    })
}

fn higher_order_typed<T: LinalgElement>(
    a: &Tensor,
    n: usize,
    p: i64,
    q: i64,
    epsilon: f64,
    config: &CoupledHigherOrderConfig,
) -> Result<CoupledIterationResult> {
    let a_data: Vec<T> = a.to_vec();

    if has_non_finite(&a_data) || max_abs_entry(&a_data) > T::max_finite() / 2.0 {
        return Err(Error::EntriesCloseToInf);
    }

    // Taylor coefficients of (1 - x)^(-1/p), truncated at the order:
    // b_0 = 1, b_i = b_{i-1} * (1 + (i - 1) p) / (i p)
    let pf = p as f64;
    let mut b = vec![1.0f64; config.order];
    let mut num = 1.0f64;
    let mut denom = 1.0f64;
    for (i, coeff) in b.iter_mut().enumerate().skip(1) {
        num *= 1.0 + (i as f64 - 1.0) * pf;
        denom *= i as f64 * pf;
        *coeff = num / denom;
    }

    let eye: Vec<T> = identity(n);

    // A_ridge = A + epsilon I
    let mut a_ridge = a_data;
    for i in 0..n {
        a_ridge[i * n + i] = a_ridge[i * n + i] + T::from_f64(epsilon);
    }

    // Same spectral-bound initialization as the Newton scheme
    let z = (pf + 1.0) / (2.0 * frobenius_norm(&a_ridge));
    let x0 = T::from_f64(z.powf(1.0 / pf));
    let zt = T::from_f64(z);

    let mut x: Vec<T> = eye.iter().map(|&v| x0 * v).collect();
    let mut m: Vec<T> = a_ridge.iter().map(|&v| zt * v).collect();
    let mut error = max_abs_diff(&m, &eye);
    let mut iteration = 0usize;

    while error > config.tolerance && iteration < config.max_iterations {
        iteration += 1;

        // E = I - M; T_poly = sum_i b_i E^i, evaluated by Horner
        let e: Vec<T> = eye
            .iter()
            .zip(m.iter())
            .map(|(&i_v, &m_v)| i_v - m_v)
            .collect();
        let mut poly: Vec<T> = eye
            .iter()
            .map(|&v| T::from_f64(b[config.order - 1]) * v)
            .collect();
        for &coeff in b[..config.order - 1].iter().rev() {
            let coeff_t = T::from_f64(coeff);
            poly = matmul_square(&e, &poly, n);
            for (poly_v, &i_v) in poly.iter_mut().zip(eye.iter()) {
                *poly_v = *poly_v + coeff_t * i_v;
            }
        }

        x = matmul_square(&x, &poly, n);
        m = matmul_square(&matrix_power(&poly, n, p as u64), &m, n);
        error = max_abs_diff(&m, &eye);
    }

    if !error.is_finite() || error > config.error_tolerance {
        return Err(Error::PrePoweringError {
            error,
            threshold: config.error_tolerance,
        });
    }

    // Powering for fractions: X = (A^(-1/p))^q
    if q > 1 {
        x = matrix_power(&x, n, q as u64);
    }

    let flag = if error <= config.tolerance {
        NewtonConvergenceFlag::Converged
    } else {
        NewtonConvergenceFlag::ReachedMaxIters
    };

    Ok(CoupledIterationResult {
        root_inverse: Tensor::from_slice(&x, &[n, n]),
        residual: Tensor::from_slice(&m, &[n, n]),
        flag,
        iterations: iteration,
        error,
    })
}
