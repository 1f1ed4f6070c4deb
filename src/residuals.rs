//! Residual evaluator
//!
//! Algorithm-agnostic diagnostics for a candidate inverse root, usable after
//! any of the three strategies. Both scalars are computed in double
//! precision regardless of the input dtype: the point of the diagnostics is
//! to measure the candidate, not to inherit its rounding.

use crate::eigen::matrix_eigendecomposition;
use crate::error::{Error, Result};
use crate::fraction::Fraction;
use crate::helpers::validate_square_matrix;
use crate::kernels::{identity, matmul_square, matmul_transpose_b, max_abs_diff, operator_inf_norm};
use crate::tensor::Tensor;

/// Compute diagnostic residuals for a candidate inverse root `X_hat` of `A`.
///
/// Returns `(relative_error, relative_residual)`:
///
/// - `relative_error = ||A_ridge - X_hat^(-root)||_max / max(1, ||A_ridge||_inf)`
///   measures how far the candidate is from the true inverse root;
/// - `relative_residual = ||A_ridge X_hat^root - I||_max / max(1, ||A_ridge||_inf)`
///   measures self-consistency of the candidate,
///
/// where `A_ridge = A + epsilon I`, `||.||_max` is the largest absolute
/// entry and `||.||_inf` the max-row-sum operator norm. Both are exactly
/// zero for `A = X_hat = I` and any positive root.
pub fn compute_matrix_root_inverse_residuals(
    a: &Tensor,
    x_hat: &Tensor,
    root: Fraction,
    epsilon: f64,
) -> Result<(f64, f64)> {
    let n = validate_square_matrix(a.shape())?;
    if a.shape() != x_hat.shape() {
        return Err(Error::shape_mismatch(a.shape(), x_hat.shape()));
    }

    let mut a_ridge = a.to_f64_vec();
    for i in 0..n {
        a_ridge[i * n + i] += epsilon;
    }
    let norm = operator_inf_norm(&a_ridge, n).max(1.0);

    // One f64 eigendecomposition of the candidate serves both rational powers.
    let x64 = Tensor::from_slice(&x_hat.to_f64_vec(), x_hat.shape());
    let decomp = matrix_eigendecomposition(&x64, &Default::default(), false)?;
    let eigenvalues = decomp.eigenvalues.to_f64_vec();
    let q = decomp.eigenvectors.to_f64_vec();

    let exponent = root.to_f64();
    let x_pow_neg = reconstruct_power(&eigenvalues, &q, n, -exponent);
    let relative_error = max_abs_diff(&a_ridge, &x_pow_neg) / norm;

    let x_pow = reconstruct_power(&eigenvalues, &q, n, exponent);
    let product = matmul_square(&a_ridge, &x_pow, n);
    let relative_residual = max_abs_diff(&product, &identity::<f64>(n)) / norm;

    Ok((relative_error, relative_residual))
}

/// `Q diag(L^exponent) Q^T` for a symmetric candidate's decomposition
fn reconstruct_power(eigenvalues: &[f64], q: &[f64], n: usize, exponent: f64) -> Vec<f64> {
    let powered: Vec<f64> = eigenvalues.iter().map(|l| l.powf(exponent)).collect();
    let mut scaled = q.to_vec();
    for row in 0..n {
        for col in 0..n {
            scaled[row * n + col] *= powered[col];
        }
    }
    matmul_transpose_b(&scaled, q, n)
}
