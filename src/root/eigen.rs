//! Eigendecomposition-based inverse root

use super::EigenConfig;
use crate::eigen::matrix_eigendecomposition;
use crate::error::{Error, Result};
use crate::fraction::Fraction;
use crate::kernels::matmul_transpose_b;
use crate::tensor::Tensor;

/// Compute `A^(-1/root)` via eigendecomposition:
/// `X = Q diag((L + epsilon)^(-1/root)) Q^T`.
///
/// Returns the inverse root together with the regularized eigenvalues and
/// the eigenvectors, so callers can reuse the decomposition (e.g. as a warm
/// start for a later QR solve).
pub fn matrix_inverse_root_eigen(
    a: &Tensor,
    root: Fraction,
    epsilon: f64,
    config: &EigenConfig,
) -> Result<(Tensor, Tensor, Tensor)> {
    if !root.is_positive() {
        return Err(Error::NonPositiveRoot { root });
    }
    let alpha = root.neg_recip_f64();

    let decomp = matrix_eigendecomposition(a, &config.eigendecomposition_config, false)?;
    let n = a.shape()[0];

    let eigenvalues: Vec<f64> = decomp
        .eigenvalues
        .to_f64_vec()
        .into_iter()
        .map(|l| l + epsilon)
        .collect();
    let q = decomp.eigenvectors.to_f64_vec();

    // Scale column j of Q by lambda_j^alpha, then multiply by Q^T
    let powered: Vec<f64> = eigenvalues.iter().map(|l| l.powf(alpha)).collect();
    let mut scaled = q.clone();
    for row in 0..n {
        for col in 0..n {
            scaled[row * n + col] *= powered[col];
        }
    }
    let x = matmul_transpose_b(&scaled, &q, n);

    let x_tensor = Tensor::from_f64_slice(&x, &[n, n], a.dtype());
    if x_tensor.to_f64_vec().iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFiniteRoot {
            stage: "after powering eigenvalues",
        });
    }

    Ok((
        x_tensor,
        Tensor::from_f64_slice(&eigenvalues, &[n], a.dtype()),
        decomp.eigenvectors,
    ))
}
