//! Orthogonal-iteration (QR) eigensolver with warm start
//!
//! Runs the QR eigenvalue algorithm on an orthogonally similarity-transformed
//! working matrix, accumulating the eigenvector estimate. A caller-supplied
//! estimate (e.g. a prior decomposition's eigenvectors) seeds the iteration
//! and can cut the iteration count to one or two steps, which is why the
//! default iteration budget is small. Non-convergence returns the best
//! estimate rather than an error.

use super::{sort_ascending, EigenDecomposition, QrConfig};
use crate::dtype::{DType, LinalgElement};
use crate::error::{Error, Result};
use crate::kernels::{identity, matmul_square, matmul_transpose_a};
use crate::precision::working_dtype;
use crate::tensor::Tensor;

/// Decompose a symmetric matrix by orthogonal iteration.
///
/// The dispatcher has already validated squareness and handled the scalar
/// and diagonal fast paths.
pub fn qr_iteration_decompose(a: &Tensor, config: &QrConfig) -> Result<EigenDecomposition> {
    let n = a.shape()[0];

    if let Some(estimate) = &config.eigenvectors_estimate {
        if estimate.shape() != a.shape() {
            return Err(Error::shape_mismatch(a.shape(), estimate.shape()));
        }
    }

    let w = a.cast(working_dtype(a.dtype()));
    let decomp = match w.dtype() {
        DType::F64 => qr_iteration_typed::<f64>(&w, n, config),
        _ => qr_iteration_typed::<f32>(&w, n, config),
    }?;

    Ok(EigenDecomposition {
        eigenvalues: decomp.eigenvalues.cast(a.dtype()),
        eigenvectors: decomp.eigenvectors.cast(a.dtype()),
    })
}

fn qr_iteration_typed<T: LinalgElement>(
    a: &Tensor,
    n: usize,
    config: &QrConfig,
) -> Result<EigenDecomposition> {
    let a_data: Vec<T> = a.to_vec();

    if n == 0 {
        return Ok(EigenDecomposition {
            eigenvalues: Tensor::from_slice::<T>(&[], &[0]),
            eigenvectors: Tensor::from_slice::<T>(&[], &[0, 0]),
        });
    }

    if n == 1 {
        return Ok(EigenDecomposition {
            eigenvalues: Tensor::from_slice(&[a_data[0]], &[1]),
            eigenvectors: Tensor::from_slice(&[T::one()], &[1, 1]),
        });
    }

    // Warm start: an all-zero estimate means "no estimate".
    let mut q: Vec<T> = match &config.eigenvectors_estimate {
        Some(estimate) => {
            let est: Vec<T> = estimate.cast(T::DTYPE).to_vec();
            if est.iter().all(|v| v.to_f64() == 0.0) {
                identity(n)
            } else {
                est
            }
        }
        None => identity(n),
    };

    // B = Q^T A Q; for an exact warm start B is already diagonal.
    let mut b = matmul_square(&matmul_transpose_a(&q, &a_data, n), &q, n);

    for _ in 0..config.max_iterations {
        if off_diagonal_ratio(&b, n) <= config.tolerance {
            break;
        }
        let (q_k, r_k) = householder_qr(&b, n);
        b = matmul_square(&r_k, &q_k, n);
        q = matmul_square(&q, &q_k, n);
    }

    let mut eigenvalues: Vec<T> = (0..n).map(|i| b[i * n + i]).collect();
    sort_ascending(&mut eigenvalues, &mut q, n);

    Ok(EigenDecomposition {
        eigenvalues: Tensor::from_slice(&eigenvalues, &[n]),
        eigenvectors: Tensor::from_slice(&q, &[n, n]),
    })
}

/// Off-diagonal Frobenius mass relative to the whole matrix
fn off_diagonal_ratio<T: LinalgElement>(b: &[T], n: usize) -> f64 {
    let mut off_sq = 0.0f64;
    let mut total_sq = 0.0f64;
    for i in 0..n {
        for j in 0..n {
            let v = b[i * n + j].to_f64();
            total_sq += v * v;
            if i != j {
                off_sq += v * v;
            }
        }
    }
    if total_sq == 0.0 {
        return 0.0;
    }
    (off_sq / total_sq).sqrt()
}

/// QR factorization of a square matrix by Householder reflections.
///
/// Returns `(Q, R)` with `Q` orthogonal and `R` upper triangular.
fn householder_qr<T: LinalgElement>(a: &[T], n: usize) -> (Vec<T>, Vec<T>) {
    let mut r = a.to_vec();
    let mut q: Vec<T> = identity(n);
    let two = T::from_f64(2.0);

    for col in 0..n {
        let x_len = n - col;

        // Column below (and including) the diagonal
        let mut x: Vec<T> = vec![T::zero(); x_len];
        for i in 0..x_len {
            x[i] = r[(col + i) * n + col];
        }

        let mut norm_sq = T::zero();
        for &val in &x {
            norm_sq = norm_sq + val * val;
        }
        let norm_x = norm_sq.sqrt_val();

        if norm_x.abs_val().to_f64() < T::epsilon_val() {
            continue;
        }

        // alpha = -sign(x[0]) * ||x||
        let alpha = if x[0].to_f64() >= 0.0 {
            norm_x.neg_val()
        } else {
            norm_x
        };

        let mut v = x;
        v[0] = v[0] - alpha;

        let mut v_norm_sq = T::zero();
        for &val in &v {
            v_norm_sq = v_norm_sq + val * val;
        }
        let v_norm = v_norm_sq.sqrt_val();

        if v_norm.abs_val().to_f64() < T::epsilon_val() {
            continue;
        }

        for val in &mut v {
            *val = *val / v_norm;
        }

        // R[col:, col:] -= 2 v (v^T R[col:, col:])
        let mut w: Vec<T> = vec![T::zero(); n - col];
        for j in 0..(n - col) {
            for i in 0..x_len {
                w[j] = w[j] + v[i] * r[(col + i) * n + (col + j)];
            }
        }
        for i in 0..x_len {
            for j in 0..(n - col) {
                let update = two * v[i] * w[j];
                r[(col + i) * n + (col + j)] = r[(col + i) * n + (col + j)] - update;
            }
        }

        // Q[:, col:] -= 2 (Q[:, col:] v) v^T
        for row in 0..n {
            let mut dot = T::zero();
            for i in 0..x_len {
                dot = dot + q[row * n + (col + i)] * v[i];
            }
            for i in 0..x_len {
                let update = two * dot * v[i];
                q[row * n + (col + i)] = q[row * n + (col + i)] - update;
            }
        }
    }

    (q, r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_householder_qr_reconstructs() {
        let a = vec![2.0f64, 1.0, 0.5, 1.0, 3.0, 1.0, 0.5, 1.0, 2.5];
        let (q, r) = householder_qr(&a, 3);

        // Q orthogonal: Q^T Q = I
        let qtq = matmul_transpose_a(&q, &q, 3);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((qtq[i * 3 + j] - expected).abs() < 1e-12);
            }
        }

        // QR = A
        let qr = matmul_square(&q, &r, 3);
        for (x, y) in qr.iter().zip(a.iter()) {
            assert!((x - y).abs() < 1e-12);
        }

        // R upper triangular
        for i in 0..3 {
            for j in 0..i {
                assert!(r[i * 3 + j].abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_off_diagonal_ratio() {
        let diag = vec![2.0f64, 0.0, 0.0, 3.0];
        assert_eq!(off_diagonal_ratio(&diag, 2), 0.0);

        let zero = vec![0.0f64; 4];
        assert_eq!(off_diagonal_ratio(&zero, 2), 0.0);
    }
}
