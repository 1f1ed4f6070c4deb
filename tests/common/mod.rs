//! Common test utilities
#![allow(dead_code)]

use rootr::tensor::Tensor;

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// The shared 3x3 fixture: a symmetric positive-definite matrix whose
/// inverse square root is exactly [[1,1,1],[1,2,-3],[1,-3,18]].
pub fn fixture_3x3() -> Tensor {
    Tensor::from_slice(
        &[
            1195.0f64, -944.0, -224.0, //
            -944.0, 746.0, 177.0, //
            -224.0, 177.0, 42.0,
        ],
        &[3, 3],
    )
}

/// Exact inverse square root of [`fixture_3x3`]
pub fn fixture_3x3_inverse_sqrt() -> Vec<f64> {
    vec![
        1.0, 1.0, 1.0, //
        1.0, 2.0, -3.0, //
        1.0, -3.0, 18.0,
    ]
}

/// Eigenvalues of [`fixture_3x3`], ascending
pub fn fixture_3x3_eigenvalues() -> Vec<f64> {
    vec![2.9008677229e-3, 1.7424316704e-1, 1.9828229980e3]
}

/// Eigenvectors of [`fixture_3x3`], columns matching the ascending
/// eigenvalue order (signs as produced by a reference solver)
pub fn fixture_3x3_eigenvectors() -> Vec<f64> {
    vec![
        0.0460073575, -0.6286827326, 0.7762997746, //
        -0.1751257628, -0.7701635957, -0.6133345366, //
        0.9834705591, -0.1077321917, -0.1455317289,
    ]
}

/// Symmetric tridiagonal matrix with `alpha` on the diagonal (the first and
/// last entries increased by `beta`) and `beta` off-diagonal. Eigenvalues
/// are `alpha + 2 beta cos(j pi / n)`.
pub fn tridiagonal_1(n: usize, alpha: f64, beta: f64) -> Tensor {
    let mut data = vec![0.0f64; n * n];
    for i in 0..n {
        data[i * n + i] = alpha;
    }
    data[0] += beta;
    data[(n - 1) * n + (n - 1)] += beta;
    for i in 0..n - 1 {
        data[i * n + (i + 1)] = beta;
        data[(i + 1) * n + i] = beta;
    }
    Tensor::from_slice(&data, &[n, n])
}

/// Second tridiagonal family: `alpha` on the diagonal with the first entry
/// decreased by `beta`, `beta` off-diagonal.
pub fn tridiagonal_2(n: usize, alpha: f64, beta: f64) -> Tensor {
    let mut data = vec![0.0f64; n * n];
    for i in 0..n {
        data[i * n + i] = alpha;
    }
    data[0] -= beta;
    for i in 0..n - 1 {
        data[i * n + (i + 1)] = beta;
        data[(i + 1) * n + i] = beta;
    }
    Tensor::from_slice(&data, &[n, n])
}

/// Flip the sign of each estimated eigenvector column whose first row
/// disagrees in sign with the expected one, so solver-dependent sign
/// choices do not fail the comparison.
pub fn align_column_signs(estimated: &mut [f64], expected: &[f64], n: usize) {
    for j in 0..n {
        if expected[j] * estimated[j] < 0.0 {
            for i in 0..n {
                estimated[i * n + j] = -estimated[i * n + j];
            }
        }
    }
}

/// Relative round-trip error of a candidate inverse root:
/// `||X^(-root) - A||_max / max(1, ||A||_inf)` with everything in f64.
pub fn round_trip_relative_error(a: &Tensor, x: &Tensor, root: i64) -> f64 {
    let n = a.shape()[0];
    let a_data = a.to_f64_vec();
    let x_data = x.to_f64_vec();

    // X^(-root) = (X^root)^(-1) via Gauss-Jordan on the powered matrix
    let x_pow = matpow(&x_data, n, root as u64);
    let x_pow_inv = invert(&x_pow, n);

    let mut max_diff = 0.0f64;
    for i in 0..n * n {
        max_diff = max_diff.max((x_pow_inv[i] - a_data[i]).abs());
    }

    let mut a_norm = 0.0f64;
    for i in 0..n {
        let row: f64 = (0..n).map(|j| a_data[i * n + j].abs()).sum();
        a_norm = a_norm.max(row);
    }

    max_diff / a_norm.max(1.0)
}

fn matpow(a: &[f64], n: usize, mut exp: u64) -> Vec<f64> {
    let mut result = vec![0.0f64; n * n];
    for i in 0..n {
        result[i * n + i] = 1.0;
    }
    let mut base = a.to_vec();
    while exp > 0 {
        if exp & 1 == 1 {
            result = matmul(&result, &base, n);
        }
        exp >>= 1;
        if exp > 0 {
            base = matmul(&base, &base, n);
        }
    }
    result
}

fn matmul(a: &[f64], b: &[f64], n: usize) -> Vec<f64> {
    let mut c = vec![0.0f64; n * n];
    for i in 0..n {
        for k in 0..n {
            let a_ik = a[i * n + k];
            for j in 0..n {
                c[i * n + j] += a_ik * b[k * n + j];
            }
        }
    }
    c
}

fn invert(a: &[f64], n: usize) -> Vec<f64> {
    let mut aug = vec![0.0f64; n * 2 * n];
    for i in 0..n {
        for j in 0..n {
            aug[i * 2 * n + j] = a[i * n + j];
        }
        aug[i * 2 * n + n + i] = 1.0;
    }

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if aug[row * 2 * n + col].abs() > aug[pivot * 2 * n + col].abs() {
                pivot = row;
            }
        }
        if pivot != col {
            for j in 0..2 * n {
                aug.swap(col * 2 * n + j, pivot * 2 * n + j);
            }
        }
        let p = aug[col * 2 * n + col];
        for j in 0..2 * n {
            aug[col * 2 * n + j] /= p;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[row * 2 * n + col];
                for j in 0..2 * n {
                    aug[row * 2 * n + j] -= factor * aug[col * 2 * n + j];
                }
            }
        }
    }

    let mut inv = vec![0.0f64; n * n];
    for i in 0..n {
        for j in 0..n {
            inv[i * n + j] = aug[i * 2 * n + n + j];
        }
    }
    inv
}
