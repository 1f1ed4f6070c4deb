//! Pure square-matrix kernels
//!
//! Type-generic numerical kernels shared by the eigendecomposition backends
//! and the coupled iterations. All kernels operate on flat row-major slices;
//! callers hold the dimension. Algorithms run in the element type itself so
//! that reduced-precision inputs keep their native overflow and rounding
//! behavior.

use crate::dtype::LinalgElement;

/// Minimum dimension before the parallel matmul path is worth the overhead
#[cfg(feature = "rayon")]
const PAR_MIN_DIM: usize = 64;

/// Square matrix multiplication: `C = A @ B`.
///
/// When the fast-math flag is enabled (and the `rayon` feature is on), output
/// rows are computed in parallel, which reassociates nothing within a row but
/// does not pin a global evaluation order. With fast math disabled the kernel
/// runs strictly serially in a fixed order.
pub fn matmul_square<T: LinalgElement>(a: &[T], b: &[T], n: usize) -> Vec<T> {
    let mut c = vec![T::zero(); n * n];

    #[cfg(feature = "rayon")]
    if n >= PAR_MIN_DIM && crate::precision::fast_math_enabled() {
        use rayon::prelude::*;
        c.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            matmul_row(a, b, n, i, row);
        });
        return c;
    }

    for i in 0..n {
        matmul_row(a, b, n, i, &mut c[i * n..(i + 1) * n]);
    }
    c
}

#[inline]
fn matmul_row<T: LinalgElement>(a: &[T], b: &[T], n: usize, i: usize, row: &mut [T]) {
    for k in 0..n {
        let a_ik = a[i * n + k];
        for j in 0..n {
            row[j] = row[j] + a_ik * b[k * n + j];
        }
    }
}

/// Square matrix multiplication against a transpose: `C = A @ B^T`
pub fn matmul_transpose_b<T: LinalgElement>(a: &[T], b: &[T], n: usize) -> Vec<T> {
    let mut c = vec![T::zero(); n * n];
    for i in 0..n {
        for j in 0..n {
            let mut sum = T::zero();
            for k in 0..n {
                sum = sum + a[i * n + k] * b[j * n + k];
            }
            c[i * n + j] = sum;
        }
    }
    c
}

/// Square matrix multiplication against a transposed left operand: `C = A^T @ B`
pub fn matmul_transpose_a<T: LinalgElement>(a: &[T], b: &[T], n: usize) -> Vec<T> {
    let mut c = vec![T::zero(); n * n];
    for k in 0..n {
        for i in 0..n {
            let a_ki = a[k * n + i];
            for j in 0..n {
                c[i * n + j] = c[i * n + j] + a_ki * b[k * n + j];
            }
        }
    }
    c
}

/// Initialize an identity matrix [n x n]
pub fn identity<T: LinalgElement>(n: usize) -> Vec<T> {
    let mut result = vec![T::zero(); n * n];
    for i in 0..n {
        result[i * n + i] = T::one();
    }
    result
}

/// Non-negative integer matrix power by repeated squaring
pub fn matrix_power<T: LinalgElement>(a: &[T], n: usize, mut exp: u64) -> Vec<T> {
    let mut result = identity::<T>(n);
    let mut base = a.to_vec();
    while exp > 0 {
        if exp & 1 == 1 {
            result = matmul_square(&result, &base, n);
        }
        exp >>= 1;
        if exp > 0 {
            base = matmul_square(&base, &base, n);
        }
    }
    result
}

/// Frobenius norm: sqrt(sum of squared entries), accumulated in f64
pub fn frobenius_norm<T: LinalgElement>(a: &[T]) -> f64 {
    let mut sum = 0.0f64;
    for v in a {
        let x = v.to_f64();
        sum += x * x;
    }
    sum.sqrt()
}

/// Operator infinity norm (maximum absolute row sum)
pub fn operator_inf_norm<T: LinalgElement>(a: &[T], n: usize) -> f64 {
    let mut max_row = 0.0f64;
    for i in 0..n {
        let mut row_sum = 0.0f64;
        for j in 0..n {
            row_sum += a[i * n + j].to_f64().abs();
        }
        if row_sum > max_row {
            max_row = row_sum;
        }
    }
    max_row
}

/// Maximum absolute elementwise difference (Chebyshev distance)
pub fn max_abs_diff<T: LinalgElement>(a: &[T], b: &[T]) -> f64 {
    let mut max_diff = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let diff = (x.to_f64() - y.to_f64()).abs();
        if diff > max_diff {
            max_diff = diff;
        }
    }
    max_diff
}

/// Largest absolute entry
pub fn max_abs_entry<T: LinalgElement>(a: &[T]) -> f64 {
    let mut max_abs = 0.0f64;
    for v in a {
        let x = v.to_f64().abs();
        if x > max_abs {
            max_abs = x;
        }
    }
    max_abs
}

/// True if any entry is NaN or infinite
pub fn has_non_finite<T: LinalgElement>(a: &[T]) -> bool {
    a.iter().any(|v| !v.is_finite_val())
}
