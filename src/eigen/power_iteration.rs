//! Power-iteration eigensolver with deflation
//!
//! Extracts eigenpairs one at a time: power-iterate a seeded random vector
//! against the current deflated matrix until the dominant Rayleigh-quotient
//! estimate stabilizes, deflate that pair out, repeat. Deflation accumulates
//! rounding error pair by pair, so this backend always computes in f64 and
//! demotes at the end. Exhausting the per-pair budget is not an error.

use super::{sort_ascending, EigenDecomposition, PowerIterationConfig};
use crate::error::Result;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Decompose a symmetric matrix by power iteration with deflation.
///
/// The dispatcher has already validated squareness and handled the scalar
/// and diagonal fast paths.
pub fn power_iteration_decompose(
    a: &Tensor,
    config: &PowerIterationConfig,
) -> Result<EigenDecomposition> {
    let n = a.shape()[0];
    let a_data = a.to_f64_vec();

    if n == 0 {
        return Ok(EigenDecomposition {
            eigenvalues: Tensor::from_f64_slice(&[], &[0], a.dtype()),
            eigenvectors: Tensor::from_f64_slice(&[], &[0, 0], a.dtype()),
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut deflated = a_data.clone();
    let mut eigenvalues = vec![0.0f64; n];
    let mut vectors: Vec<Vec<f64>> = Vec::with_capacity(n);

    for k in 0..n {
        let mut v = random_unit_vector(&mut rng, n, k);

        for _ in 0..config.max_iterations {
            let av = matvec(&deflated, &v, n);

            let norm = dot(&av, &av).sqrt();
            if norm <= f64::EPSILON {
                // v lies in the (deflated-out) null space; the final
                // Rayleigh quotient below reports a zero eigenvalue.
                break;
            }

            let new_v: Vec<f64> = av.iter().map(|x| x / norm).collect();

            // Converge on the vector, not the Rayleigh quotient: the
            // quotient stabilizes quadratically faster than the vector, and
            // deflating with a sloppy vector contaminates every later pair.
            // A negative dominant eigenvalue flips the iterate's sign each
            // step, so align before measuring the change.
            let sign = if dot(&new_v, &v) >= 0.0 { 1.0 } else { -1.0 };
            let change = new_v
                .iter()
                .zip(v.iter())
                .map(|(a, b)| (a - sign * b).abs())
                .fold(0.0f64, f64::max);

            v = new_v;
            if change <= config.tolerance {
                break;
            }
        }

        // Re-orthogonalize against the pairs found so far; deflation alone
        // lets rounding error reintroduce earlier components.
        for prev in &vectors {
            let proj = dot(&v, prev);
            for i in 0..n {
                v[i] -= proj * prev[i];
            }
        }
        let norm = dot(&v, &v).sqrt();
        if norm > f64::EPSILON {
            for x in &mut v {
                *x /= norm;
            }
        }

        let av = matvec(&deflated, &v, n);
        let lambda = dot(&v, &av);

        // Hotelling deflation: remove the found pair
        for i in 0..n {
            for j in 0..n {
                deflated[i * n + j] -= lambda * v[i] * v[j];
            }
        }

        eigenvalues[k] = lambda;
        vectors.push(v);
    }

    let mut eigenvectors = vec![0.0f64; n * n];
    for (col, v) in vectors.iter().enumerate() {
        for row in 0..n {
            eigenvectors[row * n + col] = v[row];
        }
    }
    sort_ascending(&mut eigenvalues, &mut eigenvectors, n);

    Ok(EigenDecomposition {
        eigenvalues: Tensor::from_f64_slice(&eigenvalues, &[n], a.dtype()),
        eigenvectors: Tensor::from_f64_slice(&eigenvectors, &[n, n], a.dtype()),
    })
}

/// Normalized random start vector, falling back to a basis vector for the
/// (measure-zero) case of a near-zero sample.
fn random_unit_vector(rng: &mut StdRng, n: usize, k: usize) -> Vec<f64> {
    let mut v: Vec<f64> = (0..n).map(|_| rng.sample(StandardNormal)).collect();
    let norm = dot(&v, &v).sqrt();
    if norm <= f64::EPSILON {
        v = vec![0.0; n];
        v[k % n] = 1.0;
        return v;
    }
    for x in &mut v {
        *x /= norm;
    }
    v
}

fn matvec(a: &[f64], v: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![0.0f64; n];
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..n {
            sum += a[i * n + j] * v[j];
        }
        out[i] = sum;
    }
    out
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
