//! Eigendecomposition engine
//!
//! Polymorphic over three backend strategies producing `(eigenvalues,
//! eigenvectors)` for a symmetric matrix: a direct two-sided Jacobi solver
//! ([`EighConfig`]), an orthogonal-iteration solver with optional warm start
//! ([`QrConfig`]), and a power-iteration-with-deflation solver
//! ([`PowerIterationConfig`]).

pub mod eigh;
pub mod power_iteration;
pub mod qr;

use crate::error::{Error, Result};
use crate::helpers::validate_square_matrix;
use crate::tensor::Tensor;

/// Eigendecomposition result for symmetric matrices: A = V @ diag(L) @ V^T
///
/// Eigenvalues are sorted ascending; eigenvector columns are orthonormal and
/// permuted to match.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues [n] (ascending)
    pub eigenvalues: Tensor,

    /// Eigenvector matrix [n, n] where column i pairs with eigenvalue i
    pub eigenvectors: Tensor,
}

/// Configuration for the direct (Jacobi) symmetric eigensolver
#[derive(Debug, Clone)]
pub struct EighConfig {
    /// Retry a failed solve once with the input promoted to double precision
    pub retry_double_precision: bool,

    /// Apply a deterministic sign convention to the eigenvectors: each column
    /// is flipped so its largest-magnitude component is positive
    pub enhance_stability: bool,
}

impl Default for EighConfig {
    fn default() -> Self {
        Self {
            retry_double_precision: true,
            enhance_stability: false,
        }
    }
}

/// Configuration for the orthogonal-iteration (QR) eigensolver
#[derive(Debug, Clone)]
pub struct QrConfig {
    /// Iteration ceiling; non-convergence is not an error
    pub max_iterations: usize,

    /// Relative off-diagonal Frobenius mass below which iteration stops
    pub tolerance: f64,

    /// Warm-start estimate of the eigenvector matrix. An all-zero estimate
    /// is treated as absent; a prior decomposition's eigenvectors reduce the
    /// iteration count substantially.
    pub eigenvectors_estimate: Option<Tensor>,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1,
            tolerance: 1e-2,
            eigenvectors_estimate: None,
        }
    }
}

/// Configuration for the power-iteration-with-deflation eigensolver
#[derive(Debug, Clone)]
pub struct PowerIterationConfig {
    /// Iteration budget per eigenpair; exhaustion is not an error
    pub max_iterations: usize,

    /// Relative change in the eigenvalue estimate below which a pair is
    /// considered converged
    pub tolerance: f64,

    /// Seed for the random start vectors
    pub seed: u64,
}

impl Default for PowerIterationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            seed: 0,
        }
    }
}

/// Eigendecomposition backend selection
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum EigendecompositionConfig {
    /// Direct two-sided Jacobi solver
    Eigh(EighConfig),
    /// Orthogonal (QR) iteration with optional warm start
    Qr(QrConfig),
    /// Power iteration with deflation, for partial/low-rank spectra
    PowerIteration(PowerIterationConfig),
}

impl Default for EigendecompositionConfig {
    fn default() -> Self {
        Self::Eigh(EighConfig::default())
    }
}

/// Compute the eigendecomposition of a symmetric matrix.
///
/// Returns eigenvalues sorted ascending and the matching orthonormal
/// eigenvector columns.
///
/// - Scalar input (a single element, any rank) is returned unchanged with a
///   unit eigenvector, no solver invoked.
/// - With `is_diagonal`, the eigenvalues are read straight off the diagonal
///   and the eigenvectors are the identity.
/// - Otherwise the input must be 2-dimensional and square.
pub fn matrix_eigendecomposition(
    a: &Tensor,
    config: &EigendecompositionConfig,
    is_diagonal: bool,
) -> Result<EigenDecomposition> {
    if a.numel() == 1 {
        return Ok(EigenDecomposition {
            eigenvalues: a.clone(),
            eigenvectors: Tensor::from_f64_slice(&[1.0], a.shape(), a.dtype()),
        });
    }

    let n = validate_square_matrix(a.shape())?;

    if is_diagonal {
        let data = a.to_f64_vec();
        let diag: Vec<f64> = (0..n).map(|i| data[i * n + i]).collect();
        return Ok(EigenDecomposition {
            eigenvalues: Tensor::from_f64_slice(&diag, &[n], a.dtype()),
            eigenvectors: Tensor::eye(n, a.dtype()),
        });
    }

    match config {
        EigendecompositionConfig::Eigh(cfg) => eigh::eigh_decompose(a, cfg),
        EigendecompositionConfig::Qr(cfg) => qr::qr_iteration_decompose(a, cfg),
        EigendecompositionConfig::PowerIteration(cfg) => {
            power_iteration::power_iteration_decompose(a, cfg)
        }
        #[allow(unreachable_patterns)]
        other => Err(Error::NotImplemented {
            feature: format!(
                "Eigendecomposition config is not implemented! Specified eigendecomposition config is {other:?}."
            ),
        }),
    }
}

/// Sort eigenvalues ascending and permute eigenvector columns to match.
///
/// Shared by all three backends.
pub(crate) fn sort_ascending<T: crate::dtype::LinalgElement>(
    eigenvalues: &mut [T],
    eigenvectors: &mut [T],
    n: usize,
) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&i, &j| {
        eigenvalues[i]
            .to_f64()
            .partial_cmp(&eigenvalues[j].to_f64())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let sorted_values: Vec<T> = indices.iter().map(|&i| eigenvalues[i]).collect();
    eigenvalues.copy_from_slice(&sorted_values);

    let old_vectors = eigenvectors.to_vec();
    for (new_col, &old_col) in indices.iter().enumerate() {
        for row in 0..n {
            eigenvectors[row * n + new_col] = old_vectors[row * n + old_col];
        }
    }
}
