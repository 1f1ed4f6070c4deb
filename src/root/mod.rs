//! Matrix inverse root engine
//!
//! Computes `A^(-1/root)` for a symmetric positive semi-definite matrix and
//! a positive rational root, dispatching to one of three strategies selected
//! by [`RootInvConfig`]. Owns the stability guards, the diagonal and scalar
//! fast paths, and the non-convergence warnings.

pub mod eigen;
pub mod higher_order;
pub mod newton;

use crate::eigen::EigendecompositionConfig;
use crate::error::{Error, Result};
use crate::fraction::Fraction;
use crate::helpers::validate_square_matrix;
use crate::tensor::Tensor;

/// Terminal classification of a coupled iteration.
///
/// Never an error by itself; reaching the iteration ceiling triggers a
/// warning and the best-available estimate is still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewtonConvergenceFlag {
    /// The residual dropped below the configured tolerance
    Converged,
    /// The iteration ceiling was reached first
    ReachedMaxIters,
}

/// Configuration for the eigendecomposition-based strategy
#[derive(Debug, Clone, Default)]
pub struct EigenConfig {
    /// Backend used to obtain the decomposition (Eigh or QR)
    pub eigendecomposition_config: EigendecompositionConfig,
}

/// Configuration for the coupled inverse-Newton strategy
#[derive(Debug, Clone)]
pub struct CoupledNewtonConfig {
    /// Iteration ceiling
    pub max_iterations: usize,

    /// Residual threshold (`||M - I||_max`) for convergence
    pub tolerance: f64,
}

impl Default for CoupledNewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// Configuration for the coupled higher-order strategy
#[derive(Debug, Clone)]
pub struct CoupledHigherOrderConfig {
    /// Convergence order of the iteration, in `[2, 6]`; order 2 is the
    /// Newton update
    pub order: usize,

    /// Iteration ceiling
    pub max_iterations: usize,

    /// Residual threshold (`||M - I||_max`) for convergence. The default is
    /// effectively "iterate to the numerical floor or the ceiling".
    pub tolerance: f64,

    /// Largest residual accepted before the fractional powering step
    pub error_tolerance: f64,
}

impl Default for CoupledHigherOrderConfig {
    fn default() -> Self {
        Self {
            order: 3,
            max_iterations: 100,
            tolerance: 1e-20,
            error_tolerance: 1e-1,
        }
    }
}

/// Root-inverse strategy selection
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum RootInvConfig {
    /// Eigendecompose, power the eigenvalues, reconstruct
    Eigen(EigenConfig),
    /// Coupled inverse-Newton iteration (integer roots only)
    CoupledNewton(CoupledNewtonConfig),
    /// Coupled higher-order iteration plus powering for fractions
    CoupledHigherOrder(CoupledHigherOrderConfig),
}

impl Default for RootInvConfig {
    fn default() -> Self {
        Self::Eigen(EigenConfig::default())
    }
}

/// Compute `A^(-1/root)` for a symmetric positive semi-definite matrix.
///
/// - `root` must be strictly positive, for every path.
/// - Scalar input (a single element, any rank) short-circuits to
///   `(a + epsilon)^(-1/root)`.
/// - Otherwise the input must be 2-dimensional and square.
/// - With `is_diagonal`, the result is `(diag + epsilon)^(-1/root)` computed
///   elementwise; no solver or iteration runs.
/// - Non-convergence of the iterative strategies is logged as a warning, not
///   an error; numerical blowups (NaN/Inf) are errors.
pub fn matrix_inverse_root(
    a: &Tensor,
    root: Fraction,
    root_inv_config: &RootInvConfig,
    epsilon: f64,
    is_diagonal: bool,
) -> Result<Tensor> {
    if !root.is_positive() {
        return Err(Error::NonPositiveRoot { root });
    }

    if a.numel() == 1 {
        let alpha = root.neg_recip_f64();
        let value = (a.to_f64_vec()[0] + epsilon).powf(alpha);
        return Ok(Tensor::from_f64_slice(&[value], a.shape(), a.dtype()));
    }

    let n = validate_square_matrix(a.shape())?;

    if is_diagonal {
        return matrix_root_diagonal(a, n, root, epsilon);
    }

    match root_inv_config {
        RootInvConfig::Eigen(config) => {
            let (x, _, _) = eigen::matrix_inverse_root_eigen(a, root, epsilon, config)?;
            Ok(x)
        }
        RootInvConfig::CoupledNewton(config) => {
            if root.denominator() != 1 {
                return Err(Error::NewtonFractionalRoot {
                    denominator: root.denominator(),
                });
            }
            let result = newton::matrix_inverse_root_newton(a, root.numerator(), epsilon, config)?;
            if result.flag == NewtonConvergenceFlag::ReachedMaxIters {
                log::warn!("Newton did not converge and reached maximum number of iterations!");
            }
            Ok(result.root_inverse)
        }
        RootInvConfig::CoupledHigherOrder(config) => {
            let result =
                higher_order::matrix_inverse_root_higher_order(a, root, epsilon, config)?;
            if result.flag == NewtonConvergenceFlag::ReachedMaxIters {
                log::warn!(
                    "Higher order method did not converge and reached maximum number of iterations!"
                );
            }
            Ok(result.root_inverse)
        }
        #[allow(unreachable_patterns)]
        other => Err(Error::NotImplemented {
            feature: format!(
                "Root inverse config is not implemented! Specified root inverse config is {other:?}."
            ),
        }),
    }
}

/// Inverse root of an exactly diagonal matrix, computed elementwise
fn matrix_root_diagonal(a: &Tensor, n: usize, root: Fraction, epsilon: f64) -> Result<Tensor> {
    let alpha = root.neg_recip_f64();
    let data = a.to_f64_vec();
    let mut out = vec![0.0f64; n * n];
    for i in 0..n {
        out[i * n + i] = (data[i * n + i] + epsilon).powf(alpha);
    }
    Ok(Tensor::from_f64_slice(&out, &[n, n], a.dtype()))
}
