//! # rootr
//!
//! **Matrix inverse p-th roots for symmetric matrices.**
//!
//! rootr computes `A^(-1/root)` for a dense symmetric positive semi-definite
//! matrix `A` and an exact rational exponent `root > 0` - the core primitive
//! behind second-order optimization preconditioners.
//!
//! ## Strategies
//!
//! Three competing root-inverse strategies, selected via [`root::RootInvConfig`]:
//!
//! - **Eigen**: eigendecompose, power the eigenvalues, reconstruct
//! - **Coupled Newton**: fixed-point coupled iteration, integer roots only
//! - **Coupled higher-order**: order 2-6 coupled iteration plus direct
//!   powering for the rational part
//!
//! The eigendecomposition subsystem is itself pluggable
//! ([`eigen::EigendecompositionConfig`]): a direct two-sided Jacobi solver,
//! an orthogonal-iteration (QR) solver with warm start, and a
//! power-iteration-with-deflation solver.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rootr::prelude::*;
//!
//! let a = Tensor::from_slice(&[4.0, 0.0, 0.0, 9.0], &[2, 2]);
//! let x = matrix_inverse_root(
//!     &a,
//!     Fraction::from(2),
//!     &RootInvConfig::default(),
//!     0.0,
//!     false,
//! )?;
//! // x ~= diag(1/2, 1/3)
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Multi-threaded matrix multiplication
//! - `f16`: Half-precision (F16) tensor elements

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod eigen;
pub mod error;
pub mod fraction;
pub mod helpers;
pub mod kernels;
pub mod precision;
pub mod residuals;
pub mod root;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::DType;
    pub use crate::eigen::{
        matrix_eigendecomposition, EigenDecomposition, EigendecompositionConfig,
    };
    pub use crate::error::{Error, Result};
    pub use crate::fraction::Fraction;
    pub use crate::helpers::check_diagonal;
    pub use crate::residuals::compute_matrix_root_inverse_residuals;
    pub use crate::root::{matrix_inverse_root, NewtonConvergenceFlag, RootInvConfig};
    pub use crate::tensor::Tensor;
}
