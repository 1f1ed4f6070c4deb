//! Error types for rootr

use crate::dtype::DType;
use crate::fraction::Fraction;
use thiserror::Error;

/// Result type alias using rootr's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rootr operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input has more or fewer than two dimensions
    #[error("Matrix is not 2-dimensional! Got {ndim}-dimensional tensor with shape {shape:?}")]
    NotTwoDimensional {
        /// Number of dimensions observed
        ndim: usize,
        /// Observed shape
        shape: Vec<usize>,
    },

    /// Input is 2-dimensional but not square
    #[error("Matrix is not square! Got shape {shape:?}")]
    NotSquare {
        /// Observed shape
        shape: Vec<usize>,
    },

    /// Two operands have different shapes
    #[error("Matrix shapes do not match! {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        /// Left-hand side shape
        lhs: Vec<usize>,
        /// Right-hand side shape
        rhs: Vec<usize>,
    },

    /// Root exponent is zero or negative
    #[error("Root {root} should be positive!")]
    NonPositiveRoot {
        /// The offending root
        root: Fraction,
    },

    /// Coupled Newton iteration requires an integer root
    #[error(
        "root.denominator={denominator} must be equal to 1 to use coupled inverse Newton iteration!"
    )]
    NewtonFractionalRoot {
        /// Denominator of the offending root
        denominator: i64,
    },

    /// Input matrix contains entries at or near the dtype's representable limit
    #[error("Input matrix has entries close to inf, raising an exception!")]
    EntriesCloseToInf,

    /// Residual after the coupled iteration is too large to safely power
    #[error(
        "Error in matrix inverse root (before powering for fractions) {error} exceeds threshold {threshold}, raising an exception!"
    )]
    PrePoweringError {
        /// Residual error at termination of the iteration
        error: f64,
        /// Configured error tolerance
        threshold: f64,
    },

    /// Result matrix contains NaN or Inf entries
    #[error("NaN/Inf in matrix inverse root ({stage}), raising an exception!")]
    NonFiniteRoot {
        /// Stage of the computation that produced the instability
        stage: &'static str,
    },

    /// Direct eigensolver failed
    #[error("Failed to compute eigendecomposition: {reason}")]
    SolverFailure {
        /// Description of the failure
        reason: String,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// Configuration variant without an implementation
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// Description of the unimplemented configuration
        feature: String,
    },
}

impl Error {
    /// Create a not-2-dimensional error from an observed shape
    pub fn not_two_dimensional(shape: &[usize]) -> Self {
        Self::NotTwoDimensional {
            ndim: shape.len(),
            shape: shape.to_vec(),
        }
    }

    /// Create a not-square error from an observed shape
    pub fn not_square(shape: &[usize]) -> Self {
        Self::NotSquare {
            shape: shape.to_vec(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(lhs: &[usize], rhs: &[usize]) -> Self {
        Self::ShapeMismatch {
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }

    /// Create a solver failure error
    pub fn solver_failure(reason: impl Into<String>) -> Self {
        Self::SolverFailure {
            reason: reason.into(),
        }
    }
}
