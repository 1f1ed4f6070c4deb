//! Numeric precision guards
//!
//! Cross-cutting policy shared by the eigendecomposition and root-inverse
//! engines: the process-wide fast-math toggle, the working-dtype promotion
//! rules, and the retry-in-double-precision helper.

use crate::dtype::DType;
use crate::error::Result;
use crate::tensor::Tensor;
use std::sync::atomic::{AtomicBool, Ordering};

static FAST_MATH: AtomicBool = AtomicBool::new(true);

/// Whether kernels may use the fast-math execution path.
///
/// When enabled, the matrix multiplication kernel is free to reassociate
/// accumulation (parallel row blocks). When disabled, accumulation runs in a
/// fixed serial order. Defaults to enabled.
pub fn fast_math_enabled() -> bool {
    FAST_MATH.load(Ordering::SeqCst)
}

/// Set the fast-math flag, returning the prior value.
///
/// Prefer [`FastMathGuard`] over calling this directly: the guard restores
/// the prior value on every exit path.
pub fn set_fast_math(enabled: bool) -> bool {
    FAST_MATH.swap(enabled, Ordering::SeqCst)
}

/// Scoped suspension of the fast-math flag.
///
/// The prior flag value is restored on drop, so the flag cannot leak across
/// an early `?` return or a panic.
#[must_use = "the guard restores the flag when dropped"]
pub struct FastMathGuard {
    prior: bool,
}

impl FastMathGuard {
    /// Disable fast math for the lifetime of the guard
    pub fn disable() -> Self {
        Self {
            prior: set_fast_math(false),
        }
    }
}

impl Drop for FastMathGuard {
    fn drop(&mut self) {
        FAST_MATH.store(self.prior, Ordering::SeqCst);
    }
}

/// Returns the dtype linear algebra actually computes in for a given input
/// dtype. F32/F64 are used directly; reduced-precision types are promoted
/// to F32.
pub fn working_dtype(dtype: DType) -> DType {
    match dtype {
        DType::F64 | DType::F32 => dtype,
        #[cfg(feature = "f16")]
        DType::F16 => DType::F32,
    }
}

/// Run `op` on `a`; on failure, optionally retry once in double precision.
///
/// The retry only happens when `retry` is set and `a` is not already F64.
/// If the retry also fails, the original error is returned unchanged - the
/// failure is surfaced, never wrapped or swallowed.
pub fn retry_in_double_precision<T>(
    a: &Tensor,
    retry: bool,
    op: impl Fn(&Tensor) -> Result<T>,
) -> Result<T> {
    match op(a) {
        Ok(value) => Ok(value),
        Err(original) => {
            if retry && a.dtype() != DType::F64 {
                log::warn!(
                    "Failed to compute eigendecomposition in {:?} precision with exception {original}! Retrying in double precision...",
                    a.dtype()
                );
                op(&a.cast(DType::F64)).map_err(|_| original)
            } else {
                Err(original)
            }
        }
    }
}
