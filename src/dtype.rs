//! Data type system for rootr tensors
//!
//! A runtime [`DType`] enum plus the [`Element`] trait connecting Rust scalar
//! types to it. Reduced-precision elements are stored as-is and promoted to a
//! working dtype before any linear algebra runs (see [`crate::precision`]).

use bytemuck::{Pod, Zeroable};
use std::ops::{Add, Div, Mul, Sub};

/// Data types supported by rootr tensors
///
/// Using an enum (rather than generics) at the public boundary allows runtime
/// type selection and a uniform precision-retry policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DType {
    /// 64-bit floating point
    F64,
    /// 32-bit floating point (most common)
    F32,
    /// 16-bit floating point (IEEE 754)
    #[cfg(feature = "f16")]
    F16,
}

impl DType {
    /// Size of one element in bytes
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::F64 => 8,
            DType::F32 => 4,
            #[cfg(feature = "f16")]
            DType::F16 => 2,
        }
    }
}

/// Trait for types that can be elements of a tensor
///
/// Connects Rust's type system to rootr's runtime dtype system.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - basic requirements
/// - `Pod + Zeroable` - safe memory transmutation (bytemuck)
/// - `Add + Sub + Mul + Div` - arithmetic (Output = Self)
/// - `PartialOrd` - comparison
pub trait Element:
    Copy
    + Send
    + Sync
    + Pod
    + Zeroable
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + PartialOrd
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for generic numeric operations
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    fn from_f64(v: f64) -> Self;

    /// Zero value
    fn zero() -> Self;

    /// One value
    fn one() -> Self;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }
}

#[cfg(feature = "f16")]
impl Element for half::f16 {
    const DTYPE: DType = DType::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        half::f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }

    #[inline]
    fn zero() -> Self {
        half::f16::ZERO
    }

    #[inline]
    fn one() -> Self {
        half::f16::ONE
    }
}

/// Trait for elements that support linear algebra operations.
///
/// Extends [`Element`] with the numeric helpers the solvers and coupled
/// iterations need. Only implemented for the working dtypes (f32, f64);
/// reduced-precision elements are promoted before any algorithm runs.
pub trait LinalgElement: Element {
    /// Returns machine epsilon for this type
    fn epsilon_val() -> f64;
    /// Returns the largest finite value for this type, as f64
    fn max_finite() -> f64;
    /// Returns absolute value
    fn abs_val(&self) -> Self;
    /// Returns square root
    fn sqrt_val(&self) -> Self;
    /// Returns negation
    fn neg_val(&self) -> Self;
    /// Returns true if the value is neither NaN nor infinite
    fn is_finite_val(&self) -> bool;
}

impl LinalgElement for f32 {
    #[inline]
    fn epsilon_val() -> f64 {
        f32::EPSILON as f64
    }
    #[inline]
    fn max_finite() -> f64 {
        f32::MAX as f64
    }
    #[inline]
    fn abs_val(&self) -> Self {
        self.abs()
    }
    #[inline]
    fn sqrt_val(&self) -> Self {
        self.sqrt()
    }
    #[inline]
    fn neg_val(&self) -> Self {
        -*self
    }
    #[inline]
    fn is_finite_val(&self) -> bool {
        self.is_finite()
    }
}

impl LinalgElement for f64 {
    #[inline]
    fn epsilon_val() -> f64 {
        f64::EPSILON
    }
    #[inline]
    fn max_finite() -> f64 {
        f64::MAX
    }
    #[inline]
    fn abs_val(&self) -> Self {
        self.abs()
    }
    #[inline]
    fn sqrt_val(&self) -> Self {
        self.sqrt()
    }
    #[inline]
    fn neg_val(&self) -> Self {
        -*self
    }
    #[inline]
    fn is_finite_val(&self) -> bool {
        self.is_finite()
    }
}
