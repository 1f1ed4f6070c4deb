//! Dense tensor value type
//!
//! A [`Tensor`] is an immutable dense array: a row-major byte buffer plus a
//! shape and a runtime [`DType`]. Tensors here are value objects - constructed
//! per call, never mutated, and carrying no cross-call state. 0-dimensional
//! (scalar) and 1-dimensional shapes are legal; the root and eigen operations
//! validate 2-D squareness at their own boundaries.

use crate::dtype::{DType, Element};

/// Immutable dense array with runtime dtype
#[derive(Clone, Debug)]
pub struct Tensor {
    data: Vec<u8>,
    shape: Vec<usize>,
    dtype: DType,
}

impl Tensor {
    /// Create a tensor from a typed slice.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of `shape`.
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize]) -> Self {
        let numel: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            numel,
            "data length {} does not match shape {:?}",
            data.len(),
            shape
        );
        Self {
            data: bytemuck::cast_slice(data).to_vec(),
            shape: shape.to_vec(),
            dtype: T::DTYPE,
        }
    }

    /// Create a 0-dimensional scalar tensor
    pub fn scalar<T: Element>(value: T) -> Self {
        Self::from_slice(&[value], &[])
    }

    /// Create a tensor of zeros with the given shape and dtype
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        let numel: usize = shape.iter().product();
        Self {
            data: vec![0u8; numel * dtype.size_in_bytes()],
            shape: shape.to_vec(),
            dtype,
        }
    }

    /// Create an `n x n` identity matrix with the given dtype
    pub fn eye(n: usize, dtype: DType) -> Self {
        let mut data = vec![0.0f64; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self::from_f64_slice(&data, &[n, n], dtype)
    }

    /// Create a tensor from f64 data, demoting to the requested dtype
    pub fn from_f64_slice(data: &[f64], shape: &[usize], dtype: DType) -> Self {
        match dtype {
            DType::F64 => Self::from_slice(data, shape),
            DType::F32 => {
                let demoted: Vec<f32> = data.iter().map(|&v| v as f32).collect();
                Self::from_slice(&demoted, shape)
            }
            #[cfg(feature = "f16")]
            DType::F16 => {
                let demoted: Vec<half::f16> =
                    data.iter().map(|&v| half::f16::from_f64(v)).collect();
                Self::from_slice(&demoted, shape)
            }
        }
    }

    /// Shape of the tensor
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Element dtype
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Copy the elements out as a typed vector.
    ///
    /// # Panics
    ///
    /// Panics if `T` does not match the tensor's dtype.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        assert_eq!(
            T::DTYPE,
            self.dtype,
            "requested element type {:?} does not match tensor dtype {:?}",
            T::DTYPE,
            self.dtype
        );
        bytemuck::pod_collect_to_vec(&self.data)
    }

    /// Copy the elements out as f64, promoting if necessary
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self.dtype {
            DType::F64 => self.to_vec::<f64>(),
            DType::F32 => self
                .to_vec::<f32>()
                .into_iter()
                .map(|v| v as f64)
                .collect(),
            #[cfg(feature = "f16")]
            DType::F16 => self
                .to_vec::<half::f16>()
                .into_iter()
                .map(half::f16::to_f64)
                .collect(),
        }
    }

    /// Cast to a different dtype, preserving shape.
    ///
    /// Returns a clone if the dtype already matches.
    pub fn cast(&self, dtype: DType) -> Tensor {
        if dtype == self.dtype {
            return self.clone();
        }
        Tensor::from_f64_slice(&self.to_f64_vec(), &self.shape, dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_round_trip() {
        let t = Tensor::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2]);
        assert_eq!(t.shape(), &[2, 2]);
        assert_eq!(t.ndim(), 2);
        assert_eq!(t.numel(), 4);
        assert_eq!(t.dtype(), DType::F64);
        assert_eq!(t.to_vec::<f64>(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_scalar() {
        let t = Tensor::scalar(2.5f32);
        assert_eq!(t.ndim(), 0);
        assert_eq!(t.numel(), 1);
        assert_eq!(t.to_vec::<f32>(), vec![2.5]);
    }

    #[test]
    fn test_eye() {
        let t = Tensor::eye(2, DType::F32);
        assert_eq!(t.to_vec::<f32>(), vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_cast_promotes_and_demotes() {
        let t = Tensor::from_slice(&[1.5f32, -2.0], &[2]);
        let promoted = t.cast(DType::F64);
        assert_eq!(promoted.dtype(), DType::F64);
        assert_eq!(promoted.to_vec::<f64>(), vec![1.5, -2.0]);
        let back = promoted.cast(DType::F32);
        assert_eq!(back.to_vec::<f32>(), vec![1.5, -2.0]);
    }

    #[test]
    #[should_panic]
    fn test_from_slice_shape_mismatch_panics() {
        let _ = Tensor::from_slice(&[1.0f64, 2.0], &[3]);
    }
}
