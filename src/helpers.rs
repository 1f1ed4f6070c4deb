//! Validation helpers and the diagonal checker

use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Validate matrix is 2D, returning (rows, cols)
pub fn validate_matrix_2d(shape: &[usize]) -> Result<(usize, usize)> {
    if shape.len() != 2 {
        return Err(Error::not_two_dimensional(shape));
    }
    Ok((shape[0], shape[1]))
}

/// Validate matrix is 2D and square, returning the dimension
pub fn validate_square_matrix(shape: &[usize]) -> Result<usize> {
    let (m, n) = validate_matrix_2d(shape)?;
    if m != n {
        return Err(Error::not_square(shape));
    }
    Ok(n)
}

/// Check whether a matrix is exactly diagonal.
///
/// Returns true iff the matrix is 2-dimensional, square, and every
/// off-diagonal entry is exactly zero. Non-2D or non-square input fails with
/// the corresponding shape error.
pub fn check_diagonal(a: &Tensor) -> Result<bool> {
    let n = validate_square_matrix(a.shape())?;
    let data = a.to_f64_vec();
    for i in 0..n {
        for j in 0..n {
            if i != j && data[i * n + j] != 0.0 {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
