//! Column-major matrix payload decoding.
//!
//! Matrix-bearing tables store a row count plus a flat array laid out
//! column by column (column 0 for all rows, then column 1, ...). The column
//! count is implied by the role of the matrix (2 for pixels, 3 for points).

use nalgebra::{DMatrix, Scalar};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};

/// Decodes a column-major flat array into a `rows x cols` matrix.
///
/// Element `(i, j)` of the result is `flat[j * rows + i]`.
///
/// A zero row count or an empty array yields a well-formed zero-row matrix
/// with `cols` columns.
///
/// # Errors
///
/// Returns [`DecodeError::ShapeMismatch`] if `flat.len() != rows * cols`.
/// The payload is never truncated or wrapped to fit.
///
/// # Example
///
/// ```
/// use calib_types::decode_matrix;
///
/// // Three 3D points: x column, y column, z column
/// let flat = [0.0, 1.0, 2.0, 10.0, 11.0, 12.0, 20.0, 21.0, 22.0];
/// let points = decode_matrix(3, &flat, 3).unwrap();
///
/// assert_eq!(points.nrows(), 3);
/// assert_eq!(points[(2, 1)], 12.0);
///
/// let empty = decode_matrix::<f64>(0, &[], 3).unwrap();
/// assert_eq!(empty.shape(), (0, 3));
/// ```
pub fn decode_matrix<T: Scalar>(rows: usize, flat: &[T], cols: usize) -> Result<DMatrix<T>> {
    if rows == 0 || flat.is_empty() {
        return Ok(DMatrix::from_vec(0, cols, Vec::new()));
    }

    match rows.checked_mul(cols) {
        Some(expected) if expected == flat.len() => Ok(DMatrix::from_column_slice(rows, cols, flat)),
        _ => Err(DecodeError::shape_mismatch(rows, cols, flat.len())),
    }
}

/// Converts a matrix into nested row vectors.
///
/// This is the shape consumers use for plotting (`[[u, v], [u, v], ...]`).
#[must_use]
pub fn to_rows<T: Scalar>(matrix: &DMatrix<T>) -> Vec<Vec<T>> {
    matrix
        .row_iter()
        .map(|row| row.iter().cloned().collect())
        .collect()
}

/// A stored matrix: explicit row count plus column-major values.
///
/// This is the already-deserialized content of a matrix payload. The
/// serialization envelope around it is handled by the query layer.
///
/// # Example
///
/// ```
/// use calib_types::MatrixPayload;
///
/// let payload = MatrixPayload::new(2, vec![1.0, 2.0, 3.0, 4.0]);
/// let matrix = payload.decode(2).unwrap();
/// assert_eq!(matrix[(0, 1)], 3.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatrixPayload<T> {
    /// Declared row count.
    pub rows: usize,
    /// Values in column-major order.
    pub data: Vec<T>,
}

impl<T: Scalar> MatrixPayload<T> {
    /// Creates a payload from a row count and column-major values.
    #[must_use]
    pub const fn new(rows: usize, data: Vec<T>) -> Self {
        Self { rows, data }
    }

    /// Creates a payload holding the contents of `matrix`.
    ///
    /// nalgebra stores matrices column-major, so the storage slice is the
    /// payload layout as-is.
    #[must_use]
    pub fn from_matrix(matrix: &DMatrix<T>) -> Self {
        Self {
            rows: matrix.nrows(),
            data: matrix.as_slice().to_vec(),
        }
    }

    /// Decodes the payload into a matrix with `cols` columns.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ShapeMismatch`] if the value count disagrees
    /// with `rows * cols`.
    pub fn decode(&self, cols: usize) -> Result<DMatrix<T>> {
        decode_matrix(self.rows, &self.data, cols)
    }
}
