//! Extracted calibration target observations.

use nalgebra::DMatrix;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};
use crate::matrix::MatrixPayload;

/// Columns of the pixel array (`u`, `v`).
pub const PIXEL_COLS: usize = 2;
/// Columns of the target point array (`x`, `y`, `z`).
pub const POINT_COLS: usize = 3;
/// Columns of the feature index array (row, column on the target grid).
pub const INDEX_COLS: usize = 2;

/// Features of a calibration target detected in one image.
///
/// Row `i` of each array describes the same feature: where it was seen in
/// the image, where it sits on the target, and its grid index.
///
/// The three arrays always have the same number of rows.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtractedTarget {
    pixels: DMatrix<f64>,
    points: DMatrix<f64>,
    indices: DMatrix<i32>,
}

impl ExtractedTarget {
    /// Creates a target from already decoded arrays.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::ColumnMismatch`] if an array has the wrong width
    /// - [`DecodeError::InconsistentTarget`] if row counts differ
    pub fn new(pixels: DMatrix<f64>, points: DMatrix<f64>, indices: DMatrix<i32>) -> Result<Self> {
        for (expected, actual) in [
            (PIXEL_COLS, pixels.ncols()),
            (POINT_COLS, points.ncols()),
            (INDEX_COLS, indices.ncols()),
        ] {
            if expected != actual {
                return Err(DecodeError::column_mismatch(expected, actual));
            }
        }

        if pixels.nrows() != points.nrows() || points.nrows() != indices.nrows() {
            return Err(DecodeError::InconsistentTarget {
                pixels: pixels.nrows(),
                points: points.nrows(),
                indices: indices.nrows(),
            });
        }

        Ok(Self {
            pixels,
            points,
            indices,
        })
    }

    /// Number of detected features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.nrows()
    }

    /// Returns true if no features were detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Image coordinates, `N x 2`.
    #[must_use]
    pub const fn pixels(&self) -> &DMatrix<f64> {
        &self.pixels
    }

    /// Target-frame points, `N x 3`.
    #[must_use]
    pub const fn points(&self) -> &DMatrix<f64> {
        &self.points
    }

    /// Target grid indices, `N x 2`.
    #[must_use]
    pub const fn indices(&self) -> &DMatrix<i32> {
        &self.indices
    }
}

/// Stored form of an [`ExtractedTarget`]: three matrix payloads.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtractedTargetPayload {
    /// Pixel payload (2 columns).
    pub pixels: MatrixPayload<f64>,
    /// Point payload (3 columns).
    pub points: MatrixPayload<f64>,
    /// Index payload (2 columns).
    pub indices: MatrixPayload<i32>,
}

impl ExtractedTargetPayload {
    /// Decodes all three payloads and checks they describe the same features.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if any payload is malformed or the row
    /// counts disagree.
    ///
    /// # Example
    ///
    /// ```
    /// use calib_types::{ExtractedTargetPayload, MatrixPayload};
    ///
    /// let payload = ExtractedTargetPayload {
    ///     pixels: MatrixPayload::new(1, vec![320.0, 240.0]),
    ///     points: MatrixPayload::new(1, vec![0.0, 0.0, 0.0]),
    ///     indices: MatrixPayload::new(1, vec![0, 0]),
    /// };
    ///
    /// let target = payload.decode().unwrap();
    /// assert_eq!(target.len(), 1);
    /// ```
    pub fn decode(&self) -> Result<ExtractedTarget> {
        ExtractedTarget::new(
            self.pixels.decode(PIXEL_COLS)?,
            self.points.decode(POINT_COLS)?,
            self.indices.decode(INDEX_COLS)?,
        )
    }
}
