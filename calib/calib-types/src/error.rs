//! Error types for payload decoding.

use thiserror::Error;

/// Errors that can occur while decoding stored payloads.
///
/// A decode error means the store handed over data whose declared shape
/// disagrees with its contents. It is never retried or skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Flat array length does not match the declared shape.
    #[error("shape mismatch: {rows} rows x {cols} cols needs {expected} values, got {actual}")]
    ShapeMismatch {
        /// Declared row count.
        rows: usize,
        /// Column count of the target layout.
        cols: usize,
        /// Number of values the shape requires.
        expected: usize,
        /// Number of values actually stored.
        actual: usize,
    },

    /// Matrix has the wrong number of columns for its role.
    #[error("column mismatch: expected {expected} columns, got {actual}")]
    ColumnMismatch {
        /// Required column count.
        expected: usize,
        /// Actual column count.
        actual: usize,
    },

    /// Extracted target arrays disagree on the number of observations.
    #[error("inconsistent target: {pixels} pixels, {points} points, {indices} indices")]
    InconsistentTarget {
        /// Pixel row count.
        pixels: usize,
        /// Point row count.
        points: usize,
        /// Index row count.
        indices: usize,
    },
}

impl DecodeError {
    /// Creates a shape mismatch error.
    ///
    /// `expected` saturates when `rows * cols` overflows.
    #[must_use]
    pub const fn shape_mismatch(rows: usize, cols: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            rows,
            cols,
            expected: rows.saturating_mul(cols),
            actual,
        }
    }

    /// Creates a column mismatch error.
    #[must_use]
    pub const fn column_mismatch(expected: usize, actual: usize) -> Self {
        Self::ColumnMismatch { expected, actual }
    }
}

/// Result type for decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
