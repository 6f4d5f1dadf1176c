//! Error types for mesh construction and engine configuration.
//!
//! The relaxation steps themselves never fail; degenerate geometry degrades
//! silently. Errors only surface when a caller builds or edits a mesh with
//! inconsistent dimensions or indices, or hands the engine a bad config.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors raised while building meshes or configuring the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A grid was requested with a zero dimension.
    #[error("vertex grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid {
        /// Requested number of columns.
        width: usize,
        /// Requested number of rows.
        height: usize,
    },

    /// The number of supplied vertices does not match `width * height`.
    #[error("expected {expected} vertices, got {actual}")]
    CellCountMismatch {
        /// `width * height`.
        expected: usize,
        /// Number of vertices actually supplied.
        actual: usize,
    },

    /// A cell, column, or row index lies outside the grid.
    #[error("cell ({col}, {row}) is outside a {width}x{height} grid")]
    IndexOutOfRange {
        /// Column index.
        col: usize,
        /// Row index.
        row: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
