//! Error types shared by every layer of the compositor.
//!
//! Construction and bounds failures are always returned synchronously.
//! Sink failures abort the current rasterization pass only; the retained
//! frame and the statistics stay consistent.

use std::collections::TryReserveError;
use std::io;

/// Why a plane or pile could not be built.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    /// Rows or columns were zero.
    #[error("invalid dimensions {rows}x{cols}: both must be at least 1")]
    InvalidDimensions {
        /// Requested row count.
        rows: u32,
        /// Requested column count.
        cols: u32,
    },
    /// The cell grid could not be reserved.
    #[error("cell grid allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

/// The crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Plane or pile construction failed.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// The handle refers to a destroyed plane or pile.
    #[error("stale or destroyed handle")]
    InvalidHandle,

    /// A coordinate fell outside the plane.
    #[error("coordinate ({y}, {x}) outside {rows}x{cols} plane")]
    OutOfBounds {
        /// Requested row.
        y: i64,
        /// Requested column.
        x: i64,
        /// Plane rows.
        rows: u32,
        /// Plane columns.
        cols: u32,
    },

    /// A color component, alpha value or grapheme was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The output sink failed during rasterization.
    #[error("output sink failed: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn out_of_bounds(y: impl Into<i64>, x: impl Into<i64>, rows: u32, cols: u32) -> Self {
        Self::OutOfBounds {
            y: y.into(),
            x: x.into(),
            rows,
            cols,
        }
    }

    pub(crate) const fn invalid_dims(rows: u32, cols: u32) -> Self {
        Self::Construction(ConstructionError::InvalidDimensions { rows, cols })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
