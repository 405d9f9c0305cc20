//! Error types for crust computation and export.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for crust operations.
pub type CrustResult<T> = std::result::Result<T, CrustError>;

/// Errors that can occur while computing or exporting a crust.
#[derive(Debug, Error)]
pub enum CrustError {
    /// A submitted point lies outside the bounding box.
    #[error("point {id} at ({x}, {y}, {z}) is outside the bounding box")]
    OutOfBounds {
        /// Caller ID of the point.
        id: usize,
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
        /// Z coordinate.
        z: f64,
    },

    /// Mesh export requested before the tessellation was computed.
    #[error("there are no faces to write, compute the tessellation first")]
    NotComputed,

    /// The tessellation was already computed on this instance.
    #[error("tessellation already computed")]
    AlreadyComputed,

    /// The engine could not build a cell for this point.
    #[error("cell {id} collapsed during construction")]
    EmptyCell {
        /// Caller ID of the point.
        id: usize,
    },

    /// IO error during export to a file.
    #[error("failed to write to {path}: {source}")]
    IoWrite {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// IO error from a caller-supplied writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
