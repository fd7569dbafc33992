//! Error types for proxima.
//!
//! Geometric edge cases (degenerate triangles, empty meshes) are never
//! errors; they are resolved inside the query engines. The variants here
//! cover malformed input at the API boundary and file handling in [`crate::io`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ProximityError`].
pub type Result<T> = std::result::Result<T, ProximityError>;

/// Errors that can occur while building meshes or running queries.
#[derive(Error, Debug)]
pub enum ProximityError {
    /// A flat array does not split evenly into rows of the expected width.
    #[error("{name} has {len} values, which is not a multiple of {width}")]
    InvalidShape {
        /// Name of the offending input.
        name: &'static str,
        /// Number of scalar values supplied.
        len: usize,
        /// Expected row width.
        width: usize,
    },

    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The triangle index.
        triangle: usize,
        /// The out-of-range vertex index.
        vertex: usize,
    },

    /// A mesh has more elements than the `u32` ids can address.
    #[error("{name} count {len} exceeds the maximum of {max}")]
    TooManyElements {
        /// Which elements overflowed.
        name: &'static str,
        /// Number of elements supplied.
        len: usize,
        /// Largest supported count.
        max: usize,
    },

    /// Supplied triangle normals do not match the triangle count.
    #[error("expected {triangles} triangle normals, got {normals}")]
    NormalCountMismatch {
        /// Number of triangles in the mesh.
        triangles: usize,
        /// Number of normals supplied.
        normals: usize,
    },

    /// A proximity index was queried against a mesh it was not built for.
    #[error("proximity index was built for mesh generation {built}, mesh is at generation {current}")]
    StaleIndex {
        /// Generation recorded when the index was built.
        built: u64,
        /// Current generation of the queried mesh.
        current: u64,
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

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a mesh or point file.
    #[error("failed to load {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// A line of a text point file could not be parsed.
    #[error("line {line}: {message}")]
    ParseError {
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// Error saving a mesh.
    #[error("failed to save {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

impl ProximityError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        ProximityError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
