//! Mesh and point file I/O.
//!
//! | Format | Extension | Load | Save |
//! |--------|-----------|------|------|
//! | STL | `.stl` | ✓ | ✓ |
//!
//! Query points are read from plain text, one point per line.
//!
//! ```no_run
//! use proxima::io::{load_mesh, load_points};
//!
//! let mesh = load_mesh("model.stl").unwrap();
//! let points = load_points("queries.txt").unwrap();
//! ```

pub mod stl;

use std::fs;
use std::path::Path;

use nalgebra::Point3;

use crate::error::{ProximityError, Result};
use crate::mesh::TriangleMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// STL (stereolithography) format.
    Stl,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "stl" => Some(Format::Stl),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| ProximityError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh with format detection by extension.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Stl => stl::load(path),
    }
}

/// Save a mesh with format detection by extension.
pub fn save_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Stl => stl::save(mesh, path),
    }
}

/// Load query points from a text file.
///
/// Each non-empty line holds three coordinates separated by whitespace
/// and/or commas. Lines starting with `#` are skipped.
///
/// # Errors
/// I/O failures are returned as [`ProximityError::Io`]; malformed lines as
/// [`ProximityError::LoadError`] naming the file and the line.
pub fn load_points<P: AsRef<Path>>(path: P) -> Result<Vec<Point3<f64>>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse_points(&text).map_err(|e| ProximityError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse points from text in the [`load_points`] format.
///
/// # Errors
/// Returns [`ProximityError::ParseError`] for the first malformed line.
pub fn parse_points(text: &str) -> Result<Vec<Point3<f64>>> {
    let mut points = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parse_error = |message: String| ProximityError::ParseError {
            line: lineno + 1,
            message,
        };
        let row: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        if row.len() != 3 {
            return Err(parse_error(format!("expected 3 values, got {}", row.len())));
        }
        let mut xyz = [0.0; 3];
        for (slot, s) in xyz.iter_mut().zip(&row) {
            *slot = s
                .parse()
                .map_err(|_| parse_error(format!("invalid number '{}'", s)))?;
        }
        points.push(Point3::from(xyz));
    }
    Ok(points)
}
