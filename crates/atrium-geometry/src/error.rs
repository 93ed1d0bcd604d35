//! Error types for atrium-geometry.

use thiserror::Error;

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;

/// Errors raised when input geometry cannot produce a valid result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Two points that must span a segment coincide.
    #[error("degenerate segment: endpoints {0:?} and {1:?} coincide")]
    DegenerateSegment(glam::Vec3, glam::Vec3),
}
