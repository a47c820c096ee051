//! Error types for biomap

use thiserror::Error;

/// Main error type for map generation
#[derive(Debug, Error)]
pub enum Error {
    /// Rectangle with `left > right` or `top > bottom` (or a NaN edge).
    #[error("invalid bounds: left={left} right={right} top={top} bottom={bottom}")]
    InvalidBounds {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
    },

    #[error("biome catalog is empty")]
    EmptyCatalog,

    /// Fewer than three points, or all points collinear.
    #[error("degenerate tessellation input ({points} points)")]
    DegenerateTessellation { points: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
