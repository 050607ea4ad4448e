//! # Discretization Errors
//!
//! Error types for mesh generation. The public dispatcher surface reports
//! failure as a boolean with an empty result; these errors travel on the
//! internal kernel paths and end up in the log.

use thiserror::Error;

/// Errors that can occur while discretizing a scene node.
#[derive(Debug, Clone, Error)]
pub enum MeshError {
    /// The node kind produces no geometry (appearance, text, font).
    #[error("Unsupported node: {0}")]
    UnsupportedNode(String),

    /// A child of a composite node discretized to nothing.
    #[error("Empty child result: {0}")]
    EmptyChild(String),

    /// A profile curve could not be discretized.
    #[error("Empty profile: {0}")]
    EmptyProfile(String),

    /// Geometry parameters defeat the kernel (zero radius, one-point
    /// cross-section, zero-length sweep frame).
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Two models could not be merged into one.
    #[error("Merge failed: {0}")]
    MergeMismatch(String),
}

// =============================================================================
// TESTS
// =============================================================================
