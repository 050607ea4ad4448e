//! # Scene Construction Errors
//!
//! Error type for node constructors that validate their parameters.

use thiserror::Error;

/// Errors raised when building scene nodes from inconsistent parameters.
#[derive(Debug, Clone, Error)]
pub enum SceneError {
    /// Invalid curve definition.
    #[error("Invalid curve: {0}")]
    InvalidCurve(String),

    /// Invalid patch definition.
    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    /// Invalid profile or grid definition.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SceneError::InvalidCurve("too few points".to_string());
        assert!(err.to_string().contains("Invalid curve"));
    }
}
