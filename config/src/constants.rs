//! # Configuration Constants
//!
//! Centralized constants for the scene-graph discretization pipeline. All
//! tessellation defaults and precision values are defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Resolution**: Default tessellation parameters (slices, stacks, stride)
//! - **Limits**: Safety bounds on subdivision counts

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// Used for determining if two floating-point values are "equal" within
/// numerical tolerance, e.g. when testing whether a cross-section curve is
/// closed or whether a frame vector has collapsed to zero.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Tolerance for arc-length and segment computations.
///
/// Larger than [`EPSILON`]: profile chains are walked by accumulated segment
/// length, and segments shorter than this are skipped as numerically empty.
pub const GEOM_TOLERANCE: f64 = 1e-6;

// =============================================================================
// RESOLUTION CONSTANTS
// =============================================================================

/// Default number of slices (longitudinal subdivisions) for round solids.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_SLICES;
///
/// let user_slices: Option<u32> = None;
/// assert_eq!(user_slices.unwrap_or(DEFAULT_SLICES), 8);
/// ```
pub const DEFAULT_SLICES: u32 = 8;

/// Default number of stacks (latitudinal subdivisions) along a solid's axis.
pub const DEFAULT_STACKS: u32 = 8;

/// Default number of parametric samples for curves and patches.
///
/// A curve sampled with stride `N` produces `N + 1` polyline points.
pub const DEFAULT_STRIDE: u32 = 30;

/// Minimum number of slices for any round shape.
///
/// Three slices is the smallest subdivision that still encloses the axis.
pub const MIN_SLICES: u32 = 3;

/// Maximum number of slices for any round shape.
///
/// Safety limit to keep a single primitive from exhausting memory.
pub const MAX_SLICES: u32 = 1024;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Checks if two f64 values are approximately equal within [`EPSILON`].
///
/// # Example
///
/// ```rust
/// use config::constants::approx_equal;
///
/// assert!(approx_equal(1.0, 1.0 + 1e-11));
/// assert!(!approx_equal(1.0, 1.1));
/// ```
#[inline]
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Checks if a f64 value is approximately zero within [`EPSILON`].
///
/// # Example
///
/// ```rust
/// use config::constants::approx_zero;
///
/// assert!(approx_zero(1e-11));
/// assert!(!approx_zero(0.1));
/// ```
#[inline]
pub fn approx_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_ordering() {
        assert!(EPSILON < GEOM_TOLERANCE);
        assert!(GEOM_TOLERANCE < 1e-3);
    }

    #[test]
    fn test_slice_bounds() {
        assert!(MIN_SLICES <= DEFAULT_SLICES);
        assert!(DEFAULT_SLICES <= MAX_SLICES);
    }

    #[test]
    fn test_approx_equal() {
        assert!(approx_equal(2.0, 2.0));
        assert!(!approx_equal(2.0, 2.0 + 1e-9));
    }

    #[test]
    fn test_approx_zero() {
        assert!(approx_zero(0.0));
        assert!(!approx_zero(EPSILON * 2.0));
    }
}
