//! Shared configuration crate holding constants used across the workspace.
//!
//! The `constants` module exposes tolerances and default tessellation
//! parameters so downstream crates avoid sprinkling magic numbers. Example:
//!
//! ```
//! use config::constants::{DEFAULT_SLICES, EPSILON};
//!
//! assert!(EPSILON < 1.0e-6);
//! assert!(DEFAULT_SLICES >= 4);
//! ```

pub mod constants;

pub use constants::{
    approx_equal, approx_zero, DEFAULT_SLICES, DEFAULT_STACKS, DEFAULT_STRIDE, EPSILON,
    GEOM_TOLERANCE, MAX_SLICES, MIN_SLICES,
};
