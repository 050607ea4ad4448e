//! # Tessellation Kernels
//!
//! One routine per primitive family. Kernels are pure: they take the node's
//! parameters (and, for sweeps, the already-discretized profiles) and
//! return a fresh explicit model. The dispatcher in
//! [`crate::discretizer`] owns recursion, caching and composition.
//!
//! ## Module Structure
//!
//! - `solids` - sphere, cone, cylinder, frustum, paraboloid, box, disc
//! - `hulls` - asymmetric hull, extruded hull
//! - `curves` - curve sampling, patches, elevation grids, 2D lifting
//! - `sweeps` - revolution, swung, extrusion

pub mod curves;
pub mod hulls;
pub mod solids;
pub mod sweeps;
