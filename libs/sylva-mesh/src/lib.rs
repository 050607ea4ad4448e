//! # Sylva Mesh
//!
//! Tessellation of parametric scene graphs into explicit polygonal models.
//!
//! ## Architecture
//!
//! ```text
//! sylva-scene (SceneNode) → sylva-mesh (Discretizer) → ExplicitModel
//! ```
//!
//! The [`Discretizer`] dispatches on the concrete node kind, runs the
//! matching tessellation kernel, memoizes results for named nodes, and
//! merges children across groups, transforms and iterated function
//! systems. Kernels live in [`kernels`] and are usable on their own.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use glam::DVec3;
//! use sylva_mesh::Discretizer;
//! use sylva_scene::SceneNode;
//!
//! let scene = Arc::new(SceneNode::group(vec![
//!     Arc::new(SceneNode::sphere(1.0)),
//!     Arc::new(SceneNode::translated(
//!         DVec3::new(10.0, 0.0, 0.0),
//!         Arc::new(SceneNode::sphere(1.0)),
//!     )),
//! ]));
//!
//! let mut discretizer = Discretizer::new();
//! assert!(discretizer.process(&scene));
//! let mesh = discretizer.discretization().unwrap();
//! assert!(mesh.validate());
//! ```

pub mod cache;
pub mod discretizer;
pub mod error;
pub mod kernels;
pub mod merge;
pub mod texcoord;

pub use cache::{CacheStats, ModelCache};
pub use discretizer::Discretizer;
pub use error::MeshError;
pub use merge::Composer;
