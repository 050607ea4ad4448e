//! # Sylva Scene
//!
//! Parametric scene-graph node types and the explicit-model container.
//!
//! ## Architecture
//!
//! ```text
//! sylva-scene (SceneNode, ExplicitModel) → sylva-mesh (Discretizer)
//! ```
//!
//! A scene graph describes shapes procedurally (spheres, cones, sweeps,
//! Bézier and NURBS curves/patches, revolutions) or compositionally
//! (grouped, transformed, instanced). `sylva-mesh` turns any node into an
//! [`ExplicitModel`]: points plus face indices.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use glam::DVec3;
//! use sylva_scene::SceneNode;
//!
//! let scene = SceneNode::group(vec![
//!     Arc::new(SceneNode::sphere(1.0)),
//!     Arc::new(SceneNode::translated(
//!         DVec3::new(10.0, 0.0, 0.0),
//!         Arc::new(SceneNode::sphere(1.0)),
//!     )),
//! ]);
//! assert!(!scene.is_named());
//! ```

mod basis;
pub mod curve;
pub mod error;
pub mod model;
pub mod node;
pub mod patch;
pub mod profile;

pub use curve::{BezierCurve2, BezierCurve3, NurbsCurve2, NurbsCurve3};
pub use curve::{ParametricCurve2, ParametricCurve3};
pub use error::SceneError;
pub use model::{ExplicitModel, Topology};
pub use node::{NodeId, NodeKind, SceneNode};
pub use patch::{BezierPatch, ElevationGrid, HeightGrid, NurbsPatch, ParametricPatch};
pub use profile::{
    ProfileInterpolation, ProfileSet2, ProfileSet3, ProfileTransformation, ScalingProfile,
};
