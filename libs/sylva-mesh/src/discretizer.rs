//! # Discretizer
//!
//! The dispatcher over the scene-graph node hierarchy: routes each node
//! kind to its tessellation kernel, memoizes results for named nodes,
//! composes results across transforms, groups and iterated function
//! systems, and optionally synthesizes texture coordinates.
//!
//! Traversal is depth-first, left to right, single-threaded; the cache is
//! populated in post-order and a result is stored only after its kernel
//! succeeded. Dispatch passes models by value and only [`Discretizer::process`]
//! writes the current-result slot, so recursive discretization of profiles
//! and children can never corrupt an in-flight parent result.

use std::sync::Arc;

use glam::DVec3;

use sylva_scene::{ExplicitModel, NodeKind, SceneNode};

use crate::cache::{CacheStats, ModelCache};
use crate::error::MeshError;
use crate::kernels::{curves, hulls, sweeps};
use crate::kernels::hulls::AsymmetricHullSpec;
use crate::kernels::solids;
use crate::merge::Composer;
use config::constants::EPSILON;

/// Turns scene nodes into explicit models.
///
/// A discretizer is created empty, accumulates cache entries across
/// traversals, and is cleared explicitly. It is not safe for concurrent
/// use; run independent instances over disjoint scene graphs instead.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use sylva_mesh::Discretizer;
/// use sylva_scene::SceneNode;
///
/// let sphere = Arc::new(SceneNode::sphere(1.0));
/// let mut discretizer = Discretizer::new();
/// assert!(discretizer.process(&sphere));
/// let model = discretizer.discretization().unwrap();
/// assert_eq!(model.point_count(), 8 * 7 + 2);
/// ```
#[derive(Debug, Default)]
pub struct Discretizer {
    cache: ModelCache,
    result: Option<Arc<ExplicitModel>>,
    compute_tex_coords: bool,
}

impl Discretizer {
    /// Creates an empty discretizer with UV synthesis off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables texture-coordinate synthesis.
    ///
    /// Cached entries computed without texcoords are rejected on lookup
    /// while this is on, forcing the kernel to re-run.
    pub fn set_compute_tex_coords(&mut self, on: bool) {
        self.compute_tex_coords = on;
    }

    /// Whether texture-coordinate synthesis is enabled.
    pub fn compute_tex_coords(&self) -> bool {
        self.compute_tex_coords
    }

    /// The result of the last [`Discretizer::process`] call, `None` when it
    /// failed.
    pub fn discretization(&self) -> Option<&Arc<ExplicitModel>> {
        self.result.as_ref()
    }

    /// Empties the cache and the current result.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.result = None;
    }

    /// Cache hit/miss counters.
    pub fn cache_stats(&self) -> &CacheStats {
        self.cache.stats()
    }

    /// Discretizes a node, setting the current result.
    ///
    /// Returns `true` iff a valid explicit model was produced. On failure
    /// the current result is emptied; unsupported nodes and empty children
    /// fail silently, kernel-level defects are logged.
    pub fn process(&mut self, node: &Arc<SceneNode>) -> bool {
        match self.dispatch(node) {
            Ok(model) => {
                self.result = Some(model);
                true
            }
            Err(err) => {
                match &err {
                    MeshError::UnsupportedNode(_) | MeshError::EmptyChild(_) => {}
                    other => log::warn!("discretization of {} failed: {other}", node.label()),
                }
                self.result = None;
                false
            }
        }
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    fn dispatch(&mut self, node: &Arc<SceneNode>) -> Result<Arc<ExplicitModel>, MeshError> {
        match node.kind() {
            // Appearance, text and fonts produce no geometry.
            kind if kind.is_appearance() => {
                Err(MeshError::UnsupportedNode(node.label()))
            }

            // Already-explicit geometry passes through by reference.
            NodeKind::Mesh(model) => Ok(Arc::clone(model)),
            NodeKind::Shape { geometry } => self.dispatch(geometry),

            // Ring-stack solids.
            NodeKind::Sphere {
                radius,
                slices,
                stacks,
            } => {
                if let Some(hit) = self.lookup(node, true) {
                    return Ok(hit);
                }
                let with_tex = self.compute_tex_coords;
                self.finish(node, solids::sphere(*radius, *slices, *stacks, with_tex)?)
            }
            NodeKind::Cone {
                radius,
                height,
                solid,
                slices,
            } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                self.finish(node, solids::cone(*radius, *height, *solid, *slices)?)
            }
            NodeKind::Cylinder {
                radius,
                height,
                solid,
                slices,
            } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                self.finish(node, solids::cylinder(*radius, *height, *solid, *slices)?)
            }
            NodeKind::Frustum {
                radius,
                height,
                taper,
                solid,
                slices,
            } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                self.finish(
                    node,
                    solids::frustum(*radius, *height, *taper, *solid, *slices)?,
                )
            }
            NodeKind::Paraboloid {
                radius,
                height,
                shape,
                solid,
                slices,
                stacks,
            } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                self.finish(
                    node,
                    solids::paraboloid(*radius, *height, *shape, *solid, *slices, *stacks)?,
                )
            }
            NodeKind::AsymmetricHull {
                pos_x_radius,
                neg_x_radius,
                pos_y_radius,
                neg_y_radius,
                pos_x_height,
                neg_x_height,
                pos_y_height,
                neg_y_height,
                bottom,
                top,
                bottom_shape,
                top_shape,
                slices,
                stacks,
            } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                let spec = AsymmetricHullSpec {
                    pos_x_radius: *pos_x_radius,
                    neg_x_radius: *neg_x_radius,
                    pos_y_radius: *pos_y_radius,
                    neg_y_radius: *neg_y_radius,
                    pos_x_height: *pos_x_height,
                    neg_x_height: *neg_x_height,
                    pos_y_height: *pos_y_height,
                    neg_y_height: *neg_y_height,
                    bottom: *bottom,
                    top: *top,
                    bottom_shape: *bottom_shape,
                    top_shape: *top_shape,
                    slices: *slices,
                    stacks: *stacks,
                };
                self.finish(node, hulls::asymmetric_hull(&spec)?)
            }
            NodeKind::Box { size } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                self.finish(node, solids::cuboid(*size)?)
            }
            NodeKind::Disc { radius, slices } => {
                if let Some(hit) = self.lookup(node, true) {
                    return Ok(hit);
                }
                let with_tex = self.compute_tex_coords;
                self.finish(node, solids::disc(*radius, *slices, with_tex)?)
            }

            // Curves, patches, grids.
            NodeKind::Curve2(curve) => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                self.finish(node, curves::curve2(curve.as_ref())?)
            }
            NodeKind::Curve3(curve) => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                self.finish(node, curves::curve3(curve.as_ref())?)
            }
            NodeKind::Polyline2 { points } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                self.finish(node, curves::polyline2(points)?)
            }
            NodeKind::PointSet2 { points } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                self.finish(node, curves::point_set2(points)?)
            }
            NodeKind::Patch(surface) => {
                if let Some(hit) = self.lookup(node, true) {
                    return Ok(hit);
                }
                let with_tex = self.compute_tex_coords;
                self.finish(node, curves::patch(surface.as_ref(), with_tex)?)
            }
            NodeKind::Elevation(grid) => {
                if let Some(hit) = self.lookup(node, true) {
                    return Ok(hit);
                }
                let with_tex = self.compute_tex_coords;
                self.finish(node, curves::elevation(grid.as_ref(), with_tex)?)
            }

            // Swept surfaces.
            NodeKind::Revolution {
                profile,
                slices,
                volume,
            } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                let profile_model = self.discretize_profile(profile)?;
                self.finish(
                    node,
                    sweeps::revolution(&profile_model.points, *slices, *volume)?,
                )
            }
            NodeKind::Swung {
                interpolation,
                slices,
                ccw,
            } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                self.finish(node, sweeps::swung(interpolation.as_ref(), *slices, *ccw)?)
            }
            NodeKind::Extrusion {
                axis,
                cross_section,
                profile,
                solid,
                ccw,
            } => {
                if let Some(hit) = self.lookup(node, true) {
                    return Ok(hit);
                }
                let section = self.discretize_profile(cross_section)?;
                let with_tex = self.compute_tex_coords;
                self.finish(
                    node,
                    sweeps::extrusion(
                        axis.as_ref(),
                        &section.points,
                        profile.as_deref(),
                        *solid,
                        *ccw,
                        with_tex,
                    )?,
                )
            }
            NodeKind::ExtrudedHull {
                horizontal,
                vertical,
                ccw,
            } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                let horizontal = self.discretize_profile(horizontal)?;
                let vertical = self.discretize_profile(vertical)?;
                self.finish(
                    node,
                    hulls::extruded_hull(&horizontal.points, &vertical.points, *ccw)?,
                )
            }

            // Composition.
            NodeKind::Transformed {
                transform,
                geometry,
            } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                let child = self.dispatch(geometry)?;
                self.finish(node, child.transform(transform))
            }
            NodeKind::Tapered {
                base_scale,
                top_scale,
                primitive,
            } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                let child = self.dispatch(primitive)?;
                self.finish(node, taper(&child, *base_scale, *top_scale))
            }
            NodeKind::Group { children } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                let mut iter = children.iter();
                let first = iter
                    .next()
                    .ok_or_else(|| MeshError::EmptyChild("group without children".to_string()))?;
                let first = self.dispatch(first)?;
                // The first result may alias a cached or pass-through model;
                // composing mutates, so it is deep-copied.
                let mut composer = Composer::new((*first).clone());
                for child in iter {
                    let model = self.dispatch(child)?;
                    composer.merge(&model)?;
                }
                self.finish(node, composer.into_model())
            }
            NodeKind::Ifs {
                geometry,
                transforms,
            } => {
                if let Some(hit) = self.lookup(node, false) {
                    return Ok(hit);
                }
                let first = transforms.first().ok_or_else(|| {
                    MeshError::EmptyChild("instance list without transforms".to_string())
                })?;
                let base = self.dispatch(geometry)?;
                let mut composer = Composer::new(base.transform(first));
                composer.set_iso_model(transforms.len());
                for matrix in &transforms[1..] {
                    composer.merge(&base.transform(matrix))?;
                }
                self.finish(node, composer.into_model())
            }

            // Appearance kinds are all handled by the guard above; this arm
            // exists only to satisfy exhaustiveness checking.
            NodeKind::Material
            | NodeKind::ImageTexture { .. }
            | NodeKind::MonoSpectral
            | NodeKind::MultiSpectral
            | NodeKind::Text { .. }
            | NodeKind::Font => Err(MeshError::UnsupportedNode(node.label())),
        }
    }

    // =========================================================================
    // CACHE PLUMBING
    // =========================================================================

    /// Cache lookup for a named node.
    ///
    /// For UV-capable kernels an entry without texcoords is rejected while
    /// UV synthesis is on, so the kernel re-runs and overwrites it.
    fn lookup(&mut self, node: &SceneNode, uv_capable: bool) -> Option<Arc<ExplicitModel>> {
        if !node.is_named() {
            return None;
        }
        if uv_capable && self.compute_tex_coords {
            self.cache.lookup_with_tex(node.id())
        } else {
            self.cache.lookup(node.id())
        }
    }

    /// Wraps a fresh kernel result and stores it for named nodes.
    fn finish(
        &mut self,
        node: &SceneNode,
        model: ExplicitModel,
    ) -> Result<Arc<ExplicitModel>, MeshError> {
        let model = Arc::new(model);
        if node.is_named() {
            self.cache.store(node.id(), Arc::clone(&model));
        }
        Ok(model)
    }

    /// Discretizes a profile child, retrying once with a fresh discretizer.
    ///
    /// The retry can only fire when a kernel defect leaks through the
    /// by-value dispatch; it is kept as a guarded diagnostic path.
    fn discretize_profile(
        &mut self,
        node: &Arc<SceneNode>,
    ) -> Result<Arc<ExplicitModel>, MeshError> {
        match self.dispatch(node) {
            Ok(model) => Ok(model),
            Err(first_err) => {
                let mut second = Discretizer::new();
                match second.dispatch(node) {
                    Ok(model) => {
                        log::warn!(
                            "profile {} discretized only with a fresh discretizer",
                            node.label()
                        );
                        Ok(model)
                    }
                    Err(_) => {
                        log::warn!("could not discretize profile {}", node.label());
                        Err(first_err)
                    }
                }
            }
        }
    }
}

/// Non-uniform taper: XY scale interpolated from `base_scale` to
/// `top_scale` along the child's axis.
///
/// The axis z-range comes from the skeleton when the child carries one,
/// from the point extent otherwise.
fn taper(model: &ExplicitModel, base_scale: f64, top_scale: f64) -> ExplicitModel {
    let (z_min, z_max) = match &model.skeleton {
        Some(chain) if chain.len() >= 2 => {
            let z_min = chain.iter().map(|p| p.z).fold(f64::INFINITY, f64::min);
            let z_max = chain.iter().map(|p| p.z).fold(f64::NEG_INFINITY, f64::max);
            (z_min, z_max)
        }
        _ => {
            let (min, max) = model.bounding_box();
            (min.z, max.z)
        }
    };
    let span = z_max - z_min;
    if span < EPSILON {
        return model.map_points(|p| DVec3::new(p.x * base_scale, p.y * base_scale, p.z));
    }
    model.map_points(move |p| {
        let t = ((p.z - z_min) / span).clamp(0.0, 1.0);
        let scale = base_scale + (top_scale - base_scale) * t;
        DVec3::new(p.x * scale, p.y * scale, p.z)
    })
}

// =============================================================================
// TESTS
// =============================================================================
