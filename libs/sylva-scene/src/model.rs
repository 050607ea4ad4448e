//! # Explicit Model
//!
//! Uniform mesh representation produced by discretization: a point array,
//! one face-index topology, optional texture coordinates, and an optional
//! skeleton polyline describing the shape's central axis.

use glam::{DAffine3, DVec2, DVec3};
use serde::{Deserialize, Serialize};

// =============================================================================
// TOPOLOGY
// =============================================================================

/// Face connectivity of an [`ExplicitModel`].
///
/// A model carries exactly one topology. Merging models with different face
/// arities promotes the result to [`Topology::Polygons`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Topology {
    /// Unconnected points.
    Points,
    /// A single open or closed chain over the point array, in order.
    Polyline,
    /// Triangle indices.
    Triangles(Vec<[u32; 3]>),
    /// Quad indices.
    Quads(Vec<[u32; 4]>),
    /// Variable-arity polygon indices.
    Polygons(Vec<Vec<u32>>),
}

impl Topology {
    /// Number of faces (zero for point and polyline topologies).
    pub fn face_count(&self) -> usize {
        match self {
            Topology::Points | Topology::Polyline => 0,
            Topology::Triangles(faces) => faces.len(),
            Topology::Quads(faces) => faces.len(),
            Topology::Polygons(faces) => faces.len(),
        }
    }

    /// Whether this topology carries faces at all.
    pub fn is_faceted(&self) -> bool {
        matches!(
            self,
            Topology::Triangles(_) | Topology::Quads(_) | Topology::Polygons(_)
        )
    }

    /// Copies the faces out as variable-arity polygons.
    ///
    /// Used when merging models of different arities.
    pub fn to_polygons(&self) -> Vec<Vec<u32>> {
        match self {
            Topology::Points | Topology::Polyline => Vec::new(),
            Topology::Triangles(faces) => faces.iter().map(|f| f.to_vec()).collect(),
            Topology::Quads(faces) => faces.iter().map(|f| f.to_vec()).collect(),
            Topology::Polygons(faces) => faces.clone(),
        }
    }

    /// Largest index referenced by any face, or `None` when there are no faces.
    pub fn max_index(&self) -> Option<u32> {
        match self {
            Topology::Points | Topology::Polyline => None,
            Topology::Triangles(faces) => faces.iter().flatten().copied().max(),
            Topology::Quads(faces) => faces.iter().flatten().copied().max(),
            Topology::Polygons(faces) => faces.iter().flatten().copied().max(),
        }
    }

    /// Applies `offset` to every index.
    pub fn shift(&mut self, offset: u32) {
        match self {
            Topology::Points | Topology::Polyline => {}
            Topology::Triangles(faces) => {
                for face in faces {
                    for index in face.iter_mut() {
                        *index += offset;
                    }
                }
            }
            Topology::Quads(faces) => {
                for face in faces {
                    for index in face.iter_mut() {
                        *index += offset;
                    }
                }
            }
            Topology::Polygons(faces) => {
                for face in faces {
                    for index in face.iter_mut() {
                        *index += offset;
                    }
                }
            }
        }
    }
}

// =============================================================================
// EXPLICIT MODEL
// =============================================================================

/// A tessellated mesh: points plus face indices.
///
/// This is the uniform output of the discretizer, suitable for rendering,
/// export, or further geometric processing. Values are immutable once
/// published; the discretizer and its callers share them by `Arc`.
///
/// ## Texture coordinates
///
/// When `tex_indices` is `None`, `tex_coords` (if present) is indexed by the
/// face indices and must therefore be as long as `points`. When
/// `tex_indices` is present, it is a separate triangle index list of the
/// same length as the face list (used by the sphere kernel to duplicate the
/// azimuth seam without duplicating points).
///
/// ## Example
///
/// ```rust
/// use glam::DVec3;
/// use sylva_scene::{ExplicitModel, Topology};
///
/// let tri = ExplicitModel::new(
///     vec![DVec3::ZERO, DVec3::X, DVec3::Y],
///     Topology::Triangles(vec![[0, 1, 2]]),
/// );
/// assert_eq!(tri.point_count(), 3);
/// assert_eq!(tri.face_count(), 1);
/// assert!(tri.validate());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitModel {
    /// Vertex positions.
    pub points: Vec<DVec3>,
    /// Face connectivity.
    pub topology: Topology,
    /// Optional per-face normals (the box kernel emits them).
    pub normals: Option<Vec<DVec3>>,
    /// Optional 2D texture coordinates.
    pub tex_coords: Option<Vec<DVec2>>,
    /// Optional separate texcoord triangle indices.
    pub tex_indices: Option<Vec<[u32; 3]>>,
    /// Faces are wound counter-clockwise viewed from outside.
    pub ccw: bool,
    /// The mesh encloses a volume.
    pub solid: bool,
    /// Central axis polyline (two endpoints or a chain).
    pub skeleton: Option<Vec<DVec3>>,
}

impl ExplicitModel {
    /// Creates a model from points and topology.
    ///
    /// Winding defaults to CCW, the solid flag to false.
    pub fn new(points: Vec<DVec3>, topology: Topology) -> Self {
        Self {
            points,
            topology,
            normals: None,
            tex_coords: None,
            tex_indices: None,
            ccw: true,
            solid: false,
            skeleton: None,
        }
    }

    /// Creates an empty model (no points, no faces).
    pub fn empty() -> Self {
        Self::new(Vec::new(), Topology::Points)
    }

    /// Get vertex count.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Get face count.
    pub fn face_count(&self) -> usize {
        self.topology.face_count()
    }

    /// Check if the model has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether texture coordinates are present.
    pub fn has_tex_coords(&self) -> bool {
        self.tex_coords.is_some()
    }

    /// Checks index ranges and texcoord length contracts.
    ///
    /// ## Returns
    ///
    /// `true` when every face index is in range, and a shared texcoord
    /// array (no separate indices) matches the point count.
    pub fn validate(&self) -> bool {
        if let Some(max) = self.topology.max_index() {
            if max as usize >= self.points.len() {
                return false;
            }
        }
        match (&self.tex_coords, &self.tex_indices) {
            (Some(coords), None) => coords.len() == self.points.len(),
            (Some(coords), Some(indices)) => {
                let max = indices.iter().flatten().copied().max().unwrap_or(0);
                (max as usize) < coords.len() && indices.len() == self.face_count()
            }
            (None, _) => true,
        }
    }

    /// Axis-aligned bounding box of the point array.
    ///
    /// Returns `(DVec3::ZERO, DVec3::ZERO)` for an empty model.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let mut min = DVec3::splat(f64::INFINITY);
        let mut max = DVec3::splat(f64::NEG_INFINITY);
        for p in &self.points {
            min = min.min(*p);
            max = max.max(*p);
        }
        if self.points.is_empty() {
            (DVec3::ZERO, DVec3::ZERO)
        } else {
            (min, max)
        }
    }

    /// Returns a copy with the affine applied to points and skeleton.
    ///
    /// Topology, flags and texture coordinates are carried over unchanged.
    /// Normals are transformed with the inverse-transpose and renormalized.
    pub fn transform(&self, affine: &DAffine3) -> ExplicitModel {
        let mut out = self.clone();
        for p in &mut out.points {
            *p = affine.transform_point3(*p);
        }
        if let Some(skeleton) = &mut out.skeleton {
            for p in skeleton {
                *p = affine.transform_point3(*p);
            }
        }
        if let Some(normals) = &mut out.normals {
            let normal_mat = affine.matrix3.inverse().transpose();
            for n in normals {
                let t = normal_mat * *n;
                *n = t.normalize_or_zero();
            }
        }
        out
    }

    /// Returns a copy with `f` applied to every point and skeleton point.
    ///
    /// Used for non-affine deformations (taper).
    pub fn map_points(&self, f: impl Fn(DVec3) -> DVec3) -> ExplicitModel {
        let mut out = self.clone();
        for p in &mut out.points {
            *p = f(*p);
        }
        if let Some(skeleton) = &mut out.skeleton {
            for p in skeleton {
                *p = f(*p);
            }
        }
        out
    }
}

// =============================================================================
// TESTS
// =============================================================================
