//! # Model Composer
//!
//! Pairwise merge of explicit models for groups and iterated function
//! systems: point arrays concatenate, face indices shift by the left-hand
//! point count, and mismatched face arities promote to polygons.
//!
//! Texture coordinates survive a merge only when both inputs carry
//! shared-indexed texcoords; otherwise they are dropped, since a partial
//! texcoord array cannot satisfy the length contract of the merged model.

use glam::DVec3;

use sylva_scene::{ExplicitModel, Topology};

use crate::error::MeshError;
use config::constants::EPSILON;

/// Accumulates a sequence of explicit models into one.
///
/// ## Example
///
/// ```rust
/// use glam::DVec3;
/// use sylva_scene::{ExplicitModel, Topology};
/// use sylva_mesh::merge::Composer;
///
/// let tri = ExplicitModel::new(
///     vec![DVec3::ZERO, DVec3::X, DVec3::Y],
///     Topology::Triangles(vec![[0, 1, 2]]),
/// );
/// let mut composer = Composer::new(tri.clone());
/// composer.merge(&tri).unwrap();
/// let merged = composer.into_model();
/// assert_eq!(merged.point_count(), 6);
/// assert_eq!(merged.face_count(), 2);
/// ```
#[derive(Debug)]
pub struct Composer {
    model: ExplicitModel,
    base_points: usize,
    base_faces: usize,
}

impl Composer {
    /// Starts composing from a base model.
    ///
    /// The base must be owned (deep-copied by the caller when it aliases a
    /// cached or caller-visible value): the composer mutates it in place.
    pub fn new(base: ExplicitModel) -> Self {
        let base_points = base.point_count();
        let base_faces = base.face_count();
        Self {
            model: base,
            base_points,
            base_faces,
        }
    }

    /// Pre-reserves room for `count` models the size of the base.
    ///
    /// Used by the IFS dispatcher, which knows every instance shares the
    /// base geometry's size.
    pub fn set_iso_model(&mut self, count: usize) {
        let extra = count.saturating_sub(1);
        self.model.points.reserve(self.base_points * extra);
        match &mut self.model.topology {
            Topology::Triangles(faces) => faces.reserve(self.base_faces * extra),
            Topology::Quads(faces) => faces.reserve(self.base_faces * extra),
            Topology::Polygons(faces) => faces.reserve(self.base_faces * extra),
            Topology::Points | Topology::Polyline => {}
        }
    }

    /// Merges another model into the accumulated one.
    pub fn merge(&mut self, other: &ExplicitModel) -> Result<(), MeshError> {
        if other.is_empty() {
            return Err(MeshError::EmptyChild("merge of empty model".to_string()));
        }

        let offset = self.model.point_count() as u32;
        let mut incoming = other.topology.clone();
        incoming.shift(offset);

        self.model.topology = merge_topologies(&self.model.topology, incoming)?;
        self.model.points.extend_from_slice(&other.points);

        // Texcoords survive only when both sides carry shared-indexed ones.
        let keep_tex = self.model.tex_indices.is_none()
            && other.tex_indices.is_none()
            && self.model.tex_coords.is_some()
            && other.tex_coords.is_some();
        if keep_tex {
            if let (Some(ours), Some(theirs)) =
                (self.model.tex_coords.as_mut(), other.tex_coords.as_ref())
            {
                ours.extend_from_slice(theirs);
            }
        } else {
            self.model.tex_coords = None;
            self.model.tex_indices = None;
        }

        match (&mut self.model.normals, &other.normals) {
            (Some(ours), Some(theirs)) => ours.extend_from_slice(theirs),
            _ => self.model.normals = None,
        }

        self.model.solid = self.model.solid && other.solid;
        self.model.skeleton =
            merge_skeletons(self.model.skeleton.take(), other.skeleton.clone());
        Ok(())
    }

    /// Finishes composition and returns the merged model.
    pub fn into_model(self) -> ExplicitModel {
        self.model
    }
}

fn merge_topologies(ours: &Topology, incoming: Topology) -> Result<Topology, MeshError> {
    Ok(match (ours, incoming) {
        (Topology::Points, Topology::Points) => Topology::Points,
        (Topology::Polyline, Topology::Polyline) => Topology::Polyline,
        (Topology::Triangles(a), Topology::Triangles(b)) => {
            let mut faces = a.clone();
            faces.extend(b);
            Topology::Triangles(faces)
        }
        (Topology::Quads(a), Topology::Quads(b)) => {
            let mut faces = a.clone();
            faces.extend(b);
            Topology::Quads(faces)
        }
        (a, b) if a.is_faceted() && b.is_faceted() => {
            let mut faces = a.to_polygons();
            faces.extend(b.to_polygons());
            Topology::Polygons(faces)
        }
        (a, b) => {
            return Err(MeshError::MergeMismatch(format!(
                "cannot merge {a:?} with {b:?}"
            )))
        }
    })
}

/// Skeleton of the merged result: the chains concatenate when an endpoint
/// of one meets an endpoint of the other, otherwise the longer chain wins.
fn merge_skeletons(
    ours: Option<Vec<DVec3>>,
    theirs: Option<Vec<DVec3>>,
) -> Option<Vec<DVec3>> {
    let (a, b) = match (ours, theirs) {
        (Some(a), Some(b)) => (a, b),
        (Some(a), None) => return Some(a),
        (None, b) => return b,
    };
    if let (Some(a_last), Some(b_first)) = (a.last(), b.first()) {
        if (*a_last - *b_first).length() < EPSILON {
            let mut chain = a;
            chain.extend_from_slice(&b[1..]);
            return Some(chain);
        }
    }
    if let (Some(b_last), Some(a_first)) = (b.last(), a.first()) {
        if (*b_last - *a_first).length() < EPSILON {
            let mut chain = b;
            chain.extend_from_slice(&a[1..]);
            return Some(chain);
        }
    }
    if chain_length(&a) >= chain_length(&b) {
        Some(a)
    } else {
        Some(b)
    }
}

fn chain_length(chain: &[DVec3]) -> f64 {
    chain.windows(2).map(|w| (w[1] - w[0]).length()).sum()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn triangle() -> ExplicitModel {
        ExplicitModel::new(
            vec![DVec3::ZERO, DVec3::X, DVec3::Y],
            Topology::Triangles(vec![[0, 1, 2]]),
        )
    }

    fn quad() -> ExplicitModel {
        ExplicitModel::new(
            vec![DVec3::ZERO, DVec3::X, DVec3::ONE, DVec3::Y],
            Topology::Quads(vec![[0, 1, 2, 3]]),
        )
    }

    #[test]
    fn test_merge_shifts_indices() {
        let mut composer = Composer::new(triangle());
        composer.merge(&triangle()).unwrap();
        let merged = composer.into_model();
        assert_eq!(merged.point_count(), 6);
        match merged.topology {
            Topology::Triangles(faces) => assert_eq!(faces[1], [3, 4, 5]),
            other => panic!("expected triangles, got {other:?}"),
        }
    }

    #[test]
    fn test_merge_promotes_mixed_arity_to_polygons() {
        let mut composer = Composer::new(triangle());
        composer.merge(&quad()).unwrap();
        let merged = composer.into_model();
        match merged.topology {
            Topology::Polygons(ref faces) => {
                assert_eq!(faces.len(), 2);
                assert_eq!(faces[0], vec![0, 1, 2]);
                assert_eq!(faces[1], vec![3, 4, 5, 6]);
            }
            other => panic!("expected polygons, got {other:?}"),
        }
        assert!(merged.validate());
    }

    #[test]
    fn test_merge_rejects_points_with_faces() {
        let points = ExplicitModel::new(vec![DVec3::ZERO], Topology::Points);
        let mut composer = Composer::new(points);
        assert!(composer.merge(&triangle()).is_err());
    }

    #[test]
    fn test_merge_drops_one_sided_tex_coords() {
        let mut textured = triangle();
        textured.tex_coords = Some(vec![DVec2::ZERO; 3]);
        let mut composer = Composer::new(textured);
        composer.merge(&triangle()).unwrap();
        assert!(composer.into_model().tex_coords.is_none());
    }

    #[test]
    fn test_merge_keeps_two_sided_tex_coords() {
        let mut textured = triangle();
        textured.tex_coords = Some(vec![DVec2::ZERO; 3]);
        let mut composer = Composer::new(textured.clone());
        composer.merge(&textured).unwrap();
        let merged = composer.into_model();
        assert_eq!(merged.tex_coords.unwrap().len(), 6);
    }

    #[test]
    fn test_skeletons_concatenate_when_endpoints_meet() {
        let mut a = triangle();
        a.skeleton = Some(vec![DVec3::ZERO, DVec3::Z]);
        let mut b = triangle();
        b.skeleton = Some(vec![DVec3::Z, DVec3::new(0.0, 0.0, 2.0)]);
        let mut composer = Composer::new(a);
        composer.merge(&b).unwrap();
        let skeleton = composer.into_model().skeleton.unwrap();
        assert_eq!(skeleton.len(), 3);
        assert_eq!(skeleton[2], DVec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_longer_skeleton_wins_when_disjoint() {
        let mut a = triangle();
        a.skeleton = Some(vec![DVec3::ZERO, DVec3::Z]);
        let mut b = triangle();
        b.skeleton = Some(vec![DVec3::new(5.0, 0.0, 0.0), DVec3::new(5.0, 0.0, 3.0)]);
        let mut composer = Composer::new(a);
        composer.merge(&b).unwrap();
        let skeleton = composer.into_model().skeleton.unwrap();
        assert_eq!(skeleton[0], DVec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_solid_flag_is_conjunction() {
        let mut a = triangle();
        a.solid = true;
        let mut composer = Composer::new(a);
        composer.merge(&triangle()).unwrap();
        assert!(!composer.into_model().solid);
    }
}
