//! # Scene Graph Nodes
//!
//! The closed node hierarchy the discretizer dispatches over. Every node
//! carries a stable identity and an optional name; only named nodes
//! participate in discretization caching.
//!
//! Nodes are shared by `Arc` and immutable after construction: the cache is
//! keyed on identity, so mutating a node under a live discretizer would
//! silently desynchronize it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::{DAffine3, DMat3, DQuat, DVec2, DVec3, EulerRot};

use crate::curve::{ParametricCurve2, ParametricCurve3};
use crate::model::ExplicitModel;
use crate::patch::{HeightGrid, ParametricPatch};
use crate::profile::{ProfileInterpolation, ProfileTransformation};
use config::constants::{DEFAULT_SLICES, DEFAULT_STACKS};

// =============================================================================
// NODE IDENTITY
// =============================================================================

/// Stable scene-node identity.
///
/// Assigned from a process-wide counter at construction; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for diagnostics.
    pub fn value(&self) -> u64 {
        self.0
    }
}

// =============================================================================
// SCENE NODE
// =============================================================================

/// A scene-graph node: identity, optional name, and the concrete kind.
#[derive(Debug)]
pub struct SceneNode {
    id: NodeId,
    name: Option<String>,
    kind: NodeKind,
}

impl SceneNode {
    /// Creates an anonymous node.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            name: None,
            kind,
        }
    }

    /// Creates a named node; named nodes are cached by the discretizer.
    pub fn named(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            name: Some(name.into()),
            kind,
        }
    }

    /// The node's stable identity.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether this node participates in discretization caching.
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// The concrete node kind.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Display label for diagnostics: the name when present, else the id.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{}", self.id.value()),
        }
    }
}

// =============================================================================
// NODE KIND
// =============================================================================

/// The concrete kind of a scene node.
///
/// Appearance kinds produce no geometry; explicit kinds pass through the
/// discretizer untouched; parametric kinds are tessellated by their kernel;
/// composite kinds recurse.
#[derive(Debug)]
pub enum NodeKind {
    // =========================================================================
    // APPEARANCE — no geometry
    // =========================================================================
    /// Surface material description.
    Material,
    /// Image-based texture reference.
    ImageTexture {
        /// Image source path or identifier.
        source: String,
    },
    /// Single-band spectral reflectance.
    MonoSpectral,
    /// Multi-band spectral reflectance.
    MultiSpectral,
    /// Renderable text; tessellation is owned by the text subsystem.
    Text {
        /// The text content.
        content: String,
    },
    /// Font description for text nodes.
    Font,

    // =========================================================================
    // EXPLICIT GEOMETRY
    // =========================================================================
    /// Already-explicit geometry (triangle/quad/face/point set, polyline, or
    /// a cached symbol). Dispatching returns this exact model, not a copy.
    Mesh(Arc<ExplicitModel>),
    /// A shape pairing geometry with appearance; discretizes its geometry.
    Shape {
        /// The geometric child.
        geometry: Arc<SceneNode>,
    },

    // =========================================================================
    // RING-STACK SOLIDS
    // =========================================================================
    /// Sphere centered at the origin.
    Sphere {
        /// Radius.
        radius: f64,
        /// Longitudinal subdivisions.
        slices: u32,
        /// Latitudinal subdivisions.
        stacks: u32,
    },
    /// Cone with its base in the xy plane and apex on +z.
    Cone {
        /// Base radius.
        radius: f64,
        /// Apex height.
        height: f64,
        /// Close the base with a fan.
        solid: bool,
        /// Longitudinal subdivisions.
        slices: u32,
    },
    /// Cylinder along +z.
    Cylinder {
        /// Radius.
        radius: f64,
        /// Height.
        height: f64,
        /// Close both ends.
        solid: bool,
        /// Longitudinal subdivisions.
        slices: u32,
    },
    /// Cylinder with a tapered top ring.
    Frustum {
        /// Base radius.
        radius: f64,
        /// Height.
        height: f64,
        /// Top radius as a fraction of the base radius.
        taper: f64,
        /// Close both ends.
        solid: bool,
        /// Longitudinal subdivisions.
        slices: u32,
    },
    /// Solid of revolution of `z = height * (1 - (r/radius)^shape)`.
    Paraboloid {
        /// Base radius.
        radius: f64,
        /// Apex height.
        height: f64,
        /// Shape exponent.
        shape: f64,
        /// Close the base.
        solid: bool,
        /// Longitudinal subdivisions.
        slices: u32,
        /// Radial subdivisions.
        stacks: u32,
    },
    /// Asymmetric hull: four quadrants with independent radii and heights,
    /// fanned toward dedicated bottom and top apices.
    AsymmetricHull {
        /// Peripheral radius on +x.
        pos_x_radius: f64,
        /// Peripheral radius on -x.
        neg_x_radius: f64,
        /// Peripheral radius on +y.
        pos_y_radius: f64,
        /// Peripheral radius on -y.
        neg_y_radius: f64,
        /// Peripheral height on +x.
        pos_x_height: f64,
        /// Peripheral height on -x.
        neg_x_height: f64,
        /// Peripheral height on +y.
        pos_y_height: f64,
        /// Peripheral height on -y.
        neg_y_height: f64,
        /// Bottom apex.
        bottom: DVec3,
        /// Top apex.
        top: DVec3,
        /// Shape exponent of the lower fans.
        bottom_shape: f64,
        /// Shape exponent of the upper fans.
        top_shape: f64,
        /// Slices per quadrant.
        slices: u32,
        /// Stacks per fan.
        stacks: u32,
    },
    /// Axis-aligned box; `size` holds the half-extents.
    Box {
        /// Half-extent along each axis.
        size: DVec3,
    },
    /// Flat disc in the xy plane.
    Disc {
        /// Radius.
        radius: f64,
        /// Subdivisions.
        slices: u32,
    },

    // =========================================================================
    // CURVES, PATCHES, GRIDS
    // =========================================================================
    /// Planar parametric curve; discretizes to a polyline lifted to z = 0.
    Curve2(Arc<dyn ParametricCurve2>),
    /// Spatial parametric curve; discretizes to a polyline.
    Curve3(Arc<dyn ParametricCurve3>),
    /// Planar polyline; lifted to z = 0.
    Polyline2 {
        /// Chain points.
        points: Vec<DVec2>,
    },
    /// Planar point cloud; lifted to z = 0.
    PointSet2 {
        /// Points.
        points: Vec<DVec2>,
    },
    /// Parametric surface patch; discretizes to a quad grid.
    Patch(Arc<dyn ParametricPatch>),
    /// Regular height field; discretizes to two triangles per cell.
    Elevation(Arc<dyn HeightGrid>),

    // =========================================================================
    // SWEPT SURFACES
    // =========================================================================
    /// Surface of revolution of a planar profile around the z axis.
    Revolution {
        /// Profile node; its discretization's `(x, y)` is read as
        /// `(radius, z)`.
        profile: Arc<SceneNode>,
        /// Angular subdivisions.
        slices: u32,
        /// The node encloses a volume (made solid when the profile closes).
        volume: bool,
    },
    /// Revolution with a profile interpolated per angle.
    Swung {
        /// Keyed profile interpolation.
        interpolation: Arc<dyn ProfileInterpolation>,
        /// Angular subdivisions.
        slices: u32,
        /// Winding orientation.
        ccw: bool,
    },
    /// Cross-section swept along an axis curve.
    Extrusion {
        /// The axis curve.
        axis: Arc<dyn ParametricCurve3>,
        /// Cross-section node; must discretize to a polyline.
        cross_section: Arc<SceneNode>,
        /// Optional per-parameter cross-section transform.
        profile: Option<Arc<dyn ProfileTransformation>>,
        /// Close both ends with caps.
        solid: bool,
        /// Winding orientation.
        ccw: bool,
    },
    /// Horizontal profile swept between two apices along a vertical profile.
    ExtrudedHull {
        /// Horizontal cross-section node (planar).
        horizontal: Arc<SceneNode>,
        /// Vertical silhouette node (planar).
        vertical: Arc<SceneNode>,
        /// Winding orientation.
        ccw: bool,
    },

    // =========================================================================
    // COMPOSITION
    // =========================================================================
    /// Affine-transformed child (translation, scaling, rotation,
    /// orientation). Built via the [`SceneNode`] transform constructors.
    Transformed {
        /// The affine to apply to the child's discretization.
        transform: DAffine3,
        /// Child node.
        geometry: Arc<SceneNode>,
    },
    /// Non-uniform taper of a primitive: the XY scale interpolates from
    /// `base_scale` to `top_scale` along the child's axis.
    Tapered {
        /// Scale factor at the axis start.
        base_scale: f64,
        /// Scale factor at the axis end.
        top_scale: f64,
        /// Child primitive.
        primitive: Arc<SceneNode>,
    },
    /// Children merged into one model.
    Group {
        /// Child nodes, merged left to right.
        children: Vec<Arc<SceneNode>>,
    },
    /// Iterated function system: one base geometry instanced under a list
    /// of affines.
    Ifs {
        /// Base geometry.
        geometry: Arc<SceneNode>,
        /// Instance transforms.
        transforms: Vec<DAffine3>,
    },
}

impl NodeKind {
    /// Whether this kind never produces geometry.
    pub fn is_appearance(&self) -> bool {
        matches!(
            self,
            NodeKind::Material
                | NodeKind::ImageTexture { .. }
                | NodeKind::MonoSpectral
                | NodeKind::MultiSpectral
                | NodeKind::Text { .. }
                | NodeKind::Font
        )
    }

    /// Whether this kind already is an explicit model.
    pub fn is_explicit(&self) -> bool {
        matches!(self, NodeKind::Mesh(_))
    }
}

// =============================================================================
// CONVENIENCE CONSTRUCTORS
// =============================================================================

impl SceneNode {
    /// Sphere with default subdivision.
    pub fn sphere(radius: f64) -> Self {
        Self::new(NodeKind::Sphere {
            radius,
            slices: DEFAULT_SLICES,
            stacks: DEFAULT_STACKS,
        })
    }

    /// Solid cylinder with default subdivision.
    pub fn cylinder(radius: f64, height: f64) -> Self {
        Self::new(NodeKind::Cylinder {
            radius,
            height,
            solid: true,
            slices: DEFAULT_SLICES,
        })
    }

    /// Solid cone with default subdivision.
    pub fn cone(radius: f64, height: f64) -> Self {
        Self::new(NodeKind::Cone {
            radius,
            height,
            solid: true,
            slices: DEFAULT_SLICES,
        })
    }

    /// Box from half-extents.
    pub fn cuboid(size: DVec3) -> Self {
        Self::new(NodeKind::Box { size })
    }

    /// Child translated by `offset`.
    pub fn translated(offset: DVec3, geometry: Arc<SceneNode>) -> Self {
        Self::new(NodeKind::Transformed {
            transform: DAffine3::from_translation(offset),
            geometry,
        })
    }

    /// Child scaled per axis.
    pub fn scaled(factors: DVec3, geometry: Arc<SceneNode>) -> Self {
        Self::new(NodeKind::Transformed {
            transform: DAffine3::from_scale(factors),
            geometry,
        })
    }

    /// Child rotated by `angle` radians around `axis`.
    pub fn axis_rotated(axis: DVec3, angle: f64, geometry: Arc<SceneNode>) -> Self {
        Self::new(NodeKind::Transformed {
            transform: DAffine3::from_axis_angle(axis.normalize(), angle),
            geometry,
        })
    }

    /// Child rotated by azimuth/elevation/roll Euler angles (radians).
    pub fn euler_rotated(
        azimuth: f64,
        elevation: f64,
        roll: f64,
        geometry: Arc<SceneNode>,
    ) -> Self {
        Self::new(NodeKind::Transformed {
            transform: DAffine3::from_quat(DQuat::from_euler(
                EulerRot::ZYX,
                azimuth,
                elevation,
                roll,
            )),
            geometry,
        })
    }

    /// Child re-based onto the frame spanned by `primary`, `secondary` and
    /// their cross product.
    pub fn oriented(primary: DVec3, secondary: DVec3, geometry: Arc<SceneNode>) -> Self {
        let primary = primary.normalize();
        let secondary = secondary.normalize();
        Self::new(NodeKind::Transformed {
            transform: DAffine3::from_mat3(DMat3::from_cols(
                primary,
                secondary,
                primary.cross(secondary),
            )),
            geometry,
        })
    }

    /// Children grouped into one merged model.
    pub fn group(children: Vec<Arc<SceneNode>>) -> Self {
        Self::new(NodeKind::Group { children })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_are_unique() {
        let a = SceneNode::sphere(1.0);
        let b = SceneNode::sphere(1.0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_named_nodes() {
        let node = SceneNode::named("trunk", NodeKind::Material);
        assert!(node.is_named());
        assert_eq!(node.name(), Some("trunk"));
        assert_eq!(node.label(), "trunk");

        let anon = SceneNode::new(NodeKind::Material);
        assert!(!anon.is_named());
        assert!(anon.label().starts_with('#'));
    }

    #[test]
    fn test_appearance_predicate() {
        assert!(NodeKind::Material.is_appearance());
        assert!(NodeKind::Font.is_appearance());
        assert!(!NodeKind::Box { size: DVec3::ONE }.is_appearance());
    }

    #[test]
    fn test_translated_builds_affine() {
        let child = Arc::new(SceneNode::sphere(1.0));
        let node = SceneNode::translated(DVec3::new(1.0, 2.0, 3.0), child);
        match node.kind() {
            NodeKind::Transformed { transform, .. } => {
                let p = transform.transform_point3(DVec3::ZERO);
                assert_eq!(p, DVec3::new(1.0, 2.0, 3.0));
            }
            _ => panic!("expected a transformed node"),
        }
    }

    #[test]
    fn test_oriented_builds_right_handed_frame() {
        let child = Arc::new(SceneNode::sphere(1.0));
        let node = SceneNode::oriented(DVec3::X, DVec3::Y, child);
        match node.kind() {
            NodeKind::Transformed { transform, .. } => {
                let p = transform.transform_point3(DVec3::new(0.0, 0.0, 1.0));
                assert!((p - DVec3::Z).length() < 1e-12);
            }
            _ => panic!("expected a transformed node"),
        }
    }
}
