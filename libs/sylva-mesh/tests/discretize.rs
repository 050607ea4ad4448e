//! End-to-end discretization scenarios: whole scene graphs in, explicit
//! models out.

use std::sync::Arc;

use glam::{DAffine3, DVec2, DVec3};

use sylva_mesh::Discretizer;
use sylva_scene::{BezierPatch, ExplicitModel, NodeKind, SceneNode, Topology};

fn arc(node: SceneNode) -> Arc<SceneNode> {
    Arc::new(node)
}

fn discretize(node: &Arc<SceneNode>) -> Arc<ExplicitModel> {
    let mut discretizer = Discretizer::new();
    assert!(discretizer.process(node), "discretization failed");
    Arc::clone(discretizer.discretization().unwrap())
}

#[test]
fn sphere_unit() {
    let node = arc(SceneNode::new(NodeKind::Sphere {
        radius: 1.0,
        slices: 8,
        stacks: 6,
    }));
    let model = discretize(&node);

    assert_eq!(model.point_count(), 8 * 5 + 2);
    assert_eq!(model.face_count(), 2 * 8 * 5);
    assert!(model.validate());

    let n = model.point_count();
    assert!((model.points[n - 2] - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    assert!((model.points[n - 1] - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
    for p in &model.points {
        assert!((p.length() - 1.0).abs() < 1e-6);
    }
}

#[test]
fn cylinder_solid() {
    let node = arc(SceneNode::new(NodeKind::Cylinder {
        radius: 2.0,
        height: 5.0,
        solid: true,
        slices: 4,
    }));
    let model = discretize(&node);

    assert_eq!(model.point_count(), 2 * 4 + 2);
    match &model.topology {
        Topology::Polygons(faces) => {
            assert_eq!(faces.len(), 12);
            assert_eq!(faces.iter().filter(|f| f.len() == 4).count(), 4);
            assert_eq!(faces.iter().filter(|f| f.len() == 3).count(), 8);
        }
        other => panic!("expected a mixed-arity face set, got {other:?}"),
    }
    assert_eq!(
        model.skeleton.as_ref().unwrap().as_slice(),
        &[DVec3::new(0.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 5.0)]
    );
}

#[test]
fn box_half_extents() {
    let node = arc(SceneNode::cuboid(DVec3::new(1.0, 2.0, 3.0)));
    let model = discretize(&node);

    assert_eq!(model.point_count(), 8);
    assert_eq!(model.face_count(), 6);
    for p in &model.points {
        assert_eq!(p.x.abs(), 1.0);
        assert_eq!(p.y.abs(), 2.0);
        assert_eq!(p.z.abs(), 3.0);
    }

    let faces = match &model.topology {
        Topology::Quads(faces) => faces,
        other => panic!("expected quads, got {other:?}"),
    };
    for face in faces {
        let corners: Vec<DVec3> = face.iter().map(|&i| model.points[i as usize]).collect();
        let planar = (0..3).any(|axis| {
            corners
                .iter()
                .all(|c| (c[axis] - corners[0][axis]).abs() < 1e-12)
        });
        assert!(planar, "face {face:?} is not parallel to an axis plane");
    }
}

#[test]
fn bezier_patch_flat() {
    let grid: Vec<Vec<DVec3>> = (0..3)
        .map(|i| {
            (0..3)
                .map(|j| DVec3::new(i as f64, j as f64, 0.0))
                .collect()
        })
        .collect();
    let patch = BezierPatch::with_strides(grid, 3, 3).unwrap();
    let node = arc(SceneNode::new(NodeKind::Patch(Arc::new(patch))));
    let model = discretize(&node);

    assert_eq!(model.point_count(), 9);
    assert_eq!(model.face_count(), 4);
    for p in &model.points {
        assert!(p.z.abs() < 1e-9);
    }
}

#[test]
fn revolution_quarter_square() {
    let profile = arc(SceneNode::new(NodeKind::Polyline2 {
        points: vec![
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ],
    }));
    let node = arc(SceneNode::new(NodeKind::Revolution {
        profile,
        slices: 4,
        volume: false,
    }));
    let model = discretize(&node);

    assert_eq!(model.point_count(), 12);
    assert_eq!(model.face_count(), 16);
    assert!(model.validate());
    for p in model.points.iter().filter(|p| p.z == 0.0) {
        assert!((p.truncate().length() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn group_of_disjoint_spheres() {
    let group = arc(SceneNode::group(vec![
        arc(SceneNode::sphere(1.0)),
        arc(SceneNode::translated(
            DVec3::new(10.0, 0.0, 0.0),
            arc(SceneNode::sphere(1.0)),
        )),
    ]));
    let model = discretize(&group);

    let single = discretize(&arc(SceneNode::sphere(1.0)));
    assert_eq!(model.point_count(), 2 * single.point_count());
    assert_eq!(model.face_count(), 2 * single.face_count());
    assert!(model.validate());

    // Two disjoint clusters separated by 10 along x.
    let near = model.points.iter().filter(|p| p.x < 5.0).count();
    let far = model.points.iter().filter(|p| p.x > 5.0).count();
    assert_eq!(near, single.point_count());
    assert_eq!(far, single.point_count());
    for p in model.points.iter().filter(|p| p.x > 5.0) {
        assert!((*p - DVec3::new(10.0, 0.0, 0.0)).length() < 1.0 + 1e-9);
    }
}

#[test]
fn transform_commutes_with_discretization() {
    let affine = DAffine3::from_translation(DVec3::new(1.0, 2.0, 3.0))
        * DAffine3::from_axis_angle(DVec3::Z, 0.7)
        * DAffine3::from_scale(DVec3::new(2.0, 1.0, 0.5));

    let child = arc(SceneNode::cylinder(1.0, 2.0));
    let transformed = arc(SceneNode::new(NodeKind::Transformed {
        transform: affine,
        geometry: Arc::clone(&child),
    }));

    let direct = discretize(&transformed);
    let expected = discretize(&child).transform(&affine);
    assert_eq!(direct.point_count(), expected.point_count());
    for (a, b) in direct.points.iter().zip(&expected.points) {
        assert!((*a - *b).length() < 1e-9);
    }
}

#[test]
fn group_merge_is_associative() {
    let sphere = || arc(SceneNode::sphere(1.0));
    let b_shift = |node: Arc<SceneNode>| arc(SceneNode::translated(DVec3::new(5.0, 0.0, 0.0), node));
    let c_shift = |node: Arc<SceneNode>| arc(SceneNode::translated(DVec3::new(0.0, 5.0, 0.0), node));

    let left = arc(SceneNode::group(vec![
        sphere(),
        arc(SceneNode::group(vec![b_shift(sphere()), c_shift(sphere())])),
    ]));
    let right = arc(SceneNode::group(vec![
        arc(SceneNode::group(vec![sphere(), b_shift(sphere())])),
        c_shift(sphere()),
    ]));

    let left_model = discretize(&left);
    let right_model = discretize(&right);
    assert_eq!(left_model.point_count(), right_model.point_count());
    assert_eq!(left_model.face_count(), right_model.face_count());
    for (a, b) in left_model.points.iter().zip(&right_model.points) {
        assert!((*a - *b).length() < 1e-12);
    }
}

#[test]
fn explicit_input_is_returned_by_identity() {
    let mesh = Arc::new(ExplicitModel::new(
        vec![DVec3::ZERO, DVec3::X, DVec3::Y],
        Topology::Triangles(vec![[0, 1, 2]]),
    ));
    let node = arc(SceneNode::new(NodeKind::Mesh(Arc::clone(&mesh))));

    let mut discretizer = Discretizer::new();
    assert!(discretizer.process(&node));
    assert!(Arc::ptr_eq(discretizer.discretization().unwrap(), &mesh));
}

#[test]
fn cache_round_trip_and_uv_regeneration() {
    let node = arc(SceneNode::named(
        "crown",
        NodeKind::Sphere {
            radius: 1.0,
            slices: 8,
            stacks: 6,
        },
    ));
    let mut discretizer = Discretizer::new();

    assert!(discretizer.process(&node));
    let first = Arc::clone(discretizer.discretization().unwrap());
    assert!(discretizer.process(&node));
    assert!(Arc::ptr_eq(&first, discretizer.discretization().unwrap()));

    // Turning UV synthesis on rejects the cached entry and re-tessellates.
    discretizer.set_compute_tex_coords(true);
    assert!(discretizer.process(&node));
    let textured = Arc::clone(discretizer.discretization().unwrap());
    assert!(!Arc::ptr_eq(&first, &textured));
    assert!(textured.has_tex_coords());
    assert!(textured.validate());

    // clear() forces a fresh object even with UV synthesis back off.
    discretizer.set_compute_tex_coords(false);
    discretizer.clear();
    assert!(discretizer.process(&node));
    assert!(!Arc::ptr_eq(&textured, discretizer.discretization().unwrap()));
}

#[test]
fn deep_composition() {
    // A trunk with an instanced crown: transforms, a group and an IFS in
    // one traversal.
    let leaf = arc(SceneNode::sphere(0.3));
    let crown = arc(SceneNode::new(NodeKind::Ifs {
        geometry: leaf,
        transforms: (0..5)
            .map(|i| {
                DAffine3::from_translation(DVec3::new(0.0, 0.0, 2.0))
                    * DAffine3::from_axis_angle(DVec3::Z, i as f64)
                    * DAffine3::from_translation(DVec3::new(0.8, 0.0, 0.0))
            })
            .collect(),
    }));
    let trunk = arc(SceneNode::cylinder(0.2, 2.0));
    let tree = arc(SceneNode::group(vec![trunk, crown]));

    let model = discretize(&tree);
    assert!(model.validate());
    // Mixed arities force polygon promotion.
    assert!(matches!(model.topology, Topology::Polygons(_)));

    let leaf_model = discretize(&arc(SceneNode::sphere(0.3)));
    let trunk_model = discretize(&arc(SceneNode::cylinder(0.2, 2.0)));
    assert_eq!(
        model.point_count(),
        trunk_model.point_count() + 5 * leaf_model.point_count()
    );
}
