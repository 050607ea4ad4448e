//! # Ring-Stack Solid Kernels
//!
//! Tessellation of the round primitives: a ring of `slices` points around
//! the z axis, `stacks` subdivisions along it, apex/base vertices where the
//! shape closes. All faces are wound counter-clockwise viewed from outside;
//! every solid carries its axis as a skeleton.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::{DVec2, DVec3};

use sylva_scene::{ExplicitModel, Topology};

use crate::error::MeshError;
use config::constants::MIN_SLICES;

fn check_slices(slices: u32) -> Result<(), MeshError> {
    if slices < MIN_SLICES {
        return Err(MeshError::DegenerateGeometry(format!(
            "slices must be at least {MIN_SLICES}: {slices}"
        )));
    }
    Ok(())
}

fn check_positive(value: f64, what: &str) -> Result<(), MeshError> {
    if value <= 0.0 {
        return Err(MeshError::DegenerateGeometry(format!(
            "{what} must be positive: {value}"
        )));
    }
    Ok(())
}

// =============================================================================
// SPHERE
// =============================================================================

/// Tessellates a sphere of the given radius.
///
/// # Arguments
///
/// * `radius` - Sphere radius
/// * `slices` - Azimuthal subdivisions
/// * `stacks` - Elevation subdivisions
/// * `with_tex` - Synthesize texture coordinates
///
/// # Topology
///
/// `slices * (stacks - 1) + 2` points (interior rings plus two poles) and
/// `2 * slices * (stacks - 1)` triangles: a fan at each pole, two triangles
/// per interior ring quad.
///
/// When `with_tex` is set, texcoords form a `(slices + 1) x (stacks + 1)`
/// grid with the azimuth seam duplicated, addressed by a separate triangle
/// index list.
pub fn sphere(
    radius: f64,
    slices: u32,
    stacks: u32,
    with_tex: bool,
) -> Result<ExplicitModel, MeshError> {
    check_positive(radius, "sphere radius")?;
    check_slices(slices)?;
    if stacks < 2 {
        return Err(MeshError::DegenerateGeometry(format!(
            "sphere stacks must be at least 2: {stacks}"
        )));
    }

    let ring_count = stacks - 1;
    let bot = slices * ring_count;
    let top = bot + 1;

    let mut points = Vec::with_capacity(top as usize + 1);
    let mut faces = Vec::with_capacity((slices * 2 * ring_count) as usize);

    let az_step = TAU / slices as f64;
    let el_step = PI / stacks as f64;

    let mut cur = 0u32;
    let mut next = ring_count;

    for i in 0..slices {
        let az = i as f64 * az_step;
        let (sin_az, cos_az) = az.sin_cos();
        let mut el = -FRAC_PI_2 + el_step;

        points.push(DVec3::new(cos_az * el.cos(), sin_az * el.cos(), el.sin()) * radius);

        faces.push([cur, bot, next]);
        faces.push([cur + ring_count - 1, next + ring_count - 1, top]);

        for j in 1..ring_count {
            el += el_step;
            points.push(DVec3::new(cos_az * el.cos(), sin_az * el.cos(), el.sin()) * radius);

            faces.push([cur + j, cur + j - 1, next + j - 1]);
            faces.push([cur + j, next + j - 1, next + j]);
        }

        cur = next;
        next = (next + ring_count) % (ring_count * slices);
    }

    points.push(DVec3::new(0.0, 0.0, -radius));
    points.push(DVec3::new(0.0, 0.0, radius));

    let skeleton = vec![points[bot as usize], points[top as usize]];
    let mut model = ExplicitModel::new(points, Topology::Triangles(faces));
    model.solid = true;
    model.skeleton = Some(skeleton);

    if with_tex {
        let (tex_coords, tex_indices) = sphere_tex_grid(slices, stacks);
        model.tex_coords = Some(tex_coords);
        model.tex_indices = Some(tex_indices);
    }

    Ok(model)
}

/// Builds the seam-duplicated UV grid for the sphere.
///
/// Interior rings come first (`slices + 1` columns of `stacks - 1` rows),
/// then a v=0 row and a v=1 row for the poles.
fn sphere_tex_grid(slices: u32, stacks: u32) -> (Vec<DVec2>, Vec<[u32; 3]>) {
    let ring_count = stacks - 1;
    let columns = slices + 1;

    let mut coords = Vec::with_capacity((columns * (stacks + 1)) as usize);
    for i in 0..columns {
        let s = i as f64 / slices as f64;
        for j in 1..stacks {
            coords.push(DVec2::new(s, j as f64 / stacks as f64));
        }
    }
    let bot = coords.len() as u32;
    for i in 0..columns {
        coords.push(DVec2::new(i as f64 / slices as f64, 0.0));
    }
    let top = coords.len() as u32;
    for i in 0..columns {
        coords.push(DVec2::new(i as f64 / slices as f64, 1.0));
    }

    // Same triangle pattern as the positions, but without the azimuth wrap:
    // the final column addresses the duplicated seam instead.
    let mut indices = Vec::with_capacity((slices * 2 * ring_count) as usize);
    let mut cur = 0u32;
    let mut next = ring_count;
    for i in 0..slices {
        indices.push([cur, bot + i, next]);
        indices.push([cur + ring_count - 1, next + ring_count - 1, top + i]);
        for j in 1..ring_count {
            indices.push([cur + j, cur + j - 1, next + j - 1]);
            indices.push([cur + j, next + j - 1, next + j]);
        }
        cur = next;
        next += ring_count;
    }

    (coords, indices)
}

// =============================================================================
// CONE
// =============================================================================

/// Tessellates a cone: base ring in the xy plane, apex on +z.
///
/// A solid cone gets an extra base-center vertex closing the bottom with a
/// fan; `slices * (1 + solid)` triangles total.
pub fn cone(
    radius: f64,
    height: f64,
    solid: bool,
    slices: u32,
) -> Result<ExplicitModel, MeshError> {
    check_positive(radius, "cone radius")?;
    check_positive(height, "cone height")?;
    check_slices(slices)?;

    let base = slices;
    let apex = if solid { slices + 1 } else { slices };

    let mut points = Vec::with_capacity(apex as usize + 1);
    let mut faces = Vec::with_capacity((slices * if solid { 2 } else { 1 }) as usize);

    let angle_step = TAU / slices as f64;
    for i in 0..slices {
        let (sin, cos) = (i as f64 * angle_step).sin_cos();
        points.push(DVec3::new(cos * radius, sin * radius, 0.0));

        let cur = i;
        let next = (i + 1) % slices;
        faces.push([cur, next, apex]);
        if solid {
            faces.push([cur, base, next]);
        }
    }
    if solid {
        points.push(DVec3::ZERO);
    }
    points.push(DVec3::new(0.0, 0.0, height));

    let mut model = ExplicitModel::new(points, Topology::Triangles(faces));
    model.solid = solid;
    model.skeleton = Some(vec![DVec3::ZERO, DVec3::new(0.0, 0.0, height)]);
    Ok(model)
}

// =============================================================================
// CYLINDER / FRUSTUM
// =============================================================================

/// Tessellates a cylinder along +z.
///
/// Hollow cylinders yield a quad set of `slices` side quads; solid ones
/// add center vertices and triangular caps, yielding a mixed-arity face
/// set of `3 * slices` faces.
pub fn cylinder(
    radius: f64,
    height: f64,
    solid: bool,
    slices: u32,
) -> Result<ExplicitModel, MeshError> {
    ring_pair(radius, height, 1.0, solid, slices)
}

/// Tessellates a frustum: a cylinder whose top ring is scaled by `taper`.
pub fn frustum(
    radius: f64,
    height: f64,
    taper: f64,
    solid: bool,
    slices: u32,
) -> Result<ExplicitModel, MeshError> {
    if taper < 0.0 {
        return Err(MeshError::DegenerateGeometry(format!(
            "frustum taper must not be negative: {taper}"
        )));
    }
    ring_pair(radius, height, taper, solid, slices)
}

/// Shared builder for the two-parallel-rings solids.
fn ring_pair(
    radius: f64,
    height: f64,
    taper: f64,
    solid: bool,
    slices: u32,
) -> Result<ExplicitModel, MeshError> {
    check_positive(radius, "radius")?;
    check_positive(height, "height")?;
    check_slices(slices)?;

    let base = 2 * slices;
    let top = base + 1;

    let mut points = Vec::with_capacity((2 * slices + if solid { 2 } else { 0 }) as usize);
    let mut quads = Vec::new();
    let mut polygons = Vec::new();

    let angle_step = TAU / slices as f64;
    for i in 0..slices {
        let (sin, cos) = (i as f64 * angle_step).sin_cos();
        let x = cos * radius;
        let y = sin * radius;
        points.push(DVec3::new(x, y, 0.0));
        points.push(DVec3::new(x * taper, y * taper, height));

        let cur = 2 * i;
        let next = (2 * i + 2) % (2 * slices);
        if solid {
            polygons.push(vec![cur, next, next + 1, cur + 1]);
            polygons.push(vec![cur + 1, next + 1, top]);
            polygons.push(vec![cur, base, next]);
        } else {
            quads.push([cur, next, next + 1, cur + 1]);
        }
    }

    let topology = if solid {
        points.push(DVec3::ZERO);
        points.push(DVec3::new(0.0, 0.0, height));
        Topology::Polygons(polygons)
    } else {
        Topology::Quads(quads)
    };

    let mut model = ExplicitModel::new(points, topology);
    model.solid = solid;
    model.skeleton = Some(vec![DVec3::ZERO, DVec3::new(0.0, 0.0, height)]);
    Ok(model)
}

// =============================================================================
// PARABOLOID
// =============================================================================

/// Tessellates a paraboloid: rings shrinking from the base radius to the
/// apex, following `z = height * (1 - (r / radius)^shape)`.
pub fn paraboloid(
    radius: f64,
    height: f64,
    shape: f64,
    solid: bool,
    slices: u32,
    stacks: u32,
) -> Result<ExplicitModel, MeshError> {
    check_positive(radius, "paraboloid radius")?;
    check_positive(height, "paraboloid height")?;
    check_positive(shape, "paraboloid shape exponent")?;
    check_slices(slices)?;
    if stacks == 0 {
        return Err(MeshError::DegenerateGeometry(
            "paraboloid stacks must be positive".to_string(),
        ));
    }

    let stacks_by_slices = stacks * slices;
    let bot = stacks_by_slices;
    let top = stacks_by_slices + if solid { 1 } else { 0 };

    let mut points = Vec::with_capacity(top as usize + 1);
    let mut faces = Vec::with_capacity(
        (if solid {
            stacks_by_slices * 2
        } else {
            stacks_by_slices * 2 - slices
        }) as usize,
    );

    let angle_step = TAU / slices as f64;
    let radius_step = radius / stacks as f64;

    let mut cur = 0u32;
    let mut next = stacks;

    for i in 0..slices {
        let (sin, cos) = (i as f64 * angle_step).sin_cos();
        points.push(DVec3::new(cos * radius, sin * radius, 0.0));

        if solid {
            faces.push([cur, bot, next]);
        }

        let mut r = radius;
        for j in 1..stacks {
            r -= radius_step;
            let z = height * (1.0 - (r / radius).powf(shape));
            points.push(DVec3::new(cos * r, sin * r, z));

            faces.push([cur + j, cur + j - 1, next + j - 1]);
            faces.push([cur + j, next + j - 1, next + j]);
        }

        faces.push([cur + stacks - 1, next + stacks - 1, top]);

        cur = next;
        next = (next + stacks) % stacks_by_slices;
    }

    if solid {
        points.push(DVec3::ZERO);
    }
    points.push(DVec3::new(0.0, 0.0, height));

    let mut model = ExplicitModel::new(points, Topology::Triangles(faces));
    model.solid = solid;
    model.skeleton = Some(vec![DVec3::ZERO, DVec3::new(0.0, 0.0, height)]);
    Ok(model)
}

// =============================================================================
// BOX
// =============================================================================

/// Tessellates an axis-aligned box from half-extents: eight corners, six
/// quads, one explicit normal per face.
pub fn cuboid(size: DVec3) -> Result<ExplicitModel, MeshError> {
    if size.min_element() <= 0.0 {
        return Err(MeshError::DegenerateGeometry(format!(
            "box half-extents must be positive: {size}"
        )));
    }

    let points = vec![
        DVec3::new(size.x, -size.y, -size.z),
        DVec3::new(-size.x, -size.y, -size.z),
        DVec3::new(-size.x, size.y, -size.z),
        DVec3::new(size.x, size.y, -size.z),
        DVec3::new(size.x, -size.y, size.z),
        DVec3::new(-size.x, -size.y, size.z),
        DVec3::new(-size.x, size.y, size.z),
        DVec3::new(size.x, size.y, size.z),
    ];
    let faces = vec![
        [0, 1, 2, 3],
        [0, 3, 7, 4],
        [1, 0, 4, 5],
        [2, 1, 5, 6],
        [3, 2, 6, 7],
        [4, 7, 6, 5],
    ];
    let normals = vec![
        DVec3::NEG_Z,
        DVec3::X,
        DVec3::NEG_Y,
        DVec3::NEG_X,
        DVec3::Y,
        DVec3::Z,
    ];

    let mut model = ExplicitModel::new(points, Topology::Quads(faces));
    model.normals = Some(normals);
    model.solid = true;
    model.skeleton = Some(vec![
        DVec3::new(0.0, 0.0, -size.z),
        DVec3::new(0.0, 0.0, size.z),
    ]);
    Ok(model)
}

// =============================================================================
// DISC
// =============================================================================

/// Tessellates a flat disc in the xy plane as a triangle fan around a
/// center vertex, with optional radial UV mapping.
pub fn disc(radius: f64, slices: u32, with_tex: bool) -> Result<ExplicitModel, MeshError> {
    check_positive(radius, "disc radius")?;
    check_slices(slices)?;

    let center = slices;
    let mut points = Vec::with_capacity(slices as usize + 1);
    let mut faces = Vec::with_capacity(slices as usize);
    let mut tex = with_tex.then(|| Vec::with_capacity(slices as usize + 1));

    let angle_step = TAU / slices as f64;
    for i in 0..slices {
        let (sin, cos) = (i as f64 * angle_step).sin_cos();
        points.push(DVec3::new(cos * radius, sin * radius, 0.0));
        if let Some(tex) = tex.as_mut() {
            tex.push(DVec2::new(cos / 2.0 + 0.5, sin / 2.0 + 0.5));
        }
        faces.push([i, (i + 1) % slices, center]);
    }
    points.push(DVec3::ZERO);
    if let Some(tex) = tex.as_mut() {
        tex.push(DVec2::new(0.5, 0.5));
    }

    let mut model = ExplicitModel::new(points, Topology::Triangles(faces));
    model.tex_coords = tex;
    Ok(model)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_counts() {
        let model = sphere(1.0, 8, 6, false).unwrap();
        assert_eq!(model.point_count(), 8 * 5 + 2);
        assert_eq!(model.face_count(), 2 * 8 * 5);
        assert!(model.validate());
        assert!(model.solid);
    }

    #[test]
    fn test_sphere_points_on_radius() {
        let model = sphere(2.5, 12, 7, false).unwrap();
        for p in &model.points {
            assert!((p.length() - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sphere_poles() {
        let model = sphere(1.0, 8, 6, false).unwrap();
        let n = model.point_count();
        assert_eq!(model.points[n - 2], DVec3::new(0.0, 0.0, -1.0));
        assert_eq!(model.points[n - 1], DVec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_sphere_tex_grid() {
        let model = sphere(1.0, 8, 6, true).unwrap();
        let coords = model.tex_coords.as_ref().unwrap();
        assert_eq!(coords.len(), 9 * 7);
        let indices = model.tex_indices.as_ref().unwrap();
        assert_eq!(indices.len(), model.face_count());
        assert!(model.validate());
    }

    #[test]
    fn test_sphere_rejects_flat_input() {
        assert!(sphere(0.0, 8, 6, false).is_err());
        assert!(sphere(1.0, 2, 6, false).is_err());
        assert!(sphere(1.0, 8, 1, false).is_err());
    }

    #[test]
    fn test_cone_counts() {
        let hollow = cone(1.0, 2.0, false, 8).unwrap();
        assert_eq!(hollow.point_count(), 9);
        assert_eq!(hollow.face_count(), 8);

        let solid = cone(1.0, 2.0, true, 8).unwrap();
        assert_eq!(solid.point_count(), 10);
        assert_eq!(solid.face_count(), 16);
        assert!(solid.validate());
    }

    #[test]
    fn test_cylinder_hollow_is_quads() {
        let model = cylinder(2.0, 5.0, false, 4).unwrap();
        assert_eq!(model.point_count(), 8);
        assert!(matches!(model.topology, Topology::Quads(ref q) if q.len() == 4));
    }

    #[test]
    fn test_cylinder_solid_mixed_arity() {
        let model = cylinder(2.0, 5.0, true, 4).unwrap();
        assert_eq!(model.point_count(), 10);
        match &model.topology {
            Topology::Polygons(faces) => {
                assert_eq!(faces.len(), 12);
                assert_eq!(faces.iter().filter(|f| f.len() == 4).count(), 4);
                assert_eq!(faces.iter().filter(|f| f.len() == 3).count(), 8);
            }
            other => panic!("expected polygons, got {other:?}"),
        }
        assert_eq!(
            model.skeleton.as_ref().unwrap().as_slice(),
            &[DVec3::ZERO, DVec3::new(0.0, 0.0, 5.0)]
        );
        assert!(model.validate());
    }

    #[test]
    fn test_frustum_top_ring_tapered() {
        let model = frustum(2.0, 3.0, 0.5, false, 8).unwrap();
        for i in 0..8 {
            let base = model.points[2 * i];
            let top = model.points[2 * i + 1];
            assert!((base.truncate().length() - 2.0).abs() < 1e-12);
            assert!((top.truncate().length() - 1.0).abs() < 1e-12);
            assert_eq!(top.z, 3.0);
        }
    }

    #[test]
    fn test_paraboloid_counts() {
        let solid = paraboloid(1.0, 2.0, 2.0, true, 8, 4).unwrap();
        assert_eq!(solid.point_count(), 8 * 4 + 2);
        assert_eq!(solid.face_count(), 2 * 8 * 4);
        assert!(solid.validate());

        let hollow = paraboloid(1.0, 2.0, 2.0, false, 8, 4).unwrap();
        assert_eq!(hollow.point_count(), 8 * 4 + 1);
        assert_eq!(hollow.face_count(), 2 * 8 * 4 - 8);
        assert!(hollow.validate());
    }

    #[test]
    fn test_paraboloid_profile() {
        let model = paraboloid(2.0, 5.0, 2.0, false, 4, 4).unwrap();
        for p in &model.points {
            let r = p.truncate().length();
            if r > 1e-12 {
                let expected = 5.0 * (1.0 - (r / 2.0).powf(2.0));
                assert!((p.z - expected).abs() < 1e-9, "at r={r}");
            }
        }
    }

    #[test]
    fn test_cuboid_geometry() {
        let model = cuboid(DVec3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(model.point_count(), 8);
        assert_eq!(model.face_count(), 6);
        for p in &model.points {
            assert_eq!(p.x.abs(), 1.0);
            assert_eq!(p.y.abs(), 2.0);
            assert_eq!(p.z.abs(), 3.0);
        }
        assert_eq!(model.normals.as_ref().unwrap().len(), 6);
    }

    #[test]
    fn test_cuboid_faces_axis_aligned() {
        let model = cuboid(DVec3::ONE).unwrap();
        let faces = match &model.topology {
            Topology::Quads(faces) => faces,
            other => panic!("expected quads, got {other:?}"),
        };
        for face in faces {
            let corners: Vec<DVec3> = face.iter().map(|&i| model.points[i as usize]).collect();
            // Each quad lies in a plane parallel to an axis plane: one
            // coordinate is constant across its corners.
            let constant_axis = (0..3).any(|axis| {
                corners
                    .iter()
                    .all(|c| (c[axis] - corners[0][axis]).abs() < 1e-12)
            });
            assert!(constant_axis);
        }
    }

    #[test]
    fn test_disc_fan() {
        let model = disc(2.0, 8, true).unwrap();
        assert_eq!(model.point_count(), 9);
        assert_eq!(model.face_count(), 8);
        let tex = model.tex_coords.as_ref().unwrap();
        assert_eq!(tex.len(), 9);
        assert_eq!(tex[8], DVec2::new(0.5, 0.5));
        assert!((tex[0] - DVec2::new(1.0, 0.5)).length() < 1e-12);
        assert!(model.validate());
    }

    #[test]
    fn test_convex_solids_wind_outward() {
        for model in [
            sphere(1.0, 8, 6, false).unwrap(),
            cone(1.0, 2.0, true, 8).unwrap(),
            paraboloid(1.0, 2.0, 2.0, true, 8, 4).unwrap(),
        ] {
            let centroid =
                model.points.iter().sum::<DVec3>() / model.point_count() as f64;
            let faces = match &model.topology {
                Topology::Triangles(faces) => faces,
                other => panic!("expected triangles, got {other:?}"),
            };
            for face in faces {
                let [a, b, c] = face.map(|i| model.points[i as usize]);
                let normal = (b - a).cross(c - a);
                let outward = (a + b + c) / 3.0 - centroid;
                assert!(
                    normal.dot(outward) > 0.0,
                    "face {face:?} winds inward"
                );
            }
        }
    }
}
