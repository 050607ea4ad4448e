//! # Curve, Patch and Grid Kernels
//!
//! Uniform parameter-space sampling: curves become polylines, patches
//! become quad grids, elevation grids become triangle pairs. Planar inputs
//! are lifted to 3D with `z = 0`.

use glam::{DVec2, DVec3};

use sylva_scene::{
    ExplicitModel, HeightGrid, ParametricCurve2, ParametricCurve3, ParametricPatch, Topology,
};

use crate::error::MeshError;
use crate::texcoord::grid_tex_coords;

// =============================================================================
// CURVES
// =============================================================================

/// Samples a spatial curve into a polyline of `stride + 1` points.
///
/// The final sample is taken exactly at the last knot so the endpoint never
/// drifts with the step accumulation.
pub fn curve3(curve: &dyn ParametricCurve3) -> Result<ExplicitModel, MeshError> {
    let stride = curve.stride();
    if stride == 0 {
        return Err(MeshError::DegenerateGeometry(
            "curve stride must be positive".to_string(),
        ));
    }
    let first = curve.first_knot();
    let step = (curve.last_knot() - first) / stride as f64;

    let mut points = Vec::with_capacity(stride as usize + 1);
    for i in 0..stride {
        points.push(curve.point_at(first + i as f64 * step));
    }
    points.push(curve.point_at(curve.last_knot()));

    Ok(ExplicitModel::new(points, Topology::Polyline))
}

/// Samples a planar curve into a polyline lifted to `z = 0`.
pub fn curve2(curve: &dyn ParametricCurve2) -> Result<ExplicitModel, MeshError> {
    let stride = curve.stride();
    if stride == 0 {
        return Err(MeshError::DegenerateGeometry(
            "curve stride must be positive".to_string(),
        ));
    }
    let first = curve.first_knot();
    let step = (curve.last_knot() - first) / stride as f64;

    let mut points = Vec::with_capacity(stride as usize + 1);
    for i in 0..stride {
        let p = curve.point_at(first + i as f64 * step);
        points.push(DVec3::new(p.x, p.y, 0.0));
    }
    let p = curve.point_at(curve.last_knot());
    points.push(DVec3::new(p.x, p.y, 0.0));

    Ok(ExplicitModel::new(points, Topology::Polyline))
}

/// Lifts a planar polyline to `z = 0`.
pub fn polyline2(points: &[DVec2]) -> Result<ExplicitModel, MeshError> {
    if points.is_empty() {
        return Err(MeshError::EmptyProfile("empty polyline".to_string()));
    }
    let lifted = points.iter().map(|p| DVec3::new(p.x, p.y, 0.0)).collect();
    Ok(ExplicitModel::new(lifted, Topology::Polyline))
}

/// Lifts a planar point set to `z = 0`.
pub fn point_set2(points: &[DVec2]) -> Result<ExplicitModel, MeshError> {
    if points.is_empty() {
        return Err(MeshError::EmptyProfile("empty point set".to_string()));
    }
    let lifted = points.iter().map(|p| DVec3::new(p.x, p.y, 0.0)).collect();
    Ok(ExplicitModel::new(lifted, Topology::Points))
}

// =============================================================================
// PATCHES
// =============================================================================

/// Samples a parametric patch on its `u_stride x v_stride` grid.
///
/// # Topology
///
/// `u_stride * v_stride` points in u-major rows of length `v_stride`, and
/// `(u_stride - 1) * (v_stride - 1)` quads. When `with_tex` is set the
/// arc-length UV grid is attached with shared indices.
pub fn patch(surface: &dyn ParametricPatch, with_tex: bool) -> Result<ExplicitModel, MeshError> {
    let u_stride = surface.u_stride() as usize;
    let v_stride = surface.v_stride() as usize;
    if u_stride < 2 || v_stride < 2 {
        return Err(MeshError::DegenerateGeometry(format!(
            "patch strides must be at least 2: ({u_stride}, {v_stride})"
        )));
    }

    let u_first = surface.first_u_knot();
    let u_span = surface.last_u_knot() - u_first;
    let v_first = surface.first_v_knot();
    let v_span = surface.last_v_knot() - v_first;

    let mut points = Vec::with_capacity(u_stride * v_stride);
    let mut faces = Vec::with_capacity((u_stride - 1) * (v_stride - 1));
    let row = v_stride as u32;

    for i in 0..u_stride {
        let u = u_first + u_span * i as f64 / (u_stride - 1) as f64;
        for j in 0..v_stride {
            let v = v_first + v_span * j as f64 / (v_stride - 1) as f64;
            points.push(surface.point_at(u, v));

            if i + 1 < u_stride && j + 1 < v_stride {
                let cur = (i * v_stride + j) as u32;
                faces.push([cur, cur + 1, cur + row + 1, cur + row]);
            }
        }
    }

    let mut model = ExplicitModel::new(points, Topology::Quads(faces));
    model.ccw = surface.ccw();
    if with_tex {
        model.tex_coords = Some(grid_tex_coords(&model.points, u_stride, v_stride));
    }
    Ok(model)
}

// =============================================================================
// ELEVATION GRID
// =============================================================================

/// Samples a height grid into two triangles per cell.
pub fn elevation(grid: &dyn HeightGrid, with_tex: bool) -> Result<ExplicitModel, MeshError> {
    let x_dim = grid.x_dim() as usize;
    let y_dim = grid.y_dim() as usize;
    if x_dim < 2 || y_dim < 2 {
        return Err(MeshError::DegenerateGeometry(format!(
            "elevation grid needs at least 2x2 samples: ({x_dim}, {y_dim})"
        )));
    }

    let mut points = Vec::with_capacity(x_dim * y_dim);
    let mut faces = Vec::with_capacity((x_dim - 1) * (y_dim - 1) * 2);
    let row = x_dim as u32;

    for j in 0..y_dim {
        for i in 0..x_dim {
            points.push(grid.point_at(i as u32, j as u32));

            if i + 1 < x_dim && j + 1 < y_dim {
                let cur = (j * x_dim + i) as u32;
                let next = cur + 1;
                faces.push([cur, next, cur + row]);
                faces.push([next, next + row, cur + row]);
            }
        }
    }

    let mut model = ExplicitModel::new(points, Topology::Triangles(faces));
    model.ccw = grid.ccw();
    if with_tex {
        model.tex_coords = Some(grid_tex_coords(&model.points, y_dim, x_dim));
    }
    Ok(model)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sylva_scene::{BezierCurve2, BezierCurve3, BezierPatch, ElevationGrid};

    #[test]
    fn test_curve3_sample_count_and_endpoints() {
        let curve = BezierCurve3::with_stride(
            vec![DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0), DVec3::new(2.0, 0.0, 0.0)],
            10,
        )
        .unwrap();
        let model = curve3(&curve).unwrap();
        assert_eq!(model.point_count(), 11);
        assert!(matches!(model.topology, Topology::Polyline));
        assert!((model.points[0] - DVec3::ZERO).length() < 1e-12);
        assert!((model.points[10] - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_curve2_lifts_to_z0() {
        let curve = BezierCurve2::with_stride(
            vec![DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0)],
            4,
        )
        .unwrap();
        let model = curve2(&curve).unwrap();
        assert_eq!(model.point_count(), 5);
        assert!(model.points.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_polyline2_preserves_order() {
        let model =
            polyline2(&[DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0), DVec2::new(0.0, 1.0)])
                .unwrap();
        assert_eq!(model.point_count(), 3);
        assert_eq!(model.points[2], DVec3::new(0.0, 1.0, 0.0));
        assert!(polyline2(&[]).is_err());
    }

    #[test]
    fn test_point_set2_topology() {
        let model = point_set2(&[DVec2::ZERO, DVec2::ONE]).unwrap();
        assert!(matches!(model.topology, Topology::Points));
    }

    fn flat_patch(u: u32, v: u32) -> BezierPatch {
        let grid: Vec<Vec<DVec3>> = (0..3)
            .map(|i| (0..3).map(|j| DVec3::new(i as f64, j as f64, 0.0)).collect())
            .collect();
        BezierPatch::with_strides(grid, u, v).unwrap()
    }

    #[test]
    fn test_patch_grid_counts() {
        let model = patch(&flat_patch(3, 3), false).unwrap();
        assert_eq!(model.point_count(), 9);
        assert_eq!(model.face_count(), 4);
        assert!(model.points.iter().all(|p| p.z.abs() < 1e-9));
        assert!(model.validate());
    }

    #[test]
    fn test_patch_rectangular_strides() {
        // Row stride must follow the v direction for non-square grids.
        let model = patch(&flat_patch(4, 3), false).unwrap();
        assert_eq!(model.point_count(), 12);
        assert_eq!(model.face_count(), 6);
        assert!(model.validate());
        match &model.topology {
            Topology::Quads(faces) => assert_eq!(faces[0], [0, 1, 4, 3]),
            other => panic!("expected quads, got {other:?}"),
        }
    }

    #[test]
    fn test_patch_tex_coords_are_shared() {
        let model = patch(&flat_patch(3, 4), true).unwrap();
        let coords = model.tex_coords.as_ref().unwrap();
        assert_eq!(coords.len(), model.point_count());
        assert!(model.tex_indices.is_none());
        assert!(model.validate());
    }

    #[test]
    fn test_elevation_counts() {
        let grid = ElevationGrid::new(
            vec![vec![0.0, 1.0, 0.5], vec![0.3, 0.8, 0.1], vec![0.0, 0.2, 0.4]],
            1.0,
            1.0,
        )
        .unwrap();
        let model = elevation(&grid, false).unwrap();
        assert_eq!(model.point_count(), 9);
        assert_eq!(model.face_count(), 8);
        assert!(model.validate());
    }

    #[test]
    fn test_elevation_heights_sampled() {
        let grid =
            ElevationGrid::new(vec![vec![0.0, 0.0], vec![0.0, 7.0]], 2.0, 2.0).unwrap();
        let model = elevation(&grid, false).unwrap();
        // Point at grid (1, 1) carries the height 7 at (2, 2).
        assert!(model
            .points
            .iter()
            .any(|p| (*p - DVec3::new(2.0, 2.0, 7.0)).length() < 1e-12));
    }
}
