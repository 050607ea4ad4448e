//! # Parametric Patches and Grids
//!
//! Surface sampling traits consumed by the discretizer, plus the Bézier and
//! NURBS tensor-product patches and the elevation grid reference types.

use std::fmt;

use glam::DVec3;

use crate::basis::{basis_funs, find_span};
use crate::error::SceneError;
use config::constants::DEFAULT_STRIDE;

// =============================================================================
// SAMPLING TRAITS
// =============================================================================

/// A parametric surface sampled on a uniform `u_stride x v_stride` grid.
pub trait ParametricPatch: fmt::Debug {
    /// Number of sample points in the u direction.
    fn u_stride(&self) -> u32;

    /// Number of sample points in the v direction.
    fn v_stride(&self) -> u32;

    /// Start of the u domain.
    fn first_u_knot(&self) -> f64 {
        0.0
    }

    /// End of the u domain.
    fn last_u_knot(&self) -> f64 {
        1.0
    }

    /// Start of the v domain.
    fn first_v_knot(&self) -> f64 {
        0.0
    }

    /// End of the v domain.
    fn last_v_knot(&self) -> f64 {
        1.0
    }

    /// Point on the surface at `(u, v)`.
    fn point_at(&self, u: f64, v: f64) -> DVec3;

    /// Winding orientation requested for the tessellation.
    fn ccw(&self) -> bool {
        true
    }
}

/// A regular height field sampled by integer cell coordinates.
pub trait HeightGrid: fmt::Debug {
    /// Number of samples along x.
    fn x_dim(&self) -> u32;

    /// Number of samples along y.
    fn y_dim(&self) -> u32;

    /// World-space point at grid coordinates `(i, j)`.
    fn point_at(&self, i: u32, j: u32) -> DVec3;

    /// Winding orientation requested for the tessellation.
    fn ccw(&self) -> bool {
        true
    }
}

// =============================================================================
// BEZIER PATCH
// =============================================================================

fn de_casteljau(ctrl: &mut Vec<DVec3>, t: f64) -> DVec3 {
    for level in (1..ctrl.len()).rev() {
        for i in 0..level {
            ctrl[i] = ctrl[i].lerp(ctrl[i + 1], t);
        }
    }
    ctrl[0]
}

/// A tensor-product Bézier patch.
///
/// Control points are stored row-major: `ctrl[i][j]` is the point at u-row
/// `i`, v-column `j`.
#[derive(Debug, Clone)]
pub struct BezierPatch {
    ctrl: Vec<Vec<DVec3>>,
    u_stride: u32,
    v_stride: u32,
    ccw: bool,
}

impl BezierPatch {
    /// Creates a patch with the default stride in both directions.
    ///
    /// Fails when the grid is smaller than 2x2 or its rows are ragged.
    pub fn new(ctrl: Vec<Vec<DVec3>>) -> Result<Self, SceneError> {
        Self::with_strides(ctrl, DEFAULT_STRIDE, DEFAULT_STRIDE)
    }

    /// Creates a patch with explicit per-direction sample counts.
    pub fn with_strides(
        ctrl: Vec<Vec<DVec3>>,
        u_stride: u32,
        v_stride: u32,
    ) -> Result<Self, SceneError> {
        if ctrl.len() < 2 || ctrl[0].len() < 2 {
            return Err(SceneError::InvalidPatch(
                "Bezier patch needs at least a 2x2 control grid".to_string(),
            ));
        }
        let width = ctrl[0].len();
        if ctrl.iter().any(|row| row.len() != width) {
            return Err(SceneError::InvalidPatch(
                "Bezier patch control grid has ragged rows".to_string(),
            ));
        }
        if u_stride < 2 || v_stride < 2 {
            return Err(SceneError::InvalidPatch(
                "patch strides must be at least 2".to_string(),
            ));
        }
        Ok(Self {
            ctrl,
            u_stride,
            v_stride,
            ccw: true,
        })
    }

    /// Sets the requested winding orientation.
    pub fn with_ccw(mut self, ccw: bool) -> Self {
        self.ccw = ccw;
        self
    }
}

impl ParametricPatch for BezierPatch {
    fn u_stride(&self) -> u32 {
        self.u_stride
    }

    fn v_stride(&self) -> u32 {
        self.v_stride
    }

    fn point_at(&self, u: f64, v: f64) -> DVec3 {
        // Collapse each row at v, then the resulting column at u.
        let mut column: Vec<DVec3> = self
            .ctrl
            .iter()
            .map(|row| de_casteljau(&mut row.clone(), v))
            .collect();
        de_casteljau(&mut column, u)
    }

    fn ccw(&self) -> bool {
        self.ccw
    }
}

// =============================================================================
// NURBS PATCH
// =============================================================================

/// A tensor-product NURBS patch.
///
/// Control points and weights are stored row-major (`ctrl[i][j]`: u-row `i`,
/// v-column `j`); each direction carries its own degree and knot vector.
#[derive(Debug, Clone)]
pub struct NurbsPatch {
    ctrl: Vec<Vec<DVec3>>,
    weights: Vec<Vec<f64>>,
    u_knots: Vec<f64>,
    v_knots: Vec<f64>,
    u_degree: usize,
    v_degree: usize,
    u_stride: u32,
    v_stride: u32,
    ccw: bool,
}

impl NurbsPatch {
    /// Creates a patch with the default stride in both directions.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctrl: Vec<Vec<DVec3>>,
        weights: Vec<Vec<f64>>,
        u_knots: Vec<f64>,
        v_knots: Vec<f64>,
        u_degree: usize,
        v_degree: usize,
    ) -> Result<Self, SceneError> {
        Self::with_strides(
            ctrl,
            weights,
            u_knots,
            v_knots,
            u_degree,
            v_degree,
            DEFAULT_STRIDE,
            DEFAULT_STRIDE,
        )
    }

    /// Creates a patch with explicit per-direction sample counts.
    #[allow(clippy::too_many_arguments)]
    pub fn with_strides(
        ctrl: Vec<Vec<DVec3>>,
        weights: Vec<Vec<f64>>,
        u_knots: Vec<f64>,
        v_knots: Vec<f64>,
        u_degree: usize,
        v_degree: usize,
        u_stride: u32,
        v_stride: u32,
    ) -> Result<Self, SceneError> {
        let rows = ctrl.len();
        if rows == 0 || ctrl[0].is_empty() {
            return Err(SceneError::InvalidPatch("empty control grid".to_string()));
        }
        let cols = ctrl[0].len();
        if ctrl.iter().any(|row| row.len() != cols) {
            return Err(SceneError::InvalidPatch(
                "NURBS patch control grid has ragged rows".to_string(),
            ));
        }
        if weights.len() != rows || weights.iter().any(|row| row.len() != cols) {
            return Err(SceneError::InvalidPatch(
                "weight grid does not match control grid".to_string(),
            ));
        }
        if u_degree == 0 || v_degree == 0 || rows <= u_degree || cols <= v_degree {
            return Err(SceneError::InvalidPatch(format!(
                "degrees ({u_degree}, {v_degree}) incompatible with a {rows}x{cols} grid"
            )));
        }
        if u_knots.len() != rows + u_degree + 1 || v_knots.len() != cols + v_degree + 1 {
            return Err(SceneError::InvalidPatch(
                "knot vectors do not match grid dimensions and degrees".to_string(),
            ));
        }
        if u_stride < 2 || v_stride < 2 {
            return Err(SceneError::InvalidPatch(
                "patch strides must be at least 2".to_string(),
            ));
        }
        Ok(Self {
            ctrl,
            weights,
            u_knots,
            v_knots,
            u_degree,
            v_degree,
            u_stride,
            v_stride,
            ccw: true,
        })
    }

    /// Sets the requested winding orientation.
    pub fn with_ccw(mut self, ccw: bool) -> Self {
        self.ccw = ccw;
        self
    }
}

impl ParametricPatch for NurbsPatch {
    fn u_stride(&self) -> u32 {
        self.u_stride
    }

    fn v_stride(&self) -> u32 {
        self.v_stride
    }

    fn first_u_knot(&self) -> f64 {
        self.u_knots[self.u_degree]
    }

    fn last_u_knot(&self) -> f64 {
        self.u_knots[self.u_knots.len() - 1 - self.u_degree]
    }

    fn first_v_knot(&self) -> f64 {
        self.v_knots[self.v_degree]
    }

    fn last_v_knot(&self) -> f64 {
        self.v_knots[self.v_knots.len() - 1 - self.v_degree]
    }

    fn point_at(&self, u: f64, v: f64) -> DVec3 {
        let u = u.clamp(self.first_u_knot(), self.last_u_knot());
        let v = v.clamp(self.first_v_knot(), self.last_v_knot());
        let u_span = find_span(self.u_degree, self.ctrl.len(), &self.u_knots, u);
        let v_span = find_span(self.v_degree, self.ctrl[0].len(), &self.v_knots, v);
        let u_funs = basis_funs(u_span, u, self.u_degree, &self.u_knots);
        let v_funs = basis_funs(v_span, v, self.v_degree, &self.v_knots);
        let mut numerator = DVec3::ZERO;
        let mut denominator = 0.0;
        for (r, u_fun) in u_funs.iter().enumerate() {
            let i = u_span - self.u_degree + r;
            for (s, v_fun) in v_funs.iter().enumerate() {
                let j = v_span - self.v_degree + s;
                let w = u_fun * v_fun * self.weights[i][j];
                numerator += self.ctrl[i][j] * w;
                denominator += w;
            }
        }
        numerator / denominator
    }

    fn ccw(&self) -> bool {
        self.ccw
    }
}

// =============================================================================
// ELEVATION GRID
// =============================================================================

/// A regular height field: `heights[i][j]` above the xy plane at
/// `(i * x_spacing, j * y_spacing)`.
#[derive(Debug, Clone)]
pub struct ElevationGrid {
    heights: Vec<Vec<f64>>,
    x_spacing: f64,
    y_spacing: f64,
    ccw: bool,
}

impl ElevationGrid {
    /// Creates a grid from heights and cell spacing.
    ///
    /// Fails when the grid is smaller than 2x2, ragged, or the spacing is
    /// not positive.
    pub fn new(
        heights: Vec<Vec<f64>>,
        x_spacing: f64,
        y_spacing: f64,
    ) -> Result<Self, SceneError> {
        if heights.len() < 2 || heights[0].len() < 2 {
            return Err(SceneError::InvalidProfile(
                "elevation grid needs at least 2x2 samples".to_string(),
            ));
        }
        let width = heights[0].len();
        if heights.iter().any(|row| row.len() != width) {
            return Err(SceneError::InvalidProfile(
                "elevation grid has ragged rows".to_string(),
            ));
        }
        if x_spacing <= 0.0 || y_spacing <= 0.0 {
            return Err(SceneError::InvalidProfile(format!(
                "grid spacing must be positive: ({x_spacing}, {y_spacing})"
            )));
        }
        Ok(Self {
            heights,
            x_spacing,
            y_spacing,
            ccw: true,
        })
    }

    /// Sets the requested winding orientation.
    pub fn with_ccw(mut self, ccw: bool) -> Self {
        self.ccw = ccw;
        self
    }
}

impl HeightGrid for ElevationGrid {
    fn x_dim(&self) -> u32 {
        self.heights.len() as u32
    }

    fn y_dim(&self) -> u32 {
        self.heights[0].len() as u32
    }

    fn point_at(&self, i: u32, j: u32) -> DVec3 {
        DVec3::new(
            i as f64 * self.x_spacing,
            j as f64 * self.y_spacing,
            self.heights[i as usize][j as usize],
        )
    }

    fn ccw(&self) -> bool {
        self.ccw
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid(width: usize, height: usize) -> Vec<Vec<DVec3>> {
        (0..width)
            .map(|i| {
                (0..height)
                    .map(|j| DVec3::new(i as f64, j as f64, 0.0))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_bezier_patch_corners() {
        let patch = BezierPatch::with_strides(flat_grid(3, 3), 3, 3).unwrap();
        assert!((patch.point_at(0.0, 0.0) - DVec3::ZERO).length() < 1e-12);
        assert!((patch.point_at(1.0, 1.0) - DVec3::new(2.0, 2.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_bezier_patch_flat_stays_flat() {
        let patch = BezierPatch::new(flat_grid(4, 3)).unwrap();
        for &u in &[0.1, 0.4, 0.9] {
            for &v in &[0.2, 0.6, 0.8] {
                assert!(patch.point_at(u, v).z.abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_bezier_patch_rejects_ragged_grid() {
        let mut grid = flat_grid(3, 3);
        grid[1].pop();
        assert!(BezierPatch::new(grid).is_err());
    }

    #[test]
    fn test_nurbs_patch_degree_one_interpolates() {
        let patch = NurbsPatch::with_strides(
            flat_grid(2, 2),
            vec![vec![1.0; 2]; 2],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
            1,
            1,
            2,
            2,
        )
        .unwrap();
        assert!((patch.point_at(0.0, 1.0) - DVec3::new(0.0, 1.0, 0.0)).length() < 1e-12);
        assert!((patch.point_at(0.5, 0.5) - DVec3::new(0.5, 0.5, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_nurbs_patch_validation() {
        assert!(NurbsPatch::new(
            flat_grid(2, 2),
            vec![vec![1.0; 2]; 1],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
            1,
            1,
        )
        .is_err());
    }

    #[test]
    fn test_elevation_grid_points() {
        let grid =
            ElevationGrid::new(vec![vec![0.0, 1.0], vec![2.0, 3.0]], 2.0, 3.0).unwrap();
        assert_eq!(grid.x_dim(), 2);
        assert_eq!(grid.y_dim(), 2);
        assert_eq!(grid.point_at(1, 1), DVec3::new(2.0, 3.0, 3.0));
    }

    #[test]
    fn test_elevation_grid_rejects_bad_spacing() {
        assert!(ElevationGrid::new(vec![vec![0.0, 0.0], vec![0.0, 0.0]], 0.0, 1.0).is_err());
    }
}
