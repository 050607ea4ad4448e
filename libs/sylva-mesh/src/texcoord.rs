//! # Texture-Coordinate Synthesis
//!
//! Arc-length-parameterized UVs for grid-sampled surfaces (patches,
//! elevation grids). Each row and column is normalized by its own cumulative
//! chord length, so UVs stay even where parameter-space sampling is not.

use glam::{DVec2, DVec3};

use config::constants::EPSILON;

/// Computes a UV grid over `grid_w * grid_h` points.
///
/// Points are laid out row-major: the point at row `u`, column `v` sits at
/// index `u * grid_h + v`. The v coordinate of each point is its cumulative
/// chord length along its row divided by the row's total length; the u
/// coordinate is computed symmetrically along columns. Rows or columns with
/// no extent get coordinate zero.
///
/// ## Example
///
/// ```rust
/// use glam::DVec3;
/// use sylva_mesh::texcoord::grid_tex_coords;
///
/// // A 2x2 unit square grid.
/// let points = vec![
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(0.0, 1.0, 0.0),
///     DVec3::new(1.0, 0.0, 0.0),
///     DVec3::new(1.0, 1.0, 0.0),
/// ];
/// let uvs = grid_tex_coords(&points, 2, 2);
/// assert_eq!(uvs[3], glam::DVec2::new(1.0, 1.0));
/// ```
pub fn grid_tex_coords(points: &[DVec3], grid_w: usize, grid_h: usize) -> Vec<DVec2> {
    debug_assert_eq!(points.len(), grid_w * grid_h);
    let mut tex = vec![DVec2::ZERO; grid_w * grid_h];

    // v coordinate: cumulative length along each row.
    for u in 0..grid_w {
        let row = u * grid_h;
        let mut total = 0.0;
        for v in 1..grid_h {
            total += (points[row + v] - points[row + v - 1]).length();
        }
        if total < EPSILON {
            continue;
        }
        let mut running = 0.0;
        for v in 1..grid_h {
            running += (points[row + v] - points[row + v - 1]).length();
            tex[row + v].y = running / total;
        }
    }

    // u coordinate: cumulative length along each column.
    for v in 0..grid_h {
        let mut total = 0.0;
        for u in 1..grid_w {
            total += (points[u * grid_h + v] - points[(u - 1) * grid_h + v]).length();
        }
        if total < EPSILON {
            continue;
        }
        let mut running = 0.0;
        for u in 1..grid_w {
            running += (points[u * grid_h + v] - points[(u - 1) * grid_h + v]).length();
            tex[u * grid_h + v].x = running / total;
        }
    }

    tex
}

// =============================================================================
// TESTS
// =============================================================================
