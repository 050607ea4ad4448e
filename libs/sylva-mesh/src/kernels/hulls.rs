//! # Hull Kernels
//!
//! The asymmetric hull (four quadrants fanned toward two apices) and the
//! extruded hull (a horizontal profile swept between two apices along a
//! vertical silhouette).

use std::f64::consts::TAU;

use glam::{DVec2, DVec3};

use sylva_scene::{ExplicitModel, Topology};

use crate::error::MeshError;
use config::constants::{EPSILON, GEOM_TOLERANCE};

// =============================================================================
// ASYMMETRIC HULL
// =============================================================================

/// Parameters of the asymmetric hull kernel.
///
/// Four peripheral radii and heights (one per half axis) describe the
/// equator; `bottom`/`top` are the apices the equator fans toward, with
/// `(r / R)^shape` height interpolation along each fan.
#[derive(Debug, Clone)]
pub struct AsymmetricHullSpec {
    /// Peripheral radius on +x.
    pub pos_x_radius: f64,
    /// Peripheral radius on -x.
    pub neg_x_radius: f64,
    /// Peripheral radius on +y.
    pub pos_y_radius: f64,
    /// Peripheral radius on -y.
    pub neg_y_radius: f64,
    /// Peripheral height on +x.
    pub pos_x_height: f64,
    /// Peripheral height on -x.
    pub neg_x_height: f64,
    /// Peripheral height on +y.
    pub pos_y_height: f64,
    /// Peripheral height on -y.
    pub neg_y_height: f64,
    /// Bottom apex.
    pub bottom: DVec3,
    /// Top apex.
    pub top: DVec3,
    /// Shape exponent of the lower fans.
    pub bottom_shape: f64,
    /// Shape exponent of the upper fans.
    pub top_shape: f64,
    /// Slices per quadrant.
    pub slices: u32,
    /// Stacks per fan.
    pub stacks: u32,
}

/// Offset from `apex` along the cylindrical direction of `delta`, with the
/// height scaled by `(r / total radius)^shape`.
fn fan_point(apex: DVec3, delta: DVec3, r: f64, shape: f64) -> DVec3 {
    let radial = delta.truncate();
    let total = radial.length();
    if total < EPSILON {
        // Peripheral point sits straight under the apex.
        return apex - DVec3::new(0.0, 0.0, delta.z * if r > 0.0 { 1.0 } else { 0.0 });
    }
    let theta = radial.y.atan2(radial.x);
    let z = delta.z * (r / total).powf(shape);
    apex - DVec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Tessellates an asymmetric hull.
///
/// # Topology
///
/// `4 * slices` peripheral columns of `2 * stacks - 1` points plus the two
/// apices; `2 * (2 * stacks - 1) * 4 * slices` triangles. The peripheral
/// height between two half axes blends as `z1 * cos²θ + z2 * sin²θ`.
pub fn asymmetric_hull(spec: &AsymmetricHullSpec) -> Result<ExplicitModel, MeshError> {
    if spec.slices == 0 || spec.stacks == 0 {
        return Err(MeshError::DegenerateGeometry(format!(
            "hull slices and stacks must be positive: ({}, {})",
            spec.slices, spec.stacks
        )));
    }

    let total_slices = spec.slices * 4;
    let ring_count = spec.stacks * 2 - 1;
    let bot = total_slices * ring_count;
    let top = bot + 1;

    let mut points = Vec::with_capacity(top as usize + 1);
    let mut faces = Vec::with_capacity((ring_count * total_slices * 2) as usize);

    let az_step = TAU / total_slices as f64;
    let mut az: f64 = 0.0;

    let mut cur = 0u32;
    let mut next = ring_count;

    let quadrants = [
        (spec.pos_x_radius, spec.pos_y_radius, spec.pos_x_height, spec.pos_y_height),
        (spec.neg_x_radius, spec.pos_y_radius, spec.neg_x_height, spec.pos_y_height),
        (spec.neg_x_radius, spec.neg_y_radius, spec.neg_x_height, spec.neg_y_height),
        (spec.pos_x_radius, spec.neg_y_radius, spec.pos_x_height, spec.neg_y_height),
    ];

    for (radius1, radius2, z1, z2) in quadrants {
        for _ in 0..spec.slices {
            let (sin_az, cos_az) = az.sin_cos();

            // Peripheral point; the height blends the two half-axis heights.
            let peripheral = DVec3::new(
                cos_az * radius1,
                sin_az * radius2,
                z1 * cos_az * cos_az + z2 * sin_az * sin_az,
            );

            faces.push([cur, bot, next]);

            // Lower fan, walking from the bottom apex out to the periphery.
            let delta_bot = spec.bottom - peripheral;
            let r_step_bot = delta_bot.truncate().length() / spec.stacks as f64;
            let mut r = 0.0;
            for j in 0..spec.stacks - 1 {
                r += r_step_bot;
                points.push(fan_point(spec.bottom, delta_bot, r, spec.bottom_shape));

                faces.push([cur + j, next + j, next + j + 1]);
                faces.push([cur + j, next + j + 1, cur + j + 1]);
            }

            points.push(peripheral);

            // Upper fan, walking from the periphery in toward the top apex.
            let delta_top = spec.top - peripheral;
            let r_total_top = delta_top.truncate().length();
            let r_step_top = r_total_top / spec.stacks as f64;
            let mut r = r_total_top;
            for j in 0..spec.stacks - 1 {
                r -= r_step_top;
                points.push(fan_point(spec.top, delta_top, r, spec.top_shape));

                faces.push([
                    cur + spec.stacks - 1 + j,
                    next + spec.stacks - 1 + j,
                    next + spec.stacks + j,
                ]);
                faces.push([
                    cur + spec.stacks - 1 + j,
                    next + spec.stacks + j,
                    cur + spec.stacks + j,
                ]);
            }

            faces.push([cur + ring_count - 1, next + ring_count - 1, top]);

            cur = next;
            next = (next + ring_count) % bot;
            az += az_step;
        }
    }

    points.push(spec.bottom);
    points.push(spec.top);

    let mut model = ExplicitModel::new(points, Topology::Triangles(faces));
    model.solid = true;
    model.skeleton = Some(vec![spec.bottom, spec.top]);
    Ok(model)
}

// =============================================================================
// EXTRUDED HULL
// =============================================================================

/// Walks a vertical-profile chain to the point at arc fraction `t`.
///
/// When the chain itself defines the stack count its own vertices are used
/// directly; otherwise the point is interpolated by cumulative arc length,
/// skipping numerically empty segments.
fn chain_point(
    vertical: &[DVec3],
    chain: &[usize],
    total_len: f64,
    stacks: u32,
    i_stacks: u32,
) -> DVec3 {
    if chain.len() as u32 - 1 == stacks {
        return vertical[chain[i_stacks as usize]];
    }
    let t = i_stacks as f64 / stacks as f64;
    let mut accumulated = 0.0;
    for w in chain.windows(2) {
        let a = vertical[w[0]];
        let b = vertical[w[1]];
        let fraction = (b - a).length() / total_len;
        if fraction <= GEOM_TOLERANCE {
            continue;
        }
        if accumulated + fraction >= t {
            let s = (t - accumulated) / fraction;
            return a.lerp(b, s);
        }
        accumulated += fraction;
    }
    vertical[chain[chain.len() - 1]]
}

/// Sweeps a horizontal profile between the extremes of a vertical profile.
///
/// The vertical profile is split at its y-min and y-max into two chains;
/// each stack interpolates a point pair `(p1, p2)` along them, and the
/// horizontal profile is scaled by `|p2 - p1| / width`, rotated so its
/// x axis aligns with `p2 - p1`, and translated to the pair's midpoint.
/// A bottom fan and a top fan close the hull at the two extremes.
pub fn extruded_hull(
    horizontal: &[DVec3],
    vertical: &[DVec3],
    ccw: bool,
) -> Result<ExplicitModel, MeshError> {
    let h_size = horizontal.len();
    if h_size < 3 {
        return Err(MeshError::EmptyProfile(format!(
            "horizontal profile has {h_size} points"
        )));
    }
    let v_size = vertical.len();
    if v_size < 3 {
        return Err(MeshError::EmptyProfile(format!(
            "vertical profile has {v_size} points"
        )));
    }

    let x_min = horizontal.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let x_max = horizontal.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let y_min = horizontal.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let y_max = horizontal.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    let width = x_max - x_min;
    if width < GEOM_TOLERANCE {
        return Err(MeshError::DegenerateGeometry(
            "horizontal profile has no x extent".to_string(),
        ));
    }
    let x_center = (x_max + x_min) / 2.0;
    let y_center = (y_max + y_min) / 2.0;

    // Split the vertical profile at its y extremes.
    let mut ndx_bot = 0;
    let mut ndx_top = 0;
    for (i, p) in vertical.iter().enumerate() {
        if p.y < vertical[ndx_bot].y {
            ndx_bot = i;
        }
        if p.y >= vertical[ndx_top].y {
            ndx_top = i;
        }
    }
    if ndx_bot == ndx_top {
        return Err(MeshError::DegenerateGeometry(
            "vertical profile has no y extent".to_string(),
        ));
    }

    let mut chain1 = Vec::new();
    let mut len1 = 0.0;
    let mut i = ndx_bot;
    while i != ndx_top {
        chain1.push(i);
        let j = (i + 1) % v_size;
        len1 += (vertical[i] - vertical[j]).length();
        i = j;
    }
    chain1.push(ndx_top);

    let mut chain2 = Vec::new();
    let mut len2 = 0.0;
    let mut i = ndx_bot;
    while i != ndx_top {
        chain2.push(i);
        let j = if i == 0 { v_size - 1 } else { i - 1 };
        len2 += (vertical[i] - vertical[j]).length();
        i = j;
    }
    chain2.push(ndx_top);

    let stacks = (chain1.len().max(chain2.len()) - 1) as u32;
    if stacks < 2 || len1 < GEOM_TOLERANCE || len2 < GEOM_TOLERANCE {
        return Err(MeshError::DegenerateGeometry(
            "vertical profile is too coarse to split into stacks".to_string(),
        ));
    }

    let rings = stacks - 1;
    let bot_index = rings * h_size as u32;
    let top_index = bot_index + 1;

    let mut points = Vec::with_capacity(bot_index as usize + 2);
    let mut faces = Vec::with_capacity((rings * h_size as u32 * 2) as usize);

    for h in 0..h_size as u32 {
        faces.push([h, bot_index, (h + 1) % h_size as u32]);
    }

    let mut cur = 0u32;
    for i_stacks in 1..stacks {
        let p1 = chain_point(vertical, &chain1, len1, stacks, i_stacks);
        let p2 = chain_point(vertical, &chain2, len2, stacks, i_stacks);

        let mut p12 = (p2 - p1).truncate();
        if p12.x < EPSILON {
            p12 = -p12;
        }
        let norm = p12.length();
        if norm < GEOM_TOLERANCE {
            return Err(MeshError::DegenerateGeometry(format!(
                "vertical chains meet at stack {i_stacks}"
            )));
        }
        let cos_a = p12.x / norm;
        let sin_a = p12.y / norm;
        let sf = norm / width;
        let mid = DVec2::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0);

        for h in 0..h_size as u32 {
            let p = horizontal[h as usize];
            let dx = p.x - x_center;
            let dy = p.y - y_center;
            points.push(DVec3::new(
                cos_a * sf * dx + mid.x,
                sf * dy + y_center,
                sin_a * sf * dx + mid.y,
            ));

            let hn = (h + 1) % h_size as u32;
            if i_stacks != stacks - 1 {
                faces.push([cur + h, cur + hn, cur + hn + h_size as u32]);
                faces.push([cur + h, cur + hn + h_size as u32, cur + h + h_size as u32]);
            } else {
                faces.push([cur + h, cur + hn, top_index]);
            }
        }
        cur += h_size as u32;
    }

    points.push(DVec3::new(vertical[ndx_bot].x, y_center, vertical[ndx_bot].y));
    points.push(DVec3::new(vertical[ndx_top].x, y_center, vertical[ndx_top].y));

    let skeleton = vec![points[bot_index as usize], points[top_index as usize]];
    let mut model = ExplicitModel::new(points, Topology::Triangles(faces));
    model.ccw = ccw;
    model.solid = true;
    model.skeleton = Some(skeleton);
    Ok(model)
}

// =============================================================================
// TESTS
// =============================================================================
