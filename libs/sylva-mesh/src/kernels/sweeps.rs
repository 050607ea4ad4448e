//! # Sweep Kernels
//!
//! Surfaces generated by moving a profile: revolution around the z axis,
//! swung interpolation of keyed profiles, and generalized extrusion of a
//! cross-section along an axis curve.

use std::f64::consts::TAU;

use glam::{DMat3, DVec2, DVec3};

use sylva_scene::{
    ExplicitModel, ParametricCurve3, ProfileInterpolation, ProfileTransformation, Topology,
};

use crate::error::MeshError;
use config::constants::EPSILON;

// =============================================================================
// REVOLUTION
// =============================================================================

/// Revolves a discretized planar profile around the z axis.
///
/// Profile points are read as `(radius, z)`; each of `slices` copies is
/// rotated by `i * 2π / slices` and consecutive copies are stitched with
/// two triangles per profile segment.
///
/// The result is solid iff the profile is closed and the node declares
/// itself a volume.
pub fn revolution(
    profile: &[DVec3],
    slices: u32,
    volume: bool,
) -> Result<ExplicitModel, MeshError> {
    let curve_size = profile.len() as u32;
    if curve_size < 2 {
        return Err(MeshError::EmptyProfile(format!(
            "revolution profile has {curve_size} points"
        )));
    }
    if slices < 3 {
        return Err(MeshError::DegenerateGeometry(format!(
            "revolution slices must be at least 3: {slices}"
        )));
    }

    let mut points = Vec::with_capacity((slices * curve_size) as usize);
    let mut faces = Vec::with_capacity((slices * 2 * (curve_size - 1)) as usize);

    let angle_step = TAU / slices as f64;
    let mut cur = 0u32;
    let mut next = curve_size;

    for i in 0..slices {
        let (sin, cos) = (i as f64 * angle_step).sin_cos();

        points.push(DVec3::new(
            cos * profile[0].x,
            sin * profile[0].x,
            profile[0].y,
        ));

        for j in 1..curve_size {
            let radius = profile[j as usize].x;
            let z = profile[j as usize].y;
            points.push(DVec3::new(cos * radius, sin * radius, z));

            faces.push([cur + j, cur + j - 1, next + j - 1]);
            faces.push([cur + j, next + j - 1, next + j]);
        }

        cur = next;
        next = (next + curve_size) % (curve_size * slices);
    }

    let closed = (profile[0] - profile[profile.len() - 1]).length() < EPSILON;

    let mut model = ExplicitModel::new(points, Topology::Triangles(faces));
    model.solid = closed && volume;
    model.skeleton = Some(vec![DVec3::ZERO, DVec3::Z]);
    Ok(model)
}

// =============================================================================
// SWUNG
// =============================================================================

/// Revolves an angle-interpolated profile.
///
/// Each slice samples the interpolation at its own angle. In 2D mode the
/// section's `(x, y)` is read as `(radius, z)` and rotated into place; in
/// 3D mode section points are used directly. The angular range is the knot
/// span when more than one knot is present, a full turn otherwise.
pub fn swung(
    section: &dyn ProfileInterpolation,
    slices: u32,
    ccw: bool,
) -> Result<ExplicitModel, MeshError> {
    let section_size = section.section_size();
    if section_size < 2 {
        return Err(MeshError::EmptyProfile(format!(
            "swung section has {section_size} points"
        )));
    }
    if slices < 3 {
        return Err(MeshError::DegenerateGeometry(format!(
            "swung slices must be at least 3: {slices}"
        )));
    }

    let angle_min = section.u_min();
    let range = if section.knot_count() > 1 {
        section.u_max() - angle_min
    } else {
        TAU
    };
    let angle_step = range / slices as f64;

    let mut points = Vec::with_capacity((slices * section_size) as usize);
    let mut faces = Vec::with_capacity((slices * 2 * (section_size - 1)) as usize);

    let mut cur = 0u32;
    let mut next = section_size;
    let mut angle = angle_min;
    let is_2d = section.is_2d();

    for _ in 0..slices {
        let section_points: Vec<DVec3> = if is_2d {
            let (sin, cos) = angle.sin_cos();
            section
                .section2_at(angle)
                .into_iter()
                .map(|p| DVec3::new(p.x * cos, p.x * sin, p.y))
                .collect()
        } else {
            section.section3_at(angle)
        };
        if section_points.len() != section_size as usize {
            return Err(MeshError::EmptyProfile(
                "swung section size changed between angles".to_string(),
            ));
        }

        points.extend_from_slice(&section_points);
        for j in 1..section_size {
            faces.push([cur + j, cur + j - 1, next + j - 1]);
            faces.push([cur + j, next + j - 1, next + j]);
        }

        cur = next;
        next = (next + section_size) % (section_size * slices);
        angle += angle_step;
    }

    let mut model = ExplicitModel::new(points, Topology::Triangles(faces));
    model.ccw = ccw;
    model.skeleton = Some(vec![DVec3::ZERO, DVec3::Z]);
    Ok(model)
}

// =============================================================================
// EXTRUSION
// =============================================================================

/// Picks the canonical axis least parallel to `tangent`.
///
/// Used when the axis curve has no usable normal (locally straight). The
/// axis with the smallest absolute tangent component can never be nearly
/// parallel, so the cross product stays well-conditioned.
fn fallback_normal(tangent: DVec3) -> DVec3 {
    let abs = tangent.abs();
    let axis = if abs.x <= abs.y && abs.x <= abs.z {
        DVec3::X
    } else if abs.y <= abs.z {
        DVec3::Y
    } else {
        DVec3::Z
    };
    tangent.cross(axis)
}

/// Sweeps a discretized cross-section along an axis curve.
///
/// The sweep frame starts from the axis normal at the first knot and then
/// carries the previous binormal forward (`normal = binormal x velocity`),
/// a discrete parallel-transport approximation. The carried frame drifts
/// slightly over long axes; the rotation stays continuous, which is what
/// the connectivity needs.
///
/// A cross-section whose last point coincides with its first is treated as
/// closed: the duplicate is dropped and the quad strip wraps. When `solid`
/// is set, both end rings are fan-triangulated into caps and the result is
/// a mixed-arity face set.
///
/// UVs, when requested, are `(axis parameter, arc fraction along the
/// cross-section)` with shared indices.
pub fn extrusion(
    axis: &dyn ParametricCurve3,
    cross_section: &[DVec3],
    profile: Option<&dyn ProfileTransformation>,
    solid: bool,
    ccw: bool,
    with_tex: bool,
) -> Result<ExplicitModel, MeshError> {
    let mut cross: Vec<DVec3> = cross_section.to_vec();
    let mut closed = false;
    if cross.len() >= 2
        && (cross[0] - cross[cross.len() - 1]).length() < EPSILON
    {
        cross.pop();
        closed = true;
    }
    let nb = cross.len() as u32;
    if nb < 2 {
        return Err(MeshError::EmptyProfile(format!(
            "extrusion cross-section has {nb} distinct points"
        )));
    }

    let size = axis.stride();
    if size == 0 {
        return Err(MeshError::DegenerateGeometry(
            "extrusion axis stride must be positive".to_string(),
        ));
    }

    let first = axis.first_knot();
    let step = (axis.last_knot() - first) / size as f64;
    let (transf_first, transf_step) = match profile {
        Some(p) => (p.u_min(), (p.u_max() - p.u_min()) / size as f64),
        None => (0.0, 0.0),
    };

    // Arc fraction along the cross-section for the v texture coordinate.
    let fractions = with_tex.then(|| arc_fractions(&cross));

    let mut points = Vec::with_capacity(((size + 1) * nb) as usize);
    let mut tex = with_tex.then(|| Vec::with_capacity(((size + 1) * nb) as usize));
    let mut quads =
        Vec::with_capacity((size * (nb - if closed { 0 } else { 1 })) as usize);

    let mut normal = axis.normal_at(first);
    if normal.length_squared() < EPSILON {
        // Locally straight axis: no principal normal to start the frame.
        log::debug!("extrusion axis has no normal at its start, substituting an axis frame");
        normal = fallback_normal(axis.tangent_at(first));
    }
    let mut old_binormal = DVec3::ZERO;

    for i in 0..=size {
        let u = if i == size {
            axis.last_knot()
        } else {
            first + i as f64 * step
        };
        let center = axis.point_at(u);
        let mut velocity = axis.tangent_at(u);
        if i != 0 {
            normal = old_binormal.cross(velocity);
        }
        if normal.length_squared() < EPSILON {
            log::debug!("extrusion frame collapsed at u = {u}, substituting an axis frame");
            normal = fallback_normal(velocity);
        }
        velocity = velocity.normalize_or_zero();
        if velocity.length_squared() < EPSILON {
            return Err(MeshError::DegenerateGeometry(format!(
                "extrusion axis tangent vanishes at u = {u}"
            )));
        }
        normal = normal.normalize();
        let binormal = velocity.cross(normal).normalize();
        old_binormal = binormal;

        let frame = DMat3::from_cols(normal, binormal, velocity);
        let transf2 = profile.map(|p| {
            let ut = if i == size {
                p.u_max()
            } else {
                transf_first + i as f64 * transf_step
            };
            p.affine_at(ut)
        });

        let base = i * nb;
        if closed && i < size {
            quads.push([base + nb - 1, base, base + nb, base + 2 * nb - 1]);
        }

        for (k, cross_point) in cross.iter().enumerate() {
            let local = match &transf2 {
                Some(t) => {
                    let p2 = t.transform_point2(DVec2::new(cross_point.x, cross_point.y));
                    DVec3::new(p2.x, p2.y, cross_point.z)
                }
                None => *cross_point,
            };
            points.push(frame * local + center);
            if let (Some(tex), Some(fractions)) = (tex.as_mut(), fractions.as_ref()) {
                tex.push(DVec2::new(u, fractions[k]));
            }
            if i < size && (k as u32) + 1 < nb {
                let j = base + k as u32;
                quads.push([j, j + 1, j + nb + 1, j + nb]);
            }
        }
    }

    let topology = if solid {
        // Caps first, then the side quads, as a mixed-arity face set.
        let mut polygons = Vec::with_capacity(2 * (nb as usize - 2) + quads.len());
        let last_ring = size * nb;
        for k in 1..nb - 1 {
            polygons.push(vec![0, k, k + 1]);
        }
        for k in 1..nb - 1 {
            polygons.push(vec![last_ring, last_ring + k, last_ring + k + 1]);
        }
        polygons.extend(quads.into_iter().map(|q| q.to_vec()));
        Topology::Polygons(polygons)
    } else {
        Topology::Quads(quads)
    };

    // The axis run is the natural skeleton of the sweep.
    let skeleton = (0..=size)
        .map(|i| {
            axis.point_at(if i == size {
                axis.last_knot()
            } else {
                first + i as f64 * step
            })
        })
        .collect();

    let mut model = ExplicitModel::new(points, topology);
    model.ccw = ccw;
    model.solid = solid;
    model.skeleton = Some(skeleton);
    model.tex_coords = tex;
    Ok(model)
}

/// Cumulative chord-length fractions over a point chain; index 0 maps to 0.
fn arc_fractions(points: &[DVec3]) -> Vec<f64> {
    let mut lengths = Vec::with_capacity(points.len());
    let mut running = 0.0;
    lengths.push(0.0);
    for w in points.windows(2) {
        running += (w[1] - w[0]).length();
        lengths.push(running);
    }
    if running < EPSILON {
        return vec![0.0; points.len()];
    }
    lengths.iter().map(|l| l / running).collect()
}

// =============================================================================
// TESTS
// =============================================================================
