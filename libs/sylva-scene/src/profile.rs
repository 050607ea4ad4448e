//! # Profile Interpolation and Transformation
//!
//! Collaborators for the sweep kernels: the swung solid interpolates whole
//! cross-sections between keyed angles, while the generalized extrusion can
//! scale and orient its cross-section along the axis.

use std::fmt;

use glam::{DAffine2, DVec2, DVec3};

use crate::error::SceneError;

// =============================================================================
// PROFILE INTERPOLATION (swung)
// =============================================================================

/// Interpolates cross-sections over an angular parameter.
///
/// Sections are sampled polylines of a fixed size. In 2D mode a section
/// point `(x, y)` is interpreted as `(radius, z)` and rotated into place by
/// the swung kernel; in 3D mode section points are used as-is.
pub trait ProfileInterpolation: fmt::Debug {
    /// Start of the angular domain.
    fn u_min(&self) -> f64;

    /// End of the angular domain.
    fn u_max(&self) -> f64;

    /// Number of keyed sections.
    fn knot_count(&self) -> usize;

    /// Number of points in each sampled section.
    fn section_size(&self) -> u32;

    /// Whether sections are planar `(radius, z)` profiles.
    fn is_2d(&self) -> bool;

    /// The 2D section at angle `u` (2D mode).
    fn section2_at(&self, u: f64) -> Vec<DVec2>;

    /// The 3D section at angle `u` (3D mode).
    fn section3_at(&self, u: f64) -> Vec<DVec3>;
}

fn bracket(knots: &[f64], u: f64) -> (usize, f64) {
    if u <= knots[0] {
        return (0, 0.0);
    }
    let last = knots.len() - 1;
    if u >= knots[last] {
        return (last - 1, 1.0);
    }
    let mut i = 0;
    while u >= knots[i + 1] {
        i += 1;
    }
    let span = knots[i + 1] - knots[i];
    (i, if span > 0.0 { (u - knots[i]) / span } else { 0.0 })
}

fn validate_sections<T>(knots: &[f64], sections: &[Vec<T>]) -> Result<(), SceneError> {
    if sections.is_empty() || knots.len() != sections.len() {
        return Err(SceneError::InvalidProfile(format!(
            "{} knots do not match {} sections",
            knots.len(),
            sections.len()
        )));
    }
    let size = sections[0].len();
    if size < 2 {
        return Err(SceneError::InvalidProfile(
            "sections need at least 2 points".to_string(),
        ));
    }
    if sections.iter().any(|s| s.len() != size) {
        return Err(SceneError::InvalidProfile(
            "sections have mismatched sizes".to_string(),
        ));
    }
    if knots.windows(2).any(|w| w[1] <= w[0]) {
        return Err(SceneError::InvalidProfile(
            "knots must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

/// Keyed planar profiles with linear interpolation between knots.
#[derive(Debug, Clone)]
pub struct ProfileSet2 {
    knots: Vec<f64>,
    sections: Vec<Vec<DVec2>>,
}

impl ProfileSet2 {
    /// Creates a keyed profile set.
    ///
    /// All sections must have the same point count and knots must be
    /// strictly increasing.
    pub fn new(knots: Vec<f64>, sections: Vec<Vec<DVec2>>) -> Result<Self, SceneError> {
        validate_sections(&knots, &sections)?;
        Ok(Self { knots, sections })
    }
}

impl ProfileInterpolation for ProfileSet2 {
    fn u_min(&self) -> f64 {
        self.knots[0]
    }

    fn u_max(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    fn knot_count(&self) -> usize {
        self.knots.len()
    }

    fn section_size(&self) -> u32 {
        self.sections[0].len() as u32
    }

    fn is_2d(&self) -> bool {
        true
    }

    fn section2_at(&self, u: f64) -> Vec<DVec2> {
        if self.sections.len() == 1 {
            return self.sections[0].clone();
        }
        let (i, t) = bracket(&self.knots, u);
        self.sections[i]
            .iter()
            .zip(&self.sections[i + 1])
            .map(|(a, b)| a.lerp(*b, t))
            .collect()
    }

    fn section3_at(&self, u: f64) -> Vec<DVec3> {
        self.section2_at(u)
            .into_iter()
            .map(|p| DVec3::new(p.x, p.y, 0.0))
            .collect()
    }
}

/// Keyed spatial profiles with linear interpolation between knots.
#[derive(Debug, Clone)]
pub struct ProfileSet3 {
    knots: Vec<f64>,
    sections: Vec<Vec<DVec3>>,
}

impl ProfileSet3 {
    /// Creates a keyed profile set.
    ///
    /// All sections must have the same point count and knots must be
    /// strictly increasing.
    pub fn new(knots: Vec<f64>, sections: Vec<Vec<DVec3>>) -> Result<Self, SceneError> {
        validate_sections(&knots, &sections)?;
        Ok(Self { knots, sections })
    }
}

impl ProfileInterpolation for ProfileSet3 {
    fn u_min(&self) -> f64 {
        self.knots[0]
    }

    fn u_max(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    fn knot_count(&self) -> usize {
        self.knots.len()
    }

    fn section_size(&self) -> u32 {
        self.sections[0].len() as u32
    }

    fn is_2d(&self) -> bool {
        false
    }

    fn section2_at(&self, u: f64) -> Vec<DVec2> {
        self.section3_at(u).into_iter().map(|p| p.truncate()).collect()
    }

    fn section3_at(&self, u: f64) -> Vec<DVec3> {
        if self.sections.len() == 1 {
            return self.sections[0].clone();
        }
        let (i, t) = bracket(&self.knots, u);
        self.sections[i]
            .iter()
            .zip(&self.sections[i + 1])
            .map(|(a, b)| a.lerp(*b, t))
            .collect()
    }
}

// =============================================================================
// PROFILE TRANSFORMATION (extrusion)
// =============================================================================

/// A planar transformation of the extrusion cross-section, varying along
/// the axis parameter.
pub trait ProfileTransformation: fmt::Debug {
    /// Start of the axis-parameter domain.
    fn u_min(&self) -> f64 {
        0.0
    }

    /// End of the axis-parameter domain.
    fn u_max(&self) -> f64 {
        1.0
    }

    /// The cross-section transform at parameter `u`.
    fn affine_at(&self, u: f64) -> DAffine2;
}

/// Per-knot 2D scale and orientation, linearly interpolated.
///
/// The classic use is a trunk that narrows along its axis: scales go from
/// wide to narrow while orientations stay at zero.
#[derive(Debug, Clone)]
pub struct ScalingProfile {
    knots: Vec<f64>,
    scales: Vec<DVec2>,
    orientations: Vec<f64>,
}

impl ScalingProfile {
    /// Creates a scaling profile.
    ///
    /// One scale and one orientation (radians) per knot; knots strictly
    /// increasing.
    pub fn new(
        knots: Vec<f64>,
        scales: Vec<DVec2>,
        orientations: Vec<f64>,
    ) -> Result<Self, SceneError> {
        if knots.is_empty() || knots.len() != scales.len() || knots.len() != orientations.len() {
            return Err(SceneError::InvalidProfile(
                "knots, scales and orientations must have equal lengths".to_string(),
            ));
        }
        if knots.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SceneError::InvalidProfile(
                "knots must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            knots,
            scales,
            orientations,
        })
    }
}

impl ProfileTransformation for ScalingProfile {
    fn u_min(&self) -> f64 {
        self.knots[0]
    }

    fn u_max(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    fn affine_at(&self, u: f64) -> DAffine2 {
        let (scale, angle) = if self.knots.len() == 1 {
            (self.scales[0], self.orientations[0])
        } else {
            let (i, t) = bracket(&self.knots, u);
            (
                self.scales[i].lerp(self.scales[i + 1], t),
                self.orientations[i] * (1.0 - t) + self.orientations[i + 1] * t,
            )
        };
        DAffine2::from_scale_angle_translation(scale, angle, DVec2::ZERO)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_set2_interpolates_between_knots() {
        let set = ProfileSet2::new(
            vec![0.0, 1.0],
            vec![
                vec![DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0)],
                vec![DVec2::new(3.0, 0.0), DVec2::new(3.0, 1.0)],
            ],
        )
        .unwrap();
        let mid = set.section2_at(0.5);
        assert!((mid[0].x - 2.0).abs() < 1e-12);
        assert!((mid[1] - DVec2::new(2.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_profile_set2_clamps_outside_domain() {
        let set = ProfileSet2::new(
            vec![0.0, 1.0],
            vec![
                vec![DVec2::ZERO, DVec2::Y],
                vec![DVec2::X, DVec2::ONE],
            ],
        )
        .unwrap();
        assert_eq!(set.section2_at(-5.0), set.section2_at(0.0));
        assert_eq!(set.section2_at(9.0), set.section2_at(1.0));
    }

    #[test]
    fn test_profile_set_rejects_mismatched_sections() {
        assert!(ProfileSet2::new(
            vec![0.0, 1.0],
            vec![vec![DVec2::ZERO, DVec2::X], vec![DVec2::ZERO]],
        )
        .is_err());
        assert!(ProfileSet3::new(vec![0.0], vec![]).is_err());
    }

    #[test]
    fn test_scaling_profile_midpoint() {
        let profile = ScalingProfile::new(
            vec![0.0, 1.0],
            vec![DVec2::splat(2.0), DVec2::splat(4.0)],
            vec![0.0, 0.0],
        )
        .unwrap();
        let transformed = profile.affine_at(0.5).transform_point2(DVec2::X);
        assert!((transformed - DVec2::new(3.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_scaling_profile_orientation() {
        let profile = ScalingProfile::new(
            vec![0.0, 1.0],
            vec![DVec2::ONE, DVec2::ONE],
            vec![0.0, std::f64::consts::FRAC_PI_2],
        )
        .unwrap();
        let transformed = profile.affine_at(1.0).transform_point2(DVec2::X);
        assert!((transformed - DVec2::Y).length() < 1e-12);
    }
}
