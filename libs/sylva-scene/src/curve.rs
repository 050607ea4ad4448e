//! # Parametric Curves
//!
//! Sampling traits consumed by the discretizer, plus the Bézier and NURBS
//! reference curve types. The discretizer never evaluates curve math itself:
//! it only asks a curve for its knot range, its stride (sample count), and
//! points/tangents/normals at parameter values.

use std::fmt;

use glam::{DVec2, DVec3};

use crate::basis::{basis_fun_derivs, basis_funs, find_span};
use crate::error::SceneError;
use config::constants::DEFAULT_STRIDE;

// =============================================================================
// SAMPLING TRAITS
// =============================================================================

/// A planar parametric curve.
///
/// Used for profiles: revolution and swung profiles interpret the sampled
/// `(x, y)` as `(radius, z)`; extrusion cross-sections and hull profiles are
/// lifted to 3D with `z = 0`.
pub trait ParametricCurve2: fmt::Debug {
    /// Start of the parametric domain.
    fn first_knot(&self) -> f64 {
        0.0
    }

    /// End of the parametric domain.
    fn last_knot(&self) -> f64 {
        1.0
    }

    /// Number of parametric samples requested; sampling yields `stride + 1`
    /// points.
    fn stride(&self) -> u32;

    /// Point on the curve at parameter `u`.
    fn point_at(&self, u: f64) -> DVec2;

    /// First derivative at parameter `u`.
    fn tangent_at(&self, u: f64) -> DVec2;
}

/// A spatial parametric curve.
///
/// Extrusion axes additionally need a normal to seed the sweep frame; a
/// zero normal signals a locally straight curve and the discretizer
/// substitutes a canonical axis.
pub trait ParametricCurve3: fmt::Debug {
    /// Start of the parametric domain.
    fn first_knot(&self) -> f64 {
        0.0
    }

    /// End of the parametric domain.
    fn last_knot(&self) -> f64 {
        1.0
    }

    /// Number of parametric samples requested; sampling yields `stride + 1`
    /// points.
    fn stride(&self) -> u32;

    /// Point on the curve at parameter `u`.
    fn point_at(&self, u: f64) -> DVec3;

    /// First derivative at parameter `u`.
    fn tangent_at(&self, u: f64) -> DVec3;

    /// Principal normal at parameter `u`, zero where the curve is locally
    /// straight.
    fn normal_at(&self, u: f64) -> DVec3;
}

// =============================================================================
// BEZIER CURVES
// =============================================================================

fn de_casteljau2(ctrl: &[DVec2], t: f64) -> DVec2 {
    let mut pts = ctrl.to_vec();
    for level in (1..pts.len()).rev() {
        for i in 0..level {
            pts[i] = pts[i].lerp(pts[i + 1], t);
        }
    }
    pts[0]
}

fn de_casteljau3(ctrl: &[DVec3], t: f64) -> DVec3 {
    let mut pts = ctrl.to_vec();
    for level in (1..pts.len()).rev() {
        for i in 0..level {
            pts[i] = pts[i].lerp(pts[i + 1], t);
        }
    }
    pts[0]
}

/// A planar Bézier curve defined by its control polygon.
///
/// ## Example
///
/// ```rust
/// use glam::DVec2;
/// use sylva_scene::{BezierCurve2, ParametricCurve2};
///
/// let arc = BezierCurve2::new(vec![
///     DVec2::new(1.0, 0.0),
///     DVec2::new(1.0, 1.0),
///     DVec2::new(0.0, 1.0),
/// ])
/// .unwrap();
/// assert_eq!(arc.point_at(0.0), DVec2::new(1.0, 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct BezierCurve2 {
    ctrl: Vec<DVec2>,
    stride: u32,
}

impl BezierCurve2 {
    /// Creates a curve with the default stride.
    ///
    /// Fails when fewer than two control points are given.
    pub fn new(ctrl: Vec<DVec2>) -> Result<Self, SceneError> {
        Self::with_stride(ctrl, DEFAULT_STRIDE)
    }

    /// Creates a curve with an explicit stride.
    pub fn with_stride(ctrl: Vec<DVec2>, stride: u32) -> Result<Self, SceneError> {
        if ctrl.len() < 2 {
            return Err(SceneError::InvalidCurve(
                "Bezier curve needs at least 2 control points".to_string(),
            ));
        }
        if stride == 0 {
            return Err(SceneError::InvalidCurve("stride must be positive".to_string()));
        }
        Ok(Self { ctrl, stride })
    }
}

impl ParametricCurve2 for BezierCurve2 {
    fn stride(&self) -> u32 {
        self.stride
    }

    fn point_at(&self, u: f64) -> DVec2 {
        de_casteljau2(&self.ctrl, u)
    }

    fn tangent_at(&self, u: f64) -> DVec2 {
        let degree = (self.ctrl.len() - 1) as f64;
        let hodograph: Vec<DVec2> = self
            .ctrl
            .windows(2)
            .map(|w| (w[1] - w[0]) * degree)
            .collect();
        de_casteljau2(&hodograph, u)
    }
}

/// A spatial Bézier curve defined by its control polygon.
#[derive(Debug, Clone)]
pub struct BezierCurve3 {
    ctrl: Vec<DVec3>,
    stride: u32,
}

impl BezierCurve3 {
    /// Creates a curve with the default stride.
    ///
    /// Fails when fewer than two control points are given.
    pub fn new(ctrl: Vec<DVec3>) -> Result<Self, SceneError> {
        Self::with_stride(ctrl, DEFAULT_STRIDE)
    }

    /// Creates a curve with an explicit stride.
    pub fn with_stride(ctrl: Vec<DVec3>, stride: u32) -> Result<Self, SceneError> {
        if ctrl.len() < 2 {
            return Err(SceneError::InvalidCurve(
                "Bezier curve needs at least 2 control points".to_string(),
            ));
        }
        if stride == 0 {
            return Err(SceneError::InvalidCurve("stride must be positive".to_string()));
        }
        Ok(Self { ctrl, stride })
    }

    fn derivative_at(&self, u: f64) -> DVec3 {
        let degree = (self.ctrl.len() - 1) as f64;
        let hodograph: Vec<DVec3> = self
            .ctrl
            .windows(2)
            .map(|w| (w[1] - w[0]) * degree)
            .collect();
        de_casteljau3(&hodograph, u)
    }

    fn second_derivative_at(&self, u: f64) -> DVec3 {
        if self.ctrl.len() < 3 {
            return DVec3::ZERO;
        }
        let degree = (self.ctrl.len() - 1) as f64;
        let hodograph: Vec<DVec3> = self
            .ctrl
            .windows(2)
            .map(|w| (w[1] - w[0]) * degree)
            .collect();
        let degree2 = (hodograph.len() - 1) as f64;
        let hodograph2: Vec<DVec3> = hodograph
            .windows(2)
            .map(|w| (w[1] - w[0]) * degree2)
            .collect();
        de_casteljau3(&hodograph2, u)
    }
}

impl ParametricCurve3 for BezierCurve3 {
    fn stride(&self) -> u32 {
        self.stride
    }

    fn point_at(&self, u: f64) -> DVec3 {
        de_casteljau3(&self.ctrl, u)
    }

    fn tangent_at(&self, u: f64) -> DVec3 {
        self.derivative_at(u)
    }

    fn normal_at(&self, u: f64) -> DVec3 {
        let tangent = self.derivative_at(u);
        let second = self.second_derivative_at(u);
        let t_len2 = tangent.length_squared();
        if t_len2 < f64::EPSILON {
            return DVec3::ZERO;
        }
        // Component of the curvature vector orthogonal to the tangent.
        second - tangent * (second.dot(tangent) / t_len2)
    }
}

// =============================================================================
// NURBS CURVES
// =============================================================================

fn validate_nurbs(
    n_ctrl: usize,
    n_weights: usize,
    n_knots: usize,
    degree: usize,
) -> Result<(), SceneError> {
    if degree == 0 {
        return Err(SceneError::InvalidCurve("degree must be positive".to_string()));
    }
    if n_ctrl <= degree {
        return Err(SceneError::InvalidCurve(format!(
            "degree {degree} needs more than {degree} control points, got {n_ctrl}"
        )));
    }
    if n_weights != n_ctrl {
        return Err(SceneError::InvalidCurve(format!(
            "weight count {n_weights} does not match control point count {n_ctrl}"
        )));
    }
    if n_knots != n_ctrl + degree + 1 {
        return Err(SceneError::InvalidCurve(format!(
            "knot count {n_knots} does not match control points + degree + 1"
        )));
    }
    Ok(())
}

/// A planar NURBS curve (control points, weights, knot vector, degree).
#[derive(Debug, Clone)]
pub struct NurbsCurve2 {
    ctrl: Vec<DVec2>,
    weights: Vec<f64>,
    knots: Vec<f64>,
    degree: usize,
    stride: u32,
}

impl NurbsCurve2 {
    /// Creates a curve with the default stride.
    ///
    /// Requires `knots.len() == ctrl.len() + degree + 1` and one weight per
    /// control point.
    pub fn new(
        ctrl: Vec<DVec2>,
        weights: Vec<f64>,
        knots: Vec<f64>,
        degree: usize,
    ) -> Result<Self, SceneError> {
        Self::with_stride(ctrl, weights, knots, degree, DEFAULT_STRIDE)
    }

    /// Creates a curve with an explicit stride.
    pub fn with_stride(
        ctrl: Vec<DVec2>,
        weights: Vec<f64>,
        knots: Vec<f64>,
        degree: usize,
        stride: u32,
    ) -> Result<Self, SceneError> {
        validate_nurbs(ctrl.len(), weights.len(), knots.len(), degree)?;
        Ok(Self {
            ctrl,
            weights,
            knots,
            degree,
            stride,
        })
    }

    fn clamp_u(&self, u: f64) -> f64 {
        u.clamp(self.first_knot(), self.last_knot())
    }
}

impl ParametricCurve2 for NurbsCurve2 {
    fn first_knot(&self) -> f64 {
        self.knots[self.degree]
    }

    fn last_knot(&self) -> f64 {
        self.knots[self.knots.len() - 1 - self.degree]
    }

    fn stride(&self) -> u32 {
        self.stride
    }

    fn point_at(&self, u: f64) -> DVec2 {
        let u = self.clamp_u(u);
        let span = find_span(self.degree, self.ctrl.len(), &self.knots, u);
        let funs = basis_funs(span, u, self.degree, &self.knots);
        let mut numerator = DVec2::ZERO;
        let mut denominator = 0.0;
        for (r, fun) in funs.iter().enumerate() {
            let i = span - self.degree + r;
            let w = fun * self.weights[i];
            numerator += self.ctrl[i] * w;
            denominator += w;
        }
        numerator / denominator
    }

    fn tangent_at(&self, u: f64) -> DVec2 {
        let u = self.clamp_u(u);
        let span = find_span(self.degree, self.ctrl.len(), &self.knots, u);
        let funs = basis_funs(span, u, self.degree, &self.knots);
        let derivs = basis_fun_derivs(span, u, self.degree, &self.knots);
        let mut a = DVec2::ZERO;
        let mut w = 0.0;
        let mut a_prime = DVec2::ZERO;
        let mut w_prime = 0.0;
        for r in 0..funs.len() {
            let i = span - self.degree + r;
            a += self.ctrl[i] * (funs[r] * self.weights[i]);
            w += funs[r] * self.weights[i];
            a_prime += self.ctrl[i] * (derivs[r] * self.weights[i]);
            w_prime += derivs[r] * self.weights[i];
        }
        (a_prime - (a / w) * w_prime) / w
    }
}

/// A spatial NURBS curve (control points, weights, knot vector, degree).
#[derive(Debug, Clone)]
pub struct NurbsCurve3 {
    ctrl: Vec<DVec3>,
    weights: Vec<f64>,
    knots: Vec<f64>,
    degree: usize,
    stride: u32,
}

impl NurbsCurve3 {
    /// Creates a curve with the default stride.
    ///
    /// Requires `knots.len() == ctrl.len() + degree + 1` and one weight per
    /// control point.
    pub fn new(
        ctrl: Vec<DVec3>,
        weights: Vec<f64>,
        knots: Vec<f64>,
        degree: usize,
    ) -> Result<Self, SceneError> {
        Self::with_stride(ctrl, weights, knots, degree, DEFAULT_STRIDE)
    }

    /// Creates a curve with an explicit stride.
    pub fn with_stride(
        ctrl: Vec<DVec3>,
        weights: Vec<f64>,
        knots: Vec<f64>,
        degree: usize,
        stride: u32,
    ) -> Result<Self, SceneError> {
        validate_nurbs(ctrl.len(), weights.len(), knots.len(), degree)?;
        Ok(Self {
            ctrl,
            weights,
            knots,
            degree,
            stride,
        })
    }

    fn clamp_u(&self, u: f64) -> f64 {
        u.clamp(self.first_knot(), self.last_knot())
    }

    fn rational_point_and_tangent(&self, u: f64) -> (DVec3, DVec3) {
        let span = find_span(self.degree, self.ctrl.len(), &self.knots, u);
        let funs = basis_funs(span, u, self.degree, &self.knots);
        let derivs = basis_fun_derivs(span, u, self.degree, &self.knots);
        let mut a = DVec3::ZERO;
        let mut w = 0.0;
        let mut a_prime = DVec3::ZERO;
        let mut w_prime = 0.0;
        for r in 0..funs.len() {
            let i = span - self.degree + r;
            a += self.ctrl[i] * (funs[r] * self.weights[i]);
            w += funs[r] * self.weights[i];
            a_prime += self.ctrl[i] * (derivs[r] * self.weights[i]);
            w_prime += derivs[r] * self.weights[i];
        }
        let point = a / w;
        (point, (a_prime - point * w_prime) / w)
    }
}

impl ParametricCurve3 for NurbsCurve3 {
    fn first_knot(&self) -> f64 {
        self.knots[self.degree]
    }

    fn last_knot(&self) -> f64 {
        self.knots[self.knots.len() - 1 - self.degree]
    }

    fn stride(&self) -> u32 {
        self.stride
    }

    fn point_at(&self, u: f64) -> DVec3 {
        self.rational_point_and_tangent(self.clamp_u(u)).0
    }

    fn tangent_at(&self, u: f64) -> DVec3 {
        self.rational_point_and_tangent(self.clamp_u(u)).1
    }

    fn normal_at(&self, u: f64) -> DVec3 {
        // Differencing the tangent keeps the rational bookkeeping out of the
        // node; the discretizer only needs the normal's direction.
        let span = self.last_knot() - self.first_knot();
        let h = span * 1e-4;
        let u = self.clamp_u(u);
        let before = self.clamp_u(u - h);
        let after = self.clamp_u(u + h);
        if after - before < f64::EPSILON {
            return DVec3::ZERO;
        }
        let tangent = self.tangent_at(u);
        let t_len2 = tangent.length_squared();
        if t_len2 < f64::EPSILON {
            return DVec3::ZERO;
        }
        let curvature =
            (self.tangent_at(after) - self.tangent_at(before)) / (after - before);
        curvature - tangent * (curvature.dot(tangent) / t_len2)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bezier2_endpoints() {
        let curve = BezierCurve2::new(vec![
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ])
        .unwrap();
        assert!((curve.point_at(0.0) - DVec2::new(1.0, 0.0)).length() < 1e-12);
        assert!((curve.point_at(1.0) - DVec2::new(0.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_bezier3_line_tangent() {
        let curve =
            BezierCurve3::new(vec![DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)]).unwrap();
        let tangent = curve.tangent_at(0.5);
        assert!((tangent - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-12);
        // A straight curve has no principal normal.
        assert_eq!(curve.normal_at(0.5), DVec3::ZERO);
    }

    #[test]
    fn test_bezier3_planar_normal_is_in_plane() {
        let curve = BezierCurve3::new(vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
        ])
        .unwrap();
        let normal = curve.normal_at(0.5);
        assert!(normal.length() > 0.0);
        assert!(normal.z.abs() < 1e-12);
        assert!(normal.dot(curve.tangent_at(0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_bezier_rejects_degenerate_input() {
        assert!(BezierCurve2::new(vec![DVec2::ZERO]).is_err());
        assert!(BezierCurve3::with_stride(vec![DVec3::ZERO, DVec3::X], 0).is_err());
    }

    fn unit_line_nurbs() -> NurbsCurve3 {
        // Degree-1 polyline through three points over knots [0, 0, 1, 2, 2].
        NurbsCurve3::new(
            vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0)],
            vec![1.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0, 2.0, 2.0],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_nurbs_knot_domain() {
        let curve = unit_line_nurbs();
        assert_eq!(curve.first_knot(), 0.0);
        assert_eq!(curve.last_knot(), 2.0);
    }

    #[test]
    fn test_nurbs_interpolates_degree_one_control_points() {
        let curve = unit_line_nurbs();
        assert!((curve.point_at(0.0) - DVec3::ZERO).length() < 1e-12);
        assert!((curve.point_at(1.0) - DVec3::X).length() < 1e-12);
        assert!((curve.point_at(2.0) - DVec3::new(1.0, 1.0, 0.0)).length() < 1e-12);
        assert!((curve.point_at(0.5) - DVec3::new(0.5, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_nurbs_circle_quadrant() {
        // A quadratic rational quarter circle in the xy plane.
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let curve = NurbsCurve2::new(
            vec![
                DVec2::new(1.0, 0.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(0.0, 1.0),
            ],
            vec![1.0, w, 1.0],
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            2,
        )
        .unwrap();
        for &u in &[0.0, 0.2, 0.5, 0.8, 1.0] {
            let p = curve.point_at(u);
            assert!((p.length() - 1.0).abs() < 1e-12, "radius at u={u}");
        }
    }

    #[test]
    fn test_nurbs_validation() {
        assert!(NurbsCurve3::new(
            vec![DVec3::ZERO, DVec3::X],
            vec![1.0],
            vec![0.0, 0.0, 1.0, 1.0],
            1
        )
        .is_err());
        assert!(NurbsCurve3::new(
            vec![DVec3::ZERO, DVec3::X],
            vec![1.0, 1.0],
            vec![0.0, 0.0, 1.0],
            1
        )
        .is_err());
    }
}
