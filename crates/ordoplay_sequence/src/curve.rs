// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframed curves over normalized time.
//!
//! A [`Curve`] maps local time `[0, 1]` to a value in `[0, 1]`. Its first point
//! always sits at time `0`, its last at time `1`, and point times are strictly
//! increasing. Segments scale curves to seconds and tracks map the normalized
//! value to the track's value range.

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing curve times and values
pub const CURVE_EPSILON: f32 = 1.0e-5;

/// Interpolation mode from a control point to the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InterpolationMode {
    /// Linear interpolation
    #[default]
    Linear,
    /// Cubic bezier using the left point's out-tangent and the right point's in-tangent
    Bezier,
}

/// Tangent handle, relative to its control point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tangent {
    /// Offset in local time
    pub time: f32,
    /// Offset in value
    pub value: f32,
}

impl Tangent {
    /// Create a tangent handle
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }

    /// The mirrored handle
    pub fn mirrored(self) -> Self {
        Self::new(-self.time, -self.value)
    }

    fn scaled_time(self, factor: f32) -> Self {
        Self::new(self.time * factor, self.value)
    }
}

/// Which tangent handle of a control point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TangentSide {
    /// Handle pointing back in time
    In,
    /// Handle pointing forward in time
    Out,
}

/// A keyframe of a curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Local time in `[0, 1]`
    pub time: f32,
    /// Value in `[0, 1]`
    pub value: f32,
    /// In-tangent handle
    pub in_tangent: Tangent,
    /// Out-tangent handle
    pub out_tangent: Tangent,
    /// Interpolation towards the next point
    pub interpolation: InterpolationMode,
    /// When set, the out-tangent always mirrors the in-tangent
    pub tangents_aligned: bool,
}

impl ControlPoint {
    /// Create a point with zero-length aligned tangents
    pub fn new(time: f32, value: f32, interpolation: InterpolationMode) -> Self {
        Self {
            time,
            value,
            in_tangent: Tangent::default(),
            out_tangent: Tangent::default(),
            interpolation,
            tangents_aligned: true,
        }
    }

    /// Set both tangents, aligned or not
    pub fn with_tangents(mut self, in_tangent: Tangent, out_tangent: Tangent) -> Self {
        self.in_tangent = in_tangent;
        self.out_tangent = out_tangent;
        self.tangents_aligned = tangents_mirror(in_tangent, out_tangent);
        self
    }

    fn scale_tangents(&mut self, factor: f32) {
        self.in_tangent = self.in_tangent.scaled_time(factor);
        self.out_tangent = self.out_tangent.scaled_time(factor);
    }

    /// Drop the alignment flag when the handles no longer mirror each other
    fn refresh_alignment(&mut self) {
        self.tangents_aligned =
            self.tangents_aligned && tangents_mirror(self.in_tangent, self.out_tangent);
    }
}

fn tangents_mirror(in_tangent: Tangent, out_tangent: Tangent) -> bool {
    (in_tangent.time + out_tangent.time).abs() <= CURVE_EPSILON
        && (in_tangent.value + out_tangent.value).abs() <= CURVE_EPSILON
}

/// Structural defects of a curve
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// Fewer than two points
    #[error("Curve needs at least two points, found {0}")]
    TooFewPoints(usize),

    /// First point not at 0 or last point not at 1
    #[error("Curve must start at time 0 and end at time 1")]
    BadEndpoints,

    /// Point times not strictly increasing
    #[error("Point {0} is not after its predecessor")]
    NotIncreasing(usize),

    /// Point value outside `[0, 1]`
    #[error("Point {0} has a value outside [0, 1]")]
    ValueOutOfRange(usize),

    /// Aligned point whose out-tangent does not mirror its in-tangent
    #[error("Point {0} is marked aligned but its tangents do not mirror")]
    MisalignedTangents(usize),
}

/// Keyframed scalar function over normalized time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    points: Vec<ControlPoint>,
}

impl Curve {
    /// A constant curve
    pub fn flat(value: f32) -> Self {
        Self::linear(value, value)
    }

    /// A straight line from `start` to `end`
    pub fn linear(start: f32, end: f32) -> Self {
        Self {
            points: vec![
                ControlPoint::new(0.0, start.clamp(0.0, 1.0), InterpolationMode::Linear),
                ControlPoint::new(1.0, end.clamp(0.0, 1.0), InterpolationMode::Linear),
            ],
        }
    }

    /// Build a curve from points, checking every structural rule
    pub fn from_points(points: Vec<ControlPoint>) -> Result<Self, CurveError> {
        let curve = Self { points };
        curve.validate()?;
        Ok(curve)
    }

    /// Check the structural rules of the curve
    pub fn validate(&self) -> Result<(), CurveError> {
        let points = &self.points;
        if points.len() < 2 {
            return Err(CurveError::TooFewPoints(points.len()));
        }
        let last = points.len() - 1;
        if points[0].time != 0.0 || points[last].time != 1.0 {
            return Err(CurveError::BadEndpoints);
        }
        for (index, point) in points.iter().enumerate() {
            if index > 0 && point.time <= points[index - 1].time {
                return Err(CurveError::NotIncreasing(index));
            }
            if !(0.0..=1.0).contains(&point.value) {
                return Err(CurveError::ValueOutOfRange(index));
            }
            if point.tangents_aligned && !tangents_mirror(point.in_tangent, point.out_tangent) {
                return Err(CurveError::MisalignedTangents(index));
            }
        }
        Ok(())
    }

    /// All control points, sorted by time
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Number of control points
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Value of the first point
    pub fn start_value(&self) -> f32 {
        self.points.first().map_or(0.0, |p| p.value)
    }

    /// Value of the last point
    pub fn end_value(&self) -> f32 {
        self.points.last().map_or(0.0, |p| p.value)
    }

    /// Set the value of the first point, clamped to `[0, 1]`. Non-finite
    /// values are ignored.
    pub fn set_start_value(&mut self, value: f32) {
        if !value.is_finite() {
            return;
        }
        if let Some(point) = self.points.first_mut() {
            point.value = value.clamp(0.0, 1.0);
        }
    }

    /// Set the value of the last point, clamped to `[0, 1]`. Non-finite
    /// values are ignored.
    pub fn set_end_value(&mut self, value: f32) {
        if !value.is_finite() {
            return;
        }
        if let Some(point) = self.points.last_mut() {
            point.value = value.clamp(0.0, 1.0);
        }
    }

    /// Evaluate the curve at local time `t`
    pub fn evaluate(&self, t: f32) -> f32 {
        let points = &self.points;
        match points.len() {
            0 => return 0.0,
            1 => return points[0].value,
            _ => {}
        }
        let t = t.clamp(0.0, 1.0);
        let index = points
            .partition_point(|p| p.time <= t)
            .saturating_sub(1)
            .min(points.len() - 2);
        evaluate_span(&points[index], &points[index + 1], t).clamp(0.0, 1.0)
    }

    /// Insert a point on the curve at `pos`.
    ///
    /// `pos` has to fall strictly between two existing point times. Returns the
    /// index of the new point.
    pub fn insert_point(&mut self, pos: f32) -> Option<usize> {
        let index = self
            .points
            .windows(2)
            .position(|w| w[0].time < pos && pos < w[1].time)?;
        let value = self.evaluate(pos);
        let interpolation = self.points[index].interpolation;
        self.points
            .insert(index + 1, ControlPoint::new(pos, value, interpolation));
        Some(index + 1)
    }

    /// Remove an interior point. The first and last point are never removed.
    pub fn remove_point(&mut self, index: usize) -> bool {
        if index == 0 || index + 1 >= self.points.len() {
            return false;
        }
        self.points.remove(index);
        true
    }

    /// Shift a point's time and value.
    ///
    /// The time shift only applies to interior points and only while the point
    /// stays strictly between its neighbours. The value is clamped to `[0, 1]`.
    pub fn move_point(&mut self, index: usize, delta_time: f32, delta_value: f32) -> bool {
        if !(delta_time.is_finite() && delta_value.is_finite()) {
            return false;
        }
        let Some(last) = self.points.len().checked_sub(1) else {
            return false;
        };
        if index > last {
            return false;
        }
        if index != 0 && index != last {
            let time = self.points[index].time + delta_time;
            if time > self.points[index - 1].time && time < self.points[index + 1].time {
                self.points[index].time = time;
            }
        }
        let point = &mut self.points[index];
        point.value = (point.value + delta_value).clamp(0.0, 1.0);
        true
    }

    /// Shift one tangent handle of a point.
    ///
    /// In-tangents must keep pointing back in time and out-tangents forward.
    /// Aligned points mirror the edited handle onto the other one.
    pub fn change_tangent(
        &mut self,
        index: usize,
        side: TangentSide,
        delta_time: f32,
        delta_value: f32,
    ) -> bool {
        if !(delta_time.is_finite() && delta_value.is_finite()) {
            return false;
        }
        let Some(point) = self.points.get_mut(index) else {
            return false;
        };
        match side {
            TangentSide::In => {
                let edited = Tangent::new(
                    point.in_tangent.time + delta_time,
                    point.in_tangent.value + delta_value,
                );
                if edited.time > 0.0 {
                    return false;
                }
                point.in_tangent = edited;
                if point.tangents_aligned {
                    point.out_tangent = edited.mirrored();
                }
            }
            TangentSide::Out => {
                let edited = Tangent::new(
                    point.out_tangent.time + delta_time,
                    point.out_tangent.value + delta_value,
                );
                if edited.time < 0.0 {
                    return false;
                }
                point.out_tangent = edited;
                if point.tangents_aligned {
                    point.in_tangent = edited.mirrored();
                }
            }
        }
        true
    }

    /// Overwrite both tangents of a point
    pub(crate) fn set_tangents(&mut self, index: usize, in_tangent: Tangent, out_tangent: Tangent) {
        if let Some(point) = self.points.get_mut(index) {
            point.in_tangent = in_tangent;
            point.out_tangent = out_tangent;
            point.refresh_alignment();
        }
    }

    /// Use `mode` for every span of the curve
    pub fn set_interpolation(&mut self, mode: InterpolationMode) {
        for point in &mut self.points {
            point.interpolation = mode;
        }
    }

    /// Cut the curve at local time `u` into two curves, each renormalized to
    /// `[0, 1]`. The cut point lies exactly on the original curve and bezier
    /// spans are subdivided, so the halves trace the original shape.
    pub fn split_at(&self, u: f32) -> Option<(Curve, Curve)> {
        if !(u > 0.0 && u < 1.0) || self.points.len() < 2 {
            return None;
        }
        let points = &self.points;
        let (mut left, mut right) = match points.iter().position(|p| p.time == u) {
            Some(k) => (points[..=k].to_vec(), points[k..].to_vec()),
            None => {
                let i = points.partition_point(|p| p.time < u) - 1;
                let (a, b, mid) = cut_span(&points[i], &points[i + 1], u);
                let mut left = points[..i].to_vec();
                left.extend([a, mid]);
                let mut right = vec![mid, b];
                right.extend_from_slice(&points[i + 2..]);
                (left, right)
            }
        };

        for point in &mut left {
            point.time /= u;
            point.scale_tangents(1.0 / u);
        }
        for point in &mut right {
            point.time = (point.time - u) / (1.0 - u);
            point.scale_tangents(1.0 / (1.0 - u));
        }
        pin_endpoints(&mut left);
        pin_endpoints(&mut right);
        Some((Curve { points: left }, Curve { points: right }))
    }

    /// Join two curves into one. `ratio` is the share of local time given to
    /// `left`. The seam takes the left curve's end value and in-tangent and
    /// the right curve's out-tangent.
    pub fn join(left: &Curve, right: &Curve, ratio: f32) -> Curve {
        let ratio = ratio.clamp(CURVE_EPSILON, 1.0 - CURVE_EPSILON);
        let (Some(left_last), Some(right_first)) = (left.points.last(), right.points.first())
        else {
            return left.clone();
        };

        let mut seam = *left_last;
        seam.out_tangent = right_first.out_tangent;
        seam.interpolation = right_first.interpolation;
        seam.tangents_aligned = left_last.tangents_aligned && right_first.tangents_aligned;

        let mut points = Vec::with_capacity(left.points.len() + right.points.len() - 1);
        points.extend_from_slice(&left.points[..left.points.len() - 1]);
        points.push(seam);
        for point in &mut points {
            point.time *= ratio;
            point.scale_tangents(ratio);
        }
        if let Some(seam) = points.last_mut() {
            // out-tangent came from the right curve and was scaled by the wrong factor
            seam.out_tangent = right_first.out_tangent.scaled_time(1.0 - ratio);
            seam.refresh_alignment();
        }
        for point in &right.points[1..] {
            let mut point = *point;
            point.time = ratio + point.time * (1.0 - ratio);
            point.scale_tangents(1.0 - ratio);
            points.push(point);
        }
        pin_endpoints(&mut points);
        Curve { points }
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::flat(0.0)
    }
}

/// Re-anchor the endpoints after renormalization rounding
fn pin_endpoints(points: &mut [ControlPoint]) {
    if let Some(first) = points.first_mut() {
        first.time = 0.0;
    }
    if let Some(last) = points.last_mut() {
        last.time = 1.0;
    }
}

fn evaluate_span(a: &ControlPoint, b: &ControlPoint, t: f32) -> f32 {
    let width = b.time - a.time;
    if width <= 0.0 || t >= b.time {
        return b.value;
    }
    if t <= a.time {
        return a.value;
    }
    match a.interpolation {
        InterpolationMode::Linear => Interpolation::lerp(a.value, b.value, (t - a.time) / width),
        InterpolationMode::Bezier => {
            let [p0, p1, p2, p3] = bezier_controls(a, b);
            let s = Interpolation::solve_bezier(p0[0], p1[0], p2[0], p3[0], t);
            Interpolation::bezier(p0[1], p1[1], p2[1], p3[1], s)
        }
    }
}

/// Control polygon of the span `a -> b`, with handle times kept inside the
/// span so time stays monotonic along the curve.
fn bezier_controls(a: &ControlPoint, b: &ControlPoint) -> [[f32; 2]; 4] {
    let width = b.time - a.time;
    [
        [a.time, a.value],
        [
            a.time + a.out_tangent.time.clamp(0.0, width),
            a.value + a.out_tangent.value,
        ],
        [
            b.time + b.in_tangent.time.clamp(-width, 0.0),
            b.value + b.in_tangent.value,
        ],
        [b.time, b.value],
    ]
}

/// Split the span `a -> b` at time `u`, returning the updated ends and the new point
fn cut_span(a: &ControlPoint, b: &ControlPoint, u: f32) -> (ControlPoint, ControlPoint, ControlPoint) {
    let mut a = *a;
    let mut b = *b;
    let mut mid = ControlPoint::new(u, evaluate_span(&a, &b, u).clamp(0.0, 1.0), a.interpolation);

    if a.interpolation == InterpolationMode::Bezier {
        let ctrl = bezier_controls(&a, &b);
        let s = Interpolation::solve_bezier(ctrl[0][0], ctrl[1][0], ctrl[2][0], ctrl[3][0], u);
        let (l, r) = Interpolation::subdivide(ctrl, s);
        a.out_tangent = Tangent::new(l[1][0] - l[0][0], l[1][1] - l[0][1]);
        mid.in_tangent = Tangent::new(l[2][0] - l[3][0], l[2][1] - l[3][1]);
        mid.out_tangent = Tangent::new(r[1][0] - r[0][0], r[1][1] - r[0][1]);
        b.in_tangent = Tangent::new(r[2][0] - r[3][0], r[2][1] - r[3][1]);
        a.refresh_alignment();
        b.refresh_alignment();
        mid.refresh_alignment();
    }
    (a, b, mid)
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Cubic bezier interpolation
    pub fn bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        p0 * mt3 + 3.0 * p1 * mt2 * t + 3.0 * p2 * mt * t2 + p3 * t3
    }

    /// Find the bezier parameter whose time coordinate is `x`, by bisection.
    /// Assumes the time coordinates are monotonic.
    pub fn solve_bezier(x0: f32, x1: f32, x2: f32, x3: f32, x: f32) -> f32 {
        if x <= x0 {
            return 0.0;
        }
        if x >= x3 {
            return 1.0;
        }
        let mut lo = 0.0f32;
        let mut hi = 1.0f32;
        let mut mid = 0.5f32;
        for _ in 0..32 {
            let xm = Self::bezier(x0, x1, x2, x3, mid);
            if (xm - x).abs() < 1.0e-7 {
                break;
            }
            if xm < x {
                lo = mid;
            } else {
                hi = mid;
            }
            mid = 0.5 * (lo + hi);
        }
        mid
    }

    /// De Casteljau subdivision of a 2D cubic at parameter `s`
    pub fn subdivide(ctrl: [[f32; 2]; 4], s: f32) -> ([[f32; 2]; 4], [[f32; 2]; 4]) {
        let lerp2 = |a: [f32; 2], b: [f32; 2]| [Self::lerp(a[0], b[0], s), Self::lerp(a[1], b[1], s)];
        let q0 = lerp2(ctrl[0], ctrl[1]);
        let q1 = lerp2(ctrl[1], ctrl[2]);
        let q2 = lerp2(ctrl[2], ctrl[3]);
        let r0 = lerp2(q0, q1);
        let r1 = lerp2(q1, q2);
        let split = lerp2(r0, r1);
        ([ctrl[0], q0, r0, split], [split, r1, q2, ctrl[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bezier_curve() -> Curve {
        let mut curve = Curve::linear(0.2, 0.9);
        curve.set_interpolation(InterpolationMode::Bezier);
        assert!(curve.change_tangent(0, TangentSide::Out, 0.3, 0.4));
        assert!(curve.change_tangent(1, TangentSide::In, -0.25, 0.1));
        curve
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1.0e-3, "{a} != {b}");
    }

    #[test]
    fn test_boundary_law() {
        for curve in [Curve::linear(0.3, 0.7), bezier_curve(), Curve::flat(1.0)] {
            assert_eq!(curve.evaluate(0.0), curve.points()[0].value);
            assert_eq!(curve.evaluate(1.0), curve.points()[curve.point_count() - 1].value);
        }
    }

    #[test]
    fn test_linear_evaluation() {
        let curve = Curve::linear(0.0, 1.0);
        assert_close(curve.evaluate(0.25), 0.25);
        assert_close(curve.evaluate(0.5), 0.5);
        // out of range input clamps
        assert_eq!(curve.evaluate(2.0), 1.0);
    }

    #[test]
    fn test_bezier_flat_handles_ease_in_out() {
        let mut curve = Curve::linear(0.0, 1.0);
        curve.set_interpolation(InterpolationMode::Bezier);
        // zero-length handles degenerate to a straight line
        assert_close(curve.evaluate(0.25), 0.25);

        assert!(curve.change_tangent(0, TangentSide::Out, 0.3, 0.0));
        assert!(curve.change_tangent(1, TangentSide::In, -0.3, 0.0));
        // symmetric ease: midpoint stays at the middle, ends flatten out
        assert_close(curve.evaluate(0.5), 0.5);
        assert!(curve.evaluate(0.1) < 0.1);
        assert!(curve.evaluate(0.9) > 0.9);
    }

    #[test]
    fn test_insert_point_keeps_shape() {
        let mut curve = Curve::linear(0.0, 1.0);
        assert_eq!(curve.insert_point(0.4), Some(1));
        assert_close(curve.points()[1].value, 0.4);
        assert_eq!(curve.point_count(), 3);
        assert!(curve.validate().is_ok());

        // on an existing time or outside (0, 1): no-op
        assert_eq!(curve.insert_point(0.4), None);
        assert_eq!(curve.insert_point(0.0), None);
        assert_eq!(curve.insert_point(1.5), None);
        assert_eq!(curve.point_count(), 3);
    }

    #[test]
    fn test_endpoints_are_not_removable() {
        let mut curve = Curve::linear(0.0, 1.0);
        curve.insert_point(0.5);
        assert!(!curve.remove_point(0));
        assert!(!curve.remove_point(2));
        assert!(curve.remove_point(1));
        assert_eq!(curve.point_count(), 2);
    }

    #[test]
    fn test_move_point_respects_order_and_range() {
        let mut curve = Curve::linear(0.0, 1.0);
        curve.insert_point(0.5);

        assert!(curve.move_point(1, 0.1, 0.8));
        assert_close(curve.points()[1].time, 0.6);
        assert_eq!(curve.points()[1].value, 1.0);

        // crossing the neighbour keeps the time
        assert!(curve.move_point(1, 0.5, 0.0));
        assert_close(curve.points()[1].time, 0.6);

        // endpoints never move in time
        assert!(curve.move_point(0, 0.2, -0.5));
        assert_eq!(curve.points()[0].time, 0.0);
        assert_eq!(curve.points()[0].value, 0.0);

        assert!(!curve.move_point(7, 0.0, 0.0));
    }

    #[test]
    fn test_non_finite_deltas_leave_curve_untouched() {
        let mut curve = Curve::linear(0.2, 0.8);
        curve.insert_point(0.5);
        let before = curve.clone();

        assert!(!curve.move_point(1, 0.0, f32::NAN));
        assert!(!curve.move_point(1, f32::INFINITY, 0.0));
        assert!(!curve.change_tangent(1, TangentSide::Out, f32::NAN, 0.0));
        assert!(!curve.change_tangent(1, TangentSide::In, 0.0, f32::NEG_INFINITY));
        curve.set_start_value(f32::NAN);
        curve.set_end_value(f32::INFINITY);
        assert_eq!(curve, before);
        assert!(curve.validate().is_ok());
    }

    #[test]
    fn test_aligned_tangents_mirror() {
        let mut curve = Curve::linear(0.0, 1.0);
        assert!(curve.change_tangent(0, TangentSide::Out, 0.2, 0.1));
        let point = curve.points()[0];
        assert_eq!(point.in_tangent, Tangent::new(-0.2, -0.1));

        // an out-tangent pointing back in time is rejected
        assert!(!curve.change_tangent(0, TangentSide::Out, -0.5, 0.0));
        assert_eq!(curve.points()[0], point);
        assert!(!curve.change_tangent(5, TangentSide::In, 0.0, 0.0));
        assert!(curve.validate().is_ok());
    }

    #[test]
    fn test_split_then_join_restores_linear_curve() {
        let mut curve = Curve::linear(0.0, 1.0);
        curve.insert_point(0.7);
        curve.move_point(1, 0.0, 0.2);

        let (left, right) = curve.split_at(0.4).unwrap();
        assert!(left.validate().is_ok());
        assert!(right.validate().is_ok());
        assert_close(left.end_value(), curve.evaluate(0.4));
        assert_close(right.start_value(), curve.evaluate(0.4));

        let joined = Curve::join(&left, &right, 0.4);
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            assert_close(joined.evaluate(t), curve.evaluate(t));
        }
    }

    #[test]
    fn test_split_bezier_traces_original() {
        let curve = bezier_curve();
        let u = 0.35;
        let (left, right) = curve.split_at(u).unwrap();
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert_close(left.evaluate(t), curve.evaluate(t * u));
            assert_close(right.evaluate(t), curve.evaluate(u + t * (1.0 - u)));
        }
        let joined = Curve::join(&left, &right, u);
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            assert_close(joined.evaluate(t), curve.evaluate(t));
        }
    }

    #[test]
    fn test_split_rejects_bounds() {
        let curve = Curve::flat(0.5);
        assert!(curve.split_at(0.0).is_none());
        assert!(curve.split_at(1.0).is_none());
    }

    #[test]
    fn test_validate_catches_defects() {
        let p = |t, v| ControlPoint::new(t, v, InterpolationMode::Linear);
        assert_eq!(Curve::from_points(vec![p(0.0, 0.0)]), Err(CurveError::TooFewPoints(1)));
        assert_eq!(
            Curve::from_points(vec![p(0.0, 0.0), p(0.5, 0.0)]),
            Err(CurveError::BadEndpoints)
        );
        assert_eq!(
            Curve::from_points(vec![p(0.0, 0.0), p(0.6, 0.0), p(0.6, 0.0), p(1.0, 0.0)]),
            Err(CurveError::NotIncreasing(2))
        );
        assert_eq!(
            Curve::from_points(vec![p(0.0, 0.0), p(1.0, 1.5)]),
            Err(CurveError::ValueOutOfRange(1))
        );
        let mut skewed = p(1.0, 0.0);
        skewed.out_tangent = Tangent::new(0.1, 0.0);
        assert_eq!(
            Curve::from_points(vec![p(0.0, 0.0), skewed]),
            Err(CurveError::MisalignedTangents(1))
        );
    }
}
