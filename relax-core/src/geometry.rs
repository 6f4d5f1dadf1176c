//! Small 2-D geometry helpers shared by the border projector and the
//! relaxation steps.
//!
//! Everything here is a pure function over [`Vec2`]. Angles are in radians
//! and counter-clockwise positive, so [`rotate`] undoes [`signed_rotation`]:
//! `rotate(a, signed_rotation(a, b))` points the same way as `b`.

use glam::Vec2;

/// Canonical outward direction of a left arm.
pub const LEFT: Vec2 = Vec2::NEG_X;
/// Canonical outward direction of a right arm.
pub const RIGHT: Vec2 = Vec2::X;
/// Canonical outward direction of an up arm.
pub const UP: Vec2 = Vec2::NEG_Y;
/// Canonical outward direction of a down arm.
pub const DOWN: Vec2 = Vec2::Y;

/// Returns the point on the segment `a`–`b` closest to `p`.
///
/// The segment is finite: the projection parameter is clamped to `[0, 1]`.
/// A zero-length segment collapses to `a`.
///
/// ### Parameters
/// - `a` - Start of the segment.
/// - `b` - End of the segment.
/// - `p` - Query point.
///
/// ### Returns
/// The closest point on the segment.
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return a;
    }

    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

/// Rotates `v` counter-clockwise by `angle` radians.
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Signed angle in `(-π, π]` that carries direction `from` onto direction `to`.
///
/// Neither input needs to be normalized. A zero vector on either side yields
/// `0.0` rather than NaN.
#[inline]
pub fn signed_rotation(from: Vec2, to: Vec2) -> f32 {
    from.perp_dot(to).atan2(from.dot(to))
}

/// Unit direction from `from` towards `to`, or zero if the points coincide.
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}
