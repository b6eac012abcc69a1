//! Axis-aligned rectangles and guarded vector helpers shared by every mover.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Direction adopted whenever a requested direction has no length.
pub const FALLBACK_DIRECTION: Vec2 = Vec2::new(1.0, 0.0);

/// Axis-aligned rectangle measured in world pixels.
///
/// The origin is the upper-left corner and `y` grows downwards, matching the
/// screen-space convention used by room templates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a rectangle from its upper-left corner and dimensions.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle of the provided size centred on `center`.
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    /// Horizontal coordinate of the upper-left corner.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the upper-left corner.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Width of the rectangle.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the rectangle.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Centre point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Dimensions packed into a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Moves the rectangle so its left edge sits at `value`.
    pub fn set_left(&mut self, value: f32) {
        self.x = value;
    }

    /// Moves the rectangle so its right edge sits at `value`.
    pub fn set_right(&mut self, value: f32) {
        self.x = value - self.width;
    }

    /// Moves the rectangle so its top edge sits at `value`.
    pub fn set_top(&mut self, value: f32) {
        self.y = value;
    }

    /// Moves the rectangle so its bottom edge sits at `value`.
    pub fn set_bottom(&mut self, value: f32) {
        self.y = value - self.height;
    }

    /// Moves the rectangle so its centre sits at `center`.
    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x - self.width / 2.0;
        self.y = center.y - self.height / 2.0;
    }

    /// Shifts the rectangle by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Returns a copy shifted by `delta`.
    #[must_use]
    pub fn translated(mut self, delta: Vec2) -> Self {
        self.translate(delta);
        self
    }

    /// Grows (or shrinks, for negative amounts) the rectangle around its centre.
    ///
    /// `dw` and `dh` are the total change in width and height, so an inset of
    /// 15 px on each side is expressed as `inflate(-30.0, ..)`.
    #[must_use]
    pub fn inflate(self, dw: f32, dh: f32) -> Self {
        let width = (self.width + dw).max(0.0);
        let height = (self.height + dh).max(0.0);
        Self::from_center(self.center(), Vec2::new(width, height))
    }

    /// Reports whether the interiors of both rectangles overlap.
    ///
    /// Rectangles that merely share an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Reports whether `point` lies inside the rectangle (right and bottom edges excluded).
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Smallest rectangle enclosing both points, grown by `margin` on every side.
    #[must_use]
    pub fn spanning(a: Vec2, b: Vec2, margin: f32) -> Self {
        let min = a.min(b) - Vec2::splat(margin);
        let max = a.max(b) + Vec2::splat(margin);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }
}

/// Normalises `vector`, returning `fallback` when it has no usable length.
#[must_use]
pub fn normalize_or(vector: Vec2, fallback: Vec2) -> Vec2 {
    let length = vector.length();
    if length.is_finite() && length > f32::EPSILON {
        vector / length
    } else {
        fallback
    }
}

/// Signed angle in radians that rotates `from` onto `to`.
///
/// Returns zero when either vector has no length.
#[must_use]
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    if from.length_squared() <= f32::EPSILON || to.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    from.perp_dot(to).atan2(from.dot(to))
}

/// Rotates `vector` by a quarter turn.
#[must_use]
pub fn rotate_quarter(vector: Vec2) -> Vec2 {
    vector.perp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(9.5, 9.5, 2.0, 2.0)));
    }

    #[test]
    fn inflate_preserves_center() {
        let rect = Rect::new(10.0, 20.0, 48.0, 48.0);
        let inset = rect.inflate(-30.0, -50.0);
        assert_eq!(inset.center(), rect.center());
        assert_eq!(inset.width(), 18.0);
        assert_eq!(inset.height(), 0.0);
    }

    #[test]
    fn edge_setters_move_without_resizing() {
        let mut rect = Rect::new(0.0, 0.0, 4.0, 6.0);
        rect.set_right(10.0);
        rect.set_bottom(20.0);
        assert_eq!(rect, Rect::new(6.0, 14.0, 4.0, 6.0));
    }

    #[test]
    fn zero_vector_uses_fallback() {
        assert_eq!(normalize_or(Vec2::ZERO, FALLBACK_DIRECTION), FALLBACK_DIRECTION);
        let unit = normalize_or(Vec2::new(3.0, 4.0), FALLBACK_DIRECTION);
        assert!((unit.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn signed_angle_reports_quarter_turn() {
        let angle = signed_angle(Vec2::X, Vec2::Y);
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(signed_angle(Vec2::ZERO, Vec2::Y), 0.0);
    }
}
