//! Field-space geometry helpers shared by every system.
//!
//! All functions are total: any finite input produces a defined result, and
//! zero-length vectors are branched around before normalizing.

use glam::Vec2;

/// Distances at or below this value are treated as coincident points.
const COINCIDENT_EPSILON: f32 = 0.001;

/// Edge of a rectangle that a circle was pushed through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Edge with the smallest x coordinate.
    Left,
    /// Edge with the largest x coordinate.
    Right,
    /// Edge with the smallest y coordinate.
    Top,
    /// Edge with the largest y coordinate.
    Bottom,
}

/// Axis-aligned rectangle described by its centre and half extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    center: Vec2,
    half_extents: Vec2,
}

impl Rect {
    /// Constructs a rectangle centred on `center` with the provided full size.
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half_extents: size.abs() * 0.5,
        }
    }

    /// Constructs a rectangle spanning the provided edges.
    #[must_use]
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        let min = Vec2::new(left.min(right), top.min(bottom));
        let max = Vec2::new(left.max(right), top.max(bottom));
        Self::from_center((min + max) * 0.5, max - min)
    }

    /// Centre of the rectangle.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Full width and height of the rectangle.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// Smallest x coordinate covered by the rectangle.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.center.x - self.half_extents.x
    }

    /// Largest x coordinate covered by the rectangle.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.center.x + self.half_extents.x
    }

    /// Smallest y coordinate covered by the rectangle.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.center.y - self.half_extents.y
    }

    /// Largest y coordinate covered by the rectangle.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.half_extents.y
    }

    /// Reports whether the point lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Returns the point on the rectangle closest to `point`.
    ///
    /// Points outside are clamped onto the boundary. Points inside are
    /// projected onto the nearest edge so that the result is always a contact
    /// point on the outline.
    #[must_use]
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        if !self.contains(point) {
            return Vec2::new(
                point.x.max(self.left()).min(self.right()),
                point.y.max(self.top()).min(self.bottom()),
            );
        }

        match self.nearest_side(point) {
            Side::Left => Vec2::new(self.left(), point.y),
            Side::Right => Vec2::new(self.right(), point.y),
            Side::Top => Vec2::new(point.x, self.top()),
            Side::Bottom => Vec2::new(point.x, self.bottom()),
        }
    }

    /// Reports whether the rectangles overlap once `self` is grown by `padding`.
    ///
    /// Touching edges do not count as overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect, padding: f32) -> bool {
        self.left() - padding < other.right()
            && self.right() + padding > other.left()
            && self.top() - padding < other.bottom()
            && self.bottom() + padding > other.top()
    }

    /// Moves a circle whose centre lies inside the rectangle just past the
    /// nearest edge.
    ///
    /// Returns the new centre together with the edge crossed, or `None` when
    /// the centre already lies outside.
    #[must_use]
    pub fn push_out_circle(&self, center: Vec2, radius: f32, padding: f32) -> Option<(Vec2, Side)> {
        if !self.contains(center) {
            return None;
        }

        let clearance = radius + padding;
        let side = self.nearest_side(center);
        let pushed = match side {
            Side::Left => Vec2::new(self.left() - clearance, center.y),
            Side::Right => Vec2::new(self.right() + clearance, center.y),
            Side::Top => Vec2::new(center.x, self.top() - clearance),
            Side::Bottom => Vec2::new(center.x, self.bottom() + clearance),
        };
        Some((pushed, side))
    }

    fn nearest_side(&self, point: Vec2) -> Side {
        let candidates = [
            (point.x - self.left(), Side::Left),
            (self.right() - point.x, Side::Right),
            (point.y - self.top(), Side::Top),
            (self.bottom() - point.y, Side::Bottom),
        ];

        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.0 < best.0 {
                best = *candidate;
            }
        }
        best.1
    }
}

/// Unit direction and distance from `from` to `to`.
///
/// Coincident points yield a zero direction alongside their (tiny) distance.
#[must_use]
pub fn heading(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let distance = delta.length();
    if distance <= COINCIDENT_EPSILON {
        return (Vec2::ZERO, distance);
    }
    (delta / distance, distance)
}
