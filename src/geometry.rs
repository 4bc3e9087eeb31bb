//! Geometry primitives for the layout pipeline
//!
//! Coordinates are free 2D vectors. A [`GridBox`] is an axis-aligned box
//! described by its bottom-left `origin` and a non-negative `diagonal`.
//! Anchors name the five reference points transformations attach to.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A point or free vector in layout space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const ZERO: Coordinate = Coordinate { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Same value on both axes
    pub fn splat(v: f64) -> Self {
        Self { x: v, y: v }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Point reflection through the origin
    pub fn reflect(self) -> Self {
        Self::new(-self.x, -self.y)
    }

    /// Mirror across the vertical axis
    pub fn reflect_x(self) -> Self {
        Self::new(-self.x, self.y)
    }

    /// Mirror across the horizontal axis
    pub fn reflect_y(self) -> Self {
        Self::new(self.x, -self.y)
    }

    /// Rotate counter-clockwise about the origin.
    ///
    /// Quarter turns are computed exactly so that grid-aligned vectors stay
    /// on integer values.
    pub fn rotate(self, angle_degrees: f64) -> Self {
        let turns = angle_degrees / 90.0;
        if turns.fract() == 0.0 {
            return match (turns as i64).rem_euclid(4) {
                0 => self,
                1 => Self::new(-self.y, self.x),
                2 => self.reflect(),
                _ => Self::new(self.y, -self.x),
            };
        }

        let radians = angle_degrees.to_radians();
        let (sin_a, cos_a) = radians.sin_cos();
        Self::new(
            self.x * cos_a - self.y * sin_a,
            self.x * sin_a + self.y * cos_a,
        )
    }

    /// Component-wise absolute value
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Component-wise minimum
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Project onto one axis
    pub fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

impl Add for Coordinate {
    type Output = Coordinate;

    fn add(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Coordinate {
    fn add_assign(&mut self, rhs: Coordinate) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Coordinate {
    type Output = Coordinate;

    fn sub(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Coordinate {
    fn sub_assign(&mut self, rhs: Coordinate) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the two layout axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Unit vector along this axis, scaled by `amount`
    pub fn vector(self, amount: f64) -> Coordinate {
        match self {
            Axis::X => Coordinate::new(amount, 0.0),
            Axis::Y => Coordinate::new(0.0, amount),
        }
    }
}

/// Named reference point on a [`GridBox`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
    Center,
}

impl Anchor {
    pub const ALL: [Anchor; 5] = [
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::Center,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::BottomLeft => "bottomLeft",
            Anchor::BottomRight => "bottomRight",
            Anchor::TopLeft => "topLeft",
            Anchor::TopRight => "topRight",
            Anchor::Center => "center",
        }
    }

    /// Comma-separated list of every anchor name, for error messages
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Axis-aligned box with a bottom-left origin and a non-negative diagonal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridBox {
    pub origin: Coordinate,
    diagonal: Coordinate,
}

impl GridBox {
    /// Build a box, normalizing a negative diagonal to its absolute value
    pub fn new(origin: Coordinate, diagonal: Coordinate) -> Self {
        Self {
            origin,
            diagonal: diagonal.abs(),
        }
    }

    /// Box of the given size sitting at `(0, 0)`
    pub fn at_origin(diagonal: Coordinate) -> Self {
        Self::new(Coordinate::ZERO, diagonal)
    }

    /// Degenerate box at `(0, 0)` with no extent
    pub fn empty() -> Self {
        Self::new(Coordinate::ZERO, Coordinate::ZERO)
    }

    pub fn diagonal(&self) -> Coordinate {
        self.diagonal
    }

    pub fn width(&self) -> f64 {
        self.diagonal.x
    }

    pub fn height(&self) -> f64 {
        self.diagonal.y
    }

    /// Extent along one axis
    pub fn extent(&self, axis: Axis) -> f64 {
        self.diagonal.along(axis)
    }

    /// Corner opposite the origin
    pub fn far_corner(&self) -> Coordinate {
        self.origin + self.diagonal
    }

    /// Resolve a named anchor to a point
    pub fn anchor(&self, anchor: Anchor) -> Coordinate {
        match anchor {
            Anchor::BottomLeft => self.origin,
            Anchor::BottomRight => self.origin + Coordinate::new(self.diagonal.x, 0.0),
            Anchor::TopLeft => self.origin + Coordinate::new(0.0, self.diagonal.y),
            Anchor::TopRight => self.origin + self.diagonal,
            Anchor::Center => self.origin + self.diagonal.scale(0.5),
        }
    }

    /// Move the whole box; its shape is unchanged
    pub fn translate(&mut self, by: Coordinate) {
        self.origin += by;
    }

    /// Smallest box covering both `self` and `other`
    pub fn union(&self, other: &GridBox) -> GridBox {
        let min = self.origin.min(other.origin);
        let max = self.far_corner().max(other.far_corner());
        GridBox::new(min, max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_arithmetic() {
        let a = Coordinate::new(1.0, 2.0);
        let b = Coordinate::new(3.0, -1.0);
        assert_eq!(a + b, Coordinate::new(4.0, 1.0));
        assert_eq!(a - b, Coordinate::new(-2.0, 3.0));
        assert_eq!(a.scale(2.0), Coordinate::new(2.0, 4.0));
        assert_eq!(a.reflect(), Coordinate::new(-1.0, -2.0));
        assert_eq!(a.reflect_x(), Coordinate::new(-1.0, 2.0));
        assert_eq!(a.reflect_y(), Coordinate::new(1.0, -2.0));
    }

    #[test]
    fn test_rotate_quarter_turns_are_exact() {
        let v = Coordinate::new(2.0, 1.0);
        assert_eq!(v.rotate(90.0), Coordinate::new(-1.0, 2.0));
        assert_eq!(v.rotate(180.0), Coordinate::new(-2.0, -1.0));
        assert_eq!(v.rotate(-90.0), Coordinate::new(1.0, -2.0));
        assert_eq!(v.rotate(360.0), v);
    }

    #[test]
    fn test_rotate_arbitrary_angle() {
        let r = Coordinate::new(1.0, 0.0).rotate(45.0);
        let half_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
        assert!((r.x - half_sqrt2).abs() < 1e-12);
        assert!((r.y - half_sqrt2).abs() < 1e-12);
    }

    #[test]
    fn test_negative_diagonal_is_normalized() {
        let b = GridBox::new(Coordinate::new(1.0, 1.0), Coordinate::new(-2.0, -3.0));
        assert_eq!(b.diagonal(), Coordinate::new(2.0, 3.0));
        assert_eq!(b.origin, Coordinate::new(1.0, 1.0));
    }

    #[test]
    fn test_anchor_resolution() {
        let b = GridBox::at_origin(Coordinate::new(2.0, 1.0));
        assert_eq!(b.anchor(Anchor::BottomLeft), Coordinate::new(0.0, 0.0));
        assert_eq!(b.anchor(Anchor::BottomRight), Coordinate::new(2.0, 0.0));
        assert_eq!(b.anchor(Anchor::TopLeft), Coordinate::new(0.0, 1.0));
        assert_eq!(b.anchor(Anchor::TopRight), Coordinate::new(2.0, 1.0));
        assert_eq!(b.anchor(Anchor::Center), Coordinate::new(1.0, 0.5));
    }

    #[test]
    fn test_anchor_from_str() {
        assert_eq!("topRight".parse::<Anchor>(), Ok(Anchor::TopRight));
        assert_eq!("top_right".parse::<Anchor>(), Err("top_right".to_string()));
    }

    #[test]
    fn test_translate_preserves_shape() {
        let mut b = GridBox::at_origin(Coordinate::new(3.0, 2.0));
        b.translate(Coordinate::new(-1.0, 4.0));
        assert_eq!(b.origin, Coordinate::new(-1.0, 4.0));
        assert_eq!(b.diagonal(), Coordinate::new(3.0, 2.0));
    }

    #[test]
    fn test_union() {
        let a = GridBox::new(Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 1.0));
        let b = GridBox::new(Coordinate::new(3.0, -1.0), Coordinate::new(1.0, 1.0));
        let u = a.union(&b);
        assert_eq!(u.origin, Coordinate::new(0.0, -1.0));
        assert_eq!(u.diagonal(), Coordinate::new(4.0, 2.0));
    }
}
