//! 2D geometry helpers shared by outline extraction and triangulation.

use serde::{Deserialize, Serialize};

/// Distance below which two points are treated as the same point.
pub const POINT_EPSILON: f32 = 0.01;

/// Slack allowed when comparing triangle areas in the containment test.
pub const AREA_EPSILON: f32 = 0.01;

/// A 2D point or vector.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    /// z component of the 3D cross product.
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        self.sub(other).length()
    }

    pub fn approx_eq(self, other: Vec2) -> bool {
        self.distance(other) < POINT_EPSILON
    }
}

/// Rotation sense of a closed polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winding {
    /// Negative signed area with +y up
    #[default]
    Clockwise,
    CounterClockwise,
}

/// Twice the signed area of triangle (a, b, c): `(b - a) x (c - a)`.
/// Negative for clockwise order.
pub fn signed_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    b.sub(a).cross(c.sub(a))
}

/// Unsigned triangle area.
pub fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    signed_area(a, b, c).abs() * 0.5
}

/// Inclusive point-in-triangle test: `p` is inside or on the boundary when the
/// three sub-triangles it forms with the edges add up to the full triangle.
pub fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let area = signed_area(a, b, c).abs();
    let area1 = signed_area(p, a, b).abs();
    let area2 = signed_area(p, b, c).abs();
    let area3 = signed_area(p, c, a).abs();
    (area - (area1 + area2 + area3)).abs() < AREA_EPSILON
}

/// Shoelace signed area of a closed polygon (edge from last to first implied).
/// Negative for clockwise polygons.
pub fn polygon_signed_area(points: &[Vec2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: f32 = (0..n)
        .map(|i| points[i].cross(points[(i + 1) % n]))
        .sum();
    twice * 0.5
}

/// Winding of a polygon, or `None` if it has no area.
pub fn polygon_winding(points: &[Vec2]) -> Option<Winding> {
    let area = polygon_signed_area(points);
    if area < 0.0 {
        Some(Winding::Clockwise)
    } else if area > 0.0 {
        Some(Winding::CounterClockwise)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn test_signed_area_orientation() {
        // Counter-clockwise with +y up
        assert!(signed_area(v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)) > 0.0);
        // Clockwise
        assert!(signed_area(v(0.0, 0.0), v(0.0, 1.0), v(1.0, 0.0)) < 0.0);
        // Collinear
        assert_eq!(signed_area(v(0.0, 0.0), v(1.0, 1.0), v(2.0, 2.0)), 0.0);
        assert!((triangle_area(v(0.0, 0.0), v(2.0, 0.0), v(0.0, 2.0)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_in_triangle_inclusive() {
        let (a, b, c) = (v(0.0, 0.0), v(0.0, 2.0), v(2.0, 0.0));
        assert!(point_in_triangle(v(0.5, 0.5), a, b, c));
        // On an edge and on a corner
        assert!(point_in_triangle(v(1.0, 1.0), a, b, c));
        assert!(point_in_triangle(v(0.0, 0.0), a, b, c));
        assert!(!point_in_triangle(v(1.5, 1.5), a, b, c));
        assert!(!point_in_triangle(v(-0.5, 0.5), a, b, c));
    }

    #[test]
    fn test_unit_square_area_and_winding() {
        let cw = [v(0.0, 0.0), v(0.0, 1.0), v(1.0, 1.0), v(1.0, 0.0)];
        assert!((polygon_signed_area(&cw) + 1.0).abs() < 1e-6);
        assert_eq!(polygon_winding(&cw), Some(Winding::Clockwise));

        let mut ccw = cw;
        ccw.reverse();
        assert_eq!(polygon_winding(&ccw), Some(Winding::CounterClockwise));
        assert_eq!(polygon_winding(&cw[..2]), None);
    }

    #[test]
    fn test_approx_eq() {
        assert!(v(1.0, 1.0).approx_eq(v(1.005, 1.0)));
        assert!(!v(1.0, 1.0).approx_eq(v(1.02, 1.0)));
    }
}
