//! Ear clipping triangulation of simple polygons.
//!
//! Ears are searched clockwise: a vertex is an ear when its triangle with
//! its two neighbors has negative signed area and contains no other
//! remaining vertex (boundary inclusive). Counter-clockwise input is
//! handled by walking the index list backwards, so emitted triangles are
//! always clockwise and always refer to the caller's vertex indices.
//!
//! Each clip rescans the working list and removes from the middle of a
//! `Vec`, so the cost is O(n^2) in the vertex count. Piece outlines have
//! tens of vertices; this is not meant for large polygons.

use serde::{Deserialize, Serialize};

use crate::geometry::{point_in_triangle, polygon_signed_area, signed_area, Vec2};

/// Hard limit on clipped ears, guarding against malformed input.
pub const MAX_CLIPS: usize = 1000;

/// Outcome of a triangulation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriangulationStatus {
    /// The polygon was fully tiled with `n - 2` triangles.
    Complete,
    /// No ear could be found with this many vertices left.
    Partial { remaining_vertices: usize },
    /// Stopped after [`MAX_CLIPS`] clips.
    IterationCap,
    /// Fewer than three vertices.
    Degenerate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Triangulation {
    /// Vertex index triples, clockwise.
    pub triangles: Vec<[u32; 3]>,
    pub status: TriangulationStatus,
}

impl Triangulation {
    pub fn is_complete(&self) -> bool {
        self.status == TriangulationStatus::Complete
    }

    /// Flat index buffer: every three indices form one triangle.
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    pub fn into_result(self) -> Result<Vec<[u32; 3]>, TriangulationError> {
        match self.status {
            TriangulationStatus::Complete => Ok(self.triangles),
            TriangulationStatus::Partial { remaining_vertices } => Err(TriangulationError::NoEar {
                remaining_vertices,
                triangles: self.triangles.len(),
            }),
            TriangulationStatus::IterationCap => Err(TriangulationError::IterationCap),
            TriangulationStatus::Degenerate => Err(TriangulationError::TooFewVertices),
        }
    }
}

/// Triangulation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangulationError {
    TooFewVertices,
    NoEar {
        remaining_vertices: usize,
        triangles: usize,
    },
    IterationCap,
}

impl std::fmt::Display for TriangulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriangulationError::TooFewVertices => write!(f, "Polygon needs at least 3 vertices"),
            TriangulationError::NoEar {
                remaining_vertices,
                triangles,
            } => write!(
                f,
                "No ear found with {} vertices left after {} triangles",
                remaining_vertices, triangles
            ),
            TriangulationError::IterationCap => {
                write!(f, "Ear clipping stopped after {} clips", MAX_CLIPS)
            }
        }
    }
}

impl std::error::Error for TriangulationError {}

/// Triangulate a simple polygon by ear clipping.
///
/// Returns whatever triangles were found even when the polygon cannot be
/// fully clipped; check [`Triangulation::status`].
pub fn triangulate(points: &[Vec2]) -> Triangulation {
    let n = points.len();
    if n < 3 {
        return Triangulation {
            triangles: Vec::new(),
            status: TriangulationStatus::Degenerate,
        };
    }

    let mut remaining: Vec<usize> = (0..n).collect();
    if polygon_signed_area(points) > 0.0 {
        remaining.reverse();
    }

    let mut triangles: Vec<[u32; 3]> = Vec::with_capacity(n - 2);
    let mut clips = 0usize;
    let mut status = TriangulationStatus::Complete;

    while remaining.len() > 3 {
        let len = remaining.len();
        let ear = (0..len).find(|&i| {
            let prev = remaining[(i + len - 1) % len];
            let next = remaining[(i + 1) % len];
            is_ear(points, &remaining, prev, remaining[i], next)
        });

        let Some(i) = ear else {
            status = TriangulationStatus::Partial {
                remaining_vertices: len,
            };
            break;
        };

        let prev = remaining[(i + len - 1) % len];
        let next = remaining[(i + 1) % len];
        triangles.push([prev as u32, remaining[i] as u32, next as u32]);
        remaining.remove(i);

        clips += 1;
        if clips >= MAX_CLIPS && remaining.len() > 3 {
            status = TriangulationStatus::IterationCap;
            break;
        }
    }

    if remaining.len() == 3 {
        triangles.push([remaining[0] as u32, remaining[1] as u32, remaining[2] as u32]);
    }

    if status != TriangulationStatus::Complete {
        tracing::warn!(
            "Ear clipping stuck: {:?} with {} triangles for {} vertices",
            status,
            triangles.len(),
            n
        );
    }

    Triangulation { triangles, status }
}

fn is_ear(points: &[Vec2], remaining: &[usize], prev: usize, curr: usize, next: usize) -> bool {
    let (a, b, c) = (points[prev], points[curr], points[next]);
    if signed_area(a, b, c) >= 0.0 {
        return false;
    }

    !remaining
        .iter()
        .filter(|&&vi| vi != prev && vi != curr && vi != next)
        .any(|&vi| point_in_triangle(points[vi], a, b, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::triangle_area;

    fn poly(coords: &[(f32, f32)]) -> Vec<Vec2> {
        coords.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
    }

    fn total_area(points: &[Vec2], tri: &Triangulation) -> f32 {
        tri.triangles
            .iter()
            .map(|t| triangle_area(points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]))
            .sum()
    }

    fn assert_clockwise(points: &[Vec2], tri: &Triangulation) {
        for t in &tri.triangles {
            let area = signed_area(points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]);
            assert!(area < 0.0, "triangle {:?} has signed area {}", t, area);
        }
    }

    #[test]
    fn test_clockwise_quad() {
        let points = poly(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        let tri = triangulate(&points);

        assert!(tri.is_complete());
        assert_eq!(tri.triangles, vec![[3, 0, 1], [1, 2, 3]]);
        assert!((total_area(&points, &tri) - 1.0).abs() < 1e-6);
        assert_eq!(tri.indices(), vec![3, 0, 1, 1, 2, 3]);
    }

    #[test]
    fn test_counter_clockwise_input_is_normalized() {
        let points = poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let tri = triangulate(&points);

        assert!(tri.is_complete());
        assert_eq!(tri.triangles.len(), 2);
        assert_clockwise(&points, &tri);
        assert!((total_area(&points, &tri) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_u_shape_concave() {
        let points = poly(&[
            (0.0, 0.0), (0.0, 2.0), (1.0, 2.0), (1.0, 1.0),
            (2.0, 1.0), (2.0, 2.0), (3.0, 2.0), (3.0, 0.0),
        ]);
        let tri = triangulate(&points);

        assert!(tri.is_complete());
        assert_eq!(tri.triangles.len(), points.len() - 2);
        assert_clockwise(&points, &tri);
        assert!((total_area(&points, &tri) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_collinear_vertices() {
        // Domino outline with its two edge midpoints still present.
        let points = poly(&[
            (0.0, 1.0), (1.0, 1.0), (2.0, 1.0), (2.0, 0.0), (1.0, 0.0), (0.0, 0.0),
        ]);
        let tri = triangulate(&points);

        assert!(tri.is_complete());
        assert_eq!(tri.triangles.len(), 4);
        assert_clockwise(&points, &tri);
        assert!((total_area(&points, &tri) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_passthrough() {
        let points = poly(&[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)]);
        let tri = triangulate(&points);
        assert!(tri.is_complete());
        assert_eq!(tri.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_degenerate_input() {
        let tri = triangulate(&poly(&[(0.0, 0.0), (1.0, 1.0)]));
        assert_eq!(tri.status, TriangulationStatus::Degenerate);
        assert!(tri.triangles.is_empty());
        assert_eq!(tri.into_result(), Err(TriangulationError::TooFewVertices));
    }

    #[test]
    fn test_all_collinear_finds_no_ear() {
        let points = poly(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
        let tri = triangulate(&points);
        assert_eq!(tri.status, TriangulationStatus::Partial { remaining_vertices: 4 });
        assert!(tri.triangles.is_empty());
        assert!(matches!(tri.into_result(), Err(TriangulationError::NoEar { .. })));
    }

    /// Clockwise fan: an apex above a run of collinear base points.
    /// Needs `vertex_count - 3` clips.
    fn fan(vertex_count: usize) -> Vec<Vec2> {
        let base = vertex_count - 1;
        let mut points = vec![Vec2::new(0.0, 1.0)];
        points.extend((0..base).rev().map(|k| Vec2::new(k as f32, 0.0)));
        points
    }

    #[test]
    fn test_clip_cap_boundary() {
        let points = fan(1003);
        assert!(polygon_signed_area(&points) < 0.0);
        let tri = triangulate(&points);
        assert_eq!(tri.status, TriangulationStatus::Complete);
        assert_eq!(tri.triangles.len(), 1001);

        let tri = triangulate(&fan(1005));
        assert_eq!(tri.status, TriangulationStatus::IterationCap);
        assert_eq!(tri.triangles.len(), MAX_CLIPS);
        assert_eq!(tri.into_result(), Err(TriangulationError::IterationCap));
    }
}
