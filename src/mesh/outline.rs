//! Outline extraction: trace the boundary of a union of unit cells.
//!
//! Every cell side without a neighbor on the other side becomes a boundary
//! segment. Segments are emitted clockwise around each cell (+y up), so the
//! stitched loop of a simply-connected piece is clockwise too.
//!
//! Only one loop is traced. Holed or pinched cell sets leave segments over
//! and are reported as such rather than repaired.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::geometry::{signed_area, Vec2, AREA_EPSILON};
use crate::pieces::GridCoord;

/// A directed boundary edge between two cell corners.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Segment {
    start: Vec2,
    end: Vec2,
}

impl Segment {
    fn new(start: (i32, i32), end: (i32, i32)) -> Self {
        Self {
            start: Vec2::new(start.0 as f32, start.1 as f32),
            end: Vec2::new(end.0 as f32, end.1 as f32),
        }
    }
}

/// How far tracing got.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineStatus {
    /// One closed loop using every boundary segment.
    Closed,
    /// The walk ran into a dead end before getting back to its start.
    Open { unused_segments: usize },
    /// The first loop closed but other boundary loops (holes) remain.
    MultipleLoops { unused_segments: usize },
    /// Fewer than three points.
    Degenerate,
}

/// Traced outline plus its status.
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineTrace {
    pub points: Vec<Vec2>,
    pub status: OutlineStatus,
}

impl OutlineTrace {
    pub fn is_closed(&self) -> bool {
        self.status == OutlineStatus::Closed
    }

    /// The error this trace amounts to, if it is not a single closed loop.
    pub fn error(&self) -> Option<OutlineError> {
        match self.status {
            OutlineStatus::Closed => None,
            OutlineStatus::Degenerate => Some(OutlineError::Degenerate {
                points: self.points.len(),
            }),
            OutlineStatus::Open { unused_segments } => Some(OutlineError::Unclosed { unused_segments }),
            OutlineStatus::MultipleLoops { unused_segments } => {
                Some(OutlineError::MultipleLoops { unused_segments })
            }
        }
    }

    /// Treat anything but a single closed loop as an error.
    pub fn into_result(self) -> Result<Vec<Vec2>, OutlineError> {
        match self.error() {
            None => Ok(self.points),
            Some(err) => Err(err),
        }
    }
}

/// Outline tracing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineError {
    Degenerate { points: usize },
    Unclosed { unused_segments: usize },
    MultipleLoops { unused_segments: usize },
}

impl std::fmt::Display for OutlineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutlineError::Degenerate { points } => {
                write!(f, "Outline has only {} points", points)
            }
            OutlineError::Unclosed { unused_segments } => {
                write!(f, "Outline does not close ({} segments unused)", unused_segments)
            }
            OutlineError::MultipleLoops { unused_segments } => {
                write!(f, "Cells have more than one boundary loop ({} segments unused)", unused_segments)
            }
        }
    }
}

impl std::error::Error for OutlineError {}

/// Trace the boundary of `cells` into one ordered loop.
///
/// The result does not repeat its first point at the end; the closing edge
/// is implied. Duplicate cells are ignored and input order does not matter.
pub fn trace_outline(cells: &[GridCoord]) -> OutlineTrace {
    let segments = boundary_segments(cells);
    let total = segments.len();
    let (mut points, unused) = stitch_segments(segments);

    let returned_to_start =
        points.len() > 1 && points[0].approx_eq(points[points.len() - 1]);
    if returned_to_start {
        points.pop();
    }

    let status = if points.len() < 3 {
        OutlineStatus::Degenerate
    } else if !returned_to_start {
        OutlineStatus::Open { unused_segments: unused }
    } else if unused > 0 {
        OutlineStatus::MultipleLoops { unused_segments: unused }
    } else {
        OutlineStatus::Closed
    };

    if status != OutlineStatus::Closed {
        tracing::debug!(
            "Outline of {} cells: {:?} after {} of {} segments",
            cells.len(),
            status,
            total - unused,
            total
        );
    }

    OutlineTrace { points, status }
}

/// Ordered outline points of `cells`. Callers that need to know whether the
/// loop is complete should use [`trace_outline`].
pub fn extract_outline(cells: &[GridCoord]) -> Vec<Vec2> {
    trace_outline(cells).points
}

/// Boundary segments in a fixed order: cells sorted by (x, y), then top,
/// right, bottom, left.
fn boundary_segments(cells: &[GridCoord]) -> Vec<Segment> {
    let ordered: BTreeSet<GridCoord> = cells.iter().copied().collect();
    let lookup: HashSet<GridCoord> = ordered.iter().copied().collect();
    let mut segments = Vec::with_capacity(ordered.len() * 4);

    for cell in &ordered {
        let (x, y) = (cell.x, cell.y);
        if !lookup.contains(&GridCoord::new(x, y + 1)) {
            segments.push(Segment::new((x, y + 1), (x + 1, y + 1)));
        }
        if !lookup.contains(&GridCoord::new(x + 1, y)) {
            segments.push(Segment::new((x + 1, y + 1), (x + 1, y)));
        }
        if !lookup.contains(&GridCoord::new(x, y - 1)) {
            segments.push(Segment::new((x + 1, y), (x, y)));
        }
        if !lookup.contains(&GridCoord::new(x - 1, y)) {
            segments.push(Segment::new((x, y), (x, y + 1)));
        }
    }

    segments
}

/// Chain segments end to start beginning with the first one. Each step takes
/// the first remaining segment touching the current end point, in either
/// direction. Returns the points and how many segments were never used.
fn stitch_segments(mut segments: Vec<Segment>) -> (Vec<Vec2>, usize) {
    let mut ordered = Vec::with_capacity(segments.len() + 1);
    if segments.is_empty() {
        return (ordered, 0);
    }

    let first = segments.remove(0);
    ordered.push(first.start);
    ordered.push(first.end);

    while !segments.is_empty() {
        let last = ordered[ordered.len() - 1];
        let next = segments.iter().enumerate().find_map(|(i, seg)| {
            if seg.start.approx_eq(last) {
                Some((i, seg.end))
            } else if seg.end.approx_eq(last) {
                Some((i, seg.start))
            } else {
                None
            }
        });

        match next {
            Some((i, point)) => {
                segments.remove(i);
                ordered.push(point);
            }
            None => break,
        }
    }

    (ordered, segments.len())
}

/// Drop vertices that sit on the straight line between their neighbors.
/// Cell outlines have one vertex per unit step; this keeps only corners.
pub fn simplify_collinear(points: &[Vec2]) -> Vec<Vec2> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept: Vec<Vec2> = points.to_vec();
    loop {
        let n = kept.len();
        if n <= 3 {
            break;
        }
        let drop = (0..n).find(|&i| {
            let prev = kept[(i + n - 1) % n];
            let next = kept[(i + 1) % n];
            signed_area(prev, kept[i], next).abs() < AREA_EPSILON
        });
        match drop {
            Some(i) => {
                kept.remove(i);
            }
            None => break,
        }
    }
    kept
}
