//! Piece meshes: outline → triangulation → scaled vertices with UVs.

use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{Vec2, Winding};
use crate::pieces::{GridCoord, Level, Piece};

use super::outline::{simplify_collinear, trace_outline, OutlineError, OutlineStatus, OutlineTrace};
use super::triangulate::{triangulate, Triangulation, TriangulationError, TriangulationStatus};

/// Which rectangle texture coordinates span.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UvFrame {
    /// The piece's own bounding box maps to [0, 1].
    #[default]
    Piece,
    /// The whole board maps to [0, 1], so one image spans all pieces.
    Board { board_size: usize },
}

/// Mesh building options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshOptions {
    /// World units per cell
    pub cell_size: f32,
    /// Drop outline vertices between collinear edges before triangulating
    pub simplify: bool,
    /// Front-face winding of emitted triangles
    pub winding: Winding,
    pub uv_frame: UvFrame,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            simplify: true,
            winding: Winding::Clockwise,
            uv_frame: UvFrame::Piece,
        }
    }
}

impl MeshOptions {
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(MeshError::InvalidCellSize(self.cell_size));
        }
        if let UvFrame::Board { board_size: 0 } = self.uv_frame {
            return Err(MeshError::EmptyUvBoard);
        }
        Ok(())
    }
}

/// Axis-aligned bounds of a mesh in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    fn from_positions(positions: &[[f32; 3]]) -> Self {
        let Some(first) = positions.first() else {
            return Self::default();
        };
        positions.iter().fold(Bounds { min: *first, max: *first }, |mut b, p| {
            for axis in 0..3 {
                b.min[axis] = b.min[axis].min(p[axis]);
                b.max[axis] = b.max[axis].max(p[axis]);
            }
            b
        })
    }
}

/// Interleaved vertex for GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Flat renderable mesh of one piece. All vertices lie at z = 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Every three indices form one triangle.
    pub indices: Vec<u32>,
    pub bounds: Bounds,
    pub outline_status: Option<OutlineStatus>,
    /// `None` when no triangulation was attempted.
    pub triangulation_status: Option<TriangulationStatus>,
}

impl PieceMesh {
    fn empty(name: String, outline_status: OutlineStatus) -> Self {
        Self {
            name,
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
            bounds: Bounds::default(),
            outline_status: Some(outline_status),
            triangulation_status: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Closed outline and fully clipped triangulation.
    pub fn is_complete(&self) -> bool {
        self.outline_status == Some(OutlineStatus::Closed)
            && self.triangulation_status == Some(TriangulationStatus::Complete)
    }

    /// Sum of triangle areas in world units.
    pub fn area(&self) -> f32 {
        self.indices
            .chunks_exact(3)
            .map(|t| {
                let p = |i: u32| {
                    let v = self.positions[i as usize];
                    Vec2::new(v[0], v[1])
                };
                crate::geometry::triangle_area(p(t[0]), p(t[1]), p(t[2]))
            })
            .sum()
    }

    /// Interleaved vertex buffer.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((&position, &normal), &uv)| Vertex { position, normal, uv })
            .collect()
    }

    pub fn vertex_bytes(vertices: &[Vertex]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}

/// Strict mesh building failures
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshError {
    InvalidCellSize(f32),
    EmptyUvBoard,
    Outline(OutlineError),
    Triangulation(TriangulationError),
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::InvalidCellSize(size) => write!(f, "Cell size must be positive, got {}", size),
            MeshError::EmptyUvBoard => write!(f, "UV board frame needs a non-empty board"),
            MeshError::Outline(e) => write!(f, "Outline error: {}", e),
            MeshError::Triangulation(e) => write!(f, "Triangulation error: {}", e),
        }
    }
}

impl std::error::Error for MeshError {}

impl From<OutlineError> for MeshError {
    fn from(e: OutlineError) -> Self {
        MeshError::Outline(e)
    }
}

impl From<TriangulationError> for MeshError {
    fn from(e: TriangulationError) -> Self {
        MeshError::Triangulation(e)
    }
}

/// Mesh name used for piece `id`.
pub fn mesh_name(piece: &Piece) -> String {
    format!("PieceMesh_{}", piece.id.0)
}

/// Build the mesh of one piece. Never fails: invalid options and degenerate
/// outlines give an empty mesh and stuck triangulations a partial one, all
/// reflected in the status fields.
pub fn build_piece_mesh(piece: &Piece, options: &MeshOptions) -> PieceMesh {
    build_cell_mesh(mesh_name(piece), &piece.cells, options)
}

/// Like [`build_piece_mesh`] but anything short of a complete mesh is an error.
pub fn try_build_piece_mesh(piece: &Piece, options: &MeshOptions) -> Result<PieceMesh, MeshError> {
    options.validate()?;

    let trace = trace_outline(&piece.cells);
    if let Some(err) = trace.error() {
        return Err(err.into());
    }
    let (mesh, triangulation) = mesh_from_trace(mesh_name(piece), trace, options);
    triangulation
        .ok_or(TriangulationError::TooFewVertices)?
        .into_result()?;
    Ok(mesh)
}

/// Build a mesh for a bare cell set.
pub fn build_cell_mesh(name: String, cells: &[GridCoord], options: &MeshOptions) -> PieceMesh {
    mesh_from_trace(name, trace_outline(cells), options).0
}

/// Mesh plus the triangulation behind it. Invalid options and degenerate
/// outlines give an empty mesh with no triangulation status, which never
/// counts as complete.
fn mesh_from_trace(
    name: String,
    trace: OutlineTrace,
    options: &MeshOptions,
) -> (PieceMesh, Option<Triangulation>) {
    if let Err(err) = options.validate() {
        warn!("{}: {}, emitting empty mesh", name, err);
        return (PieceMesh::empty(name, trace.status), None);
    }
    if trace.points.len() < 3 {
        warn!("{}: outline has only {} points, emitting empty mesh", name, trace.points.len());
        return (PieceMesh::empty(name, trace.status), None);
    }

    let outline = if options.simplify {
        simplify_collinear(&trace.points)
    } else {
        trace.points
    };

    // Cell units are exact integers; scale only after triangulating.
    let triangulation = triangulate(&outline);

    let scale = options.cell_size;
    let positions: Vec<[f32; 3]> = outline
        .iter()
        .map(|p| [p.x * scale, p.y * scale, 0.0])
        .collect();

    let normal = match options.winding {
        Winding::Clockwise => [0.0, 0.0, -1.0],
        Winding::CounterClockwise => [0.0, 0.0, 1.0],
    };
    let normals = vec![normal; positions.len()];
    let uvs = compute_uvs(&outline, options.uv_frame);

    let indices: Vec<u32> = triangulation
        .triangles
        .iter()
        .flat_map(|&[a, b, c]| match options.winding {
            Winding::Clockwise => [a, b, c],
            Winding::CounterClockwise => [a, c, b],
        })
        .collect();

    let bounds = Bounds::from_positions(&positions);
    debug!(
        "{}: {} vertices, {} triangles ({:?})",
        name,
        positions.len(),
        indices.len() / 3,
        triangulation.status
    );

    let mesh = PieceMesh {
        name,
        positions,
        normals,
        uvs,
        indices,
        bounds,
        outline_status: Some(trace.status),
        triangulation_status: Some(triangulation.status),
    };
    (mesh, Some(triangulation))
}

/// Meshes for every piece of a level, built in parallel, in piece order.
pub fn build_level_meshes(level: &Level, options: &MeshOptions) -> Vec<PieceMesh> {
    level
        .pieces
        .par_iter()
        .map(|piece| build_piece_mesh(piece, options))
        .collect()
}

/// Texture coordinates in [0, 1] for outline points given in cell units.
fn compute_uvs(outline: &[Vec2], frame: UvFrame) -> Vec<[f32; 2]> {
    let (min, extent) = match frame {
        UvFrame::Board { board_size } => (Vec2::new(0.0, 0.0), Vec2::new(board_size as f32, board_size as f32)),
        UvFrame::Piece => {
            let mut lo = Vec2::new(f32::MAX, f32::MAX);
            let mut hi = Vec2::new(f32::MIN, f32::MIN);
            for p in outline {
                lo.x = lo.x.min(p.x);
                lo.y = lo.y.min(p.y);
                hi.x = hi.x.max(p.x);
                hi.y = hi.y.max(p.y);
            }
            (lo, hi.sub(lo))
        }
    };

    let norm = |value: f32, origin: f32, span: f32| {
        if span > 0.0 {
            ((value - origin) / span).clamp(0.0, 1.0)
        } else {
            0.0
        }
    };

    outline
        .iter()
        .map(|p| [norm(p.x, min.x, extent.x), norm(p.y, min.y, extent.y)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::signed_area;
    use crate::pieces::{PieceColor, PieceId};

    fn piece(id: u32, coords: &[(i32, i32)]) -> Piece {
        Piece::new(
            PieceId(id),
            coords.iter().map(|&(x, y)| GridCoord::new(x, y)).collect(),
            PieceColor::WHITE,
        )
    }

    fn triangle_signs(mesh: &PieceMesh) -> Vec<f32> {
        mesh.indices
            .chunks_exact(3)
            .map(|t| {
                let p = |i: u32| Vec2::new(mesh.positions[i as usize][0], mesh.positions[i as usize][1]);
                signed_area(p(t[0]), p(t[1]), p(t[2]))
            })
            .collect()
    }

    #[test]
    fn test_unit_cell_mesh() {
        let mesh = build_piece_mesh(&piece(7, &[(0, 0)]), &MeshOptions::default());

        assert_eq!(mesh.name, "PieceMesh_7");
        assert!(mesh.is_complete());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!((mesh.area() - 1.0).abs() < 1e-6);
        assert!(mesh.positions.iter().all(|p| p[2] == 0.0));
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, -1.0]));
    }

    #[test]
    fn test_cell_size_scales_area() {
        let p = piece(0, &[(1, 1), (2, 1), (2, 2)]);
        let mesh = build_piece_mesh(&p, &MeshOptions::default().with_cell_size(2.0));

        assert!(mesh.is_complete());
        assert!((mesh.area() - 12.0).abs() < 1e-4);
        assert_eq!(mesh.bounds.min, [2.0, 2.0, 0.0]);
        assert_eq!(mesh.bounds.max, [6.0, 6.0, 0.0]);
    }

    #[test]
    fn test_indices_in_bounds_and_winding() {
        let p = piece(0, &[(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (2, 2)]);

        let cw = build_piece_mesh(&p, &MeshOptions::default());
        assert!(cw.is_complete());
        assert!(cw.indices.iter().all(|&i| (i as usize) < cw.vertex_count()));
        assert!(triangle_signs(&cw).iter().all(|&a| a < 0.0));

        let ccw_opts = MeshOptions {
            winding: Winding::CounterClockwise,
            ..MeshOptions::default()
        };
        let ccw = build_piece_mesh(&p, &ccw_opts);
        assert!(triangle_signs(&ccw).iter().all(|&a| a > 0.0));
        assert!(ccw.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
        assert!((cw.area() - ccw.area()).abs() < 1e-6);
    }

    #[test]
    fn test_simplify_reduces_vertices() {
        let p = piece(0, &[(0, 0), (1, 0), (2, 0), (3, 0)]);
        let simple = build_piece_mesh(&p, &MeshOptions::default());
        let raw = build_piece_mesh(&p, &MeshOptions { simplify: false, ..MeshOptions::default() });

        assert_eq!(simple.vertex_count(), 4);
        assert_eq!(raw.vertex_count(), 10);
        assert_eq!(raw.triangle_count(), 8);
        assert!((simple.area() - raw.area()).abs() < 1e-5);
    }

    #[test]
    fn test_uvs_in_unit_range() {
        let p = piece(0, &[(1, 1), (2, 1), (1, 2)]);
        let mesh = build_piece_mesh(&p, &MeshOptions::default());
        for uv in &mesh.uvs {
            assert!((0.0..=1.0).contains(&uv[0]) && (0.0..=1.0).contains(&uv[1]));
        }
        assert!(mesh.uvs.contains(&[0.0, 0.0]));
        assert!(mesh.uvs.contains(&[1.0, 0.0]));

        let board = MeshOptions {
            uv_frame: UvFrame::Board { board_size: 4 },
            ..MeshOptions::default()
        };
        let mesh = build_piece_mesh(&p, &board);
        assert!(mesh.uvs.contains(&[0.25, 0.25]));
        assert!(mesh.uvs.contains(&[0.75, 0.5]));
    }

    #[test]
    fn test_empty_piece_gives_empty_mesh() {
        let p = piece(3, &[]);
        let mesh = build_piece_mesh(&p, &MeshOptions::default());
        assert_eq!(mesh.vertex_count(), 0);
        assert!(!mesh.is_complete());
        assert!(matches!(
            try_build_piece_mesh(&p, &MeshOptions::default()),
            Err(MeshError::Outline(OutlineError::Degenerate { .. }))
        ));
    }

    #[test]
    fn test_strict_build_rejects_holes_and_bad_scale() {
        let ring = piece(0, &[(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)]);
        assert!(matches!(
            try_build_piece_mesh(&ring, &MeshOptions::default()),
            Err(MeshError::Outline(OutlineError::MultipleLoops { .. }))
        ));

        let p = piece(0, &[(0, 0)]);
        assert!(matches!(
            try_build_piece_mesh(&p, &MeshOptions::default().with_cell_size(0.0)),
            Err(MeshError::InvalidCellSize(_))
        ));
        assert!(try_build_piece_mesh(&p, &MeshOptions::default()).is_ok());
    }

    #[test]
    fn test_invalid_cell_size_never_complete() {
        let p = piece(0, &[(0, 0)]);
        for size in [0.0, -1.0, f32::NAN] {
            let mesh = build_piece_mesh(&p, &MeshOptions::default().with_cell_size(size));
            assert!(!mesh.is_complete(), "cell size {}", size);
            assert_eq!(mesh.vertex_count(), 0);
            assert_eq!(mesh.triangle_count(), 0);
            assert_eq!(mesh.triangulation_status, None);

            assert!(matches!(
                try_build_piece_mesh(&p, &MeshOptions::default().with_cell_size(size)),
                Err(MeshError::InvalidCellSize(_))
            ));
        }
    }

    #[test]
    fn test_strict_and_lenient_agree_on_complete_mesh() {
        let p = piece(0, &[(0, 0), (1, 0), (1, 1)]);
        let mesh = try_build_piece_mesh(&p, &MeshOptions::default()).unwrap();
        assert_eq!(mesh.triangulation_status, Some(TriangulationStatus::Complete));
        assert_eq!(mesh, build_piece_mesh(&p, &MeshOptions::default()));
    }

    #[test]
    fn test_statuses_serialized() {
        let mesh = build_piece_mesh(&piece(0, &[(0, 0)]), &MeshOptions::default());
        let value = serde_json::to_value(&mesh).unwrap();
        assert_eq!(value["outline_status"], "closed");
        assert_eq!(value["triangulation_status"], "complete");

        let back: PieceMesh = serde_json::from_value(value).unwrap();
        assert!(back.is_complete());
    }

    #[test]
    fn test_idempotent() {
        let p = piece(0, &[(0, 0), (0, 1), (1, 1), (1, 2), (2, 2)]);
        let opts = MeshOptions::default().with_cell_size(0.5);
        assert_eq!(build_piece_mesh(&p, &opts), build_piece_mesh(&p, &opts));
    }

    #[test]
    fn test_vertex_buffer() {
        let mesh = build_piece_mesh(&piece(0, &[(0, 0)]), &MeshOptions::default());
        let vertices = mesh.vertices();
        assert_eq!(vertices.len(), 4);
        assert_eq!(PieceMesh::vertex_bytes(&vertices).len(), 4 * 8 * 4);
    }
}
