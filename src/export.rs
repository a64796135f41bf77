//! Level export: JSON documents and PNG board images.

use std::fs::File;
use std::io::BufWriter;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::Serialize;

use crate::mesh::PieceMesh;
use crate::pieces::{Level, PieceId};

/// Border color drawn between cells of different owners.
const BORDER_COLOR: [u8; 3] = [24, 24, 24];
/// Fill for unassigned cells.
const EMPTY_COLOR: [u8; 3] = [0, 0, 0];

/// Export failures
#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Image(image::ImageError),
    /// Cell pixel size of zero.
    InvalidCellSize,
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "IO error: {}", e),
            ExportError::Json(e) => write!(f, "JSON error: {}", e),
            ExportError::Image(e) => write!(f, "Failed to save image: {}", e),
            ExportError::InvalidCellSize => write!(f, "Cell size must be at least one pixel"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            ExportError::Json(e) => Some(e),
            ExportError::Image(e) => Some(e),
            ExportError::InvalidCellSize => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Json(e)
    }
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Image(e)
    }
}

/// JSON document written by [`export_level_json`].
#[derive(Serialize)]
pub struct LevelDocument<'a> {
    pub seed: u64,
    pub board_size: usize,
    pub piece_count: usize,
    pub unassigned_cells: usize,
    pub pieces: Vec<PieceDocument<'a>>,
}

#[derive(Serialize)]
pub struct PieceDocument<'a> {
    pub id: PieceId,
    pub color: String,
    pub cells: &'a [crate::pieces::GridCoord],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<&'a PieceMesh>,
}

impl<'a> LevelDocument<'a> {
    /// Pair pieces with meshes by position; a missing mesh is left out.
    pub fn new(level: &'a Level, meshes: &'a [PieceMesh], seed: u64) -> Self {
        let pieces = level
            .pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| PieceDocument {
                id: piece.id,
                color: piece.color.to_hex(),
                cells: &piece.cells,
                mesh: meshes.get(i),
            })
            .collect();

        Self {
            seed,
            board_size: level.board_size,
            piece_count: level.pieces.len(),
            unassigned_cells: level.cell_count().saturating_sub(level.assigned_cells()),
            pieces,
        }
    }
}

/// Write a level, its meshes and the seed that produced it as pretty JSON.
pub fn export_level_json(
    level: &Level,
    meshes: &[PieceMesh],
    seed: u64,
    path: &str,
) -> Result<(), ExportError> {
    let document = LevelDocument::new(level, meshes, seed);
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

/// Render the board at `cell_px` pixels per cell. Image row 0 is the top of
/// the board (highest y). Cell edges facing a different owner get a one
/// pixel border.
pub fn render_level_image(level: &Level, cell_px: u32) -> Result<RgbImage, ExportError> {
    if cell_px == 0 {
        return Err(ExportError::InvalidCellSize);
    }

    let owners = level.owner_map();
    let size = level.board_size;
    let side = size as u32 * cell_px;
    let mut img: RgbImage = ImageBuffer::new(side, side);

    let color_of = |owner: Option<PieceId>| match owner.and_then(|id| level.piece(id)) {
        Some(piece) => piece.color.0,
        None => EMPTY_COLOR,
    };

    for y in 0..size {
        for x in 0..size {
            let owner = *owners.get(x, y);
            let fill = color_of(owner);
            let differs = |nx: i64, ny: i64| owners.try_get(nx, ny).map_or(true, |&o| o != owner);
            let (xi, yi) = (x as i64, y as i64);
            let border_left = differs(xi - 1, yi);
            let border_right = differs(xi + 1, yi);
            let border_bottom = differs(xi, yi - 1);
            let border_top = differs(xi, yi + 1);

            let px0 = x as u32 * cell_px;
            let py0 = (size - 1 - y) as u32 * cell_px;
            for dy in 0..cell_px {
                for dx in 0..cell_px {
                    let on_border = (border_left && dx == 0)
                        || (border_right && dx == cell_px - 1)
                        || (border_top && dy == 0)
                        || (border_bottom && dy == cell_px - 1);
                    let color = if on_border && cell_px > 2 { BORDER_COLOR } else { fill };
                    img.put_pixel(px0 + dx, py0 + dy, Rgb(color));
                }
            }
        }
    }

    Ok(img)
}

/// Export the board as a PNG.
pub fn export_level_png(level: &Level, cell_px: u32, path: &str) -> Result<(), ExportError> {
    let img = render_level_image(level, cell_px)?;
    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_level_meshes, MeshOptions};
    use crate::pieces::{GridCoord, Piece, PieceColor};

    fn level() -> Level {
        Level {
            board_size: 2,
            pieces: vec![
                Piece::new(
                    PieceId(0),
                    vec![GridCoord::new(0, 0), GridCoord::new(1, 0)],
                    PieceColor([200, 10, 10]),
                ),
                Piece::new(
                    PieceId(1),
                    vec![GridCoord::new(0, 1)],
                    PieceColor([10, 10, 200]),
                ),
            ],
        }
    }

    #[test]
    fn test_image_layout() {
        let img = render_level_image(&level(), 8).unwrap();
        assert_eq!(img.dimensions(), (16, 16));

        // Cell (0, 1) is drawn in the top-left quadrant.
        assert_eq!(img.get_pixel(3, 3).0, [10, 10, 200]);
        // Cell (1, 1) is unassigned.
        assert_eq!(img.get_pixel(12, 3).0, EMPTY_COLOR);
        // Bottom row belongs to piece 0.
        assert_eq!(img.get_pixel(4, 12).0, [200, 10, 10]);
        assert_eq!(img.get_pixel(11, 12).0, [200, 10, 10]);
    }

    #[test]
    fn test_borders_only_between_owners() {
        let img = render_level_image(&level(), 8).unwrap();
        // Shared edge between the two halves of piece 0 has no border.
        assert_eq!(img.get_pixel(7, 12).0, [200, 10, 10]);
        assert_eq!(img.get_pixel(8, 12).0, [200, 10, 10]);
        // Edge between piece 0 (bottom) and piece 1 (top) does.
        assert_eq!(img.get_pixel(3, 8).0, BORDER_COLOR);
        assert_eq!(img.get_pixel(3, 7).0, BORDER_COLOR);
    }

    #[test]
    fn test_zero_cell_size_rejected() {
        assert!(matches!(
            render_level_image(&level(), 0),
            Err(ExportError::InvalidCellSize)
        ));
    }

    #[test]
    fn test_export_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.png");
        export_level_png(&level(), 4, path.to_str().unwrap()).unwrap();

        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (8, 8));
    }

    #[test]
    fn test_export_json() {
        let level = level();
        let meshes = build_level_meshes(&level, &MeshOptions::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.json");
        export_level_json(&level, &meshes, 7, path.to_str().unwrap()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["seed"], 7);
        assert_eq!(value["board_size"], 2);
        assert_eq!(value["unassigned_cells"], 1);
        assert_eq!(value["pieces"][0]["color"], "#C80A0A");
        assert_eq!(value["pieces"][1]["cells"][0]["y"], 1);
        assert_eq!(value["pieces"][0]["mesh"]["name"], "PieceMesh_0");
        assert_eq!(value["pieces"][0]["mesh"]["triangulation_status"], "complete");
        assert_eq!(value["pieces"][1]["mesh"]["outline_status"], "closed");
    }

    #[test]
    fn test_export_json_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("level.json");
        let err = export_level_json(&level(), &[], 0, path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
