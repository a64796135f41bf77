//! ASCII rendering and export for generated levels.
//!
//! One character per cell. Row 0 is printed last so +y points up, matching
//! the mesh coordinates.

use std::fs::File;
use std::io::{self, Write};
use chrono::Local;

use crate::pieces::{Level, PieceId};

const PIECE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Character for a cell owner. Pieces beyond the alphabet share `#`.
pub fn piece_char(owner: Option<PieceId>) -> char {
    match owner {
        None => '.',
        Some(id) => PIECE_CHARS.get(id.index()).map(|&b| b as char).unwrap_or('#'),
    }
}

/// Render the board, top row first.
pub fn render_level(level: &Level) -> String {
    let owners = level.owner_map();
    let size = level.board_size;
    let mut result = String::with_capacity((size + 1) * size);

    for y in (0..size).rev() {
        for x in 0..size {
            result.push(piece_char(*owners.get(x, y)));
        }
        result.push('\n');
    }

    result
}

/// Legend listing each piece's character, size and color.
pub fn level_legend(level: &Level) -> String {
    let mut legend = String::new();
    legend.push_str("=== PIECES ===\n");
    for piece in &level.pieces {
        legend.push_str(&format!(
            "  {} {:<10} {:>3} cells  {}\n",
            piece_char(Some(piece.id)),
            piece.id.to_string(),
            piece.len(),
            piece.color
        ));
    }
    legend.push_str("  . unassigned\n");
    legend
}

/// Write a text report: header, board and legend.
pub fn export_level_text(level: &Level, seed: u64, path: &str) -> io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "=== LEVEL ===")?;
    writeln!(file, "Seed: {}", seed)?;
    writeln!(file, "Board: {}x{}", level.board_size, level.board_size)?;
    writeln!(file, "Pieces: {}", level.pieces.len())?;
    writeln!(file, "Unassigned: {}", level.cell_count().saturating_sub(level.assigned_cells()))?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;

    write!(file, "{}", render_level(level))?;
    writeln!(file)?;
    write!(file, "{}", level_legend(level))?;

    Ok(())
}
