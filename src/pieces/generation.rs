use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::{LevelParams, ParamsError};
use crate::seeds::LevelSeeds;
use crate::tilemap::Tilemap;

use super::types::{GridCoord, Level, Piece, PieceColor, PieceId};

/// Working board during generation: `None` = unassigned.
pub type Board = Tilemap<Option<PieceId>>;

/// Whether a generated level covers the whole board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coverage {
    Complete,
    Partial {
        unassigned_cells: usize,
        reason: PartialReason,
    },
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        matches!(self, Coverage::Complete)
    }
}

/// Why generation stopped with cells left over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartialReason {
    /// The requested piece count was reached first.
    PieceBudgetExhausted,
    /// No unassigned cell was available to seed a piece.
    NoSeedCell,
}

impl std::fmt::Display for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coverage::Complete => write!(f, "complete"),
            Coverage::Partial { unassigned_cells, reason } => {
                let why = match reason {
                    PartialReason::PieceBudgetExhausted => "piece budget exhausted",
                    PartialReason::NoSeedCell => "no seed cell",
                };
                write!(f, "partial ({} cells unassigned, {})", unassigned_cells, why)
            }
        }
    }
}

/// A generated level together with its coverage status.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelGeneration {
    pub level: Level,
    pub coverage: Coverage,
}

impl LevelGeneration {
    /// Treat partial coverage as fatal.
    pub fn require_full_cover(self) -> Result<Level, Coverage> {
        match self.coverage {
            Coverage::Complete => Ok(self.level),
            partial => Err(partial),
        }
    }
}

/// Partition a square board into connected pieces by randomized region growth.
///
/// Pieces are grown one at a time: each draws a target size from
/// `min_piece_size..=max_piece_size` (clamped to the cells left), picks a random
/// unassigned seed cell and grows breadth-first over unassigned 4-neighbors
/// visited in shuffled order. Generation stops when the board is full or
/// `piece_count` pieces exist, whichever comes first.
pub fn generate_level<R: Rng + ?Sized>(
    params: &LevelParams,
    rng: &mut R,
) -> Result<LevelGeneration, ParamsError> {
    params.validate()?;

    let size = params.board_size;
    let total_cells = size * size;
    let mut board: Board = Tilemap::square(size, None);
    let mut pieces: Vec<Piece> = Vec::with_capacity(params.piece_count);
    let mut assigned_cells = 0usize;
    let mut stopped_without_seed = false;

    while assigned_cells < total_cells && pieces.len() < params.piece_count {
        let remaining = total_cells - assigned_cells;
        let target = rng
            .gen_range(params.min_piece_size..=params.max_piece_size)
            .min(remaining);

        let Some(seed) = pick_seed_cell(&board, rng) else {
            stopped_without_seed = true;
            break;
        };

        let cells = grow_piece(&board, seed, target, rng);
        let id = PieceId(pieces.len() as u32);
        for cell in &cells {
            board.set(cell.x as usize, cell.y as usize, Some(id));
        }
        assigned_cells += cells.len();

        let color = PieceColor::random(rng);
        debug!("{}: {} cells (target {}) seeded at {}, color {}", id, cells.len(), target, seed, color);
        pieces.push(Piece::new(id, cells, color));
    }

    let unassigned_cells = total_cells - assigned_cells;
    let coverage = if unassigned_cells == 0 {
        Coverage::Complete
    } else {
        let reason = if stopped_without_seed {
            PartialReason::NoSeedCell
        } else {
            PartialReason::PieceBudgetExhausted
        };
        Coverage::Partial { unassigned_cells, reason }
    };

    if !coverage.is_complete() {
        warn!(
            "Board {}x{} only partially covered by {} pieces: {}",
            size,
            size,
            pieces.len(),
            coverage
        );
    }

    Ok(LevelGeneration {
        level: Level {
            board_size: size,
            pieces,
        },
        coverage,
    })
}

/// Positional form of [`generate_level`].
pub fn generate<R: Rng + ?Sized>(
    board_size: usize,
    piece_count: usize,
    min_piece_size: usize,
    max_piece_size: usize,
    rng: &mut R,
) -> Result<LevelGeneration, ParamsError> {
    let params = LevelParams {
        board_size,
        piece_count,
        min_piece_size,
        max_piece_size,
    };
    generate_level(&params, rng)
}

/// Generate `count` independent levels in parallel. Level `i` draws from
/// its own stream seeded by `seeds.level(i)`, so results do not depend on
/// scheduling.
pub fn generate_level_pack(
    params: &LevelParams,
    seeds: &LevelSeeds,
    count: usize,
) -> Result<Vec<LevelGeneration>, ParamsError> {
    params.validate()?;

    (0..count)
        .into_par_iter()
        .map(|i| {
            let mut rng = seeds.level_rng(i);
            generate_level(params, &mut rng)
        })
        .collect()
}

/// Pick a seed cell uniformly among all unassigned cells.
pub fn pick_seed_cell<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<GridCoord> {
    let empties: Vec<GridCoord> = board
        .iter()
        .filter(|(_, _, owner)| owner.is_none())
        .map(|(x, y, _)| GridCoord::from_tile(x, y))
        .collect();

    empties.choose(rng).copied()
}

/// Grow a piece breadth-first from `seed` over unassigned cells, stopping at
/// `target` cells or when the frontier runs dry. Neighbors of each dequeued
/// cell are enqueued in random order and marked visited on enqueue.
pub fn grow_piece<R: Rng + ?Sized>(
    board: &Board,
    seed: GridCoord,
    target: usize,
    rng: &mut R,
) -> Vec<GridCoord> {
    let mut result = Vec::with_capacity(target);
    if target == 0 {
        return result;
    }

    let mut visited = Tilemap::new_with(board.width, board.height, false);
    let mut queue = VecDeque::new();
    visited.set(seed.x as usize, seed.y as usize, true);
    queue.push_back(seed);

    while let Some(current) = queue.pop_front() {
        result.push(current);
        if result.len() >= target {
            break;
        }

        let mut neighbors = board.neighbors(current.x as usize, current.y as usize);
        neighbors.shuffle(rng);

        for (nx, ny) in neighbors {
            if !*visited.get(nx, ny) && board.get(nx, ny).is_none() {
                visited.set(nx, ny, true);
                queue.push_back(GridCoord::from_tile(nx, ny));
            }
        }
    }

    result
}
