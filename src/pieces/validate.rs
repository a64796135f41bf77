//! Partition checks for generated levels.

use std::collections::{HashMap, HashSet, VecDeque};

use super::types::{GridCoord, Level, PieceId};

/// Everything wrong with a level's partition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartitionReport {
    /// Cells outside the board, with the piece that claims them
    pub out_of_bounds: Vec<(PieceId, GridCoord)>,
    /// Cells claimed more than once (by any pieces, including the same one twice)
    pub overlapping: Vec<GridCoord>,
    /// Pieces whose cells are not 4-connected
    pub disconnected: Vec<PieceId>,
    /// Pieces with no cells
    pub empty_pieces: Vec<PieceId>,
    /// Board cells owned by no piece
    pub unassigned: usize,
}

impl PartitionReport {
    /// No structural defects. Unassigned cells are allowed (partial coverage).
    pub fn is_valid(&self) -> bool {
        self.out_of_bounds.is_empty()
            && self.overlapping.is_empty()
            && self.disconnected.is_empty()
            && self.empty_pieces.is_empty()
    }

    /// Valid and every board cell owned exactly once.
    pub fn is_full_cover(&self) -> bool {
        self.is_valid() && self.unassigned == 0
    }
}

/// Check disjointness, bounds, connectivity and coverage of a level.
pub fn check_partition(level: &Level) -> PartitionReport {
    let mut report = PartitionReport::default();
    let mut claims: HashMap<GridCoord, usize> = HashMap::new();

    for piece in &level.pieces {
        if piece.cells.is_empty() {
            report.empty_pieces.push(piece.id);
            continue;
        }
        for &cell in &piece.cells {
            if !cell.in_board(level.board_size) {
                report.out_of_bounds.push((piece.id, cell));
            }
            *claims.entry(cell).or_insert(0) += 1;
        }
        if !is_four_connected(&piece.cells) {
            report.disconnected.push(piece.id);
        }
    }

    let mut overlapping: Vec<GridCoord> = claims
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(&cell, _)| cell)
        .collect();
    overlapping.sort();
    report.overlapping = overlapping;

    let owned_on_board = claims.keys().filter(|c| c.in_board(level.board_size)).count();
    report.unassigned = level.cell_count() - owned_on_board;

    report
}

/// Whether a cell set is 4-connected. Empty sets count as connected.
pub fn is_four_connected(cells: &[GridCoord]) -> bool {
    let set: HashSet<GridCoord> = cells.iter().copied().collect();
    let Some(&start) = cells.first() else {
        return true;
    };

    let mut seen = HashSet::with_capacity(set.len());
    let mut queue = VecDeque::from([start]);
    seen.insert(start);

    while let Some(cell) = queue.pop_front() {
        for n in cell.neighbors_4() {
            if set.contains(&n) && seen.insert(n) {
                queue.push_back(n);
            }
        }
    }

    seen.len() == set.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::types::{Piece, PieceColor};

    fn piece(id: u32, cells: &[(i32, i32)]) -> Piece {
        Piece::new(
            PieceId(id),
            cells.iter().map(|&(x, y)| GridCoord::new(x, y)).collect(),
            PieceColor::WHITE,
        )
    }

    #[test]
    fn test_connectivity() {
        let l = [GridCoord::new(0, 0), GridCoord::new(1, 0), GridCoord::new(1, 1)];
        assert!(is_four_connected(&l));

        let diagonal = [GridCoord::new(0, 0), GridCoord::new(1, 1)];
        assert!(!is_four_connected(&diagonal));

        assert!(is_four_connected(&[]));
    }

    #[test]
    fn test_full_cover() {
        let level = Level {
            board_size: 2,
            pieces: vec![piece(0, &[(0, 0), (0, 1)]), piece(1, &[(1, 0), (1, 1)])],
        };
        let report = check_partition(&level);
        assert!(report.is_full_cover(), "{:?}", report);
    }

    #[test]
    fn test_defects_reported() {
        let level = Level {
            board_size: 2,
            pieces: vec![
                piece(0, &[(0, 0), (1, 1)]),
                piece(1, &[(1, 1), (2, 1)]),
                piece(2, &[]),
            ],
        };
        let report = check_partition(&level);
        assert!(!report.is_valid());
        assert_eq!(report.disconnected, vec![PieceId(0)]);
        assert_eq!(report.overlapping, vec![GridCoord::new(1, 1)]);
        assert_eq!(report.out_of_bounds, vec![(PieceId(1), GridCoord::new(2, 1))]);
        assert_eq!(report.empty_pieces, vec![PieceId(2)]);
        // (1, 0) and (0, 1) are unowned
        assert_eq!(report.unassigned, 2);
    }

    #[test]
    fn test_partial_is_valid_but_not_full() {
        let level = Level {
            board_size: 3,
            pieces: vec![piece(0, &[(0, 0), (1, 0), (2, 0)])],
        };
        let report = check_partition(&level);
        assert!(report.is_valid());
        assert!(!report.is_full_cover());
        assert_eq!(report.unassigned, 6);
    }
}
