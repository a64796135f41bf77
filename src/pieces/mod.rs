pub mod generation;
pub mod types;
pub mod validate;

pub use generation::{
    generate, generate_level, generate_level_pack, grow_piece, pick_seed_cell, Board, Coverage,
    LevelGeneration, PartialReason,
};
pub use types::{ColorParseError, GridCoord, Level, Piece, PieceColor, PieceId};
pub use validate::{check_partition, is_four_connected, PartitionReport};
