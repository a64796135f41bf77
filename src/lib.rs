//! Puzzle piece generation library
//!
//! Partitions a square board into connected pieces and turns each piece into
//! a flat triangle mesh. Re-exports modules for use by the binary and tests.

pub mod ascii;
pub mod config;
pub mod export;
pub mod geometry;
pub mod mesh;
pub mod pieces;
pub mod seeds;
pub mod tilemap;

pub use config::{Difficulty, LevelParams};
pub use mesh::{build_level_meshes, build_piece_mesh, MeshOptions, PieceMesh};
pub use pieces::{generate, generate_level, Coverage, Level, LevelGeneration, Piece, PieceId};
