//! Level generation settings: difficulty presets, explicit parameters and
//! JSON config files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Difficulty presets for generated levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 4x4 board, 5 pieces
    #[default]
    Easy,
    /// 5x5 board, 8 pieces
    Medium,
    /// 6x6 board, 12 pieces
    Hard,
}

impl Difficulty {
    /// Parse from string (for CLI)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" | "e" => Some(Self::Easy),
            "medium" | "m" | "normal" => Some(Self::Medium),
            "hard" | "h" => Some(Self::Hard),
            _ => None,
        }
    }

    /// Generation parameters for this preset.
    pub fn params(&self) -> LevelParams {
        let (board_size, piece_count) = match self {
            Self::Easy => (4, 5),
            Self::Medium => (5, 8),
            Self::Hard => (6, 12),
        };
        LevelParams {
            board_size,
            piece_count,
            min_piece_size: DEFAULT_MIN_PIECE_SIZE,
            max_piece_size: DEFAULT_MAX_PIECE_SIZE,
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Easy, Self::Medium, Self::Hard]
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

pub const DEFAULT_MIN_PIECE_SIZE: usize = 3;
pub const DEFAULT_MAX_PIECE_SIZE: usize = 6;

/// Parameters for one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelParams {
    /// Board is `board_size` x `board_size` cells
    pub board_size: usize,
    /// Upper bound on the number of pieces
    pub piece_count: usize,
    /// Smallest target piece size (the last piece may still come out smaller)
    pub min_piece_size: usize,
    /// Largest piece size
    pub max_piece_size: usize,
}

impl Default for LevelParams {
    fn default() -> Self {
        Difficulty::default().params()
    }
}

impl LevelParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.board_size == 0 {
            return Err(ParamsError::EmptyBoard);
        }
        if self.piece_count == 0 {
            return Err(ParamsError::NoPieces);
        }
        if self.min_piece_size == 0 {
            return Err(ParamsError::ZeroPieceSize);
        }
        if self.min_piece_size > self.max_piece_size {
            return Err(ParamsError::InvertedSizeRange {
                min: self.min_piece_size,
                max: self.max_piece_size,
            });
        }
        Ok(())
    }

    /// Whether the piece budget can in principle fill the board.
    pub fn can_cover_board(&self) -> bool {
        self.piece_count.saturating_mul(self.max_piece_size) >= self.board_size * self.board_size
    }

    /// Load parameters from a JSON file. Missing fields take the default preset's values.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let params: LevelParams =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }
}

/// Rejected level parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsError {
    EmptyBoard,
    NoPieces,
    ZeroPieceSize,
    InvertedSizeRange { min: usize, max: usize },
}

impl std::fmt::Display for ParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamsError::EmptyBoard => write!(f, "Board size must be at least 1"),
            ParamsError::NoPieces => write!(f, "Piece count must be at least 1"),
            ParamsError::ZeroPieceSize => write!(f, "Minimum piece size must be at least 1"),
            ParamsError::InvertedSizeRange { min, max } => {
                write!(f, "Minimum piece size {} exceeds maximum {}", min, max)
            }
        }
    }
}

impl std::error::Error for ParamsError {}

/// Errors loading a config file
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(ParamsError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Invalid(e) => write!(f, "Invalid parameters: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<ParamsError> for ConfigError {
    fn from(e: ParamsError) -> Self {
        ConfigError::Invalid(e)
    }
}
