use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tilemap::Tilemap;

/// Integer cell coordinate on the board. Cell `(x, y)` covers the unit
/// square from `(x, y)` to `(x + 1, y + 1)`, with +y pointing up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four edge-adjacent coordinates (left, right, down, up), unbounded.
    pub fn neighbors_4(self) -> [GridCoord; 4] {
        [
            GridCoord::new(self.x - 1, self.y),
            GridCoord::new(self.x + 1, self.y),
            GridCoord::new(self.x, self.y - 1),
            GridCoord::new(self.x, self.y + 1),
        ]
    }

    /// Whether two cells share an edge.
    pub fn is_adjacent(self, other: GridCoord) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }

    pub fn in_board(self, board_size: usize) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as usize) < board_size && (self.y as usize) < board_size
    }

    pub(crate) fn from_tile(x: usize, y: usize) -> Self {
        Self::new(x as i32, y as i32)
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unique identifier for a piece, assigned in creation order from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

impl PieceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Piece_{}", self.0)
    }
}

/// Display color of a piece. Formats and serializes as `#RRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PieceColor(pub [u8; 3]);

impl PieceColor {
    pub const WHITE: PieceColor = PieceColor([255, 255, 255]);

    /// Random color from a uniform HSV draw (hue, saturation and value all in [0, 1]).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let h: f32 = rng.gen_range(0.0..=1.0);
        let s: f32 = rng.gen_range(0.0..=1.0);
        let v: f32 = rng.gen_range(0.0..=1.0);
        Self::from_hsv(h, s, v)
    }

    /// Convert HSV (each component in [0, 1]) to an 8-bit RGB color.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h = h.clamp(0.0, 1.0);
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);

        let sector = (h * 6.0).min(5.999_999);
        let i = sector.floor() as u32;
        let f = sector - i as f32;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match i {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        let quantize = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        Self([quantize(r), quantize(g), quantize(b)])
    }

    /// Parse `#RRGGBB`, `RRGGBB` or `#RGB` (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(s.to_string()));
        }

        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16).map_err(|_| ColorParseError::InvalidDigit(s.to_string()))
        };

        match hex.len() {
            6 => Ok(Self([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?])),
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, i) in rgb.iter_mut().zip(0..3) {
                    *slot = channel(&hex[i..i + 1])? * 17;
                }
                Ok(Self(rgb))
            }
            len => Err(ColorParseError::InvalidLength(len)),
        }
    }

    /// Parse, falling back to `fallback` on malformed input.
    pub fn parse_or(s: &str, fallback: PieceColor) -> Self {
        Self::parse(s).unwrap_or(fallback)
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

impl std::fmt::Display for PieceColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<PieceColor> for String {
    fn from(color: PieceColor) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for PieceColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PieceColor::parse(&value)
    }
}

impl std::str::FromStr for PieceColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PieceColor::parse(s)
    }
}

/// Errors from parsing a color string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Hex body must be 3 or 6 digits long
    InvalidLength(usize),
    /// Non-hex character in the input
    InvalidDigit(String),
}

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorParseError::InvalidLength(len) => {
                write!(f, "Color must have 3 or 6 hex digits, got {}", len)
            }
            ColorParseError::InvalidDigit(s) => write!(f, "Invalid hex color: {:?}", s),
        }
    }
}

impl std::error::Error for ColorParseError {}

/// A puzzle piece: a connected set of board cells with an identity and color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    /// Cells in the order they were grown. Never empty.
    pub cells: Vec<GridCoord>,
    pub color: PieceColor,
}

impl Piece {
    pub fn new(id: PieceId, cells: Vec<GridCoord>, color: PieceColor) -> Self {
        Self { id, cells, color }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: GridCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Inclusive cell-space bounding box as (min, max), or `None` for an empty piece.
    pub fn cell_bounds(&self) -> Option<(GridCoord, GridCoord)> {
        let first = *self.cells.first()?;
        Some(self.cells.iter().fold((first, first), |(lo, hi), c| {
            (
                GridCoord::new(lo.x.min(c.x), lo.y.min(c.y)),
                GridCoord::new(hi.x.max(c.x), hi.y.max(c.y)),
            )
        }))
    }
}

/// A generated level: the board size plus pieces in creation order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub board_size: usize,
    pub pieces: Vec<Piece>,
}

impl Level {
    /// Total number of board cells.
    pub fn cell_count(&self) -> usize {
        self.board_size * self.board_size
    }

    /// Number of cells owned by some piece.
    pub fn assigned_cells(&self) -> usize {
        self.pieces.iter().map(Piece::len).sum()
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    /// Rebuild the board: which piece owns each cell. Cells outside the
    /// board are ignored; on overlap the later piece wins.
    pub fn owner_map(&self) -> Tilemap<Option<PieceId>> {
        let mut board = Tilemap::square(self.board_size, None);
        for piece in &self.pieces {
            for cell in &piece.cells {
                if cell.in_board(self.board_size) {
                    board.set(cell.x as usize, cell.y as usize, Some(piece.id));
                }
            }
        }
        board
    }
}
