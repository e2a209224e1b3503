use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard Go board sizes, ascending.
pub const CANONICAL_SIZES: [u32; 3] = [9, 13, 19];

/// Column letters used in Go notation. `I` is skipped to avoid confusion with `J`.
const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// Largest board that can be labelled with single column letters.
pub const MAX_LABELLED_SIZE: u32 = COLUMN_LETTERS.len() as u32;

/// Stone (marker) color class.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoneColor {
    Black,
    White,
}

impl StoneColor {
    pub const ALL: [StoneColor; 2] = [StoneColor::Black, StoneColor::White];

    pub fn name(self) -> &'static str {
        match self {
            StoneColor::Black => "black",
            StoneColor::White => "white",
        }
    }
}

impl fmt::Display for StoneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Zero-based board intersection.
///
/// `col` grows to the right and `row` grows downward, matching image space.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BoardCoord {
    pub col: u32,
    pub row: u32,
}

impl BoardCoord {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Whether this intersection lies on a board of `size` lines.
    #[inline]
    pub fn fits(self, size: u32) -> bool {
        self.col < size && self.row < size
    }

    /// Go-notation label, e.g. `D16` for `(3, 3)` on a 19x19 board.
    ///
    /// Rows are numbered from the bottom edge. Returns `None` when the
    /// coordinate is off the board or the board is too large for letters.
    pub fn label(self, board_size: u32) -> Option<String> {
        if !self.fits(board_size) || board_size > MAX_LABELLED_SIZE {
            return None;
        }
        let letter = COLUMN_LETTERS[self.col as usize] as char;
        Some(format!("{letter}{}", board_size - self.row))
    }

    /// Parse a Go-notation label back into a coordinate.
    pub fn parse_label(label: &str, board_size: u32) -> Option<Self> {
        let mut chars = label.trim().chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let col = COLUMN_LETTERS.iter().position(|&c| c as char == letter)? as u32;
        let number: u32 = chars.as_str().parse().ok()?;
        if number == 0 || number > board_size {
            return None;
        }
        let coord = BoardCoord::new(col, board_size - number);
        coord.fits(board_size).then_some(coord)
    }
}

impl fmt::Display for BoardCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Rule collapsing a measured line count into a board size.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardSizePolicy {
    /// Round to the closest canonical size; ties go to the larger one.
    #[default]
    Nearest,
    /// Accept only canonical sizes.
    Exact,
}

impl BoardSizePolicy {
    /// Resolve a raw size (`crossings + 1`). `None` means the policy rejects it.
    pub fn resolve(self, raw_size: u32) -> Option<u32> {
        match self {
            BoardSizePolicy::Exact => CANONICAL_SIZES.contains(&raw_size).then_some(raw_size),
            BoardSizePolicy::Nearest => {
                let mut best = CANONICAL_SIZES[0];
                for &size in &CANONICAL_SIZES {
                    if size.abs_diff(raw_size) <= best.abs_diff(raw_size) {
                        best = size;
                    }
                }
                Some(best)
            }
        }
    }
}
