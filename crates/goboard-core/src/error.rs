use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid line family.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Vertical lines, spaced along x.
    Vertical,
    /// Horizontal lines, spaced along y.
    Horizontal,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Vertical => f.write_str("vertical"),
            Axis::Horizontal => f.write_str("horizontal"),
        }
    }
}

/// Why no plausible grid was accepted.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum GeometryFailure {
    #[error("{axis} family has {found} evenly spaced lines, need {required}")]
    TooFewLines {
        axis: Axis,
        found: usize,
        required: usize,
    },
    #[error("board boundary aspect ratio {ratio:.2} is implausible")]
    AspectRatio { ratio: f32 },
    #[error("measured board size {size} is not a standard size")]
    NonCanonicalSize { size: u32 },
}

/// Errors returned by the recognition stages.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum RecognitionError {
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidImage { width: u32, height: u32 },

    #[error("parameter `{name}` = {value} is outside [{min}, {max}]")]
    InvalidParameter {
        name: String,
        value: i64,
        min: i32,
        max: i32,
    },

    #[error("could not recognize a board: {0}")]
    GeometryNotFound(#[from] GeometryFailure),
}

/// A pixel position that rounds to an intersection off the board.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("intersection ({col}, {row}) is outside a {board_size}x{board_size} board")]
pub struct OutOfBounds {
    pub col: i64,
    pub row: i64,
    pub board_size: u32,
}
