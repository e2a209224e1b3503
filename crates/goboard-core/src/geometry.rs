use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::board::BoardCoord;

/// Spacing and margin of the built-in canonical diagram, in pixels.
pub const CANONICAL_SPACING_PX: f32 = 28.0;

/// Detected (or canonical) board grid in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Intersection of the leftmost vertical and topmost horizontal line.
    pub top_left: Point2<f32>,
    /// Intersection of the rightmost vertical and bottommost horizontal line.
    pub bottom_right: Point2<f32>,
    /// Distance between adjacent vertical (x) and horizontal (y) lines.
    pub spacing: Vector2<f32>,
    /// Line-to-line steps across the board, horizontally and vertically.
    pub crossings: [u32; 2],
    /// Number of intersections per side.
    pub board_size: u32,
}

impl Geometry {
    /// Canonical square geometry with `margin` pixels around the grid.
    pub fn canonical(board_size: u32, spacing: f32, margin: f32) -> Self {
        let steps = board_size.saturating_sub(1);
        let extent = steps as f32 * spacing;
        Self {
            top_left: Point2::new(margin, margin),
            bottom_right: Point2::new(margin + extent, margin + extent),
            spacing: Vector2::new(spacing, spacing),
            crossings: [steps, steps],
            board_size,
        }
    }

    /// Pixel position of a board intersection.
    #[inline]
    pub fn intersection(&self, coord: BoardCoord) -> Point2<f32> {
        Point2::new(
            self.top_left.x + coord.col as f32 * self.spacing.x,
            self.top_left.y + coord.row as f32 * self.spacing.y,
        )
    }

    /// Width and height of the boundary rectangle.
    pub fn extent(&self) -> Vector2<f32> {
        self.bottom_right - self.top_left
    }

    /// Smaller of the two spacing components.
    pub fn min_spacing(&self) -> f32 {
        self.spacing.x.min(self.spacing.y)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry::canonical(19, CANONICAL_SPACING_PX, CANONICAL_SPACING_PX)
    }
}
