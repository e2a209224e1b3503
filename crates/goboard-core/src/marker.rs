use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::board::{BoardCoord, StoneColor};

/// Raw blob found by the marker detector, before classification and mapping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlobCandidate {
    pub center: Point2<f32>,
    /// Equivalent-area radius in pixels, always > 0.
    pub radius: f32,
    /// Absolute blob/background difference, percent of full scale.
    pub contrast: f32,
    /// Fill ratio of the enclosing circle in [0, 1].
    pub circularity: f32,
    /// Detection confidence used for suppression and conflict resolution.
    pub score: f32,
}

/// Classified stone mapped onto a board intersection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: Point2<f32>,
    pub radius: f32,
    pub color: StoneColor,
    pub coord: BoardCoord,
    pub score: f32,
}

impl Marker {
    /// Squared distance from the marker center to `(x, y)`.
    #[inline]
    pub fn distance_sq(&self, x: f32, y: f32) -> f32 {
        let dx = self.position.x - x;
        let dy = self.position.y - y;
        dx * dx + dy * dy
    }

    /// Whether `(x, y)` falls inside the detection footprint.
    #[inline]
    pub fn covers(&self, x: f32, y: f32) -> bool {
        self.distance_sq(x, y) <= self.radius * self.radius
    }

    /// `true` when `self` should win an intersection collision against `other`.
    pub fn outranks(&self, other: &Marker) -> bool {
        if self.score != other.score {
            return self.score > other.score;
        }
        self.radius > other.radius
    }
}
