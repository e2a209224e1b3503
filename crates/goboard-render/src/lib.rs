//! Canonical Go board diagrams.
//!
//! [`synthesize`] draws the board a recognition result describes; feeding the
//! diagram back through the detector closes the image → result → image loop
//! and doubles as a ground-truth generator for tests.

mod overlay;
mod synth;

pub use overlay::{draw_detections, DETECTION};
pub use synth::{
    default_geometry, hoshi_points, placed_marker, synthesize, BLACK_STONE, LINE, STONE_RADIUS_FRAC,
    WHITE_STONE, WOOD,
};
