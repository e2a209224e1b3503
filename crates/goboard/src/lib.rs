//! High-level facade for the `goboard-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core types, the recognition stages and the renderer
//! - parameter and board-record sidecars next to an image ([`io`])
//! - the status of a directory of tagged images ([`dataset`])
//!
//! ## Quickstart
//!
//! ```no_run
//! use goboard::{io, process_default, ParameterSet};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = io::load_image("board.png")?;
//! let result = process_default(&img, &ParameterSet::defaults())?;
//! println!(
//!     "{}x{} board, {} stones",
//!     result.geometry.board_size,
//!     result.geometry.board_size,
//!     result.stone_count()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `goboard::core`: coordinates, geometry, markers, parameters, errors.
//! - `goboard::detect`: geometry, stone detection, mapping and the pipeline.
//! - `goboard::render`: canonical diagrams and detection overlays.

pub use goboard_core as core;
pub use goboard_detect as detect;
pub use goboard_render as render;

pub use goboard_core::{
    BoardCoord, BoardSizePolicy, Geometry, Marker, ParameterSet, RecognitionError, StoneColor,
    ValidationPolicy,
};
pub use goboard_detect::{
    invocation_key, process, process_default, BoardView, DebugImageKind, InvocationKey,
    ProcessOptions, RecognitionResult, ViewFilter,
};
pub use goboard_render::{draw_detections, synthesize};

pub mod dataset;
pub mod io;

use image::RgbImage;

/// Render the diagram of a filtered view.
///
/// `geometry` overrides the canvas layout; `None` keeps the recognized
/// geometry of the view.
pub fn render_view(view: &BoardView<'_>, geometry: Option<&Geometry>) -> RgbImage {
    synthesize(Some(geometry.unwrap_or(view.geometry)), view.black, view.white)
}
