//! Go board recognition stages.
//!
//! - [`detect_geometry`]: boundary, spacing and board size from grid lines.
//! - [`detect_markers`]: round high-contrast blobs (stone candidates).
//! - [`classify`]: black or white by mean brightness.
//! - [`to_board_coordinate`], [`nearest_marker`], [`resolve_conflicts`]: pixel ↔ intersection mapping.
//! - [`process`]: the whole chain, producing a [`RecognitionResult`].
//!
//! All stages are pure functions of the input raster and parameters.

mod blobs;
mod classify;
mod grid;
mod lines;
mod mapping;
mod pipeline;
mod sampling;

pub use blobs::detect_markers;
pub use classify::classify;
pub use grid::detect_geometry;
pub use mapping::{nearest_marker, resolve_conflicts, to_board_coordinate};
pub use pipeline::{
    invocation_key, process, process_default, BoardView, DebugImageKind, InvocationKey, ProcessOptions,
    RecognitionResult, ViewFilter,
};
