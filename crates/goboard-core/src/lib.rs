//! Core types, parameters and errors for Go board recognition.
//!
//! This crate is intentionally small and free of any image type. The
//! detection stages live in `goboard-detect`, rendering in `goboard-render`.

mod board;
mod error;
mod geometry;
mod logger;
mod marker;
pub mod params;

pub use board::{BoardCoord, BoardSizePolicy, StoneColor, CANONICAL_SIZES, MAX_LABELLED_SIZE};
pub use error::{Axis, GeometryFailure, OutOfBounds, RecognitionError};
pub use geometry::{Geometry, CANONICAL_SPACING_PX};
pub use marker::{BlobCandidate, Marker};
pub use params::{
    BlobParams, ClassifyParams, DetectorParams, GridParams, ParamSpec, ParameterSet,
    ValidationPolicy, PARAM_GROUPS, PARAM_SPECS,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
