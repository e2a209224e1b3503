//! End-to-end recognition: geometry, stones, colors, coordinates.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{DefaultHasher, Hash, Hasher};

use goboard_core::{DetectorParams, Geometry, Marker, ParameterSet, RecognitionError, StoneColor};
use image::{GrayImage, RgbImage};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::blobs::{detect_blobs, StoneMasks};
use crate::classify::classify_gray;
use crate::grid::detect_grid;
use crate::mapping::{nearest_marker, resolve_conflicts, to_board_coordinate};
use crate::sampling::luma;

/// Diagnostic rasters a caller may request from [`process`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DebugImageKind {
    /// Pixels passing the grid edge threshold.
    EdgeMap,
    /// Dark-stone mask after line suppression.
    DarkMask,
    /// Light-stone mask after line suppression.
    BrightMask,
}

impl DebugImageKind {
    pub const ALL: [DebugImageKind; 3] = [
        DebugImageKind::EdgeMap,
        DebugImageKind::DarkMask,
        DebugImageKind::BrightMask,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DebugImageKind::EdgeMap => "edge-map",
            DebugImageKind::DarkMask => "dark-mask",
            DebugImageKind::BrightMask => "bright-mask",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl std::fmt::Display for DebugImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-invocation options that do not influence the recognition itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOptions {
    #[serde(default)]
    pub debug: BTreeSet<DebugImageKind>,
}

impl ProcessOptions {
    pub fn with_all_debug() -> Self {
        Self {
            debug: DebugImageKind::ALL.into_iter().collect(),
        }
    }

    fn wants(&self, kind: DebugImageKind) -> bool {
        self.debug.contains(&kind)
    }
}

/// Output of one [`process`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct RecognitionResult {
    pub geometry: Geometry,
    /// Black stones sorted by (row, col).
    pub black: Vec<Marker>,
    /// White stones sorted by (row, col).
    pub white: Vec<Marker>,
    pub debug: BTreeMap<DebugImageKind, GrayImage>,
}

impl RecognitionResult {
    pub fn markers(&self, color: StoneColor) -> &[Marker] {
        match color {
            StoneColor::Black => &self.black,
            StoneColor::White => &self.white,
        }
    }

    /// Stone under the pixel `(x, y)`, searching both colors.
    pub fn marker_at(&self, x: f32, y: f32) -> Option<&Marker> {
        let b = nearest_marker(x, y, &self.black);
        let w = nearest_marker(x, y, &self.white);
        match (b, w) {
            (Some(b), Some(w)) => Some(if w.distance_sq(x, y) < b.distance_sq(x, y) { w } else { b }),
            (b, w) => b.or(w),
        }
    }

    pub fn view(&self, filter: ViewFilter) -> BoardView<'_> {
        BoardView {
            geometry: &self.geometry,
            black: if filter.show_black { &self.black } else { &[] },
            white: if filter.show_white { &self.white } else { &[] },
        }
    }

    pub fn stone_count(&self) -> usize {
        self.black.len() + self.white.len()
    }
}

/// Which stone colors a [`BoardView`] keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub show_black: bool,
    pub show_white: bool,
}

impl Default for ViewFilter {
    fn default() -> Self {
        Self {
            show_black: true,
            show_white: true,
        }
    }
}

/// Borrowed, filtered projection of a [`RecognitionResult`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardView<'a> {
    pub geometry: &'a Geometry,
    pub black: &'a [Marker],
    pub white: &'a [Marker],
}

/// Identity of an (image, parameters) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvocationKey(pub u64);

/// Key a caller can compare to discard superseded in-flight results.
pub fn invocation_key(image: &RgbImage, params: &ParameterSet) -> InvocationKey {
    let mut h = DefaultHasher::new();
    image.dimensions().hash(&mut h);
    image.as_raw().hash(&mut h);
    params.hash(&mut h);
    InvocationKey(h.finish())
}

/// Recognize a board with default options (no debug images).
pub fn process_default(image: &RgbImage, params: &ParameterSet) -> Result<RecognitionResult, RecognitionError> {
    process(image, params, &ProcessOptions::default())
}

/// Run the whole recognition chain on one image.
///
/// Geometry failures are fatal; any number of stones (including none) is a
/// valid outcome. Candidates that map outside the board are dropped.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(image, params, options), fields(width = image.width(), height = image.height()))
)]
pub fn process(
    image: &RgbImage,
    params: &ParameterSet,
    options: &ProcessOptions,
) -> Result<RecognitionResult, RecognitionError> {
    let gray = luma(image)?;
    let typed = DetectorParams::from(params);

    let stones = StoneMasks::compute(&gray, typed.grid.stone_contrast, typed.grid.stone_open_px);
    let grid = detect_grid(&gray, &stones, &typed.grid, options.wants(DebugImageKind::EdgeMap))?;
    let geometry = grid.geometry;

    let stones = if stones.built_with(typed.blobs.min_contrast, typed.blobs.line_suppress_px) {
        stones
    } else {
        StoneMasks::compute(&gray, typed.blobs.min_contrast, typed.blobs.line_suppress_px)
    };
    let blobs = detect_blobs(&gray, stones, &typed.blobs);

    let mut mapped = Vec::with_capacity(blobs.candidates.len());
    for cand in &blobs.candidates {
        match to_board_coordinate(cand.center, &geometry) {
            Ok(coord) => mapped.push(Marker {
                position: cand.center,
                radius: cand.radius,
                color: classify_gray(&gray, cand, &typed.classify),
                coord,
                score: cand.score,
            }),
            Err(e) => debug!(
                "dropping blob at ({:.1}, {:.1}): {e}",
                cand.center.x, cand.center.y
            ),
        }
    }

    let mut black = Vec::new();
    let mut white = Vec::new();
    for m in resolve_conflicts(mapped) {
        match m.color {
            StoneColor::Black => black.push(m),
            StoneColor::White => white.push(m),
        }
    }
    for list in [&mut black, &mut white] {
        list.sort_by_key(|m| (m.coord.row, m.coord.col));
    }

    let mut debug = BTreeMap::new();
    if let Some(edges) = grid.edge_map {
        debug.insert(DebugImageKind::EdgeMap, edges);
    }
    if options.wants(DebugImageKind::DarkMask) {
        debug.insert(DebugImageKind::DarkMask, blobs.dark_mask);
    }
    if options.wants(DebugImageKind::BrightMask) {
        debug.insert(DebugImageKind::BrightMask, blobs.bright_mask);
    }

    info!(
        "recognized {}x{} board: {} black, {} white",
        geometry.board_size,
        geometry.board_size,
        black.len(),
        white.len()
    );

    Ok(RecognitionResult {
        geometry,
        black,
        white,
        debug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use goboard_core::BoardCoord;
    use nalgebra::Point2;

    fn stone(x: f32, y: f32, color: StoneColor) -> Marker {
        Marker {
            position: Point2::new(x, y),
            radius: 10.0,
            color,
            coord: BoardCoord::new(0, 0),
            score: 1.0,
        }
    }

    fn result() -> RecognitionResult {
        RecognitionResult {
            geometry: Geometry::default(),
            black: vec![stone(28.0, 28.0, StoneColor::Black)],
            white: vec![stone(40.0, 28.0, StoneColor::White)],
            debug: BTreeMap::new(),
        }
    }

    #[test]
    fn debug_kind_names_match_serde() {
        for kind in DebugImageKind::ALL {
            let json = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(json, format!("\"{}\"", kind.name()));
            assert_eq!(DebugImageKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(DebugImageKind::from_name("nope"), None);
    }

    #[test]
    fn view_hides_colors_without_touching_the_result() {
        let r = result();
        let v = r.view(ViewFilter {
            show_black: false,
            show_white: true,
        });
        assert!(v.black.is_empty());
        assert_eq!(v.white.len(), 1);
        assert_eq!(r.black.len(), 1);
        let all = r.view(ViewFilter::default());
        assert_eq!(all.black.len() + all.white.len(), r.stone_count());
    }

    #[test]
    fn marker_at_prefers_the_closer_color() {
        let r = result();
        assert_eq!(r.marker_at(37.0, 28.0).map(|m| m.color), Some(StoneColor::White));
        assert_eq!(r.marker_at(30.0, 28.0).map(|m| m.color), Some(StoneColor::Black));
        assert!(r.marker_at(300.0, 300.0).is_none());
    }

    #[test]
    fn invocation_key_tracks_image_and_params() {
        let img = RgbImage::from_pixel(8, 8, image::Rgb([1, 2, 3]));
        let p = ParameterSet::defaults();
        let k = invocation_key(&img, &p);
        assert_eq!(k, invocation_key(&img.clone(), &p.clone()));

        let mut other = img.clone();
        other.put_pixel(0, 0, image::Rgb([9, 9, 9]));
        assert_ne!(k, invocation_key(&other, &p));

        let tweaked = p
            .with(goboard_core::params::EDGE_THRESHOLD, 41, Default::default())
            .expect("in range");
        assert_ne!(k, invocation_key(&img, &tweaked));
    }

    #[test]
    fn blank_image_fails_geometry() {
        let img = RgbImage::from_pixel(100, 100, image::Rgb([215, 175, 95]));
        assert!(matches!(
            process_default(&img, &ParameterSet::defaults()),
            Err(RecognitionError::GeometryNotFound(_))
        ));
    }
}
