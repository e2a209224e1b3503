//! Board geometry detection.
//!
//! Algorithm:
//! 1. Sobel gradients of the luma plane. A pixel lies on a thin dark vertical
//!    line when the gradient falls to `-edge_threshold` one or two pixels to
//!    its left and rises to `+edge_threshold` as far to its right (gradients
//!    divided by 4); the same along y for horizontal lines. Stone rims are
//!    single steps and never form such a pair.
//! 2. Stone footprints are excluded. Each column (row) profile bin is the
//!    share of its uncovered pixels that carry line evidence, so a line
//!    crossed by many stones keeps its support.
//! 3. Each profile turns into line candidates; the best evenly spaced family wins.
//! 4. Outermost lines give the boundary, the median gap the spacing, the
//!    number of steps the crossing counts; board size follows the size policy.

use goboard_core::{Axis, Geometry, GeometryFailure, GridParams, RecognitionError};
use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use log::debug;
use nalgebra::{Point2, Vector2};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::blobs::StoneMasks;
use crate::lines::{best_family, line_candidates, LineFamily};
use crate::sampling::luma;

/// Sobel kernels sum to 4 on each side; dividing brings magnitudes to 0..255.
const SOBEL_NORM: f32 = 4.0;
const MIN_ASPECT_RATIO: f32 = 0.5;
const MAX_ASPECT_RATIO: f32 = 2.0;
/// Distances from a line center to its gradient flanks (1 to 4 px wide lines).
const FLANK_OFFSETS: [u32; 2] = [1, 2];
/// Floor of a profile divisor, as a share of the column or row length.
const MIN_UNCOVERED_FRAC: f32 = 0.1;

type Gradient = ImageBuffer<Luma<i16>, Vec<i16>>;

/// Line-evidence projections of one luma plane.
pub(crate) struct EdgeProfiles {
    /// Per-column share of uncovered pixels on a vertical line.
    pub columns: Vec<f32>,
    /// Per-row share of uncovered pixels on a horizontal line.
    pub rows: Vec<f32>,
    pub edge_map: Option<GrayImage>,
}

/// Falling gradient `d` pixels before `(x, y)` and rising `d` pixels after it.
fn dark_ridge(g: &Gradient, x: u32, y: u32, step: (u32, u32), limit: f32) -> bool {
    let (w, h) = g.dimensions();
    FLANK_OFFSETS.iter().any(|&d| {
        let (dx, dy) = (step.0 * d, step.1 * d);
        if x < dx || y < dy || x + dx >= w || y + dy >= h {
            return false;
        }
        f32::from(g.get_pixel(x - dx, y - dy)[0]) <= -limit
            && f32::from(g.get_pixel(x + dx, y + dy)[0]) >= limit
    })
}

fn normalize(hits: &[u32], uncovered: &[u32], length: u32) -> Vec<f32> {
    let floor = (MIN_UNCOVERED_FRAC * length as f32).max(1.0);
    hits.iter()
        .zip(uncovered)
        .map(|(&n, &u)| n as f32 / (u as f32).max(floor))
        .collect()
}

pub(crate) fn edge_profiles(
    gray: &GrayImage,
    stones: &StoneMasks,
    edge_threshold: f32,
    keep_map: bool,
) -> EdgeProfiles {
    let (w, h) = gray.dimensions();
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);
    let limit = edge_threshold * SOBEL_NORM;

    let mut column_hits = vec![0u32; w as usize];
    let mut row_hits = vec![0u32; h as usize];
    let mut column_free = vec![0u32; w as usize];
    let mut row_free = vec![0u32; h as usize];
    let mut edge_map = keep_map.then(|| GrayImage::new(w, h));

    for y in 0..h {
        for x in 0..w {
            if stones.covers(x, y) {
                continue;
            }
            column_free[x as usize] += 1;
            row_free[y as usize] += 1;

            let vertical = dark_ridge(&gx, x, y, (1, 0), limit);
            let horizontal = dark_ridge(&gy, x, y, (0, 1), limit);
            if vertical {
                column_hits[x as usize] += 1;
            }
            if horizontal {
                row_hits[y as usize] += 1;
            }
            if let Some(map) = edge_map.as_mut() {
                if vertical || horizontal {
                    map.put_pixel(x, y, Luma([255]));
                }
            }
        }
    }

    EdgeProfiles {
        columns: normalize(&column_hits, &column_free, h),
        rows: normalize(&row_hits, &row_free, w),
        edge_map,
    }
}

/// Geometry plus the optional edge-map side output.
pub(crate) struct GridDetection {
    pub geometry: Geometry,
    pub edge_map: Option<GrayImage>,
}

/// Locate the board boundary and regular grid in an image.
///
/// Fails with `InvalidImage` on a zero dimension and with `GeometryNotFound`
/// when no plausible grid is present.
pub fn detect_geometry(image: &RgbImage, params: &GridParams) -> Result<Geometry, RecognitionError> {
    let gray = luma(image)?;
    let stones = StoneMasks::compute(&gray, params.stone_contrast, params.stone_open_px);
    detect_grid(&gray, &stones, params, false).map(|d| d.geometry)
}

#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(gray, stones, params), fields(width = gray.width(), height = gray.height()))
)]
pub(crate) fn detect_grid(
    gray: &GrayImage,
    stones: &StoneMasks,
    params: &GridParams,
    keep_edge_map: bool,
) -> Result<GridDetection, RecognitionError> {
    let profiles = edge_profiles(gray, stones, params.edge_threshold, keep_edge_map);

    let verticals = family_for(&profiles.columns, Axis::Vertical, params)?;
    let horizontals = family_for(&profiles.rows, Axis::Horizontal, params)?;

    let top_left = Point2::new(verticals.first(), horizontals.first());
    let bottom_right = Point2::new(verticals.last(), horizontals.last());
    let width = bottom_right.x - top_left.x;
    let height = bottom_right.y - top_left.y;
    let ratio = width / height;
    if !(MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO).contains(&ratio) {
        return Err(GeometryFailure::AspectRatio { ratio }.into());
    }

    let crossings = [
        (verticals.len() - 1) as u32,
        (horizontals.len() - 1) as u32,
    ];
    let raw_size = crossings[0].max(crossings[1]) + 1;
    let board_size = params
        .size_policy
        .resolve(raw_size)
        .ok_or(GeometryFailure::NonCanonicalSize { size: raw_size })?;

    let geometry = Geometry {
        top_left,
        bottom_right,
        spacing: Vector2::new(verticals.spacing, horizontals.spacing),
        crossings,
        board_size,
    };
    debug!(
        "grid: edges ({:.1},{:.1})-({:.1},{:.1}) spacing ({:.2},{:.2}) crossings {:?} size {}",
        top_left.x,
        top_left.y,
        bottom_right.x,
        bottom_right.y,
        geometry.spacing.x,
        geometry.spacing.y,
        crossings,
        board_size
    );

    Ok(GridDetection {
        geometry,
        edge_map: profiles.edge_map,
    })
}

fn family_for(profile: &[f32], axis: Axis, params: &GridParams) -> Result<LineFamily, RecognitionError> {
    let candidates = line_candidates(profile, params.line_min_support, params.line_merge_px);
    debug!("{axis} line candidates: {}", candidates.len());

    let required = params.min_grid_lines;
    let too_few = |found: usize| GeometryFailure::TooFewLines {
        axis,
        found,
        required,
    };

    let family = best_family(&candidates, params.min_line_spacing, params.spacing_tolerance)
        .ok_or_else(|| too_few(candidates.len().min(1)))?;
    if family.len() < required || family.spacing <= 0.0 {
        return Err(too_few(family.len()).into());
    }
    Ok(family)
}
