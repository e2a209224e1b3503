//! Stone (marker) detection without any grid knowledge.
//!
//! Pixels clearly darker or brighter than the median board tone form two
//! masks. A morphological opening erases thin grid lines and star points so
//! that stones sitting on intersections separate from the grid. Each
//! 8-connected component is then checked for size, roundness and contrast
//! against its immediate surroundings, and overlapping survivors are thinned
//! by non-maximum suppression.

use std::cmp::Ordering;

use goboard_core::{BlobCandidate, BlobParams, RecognitionError};
use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::open;
use imageproc::region_labelling::{connected_components, Connectivity};
use log::debug;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::sampling::{annulus_mean, disk_mean, luma, median_luma};

/// Inner sampling disk, relative to the blob radius.
const CORE_FRAC: f32 = 0.7;
/// Background annulus, relative to the blob radius.
const RING_INNER: f32 = 1.2;
const RING_OUTER: f32 = 1.5;

/// Thick regions clearly darker or brighter than the median board tone.
///
/// The opening erases thin grid lines, so what remains are stone footprints
/// (and star points when the radius is small).
pub(crate) struct StoneMasks {
    pub dark: GrayImage,
    pub bright: GrayImage,
    min_contrast: f32,
    open_px: u8,
}

impl StoneMasks {
    /// `min_contrast` is a percentage of full scale, `open_px` the opening radius.
    pub fn compute(gray: &GrayImage, min_contrast: f32, open_px: u8) -> Self {
        let background = median_luma(gray) as f32;
        let delta = min_contrast / 100.0 * 255.0;
        debug!("stone masks: background {background:.0}, delta {delta:.0}");
        Self {
            dark: suppress_lines(threshold_mask(gray, |v| v <= background - delta), open_px),
            bright: suppress_lines(threshold_mask(gray, |v| v >= background + delta), open_px),
            min_contrast,
            open_px,
        }
    }

    /// True when the masks were built with these settings.
    pub fn built_with(&self, min_contrast: f32, open_px: u8) -> bool {
        self.min_contrast == min_contrast && self.open_px == open_px
    }

    #[inline]
    pub fn covers(&self, x: u32, y: u32) -> bool {
        self.dark.get_pixel(x, y)[0] != 0 || self.bright.get_pixel(x, y)[0] != 0
    }
}

/// Candidates plus the two threshold masks.
pub(crate) struct BlobDetection {
    pub candidates: Vec<BlobCandidate>,
    pub dark_mask: GrayImage,
    pub bright_mask: GrayImage,
}

/// Find roughly circular high-contrast blobs.
///
/// Never fails on an empty result; fails with `InvalidImage` only for a
/// zero-sized raster. Output is ordered top to bottom, then left to right.
pub fn detect_markers(
    image: &RgbImage,
    params: &BlobParams,
) -> Result<Vec<BlobCandidate>, RecognitionError> {
    let gray = luma(image)?;
    let masks = StoneMasks::compute(&gray, params.min_contrast, params.line_suppress_px);
    Ok(detect_blobs(&gray, masks, params).candidates)
}

#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(gray, masks, params), fields(width = gray.width(), height = gray.height()))
)]
pub(crate) fn detect_blobs(gray: &GrayImage, masks: StoneMasks, params: &BlobParams) -> BlobDetection {
    let mut raw = Vec::new();
    for mask in [&masks.dark, &masks.bright] {
        raw.extend(
            component_stats(mask)
                .into_iter()
                .filter_map(|s| evaluate_component(gray, &s, params)),
        );
    }
    let found = raw.len();
    let mut candidates = suppress_overlaps(raw);
    candidates.sort_by(|a, b| {
        a.center
            .y
            .total_cmp(&b.center.y)
            .then(a.center.x.total_cmp(&b.center.x))
    });
    debug!(
        "blobs: {found} components accepted, {} after suppression",
        candidates.len()
    );

    BlobDetection {
        candidates,
        dark_mask: masks.dark,
        bright_mask: masks.bright,
    }
}

fn threshold_mask(gray: &GrayImage, keep: impl Fn(f32) -> bool) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if keep(gray.get_pixel(x, y)[0] as f32) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

fn suppress_lines(mask: GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return mask;
    }
    open(&mask, Norm::LInf, radius)
}

#[derive(Clone, Copy, Debug)]
struct ComponentStats {
    area: u32,
    sum_x: u64,
    sum_y: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl ComponentStats {
    fn new(x: u32, y: u32) -> Self {
        Self {
            area: 0,
            sum_x: 0,
            sum_y: 0,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.area += 1;
        self.sum_x += x as u64;
        self.sum_y += y as u64;
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn centroid(&self) -> Point2<f32> {
        let n = self.area.max(1) as f64;
        Point2::new((self.sum_x as f64 / n) as f32, (self.sum_y as f64 / n) as f32)
    }

    /// Area relative to the circle enclosing the bounding box.
    fn circularity(&self) -> f32 {
        let w = (self.max_x - self.min_x + 1) as f32;
        let h = (self.max_y - self.min_y + 1) as f32;
        let r = 0.5 * w.max(h);
        (self.area as f32 / (std::f32::consts::PI * r * r)).min(1.0)
    }
}

fn component_stats(mask: &GrayImage) -> Vec<ComponentStats> {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));
    let mut stats: Vec<Option<ComponentStats>> = Vec::new();
    for (x, y, p) in labels.enumerate_pixels() {
        let label = p[0] as usize;
        if label == 0 {
            continue;
        }
        if stats.len() < label {
            stats.resize(label, None);
        }
        stats[label - 1]
            .get_or_insert_with(|| ComponentStats::new(x, y))
            .add(x, y);
    }
    stats.into_iter().flatten().collect()
}

fn evaluate_component(
    gray: &GrayImage,
    stats: &ComponentStats,
    params: &BlobParams,
) -> Option<BlobCandidate> {
    let radius = (stats.area as f32 / std::f32::consts::PI).sqrt();
    if radius < params.min_radius || radius > params.max_radius {
        return None;
    }
    let circularity = stats.circularity();
    if circularity < params.min_circularity {
        return None;
    }

    let center = stats.centroid();
    let inside = disk_mean(gray, center, CORE_FRAC * radius)?;
    let ring = annulus_mean(gray, center, RING_INNER * radius, RING_OUTER * radius)?;
    let contrast = (inside - ring).abs() / 255.0 * 100.0;
    if contrast < params.min_contrast {
        return None;
    }

    Some(BlobCandidate {
        center,
        radius,
        contrast,
        circularity,
        score: circularity * contrast,
    })
}

/// Drop candidates whose center falls within the radius of a stronger one.
fn suppress_overlaps(mut raw: Vec<BlobCandidate>) -> Vec<BlobCandidate> {
    raw.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.center.y.total_cmp(&b.center.y))
            .then(a.center.x.total_cmp(&b.center.x))
    });
    let mut kept: Vec<BlobCandidate> = Vec::with_capacity(raw.len());
    for cand in raw {
        let shadowed = kept.iter().any(|k| {
            let d = cand.center - k.center;
            d.norm_squared() < k.radius * k.radius
        });
        if !shadowed {
            kept.push(cand);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use goboard_core::DetectorParams;
    use image::Rgb;
    use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

    const WOOD: Rgb<u8> = Rgb([215, 175, 95]);

    fn params() -> BlobParams {
        DetectorParams::default().blobs
    }

    fn candidate(x: f32, y: f32, radius: f32, score: f32) -> BlobCandidate {
        BlobCandidate {
            center: Point2::new(x, y),
            radius,
            contrast: 50.0,
            circularity: 0.9,
            score,
        }
    }

    #[test]
    fn finds_dark_and_bright_disks_on_lines() {
        let mut img = RgbImage::from_pixel(200, 120, WOOD);
        for y in [30.0, 60.0, 90.0] {
            draw_line_segment_mut(&mut img, (10.0, y), (190.0, y), Rgb([0, 0, 0]));
        }
        draw_line_segment_mut(&mut img, (60.0, 10.0), (60.0, 110.0), Rgb([0, 0, 0]));
        draw_filled_circle_mut(&mut img, (60, 60), 12, Rgb([10, 10, 10]));
        draw_filled_circle_mut(&mut img, (140, 60), 12, Rgb([250, 250, 250]));

        let found = detect_markers(&img, &params()).expect("valid image");
        assert_eq!(found.len(), 2, "{found:?}");
        let left = &found[0];
        let right = &found[1];
        assert!(left.center.x < right.center.x);
        assert!((left.center.x - 60.0).abs() < 1.0 && (left.center.y - 60.0).abs() < 1.0);
        assert!((right.center.x - 140.0).abs() < 1.0);
        assert!((left.radius - 12.0).abs() < 1.5);
    }

    #[test]
    fn surrounded_stones_keep_their_contrast() {
        let mut img = RgbImage::from_pixel(140, 140, WOOD);
        for p in [42.0, 70.0, 98.0] {
            draw_line_segment_mut(&mut img, (p, 10.0), (p, 130.0), Rgb([0, 0, 0]));
            draw_line_segment_mut(&mut img, (10.0, p), (130.0, p), Rgb([0, 0, 0]));
        }
        for y in [42, 70, 98] {
            for x in [42, 70, 98] {
                draw_filled_circle_mut(&mut img, (x, y), 12, Rgb([255, 255, 255]));
            }
        }

        let found = detect_markers(&img, &params()).expect("valid image");
        assert_eq!(found.len(), 9, "{found:?}");
        let center = &found[4];
        assert!((center.center.x - 70.0).abs() < 1.0 && (center.center.y - 70.0).abs() < 1.0);
    }

    #[test]
    fn empty_board_yields_no_candidates() {
        let img = RgbImage::from_pixel(64, 64, WOOD);
        assert!(detect_markers(&img, &params()).expect("valid").is_empty());
    }

    #[test]
    fn radius_limits_filter_candidates() {
        let mut img = RgbImage::from_pixel(120, 120, WOOD);
        draw_filled_circle_mut(&mut img, (60, 60), 30, Rgb([0, 0, 0]));
        let p = BlobParams {
            max_radius: 20.0,
            ..params()
        };
        assert!(detect_markers(&img, &p).expect("valid").is_empty());
    }

    #[test]
    fn weaker_overlapping_candidates_are_suppressed() {
        let kept = suppress_overlaps(vec![
            candidate(10.0, 10.0, 5.0, 1.0),
            candidate(12.0, 10.0, 5.0, 3.0),
            candidate(40.0, 10.0, 5.0, 2.0),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 3.0);
        assert_eq!(kept[1].center.x, 40.0);
    }

    #[test]
    fn zero_sized_image_is_invalid() {
        assert!(matches!(
            detect_markers(&RgbImage::new(5, 0), &params()),
            Err(RecognitionError::InvalidImage { .. })
        ));
    }
}
