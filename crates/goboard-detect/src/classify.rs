use goboard_core::{BlobCandidate, ClassifyParams, StoneColor};
use image::{GrayImage, RgbImage};

use crate::sampling::disk_mean;

/// Share of the blob radius sampled for the brightness decision.
const SAMPLE_FRAC: f32 = 0.7;

/// Decide the stone color of a detected blob.
///
/// Mean luma strictly below `brightness_threshold` is black, anything else white.
///
/// Each call converts the whole image to luma. To classify many candidates
/// of one image, run [`process`](crate::process), which converts once.
pub fn classify(image: &RgbImage, candidate: &BlobCandidate, params: &ClassifyParams) -> StoneColor {
    if image.width() == 0 || image.height() == 0 {
        return StoneColor::White;
    }
    let gray = image::imageops::grayscale(image);
    classify_gray(&gray, candidate, params)
}

pub(crate) fn classify_gray(
    gray: &GrayImage,
    candidate: &BlobCandidate,
    params: &ClassifyParams,
) -> StoneColor {
    let mean = disk_mean(gray, candidate.center, SAMPLE_FRAC * candidate.radius)
        .unwrap_or(f32::from(u8::MAX));
    if mean < f32::from(params.brightness_threshold) {
        StoneColor::Black
    } else {
        StoneColor::White
    }
}
