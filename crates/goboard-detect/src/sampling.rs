use goboard_core::RecognitionError;
use image::{GrayImage, RgbImage};
use nalgebra::Point2;

/// Reject rasters with a zero dimension.
pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), RecognitionError> {
    if width == 0 || height == 0 {
        return Err(RecognitionError::InvalidImage { width, height });
    }
    Ok(())
}

/// Luma plane of an RGB image, after the dimension check.
pub(crate) fn luma(image: &RgbImage) -> Result<GrayImage, RecognitionError> {
    check_dimensions(image.width(), image.height())?;
    Ok(image::imageops::grayscale(image))
}

/// Median intensity of the whole plane.
pub(crate) fn median_luma(gray: &GrayImage) -> u8 {
    let mut hist = [0u64; 256];
    for p in gray.as_raw() {
        hist[*p as usize] += 1;
    }
    let half = (gray.as_raw().len() as u64).div_ceil(2);
    let mut acc = 0u64;
    for (v, &h) in hist.iter().enumerate() {
        acc += h;
        if acc >= half {
            return v as u8;
        }
    }
    255
}

/// Mean intensity of pixels whose distance to `center` lies in `[r0, r1]`.
///
/// Pixels outside the image are skipped. `None` when no pixel qualifies.
pub(crate) fn annulus_mean(gray: &GrayImage, center: Point2<f32>, r0: f32, r1: f32) -> Option<f32> {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 || r1 < r0 {
        return None;
    }
    let x0 = (center.x - r1).floor().max(0.0) as u32;
    let y0 = (center.y - r1).floor().max(0.0) as u32;
    let x1 = ((center.x + r1).ceil() as i64).clamp(0, w as i64 - 1) as u32;
    let y1 = ((center.y + r1).ceil() as i64).clamp(0, h as i64 - 1) as u32;

    let (r0_sq, r1_sq) = (r0 * r0, r1 * r1);
    let mut sum = 0u64;
    let mut count = 0u64;
    for y in y0..=y1 {
        let dy = y as f32 - center.y;
        for x in x0..=x1 {
            let dx = x as f32 - center.x;
            let d_sq = dx * dx + dy * dy;
            if d_sq >= r0_sq && d_sq <= r1_sq {
                sum += gray.get_pixel(x, y)[0] as u64;
                count += 1;
            }
        }
    }
    (count > 0).then(|| sum as f32 / count as f32)
}

/// Mean intensity inside a disk, falling back to the nearest pixel to the
/// center when the disk covers no pixel centers.
pub(crate) fn disk_mean(gray: &GrayImage, center: Point2<f32>, radius: f32) -> Option<f32> {
    if let Some(mean) = annulus_mean(gray, center, 0.0, radius.max(0.0)) {
        return Some(mean);
    }
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let x = (center.x.round() as i64).clamp(0, w as i64 - 1) as u32;
    let y = (center.y.round() as i64).clamp(0, h as i64 - 1) as u32;
    Some(gray.get_pixel(x, y)[0] as f32)
}
