use goboard_core::Marker;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_circle_mut;

/// Outline color of detection overlays.
pub const DETECTION: Rgb<u8> = Rgb([255, 0, 0]);

/// Copy of `image` with a one pixel outline around every detection.
pub fn draw_detections(image: &RgbImage, markers: &[Marker]) -> RgbImage {
    let mut out = image.clone();
    for m in markers {
        let center = (m.position.x.round() as i32, m.position.y.round() as i32);
        let radius = (m.radius.round() as i32).max(1);
        draw_hollow_circle_mut(&mut out, center, radius, DETECTION);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use goboard_core::{BoardCoord, StoneColor};
    use nalgebra::Point2;

    #[test]
    fn outlines_detections_without_touching_the_input() {
        let img = RgbImage::from_pixel(40, 40, Rgb([200, 200, 200]));
        let m = Marker {
            position: Point2::new(20.0, 20.0),
            radius: 8.0,
            color: StoneColor::White,
            coord: BoardCoord::new(0, 0),
            score: 1.0,
        };
        let out = draw_detections(&img, &[m]);
        assert_eq!(*out.get_pixel(28, 20), DETECTION);
        assert_eq!(*out.get_pixel(20, 20), Rgb([200, 200, 200]));
        assert_eq!(*img.get_pixel(28, 20), Rgb([200, 200, 200]));
    }
}
