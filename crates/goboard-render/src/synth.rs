use goboard_core::{BoardCoord, Geometry, Marker, StoneColor, CANONICAL_SPACING_PX};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use log::debug;
use nalgebra::Point2;

/// Board background.
pub const WOOD: Rgb<u8> = Rgb([220, 179, 92]);
/// Grid lines and star points.
pub const LINE: Rgb<u8> = Rgb([0, 0, 0]);
pub const BLACK_STONE: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE_STONE: Rgb<u8> = Rgb([255, 255, 255]);

/// Stone radius relative to the smaller grid spacing.
pub const STONE_RADIUS_FRAC: f32 = 0.45;

/// Canonical diagram geometry for a `board_size` board: 28 px spacing and a
/// 28 px margin on every side.
pub fn default_geometry(board_size: u32) -> Geometry {
    Geometry::canonical(board_size, CANONICAL_SPACING_PX, CANONICAL_SPACING_PX)
}

/// Ground-truth marker sitting exactly on an intersection.
pub fn placed_marker(coord: BoardCoord, color: StoneColor, geometry: &Geometry) -> Marker {
    Marker {
        position: geometry.intersection(coord),
        radius: stone_radius(geometry) as f32,
        color,
        coord,
        score: 1.0,
    }
}

fn stone_radius(geometry: &Geometry) -> i32 {
    ((STONE_RADIUS_FRAC * geometry.min_spacing()) as i32).max(1)
}

/// Star point coordinates for the canonical board sizes.
pub fn hoshi_points(board_size: u32) -> Vec<BoardCoord> {
    let edge = match board_size {
        9 => 2,
        13 | 19 => 3,
        _ => return Vec::new(),
    };
    let mid = board_size / 2;
    let lines = if board_size == 19 {
        vec![edge, mid, board_size - 1 - edge]
    } else {
        vec![edge, board_size - 1 - edge]
    };
    let mut points: Vec<BoardCoord> = lines
        .iter()
        .flat_map(|&r| lines.iter().map(move |&c| BoardCoord::new(c, r)))
        .collect();
    if board_size != 19 {
        points.push(BoardCoord::new(mid, mid));
    }
    points.sort_by_key(|p| (p.row, p.col));
    points
}

/// Render a canonical board diagram.
///
/// `None` selects the 19×19 default geometry. Stones are drawn at the pixel
/// position of their board coordinate, not at their detected position.
pub fn synthesize(geometry: Option<&Geometry>, black: &[Marker], white: &[Marker]) -> RgbImage {
    let fallback = Geometry::default();
    let g = geometry.unwrap_or(&fallback);

    let width = (g.bottom_right.x + g.top_left.x).round().max(1.0) as u32;
    let height = (g.bottom_right.y + g.top_left.y).round().max(1.0) as u32;
    let mut img = RgbImage::from_pixel(width, height, WOOD);

    let (x0, y0) = (g.top_left.x.round(), g.top_left.y.round());
    let (x1, y1) = (g.bottom_right.x.round(), g.bottom_right.y.round());
    for k in 0..g.board_size {
        let p = g.intersection(BoardCoord::new(k, k));
        let (px, py) = (p.x.round(), p.y.round());
        draw_line_segment_mut(&mut img, (px, y0), (px, y1), LINE);
        draw_line_segment_mut(&mut img, (x0, py), (x1, py), LINE);
    }

    let hoshi_r = ((g.min_spacing() / 9.0) as i32).max(2);
    for coord in hoshi_points(g.board_size) {
        draw_filled_circle_mut(&mut img, pixel(g.intersection(coord)), hoshi_r, LINE);
    }

    let r = stone_radius(g);
    for (markers, color) in [(black, BLACK_STONE), (white, WHITE_STONE)] {
        for m in markers {
            draw_filled_circle_mut(&mut img, pixel(g.intersection(m.coord)), r, color);
        }
    }
    debug!(
        "synthesized {}x{} diagram ({}x{} px): {} black, {} white",
        g.board_size,
        g.board_size,
        width,
        height,
        black.len(),
        white.len()
    );
    img
}

fn pixel(p: Point2<f32>) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}
