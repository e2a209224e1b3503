use approx::assert_abs_diff_eq;
use goboard_core::{BoardCoord, Geometry, Marker, ParameterSet, StoneColor};
use goboard_detect::{
    detect_geometry, detect_markers, invocation_key, process, process_default, DebugImageKind,
    ProcessOptions,
};
use goboard_render::{default_geometry, placed_marker, synthesize};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

fn stones(coords: &[(u32, u32)], color: StoneColor, geometry: &Geometry) -> Vec<Marker> {
    coords
        .iter()
        .map(|&(c, r)| placed_marker(BoardCoord::new(c, r), color, geometry))
        .collect()
}

fn coords(markers: &[Marker]) -> Vec<(u32, u32)> {
    markers.iter().map(|m| (m.coord.col, m.coord.row)).collect()
}

/// 64-bit LCG; board fills stay reproducible without a random crate.
struct Lcg(u64);

impl Lcg {
    fn next_percent(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % 100
    }
}

/// Row-major random position: each intersection is black with `pct`%
/// probability, white with `pct`%, empty otherwise.
fn random_position(size: u32, seed: u64, pct: u64) -> (Vec<(u32, u32)>, Vec<(u32, u32)>) {
    let mut rng = Lcg(seed);
    let (mut black, mut white) = (Vec::new(), Vec::new());
    for row in 0..size {
        for col in 0..size {
            let v = rng.next_percent();
            if v < pct {
                black.push((col, row));
            } else if v < 2 * pct {
                white.push((col, row));
            }
        }
    }
    (black, white)
}

fn four_corner_board() -> RgbImage {
    let g = default_geometry(19);
    let black = stones(&[(3, 3), (15, 15)], StoneColor::Black, &g);
    let white = stones(&[(3, 15), (15, 3)], StoneColor::White, &g);
    synthesize(Some(&g), &black, &white)
}

#[test]
fn recognizes_a_synthesized_19x19_board() {
    let img = four_corner_board();
    let res = process_default(&img, &ParameterSet::defaults()).expect("recognition");

    assert_eq!(res.geometry.board_size, 19);
    assert_eq!(res.geometry.crossings, [18, 18]);
    assert_abs_diff_eq!(res.geometry.spacing.x, 28.0, epsilon = 0.5);
    assert_abs_diff_eq!(res.geometry.spacing.y, 28.0, epsilon = 0.5);
    assert_abs_diff_eq!(res.geometry.top_left.x, 28.0, epsilon = 1.0);
    assert_abs_diff_eq!(res.geometry.bottom_right.y, 532.0, epsilon = 1.0);

    assert_eq!(coords(&res.black), vec![(3, 3), (15, 15)]);
    assert_eq!(coords(&res.white), vec![(15, 3), (3, 15)]);
    for m in res.black.iter().chain(&res.white) {
        assert!(m.radius > 0.0);
        assert!(m.coord.fits(res.geometry.board_size));
    }
    assert!(res.debug.is_empty());
}

#[test]
fn image_result_image_round_trip() {
    let g = default_geometry(19);
    let black = stones(&[(3, 3), (9, 9), (16, 2)], StoneColor::Black, &g);
    let white = stones(&[(2, 16), (10, 4)], StoneColor::White, &g);
    let img = synthesize(Some(&g), &black, &white);

    let res = process_default(&img, &ParameterSet::defaults()).expect("recognition");
    let redrawn = synthesize(None, &res.black, &res.white);
    assert_eq!(redrawn, img);
}

#[test]
fn densely_filled_boards_round_trip() {
    for (size, seed, pct) in [(9u32, 1u64, 20u64), (9, 4, 15), (13, 2, 30), (19, 3, 35), (19, 5, 25)] {
        let g = default_geometry(size);
        let (b, w) = random_position(size, seed, pct);
        let img = synthesize(
            Some(&g),
            &stones(&b, StoneColor::Black, &g),
            &stones(&w, StoneColor::White, &g),
        );

        let res = process_default(&img, &ParameterSet::defaults())
            .unwrap_or_else(|e| panic!("size {size} seed {seed}: {e}"));
        let case = format!("size {size} seed {seed} ({} black, {} white)", b.len(), w.len());
        assert_eq!(res.geometry.board_size, size, "{case}");
        assert_eq!(res.geometry.crossings, [size - 1, size - 1], "{case}");
        assert_abs_diff_eq!(res.geometry.top_left.x, 28.0, epsilon = 1.0);
        assert_abs_diff_eq!(res.geometry.top_left.y, 28.0, epsilon = 1.0);
        assert_eq!(coords(&res.black), b, "{case}");
        assert_eq!(coords(&res.white), w, "{case}");
    }
}

#[test]
fn smaller_boards_are_recognized() {
    for size in [9u32, 13] {
        let g = default_geometry(size);
        let black = stones(&[(2, 2)], StoneColor::Black, &g);
        let white = stones(&[(size - 3, size - 3)], StoneColor::White, &g);
        let img = synthesize(Some(&g), &black, &white);

        let res = process_default(&img, &ParameterSet::defaults()).expect("recognition");
        assert_eq!(res.geometry.board_size, size);
        assert_eq!(coords(&res.black), vec![(2, 2)]);
        assert_eq!(coords(&res.white), vec![(size - 3, size - 3)]);
    }
}

#[test]
fn processing_is_deterministic() {
    let img = four_corner_board();
    let params = ParameterSet::defaults();
    let opts = ProcessOptions::with_all_debug();
    let a = process(&img, &params, &opts).expect("first");
    let b = process(&img, &params, &opts).expect("second");
    assert_eq!(a, b);
    assert_eq!(invocation_key(&img, &params), invocation_key(&img, &params));
}

#[test]
fn empty_board_has_geometry_and_no_stones() {
    let img = synthesize(None, &[], &[]);
    let res = process_default(&img, &ParameterSet::defaults()).expect("recognition");
    assert_eq!(res.geometry.board_size, 19);
    assert_eq!(res.stone_count(), 0);
}

#[test]
fn requested_debug_images_are_returned() {
    let img = four_corner_board();
    let opts = ProcessOptions {
        debug: [DebugImageKind::EdgeMap, DebugImageKind::BrightMask].into_iter().collect(),
    };
    let res = process(&img, &ParameterSet::defaults(), &opts).expect("recognition");
    assert_eq!(res.debug.len(), 2);
    let bright = &res.debug[&DebugImageKind::BrightMask];
    assert_eq!(bright.dimensions(), img.dimensions());
    // White stone at (15, 3) lies at pixel (448, 112).
    assert_eq!(bright.get_pixel(448, 112)[0], 255);
    assert_eq!(bright.get_pixel(112, 112)[0], 0);
}

#[test]
fn blobs_outside_the_grid_are_dropped() {
    let g = Geometry::canonical(19, 28.0, 60.0);
    let white = stones(&[(4, 4)], StoneColor::White, &g);
    let mut img = synthesize(Some(&g), &[], &white);
    draw_filled_circle_mut(&mut img, (18, 300), 10, Rgb([0, 0, 0]));

    let blobs = detect_markers(&img, &goboard_core::DetectorParams::default().blobs).expect("blobs");
    assert_eq!(blobs.len(), 2);

    let res = process_default(&img, &ParameterSet::defaults()).expect("recognition");
    assert!(res.black.is_empty());
    assert_eq!(coords(&res.white), vec![(4, 4)]);
}

#[test]
fn lookup_finds_the_stone_under_the_cursor() {
    let img = four_corner_board();
    let res = process_default(&img, &ParameterSet::defaults()).expect("recognition");
    let hit = res.marker_at(450.0, 110.0).expect("white stone at (15, 3)");
    assert_eq!(hit.color, StoneColor::White);
    assert_eq!(hit.coord, BoardCoord::new(15, 3));
    assert!(res.marker_at(280.0, 200.0).is_none());
}

#[test]
fn geometry_alone_matches_the_pipeline() {
    let img = four_corner_board();
    let params = ParameterSet::defaults();
    let g = detect_geometry(&img, &goboard_core::DetectorParams::from(&params).grid).expect("grid");
    let res = process_default(&img, &params).expect("recognition");
    assert_eq!(g, res.geometry);
}
