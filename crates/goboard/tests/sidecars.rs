use goboard::core::params::{BLOB_MIN_CONTRAST, EDGE_THRESHOLD};
use goboard::io::{board_path_for, load_image, load_params, params_path_for, save_params, BoardRecord};
use goboard::render::{default_geometry, placed_marker};
use goboard::{process_default, synthesize, BoardCoord, ParameterSet, StoneColor, ValidationPolicy};

fn write_board(path: &std::path::Path) {
    let g = default_geometry(19);
    let black = [placed_marker(BoardCoord::new(3, 3), StoneColor::Black, &g)];
    let white = [placed_marker(BoardCoord::new(15, 15), StoneColor::White, &g)];
    synthesize(Some(&g), &black, &white)
        .save(path)
        .expect("save png");
}

#[test]
fn saved_parameters_reproduce_the_result() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image_path = dir.path().join("game7.png");
    write_board(&image_path);

    let params = ParameterSet::defaults()
        .with(EDGE_THRESHOLD, 35, ValidationPolicy::Reject)
        .and_then(|p| p.with(BLOB_MIN_CONTRAST, 20, ValidationPolicy::Reject))
        .expect("valid params");
    let img = load_image(&image_path).expect("load image");
    let first = process_default(&img, &params).expect("first run");

    let sidecar = params_path_for(&image_path);
    save_params(&sidecar, &params).expect("save params");
    let reloaded = load_params(&sidecar, ValidationPolicy::Reject).expect("load params");
    assert_eq!(reloaded, params);

    let second = process_default(&load_image(&image_path).expect("reload"), &reloaded).expect("second run");
    assert_eq!(first, second);
}

#[test]
fn exported_board_record_matches_the_result() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image_path = dir.path().join("game8.png");
    write_board(&image_path);

    let img = load_image(&image_path).expect("load image");
    let result = process_default(&img, &ParameterSet::defaults()).expect("recognition");
    let record = BoardRecord::from_result(&result, Some(image_path.as_path()));

    let path = board_path_for(&image_path);
    record.write_json(&path).expect("write record");
    let loaded = BoardRecord::load_json(&path).expect("load record");

    assert_eq!(loaded, record);
    assert_eq!(loaded.board_size, 19);
    let labels: Vec<&str> = loaded.stones(StoneColor::Black).iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, ["D16"]);
    assert_eq!(loaded.white[0].label, "Q4");
    assert_eq!((loaded.white[0].col, loaded.white[0].row), (15, 15));
    approx::assert_abs_diff_eq!(loaded.white[0].x, 448.0, epsilon = 1.0);
}
