#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;

fn goboard() -> Command {
    Command::cargo_bin("goboard").expect("goboard binary")
}

#[test]
fn synthesize_then_process() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("board1.png");

    goboard()
        .args(["synthesize", "--out"])
        .arg(&image)
        .args(["--black", "D16,Q4", "--white", "D4"])
        .assert()
        .success();
    assert!(image.is_file());

    let render = dir.path().join("render.png");
    let debug_dir = dir.path().join("debug");
    goboard()
        .args(["--log-level", "warn", "process", "--image"])
        .arg(&image)
        .args(["--export", "--save-params", "--boxes", "--render"])
        .arg(&render)
        .arg("--debug-dir")
        .arg(&debug_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("board 19x19: 2 black, 1 white"))
        .stdout(predicate::str::contains("black: D16 Q4"))
        .stdout(predicate::str::contains("white: D4"));

    assert!(dir.path().join("board1.jgf").is_file());
    assert!(dir.path().join("board1.json").is_file());
    assert!(render.is_file());
    for kind in ["edge-map", "dark-mask", "bright-mask"] {
        assert!(debug_dir.join(format!("board1.{kind}.png")).is_file(), "{kind}");
    }

    goboard()
        .args(["status", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("board1.png"))
        .stdout(predicate::str::contains("render.png"));
}

#[test]
fn invalid_stone_label_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    goboard()
        .args(["synthesize", "--size", "9", "--black", "Z1", "--out"])
        .arg(dir.path().join("x.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid black stone"));
}

#[test]
fn blank_image_reports_missing_grid() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("blank.png");
    image::RgbImage::from_pixel(64, 64, image::Rgb([220, 179, 92]))
        .save(&image)
        .expect("save");
    goboard()
        .args(["process", "--image"])
        .arg(&image)
        .assert()
        .failure();
}

#[test]
fn reject_policy_refuses_out_of_range_params() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("b.png");
    goboard()
        .args(["synthesize", "--size", "9", "--out"])
        .arg(&image)
        .assert()
        .success();
    let params = dir.path().join("p.json");
    std::fs::write(&params, r#"{"edge_threshold": 0}"#).expect("write params");

    goboard()
        .args(["process", "--reject", "--image"])
        .arg(&image)
        .arg("--params")
        .arg(&params)
        .assert()
        .failure()
        .stderr(predicate::str::contains("edge_threshold"));

    goboard()
        .args(["process", "--image"])
        .arg(&image)
        .arg("--params")
        .arg(&params)
        .assert()
        .success()
        .stdout(predicate::str::contains("board 9x9"));
}
