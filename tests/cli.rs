// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use assert_cmd::prelude::*;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn sample_png(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join("sample.png");
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / 3 + y / 2) % 2 == 0 {
            Rgba([220, 40, 40, 255])
        } else {
            Rgba([20, 20, 200, 255])
        }
    })
    .save(&path)
    .unwrap();
    path
}

fn dimensions_of(path: &Path) -> (u32, u32) {
    image::open(path).unwrap().to_rgba().dimensions()
}

fn seamcarve() -> Command {
    Command::cargo_bin("seamcarve").unwrap()
}

#[test]
fn shrinks_to_the_requested_size() {
    let dir = TempDir::new().unwrap();
    let input = sample_png(dir.path(), 12, 8);
    let output = dir.path().join("out.png");

    seamcarve()
        .arg(&input)
        .arg(&output)
        .args(&["--width", "9", "--height", "6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("12x8 -> 9x6"));

    assert_eq!(dimensions_of(&output), (9, 6));
}

#[test]
fn percent_scales_both_sides() {
    let dir = TempDir::new().unwrap();
    let input = sample_png(dir.path(), 12, 8);
    let output = dir.path().join("half.png");

    seamcarve()
        .arg(&input)
        .arg(&output)
        .args(&["--percent", "50"])
        .assert()
        .success();

    assert_eq!(dimensions_of(&output), (6, 4));
}

#[test]
fn keep_aspect_follows_the_width() {
    let dir = TempDir::new().unwrap();
    let input = sample_png(dir.path(), 12, 8);
    let output = dir.path().join("aspect.png");

    seamcarve()
        .arg(&input)
        .arg(&output)
        .args(&["-w", "6", "--keep-aspect"])
        .assert()
        .success();

    assert_eq!(dimensions_of(&output), (6, 4));
}

#[test]
fn writes_timeline_frames_and_energy() {
    let dir = TempDir::new().unwrap();
    let input = sample_png(dir.path(), 10, 6);
    let output = dir.path().join("out.png");
    let frames = dir.path().join("frames");
    let energy = dir.path().join("energy.png");

    seamcarve()
        .arg(&input)
        .arg(&output)
        .args(&["--width", "4"])
        .arg("--frames")
        .arg(&frames)
        .arg("--energy")
        .arg(&energy)
        .assert()
        .success();

    // The original, six seams, and the final image.
    let mut names: Vec<String> = std::fs::read_dir(&frames)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 8);
    assert_eq!(names[0], "frame-000.png");
    assert_eq!(dimensions_of(&frames.join("frame-000.png")), (10, 6));
    assert_eq!(dimensions_of(&frames.join("frame-007.png")), (4, 6));
    assert_eq!(dimensions_of(&energy), (10, 6));
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    seamcarve()
        .arg(dir.path().join("nope.png"))
        .arg(dir.path().join("out.png"))
        .assert()
        .failure();
}

#[test]
fn garbage_numbers_fail() {
    let dir = TempDir::new().unwrap();
    let input = sample_png(dir.path(), 4, 4);
    seamcarve()
        .arg(&input)
        .arg(dir.path().join("out.png"))
        .args(&["--width", "wide"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--width"));
}
