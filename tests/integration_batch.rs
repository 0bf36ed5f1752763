//! Batch processing tests
//!
//! Runs discovery and the worker pool over real directories.

mod common;

use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use assert_matches::assert_matches;
use common::*;
use serde_json::json;
use tempfile::tempdir;
use tileforged::batch::{BatchOptions, BatchRunner, BatchSummary, FileStatus};
use tileforged::config::DiscoveryConfig;
use tileforged::discovery::discover;
use tileforged::optimize::PassReason;
use tileforged::Error;
use tileforged_format::Error as FormatError;

fn options(workers: usize) -> BatchOptions {
    BatchOptions {
        settings: small_settings(),
        workers: Some(workers),
    }
}

fn run(input: &Path, output: Option<&Path>, workers: usize) -> BatchSummary {
    let found = discover(input, &DiscoveryConfig::default(), None);
    if let Some(out) = output {
        found.mirror_into(out).unwrap();
    }
    BatchRunner::new(options(workers), Arc::new(AtomicBool::new(false)))
        .run(found.jobs(output))
        .unwrap()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_one_bad_file_does_not_stop_the_batch() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tiles");
    let output = dir.path().join("out");

    for i in 0..10 {
        let image = if i == 4 {
            garbage_image()
        } else {
            jpeg_seeded(160, 120, i)
        };
        write_file(&input, &format!("{:02}.b3dm", i), &tile(&[(image, "image/jpeg")]));
    }

    let summary = run(&input, Some(&output), 3);

    assert_eq!(summary.total(), 10);
    assert_eq!(summary.optimized, 9);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.passed_through, 0);
    assert!(summary.new_bytes < summary.original_bytes);

    let failed: Vec<_> = summary
        .reports
        .iter()
        .filter(|r| matches!(r.status, FileStatus::Failed(_)))
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].path, Path::new("04.b3dm"));
    assert!(failed[0].status_text().starts_with("error: image 0"));
    assert_eq!((failed[0].original_size, failed[0].new_size), (0, 0));

    // Every file has an output; the failed one is an exact copy
    assert_eq!(file_names(&output).len(), 10);
    assert_eq!(
        fs::read(output.join("04.b3dm")).unwrap(),
        fs::read(input.join("04.b3dm")).unwrap()
    );
    for report in summary.reports.iter().filter(|r| r.is_optimized()) {
        let data = fs::read(output.join(&report.path)).unwrap();
        assert_eq!(data.len() as u64, report.new_size);
        assert_valid_tile(&data);
    }
}

#[test]
fn test_mirror_mode_copies_layout_and_descriptors() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tiles");
    let output = dir.path().join("out");

    let plain = tile_without_images();
    write_file(&input, "tileset.json", b"{\"asset\":{\"version\":\"1.0\"}}");
    write_file(&input, "0/0.b3dm", &tile(&[(jpeg(200, 200), "image/jpeg")]));
    write_file(&input, "0/1/plain.b3dm", &plain);
    write_file(&input, "0/1/child.json", b"{}");

    let summary = run(&input, Some(&output), 2);

    assert_eq!(summary.optimized, 1);
    assert_eq!(summary.passed_through, 1);
    let pass = summary
        .reports
        .iter()
        .find(|r| r.path == Path::new("0/1/plain.b3dm"))
        .unwrap();
    assert_matches!(pass.status, FileStatus::PassedThrough(PassReason::NoImages));
    assert_eq!(pass.status_text(), "no images");

    assert_eq!(
        fs::read(output.join("tileset.json")).unwrap(),
        b"{\"asset\":{\"version\":\"1.0\"}}"
    );
    assert_eq!(fs::read(output.join("0/1/child.json")).unwrap(), b"{}");
    assert_eq!(fs::read(output.join("0/1/plain.b3dm")).unwrap(), plain);
    assert_valid_tile(&fs::read(output.join("0/0.b3dm")).unwrap());

    // Input is left alone in mirror mode
    assert!(fs::read(input.join("0/0.b3dm")).unwrap().len() > fs::read(output.join("0/0.b3dm")).unwrap().len());
}

#[test]
fn test_in_place_leaves_no_temporary_files() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tiles");

    let originals: Vec<Vec<u8>> = (0..4)
        .map(|i| tile(&[(jpeg_seeded(200, 150, i), "image/jpeg")]))
        .collect();
    for (i, data) in originals.iter().enumerate() {
        write_file(&input, &format!("{}.b3dm", i), data);
    }
    write_file(&input, "bad.b3dm", b"b3dm but truncated");

    let summary = run(&input, None, 4);

    assert_eq!(summary.optimized, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        file_names(&input),
        vec!["0.b3dm", "1.b3dm", "2.b3dm", "3.b3dm", "bad.b3dm"]
    );
    for (i, original) in originals.iter().enumerate() {
        let rewritten = fs::read(input.join(format!("{}.b3dm", i))).unwrap();
        assert!(rewritten.len() < original.len());
        assert_valid_tile(&rewritten);
    }
    assert_eq!(fs::read(input.join("bad.b3dm")).unwrap(), b"b3dm but truncated");
}

#[test]
fn test_single_worker_matches_many() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tiles");
    for i in 0..3 {
        write_file(
            &input,
            &format!("{}.b3dm", i),
            &tile(&[(jpeg_seeded(128, 96, i), "image/jpeg")]),
        );
    }

    let serial = run(&input, Some(&dir.path().join("serial")), 1);
    let parallel = run(&input, Some(&dir.path().join("parallel")), 3);

    assert_eq!(serial.optimized, 3);
    assert_eq!(serial.new_bytes, parallel.new_bytes);
    for name in file_names(&input) {
        assert_eq!(
            fs::read(dir.path().join("serial").join(&name)).unwrap(),
            fs::read(dir.path().join("parallel").join(&name)).unwrap()
        );
    }
}

#[test]
#[cfg(target_pointer_width = "64")]
fn test_overflowing_view_fails_and_keeps_original() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tiles");
    let output = dir.path().join("out");

    let hostile = build_tile(
        json!({
            "asset": {"version": "2.0"},
            "buffers": [{"byteLength": 16}],
            "bufferViews": [{"buffer": 0, "byteOffset": 18446744073709551612u64, "byteLength": 8}],
            "images": [{"bufferView": 0, "mimeType": "image/jpeg"}],
        }),
        vec![0; 16],
    );
    write_file(&input, "hostile.b3dm", &hostile);
    write_file(&input, "fine.b3dm", &tile(&[(jpeg(64, 64), "image/jpeg")]));

    let summary = run(&input, Some(&output), 2);

    assert_eq!(summary.total(), 2);
    assert_eq!(summary.failed, 1);
    let report = summary
        .reports
        .iter()
        .find(|r| r.path == Path::new("hostile.b3dm"))
        .unwrap();
    assert_matches!(
        report.status,
        FileStatus::Failed(Error::Format(FormatError::ViewOutOfBounds { index: 0, .. }))
    );
    assert_eq!(fs::read(output.join("hostile.b3dm")).unwrap(), hostile);
    assert!(output.join("fine.b3dm").exists());
}
