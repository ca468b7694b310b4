use super::*;
use std::io::{Cursor, Read};

fn job_dir_with(files: &[(&str, &[u8])]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, bytes) in files {
        std::fs::write(dir.path().join(name), bytes).unwrap();
    }
    dir
}

#[test]
fn bundle_name_carries_the_date() {
    assert_eq!(bundle_filename("2026-03-01"), "AutoFrame__2026-03-01.zip");
}

#[test]
fn lists_only_outputs_in_name_order() {
    let dir = job_dir_with(&[
        ("b_1x1.mp4", b"bb"),
        ("a_9x16.MP4", b"aa"),
        ("batch_summary.json", b"{}"),
    ]);
    std::fs::create_dir(dir.path().join("nested.mp4")).unwrap();

    let names: Vec<String> = list_outputs(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a_9x16.MP4", "b_1x1.mp4"]);
}

#[test]
fn bundle_contains_every_output() {
    let dir = job_dir_with(&[("b_1x1.mp4", b"second"), ("a_9x16.mp4", b"first")]);
    let mut buf = Cursor::new(Vec::new());
    assert_eq!(write_bundle(dir.path(), &mut buf).unwrap(), 2);

    let mut archive = zip::ZipArchive::new(Cursor::new(buf.into_inner())).unwrap();
    assert_eq!(archive.len(), 2);
    let mut entry = archive.by_index(0).unwrap();
    assert_eq!(entry.name(), "a_9x16.mp4");
    let mut body = String::new();
    entry.read_to_string(&mut body).unwrap();
    assert_eq!(body, "first");
}

#[test]
fn empty_job_dir_is_an_error() {
    let dir = job_dir_with(&[("batch_summary.json", b"{}")]);
    let dest = dir.path().join("out").join("bundle.zip");
    let err = write_bundle_file(dir.path(), &dest).unwrap_err();
    assert!(matches!(err, AutoframeError::Validation(_)));
    assert!(!dest.exists());
}

#[test]
fn bundle_file_is_written() {
    let dir = job_dir_with(&[("a_9x16.mp4", b"x")]);
    let dest = dir.path().join("zips").join(bundle_filename("2026-01-02"));
    assert_eq!(write_bundle_file(dir.path(), &dest).unwrap(), 1);
    assert!(dest.is_file());
}
