//! Integration tests for matjson
//!
//! These tests write real MAT-files, run the whole pipeline over them and
//! check the resulting directory layout and JSON.

use matjson::mat::{ArrayEntry, ArrayNode, CharArray, Mat5Writer, Matrix, StructArray};
use matjson::pipeline::{run, CollisionPolicy, PipelineSettings, ProgressStatus, WorkLayout};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn sample_entries(index: usize) -> Vec<ArrayEntry> {
    let data = StructArray::scalar(vec![
        ("x", ArrayNode::from(Matrix::scalar(3.5))),
        ("index", Matrix::scalar(index as f64).into()),
        ("label", CharArray::row("sample").into()),
    ]);
    vec![ArrayEntry::new("data", data.into())]
}

fn write_mat(dir: &Path, name: &str, index: usize) -> PathBuf {
    let path = dir.join(name);
    Mat5Writer::new()
        .with_compression(index % 2 == 1)
        .write_file(&path, &sample_entries(index))
        .unwrap();
    path
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

/// 120 files in batches of 50, one of them corrupt
#[test]
fn test_directory_run_with_corrupt_file() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in");
    fs::create_dir_all(&source).unwrap();
    for i in 0..119 {
        write_mat(&source, &format!("run{:03}.mat", i), i);
    }
    fs::write(source.join("corrupt.mat"), b"MATLAB 5.0 MAT-file, truncated").unwrap();

    let layout = WorkLayout::under(dir.path());
    let settings = PipelineSettings::new(&source, layout.clone()).with_batch_size(50);
    let summary = run(&settings).unwrap();

    assert_eq!(summary.len(), 120);
    assert_eq!(summary.count(ProgressStatus::Successful), 119);
    assert_eq!(summary.count(ProgressStatus::MovedToError), 1);
    assert_eq!(summary.failures(), 1);

    let corrupt = fs::canonicalize(&source).unwrap().join("corrupt.mat");
    assert_eq!(
        summary.status(&corrupt.display().to_string()),
        Some("Moved to tmp")
    );

    assert_eq!(count_files(&source), 0);
    assert_eq!(count_files(&layout.target_dir), 119);
    assert_eq!(count_files(&layout.processed_dir()), 119);
    assert!(layout.error_dir().join("corrupt.mat").exists());
    assert!(!layout.target_dir.join("corrupt.json").exists());
}

#[test]
fn test_json_content() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in");
    fs::create_dir_all(&source).unwrap();
    write_mat(&source, "run.v2.mat", 4);

    let layout = WorkLayout::under(dir.path());
    run(&PipelineSettings::new(&source, layout.clone())).unwrap();

    let json = fs::read_to_string(layout.target_dir.join("run.v2.json")).unwrap();
    assert_eq!(
        json,
        r#"[{"data":{"type":"1x1 struct","x":3.5,"index":4.0,"label":"sample"}}]"#
    );
}

#[test]
fn test_rerun_finds_nothing() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in");
    fs::create_dir_all(&source).unwrap();
    for i in 0..3 {
        write_mat(&source, &format!("f{}.mat", i), i);
    }
    let settings = PipelineSettings::new(&source, WorkLayout::under(dir.path()));

    assert_eq!(run(&settings).unwrap().len(), 3);
    assert!(run(&settings).unwrap().is_empty());
}

#[test]
fn test_single_file_source() {
    let dir = tempdir().unwrap();
    let file = write_mat(dir.path(), "only.mat", 0);
    let layout = WorkLayout::new(dir.path().join("scratch"), dir.path().join("json"));

    let summary = run(&PipelineSettings::new(&file, layout.clone())).unwrap();

    assert_eq!(summary.len(), 1);
    assert_eq!(summary.count(ProgressStatus::Successful), 1);
    assert!(layout.target_dir.join("only.json").exists());
    assert!(layout.processed_dir().join("only.mat").exists());
}

#[test]
fn test_empty_source_directory() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("in");
    fs::create_dir_all(&source).unwrap();
    let layout = WorkLayout::under(dir.path());

    let summary = run(&PipelineSettings::new(&source, layout.clone())).unwrap();

    assert!(summary.is_empty());
    assert!(layout.tmp_dir.is_dir());
    assert!(layout.target_dir.is_dir());
}

#[test]
fn test_policies_agree_without_collisions() {
    for policy in [
        CollisionPolicy::LastWriteWins,
        CollisionPolicy::Concatenate,
        CollisionPolicy::Fail,
    ] {
        let dir = tempdir().unwrap();
        let source = dir.path().join("in");
        fs::create_dir_all(&source).unwrap();
        for i in 0..7 {
            write_mat(&source, &format!("f{}.mat", i), i);
        }
        let settings = PipelineSettings::new(&source, WorkLayout::under(dir.path()))
            .with_batch_size(2)
            .with_workers(2)
            .with_collision_policy(policy);

        let summary = run(&settings).unwrap();
        assert_eq!(summary.len(), 7);
        assert!(summary.entries().all(|(_, status)| status == "Successfully"));
    }
}
