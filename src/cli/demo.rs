use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use matjson::mat::{
    ArrayEntry, ArrayNode, CellArray, CharArray, FunctionHandle, Mat5Writer, Matrix,
    NumericClass, OpaqueObject, StructArray,
};

/// Write sample MAT-files into `dir`
pub fn run(dir: PathBuf) -> Result<()> {
    info!("matjson - Sample MAT-files");
    info!("==========================");

    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let plain = Mat5Writer::new();
    let compressed = Mat5Writer::new().with_compression(true);

    write_sample(&plain, &dir, "sensor_run.mat", &sensor_run())?;
    write_sample(&compressed, &dir, "sensor_run_compressed.mat", &sensor_run())?;
    write_sample(&plain, &dir, "objects.mat", &objects())?;
    write_sample(&plain, &dir, "empty_fields.mat", &empty_fields())?;

    // Truncated copy of a valid file: readable header, broken body
    let mut corrupt = plain
        .to_bytes(&sensor_run())
        .context("Failed to encode corrupt sample")?;
    corrupt.truncate(corrupt.len() / 2);
    let corrupt_path = dir.join("corrupt.mat");
    fs::write(&corrupt_path, corrupt)
        .with_context(|| format!("Failed to write {}", corrupt_path.display()))?;
    info!("  Wrote {} (corrupt)", corrupt_path.display());

    info!("Sample files written to {}", dir.display());
    info!("Try: matjson dirs {} <TMP> <TARGET>", dir.display());
    Ok(())
}

fn write_sample(
    writer: &Mat5Writer,
    dir: &Path,
    name: &str,
    entries: &[ArrayEntry],
) -> Result<()> {
    let path = dir.join(name);
    writer
        .write_file(&path, entries)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("  Wrote {} ({} variables)", path.display(), entries.len());
    Ok(())
}

/// A struct of acquisition settings next to raw sample data
fn sensor_run() -> Vec<ArrayEntry> {
    let samples: Vec<f64> = (0..64).map(|i| (i as f64 * 0.1).sin()).collect();
    let settings = StructArray::scalar(vec![
        ("rate_hz", ArrayNode::from(Matrix::scalar(1000.0))),
        ("channel", Matrix::scalar(3.0).with_class(NumericClass::UInt8).into()),
        ("label", CharArray::row("probe A").into()),
        ("enabled", Matrix::logical_scalar(true).into()),
        ("offset", Matrix::complex_scalar(0.0, -1.5).into()),
        ("samples", Matrix::new(vec![1, 64], samples.clone()).into()),
    ]);
    vec![
        ArrayEntry::new("settings", settings.into()),
        ArrayEntry::new("samples", Matrix::new(vec![64, 1], samples).into()),
    ]
}

/// Object, function handle and foreign object fields
fn objects() -> Vec<ArrayEntry> {
    let probe = StructArray::scalar(vec![
        ("id", ArrayNode::from(Matrix::scalar(7.0))),
        ("name", CharArray::row("north").into()),
    ])
    .with_class("sensors.Probe");
    let callback = FunctionHandle {
        dims: vec![1, 1],
        content: Box::new(
            StructArray::scalar(vec![("function", ArrayNode::from(CharArray::row("sin")))])
                .into(),
        ),
    };
    let file = OpaqueObject {
        dims: vec![1, 1],
        type_system: "java".to_string(),
        class_name: "java.io.File".to_string(),
    };
    let holder = StructArray::scalar(vec![
        ("probe", ArrayNode::from(probe)),
        ("callback", callback.into()),
        ("file", file.into()),
    ]);
    vec![ArrayEntry::new("setup", holder.into())]
}

/// Empty values of every kind, plus a multi-row char and a cell
fn empty_fields() -> Vec<ArrayEntry> {
    let record = StructArray::scalar(vec![
        ("none", ArrayNode::from(Matrix::empty())),
        (
            "nothing",
            CellArray {
                dims: vec![0, 0],
                elements: Vec::new(),
            }
            .into(),
        ),
        (
            "blank",
            CharArray {
                dims: vec![0, 0],
                text: String::new(),
            }
            .into(),
        ),
        (
            "grid",
            CharArray {
                dims: vec![2, 2],
                text: "abcd".to_string(),
            }
            .into(),
        ),
        (
            "items",
            CellArray {
                dims: vec![1, 2],
                elements: vec![Matrix::scalar(1.0).into(), CharArray::row("two").into()],
            }
            .into(),
        ),
    ]);
    vec![ArrayEntry::new("record", record.into())]
}
