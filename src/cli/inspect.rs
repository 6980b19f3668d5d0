use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use matjson::convert::{Converter, RenderOptions};
use matjson::mat::Mat5Reader;

/// Print the JSON rendering of one MAT-file
pub fn run(file: PathBuf, pretty: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let mat = Mat5Reader::new()
        .read_file(&file)
        .with_context(|| format!("Failed to read MAT file: {}", file.display()))?;
    info!(
        "{}: {} variables, {:?} endian",
        file.display(),
        mat.entries.len(),
        mat.header.endian
    );
    info!("Header: {}", mat.header.text);

    let converter = Converter::with_options(RenderOptions {
        pretty,
        ..Default::default()
    });
    println!("{}", converter.convert(&mat.entries));
    Ok(())
}
