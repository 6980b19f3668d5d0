use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use matjson::pipeline::{self, CollisionPolicy, PipelineSettings, RunSummary, WorkLayout};

use super::config::{Config, PipelineConfig};

/// Convert using a TOML config file
pub fn run_config(config_path: PathBuf) -> Result<()> {
    info!("Loading configuration from {}", config_path.display());
    let settings = Config::from_file(&config_path)?.into_settings()?;
    convert(settings)
}

/// Convert using explicit directories
pub fn run_dirs(
    source: PathBuf,
    tmp: PathBuf,
    target: PathBuf,
    batch_size: Option<usize>,
    workers: Option<usize>,
    collision_policy: Option<CollisionPolicy>,
) -> Result<()> {
    let overrides = PipelineConfig {
        batch_size,
        workers,
        collision_policy,
        foreign_tag: None,
    };
    let settings = overrides.apply(PipelineSettings::new(source, WorkLayout::new(tmp, target)));
    convert(settings)
}

fn convert(settings: PipelineSettings) -> Result<()> {
    info!("matjson - MAT-file to JSON");
    info!("==========================");
    info!("Source:     {}", settings.source.display());
    info!("Tmp:        {}", settings.layout.tmp_dir.display());
    info!("Target:     {}", settings.layout.target_dir.display());
    info!("Batch size: {}", settings.batch_size);
    info!("Workers:    {}", settings.workers);

    let summary = pipeline::run(&settings).context("Conversion failed")?;
    summary.log();
    print_summary(&summary);
    Ok(())
}

#[cfg(feature = "colorized_output")]
fn print_summary(summary: &RunSummary) {
    use console::style;
    use matjson::pipeline::{ProgressStatus, RESULT_BANNER};

    println!("{}", style(RESULT_BANNER).bold().cyan());
    for (path, status) in summary.entries() {
        let status = if status == ProgressStatus::Successful.label() {
            style(status).green()
        } else {
            style(status).red()
        };
        println!(
            "{}: {} | {}: {}",
            style("File").bold(),
            path,
            style("Status").bold(),
            status
        );
    }
    println!(
        "\n{}: {} files, {} successful, {} failed",
        style("Summary").bold(),
        summary.len(),
        style(summary.count(ProgressStatus::Successful)).green(),
        style(summary.failures()).red()
    );
}

#[cfg(not(feature = "colorized_output"))]
fn print_summary(summary: &RunSummary) {
    print!("{}", summary);
}
