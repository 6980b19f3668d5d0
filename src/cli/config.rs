//! TOML configuration file for the `run` command.
//!
//! ```toml
//! # matjson.toml
//! [paths]
//! source_dir = "/data/in"
//! target_dir = "/data/out"
//!
//! [pipeline]
//! batch_size = 50
//! workers = 3
//! collision_policy = "last-write-wins"
//! foreign_tag = "Java"
//! ```
//!
//! `target_dir` receives a `tmp` folder for relocated sources and a `result`
//! folder for the JSON files.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use matjson::convert::RenderOptions;
use matjson::pipeline::{CollisionPolicy, PipelineSettings, WorkLayout};

/// Root configuration structure for matjson.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Scheduling and rendering settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Input and output locations.
#[derive(Debug, Default, Deserialize)]
pub struct PathsConfig {
    /// Directory of MAT-files, or a single file.
    pub source_dir: Option<PathBuf>,

    /// Root of the `tmp` and `result` directories.
    pub target_dir: Option<PathBuf>,
}

/// Scheduling and rendering settings.
#[derive(Debug, Default, Deserialize)]
pub struct PipelineConfig {
    /// Files per batch.
    pub batch_size: Option<usize>,

    /// Worker threads.
    pub workers: Option<usize>,

    /// Handling of files reported by more than one batch.
    pub collision_policy: Option<CollisionPolicy>,

    /// Tag appended to foreign objects.
    pub foreign_tag: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Build pipeline settings; both paths are required.
    pub fn into_settings(self) -> Result<PipelineSettings> {
        let source = self
            .paths
            .source_dir
            .context("Missing [paths] source_dir in configuration")?;
        let target = self
            .paths
            .target_dir
            .context("Missing [paths] target_dir in configuration")?;

        let settings = PipelineSettings::new(source, WorkLayout::under(&target));
        Ok(self.pipeline.apply(settings))
    }
}

impl PipelineConfig {
    /// Overlay the values that are set onto `settings`.
    pub fn apply(self, mut settings: PipelineSettings) -> PipelineSettings {
        if let Some(batch_size) = self.batch_size {
            settings = settings.with_batch_size(batch_size);
        }
        if let Some(workers) = self.workers {
            settings = settings.with_workers(workers);
        }
        if let Some(policy) = self.collision_policy {
            settings = settings.with_collision_policy(policy);
        }
        if let Some(foreign_tag) = self.foreign_tag {
            let render = RenderOptions {
                foreign_tag,
                ..settings.render.clone()
            };
            settings = settings.with_render_options(render);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matjson::pipeline::DEFAULT_BATCH_SIZE;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [paths]
            source_dir = "/data/in"
            target_dir = "/data/out"

            [pipeline]
            batch_size = 20
            workers = 4
            collision_policy = "concatenate"
            foreign_tag = "JVM"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.paths.source_dir, Some(PathBuf::from("/data/in")));
        assert_eq!(config.pipeline.batch_size, Some(20));
        assert_eq!(
            config.pipeline.collision_policy,
            Some(CollisionPolicy::Concatenate)
        );

        let settings = config.into_settings().unwrap();
        assert_eq!(settings.source, PathBuf::from("/data/in"));
        assert_eq!(settings.layout.tmp_dir, PathBuf::from("/data/out/tmp"));
        assert_eq!(settings.layout.target_dir, PathBuf::from("/data/out/result"));
        assert_eq!(settings.batch_size, 20);
        assert_eq!(settings.workers, 4);
        assert_eq!(settings.render.foreign_tag, "JVM");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [paths]
            source_dir = "in"
            target_dir = "out"
        "#;

        let settings = Config::from_str(toml).unwrap().into_settings().unwrap();
        assert_eq!(settings.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(settings.collision_policy, CollisionPolicy::LastWriteWins);
        assert_eq!(settings.render.foreign_tag, "Java");
        assert!(settings.workers >= 1);
    }

    #[test]
    fn test_missing_paths() {
        let config = Config::from_str("").unwrap();
        assert!(config.paths.source_dir.is_none());
        assert!(config.into_settings().is_err());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let toml = r#"
            [pipeline]
            collision_policy = "first-wins"
        "#;
        assert!(Config::from_str(toml).is_err());
    }
}
