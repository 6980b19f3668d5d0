use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use matjson::pipeline::CollisionPolicy;

mod config;
mod convert;
mod demo;
mod inspect;

/// matjson - MATLAB MAT-file to JSON converter
#[derive(Parser)]
#[command(name = "matjson")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Handling of a file reported by more than one batch.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CollisionArg {
    /// Keep the status merged last
    #[default]
    LastWriteWins,
    /// Append later status text to the earlier one
    Concatenate,
    /// Abort the run
    Fail,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::LastWriteWins => CollisionPolicy::LastWriteWins,
            CollisionArg::Concatenate => CollisionPolicy::Concatenate,
            CollisionArg::Fail => CollisionPolicy::Fail,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a directory of MAT-files using a TOML config file
    Run {
        /// Config file path
        #[arg(value_name = "CONFIG", default_value = "matjson.toml")]
        config: PathBuf,
    },

    /// Convert a directory of MAT-files into explicit directories
    Dirs {
        /// Directory of MAT-files, or a single file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Scratch directory for relocated sources
        #[arg(value_name = "TMP")]
        tmp: PathBuf,

        /// Directory receiving the JSON files
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        /// Files per batch
        #[arg(short = 'b', long)]
        batch_size: Option<usize>,

        /// Worker threads (default: available parallelism - 1)
        #[arg(short = 'w', long)]
        workers: Option<usize>,

        /// Handling of files reported twice
        #[arg(long, value_enum)]
        collision_policy: Option<CollisionArg>,
    },

    /// Print the JSON of one MAT-file without moving anything
    Inspect {
        /// MAT-file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Write sample MAT-files, including a corrupt one, for trying out the pipeline
    Demo {
        /// Output directory
        #[arg(value_name = "DIR", default_value = "demo_mat")]
        dir: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { config } => convert::run_config(config),
        Commands::Dirs {
            source,
            tmp,
            target,
            batch_size,
            workers,
            collision_policy,
        } => convert::run_dirs(
            source,
            tmp,
            target,
            batch_size,
            workers,
            collision_policy.map(CollisionPolicy::from),
        ),
        Commands::Inspect { file, pretty } => inspect::run(file, pretty),
        Commands::Demo { dir } => demo::run(dir),
    }
}
