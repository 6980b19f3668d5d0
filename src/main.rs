//! # matjson
//!
//! Command-line tool converting MATLAB MAT-files to JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Convert using a config file
//! matjson run matjson.toml
//!
//! # Convert with explicit directories
//! matjson dirs ./incoming ./work/tmp ./work/result
//!
//! # Print the JSON of a single file
//! matjson inspect measurement.mat --pretty
//!
//! # Generate sample files
//! matjson demo ./demo_mat
//! ```

use clap::Parser;
use log::error;

mod cli;

use cli::{dispatch, init_logging, Cli};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            init_logging(0);
            error!("{}", e.render().to_string().trim_end());
            std::process::exit(1);
        }
    };

    init_logging(cli.verbosity());

    if let Err(e) = dispatch(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
