//! Train a model from segmentation_models.pytorch.
//!
//! ```bash
//! train_smp train.ini
//! ```

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use geonn::{cli, logging, train_from_file, PythonDelegate};

#[derive(Parser, Debug)]
#[command(version, about = "Train a model from segmentation_models.pytorch", long_about = None)]
struct Args {
    /// Path to configfile.
    configfile: PathBuf,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let mut delegate = PythonDelegate::from_env();
    cli::finish(
        train_from_file(&args.configfile, &mut delegate)
            .with_context(|| format!("Training with {} failed", args.configfile.display())),
    )
}
