//! Test a trained and saved model from segmentation_models.pytorch.
//!
//! The library computes a confusion matrix and per-class IoU on the test
//! set. A class-name count that differs from `num_classes` is reported but
//! does not stop the run.
//!
//! ```bash
//! test_smp test.ini
//! ```

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use geonn::{cli, config::MismatchPolicy, logging, test_from_file, PythonDelegate};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Test a trained and saved model from segmentation_models.pytorch",
    long_about = None
)]
struct Args {
    /// Path to configfile.
    configfile: PathBuf,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let mut delegate = PythonDelegate::from_env();
    cli::finish(
        test_from_file(&args.configfile, MismatchPolicy::Warn, &mut delegate)
            .map(|_| ())
            .with_context(|| format!("Testing with {} failed", args.configfile.display())),
    )
}
