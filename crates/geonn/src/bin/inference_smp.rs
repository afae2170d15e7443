//! Apply a saved model from segmentation_models.pytorch.
//!
//! ```bash
//! inference_smp inference.ini
//! ```

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use geonn::{cli, inference_from_file, logging, PythonDelegate};

#[derive(Parser, Debug)]
#[command(version, about = "Apply a saved model from segmentation_models.pytorch", long_about = None)]
struct Args {
    /// Path to configfile.
    configfile: PathBuf,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let mut delegate = PythonDelegate::from_env();
    cli::finish(
        inference_from_file(&args.configfile, &mut delegate)
            .with_context(|| format!("Inference with {} failed", args.configfile.display())),
    )
}
