//! Command-line front-ends for training, testing and applying
//! `segmentation_models.pytorch` models through the `geo_neural_network`
//! helper library.
//!
//! Each front-end reads one INI file (see [`geonn_config`]), checks it, and
//! makes exactly one library call through a [`SegmentationDelegate`].
//!
//! ## Usage
//!
//! ```bash
//! train_smp train.ini
//! test_smp test.ini
//! inference_smp inference.ini
//! ```
//!
//! Set `GEONN_PYTHON` to choose the Python interpreter that has
//! `geo_neural_network` installed, and `RUST_LOG` to change log verbosity.

pub mod cli;
pub mod delegate;
pub mod logging;
pub mod python;
pub mod run;

pub use delegate::{DelegateError, InferArgs, SegmentationDelegate, TestArgs, TrainArgs};
pub use geonn_config as config;
pub use python::{LibraryFunction, PythonDelegate};
pub use run::{
    inference_from_file, run_inference, run_test, run_test_with_output, run_train,
    test_from_file, train_from_file, RunError, RunResult,
};
