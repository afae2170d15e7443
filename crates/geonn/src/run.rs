//! Load → validate → invoke, once per front-end.
//!
//! The `run_*` functions take an already loaded record; the `*_from_file`
//! variants load it first. Nothing reaches the delegate unless loading
//! succeeded.

use std::{
    io::{self, Write},
    path::Path,
};

use geonn_config::{
    check_class_names, ClassCountMismatch, ConfigError, InferenceConfig, MismatchPolicy,
    TestConfig, TrainConfig, CLASS_COUNT_MISMATCH_MESSAGE,
};
use thiserror::Error;

use crate::delegate::{DelegateError, InferArgs, SegmentationDelegate, TestArgs, TrainArgs};

/// Error from one front-end run.
#[derive(Error, Debug)]
pub enum RunError {
    /// The configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The segmentation library failed.
    #[error(transparent)]
    Delegate(#[from] DelegateError),

    /// The class-count diagnostic could not be written.
    #[error("Failed to write diagnostic")]
    Output(#[source] io::Error),
}

impl RunError {
    /// Exit code the front-end should end with, if the library reported one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Delegate(e) => e.exit_code(),
            Self::Config(_) | Self::Output(_) => None,
        }
    }
}

/// A specialized `Result` type for front-end runs.
pub type RunResult<T> = Result<T, RunError>;

/// Hands a training record to the library.
///
/// # Errors
///
/// Returns [`RunError::Delegate`] if the library fails.
pub fn run_train<D: SegmentationDelegate>(config: &TrainConfig, delegate: &mut D) -> RunResult<()> {
    tracing::info!(
        data_dir = %config.data_dir.display(),
        model_arch = %config.model_arch,
        encoder = %config.encoder_name,
        epochs = config.epochs,
        batch_size = config.batch_size,
        "starting training",
    );
    delegate.train(&TrainArgs::from(config))?;
    Ok(())
}

/// Checks the class names, then hands a test record to the library.
///
/// Under [`MismatchPolicy::Warn`] a class-count mismatch prints
/// [`CLASS_COUNT_MISMATCH_MESSAGE`] to stdout and the library is still
/// called; the mismatch is returned so callers can see it happened.
///
/// # Errors
///
/// Returns [`RunError::Config`] for a mismatch under
/// [`MismatchPolicy::Abort`] (the library is not called), or
/// [`RunError::Delegate`] if the library fails.
pub fn run_test<D: SegmentationDelegate>(
    config: &TestConfig,
    policy: MismatchPolicy,
    delegate: &mut D,
) -> RunResult<Option<ClassCountMismatch>> {
    run_test_with_output(config, policy, delegate, &mut io::stdout())
}

/// [`run_test`] with the mismatch diagnostic written to `out`.
///
/// # Errors
///
/// As [`run_test`], plus [`RunError::Output`] if `out` cannot be written.
pub fn run_test_with_output<D: SegmentationDelegate, W: Write>(
    config: &TestConfig,
    policy: MismatchPolicy,
    delegate: &mut D,
    out: &mut W,
) -> RunResult<Option<ClassCountMismatch>> {
    let mismatch = check_class_names(config, policy)?;
    if mismatch.is_some() {
        writeln!(out, "{CLASS_COUNT_MISMATCH_MESSAGE}").map_err(RunError::Output)?;
        out.flush().map_err(RunError::Output)?;
    }

    tracing::info!(
        data_dir = %config.data_dir.display(),
        model = %config.model_path.display(),
        num_classes = config.num_classes,
        "starting test",
    );
    delegate.test(&TestArgs::from(config))?;
    Ok(mismatch)
}

/// Hands an inference record to the library.
///
/// # Errors
///
/// Returns [`RunError::Delegate`] if the library fails.
pub fn run_inference<D: SegmentationDelegate>(
    config: &InferenceConfig,
    delegate: &mut D,
) -> RunResult<()> {
    tracing::info!(
        data_dir = %config.data_dir.display(),
        model = %config.model_path.display(),
        output = %config.output_path.display(),
        "starting inference",
    );
    delegate.infer(&InferArgs::from(config))?;
    Ok(())
}

/// Loads a training configuration file and runs it.
///
/// # Errors
///
/// Returns [`RunError::Config`] before any library call if the file is
/// invalid, or [`RunError::Delegate`] if the library fails.
pub fn train_from_file<D: SegmentationDelegate>(
    path: impl AsRef<Path>,
    delegate: &mut D,
) -> RunResult<()> {
    let config = TrainConfig::load(path)?;
    run_train(&config, delegate)
}

/// Loads a test configuration file and runs it.
///
/// # Errors
///
/// See [`run_test`]; loading errors are returned before any library call.
pub fn test_from_file<D: SegmentationDelegate>(
    path: impl AsRef<Path>,
    policy: MismatchPolicy,
    delegate: &mut D,
) -> RunResult<Option<ClassCountMismatch>> {
    let config = TestConfig::load(path)?;
    run_test(&config, policy, delegate)
}

/// Loads an inference configuration file and runs it.
///
/// # Errors
///
/// Returns [`RunError::Config`] before any library call if the file is
/// invalid, or [`RunError::Delegate`] if the library fails.
pub fn inference_from_file<D: SegmentationDelegate>(
    path: impl AsRef<Path>,
    delegate: &mut D,
) -> RunResult<()> {
    let config = InferenceConfig::load(path)?;
    run_inference(&config, delegate)
}
