//! The seam between the front-ends and the segmentation library.
//!
//! The library exposes three functions with fixed keyword signatures. The
//! argument structs below mirror those signatures field for field and in
//! order; they serialize to the keyword payload the library receives.

use std::{path::PathBuf, process::ExitStatus};

use geonn_config::{InferenceConfig, TestConfig, TrainConfig};
use serde::Serialize;
use thiserror::Error;

/// Keyword arguments of the library's training function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainArgs {
    pub data_dir: PathBuf,
    pub img_size: u32,
    pub in_channels: u32,
    pub out_classes: u32,
    pub model_arch: String,
    pub encoder_name: String,
    pub encoder_weights: Option<String>,
    pub input_model_path: Option<PathBuf>,
    pub output_model_path: PathBuf,
    pub output_train_metrics_path: Option<PathBuf>,
    pub epochs: u32,
    pub batch_size: u32,
}

impl From<&TrainConfig> for TrainArgs {
    fn from(config: &TrainConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            img_size: config.img_size,
            in_channels: config.in_channels,
            out_classes: config.out_classes,
            model_arch: config.model_arch.clone(),
            encoder_name: config.encoder_name.clone(),
            encoder_weights: config.encoder_weights.clone(),
            input_model_path: config.input_model_path.clone(),
            output_model_path: config.output_model_path.clone(),
            output_train_metrics_path: config.output_train_metrics_path.clone(),
            epochs: config.epochs,
            batch_size: config.batch_size,
        }
    }
}

/// Keyword arguments of the library's test function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestArgs {
    pub data_dir: PathBuf,
    pub input_model_path: PathBuf,
    pub num_classes: u32,
    pub class_names: Vec<String>,
    pub output_path: PathBuf,
}

impl From<&TestConfig> for TestArgs {
    fn from(config: &TestConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            input_model_path: config.model_path.clone(),
            num_classes: config.num_classes,
            class_names: config.class_names.clone(),
            output_path: config.output_path.clone(),
        }
    }
}

/// Keyword arguments of the library's inference function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferArgs {
    pub data_dir: PathBuf,
    pub input_model_path: PathBuf,
    pub num_classes: u32,
    pub output_path: PathBuf,
}

impl From<&InferenceConfig> for InferArgs {
    fn from(config: &InferenceConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            input_model_path: config.model_path.clone(),
            num_classes: config.num_classes,
            output_path: config.output_path.clone(),
        }
    }
}

/// Error raised while handing work to the segmentation library.
#[derive(Error, Debug)]
pub enum DelegateError {
    /// The library process could not be started.
    #[error("Failed to start {program}")]
    Spawn {
        /// Interpreter that was launched.
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The keyword payload could not be encoded.
    #[error("Failed to encode arguments for {function}")]
    Payload {
        /// Library function the payload was meant for.
        function: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The keyword payload could not be delivered to the library process.
    #[error("Failed to pass arguments to {function}")]
    Stdin {
        /// Library function the payload was meant for.
        function: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The library function raised or the process exited abnormally.
    #[error("{function} failed: {status}")]
    Failed {
        /// Library function that failed.
        function: &'static str,
        /// Exit status of the library process.
        status: ExitStatus,
    },
}

impl DelegateError {
    /// Exit code the front-end should end with, if the library reported one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { status, .. } => status.code(),
            _ => None,
        }
    }
}

/// Something that can run the library's train, test and infer functions.
///
/// The front-ends only assemble arguments; everything the library does
/// with them happens behind this trait.
pub trait SegmentationDelegate {
    /// Trains (or fine-tunes) a model.
    fn train(&mut self, args: &TrainArgs) -> Result<(), DelegateError>;

    /// Evaluates a saved model on a labelled test set.
    fn test(&mut self, args: &TestArgs) -> Result<(), DelegateError>;

    /// Applies a saved model to unlabelled data.
    fn infer(&mut self, args: &InferArgs) -> Result<(), DelegateError>;
}
