//! Configuration records for the train, test and inference front-ends.
//!
//! A record is read once from an INI file, never mutated, and handed to the
//! segmentation library as a whole. [`TrainConfig::save`] and friends write
//! the record back out in the same layout, so a saved record reloads to an
//! equal value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    document::Document,
    error::ConfigResult,
    schema::{decode, encode, Field, Kind, DATASET_SECTION, MODEL_SECTION, OUTPUT_SECTION},
};

const DATA_DIR: Field = Field::new(DATASET_SECTION, "data_dir", Kind::Path);
const NUM_CLASSES: Field = Field::new(DATASET_SECTION, "num_classes", Kind::Integer);
const CLASS_NAMES: Field = Field::new(DATASET_SECTION, "class_names", Kind::List);
const IN_CHANNELS: Field = Field::new(DATASET_SECTION, "in_channels", Kind::Integer);
const OUT_CLASSES: Field = Field::new(DATASET_SECTION, "out_classes", Kind::Integer);
const IMG_SIZE: Field = Field::new(DATASET_SECTION, "img_size", Kind::Integer);

const MODEL_ARCH: Field = Field::new(MODEL_SECTION, "model_arch", Kind::Str);
const ENCODER_NAME: Field = Field::new(MODEL_SECTION, "encoder_name", Kind::Str);
const ENCODER_WEIGHTS: Field = Field::new(MODEL_SECTION, "encoder_weights", Kind::Nullable);
const EPOCHS: Field = Field::new(MODEL_SECTION, "epochs", Kind::Integer);
const BATCH_SIZE: Field = Field::new(MODEL_SECTION, "batch_size", Kind::Integer);
const INPUT_MODEL_PATH: Field = Field::new(MODEL_SECTION, "input_model_path", Kind::OptionalPath);
const OUTPUT_MODEL_PATH: Field = Field::new(MODEL_SECTION, "output_model_path", Kind::Path);
const OUTPUT_TRAIN_METRICS_PATH: Field =
    Field::new(MODEL_SECTION, "output_train_metrics_path", Kind::OptionalPath);
const MODEL_PATH: Field = Field::new(MODEL_SECTION, "model_path", Kind::Path);

const OUTPUT_PATH: Field = Field::new(OUTPUT_SECTION, "output_path", Kind::Path);

// Table order decides which error is reported first.
const TRAIN_FIELDS: [Field; 12] = [
    DATA_DIR,
    IN_CHANNELS,
    OUT_CLASSES,
    IMG_SIZE,
    MODEL_ARCH,
    ENCODER_NAME,
    ENCODER_WEIGHTS,
    EPOCHS,
    BATCH_SIZE,
    INPUT_MODEL_PATH,
    OUTPUT_MODEL_PATH,
    OUTPUT_TRAIN_METRICS_PATH,
];
const TEST_FIELDS: [Field; 5] = [DATA_DIR, NUM_CLASSES, CLASS_NAMES, MODEL_PATH, OUTPUT_PATH];
const INFERENCE_FIELDS: [Field; 4] = [DATA_DIR, NUM_CLASSES, MODEL_PATH, OUTPUT_PATH];

/// Training run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Dataset root with the training and validation tiles.
    pub data_dir: PathBuf,
    /// Number of input bands.
    pub in_channels: u32,
    /// Number of output classes.
    pub out_classes: u32,
    /// Edge length of the square training tiles.
    pub img_size: u32,
    /// Architecture name, e.g. `UPerNet` or `Segformer`.
    pub model_arch: String,
    /// Encoder name, e.g. `resnet34`.
    pub encoder_name: String,
    /// Pretrained encoder weights; `None` trains the encoder from scratch.
    pub encoder_weights: Option<String>,
    /// Saved model to fine-tune instead of starting fresh.
    pub input_model_path: Option<PathBuf>,
    /// Where the trained model is written.
    pub output_model_path: PathBuf,
    /// Where per-epoch training metrics are written.
    pub output_train_metrics_path: Option<PathBuf>,
    /// Number of training epochs.
    pub epochs: u32,
    /// Samples per batch.
    pub batch_size: u32,
}

impl TrainConfig {
    /// Loads a training configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or malformed, a required
    /// key is missing, or an integer field does not parse.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::from_document(&Document::load(path)?)
    }

    /// Extracts the training fields from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing or an integer field
    /// does not parse.
    pub fn from_document(document: &Document) -> ConfigResult<Self> {
        decode(&TRAIN_FIELDS, document)
    }

    /// Writes the record into the canonical section layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unrepresentable`](crate::ConfigError::Unrepresentable)
    /// for a value that would not load back unchanged.
    pub fn to_document(&self) -> ConfigResult<Document> {
        encode(&TRAIN_FIELDS, self)
    }

    /// Saves the record as a configuration file.
    ///
    /// # Errors
    ///
    /// See [`to_document`](Self::to_document) and [`Document::save`].
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        self.to_document()?.save(path)
    }
}

/// Configuration for evaluating a saved model against a labelled test set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
    /// Dataset root with the test tiles and labels.
    pub data_dir: PathBuf,
    /// Declared number of classes.
    pub num_classes: u32,
    /// One display name per class, in class-index order.
    pub class_names: Vec<String>,
    /// Saved model to evaluate.
    pub model_path: PathBuf,
    /// Where the confusion matrix and per-class IoU are written.
    pub output_path: PathBuf,
}

impl TestConfig {
    /// Loads a test configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or malformed, a required
    /// key is missing, or `num_classes` does not parse.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::from_document(&Document::load(path)?)
    }

    /// Extracts the test fields from a parsed document.
    ///
    /// The class-name count is not checked here; see
    /// [`check_class_names`](crate::check_class_names).
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing or `num_classes` does
    /// not parse.
    pub fn from_document(document: &Document) -> ConfigResult<Self> {
        decode(&TEST_FIELDS, document)
    }

    /// Writes the record into the canonical section layout.
    ///
    /// # Errors
    ///
    /// Returns an error for a value that would not load back unchanged,
    /// including an empty class-name list.
    pub fn to_document(&self) -> ConfigResult<Document> {
        encode(&TEST_FIELDS, self)
    }

    /// Saves the record as a configuration file.
    ///
    /// # Errors
    ///
    /// See [`to_document`](Self::to_document) and [`Document::save`].
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        self.to_document()?.save(path)
    }
}

/// Configuration for applying a saved model to unlabelled tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Directory with the tiles to segment.
    pub data_dir: PathBuf,
    /// Number of classes the model predicts.
    pub num_classes: u32,
    /// Saved model to apply.
    pub model_path: PathBuf,
    /// Where predicted label rasters are written.
    pub output_path: PathBuf,
}

impl InferenceConfig {
    /// Loads an inference configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or malformed, a required
    /// key is missing, or `num_classes` does not parse.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::from_document(&Document::load(path)?)
    }

    /// Extracts the inference fields from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing or `num_classes` does
    /// not parse.
    pub fn from_document(document: &Document) -> ConfigResult<Self> {
        decode(&INFERENCE_FIELDS, document)
    }

    /// Writes the record into the canonical section layout.
    ///
    /// # Errors
    ///
    /// Returns an error for a value that would not load back unchanged.
    pub fn to_document(&self) -> ConfigResult<Document> {
        encode(&INFERENCE_FIELDS, self)
    }

    /// Saves the record as a configuration file.
    ///
    /// # Errors
    ///
    /// See [`to_document`](Self::to_document) and [`Document::save`].
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        self.to_document()?.save(path)
    }
}
