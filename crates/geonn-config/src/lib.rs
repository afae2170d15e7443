//! Configuration loading for the geo-neural-network segmentation front-ends.
//!
//! Each front-end reads one INI file into an immutable record:
//!
//! - [`TrainConfig`] for `train_smp`
//! - [`TestConfig`] for `test_smp`
//! - [`InferenceConfig`] for `inference_smp`
//!
//! All records use the `settings.dataset`, `settings.model` and
//! `settings.output` sections. The INI text itself is parsed and written by
//! `rust-ini`; records convert to and from it through serde.

pub mod document;
pub mod error;
pub mod records;
pub mod schema;
pub mod validate;

#[cfg(test)]
mod property_tests;

pub use document::Document;
pub use error::{ConfigError, ConfigResult};
pub use records::{InferenceConfig, TestConfig, TrainConfig};
pub use validate::{
    check_class_names, ClassCountMismatch, MismatchPolicy, CLASS_COUNT_MISMATCH_MESSAGE,
};
