//! Error types for configuration loading.
//!
//! Every variant is fatal for the front-end that hit it: the process stops
//! before the segmentation library is called.

use std::path::PathBuf;

use thiserror::Error;

/// The error type for configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error when the configuration file cannot be opened or read.
    #[error("Failed to read config file: {path}")]
    Io {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Error when the configuration text is not well-formed INI.
    #[error("Malformed configuration text: {source}")]
    Syntax {
        /// Parser error with line and column.
        #[source]
        source: ini::ParseError,
    },

    /// Error when an option appears before the first section header.
    #[error("Option '{key}' is not inside any section")]
    OptionOutsideSection {
        /// The stray option name.
        key: String,
    },

    /// Error when the same section header appears twice.
    #[error("Section [{section}] already exists")]
    DuplicateSection {
        /// The repeated section name.
        section: String,
    },

    /// Error when the same option appears twice within one section.
    #[error("Option '{key}' in section [{section}] already exists")]
    DuplicateOption {
        /// Section holding the option.
        section: String,
        /// The repeated option name.
        key: String,
    },

    /// Error when a required section is absent.
    #[error("No section: [{section}]")]
    MissingSection {
        /// The missing section name.
        section: String,
    },

    /// Error when a required option is absent from its section.
    #[error("No option '{key}' in section [{section}]")]
    MissingOption {
        /// Section that was searched.
        section: String,
        /// The missing option name.
        key: String,
    },

    /// Error when an integer field holds something other than a plain
    /// base-10 unsigned integer.
    ///
    /// Only ASCII digits are accepted. A leading `+` or `-`, `_` separators,
    /// an empty value, and anything above `u32::MAX` are all rejected.
    #[error("Invalid integer for '{key}' in section [{section}]: {value:?}")]
    InvalidInteger {
        /// Section holding the field.
        section: String,
        /// The field name.
        key: String,
        /// The offending raw value.
        value: String,
    },

    /// Error when a record value cannot be written so that it reloads unchanged.
    #[error("Cannot write '{key}' in section [{section}]: {reason}")]
    Unrepresentable {
        /// Section the value belongs to.
        section: String,
        /// The field name.
        key: String,
        /// Why the value would not survive a reload.
        reason: &'static str,
    },

    /// Error when record fields cannot be converted to or from their
    /// serialized form.
    #[error("Failed to convert configuration record")]
    Record(#[from] serde_json::Error),

    /// Error when the number of class names differs from the declared class count.
    #[error("Number of class names ({names}) does not match number of classes ({classes})")]
    ClassCountMismatch {
        /// Number of parsed class names.
        names: usize,
        /// Declared number of classes.
        classes: u32,
    },
}

/// A specialized `Result` type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
