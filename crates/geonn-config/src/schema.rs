//! Per-field schema: where a value lives and how it is converted.
//!
//! Each record declares its fields once as a table of [`Field`]s. Loading
//! reads every field from the document into a serialized record and lets
//! serde build the typed struct; saving runs the same table backwards. The
//! record's field names are the option names.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::{
    document::Document,
    error::{ConfigError, ConfigResult},
};

/// Section holding dataset location and shape.
pub const DATASET_SECTION: &str = "settings.dataset";
/// Section holding model selection and hyperparameters.
pub const MODEL_SECTION: &str = "settings.model";
/// Section holding result locations.
pub const OUTPUT_SECTION: &str = "settings.output";

/// Literal that marks an optional value as absent.
pub const NONE_LITERAL: &str = "None";

/// How a field's text is read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Required string, kept as written.
    Str,
    /// Required filesystem path.
    Path,
    /// Required key whose value may say "no value": empty or `None`.
    Nullable,
    /// Path that may be left out; empty or `None` also mean absent.
    OptionalPath,
    /// Required base-10 unsigned integer.
    Integer,
    /// Required comma-separated list with each element trimmed.
    List,
}

/// Location and kind of a single configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Section name.
    pub section: &'static str,
    /// Option name, lower-case. Also the record's field name.
    pub key: &'static str,
    /// How the value is converted.
    pub kind: Kind,
}

impl Field {
    /// Declares a field at `[section] key`.
    pub const fn new(section: &'static str, key: &'static str, kind: Kind) -> Self {
        Self { section, key, kind }
    }

    /// Reads the field from `document` into its serialized form.
    ///
    /// Absent optional values become `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSection`] or [`ConfigError::MissingOption`]
    /// for a missing required value and [`ConfigError::InvalidInteger`] for
    /// an integer field that does not parse.
    pub fn read(&self, document: &Document) -> ConfigResult<Value> {
        let value = match self.kind {
            Kind::OptionalPath => match document.get_opt(self.section, self.key) {
                Some(text) if !means_absent(text) => Value::from(text),
                _ => Value::Null,
            },
            Kind::Nullable => {
                let text = document.get(self.section, self.key)?;
                if means_absent(text) {
                    Value::Null
                } else {
                    Value::from(text)
                }
            }
            Kind::Str | Kind::Path => Value::from(document.get(self.section, self.key)?),
            Kind::Integer => {
                let text = document.get(self.section, self.key)?;
                let number = parse_u32(text).ok_or_else(|| ConfigError::InvalidInteger {
                    section: self.section.to_string(),
                    key: self.key.to_string(),
                    value: text.to_string(),
                })?;
                Value::from(number)
            }
            Kind::List => Value::from(split_list(document.get(self.section, self.key)?)),
        };
        Ok(value)
    }

    /// Writes the serialized `value` into `document`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unrepresentable`] when reading the written text
    /// back would not give `value` again.
    pub fn write(&self, value: &Value, document: &mut Document) -> ConfigResult<()> {
        let text = match (self.kind, value) {
            (Kind::OptionalPath, Value::Null) => return Ok(()),
            (Kind::Nullable, Value::Null) => NONE_LITERAL.to_string(),
            (Kind::Nullable | Kind::OptionalPath, Value::String(text)) if means_absent(text) => {
                return Err(self.unrepresentable("the value would read back as absent"));
            }
            (Kind::Str | Kind::Path | Kind::Nullable | Kind::OptionalPath, Value::String(text)) => {
                self.check_line(text)?;
                text.clone()
            }
            (Kind::Integer, Value::Number(number)) if number.is_u64() => number.to_string(),
            (Kind::List, Value::Array(items)) => self.join_list(items)?,
            _ => return Err(self.unrepresentable("the value does not match the field kind")),
        };
        document.set(self.section, self.key, text);
        Ok(())
    }

    fn check_line(&self, text: &str) -> ConfigResult<()> {
        if text.contains(&['\n', '\r'][..]) {
            return Err(self.unrepresentable("the value contains a line break"));
        }
        if text.trim() != text {
            return Err(self.unrepresentable("the value has surrounding whitespace"));
        }
        Ok(())
    }

    fn join_list(&self, items: &[Value]) -> ConfigResult<String> {
        if items.is_empty() {
            return Err(self.unrepresentable("an empty list reads back as one empty name"));
        }
        let mut names = Vec::with_capacity(items.len());
        for item in items {
            let Value::String(name) = item else {
                return Err(self.unrepresentable("list elements must be strings"));
            };
            if name.contains(',') {
                return Err(self.unrepresentable("a list element contains ','"));
            }
            self.check_line(name)?;
            names.push(name.as_str());
        }
        Ok(names.join(", "))
    }

    fn unrepresentable(&self, reason: &'static str) -> ConfigError {
        ConfigError::Unrepresentable {
            section: self.section.to_string(),
            key: self.key.to_string(),
            reason,
        }
    }
}

/// Builds a record from the fields listed in `fields`.
///
/// # Errors
///
/// Returns the first field error in table order.
pub fn decode<T: DeserializeOwned>(fields: &[Field], document: &Document) -> ConfigResult<T> {
    let mut record = Map::new();
    for field in fields {
        record.insert(field.key.to_string(), field.read(document)?);
    }
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Writes the fields listed in `fields` from `record` into a new document.
///
/// # Errors
///
/// Returns [`ConfigError::Record`] if `record` does not serialize (for
/// example a path that is not valid UTF-8) and
/// [`ConfigError::Unrepresentable`] for a value that would not read back
/// unchanged.
pub fn encode<T: Serialize>(fields: &[Field], record: &T) -> ConfigResult<Document> {
    let record = serde_json::to_value(record)?;
    let mut document = Document::new();
    for field in fields {
        field.write(record.get(field.key).unwrap_or(&Value::Null), &mut document)?;
    }
    Ok(document)
}

fn means_absent(text: &str) -> bool {
    text.is_empty() || text == NONE_LITERAL
}

/// Parses a plain base-10 `u32`: ASCII digits only, no sign, no separators.
pub(crate) fn parse_u32(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Splits `value` on commas and trims whitespace around every element.
///
/// Empty elements are kept, so `"a,,b"` has three entries.
pub fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_string()).collect()
}
