//! Section/key=value configuration text.
//!
//! Parsing and writing go through `rust-ini`. On top of it this module keeps
//! the rules the segmentation scripts' config files were written against:
//! option names are case-insensitive, a `[DEFAULT]` section backs every other
//! section, and duplicates or options outside any section are rejected.
//!
//! A value is the text after the first `=` or `:` with surrounding whitespace
//! removed. Quotes, backslashes and `%` are kept as written; there is no
//! escaping and no interpolation.
//!
//! ```ini
//! [DEFAULT]
//! root = /data/project
//!
//! [settings.dataset]
//! data_dir = /data/project/tiles
//! num_classes = 3
//! ```

use std::{collections::HashSet, fmt, fs, path::Path, str::FromStr};

use ini::{EscapePolicy, Ini, ParseOption, WriteOption};

use crate::error::{ConfigError, ConfigResult};

/// Name of the section whose options back every other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    options: Vec<(String, String)>,
}

impl Section {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn set(&mut self, key: String, value: String) {
        match self.options.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.options.push((key, value)),
        }
    }
}

/// Parsed configuration text, addressable by `(section, key)`.
///
/// Option names are stored lower-case. Section names are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    defaults: Section,
    sections: Vec<Section>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self {
            defaults: Section::new(DEFAULT_SECTION),
            sections: Vec::new(),
        }
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and a parse
    /// error if its contents are malformed.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "read config file");
        text.parse()
    }

    /// Writes the document to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string()).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote config file");
        Ok(())
    }

    /// Returns `true` if a section named `section` exists.
    ///
    /// `DEFAULT` is never reported as a section.
    pub fn has_section(&self, section: &str) -> bool {
        self.section(section).is_some()
    }

    /// Iterates over section names in file order, excluding `DEFAULT`.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// Returns the value of `key`, falling back to `DEFAULT`.
    ///
    /// Returns `None` when the section or the key is missing.
    pub fn get_opt(&self, section: &str, key: &str) -> Option<&str> {
        let key = normalize_key(key);
        if section == DEFAULT_SECTION {
            return self.defaults.get(&key);
        }
        self.section(section)?
            .get(&key)
            .or_else(|| self.defaults.get(&key))
    }

    /// Returns the value of a required option.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSection`] or [`ConfigError::MissingOption`]
    /// naming what was absent.
    pub fn get(&self, section: &str, key: &str) -> ConfigResult<&str> {
        if section != DEFAULT_SECTION && !self.has_section(section) {
            return Err(ConfigError::MissingSection {
                section: section.to_string(),
            });
        }
        self.get_opt(section, key)
            .ok_or_else(|| ConfigError::MissingOption {
                section: section.to_string(),
                key: normalize_key(key),
            })
    }

    /// Stores `value` verbatim, creating the section if needed.
    ///
    /// Values containing line breaks or surrounding whitespace do not
    /// survive a write and reload.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let key = normalize_key(key);
        let value = value.into();
        if section == DEFAULT_SECTION {
            self.defaults.set(key, value);
            return;
        }
        match self.sections.iter_mut().find(|s| s.name == section) {
            Some(s) => s.set(key, value),
            None => {
                let mut s = Section::new(section);
                s.set(key, value);
                self.sections.push(s);
            }
        }
    }

    fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let mut document = Self::new();
        let mut seen = HashSet::new();

        for (name, properties) in ini.iter() {
            let Some(name) = name else {
                // Options ahead of the first header land in the unnamed section.
                if let Some((key, _)) = properties.iter().next() {
                    return Err(ConfigError::OptionOutsideSection {
                        key: normalize_key(key),
                    });
                }
                continue;
            };
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateSection {
                    section: name.to_string(),
                });
            }

            let mut section = Section::new(name);
            for (key, value) in properties.iter() {
                let key = normalize_key(key);
                if section.get(&key).is_some() {
                    return Err(ConfigError::DuplicateOption {
                        section: name.to_string(),
                        key,
                    });
                }
                section.options.push((key, value.trim().to_string()));
            }

            if name == DEFAULT_SECTION {
                document.defaults = section;
            } else {
                document.sections.push(section);
            }
        }

        Ok(document)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        let defaults = (!self.defaults.options.is_empty()).then_some(&self.defaults);
        for section in defaults.into_iter().chain(&self.sections) {
            for (key, value) in &section.options {
                ini.with_section(Some(section.name.as_str()))
                    .set(key.as_str(), value.as_str());
            }
        }
        ini
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Document {
    type Err = ConfigError;

    fn from_str(text: &str) -> ConfigResult<Self> {
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(text, options)
            .map_err(|source| ConfigError::Syntax { source })?;
        Self::from_ini(&ini)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = WriteOption {
            escape_policy: EscapePolicy::Nothing,
            ..WriteOption::default()
        };
        let mut buf = Vec::new();
        self.to_ini()
            .write_to_opt(&mut buf, options)
            .map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
