//! Cross-field checks run after loading and before the library is called.

use crate::{
    error::{ConfigError, ConfigResult},
    records::TestConfig,
};

/// Diagnostic printed when class names and class count disagree.
pub const CLASS_COUNT_MISMATCH_MESSAGE: &str =
    "Number of class names does not match number of classes!";

/// What to do when the class-name count differs from `num_classes`.
///
/// `Warn` reports the mismatch and carries on, so the library still runs
/// with the inconsistent record. `Abort` refuses the record before the
/// library is called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MismatchPolicy {
    /// Report and continue.
    #[default]
    Warn,
    /// Report and fail with [`ConfigError::ClassCountMismatch`].
    Abort,
}

/// A detected disagreement between class names and class count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassCountMismatch {
    /// Number of parsed class names.
    pub names: usize,
    /// Declared number of classes.
    pub classes: u32,
}

/// Compares the parsed class names with the declared class count.
///
/// Returns `Ok(None)` when they agree and `Ok(Some(_))` for a tolerated
/// mismatch under [`MismatchPolicy::Warn`].
///
/// # Errors
///
/// Returns [`ConfigError::ClassCountMismatch`] under [`MismatchPolicy::Abort`].
pub fn check_class_names(
    config: &TestConfig,
    policy: MismatchPolicy,
) -> ConfigResult<Option<ClassCountMismatch>> {
    let names = config.class_names.len();
    let classes = config.num_classes;
    if u32::try_from(names).is_ok_and(|n| n == classes) {
        return Ok(None);
    }

    tracing::warn!(names, classes, ?policy, "{CLASS_COUNT_MISMATCH_MESSAGE}");
    match policy {
        MismatchPolicy::Warn => Ok(Some(ClassCountMismatch { names, classes })),
        MismatchPolicy::Abort => Err(ConfigError::ClassCountMismatch { names, classes }),
    }
}
