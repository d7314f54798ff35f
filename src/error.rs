use thiserror::Error;

use crate::reminder::ReminderId;

/// Errors surfaced by [`crate::engine::ReminderEngine`]. Neither kind is
/// fatal: the collection is left untouched when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum EngineError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("no reminder with id {0}")]
    NotFound(ReminderId),
}

impl EngineError {
    pub(crate) fn validation<S: Into<String>>(field: &'static str, reason: S) -> Self {
        EngineError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EngineError;

    #[test]
    fn validation_display_names_the_field() {
        let err = EngineError::validation("dosage", "must not be empty");
        assert_eq!(err.to_string(), "invalid dosage: must not be empty");
    }
}
