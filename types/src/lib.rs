//! Core domain types for fieldcore.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod input;
mod status;

pub use input::{Key, KeyPress, Modifiers};
pub use status::{
    CompositeStatus, FieldStatus, LeafStatus, PARSE_ERROR_CODE, PartMarkers, Severity, Status,
    StatusKind,
};

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Field Parts
// ============================================================================

/// One of the two independently focusable inputs of a date/time field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPart {
    Date,
    Time,
}

impl FieldPart {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Date => Self::Time,
            Self::Time => Self::Date,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for FieldPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Field Values
// ============================================================================

/// A value that can live in a field's value slot.
///
/// The slot itself is `Option<V>`; `None` is the only null.
pub trait FieldValue: Clone + fmt::Debug + 'static {
    /// Type-aware equality used for change detection and dirty-tracking.
    fn value_eq(&self, other: &Self) -> bool;

    /// Whether the value counts as empty for the `empty` tag (null is always empty).
    fn is_empty_value(&self) -> bool {
        false
    }

    /// Whether the default validator should normalize this value to null.
    fn is_empty_text(&self) -> bool {
        false
    }

    /// Text projection used by the default formatter.
    fn display(&self) -> String;
}

/// Null-aware comparison of two value slots.
#[must_use]
pub fn values_equal<V: FieldValue>(a: Option<&V>, b: Option<&V>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.value_eq(b),
        _ => false,
    }
}

impl FieldValue for String {
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }

    /// Only the empty string. Whitespace stays a real value.
    fn is_empty_text(&self) -> bool {
        self.is_empty()
    }

    fn display(&self) -> String {
        self.clone()
    }
}

impl FieldValue for i64 {
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn display(&self) -> String {
        self.to_string()
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn value_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.value_eq(b))
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn display(&self) -> String {
        self.iter()
            .map(FieldValue::display)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FieldValue for NaiveDateTime {
    /// Dates compare to the full date-time resolution.
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn display(&self) -> String {
        self.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}

// ============================================================================
// Field Errors
// ============================================================================

/// Error raised by a parser, validator, or value coercion.
///
/// Never escapes the pipeline: every error is classified into a [`LeafStatus`]
/// and attached to the field.
#[derive(Debug, Clone, Error)]
pub enum FieldError {
    /// A fully formed status. Used verbatim if its kind matches the stage.
    #[error("{}", .0.message())]
    Status(LeafStatus),
    /// Plain message with default severity.
    #[error("{0}")]
    Message(String),
    /// Anything else. Reported with the field's invalid-value message.
    #[error(transparent)]
    Other(Arc<dyn std::error::Error + Send + Sync>),
    /// The failure was already recorded on the field's status tree.
    #[error("prediction failed")]
    PredictionFailed,
}

impl FieldError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn other(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Arc::new(error))
    }

    /// Convert into a status of the required `kind`.
    ///
    /// A status of exactly that kind is kept as is. A status of another kind
    /// keeps its message and severity. A plain message gets error severity.
    /// Anything else gets the `fallback` message.
    #[must_use]
    pub fn into_status(self, kind: StatusKind, fallback: impl FnOnce() -> String) -> LeafStatus {
        match self {
            Self::Status(status) if status.kind() == kind => status,
            Self::Status(status) => LeafStatus::new(kind, status.severity(), status.message()),
            Self::Message(message) => LeafStatus::error(kind, message),
            Self::Other(_) | Self::PredictionFailed => LeafStatus::error(kind, fallback()),
        }
    }

    #[must_use]
    pub fn is_prediction_failure(&self) -> bool {
        matches!(self, Self::PredictionFailed)
    }
}

impl From<LeafStatus> for FieldError {
    fn from(status: LeafStatus) -> Self {
        Self::Status(status)
    }
}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for FieldError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}

/// The generic message used when an error carries nothing presentable.
#[must_use]
pub fn invalid_value_message(text: &str) -> String {
    format!("The value \"{text}\" is not valid.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn vec_equality_is_element_wise() {
        let a = vec!["a".to_owned(), "b".to_owned()];
        let b = vec!["a".to_owned(), "b".to_owned()];
        let c = vec!["b".to_owned(), "a".to_owned()];
        assert!(a.value_eq(&b));
        assert!(!a.value_eq(&c));
        assert!(Vec::<String>::new().is_empty_value());
    }

    #[test]
    fn only_empty_string_is_empty_text() {
        assert!(String::new().is_empty_text());
        assert!(!"   ".to_owned().is_empty_text());
    }

    #[test]
    fn dates_compare_with_seconds() {
        let date = NaiveDate::from_ymd_opt(2017, 5, 23).unwrap();
        let a = date.and_hms_opt(12, 30, 0).unwrap();
        let b = date.and_hms_opt(12, 30, 1).unwrap();
        assert!(!a.value_eq(&b));
        assert!(values_equal(Some(&a), Some(&a)));
        assert!(!values_equal(Some(&a), None));
        assert!(values_equal::<NaiveDateTime>(None, None));
    }

    #[test]
    fn classification_keeps_matching_status() {
        let status = LeafStatus::new(StatusKind::Parsing, Severity::Warning, "careful");
        let classified = FieldError::Status(status.clone()).into_status(StatusKind::Parsing, String::new);
        assert_eq!(classified, status);
    }

    #[test]
    fn classification_downgrades_other_kind() {
        let status = LeafStatus::new(StatusKind::Validation, Severity::Warning, "careful")
            .with_code(7);
        let classified = FieldError::Status(status).into_status(StatusKind::Parsing, String::new);
        assert_eq!(classified.kind(), StatusKind::Parsing);
        assert_eq!(classified.severity(), Severity::Warning);
        assert_eq!(classified.message(), "careful");
        assert_eq!(classified.code(), None);
    }

    #[test]
    fn classification_of_messages_and_foreign_errors() {
        let classified = FieldError::from("nope").into_status(StatusKind::Validation, String::new);
        assert_eq!(classified.message(), "nope");
        assert_eq!(classified.severity(), Severity::Error);

        let io = std::io::Error::other("boom");
        let classified = FieldError::other(io)
            .into_status(StatusKind::Parsing, || invalid_value_message("abc"));
        assert_eq!(classified.message(), "The value \"abc\" is not valid.");
    }
}
