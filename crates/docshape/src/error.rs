//! Error types for schema configuration and document validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Well-known error codes emitted by the validation pipeline.
pub mod codes {
    /// A required property was missing or empty.
    pub const NOT_NULL: &str = "NOT_NULL";
    /// A validator failed without a configured code.
    pub const INVALID: &str = "INVALID";
    /// A property value was not in its configured allow-list.
    pub const INVALID_OPTION: &str = "INVALID_OPTION";
}

/// One reported validation failure.
///
/// `property` is `None` for whole-document (schema-level) failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Name of the failing property, or `None` for a document-level failure.
    pub property: Option<String>,
    /// Error code, e.g. `NOT_NULL` or a code set via `with_error_code`.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(
        property: Option<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            property,
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(property) => write!(f, "{}: [{}] {}", property, self.code, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

/// A schema configuration fault: a programmer mistake, not a data defect.
///
/// Surfaced through the same async channel as validation results but with a
/// distinct shape, so callers can tell "your document is invalid" apart from
/// "your schema is misconfigured".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A `valid_if_named` reference did not resolve at validate time.
    #[error("no validator registered under the name '{0}'")]
    UnknownValidator(String),
    /// A named converter did not resolve at validate time.
    #[error("no converter registered under the name '{0}'")]
    UnknownConverter(String),
    /// The submitted document was not a JSON object.
    #[error("expected a JSON object document, found {0}")]
    DocumentNotObject(&'static str),
}

/// Rejection of a `validate` call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// The document failed validation; carries an ordered, non-empty list of
    /// failures, at most one per property.
    #[error("validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),
    /// The schema itself is misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SchemaError {
    /// The validation error list, if this is a data failure.
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            SchemaError::Validation(errors) => Some(errors),
            SchemaError::Config(_) => None,
        }
    }

    /// Whether this rejection is a configuration fault.
    pub fn is_config(&self) -> bool {
        matches!(self, SchemaError::Config(_))
    }
}
