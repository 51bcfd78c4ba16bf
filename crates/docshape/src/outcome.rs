//! The dual calling convention for validator predicates.

/// Result of evaluating a validator predicate.
///
/// Predicates may speak three dialects, and `From` impls let closures return
/// whichever reads best:
///
/// - a `String` (or `&str`, or `Some(..)`) means INVALID, carrying its own
///   error message, which overrides any configured message;
/// - `false` means INVALID, with the message resolved from the validator's
///   configuration;
/// - anything else (`true`, `()`, `None`) means VALID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The value passed this validator.
    Valid,
    /// The value failed; message and code come from the validator's
    /// configuration.
    Invalid,
    /// The value failed; the predicate supplied its own message.
    Message(String),
}

impl From<bool> for Outcome {
    fn from(valid: bool) -> Self {
        if valid {
            Outcome::Valid
        } else {
            Outcome::Invalid
        }
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::Valid
    }
}

impl From<String> for Outcome {
    fn from(message: String) -> Self {
        Outcome::Message(message)
    }
}

impl From<&str> for Outcome {
    fn from(message: &str) -> Self {
        Outcome::Message(message.to_string())
    }
}

impl From<Option<String>> for Outcome {
    fn from(message: Option<String>) -> Self {
        match message {
            Some(message) => Outcome::Message(message),
            None => Outcome::Valid,
        }
    }
}

impl From<Option<&str>> for Outcome {
    fn from(message: Option<&str>) -> Self {
        match message {
            Some(message) => Outcome::Message(message.to_string()),
            None => Outcome::Valid,
        }
    }
}
