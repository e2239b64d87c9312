//! Error types for the conversion engine.
//!
//! Conversion itself never fails loudly: a rule that cannot produce a value
//! returns nothing and may record a [`ConversionError`] on the request's
//! context. Registration errors are returned as plain `Result`s.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ConversionError   - why a value could not be converted (recorded, not raised)
//! Rejection         - a ConversionError paired with the offending value
//! RegistrationError - type table misuse (duplicate names, bad aliases)
//! ```

use std::fmt;

use thiserror::Error;

use crate::Value;

// ============================================================================
// Conversion Errors
// ============================================================================

/// The reason a rule rejected its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Text could not be read as a number of the requested kind.
    #[error("invalid {kind} literal '{input}': {detail}")]
    InvalidNumber {
        kind: &'static str,
        input: String,
        detail: String,
    },

    /// Text names no constant of the target enumeration.
    #[error("'{input}' is not a constant of {enum_name}")]
    UnknownConstant { enum_name: String, input: String },

    /// Text is not a well-formed value of a structured type (url, uri, uuid, ...).
    #[error("malformed {kind} '{input}': {detail}")]
    Malformed {
        kind: &'static str,
        input: String,
        detail: String,
    },

    /// Text could not be parsed as a date or time.
    #[error("cannot parse '{input}' as {kind} using {pattern}: {detail}")]
    DateTime {
        kind: &'static str,
        input: String,
        pattern: String,
        detail: String,
    },

    /// The named character set is not supported.
    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// The code is not an ISO 4217 currency.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Reading a stream failed.
    #[error("i/o failure: {0}")]
    Io(String),

    /// Bytes are not valid in the context charset.
    #[error("input is not valid {charset}: {detail}")]
    Decode {
        charset: &'static str,
        detail: String,
    },

    /// Free-form failure raised by a user rule.
    #[error("{0}")]
    Other(String),
}

impl ConversionError {
    /// Shorthand for a [`ConversionError::Malformed`].
    pub fn malformed(kind: &'static str, input: impl Into<String>, detail: impl fmt::Display) -> Self {
        ConversionError::Malformed {
            kind,
            input: input.into(),
            detail: detail.to_string(),
        }
    }
}

impl From<std::io::Error> for ConversionError {
    fn from(err: std::io::Error) -> Self {
        ConversionError::Io(err.to_string())
    }
}

/// A recorded rejection: the error and, when known, the value that caused it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub value: Option<Value>,
    pub error: ConversionError,
}

impl Rejection {
    pub fn new(value: Option<Value>, error: ConversionError) -> Self {
        Self { value, error }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "rejected {}: {}", value, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating a [`TypeTable`](crate::TypeTable).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A type with the same name is already registered.
    #[error("duplicate type: '{0}'")]
    DuplicateType(String),

    /// The alias name is already bound.
    #[error("duplicate type alias: '{0}'")]
    DuplicateAlias(String),

    /// A referenced type is not registered.
    #[error("type not found: {0}")]
    TypeNotFound(String),

    /// An enumeration declaration is unusable.
    #[error("invalid enum '{name}': {reason}")]
    InvalidEnum { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_display() {
        let err = ConversionError::InvalidNumber {
            kind: "int32",
            input: "abc".into(),
            detail: "invalid digit found in string".into(),
        };
        assert_eq!(err.to_string(), "invalid int32 literal 'abc': invalid digit found in string");

        let err = ConversionError::malformed("uuid", "xyz", "invalid length");
        assert_eq!(err.to_string(), "malformed uuid 'xyz': invalid length");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: ConversionError = io.into();
        assert_eq!(err, ConversionError::Io("eof".into()));
    }

    #[test]
    fn rejection_display() {
        let rejection = Rejection::new(
            Some(Value::from("abc")),
            ConversionError::UnknownCurrency("abc".into()),
        );
        assert_eq!(rejection.to_string(), "rejected abc: unknown currency code: abc");

        let bare = Rejection::new(None, ConversionError::Io("closed".into()));
        assert_eq!(bare.to_string(), "i/o failure: closed");
    }

    #[test]
    fn registration_error_display() {
        let err = RegistrationError::DuplicateType("Animal".into());
        assert_eq!(err.to_string(), "duplicate type: 'Animal'");
    }
}
