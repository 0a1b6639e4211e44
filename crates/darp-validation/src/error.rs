//! Validation error types with detailed rejection reasons.

use std::fmt;
use thiserror::Error;

/// The kind of validation error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Input was empty when a value was required.
    Empty,
    /// Input exceeded maximum allowed length.
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length of input.
        actual: usize,
    },
    /// Input contained invalid characters.
    InvalidCharacters {
        /// Description of invalid characters found.
        found: String,
        /// Description of allowed characters.
        allowed: String,
    },
    /// Input contained dangerous shell metacharacters.
    ShellInjection {
        /// The dangerous character found.
        found: char,
    },
    /// Input did not match expected format.
    InvalidFormat {
        /// Expected format description.
        expected: String,
        /// What was actually provided.
        actual: String,
    },
    /// Numeric value was out of allowed range.
    OutOfRange {
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
        /// Actual value provided.
        actual: u64,
    },
    /// Input contained null bytes.
    NullByte,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "input cannot be empty"),
            Self::TooLong { max, actual } => {
                write!(f, "input too long: {actual} chars exceeds max of {max}")
            }
            Self::InvalidCharacters { found, allowed } => {
                write!(f, "invalid characters '{found}': allowed: {allowed}")
            }
            Self::ShellInjection { found } => {
                write!(f, "shell metacharacter '{}' not allowed", found.escape_default())
            }
            Self::InvalidFormat { expected, actual } => {
                write!(f, "invalid format: expected {expected}, got '{actual}'")
            }
            Self::OutOfRange { min, max, actual } => {
                write!(f, "value {actual} out of range [{min}, {max}]")
            }
            Self::NullByte => write!(f, "input contains null byte"),
        }
    }
}

/// Error returned when validation fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed for '{field}': {kind}")]
pub struct ValidationError {
    /// The name of the field that failed validation.
    pub field: String,
    /// The kind of validation error.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    /// Create an "empty" validation error.
    #[must_use]
    pub fn empty(field: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorKind::Empty)
    }

    /// Create a "too long" validation error.
    #[must_use]
    pub fn too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        Self::new(field, ValidationErrorKind::TooLong { max, actual })
    }

    /// Create an "invalid characters" validation error.
    #[must_use]
    pub fn invalid_characters(
        field: impl Into<String>,
        found: impl Into<String>,
        allowed: impl Into<String>,
    ) -> Self {
        Self::new(
            field,
            ValidationErrorKind::InvalidCharacters {
                found: found.into(),
                allowed: allowed.into(),
            },
        )
    }

    /// Create a "shell injection" validation error.
    #[must_use]
    pub fn shell_injection(field: impl Into<String>, found: char) -> Self {
        Self::new(field, ValidationErrorKind::ShellInjection { found })
    }

    /// Create an "invalid format" validation error.
    #[must_use]
    pub fn invalid_format(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(
            field,
            ValidationErrorKind::InvalidFormat {
                expected: expected.into(),
                actual: actual.into(),
            },
        )
    }

    /// Create an "out of range" validation error.
    #[must_use]
    pub fn out_of_range(field: impl Into<String>, min: u64, max: u64, actual: u64) -> Self {
        Self::new(field, ValidationErrorKind::OutOfRange { min, max, actual })
    }

    /// Create a "null byte" validation error.
    #[must_use]
    pub fn null_byte(field: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorKind::NullByte)
    }

    /// Check if this is an empty error.
    #[must_use]
    pub fn is_empty_error(&self) -> bool {
        matches!(self.kind, ValidationErrorKind::Empty)
    }

    /// Check if this is a security-related error (injection, null bytes).
    #[must_use]
    pub fn is_security_error(&self) -> bool {
        matches!(
            self.kind,
            ValidationErrorKind::ShellInjection { .. } | ValidationErrorKind::NullByte
        )
    }
}
