//! Last-error record kept on cells and iterators.
//!
//! Every fallible operation returns a `Result`. For callers that prefer the
//! inspect-then-clear style, the failure is also copied into an
//! [`Exception`] slot on the object that failed. There is no queue: a new
//! failure overwrites the previous record.

use std::fmt;

/// Severity of a recorded exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// The operation completed but something looked wrong.
    Warning,
    /// The operation failed; the object is still usable.
    Error,
    /// The operation failed and produced nothing.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// A recorded failure: severity, a short reason and an optional detail.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exception {
    /// How bad it was.
    pub severity: Severity,
    /// Short reason, e.g. `"row acquisition failed"`.
    pub reason: String,
    /// Underlying error message, if any.
    pub description: Option<String>,
}

impl Exception {
    /// Creates an exception without a description.
    pub fn new(severity: Severity, reason: impl Into<String>) -> Self {
        Self {
            severity,
            reason: reason.into(),
            description: None,
        }
    }

    /// Creates an exception from an error value, using its message as the description.
    pub fn from_error(severity: Severity, reason: impl Into<String>, err: &dyn std::error::Error) -> Self {
        Self {
            severity,
            reason: reason.into(),
            description: Some(err.to_string()),
        }
    }
}

/// Formats as `reason (description)`.
impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)?;
        if let Some(description) = &self.description {
            write!(f, " ({description})")?;
        }
        Ok(())
    }
}
