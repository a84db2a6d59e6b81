//! # Error Types — Keyword Failures and Operational Errors
//!
//! Two families of errors live here:
//!
//! - [`KeyError`] — a single validation failure reported by a keyword.
//!   These are data, not control flow: keywords append them to the
//!   validation state and traversal continues.
//! - [`PointerError`] — operational failure while parsing a JSON Pointer.
//!   Uses `thiserror` like every other operational error in the workspace.
//!
//! ## Rendering
//!
//! `KeyError` implements `Display` as:
//!
//! - `"<path>: <value> <message>"` when both path and value are present,
//! - `"<path>: <message>"` when only the path is present,
//! - `"<message>"` otherwise.
//!
//! The value is rendered through [`invalid_value_string`], which keeps the
//! output on one line and bounded in length.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::render::invalid_value_string;

/// A single error produced by a keyword while validating a document.
///
/// The only required field is `message`. An empty `property_path` means
/// the whole document (or an unspecified location). `invalid_value` of
/// `Some(Value::Null)` is a present value: the document held `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyError {
    /// JSON Pointer string of the document location that failed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub property_path: String,
    /// The document value that triggered the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_value: Option<Value>,
    /// Human-readable description of the failure.
    pub message: String,
}

impl KeyError {
    /// Create an error carrying only a message.
    ///
    /// `message` must not be empty; debug builds assert it.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        debug_assert!(!message.is_empty(), "KeyError message must not be empty");
        Self {
            property_path: String::new(),
            invalid_value: None,
            message,
        }
    }

    /// Attach the document location that failed.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.property_path = path.into();
        self
    }

    /// Attach the offending document value.
    pub fn with_value(mut self, value: Value) -> Self {
        self.invalid_value = Some(value);
        self
    }

    /// The bounded, single-line rendering of the invalid value, if any.
    pub fn invalid_value_string(&self) -> Option<String> {
        self.invalid_value.as_ref().map(invalid_value_string)
    }
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.invalid_value, self.property_path.is_empty()) {
            (Some(value), false) => write!(
                f,
                "{}: {} {}",
                self.property_path,
                invalid_value_string(value),
                self.message
            ),
            (None, false) => write!(f, "{}: {}", self.property_path, self.message),
            _ => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for KeyError {}

/// Error while parsing a JSON Pointer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// Non-empty pointer that does not start with `/`.
    #[error("json pointer must start with '/' or be empty: {0:?}")]
    MissingLeadingSlash(String),

    /// A `~` escape other than `~0` or `~1`.
    #[error("invalid escape sequence in json pointer token {token:?}")]
    InvalidEscape {
        /// The raw token containing the bad escape.
        token: String,
    },
}
