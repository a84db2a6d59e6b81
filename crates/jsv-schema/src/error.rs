//! # Schema Errors
//!
//! Operational errors raised while compiling a schema document. Document
//! validation failures are never reported here; they are
//! [`KeyError`](jsv_core::KeyError) values accumulated in the
//! [`ValidationState`](crate::ValidationState).

use thiserror::Error;

/// Error while compiling a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A schema node was neither an object nor a boolean.
    #[error("invalid schema at '{location}': {reason}")]
    InvalidSchema {
        /// Schema location (JSON Pointer) of the offending node.
        location: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A registered keyword could not load its value.
    #[error("invalid value for keyword '{keyword}' at '{location}': {reason}")]
    InvalidKeyword {
        /// Keyword name.
        keyword: String,
        /// Schema location of the keyword.
        location: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A known-but-unsupported keyword was found while the compiler was
    /// configured to reject them.
    #[error("keyword '{keyword}' at '{location}' is not supported")]
    UnsupportedKeyword {
        /// Keyword name.
        keyword: String,
        /// Schema location of the keyword.
        location: String,
    },
}

impl SchemaError {
    /// Shorthand for [`SchemaError::InvalidKeyword`].
    pub fn invalid_keyword(
        keyword: impl Into<String>,
        location: &jsv_core::Pointer,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidKeyword {
            keyword: keyword.into(),
            location: location.to_string(),
            reason: reason.into(),
        }
    }
}
