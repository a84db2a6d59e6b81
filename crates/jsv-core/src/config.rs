//! # Render Configuration
//!
//! The single process-wide tunable of the core: how many characters of an
//! invalid value are shown in a rendered [`KeyError`](crate::KeyError).
//!
//! Loaded from the `JSV_MAX_ERR_VALUE_LEN` environment variable and
//! applied to the global limit in [`crate::render`]. Callers may also
//! build the struct directly (CLI flags override the environment).

use thiserror::Error;

use crate::render::{set_max_keyword_err_string_len, DEFAULT_MAX_KEYWORD_ERR_STRING_LEN};

/// Environment variable holding the maximum rendered value length.
pub const MAX_ERR_VALUE_LEN_ENV: &str = "JSV_MAX_ERR_VALUE_LEN";

/// Error while loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held something that does not parse.
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// The raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Rendering settings for keyword errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Maximum rendered length of an invalid value; `-1` disables
    /// truncation.
    pub max_err_value_len: i64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_err_value_len: DEFAULT_MAX_KEYWORD_ERR_STRING_LEN,
        }
    }
}

impl RenderConfig {
    /// Load from the process environment, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(MAX_ERR_VALUE_LEN_ENV) {
            config.max_err_value_len = parse_limit(&raw)?;
        }
        Ok(config)
    }

    /// Install these settings as the process-wide rendering limit.
    pub fn apply(&self) {
        tracing::debug!(max_err_value_len = self.max_err_value_len, "applying render config");
        set_max_keyword_err_string_len(self.max_err_value_len);
    }
}

fn parse_limit(raw: &str) -> Result<i64, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        var: MAX_ERR_VALUE_LEN_ENV,
        value: raw.to_string(),
        reason,
    };
    let value: i64 = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if value < -1 {
        return Err(invalid("must be -1 or a non-negative length".into()));
    }
    Ok(value)
}
