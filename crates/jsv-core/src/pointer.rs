//! # JSON Pointer
//!
//! RFC 6901 pointers used in two places:
//!
//! - as the *instance location* of a validation error (`/items/0/name`),
//! - as the *schema location* walked during `$ref` resolution, one token
//!   at a time: every keyword consumes the tokens it owns via
//!   [`Pointer::head`] / [`Pointer::tail`] and hands the remainder on.
//!
//! Parsing accepts both the plain form (`/a/b`) and the URI fragment form
//! (`#/a/b`). `~0` and `~1` are unescaped on parse and re-escaped on
//! display.

use std::fmt;

use serde_json::Value;

use crate::error::PointerError;

/// A parsed JSON Pointer: a sequence of unescaped reference tokens.
///
/// The empty pointer refers to the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer {
    tokens: Vec<String>,
}

impl Pointer {
    /// The empty pointer.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a pointer string, with or without a leading `#`.
    ///
    /// # Errors
    ///
    /// Returns [`PointerError`] when a non-empty pointer does not begin
    /// with `/` or a token contains an invalid `~` escape.
    pub fn parse(s: &str) -> Result<Self, PointerError> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.is_empty() {
            return Ok(Self::root());
        }
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| PointerError::MissingLeadingSlash(s.to_string()))?;
        let tokens = rest
            .split('/')
            .map(unescape_token)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tokens })
    }

    /// Build a pointer from already-unescaped tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// The first token, or `None` for the empty pointer.
    pub fn head(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Everything after the first token.
    pub fn tail(&self) -> Pointer {
        Self {
            tokens: self.tokens.iter().skip(1).cloned().collect(),
        }
    }

    /// A new pointer with `token` appended.
    pub fn descendant(&self, token: impl Into<String>) -> Pointer {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Self { tokens }
    }

    /// Append `token` in place.
    pub fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    /// Remove and return the last token.
    pub fn pop(&mut self) -> Option<String> {
        self.tokens.pop()
    }

    /// True for the empty pointer.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// The unescaped tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Walk `document` along this pointer.
    ///
    /// Array tokens must be canonical decimal indices (no leading zeros,
    /// no sign). Returns `None` if any step is missing.
    pub fn eval<'v>(&self, document: &'v Value) -> Option<&'v Value> {
        self.tokens.iter().try_fold(document, |node, token| match node {
            Value::Object(map) => map.get(token),
            Value::Array(items) => parse_index(token).and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", escape_token(token))?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse a canonical array index token.
pub fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || (token.len() > 1 && token.starts_with('0')) {
        return None;
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Escape `~` and `/` for use inside a pointer string.
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_token(raw: &str) -> Result<String, PointerError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => {
                return Err(PointerError::InvalidEscape {
                    token: raw.to_string(),
                })
            }
        }
    }
    Ok(out)
}

/// Append `token` to the fragment of a schema URI.
///
/// `https://x/s.json` + `properties` → `https://x/s.json#/properties`;
/// a URI that already has a fragment gets the token appended to it.
pub fn join_uri_token(uri: &str, token: &str) -> String {
    let escaped = escape_token(token);
    if uri.contains('#') {
        format!("{uri}/{escaped}")
    } else {
        format!("{uri}#/{escaped}")
    }
}
