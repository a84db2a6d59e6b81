//! # Invalid Value Rendering
//!
//! Turns the value carried by a [`KeyError`](crate::KeyError) into text
//! that is safe to put in a one-line diagnostic.
//!
//! 1. Serialize to compact JSON. A serialization failure renders as the
//!    empty string; it is never surfaced, since it would mask the
//!    validation failure being reported.
//! 2. Collapse every run of `\n` / `\r` into a single space.
//! 3. If the process-wide limit is non-negative and the text is longer
//!    (in characters), keep `limit` characters and append [`ELLIPSIS`].
//!
//! The limit is read on every call. Truncation only affects display and
//! never the validity decision.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::Serialize;

/// Default maximum rendered length of an invalid value.
pub const DEFAULT_MAX_KEYWORD_ERR_STRING_LEN: i64 = 20;

/// Limit value that disables truncation.
pub const NO_TRUNCATION: i64 = -1;

/// Marker appended to truncated values.
pub const ELLIPSIS: &str = "...";

static MAX_KEYWORD_ERR_STRING_LEN: AtomicI64 = AtomicI64::new(DEFAULT_MAX_KEYWORD_ERR_STRING_LEN);

/// Current maximum rendered length. `-1` means unlimited.
pub fn max_keyword_err_string_len() -> i64 {
    MAX_KEYWORD_ERR_STRING_LEN.load(Ordering::Relaxed)
}

/// Set the maximum rendered length. `-1` disables truncation; any other
/// negative value is treated the same way.
pub fn set_max_keyword_err_string_len(len: i64) {
    MAX_KEYWORD_ERR_STRING_LEN.store(len, Ordering::Relaxed);
}

/// Render `value` using the process-wide limit.
pub fn invalid_value_string<T: Serialize + ?Sized>(value: &T) -> String {
    invalid_value_string_with_limit(value, max_keyword_err_string_len())
}

/// Render `value` with an explicit limit instead of the process-wide one.
pub fn invalid_value_string_with_limit<T: Serialize + ?Sized>(value: &T, limit: i64) -> String {
    let rendered = match serde_json::to_string(value) {
        Ok(s) => s,
        Err(e) => {
            tracing::trace!(error = %e, "invalid value is not serializable; rendering empty");
            return String::new();
        }
    };
    truncate(collapse_line_breaks(&rendered), limit)
}

fn collapse_line_breaks(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_break = false;
    for c in s.chars() {
        if c == '\n' || c == '\r' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}

fn truncate(s: String, limit: i64) -> String {
    let Ok(limit) = usize::try_from(limit) else {
        return s;
    };
    match s.char_indices().nth(limit) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + ELLIPSIS.len());
            out.push_str(&s[..cut]);
            out.push_str(ELLIPSIS);
            out
        }
        None => s,
    }
}

/// Serializes tests that touch the process-wide limit.
#[cfg(test)]
pub(crate) fn tunable_guard() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("nope"))
        }
    }

    #[test]
    fn truncates_to_limit_and_appends_ellipsis() {
        // "hello world" serializes with quotes: 13 chars.
        let out = invalid_value_string_with_limit("hello world", 5);
        assert_eq!(out, "\"hell...");
        assert_eq!(out.chars().count(), 5 + ELLIPSIS.len());
    }

    #[test]
    fn eleven_char_form_is_cut_to_five_or_kept_whole() {
        let v = json!([1234, 5678]);
        assert_eq!(serde_json::to_string(&v).unwrap().chars().count(), 11);
        assert_eq!(invalid_value_string_with_limit(&v, 5), "[1234...");
        assert_eq!(invalid_value_string_with_limit(&v, NO_TRUNCATION), "[1234,5678]");
    }

    #[test]
    fn minus_one_disables_truncation() {
        let long = "x".repeat(500);
        let out = invalid_value_string_with_limit(&long, NO_TRUNCATION);
        assert_eq!(out.len(), 502);
        assert!(!out.ends_with(ELLIPSIS));
    }

    #[test]
    fn value_at_limit_is_untouched() {
        assert_eq!(invalid_value_string_with_limit(&json!(12345), 5), "12345");
        assert_eq!(invalid_value_string_with_limit(&json!(123456), 5), "12345...");
    }

    #[test]
    fn zero_limit_keeps_only_ellipsis() {
        assert_eq!(invalid_value_string_with_limit(&json!(true), 0), "...");
    }

    #[test]
    fn serialization_failure_renders_empty() {
        assert_eq!(invalid_value_string_with_limit(&Unserializable, 20), "");
    }

    #[test]
    fn line_breaks_collapse_to_single_spaces() {
        assert_eq!(collapse_line_breaks("a\n\rb\nc\r\n\nd"), "a b c d");
        // Pretty output would contain newlines; compact JSON escapes them
        // inside strings, so the rendered value stays single-line.
        let out = invalid_value_string_with_limit(&json!("line1\nline2"), NO_TRUNCATION);
        assert_eq!(out, r#""line1\nline2""#);
        assert!(!out.contains('\n'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let out = invalid_value_string_with_limit(&json!("ééééééé"), 3);
        assert_eq!(out, "\"éé...");
    }

    #[test]
    fn global_limit_is_read_on_every_call() {
        let _guard = tunable_guard();
        let saved = max_keyword_err_string_len();

        set_max_keyword_err_string_len(4);
        assert_eq!(invalid_value_string(&json!("abcdef")), "\"abc...");

        set_max_keyword_err_string_len(NO_TRUNCATION);
        assert_eq!(invalid_value_string(&json!("abcdef")), "\"abcdef\"");

        set_max_keyword_err_string_len(saved);
    }
}
