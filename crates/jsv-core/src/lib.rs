//! # jsv-core — Foundational Types for the jsv Schema Engine
//!
//! Leaf crate of the workspace. Everything a keyword needs that is not
//! itself part of the schema tree:
//!
//! - [`KeyError`] — the structured record a keyword appends when a
//!   document violates it, with single-line, length-bounded rendering.
//! - [`render`] — the invalid-value stringifier and its process-wide
//!   truncation limit (default 20, `-1` disables).
//! - [`Pointer`] — RFC 6901 JSON Pointer with token-at-a-time consumption
//!   for schema resolution and instance locations.
//! - [`RunContext`] — cancellation and deadline for a validation run.
//! - [`RenderConfig`] — environment-driven configuration of the limit.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsv-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests. Rendering failures degrade to an empty
//!   string rather than an error.

pub mod config;
pub mod context;
pub mod error;
pub mod pointer;
pub mod render;

pub use config::{ConfigError, RenderConfig};
pub use context::RunContext;
pub use error::{KeyError, PointerError};
pub use pointer::Pointer;
pub use render::{
    invalid_value_string, max_keyword_err_string_len, set_max_keyword_err_string_len,
};
