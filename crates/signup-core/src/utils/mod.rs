//! Utility helpers.
//!
//! - [`text`] - Name casing and whitespace normalization

pub mod text;

pub use text::{capfirst, title_case_words};
