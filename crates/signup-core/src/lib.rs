//! # signup-core
//!
//! Core types shared by the signup-rs crates: the error taxonomy, settings and
//! their loaders, logging setup, and text helpers. This crate has no
//! dependency on the other workspace members.
//!
//! ## Modules
//!
//! - [`error`] - Field-scoped validation errors, upload errors, and the crate-wide error enum
//! - [`settings`] - Storage and registration settings with defaults
//! - [`settings_loader`] - TOML/JSON loading with environment overrides
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - Text helpers (name normalization)

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{FieldError, SignupError, SignupResult, UploadError, ValidationError};
pub use settings::{RegistrationSettings, Settings, StorageBackend, StorageSettings};
