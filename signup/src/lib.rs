//! # signup
//!
//! Schema-validated user registration forms with avatar upload.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `signup` to get everything, or on individual crates for
//! finer-grained control.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use signup::forms::{FormState, SubmissionHandler};
//! use signup::storage::{InMemoryStorage, UploadedFile};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let handler = SubmissionHandler::new(Arc::new(InMemoryStorage::new()), "avatars");
//!
//! let mut form = FormState::registration();
//! form.set_field("avatar", UploadedFile::new("me.png", "image/png", vec![1, 2, 3])).unwrap();
//! form.set_field("name", "ada lovelace").unwrap();
//! form.set_field("email", "ada@github.com").unwrap();
//! form.set_field("password", "engines").unwrap();
//! for (title, knowledge) in [("Rust", "90"), ("Go", "40")] {
//!     let techs = form.array_mut("techs").unwrap();
//!     techs.append_default();
//!     let index = techs.len() - 1;
//!     form.set_field(&format!("techs.{index}.title"), title).unwrap();
//!     form.set_field(&format!("techs.{index}.knowledge"), knowledge).unwrap();
//! }
//!
//! let submission = handler.submit(&mut form).await.unwrap();
//! assert_eq!(submission.record.name, "Ada Lovelace");
//! # }
//! ```

/// Settings, error types, logging, and text helpers.
pub use signup_core as core;

/// The storage collaborator: upload trait and backends.
#[cfg(feature = "storage")]
pub use signup_storage as storage;

/// Validators, form state, field arrays, and submission.
#[cfg(feature = "forms")]
pub use signup_forms as forms;

// Third-party re-exports
pub use async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use tracing_subscriber;

/// Commonly used types, importable with `use signup::prelude::*`.
pub mod prelude {
    pub use signup_core::{
        FieldError, RegistrationSettings, Settings, SignupError, SignupResult, StorageBackend,
        StorageSettings, UploadError, ValidationError,
    };

    #[cfg(feature = "storage")]
    pub use signup_storage::{FileSystemStorage, InMemoryStorage, Storage, UploadedFile};

    #[cfg(feature = "forms")]
    pub use signup_forms::{
        EntryId, FieldArray, FormState, RawValue, RegistrationSchema, Submission, SubmissionHandler,
        SubmissionState, TechEntry, UserRegistration, Validator,
    };
}
