//! # signup-forms
//!
//! The registration form pipeline: raw field values are validated and
//! normalized by composable [`Validator`](fields::Validator)s, bound to a
//! [`FormState`](form::FormState) with an identity-stable list of
//! technologies, and submitted through a
//! [`SubmissionHandler`](submission::SubmissionHandler) that uploads the
//! avatar before presenting the record.
//!
//! ## Modules
//!
//! - [`value`] - Untyped raw input and field path helpers
//! - [`validators`] - Post-coercion rules (length, email, suffix, range)
//! - [`fields`] - The `Validator` trait and its combinators
//! - [`validation`] - Object-level accumulation of field errors
//! - [`schema`] - `UserRegistration` and its schema
//! - [`formset`] - The identity-stable `FieldArray`
//! - [`bound_field`] - Per-path value/error pairs for rendering
//! - [`form`] - `FormState`, the explicit two-way binding
//! - [`serialization`] - Pretty JSON output of the validated record
//! - [`submission`] - Validate, upload, present

pub mod bound_field;
pub mod fields;
pub mod form;
pub mod formset;
pub mod schema;
pub mod serialization;
pub mod submission;
pub mod validation;
pub mod validators;
pub mod value;

pub use fields::Validator;
pub use form::FormState;
pub use formset::{EntryId, FieldArray};
pub use schema::{RegistrationSchema, TechEntry, UserRegistration};
pub use submission::{Submission, SubmissionHandler, SubmissionState};
pub use value::RawValue;
