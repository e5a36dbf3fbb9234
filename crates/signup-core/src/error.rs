//! Core error types for signup-rs.
//!
//! Errors are either field-scoped ([`ValidationError`], keyed by field path)
//! or submission-scoped ([`UploadError`], [`SignupError::SubmissionInProgress`]).
//! There is no global error channel: everything surfaces either next to a
//! field or as the result of one submission attempt.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// The reserved error key for submission-level (non-field) errors.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// A single error message attached to one field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The human-readable message shown next to the field.
    pub message: String,
    /// A short code identifying the failed rule (e.g. "required", "max_size").
    pub code: String,
}

impl FieldError {
    /// Creates a new `FieldError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Joins a parent segment and a relative field path.
///
/// An empty relative path refers to the parent itself.
///
/// # Examples
///
/// ```
/// use signup_core::error::join_path;
///
/// assert_eq!(join_path("techs", ""), "techs");
/// assert_eq!(join_path("techs", "0.title"), "techs.0.title");
/// assert_eq!(join_path("", "name"), "name");
/// ```
pub fn join_path(parent: &str, relative: &str) -> String {
    match (parent.is_empty(), relative.is_empty()) {
        (true, _) => relative.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{parent}.{relative}"),
    }
}

/// A set of validation failures, one per offending field path.
///
/// Paths are relative to whatever value was validated; object and list
/// validators re-root them with [`prefixed`](Self::prefixed) so that the
/// top-level result is keyed by full paths such as `techs.1.knowledge`.
/// The empty path denotes the validated value itself.
///
/// # Examples
///
/// ```
/// use signup_core::error::ValidationError;
///
/// let mut err = ValidationError::single("Title is necessary", "required").prefixed("title");
/// let knowledge = ValidationError::single("Knowledge must be a number", "invalid");
/// err.merge(knowledge.prefixed("knowledge"));
/// let err = err.prefixed("0").prefixed("techs");
///
/// assert_eq!(err.message("techs.0.title"), Some("Title is necessary"));
/// assert_eq!(err.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    field_errors: BTreeMap<String, FieldError>,
}

impl ValidationError {
    /// Creates an empty `ValidationError`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error attached to the validated value itself (empty path).
    pub fn single(message: impl Into<String>, code: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.insert("", FieldError::new(message, code));
        err
    }

    /// Records an error at `path`. The first error recorded for a path wins.
    pub fn insert(&mut self, path: impl Into<String>, error: FieldError) {
        self.field_errors.entry(path.into()).or_insert(error);
    }

    /// Moves every error from `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        for (path, error) in other.field_errors {
            self.insert(path, error);
        }
    }

    /// Re-roots every path under `segment`.
    #[must_use]
    pub fn prefixed(self, segment: &str) -> Self {
        let field_errors = self
            .field_errors
            .into_iter()
            .map(|(path, error)| (join_path(segment, &path), error))
            .collect();
        Self { field_errors }
    }

    /// Returns `true` if no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// Returns the number of offending field paths.
    pub fn len(&self) -> usize {
        self.field_errors.len()
    }

    /// Returns the error recorded at `path`, if any.
    pub fn get(&self, path: &str) -> Option<&FieldError> {
        self.field_errors.get(path)
    }

    /// Returns the message recorded at `path`, if any.
    pub fn message(&self, path: &str) -> Option<&str> {
        self.get(path).map(|e| e.message.as_str())
    }

    /// Iterates over `(path, error)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.field_errors.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flattens into a `path -> message` map, the shape the rendering layer consumes.
    pub fn messages(&self) -> BTreeMap<String, String> {
        self.field_errors
            .iter()
            .map(|(k, v)| (k.clone(), v.message.clone()))
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, error) in &self.field_errors {
            if !first {
                write!(f, "; ")?;
            }
            if path.is_empty() {
                write!(f, "{error}")?;
            } else {
                write!(f, "{path}: {error}")?;
            }
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Failure reported by the storage collaborator.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The object key is empty or would escape the bucket.
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// The target bucket does not exist and cannot be created.
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// The backend refused the object.
    #[error("Upload rejected: {0}")]
    Rejected(String),

    /// An I/O error occurred while writing the object.
    #[error("Upload I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The primary error type for signup-rs.
#[derive(Error, Debug)]
pub enum SignupError {
    /// One or more fields failed validation.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// The avatar upload failed after validation succeeded.
    #[error("{0}")]
    Upload(UploadError),

    /// A submission of the same form is already in flight.
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    /// A field path that the form does not bind.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The record could not be serialized or parsed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for SignupError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<UploadError> for SignupError {
    fn from(err: UploadError) -> Self {
        Self::Upload(err)
    }
}

/// A convenience type alias for `Result<T, SignupError>`.
pub type SignupResult<T> = Result<T, SignupError>;
