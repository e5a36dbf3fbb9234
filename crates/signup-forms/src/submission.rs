//! Submitting a registration.
//!
//! [`SubmissionHandler::submit`] runs one attempt through
//!
//! ```text
//! Idle -> Validating -> ValidationFailed                      -> Idle
//!                    -> Uploading -> UploadFailed             -> Idle
//!                                 -> Uploaded (output shown)  -> Idle
//! ```
//!
//! Validation errors are written into the form next to their fields. When
//! validation passes, the avatar is uploaded under its own file name to the
//! configured bucket, and only after the upload succeeds is the record
//! pretty-printed and kept as the latest output. A failed upload is not
//! retried: it is returned to the caller and shown on the form as a
//! form-level error, and the form stays editable for another attempt.
//!
//! One handler runs at most one attempt at a time. A second `submit` while
//! one is in flight fails with [`SignupError::SubmissionInProgress`] and
//! leaves its form untouched. The in-flight flag is released when the
//! attempt finishes or when its future is dropped.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::Instrument;
use uuid::Uuid;

use signup_core::error::{SignupError, SignupResult};
use signup_core::logging::submission_span;
use signup_core::settings::Settings;
use signup_storage::{storage_from_settings, Storage};

use crate::form::FormState;
use crate::schema::{RegistrationSchema, UserRegistration};
use crate::serialization::to_pretty_json;

/// Where a submission attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// No attempt in flight.
    Idle,
    /// Running the schema over the form.
    Validating,
    /// The last attempt stopped at validation.
    ValidationFailed,
    /// Waiting for the storage backend.
    Uploading,
    /// The last attempt's upload failed.
    UploadFailed,
    /// The last attempt uploaded the avatar and produced output.
    Uploaded,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::ValidationFailed => "validation_failed",
            Self::Uploading => "uploading",
            Self::UploadFailed => "upload_failed",
            Self::Uploaded => "uploaded",
        };
        f.write_str(name)
    }
}

/// The result of a successful attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// The attempt id, also recorded on every log line of the attempt.
    pub id: Uuid,
    /// The validated, normalized record.
    pub record: UserRegistration,
    /// The bucket the avatar was uploaded to.
    pub bucket: String,
    /// The object key of the avatar (its file name).
    pub key: String,
    /// The record as pretty-printed JSON.
    pub output: String,
}

/// Validates a [`FormState`], uploads the avatar, and presents the record.
pub struct SubmissionHandler {
    storage: Arc<dyn Storage>,
    bucket: String,
    schema: RegistrationSchema,
    in_flight: AtomicBool,
    state: Mutex<SubmissionState>,
    last_outcome: Mutex<Option<SubmissionState>>,
    last_output: Mutex<Option<String>>,
}

impl fmt::Debug for SubmissionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionHandler")
            .field("storage", &self.storage.backend_name())
            .field("bucket", &self.bucket)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Holds the in-flight flag for one attempt and returns the handler to
/// `Idle` when dropped.
struct InFlight<'a> {
    handler: &'a SubmissionHandler,
}

impl<'a> InFlight<'a> {
    fn acquire(handler: &'a SubmissionHandler) -> Option<Self> {
        handler
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { handler })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.handler.set_state(SubmissionState::Idle);
        self.handler.in_flight.store(false, Ordering::Release);
    }
}

fn locked<T: Copy>(mutex: &Mutex<T>) -> T {
    *mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SubmissionHandler {
    /// Creates a handler uploading to `bucket` with the default schema.
    pub fn new(storage: Arc<dyn Storage>, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
            schema: RegistrationSchema::default(),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(SubmissionState::Idle),
            last_outcome: Mutex::new(None),
            last_output: Mutex::new(None),
        }
    }

    /// Creates a handler from settings: backend, bucket, and schema limits.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(storage_from_settings(&settings.storage), settings.storage.bucket.clone())
            .with_schema(RegistrationSchema::new(&settings.registration))
    }

    /// Replaces the schema.
    #[must_use]
    pub fn with_schema(mut self, schema: RegistrationSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Returns the bucket avatars are uploaded to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the current state.
    pub fn state(&self) -> SubmissionState {
        locked(&self.state)
    }

    /// Returns how the latest finished attempt ended.
    pub fn last_outcome(&self) -> Option<SubmissionState> {
        locked(&self.last_outcome)
    }

    /// Returns `true` while an attempt is in flight.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Returns the output of the latest successful attempt.
    pub fn last_output(&self) -> Option<String> {
        self.last_output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_state(&self, next: SubmissionState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != next {
            tracing::debug!(from = %*state, to = %next, "submission state changed");
            *state = next;
        }
    }

    fn finish(&self, outcome: SubmissionState) {
        self.set_state(outcome);
        *self.last_outcome.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
    }

    /// Runs one submission attempt for `form`.
    ///
    /// On validation failure the form's errors are replaced and
    /// [`SignupError::Validation`] is returned. On upload failure the error is
    /// added to the form's non-field errors and [`SignupError::Upload`] is
    /// returned; no output is produced.
    pub async fn submit(&self, form: &mut FormState) -> SignupResult<Submission> {
        let Some(_guard) = InFlight::acquire(self) else {
            tracing::warn!("submission rejected: another submission is in progress");
            return Err(SignupError::SubmissionInProgress);
        };

        let id = Uuid::new_v4();
        self.run(id, form)
            .instrument(submission_span(&id.to_string()))
            .await
    }

    async fn run(&self, id: Uuid, form: &mut FormState) -> SignupResult<Submission> {
        self.set_state(SubmissionState::Validating);
        let record = match form.validate(&self.schema) {
            Ok(record) => record,
            Err(errors) => {
                tracing::info!(errors = errors.len(), "validation failed");
                self.finish(SubmissionState::ValidationFailed);
                return Err(SignupError::Validation(errors));
            }
        };

        self.set_state(SubmissionState::Uploading);
        let key = record.avatar.name.clone();
        tracing::info!(
            backend = self.storage.backend_name(),
            bucket = %self.bucket,
            key = %key,
            size = record.avatar.size,
            "uploading avatar"
        );
        if let Err(e) = self.storage.upload(&self.bucket, &key, &record.avatar.content).await {
            tracing::warn!(error = %e, bucket = %self.bucket, key = %key, "avatar upload failed");
            form.add_non_field_error(e.to_string());
            self.finish(SubmissionState::UploadFailed);
            return Err(SignupError::Upload(e));
        }

        let output = to_pretty_json(&record)?;
        *self.last_output.lock().unwrap_or_else(PoisonError::into_inner) = Some(output.clone());
        self.finish(SubmissionState::Uploaded);
        tracing::info!(techs = record.techs.len(), "registration submitted");

        Ok(Submission {
            id,
            record,
            bucket: self.bucket.clone(),
            key,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use signup_core::error::UploadError;
    use signup_storage::{InMemoryStorage, UploadedFile};
    use tokio::sync::Notify;

    use crate::schema::{AVATAR, EMAIL, NAME, PASSWORD, TECHS};

    fn valid_form() -> FormState {
        let mut form = FormState::registration();
        form.set_field(AVATAR, UploadedFile::new("me.png", "image/png", vec![7; 16])).unwrap();
        form.set_field(NAME, "  grace   hopper ").unwrap();
        form.set_field(EMAIL, "grace@github.com").unwrap();
        form.set_field(PASSWORD, "cobol!").unwrap();
        let techs = form.array_mut(TECHS).unwrap();
        techs.append_default();
        techs.append_default();
        form.set_field("techs.0.title", "COBOL").unwrap();
        form.set_field("techs.0.knowledge", "100").unwrap();
        form.set_field("techs.1.title", "Fortran").unwrap();
        form.set_field("techs.1.knowledge", 60_i64).unwrap();
        form
    }

    #[derive(Debug)]
    struct RejectingStorage;

    #[async_trait]
    impl Storage for RejectingStorage {
        async fn upload(
            &self,
            _bucket: &str,
            _key: &str,
            _bytes: &[u8],
        ) -> Result<(), UploadError> {
            Err(UploadError::Rejected("quota exceeded".into()))
        }

        fn backend_name(&self) -> &'static str {
            "rejecting"
        }
    }

    /// Signals when an upload starts, then waits to be released.
    #[derive(Debug, Default)]
    struct GatedStorage {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Storage for GatedStorage {
        async fn upload(
            &self,
            _bucket: &str,
            _key: &str,
            _bytes: &[u8],
        ) -> Result<(), UploadError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "gated"
        }
    }

    #[tokio::test]
    async fn test_successful_submission_uploads_then_outputs() {
        let storage = InMemoryStorage::new();
        let handler = SubmissionHandler::new(Arc::new(storage.clone()), "avatars");
        let mut form = valid_form();

        let submission = handler.submit(&mut form).await.unwrap();

        assert_eq!(submission.key, "me.png");
        assert_eq!(submission.bucket, "avatars");
        assert_eq!(submission.record.name, "Grace Hopper");
        assert_eq!(storage.get("avatars", "me.png").await, Some(vec![7; 16]));
        assert_eq!(handler.last_output(), Some(submission.output.clone()));
        assert!(submission.output.contains("\"name\": \"Grace Hopper\""));
        assert_eq!(handler.state(), SubmissionState::Idle);
        assert_eq!(handler.last_outcome(), Some(SubmissionState::Uploaded));
        assert!(!form.has_errors());
    }

    #[tokio::test]
    async fn test_validation_failure_skips_upload() {
        let storage = InMemoryStorage::new();
        let handler = SubmissionHandler::new(Arc::new(storage.clone()), "avatars");
        let mut form = valid_form();
        form.set_field(EMAIL, "grace@navy.mil").unwrap();

        let err = handler.submit(&mut form).await.unwrap_err();

        match err {
            SignupError::Validation(errors) => {
                assert_eq!(errors.message(EMAIL), Some("Email must end with @github.com"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(form.error(EMAIL), Some("Email must end with @github.com"));
        assert_eq!(storage.object_count().await, 0);
        assert!(handler.last_output().is_none());
        assert_eq!(handler.last_outcome(), Some(SubmissionState::ValidationFailed));
        assert_eq!(handler.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_upload_failure_is_reported_not_displayed() {
        let handler = SubmissionHandler::new(Arc::new(RejectingStorage), "avatars");
        let mut form = valid_form();

        let err = handler.submit(&mut form).await.unwrap_err();

        assert!(matches!(err, SignupError::Upload(UploadError::Rejected(_))));
        assert_eq!(
            form.non_field_errors().to_vec(),
            vec!["Upload rejected: quota exceeded".to_string()]
        );
        assert!(handler.last_output().is_none());
        assert_eq!(handler.last_outcome(), Some(SubmissionState::UploadFailed));
        assert!(!handler.is_submitting());
    }

    #[tokio::test]
    async fn test_resubmit_after_upload_failure_clears_form_error() {
        let handler = SubmissionHandler::new(Arc::new(RejectingStorage), "avatars");
        let mut form = valid_form();
        assert!(handler.submit(&mut form).await.is_err());
        assert_eq!(form.non_field_errors().len(), 1);

        let handler = SubmissionHandler::new(Arc::new(InMemoryStorage::new()), "avatars");
        assert!(handler.submit(&mut form).await.is_ok());
        assert!(form.non_field_errors().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_file_name_fails_upload() {
        let handler = SubmissionHandler::new(Arc::new(InMemoryStorage::new()), "avatars");
        let mut form = valid_form();
        form.set_field(AVATAR, UploadedFile::new("../me.png", "image/png", vec![1])).unwrap();

        let err = handler.submit(&mut form).await.unwrap_err();
        assert!(matches!(err, SignupError::Upload(UploadError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_rejected() {
        let storage = Arc::new(GatedStorage::default());
        let handler = Arc::new(SubmissionHandler::new(storage.clone(), "avatars"));

        let first = {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let mut form = valid_form();
                handler.submit(&mut form).await
            })
        };
        storage.started.notified().await;

        assert!(handler.is_submitting());
        assert_eq!(handler.state(), SubmissionState::Uploading);

        let mut other = valid_form();
        other.set_field(NAME, "").unwrap();
        let err = handler.submit(&mut other).await.unwrap_err();
        assert!(matches!(err, SignupError::SubmissionInProgress));
        assert!(other.error(NAME).is_none());

        storage.release.notify_one();
        let submission = first.await.unwrap().unwrap();
        assert_eq!(submission.record.techs.len(), 2);
        assert!(!handler.is_submitting());
    }

    #[tokio::test]
    async fn test_dropped_submission_releases_guard() {
        let storage = Arc::new(GatedStorage::default());
        let handler = SubmissionHandler::new(storage, "avatars");
        let mut form = valid_form();

        let result =
            tokio::time::timeout(Duration::from_millis(20), handler.submit(&mut form)).await;
        assert!(result.is_err());

        assert!(!handler.is_submitting());
        assert_eq!(handler.state(), SubmissionState::Idle);
        assert!(handler.last_output().is_none());
    }

    #[tokio::test]
    async fn test_from_settings_uses_bucket_and_limits() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.storage.location = dir.path().to_path_buf();
        settings.storage.bucket = "faces".into();
        settings.registration.min_techs = 3;

        let handler = SubmissionHandler::from_settings(&settings);
        assert_eq!(handler.bucket(), "faces");

        let mut form = valid_form();
        let err = handler.submit(&mut form).await.unwrap_err();
        assert!(matches!(err, SignupError::Validation(_)));
        assert_eq!(form.error(TECHS), Some("Add at least 3 technologies"));

        form.array_mut(TECHS).unwrap().append_default();
        form.set_field("techs.2.title", "Lisp").unwrap();
        form.set_field("techs.2.knowledge", "5").unwrap();
        handler.submit(&mut form).await.unwrap();
        assert!(dir.path().join("faces").join("me.png").exists());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SubmissionState::UploadFailed.to_string(), "upload_failed");
        assert_eq!(SubmissionState::Idle.to_string(), "idle");
    }
}
