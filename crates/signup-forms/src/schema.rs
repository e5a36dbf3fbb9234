//! The registration record and its schema.
//!
//! [`RegistrationSchema`] validates the whole form in one pass and produces a
//! [`UserRegistration`]. All limits come from [`RegistrationSettings`]; the
//! messages are derived from those limits, so the defaults read exactly
//! "Max file size is 5MB", "Email must end with @github.com", and so on.

use serde::{Deserialize, Serialize};

use signup_core::error::ValidationError;
use signup_core::settings::RegistrationSettings;
use signup_core::utils::title_case_words;
use signup_storage::UploadedFile;

use crate::fields::{Integer, ListOf, Map, SingleFile, Text, Validator};
use crate::formset::Row;
use crate::validation::{clean_field, object_fields};
use crate::value::RawValue;

/// Field name of the avatar file input.
pub const AVATAR: &str = "avatar";
/// Field name of the name input.
pub const NAME: &str = "name";
/// Field name of the email input.
pub const EMAIL: &str = "email";
/// Field name of the password input.
pub const PASSWORD: &str = "password";
/// Field name of the technology list.
pub const TECHS: &str = "techs";

/// One technology the user knows, with a self-assessed level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechEntry {
    /// The technology name, trimmed.
    pub title: String,
    /// Knowledge level within the configured range.
    pub knowledge: i64,
}

/// A validated registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistration {
    /// The single avatar file.
    pub avatar: UploadedFile,
    /// The name, whitespace-collapsed with every word capitalized.
    pub name: String,
    /// The email address, trimmed.
    pub email: String,
    /// The password, exactly as typed.
    pub password: String,
    /// Technologies in display order.
    pub techs: Vec<TechEntry>,
}

/// Returns the row a newly added technology starts with.
pub fn default_tech_row() -> Row {
    Row::from([
        ("title".to_string(), RawValue::from("")),
        ("knowledge".to_string(), RawValue::Number(0.0)),
    ])
}

/// Formats a byte count the way size limits are shown to users.
///
/// # Examples
///
/// ```
/// use signup_forms::schema::describe_bytes;
///
/// assert_eq!(describe_bytes(5 * 1024 * 1024), "5MB");
/// assert_eq!(describe_bytes(512 * 1024), "512KB");
/// assert_eq!(describe_bytes(1000), "1000 bytes");
/// ```
pub fn describe_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}KB", bytes / KB)
    } else {
        format!("{bytes} bytes")
    }
}

fn normalize_name(name: String) -> String {
    title_case_words(&name)
}

/// Validates one technology entry.
#[derive(Debug)]
pub struct TechEntrySchema {
    title: Text,
    knowledge: Integer,
}

impl TechEntrySchema {
    /// Creates the entry schema for the configured knowledge range.
    pub fn new(settings: &RegistrationSettings) -> Self {
        let (min, max) = (settings.knowledge_min, settings.knowledge_max);
        Self {
            title: Text::new().trim().required("Title is necessary"),
            knowledge: Integer::new()
                .invalid_message("Knowledge must be a number")
                .fraction_message("Knowledge must be a whole number")
                .min(min, format!("Knowledge must be at least {min}"))
                .max(max, format!("Knowledge must be at most {max}")),
        }
    }
}

impl Validator for TechEntrySchema {
    type Output = TechEntry;

    fn validate(&self, raw: &RawValue) -> Result<TechEntry, ValidationError> {
        let fields = object_fields(raw)?;
        let mut errors = ValidationError::new();

        let title = clean_field(fields, "title", &self.title, &mut errors);
        let knowledge = clean_field(fields, "knowledge", &self.knowledge, &mut errors);

        match (title, knowledge) {
            (Some(title), Some(knowledge)) => Ok(TechEntry { title, knowledge }),
            _ => Err(errors),
        }
    }
}

/// Validates the whole registration form.
///
/// # Examples
///
/// ```
/// use signup_forms::{RawValue, RegistrationSchema, Validator};
///
/// let schema = RegistrationSchema::default();
/// let err = schema.validate(&RawValue::Null).unwrap_err();
///
/// assert_eq!(err.message("avatar"), Some("Avatar is required"));
/// assert_eq!(err.message("name"), Some("Name is necessary"));
/// assert_eq!(err.message("techs"), Some("Add at least 2 technologies"));
/// ```
#[derive(Debug)]
pub struct RegistrationSchema {
    avatar: SingleFile,
    name: Map<Text, fn(String) -> String>,
    email: Text,
    password: Text,
    techs: ListOf<TechEntrySchema>,
}

impl RegistrationSchema {
    /// Creates the schema for the given limits.
    pub fn new(settings: &RegistrationSettings) -> Self {
        let min_techs = settings.min_techs;
        let min_password = settings.min_password_len;
        Self {
            avatar: SingleFile::new()
                .required("Avatar is required")
                .multiple("Select a single file")
                .max_bytes(
                    settings.avatar_max_bytes,
                    format!("Max file size is {}", describe_bytes(settings.avatar_max_bytes)),
                ),
            name: Text::new()
                .trim()
                .required("Name is necessary")
                .map(normalize_name as fn(String) -> String),
            email: Text::new()
                .trim()
                .required("Email is necessary")
                .email("Invalid email address")
                .ends_with(
                    settings.email_domain.clone(),
                    format!("Email must end with {}", settings.email_domain),
                ),
            password: Text::new().min_length(
                min_password,
                format!("Must be {min_password} or more characters long"),
            ),
            techs: ListOf::new(TechEntrySchema::new(settings))
                .min_length(min_techs, format!("Add at least {min_techs} technologies")),
        }
    }
}

impl Default for RegistrationSchema {
    fn default() -> Self {
        Self::new(&RegistrationSettings::default())
    }
}

impl Validator for RegistrationSchema {
    type Output = UserRegistration;

    fn validate(&self, raw: &RawValue) -> Result<UserRegistration, ValidationError> {
        let fields = object_fields(raw)?;
        let mut errors = ValidationError::new();

        let avatar = clean_field(fields, AVATAR, &self.avatar, &mut errors);
        let name = clean_field(fields, NAME, &self.name, &mut errors);
        let email = clean_field(fields, EMAIL, &self.email, &mut errors);
        let password = clean_field(fields, PASSWORD, &self.password, &mut errors);
        let techs = clean_field(fields, TECHS, &self.techs, &mut errors);

        match (avatar, name, email, password, techs) {
            (Some(avatar), Some(name), Some(email), Some(password), Some(techs)) => {
                Ok(UserRegistration {
                    avatar,
                    name,
                    email,
                    password,
                    techs,
                })
            }
            _ => Err(errors),
        }
    }
}
