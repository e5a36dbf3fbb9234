//! Settings for signup-rs.
//!
//! [`Settings`] holds the logging, storage, and registration-rule
//! configuration. Every field has a default, so a settings file only needs
//! to name what it changes. The registration defaults are the limits the
//! registration form ships with (5 MiB avatars, `@github.com` addresses,
//! at least two technologies).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which storage collaborator receives avatar uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Objects are written below `location/<bucket>/`.
    Filesystem,
    /// Objects are kept in process memory (tests and dry runs).
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "filesystem" | "fs" => Ok(Self::Filesystem),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Storage collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// The storage backend.
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend.
    pub location: PathBuf,
    /// The bucket avatars are uploaded to.
    pub bucket: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Filesystem,
            location: PathBuf::from("media"),
            bucket: "avatars".to_string(),
        }
    }
}

/// Limits enforced by the registration schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSettings {
    /// Largest accepted avatar, in bytes (inclusive).
    pub avatar_max_bytes: u64,
    /// Exact, case-sensitive suffix every email must end with.
    pub email_domain: String,
    /// Minimum number of technology entries at submission time.
    pub min_techs: usize,
    /// Minimum password length, in characters.
    pub min_password_len: usize,
    /// Lowest accepted knowledge level (inclusive).
    pub knowledge_min: i64,
    /// Highest accepted knowledge level (inclusive).
    pub knowledge_max: i64,
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            avatar_max_bytes: 5 * 1024 * 1024,
            email_domain: "@github.com".to_string(),
            min_techs: 2,
            min_password_len: 6,
            knowledge_min: 1,
            knowledge_max: 100,
        }
    }
}

/// The complete set of settings.
///
/// # Examples
///
/// ```
/// use signup_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.registration.avatar_max_bytes, 5_242_880);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter (e.g. "info", "debug", "signup_forms=trace").
    pub log_level: String,

    // ── Storage ──────────────────────────────────────────────────────

    /// Where avatars are uploaded.
    pub storage: StorageSettings,

    // ── Registration ─────────────────────────────────────────────────

    /// Schema limits.
    pub registration: RegistrationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            storage: StorageSettings::default(),
            registration: RegistrationSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.storage.backend, StorageBackend::Filesystem);
        assert_eq!(s.storage.location, PathBuf::from("media"));
        assert_eq!(s.storage.bucket, "avatars");
    }

    #[test]
    fn test_default_registration_limits() {
        let r = RegistrationSettings::default();
        assert_eq!(r.avatar_max_bytes, 5_242_880);
        assert_eq!(r.email_domain, "@github.com");
        assert_eq!(r.min_techs, 2);
        assert_eq!(r.min_password_len, 6);
        assert_eq!((r.knowledge_min, r.knowledge_max), (1, 100));
    }

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert_eq!(" FS ".parse::<StorageBackend>(), Ok(StorageBackend::Filesystem));
        assert!("s3".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_storage_backend_serde_lowercase() {
        let json = serde_json::to_string(&StorageBackend::Memory).unwrap();
        assert_eq!(json, "\"memory\"");
    }
}
