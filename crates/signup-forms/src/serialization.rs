//! Presentation of the validated record.
//!
//! A successful submission is shown as pretty-printed JSON with two-space
//! indentation. The avatar appears with its name, type, size, and
//! base64-encoded content, so the output parses back into an identical
//! [`UserRegistration`].

use signup_core::error::{SignupError, SignupResult};

use crate::schema::UserRegistration;

/// Pretty-prints a registration as JSON.
pub fn to_pretty_json(record: &UserRegistration) -> SignupResult<String> {
    serde_json::to_string_pretty(record).map_err(|e| SignupError::Serialization(e.to_string()))
}

/// Parses a registration previously produced by [`to_pretty_json`].
pub fn from_json(data: &str) -> SignupResult<UserRegistration> {
    serde_json::from_str(data).map_err(|e| SignupError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TechEntry;
    use signup_storage::UploadedFile;

    fn record() -> UserRegistration {
        UserRegistration {
            avatar: UploadedFile::new("me.png", "image/png", b"png".to_vec()),
            name: "John Smith".into(),
            email: "john@github.com".into(),
            password: "secret1".into(),
            techs: vec![
                TechEntry { title: "Rust".into(), knowledge: 90 },
                TechEntry { title: "Go".into(), knowledge: 10 },
            ],
        }
    }

    #[test]
    fn test_pretty_json_uses_two_space_indent() {
        let output = to_pretty_json(&record()).unwrap();
        assert!(output.starts_with("{\n  \"avatar\": {\n    \"name\": \"me.png\""));
        assert!(output.contains("\n  \"name\": \"John Smith\""));
        assert!(output.contains("\"content\": \"cG5n\""));
    }

    #[test]
    fn test_output_parses_back() {
        let original = record();
        let parsed = from_json(&to_pretty_json(&original).unwrap()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = from_json("{\"name\": 1}").unwrap_err();
        assert!(matches!(err, SignupError::Serialization(_)));
    }

    #[test]
    fn test_techs_keep_display_order() {
        let json = to_pretty_json(&record()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["techs"][0]["title"], "Rust");
        assert_eq!(value["techs"][1]["knowledge"], 10);
    }
}
