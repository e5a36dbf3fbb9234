//! Uploaded files.
//!
//! [`UploadedFile`] is a file the user selected in a file input: its
//! original name, MIME type, and contents held in memory. It serializes with
//! the contents base64-encoded so that a record containing a file can be
//! pretty-printed and parsed back byte for byte.

use serde::{Deserialize, Serialize};

/// A file selected for upload, with its contents in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// The original filename, used as the object key on upload.
    pub name: String,
    /// The MIME content type of the file.
    pub content_type: String,
    /// The size of the file in bytes.
    pub size: u64,
    /// The file content as raw bytes.
    #[serde(with = "base64_bytes")]
    pub content: Vec<u8>,
}

impl UploadedFile {
    /// Creates a new `UploadedFile`; the size is taken from the content.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, content: Vec<u8>) -> Self {
        let content_len = content.len() as u64;
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: content_len,
            content,
        }
    }

    /// Returns the file extension, if any.
    pub fn extension(&self) -> Option<&str> {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploaded_file_size_from_content() {
        let file = UploadedFile::new("avatar.png", "image/png", vec![0_u8; 42]);
        assert_eq!(file.size, 42);
        assert_eq!(file.extension(), Some("png"));
    }

    #[test]
    fn test_uploaded_file_without_extension() {
        let file = UploadedFile::new("README", "text/plain", Vec::new());
        assert_eq!(file.extension(), None);
        assert_eq!(file.size, 0);
    }

    #[test]
    fn test_content_serializes_as_base64() {
        let file = UploadedFile::new("a.txt", "text/plain", b"hi".to_vec());
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["content"], "aGk=");
        assert_eq!(json["size"], 2);

        let back: UploadedFile = serde_json::from_value(json).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let json = r#"{"name":"a","content_type":"x","size":1,"content":"%%%"}"#;
        assert!(serde_json::from_str::<UploadedFile>(json).is_err());
    }
}
