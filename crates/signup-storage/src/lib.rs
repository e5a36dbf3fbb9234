//! # signup-storage
//!
//! The storage collaborator the registration pipeline uploads avatars to.
//!
//! - [`Storage`] - The async `upload(bucket, key, bytes)` contract
//! - [`FileSystemStorage`] - Buckets are directories below a root
//! - [`InMemoryStorage`] - Buckets live in process memory (tests, dry runs)
//! - [`UploadedFile`] - A file selected by the user, with its bytes
//!
//! ## Quick Start
//!
//! ```rust
//! use signup_storage::{InMemoryStorage, Storage};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let storage = InMemoryStorage::new();
//! storage.upload("avatars", "me.png", b"\x89PNG").await.unwrap();
//! assert_eq!(storage.get("avatars", "me.png").await, Some(b"\x89PNG".to_vec()));
//! # }
//! ```

pub mod files;
pub mod storage;

pub use files::UploadedFile;
pub use storage::{storage_from_settings, validate_key, FileSystemStorage, InMemoryStorage, Storage};
