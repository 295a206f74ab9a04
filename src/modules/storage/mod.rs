//! Storage module for submission pictures
//!
//! Provides the object store seam and its S3-compatible implementation.

mod object_store;

pub use object_store::{ObjectStore, ProgressFn, S3ObjectStore, UploadProgress};
