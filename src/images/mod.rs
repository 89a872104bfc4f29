//! Image metadata service.
//!
//! Orchestrates the media store adapter and the database repository:
//! validation, persistence, and the upload-then-persist workflow.

mod service;

pub use service::{ImageService, ImageSubmission, UploadMetadata};
