//! Media store adapter.
//!
//! The boundary component talking to the external image-hosting service.
//! [`MediaStore`] is the seam; [`CloudinaryClient`] is the production
//! implementation against the Cloudinary upload API.

mod cloudinary;

pub use cloudinary::CloudinaryClient;

use picstash_common::Result;

/// Result of a successful upload at the media host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    /// TLS delivery URL for the stored asset.
    pub secure_url: String,
    /// Host-side identifier, needed to delete the asset later.
    pub public_id: String,
}

/// Remote media host operations.
///
/// Failures are surfaced to the caller, never retried.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload raw image bytes and return the delivery URL and public id.
    async fn upload_image(&self, bytes: Vec<u8>, filename: &str) -> Result<UploadedMedia>;

    /// Best-effort remote deletion of a previously uploaded asset.
    async fn delete_image(&self, public_id: &str) -> Result<()>;
}
