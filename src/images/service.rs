//! Image service coordinating the media store and database operations.

use std::sync::Arc;

use picstash_common::{Error, Result};
use picstash_db::models::{Image, NewImage};
use picstash_db::pool::{get_conn, DbPool};
use picstash_db::queries::images;
use serde::Deserialize;

use crate::media::MediaStore;

/// A client-submitted image record (direct-URL path).
///
/// All fields are optional at the wire level; [`ImageService::save`]
/// enforces what must actually be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSubmission {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Metadata accompanying a raw file upload.
#[derive(Debug, Clone, Default)]
pub struct UploadMetadata {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// High-level image operations backed by the database pool and the
/// media store adapter. Constructor-injected, no framework.
pub struct ImageService {
    pool: DbPool,
    media: Arc<dyn MediaStore>,
}

impl ImageService {
    pub fn new(pool: DbPool, media: Arc<dyn MediaStore>) -> Self {
        Self { pool, media }
    }

    /// Persist a client-submitted record (insert without id, update with).
    ///
    /// Rejects an empty title or a missing/empty image URL; a record is
    /// never persisted without a delivery URL.
    pub fn save(&self, submission: ImageSubmission) -> Result<Image> {
        if submission.title.trim().is_empty() {
            return Err(Error::invalid_input("title must not be empty"));
        }

        let image_url = match submission.image_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => return Err(Error::invalid_input("imageUrl is required")),
        };

        let record = NewImage {
            title: submission.title,
            description: submission.description,
            image_url,
            public_id: None,
            location: submission.location,
            source: submission.source,
        };

        let conn = get_conn(&self.pool)?;
        images::upsert_image(&conn, submission.id, &record)
    }

    /// Every persisted record, in storage (insertion) order.
    pub fn get_all(&self) -> Result<Vec<Image>> {
        let conn = get_conn(&self.pool)?;
        images::list_images(&conn)
    }

    /// Get a record by id.
    ///
    /// A missing id is an explicit `NotFound` error, never a generic
    /// failure and never a silent empty result.
    pub fn get_by_id(&self, id: i64) -> Result<Image> {
        let conn = get_conn(&self.pool)?;
        images::get_image(&conn, id)?
            .ok_or_else(|| Error::not_found(format!("image {}", id)))
    }

    /// Upload raw file bytes to the media host, then persist a metadata
    /// record carrying the returned delivery URL.
    ///
    /// The two remote calls are not atomic. If persistence fails after a
    /// successful upload, a best-effort compensating delete is issued so
    /// the asset is not orphaned; a failed compensation is only logged.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        metadata: UploadMetadata,
    ) -> Result<Image> {
        if metadata.title.trim().is_empty() {
            return Err(Error::invalid_input("title must not be empty"));
        }

        let uploaded = self.media.upload_image(bytes, filename).await?;

        let record = NewImage {
            title: metadata.title,
            description: metadata.description,
            image_url: uploaded.secure_url,
            public_id: Some(uploaded.public_id.clone()),
            location: metadata.location,
            source: None,
        };

        let persisted = get_conn(&self.pool)
            .and_then(|conn| images::insert_image(&conn, &record));

        match persisted {
            Ok(image) => Ok(image),
            Err(e) => {
                tracing::warn!(
                    "Persisting uploaded image failed, deleting remote asset {}: {}",
                    uploaded.public_id,
                    e
                );
                if let Err(del_err) = self.media.delete_image(&uploaded.public_id).await {
                    tracing::warn!(
                        "Compensating delete of {} failed: {}",
                        uploaded.public_id,
                        del_err
                    );
                }
                Err(e)
            }
        }
    }
}
