//! Cloudinary upload API client.
//!
//! Implements [`MediaStore`] against `https://api.cloudinary.com/v1_1/`.
//! Every call is signed with the account's API secret (SHA-256 request
//! signature over the sorted parameters).

use std::time::Duration;

use picstash_common::{Error, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{MediaStore, UploadedMedia};
use crate::config::MediaConfig;

/// Request timeout for media host calls. Uploads carry the payload, so
/// this is looser than a plain status-check timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Cloudinary image upload API.
pub struct CloudinaryClient {
    client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

/// Fields consumed from the upload response.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryClient {
    pub fn new(config: &MediaConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    fn url(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.base_url, self.cloud_name, action
        )
    }

    /// Sign request parameters the way the Cloudinary API expects:
    /// parameters sorted by name, joined with `&`, the API secret
    /// appended, and the whole string hashed.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by_key(|&(k, _)| k);

        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }
}

#[async_trait::async_trait]
impl MediaStore for CloudinaryClient {
    async fn upload_image(&self, bytes: Vec<u8>, filename: &str) -> Result<UploadedMedia> {
        let timestamp = Self::timestamp();

        // Fixed upload options: keep the original filename, don't force
        // uniqueness, overwrite same-named assets.
        let signature = self.sign(&[
            ("overwrite", "true"),
            ("timestamp", &timestamp),
            ("unique_filename", "false"),
            ("use_filename", "true"),
        ]);

        let file_part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("use_filename", "true")
            .text("unique_filename", "false")
            .text("overwrite", "true");

        let response = self
            .client
            .post(self.url("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::upload(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upload(format!(
                "Upload rejected ({}): {}",
                status, body
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::upload(format!("Malformed upload response: {}", e)))?;

        tracing::debug!("Uploaded image as {}", parsed.public_id);

        Ok(UploadedMedia {
            secure_url: parsed.secure_url,
            public_id: parsed.public_id,
        })
    }

    async fn delete_image(&self, public_id: &str) -> Result<()> {
        let timestamp = Self::timestamp();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let form = reqwest::multipart::Form::new()
            .text("public_id", public_id.to_string())
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let response = self
            .client
            .post(self.url("destroy"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::upload(format!("Destroy request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upload(format!(
                "Destroy rejected ({}): {}",
                status, body
            )));
        }

        let parsed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| Error::upload(format!("Malformed destroy response: {}", e)))?;

        // "not found" is fine for a best-effort delete
        if parsed.result != "ok" && parsed.result != "not found" {
            return Err(Error::upload(format!("Destroy failed: {}", parsed.result)));
        }

        Ok(())
    }
}
