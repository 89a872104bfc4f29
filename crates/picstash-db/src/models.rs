//! Internal Rust models matching the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted image metadata record.
///
/// JSON field names follow the API contract (`imageUrl`, `uploadedAt`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    /// Identifier of the asset at the media host, when the record was
    /// created through the upload path. Needed for remote deletion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Field set for a record that has not been persisted yet.
///
/// `uploaded_at` is intentionally absent: the insert path stamps it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewImage {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub public_id: Option<String>,
    pub location: Option<String>,
    pub source: Option<String>,
}
