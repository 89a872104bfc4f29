//! Image metadata API routes.
//!
//! Exposes the CRUD surface: direct-URL submission, raw file upload,
//! list, get-by-id, and a liveness probe.

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use picstash_common::Error;

use super::AppContext;
use crate::images::{ImageSubmission, UploadMetadata};

/// Create image-related routes.
pub fn image_routes() -> Router<AppContext> {
    Router::new()
        .route("/images", get(list_images).post(submit_image))
        .route("/images/upload", post(upload_image))
        .route("/images/test", get(liveness))
        .route("/images/{id}", get(get_image))
}

/// Map a service error to an HTTP status plus a JSON error body.
///
/// Not-found is a distinct 404, invalid input a 400, media host failures
/// a 502, everything else a 500.
fn error_response(err: Error) -> Response {
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::Upload(_) | Error::Io(_) => StatusCode::BAD_GATEWAY,
        Error::Database(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness probe with a fixed body.
async fn liveness() -> &'static str {
    "picstash image API is up"
}

/// List every stored record in insertion order.
async fn list_images(State(ctx): State<AppContext>) -> Response {
    match ctx.images.get_all() {
        Ok(images) => Json(images).into_response(),
        Err(e) => error_response(e),
    }
}

/// Get a single record by id. Missing ids are a 404.
async fn get_image(State(ctx): State<AppContext>, Path(id): Path<i64>) -> Response {
    match ctx.images.get_by_id(id) {
        Ok(image) => Json(image).into_response(),
        Err(e) => error_response(e),
    }
}

/// Persist a client-submitted record (the client supplies the image URL).
async fn submit_image(
    State(ctx): State<AppContext>,
    Json(submission): Json<ImageSubmission>,
) -> Response {
    match ctx.images.save(submission) {
        Ok(image) => Json(image).into_response(),
        Err(e) => error_response(e),
    }
}

/// Upload a raw file and persist its metadata.
///
/// Expects multipart parts: `file` (required), `title` (required,
/// non-empty), `description` and `location` (optional). Unknown parts
/// are ignored.
async fn upload_image(State(ctx): State<AppContext>, mut multipart: Multipart) -> Response {
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut metadata = UploadMetadata::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(Error::invalid_input(format!(
                    "Malformed multipart body: {}",
                    e
                )))
            }
        };

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((bytes.to_vec(), filename)),
                    Err(e) => {
                        return error_response(Error::invalid_input(format!(
                            "Failed to read file part: {}",
                            e
                        )))
                    }
                }
            }
            "title" => match text_field(field).await {
                Ok(text) => metadata.title = text,
                Err(e) => return error_response(e),
            },
            "description" => match text_field(field).await {
                Ok(text) => metadata.description = Some(text),
                Err(e) => return error_response(e),
            },
            "location" => match text_field(field).await {
                Ok(text) => metadata.location = Some(text),
                Err(e) => return error_response(e),
            },
            _ => {}
        }
    }

    let Some((bytes, filename)) = file else {
        return error_response(Error::invalid_input("file part is required"));
    };

    match ctx.images.upload(bytes, &filename, metadata).await {
        Ok(image) => Json(image).into_response(),
        Err(e) => error_response(e),
    }
}

async fn text_field(field: Field<'_>) -> Result<String, Error> {
    field
        .text()
        .await
        .map_err(|e| Error::invalid_input(format!("Malformed multipart field: {}", e)))
}
