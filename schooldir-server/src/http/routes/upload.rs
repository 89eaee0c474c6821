//! Image upload endpoint
//!
//! POST /upload with multipart form data; the file is read from the `image`
//! field. Any other method gets 405 from the router.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::media::{ingest_image, MAX_IMAGE_BYTES};

/// Multipart field carrying the file
pub const IMAGE_FIELD: &str = "image";

/// Room for multipart framing and small extra fields on top of the image.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Upload response
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    /// Public URL to store on the school record
    pub path: String,
    pub public_id: String,
}

/// POST /upload - forward one image to the media host
async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?;
        image = Some((bytes, content_type, file_name));
        break;
    }

    let (bytes, content_type, file_name) = image.ok_or(ApiError::NoFile)?;
    tracing::debug!(
        size = bytes.len(),
        content_type = content_type.as_deref().unwrap_or("-"),
        file_name = file_name.as_deref().unwrap_or("-"),
        "received upload"
    );

    let hosted = ingest_image(state.media.as_ref(), &bytes, content_type.as_deref()).await?;

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        path: hosted.url,
        public_id: hosted.public_id,
    }))
}

/// Upload routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/upload",
        post(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
    )
}
