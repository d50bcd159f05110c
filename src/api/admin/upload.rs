use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Extension, Multipart, Query},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::fs as tokio_fs;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::middleware::logging::ApiError;

/// Room for the multipart framing around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const FILE_FIELD: &str = "file";

pub fn upload_router(config: Arc<Config>) -> Router {
    let body_limit = config.file_size_limit + MULTIPART_OVERHEAD;

    Router::new()
        .route("/uploads", post(upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(config))
}

/// Where an uploaded image ends up below the media root.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    /// A product's main image.
    #[default]
    Main,
    /// An extra image shown in the product gallery.
    Gallery,
}

impl UploadKind {
    pub fn directory(self) -> &'static str {
        match self {
            UploadKind::Main => "images",
            UploadKind::Gallery => "product_images",
        }
    }
}

#[derive(Deserialize)]
struct UploadQuery {
    #[serde(default)]
    kind: UploadKind,
}

/// File extension stored for an accepted content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

async fn upload(
    Query(query): Query<UploadQuery>,
    Extension(config): Extension<Arc<Config>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .ok_or_else(|| ApiError::ValidationFail("Content type is not set.".into()))?;
        let extension = extension_for(content_type)
            .ok_or_else(|| ApiError::ValidationFail("Unsupported content type.".into()))?;

        let data = field.bytes().await.map_err(multipart_error)?;
        if data.len() > config.file_size_limit {
            return Err(ApiError::PayloadTooLarge);
        }

        let relative = format!(
            "{}/{}.{}",
            query.kind.directory(),
            Uuid::new_v4(),
            extension
        );
        let target = config.media_root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio_fs::create_dir_all(parent).await?;
        }
        tokio_fs::write(&target, &data).await?;
        debug!(path = %relative, bytes = data.len(), "stored upload");

        return Ok((
            StatusCode::CREATED,
            Json(json!({
                "message": "File uploaded successfully.",
                "path": relative,
            })),
        ));
    }

    Err(ApiError::ValidationFail(format!(
        "Multipart field `{FILE_FIELD}` is missing."
    )))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::ValidationFail(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_jpeg_and_png_only() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/gif"), None);
        assert_eq!(extension_for("text/plain"), None);
    }

    #[test]
    fn kinds_map_to_media_directories() {
        assert_eq!(UploadKind::default().directory(), "images");
        assert_eq!(UploadKind::Gallery.directory(), "product_images");
    }
}
