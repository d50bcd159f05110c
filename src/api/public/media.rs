use axum::{
    extract::{Extension, Path},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::config::Config;
use crate::middleware::logging::ApiError;

pub fn media_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/media/*path", get(serve_media))
        .layer(Extension(config))
}

async fn serve_media(
    Path(path): Path<String>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<Response, ApiError> {
    let not_found = || ApiError::NotFound(format!("No media file at {path:?}."));

    let relative = media_path(&path).ok_or_else(not_found)?;
    let full_path = config.media_root.join(relative);

    match tokio::fs::metadata(&full_path).await {
        Ok(metadata) if metadata.is_file() => {}
        _ => return Err(not_found()),
    }
    let file = tokio::fs::File::open(&full_path).await?;

    let content_type = mime_guess::from_path(&full_path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let stream = ReaderStream::new(file);
    let body = axum::body::Body::from_stream(stream);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("inline"),
    );

    Ok((headers, body).into_response())
}

/// Location of a requested media file relative to the media root, or `None`
/// when the request tries to leave it.
pub fn media_path(requested: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in FsPath::new(requested.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    (!clean.as_os_str().is_empty()).then_some(clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_relative_paths() {
        assert_eq!(
            media_path("images/shoe.jpg"),
            Some(PathBuf::from("images/shoe.jpg"))
        );
        assert_eq!(
            media_path("./product_images/a.png"),
            Some(PathBuf::from("product_images/a.png"))
        );
        assert_eq!(
            media_path("/images/shoe.jpg"),
            Some(PathBuf::from("images/shoe.jpg"))
        );
    }

    #[test]
    fn refuses_to_leave_the_media_root() {
        assert_eq!(media_path("../Cargo.toml"), None);
        assert_eq!(media_path("images/../../etc/passwd"), None);
        assert_eq!(media_path(""), None);
        assert_eq!(media_path("/"), None);
    }
}
