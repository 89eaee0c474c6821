//! Upload pipeline: validate, stage to a temp file, forward, clean up.

use tempfile::Builder;

use super::{HostedImage, MediaError, MediaHost, SCHOOL_IMAGES};

/// Largest accepted image (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Why an upload was refused or failed
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("file must be an image (got {content_type})")]
    NotImage { content_type: String },

    #[error("image exceeds maximum size of {max} bytes")]
    TooLarge { max: usize },

    #[error("failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),

    #[error(transparent)]
    Host(#[from] MediaError),
}

/// Check type and size, then hand the bytes to the host.
///
/// The bytes are staged in a named temp file that is removed once the host
/// call returns, whichever way it went.
pub async fn ingest_image(
    host: &dyn MediaHost,
    bytes: &[u8],
    content_type: Option<&str>,
) -> Result<HostedImage, IngestError> {
    let content_type = content_type.unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err(IngestError::NotImage {
            content_type: if content_type.is_empty() {
                "no content type".to_string()
            } else {
                content_type.to_string()
            },
        });
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(IngestError::TooLarge {
            max: MAX_IMAGE_BYTES,
        });
    }

    let staged = Builder::new()
        .prefix("school-upload-")
        .suffix(extension_for(content_type))
        .tempfile()?;
    tokio::fs::write(staged.path(), bytes).await?;

    let result = host.upload(staged.path(), &SCHOOL_IMAGES).await;

    let path = staged.path().to_path_buf();
    if let Err(e) = staged.close() {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove staged upload");
    }

    Ok(result?)
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => ".png",
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockHost;

    #[tokio::test]
    async fn forwards_and_removes_temp_file() {
        let mock = MockHost::new();
        let hosted = ingest_image(&mock, b"\x89PNG fake", Some("image/png"))
            .await
            .unwrap();
        assert!(hosted.url.starts_with("https://media.test/school-images/"));

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].existed);
        assert_eq!(calls[0].size, 9);
        assert!(!calls[0].path.exists());
        assert_eq!(calls[0].path.extension().unwrap(), "png");
    }

    #[tokio::test]
    async fn removes_temp_file_on_host_failure() {
        let mock = MockHost::new();
        mock.fail_with("boom");
        let err = ingest_image(&mock, b"gif", Some("image/gif"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Host(_)));

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].path.exists());
    }

    #[tokio::test]
    async fn rejects_non_image_without_calling_host() {
        let mock = MockHost::new();
        let err = ingest_image(&mock, b"hello", Some("text/plain"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::NotImage { .. }));

        let err = ingest_image(&mock, b"hello", None).await.unwrap_err();
        assert!(matches!(err, IngestError::NotImage { .. }));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn rejects_oversized_without_calling_host() {
        let mock = MockHost::new();
        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        let err = ingest_image(&mock, &big, Some("image/jpeg"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::TooLarge { .. }));
        assert!(mock.calls().is_empty());

        let exact = vec![0u8; MAX_IMAGE_BYTES];
        assert!(ingest_image(&mock, &exact, Some("image/jpeg")).await.is_ok());
    }
}
