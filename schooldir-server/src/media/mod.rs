//! Media ingest - hand uploaded images to an external host
//!
//! Provides a trait for the image host, with:
//! - Real implementation backed by Cloudinary
//! - Placeholder used when no credentials are configured
//! - Mock implementation for testing

pub mod cloudinary;
pub mod ingest;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

pub use cloudinary::CloudinaryHost;
pub use ingest::{ingest_image, IngestError, MAX_IMAGE_BYTES};

/// Fixed upload profile: where the host stores the file and how it is
/// transformed on delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProfile {
    pub folder: &'static str,
    pub transformation: &'static str,
}

/// Profile for school images: at most 800x600, automatic quality and format.
pub const SCHOOL_IMAGES: UploadProfile = UploadProfile {
    folder: "school-images",
    transformation: "c_limit,h_600,w_800/q_auto/f_auto",
};

/// Durable reference returned by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    /// Public HTTPS URL
    pub url: String,
    /// Host-side identifier
    pub public_id: String,
}

/// Error talking to the media host
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("media host request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("media host rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("media host is not configured")]
    NotConfigured,
}

/// Trait for image hosting (testable)
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload the file at `path` under `profile`.
    async fn upload(&self, path: &Path, profile: &UploadProfile) -> Result<HostedImage, MediaError>;
}

/// Host used when no credentials are set; every upload fails.
pub struct UnconfiguredHost;

#[async_trait]
impl MediaHost for UnconfiguredHost {
    async fn upload(&self, _: &Path, _: &UploadProfile) -> Result<HostedImage, MediaError> {
        Err(MediaError::NotConfigured)
    }
}

/// Mock host for testing
///
/// Records each upload (path, whether the file existed at call time, and
/// its size) and answers with a canned result.
#[derive(Default)]
pub struct MockHost {
    calls: Mutex<Vec<MockUpload>>,
    fail: Mutex<Option<String>>,
}

/// One recorded call to [`MockHost`]
#[derive(Debug, Clone)]
pub struct MockUpload {
    pub path: PathBuf,
    pub existed: bool,
    pub size: u64,
    pub folder: &'static str,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail.lock().unwrap() = Some(message.into());
    }

    pub fn calls(&self) -> Vec<MockUpload> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaHost for MockHost {
    async fn upload(&self, path: &Path, profile: &UploadProfile) -> Result<HostedImage, MediaError> {
        let metadata = tokio::fs::metadata(path).await.ok();
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(MockUpload {
                path: path.to_path_buf(),
                existed: metadata.is_some(),
                size: metadata.map(|m| m.len()).unwrap_or(0),
                folder: profile.folder,
            });
            calls.len()
        };

        if let Some(message) = self.fail.lock().unwrap().clone() {
            return Err(MediaError::Rejected {
                status: 500,
                message,
            });
        }

        Ok(HostedImage {
            url: format!("https://media.test/{}/{}.png", profile.folder, n),
            public_id: format!("{}/{}", profile.folder, n),
        })
    }
}
