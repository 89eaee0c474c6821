//! Cloudinary image host
//!
//! Signed upload: the signed parameters are sorted by name, joined as
//! `key=value` with `&`, the API secret is appended, and the whole string is
//! hashed with SHA-256.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{HostedImage, MediaError, MediaHost, UploadProfile};
use crate::settings::CloudinarySettings;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Successful upload response (subset)
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Cloudinary-backed [`MediaHost`]
pub struct CloudinaryHost {
    settings: CloudinarySettings,
    http: Client,
    base_url: String,
}

impl CloudinaryHost {
    pub fn new(settings: CloudinarySettings) -> Result<Self, MediaError> {
        let http = Client::builder().build()?;
        Ok(Self {
            settings,
            http,
            base_url: API_BASE.to_string(),
        })
    }

    /// Point at a different API base (e.g. a local stand-in).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.base_url.trim_end_matches('/'),
            self.settings.cloud_name
        )
    }
}

/// Compute the request signature over `params` (any order).
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, path: &Path, profile: &UploadProfile) -> Result<HostedImage, MediaError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("folder", profile.folder),
                ("timestamp", &timestamp),
                ("transformation", profile.transformation),
            ],
            &self.settings.api_secret,
        );

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("api_key", self.settings.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", profile.folder)
            .text("transformation", profile.transformation)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        tracing::debug!(folder = profile.folder, "uploading image to cloudinary");

        let response = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        tracing::info!(public_id = %body.public_id, "image uploaded");

        Ok(HostedImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }
}
