//! Media uploads go straight to the hosted image service; only the
//! resulting public URL is stored in documents.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct MediaUrl {
    pub url: String,
}

/// Abstraction over the external image host so handlers and tests never
/// depend on the real endpoint.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<MediaUrl>;
}

/// Unsigned upload against a Cloudinary-compatible API: a multipart POST
/// with the file and an upload preset, answered with a `secure_url`.
pub struct CloudinaryHost {
    client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    upload_preset: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryHost {
    pub fn new(base_url: &str, cloud_name: &str, upload_preset: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cloud_name: cloud_name.to_string(),
            upload_preset: upload_preset.to_string(),
        }
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<MediaUrl> {
        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()),
            )
            .text("upload_preset", self.upload_preset.clone());

        let endpoint = format!("{}/{}/image/upload", self.base_url, self.cloud_name);
        let response = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Media(format!("upload request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("media host rejected upload: {} {}", status, body);
            return Err(AppError::Media(format!(
                "media host returned status {status}"
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Media(format!("malformed upload response: {e}")))?;
        Ok(MediaUrl {
            url: parsed.secure_url,
        })
    }
}
