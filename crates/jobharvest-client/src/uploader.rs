use std::path::Path;
use std::time::Duration;

use jobharvest_core::error::AppError;
use jobharvest_core::models::UploadReceipt;
use jobharvest_core::traits::Uploader;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_UPLOAD_URL: &str = "https://content.dropboxapi.com/2/files/upload";
const UPLOAD_FOLDER: &str = "/jobs";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Uploads artifacts to a Dropbox app folder.
///
/// Files land under `/jobs/`; a name clash is resolved by Dropbox renaming
/// the new file rather than overwriting.
#[derive(Clone)]
pub struct DropboxUploader {
    client: Client,
    token: String,
    upload_url: String,
}

impl DropboxUploader {
    pub fn new(token: &str) -> Result<Self, AppError> {
        Self::with_upload_url(token, DEFAULT_UPLOAD_URL)
    }

    pub fn with_upload_url(token: &str, upload_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .map_err(|e| AppError::UploadError(e.to_string()))?;

        Ok(Self {
            client,
            token: token.to_string(),
            upload_url: upload_url.to_string(),
        })
    }

    /// Builds an uploader from `DROPBOX_TOKEN`, or `None` when it is unset or blank.
    pub fn from_env() -> Option<Result<Self, AppError>> {
        std::env::var("DROPBOX_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(|token| Self::new(token.trim()))
    }
}

// ---- Dropbox API types ----

#[derive(Serialize)]
struct UploadArg<'a> {
    path: String,
    mode: &'a str,
    autorename: bool,
}

#[derive(Deserialize)]
struct UploadResponse {
    path_display: String,
    size: u64,
}

fn upload_arg(file_name: &str) -> Result<String, AppError> {
    let arg = UploadArg {
        path: format!("{UPLOAD_FOLDER}/{file_name}"),
        mode: "add",
        autorename: true,
    };
    serde_json::to_string(&arg).map_err(|e| AppError::UploadError(e.to_string()))
}

impl Uploader for DropboxUploader {
    async fn upload(&self, path: &Path, file_name: &str) -> Result<UploadReceipt, AppError> {
        let contents = tokio::fs::read(path).await?;
        let api_arg = upload_arg(file_name)?;

        tracing::info!(file = file_name, bytes = contents.len(), "Uploading artifact");

        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(&self.token)
            .header("Dropbox-API-Arg", api_arg)
            .header("Content-Type", "application/octet-stream")
            .body(contents)
            .send()
            .await
            .map_err(|e| AppError::UploadError(format!("Upload request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UploadError(format!(
                "Dropbox returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::UploadError(format!("Unexpected upload response: {e}")))?;

        Ok(UploadReceipt {
            path_display: parsed.path_display,
            size: parsed.size,
        })
    }
}
