//! Reqwest-based adapter for the backend REST API.
//!
//! Implements [`PostApi`] and [`FileApi`] against the platform backend:
//! JSON for post creation and file association, multipart for uploads.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::traits::{
    ApiError, CreatePostRequest, CreatedPost, FileApi, FileMetadata, PostApi, UploadFile,
    UploadedFile,
};

/// Production API adapter.
///
/// Wraps a `reqwest::Client`; authentication headers are the caller's
/// business via [`RestApi::with_client`].
#[derive(Debug, Clone)]
pub struct RestApi {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AssociationResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

impl RestApi {
    /// Create an adapter for the given base URL (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create an adapter with a preconfigured client (timeouts, default
    /// headers, connection pool).
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get a reference to the underlying reqwest::Client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert a reqwest error to an ApiError.
    fn convert_error(err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if err.is_connect() {
            ApiError::ConnectionFailed(err.to_string())
        } else {
            ApiError::Other(err.to_string())
        }
    }

    /// Map a non-2xx response to a ServerError with its body text.
    async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ApiError::ServerError {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PostApi for RestApi {
    async fn create_post(&self, request: CreatePostRequest) -> Result<CreatedPost, ApiError> {
        let url = self.url("/api/posts");
        debug!(%url, parent = ?request.parent_id, "creating post");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(Self::convert_error)?;
        let response = Self::error_for_status(response).await?;

        response
            .json::<CreatedPost>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl FileApi for RestApi {
    async fn upload_file(
        &self,
        file: UploadFile,
        metadata: FileMetadata,
    ) -> Result<UploadedFile, ApiError> {
        let url = self.url("/api/files");
        debug!(%url, filename = %file.filename, size = file.size_bytes(), "uploading file");

        let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ApiError::Other(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("entity_type", metadata.entity_type.clone())
            .text("temp_owner_id", metadata.temp_owner_id.clone());
        if let Some(alt_text) = metadata.alt_text.clone() {
            form = form.text("alt_text", alt_text);
        }
        if let Some(caption) = metadata.caption.clone() {
            form = form.text("caption", caption);
        }

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(Self::convert_error)?;
        let response = Self::error_for_status(response).await?;

        response
            .json::<UploadedFile>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn update_file_association(
        &self,
        file_id: &str,
        real_owner_id: &str,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/files/{file_id}/association"));
        debug!(%url, %real_owner_id, "updating file association");

        let response = self
            .client
            .patch(&url)
            .json(&serde_json::json!({ "real_owner_id": real_owner_id }))
            .send()
            .await
            .map_err(Self::convert_error)?;
        let response = Self::error_for_status(response).await?;

        let body = response
            .json::<AssociationResponse>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        if body.success {
            Ok(())
        } else {
            Err(ApiError::Other(
                body.message.unwrap_or_else(|| "association refused".to_string()),
            ))
        }
    }
}
