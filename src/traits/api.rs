//! Backend collaborator traits.
//!
//! Three abstract operations cover everything the engine needs from the
//! backend: create a post (thread or reply), upload a file against a
//! temporary owner, and re-associate an uploaded file with its real owner
//! once that owner exists. The wire shape behind them is owned by the
//! backend; these traits only fix the data the engine supplies and reads.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transport-level API errors.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Server returned an error status
    ServerError { status: u16, message: String },
    /// Response body did not match the expected shape
    InvalidResponse(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            ApiError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            ApiError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            ApiError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ApiError::Other(msg) => write!(f, "API error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Request to create a thread or a reply.
///
/// A thread leaves `thread_id` and `parent_id` unset; a direct reply sets
/// `thread_id`; a nested reply additionally sets `parent_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePostRequest {
    /// Thread the post belongs to (absent when creating the thread itself)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    /// Parent reply for nested replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Thread title (threads only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Raw markdown content as the author typed it
    pub content: String,
    /// Topic tags (threads only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// The created entity as the backend reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedPost {
    /// Id assigned by the backend
    pub id: String,
    /// Server-side creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A file selected by the author, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Original filename
    pub filename: String,
    /// Declared MIME type
    pub mime_type: String,
    /// File contents
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Metadata accompanying an upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    /// Alt text for inline images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    /// Caption shown under the attachment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Kind of entity the file will belong to ("thread" or "reply")
    pub entity_type: String,
    /// Temporary owner key used until the entity exists
    pub temp_owner_id: String,
}

/// The stored file as the storage collaborator reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    /// File id assigned by storage
    pub id: String,
    /// Storage path of the uploaded bytes
    pub file_path: String,
    /// MIME type as stored
    pub mime_type: String,
    /// Stored size in bytes
    pub size_bytes: u64,
}

/// Post-creation collaborator.
#[async_trait]
pub trait PostApi: Send + Sync {
    /// Create a thread or reply; returns the id the backend assigned.
    async fn create_post(&self, request: CreatePostRequest) -> Result<CreatedPost, ApiError>;
}

/// Upload/storage collaborator.
#[async_trait]
pub trait FileApi: Send + Sync {
    /// Upload a file against a temporary owner key.
    async fn upload_file(
        &self,
        file: UploadFile,
        metadata: FileMetadata,
    ) -> Result<UploadedFile, ApiError>;

    /// Re-associate an uploaded file with its now-existing real owner.
    async fn update_file_association(
        &self,
        file_id: &str,
        real_owner_id: &str,
    ) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::ConnectionFailed("refused".to_string()).to_string(),
            "Connection failed: refused"
        );
        assert_eq!(
            ApiError::ServerError { status: 500, message: "boom".to_string() }.to_string(),
            "Server error (500): boom"
        );
        assert_eq!(
            ApiError::InvalidResponse("missing id".to_string()).to_string(),
            "Invalid response: missing id"
        );
    }

    #[test]
    fn test_create_request_omits_absent_fields() {
        let request = CreatePostRequest {
            thread_id: Some("t-1".to_string()),
            parent_id: None,
            title: None,
            content: "hi".to_string(),
            tags: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("thread_id"));
        assert!(!json.contains("parent_id"));
        assert!(!json.contains("title"));
    }

    #[test]
    fn test_upload_file_size() {
        let file = UploadFile {
            filename: "a.bin".to_string(),
            mime_type: "application/octet-stream".to_string(),
            bytes: Bytes::from(vec![0u8; 1234]),
        };
        assert_eq!(file.size_bytes(), 1234);
    }
}
