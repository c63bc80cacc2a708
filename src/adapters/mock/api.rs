//! Recording mock for the backend collaborators.
//!
//! Records every call for verification and can be scripted to fail
//! specific operations: the create call, uploads of particular filenames,
//! or associations of particular file ids. An optional upload delay makes
//! in-flight cancellation observable in tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::traits::{
    ApiError, CreatePostRequest, CreatedPost, FileApi, FileMetadata, PostApi, UploadFile,
    UploadedFile,
};

/// A recorded upload call for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub metadata: FileMetadata,
}

/// Mock implementation of [`PostApi`] and [`FileApi`].
///
/// Ids are deterministic (`post-1`, `file-1`, ...) so tests can assert on
/// them. Cloning shares the recorded state, which lets a test keep a handle
/// while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MockApi {
    create_calls: Arc<Mutex<Vec<CreatePostRequest>>>,
    upload_calls: Arc<Mutex<Vec<RecordedUpload>>>,
    association_calls: Arc<Mutex<Vec<(String, String)>>>,
    fail_create: Arc<Mutex<bool>>,
    fail_upload_filenames: Arc<Mutex<HashSet<String>>>,
    fail_association_ids: Arc<Mutex<HashSet<String>>>,
    upload_delay: Arc<Mutex<Option<Duration>>>,
    next_post_id: Arc<AtomicUsize>,
    next_file_id: Arc<AtomicUsize>,
}

impl MockApi {
    /// Create a mock where every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent create calls fail with a server error.
    pub fn fail_create(&self, fail: bool) {
        *self.fail_create.lock().unwrap() = fail;
    }

    /// Make uploads of the given filename fail.
    pub fn fail_upload_of(&self, filename: &str) {
        self.fail_upload_filenames
            .lock()
            .unwrap()
            .insert(filename.to_string());
    }

    /// Make association of the given file id fail.
    pub fn fail_association_of(&self, file_id: &str) {
        self.fail_association_ids
            .lock()
            .unwrap()
            .insert(file_id.to_string());
    }

    /// Delay every upload, so tests can cancel one mid-flight.
    pub fn set_upload_delay(&self, delay: Duration) {
        *self.upload_delay.lock().unwrap() = Some(delay);
    }

    /// All recorded create calls.
    pub fn create_calls(&self) -> Vec<CreatePostRequest> {
        self.create_calls.lock().unwrap().clone()
    }

    /// All recorded upload calls.
    pub fn upload_calls(&self) -> Vec<RecordedUpload> {
        self.upload_calls.lock().unwrap().clone()
    }

    /// All recorded (file_id, real_owner_id) association calls.
    pub fn association_calls(&self) -> Vec<(String, String)> {
        self.association_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostApi for MockApi {
    async fn create_post(&self, request: CreatePostRequest) -> Result<CreatedPost, ApiError> {
        self.create_calls.lock().unwrap().push(request);

        if *self.fail_create.lock().unwrap() {
            return Err(ApiError::ServerError {
                status: 500,
                message: "scripted create failure".to_string(),
            });
        }

        let id = self.next_post_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CreatedPost {
            id: format!("post-{id}"),
            created_at: chrono::Utc::now(),
        })
    }
}

#[async_trait]
impl FileApi for MockApi {
    async fn upload_file(
        &self,
        file: UploadFile,
        metadata: FileMetadata,
    ) -> Result<UploadedFile, ApiError> {
        let delay = *self.upload_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.upload_calls.lock().unwrap().push(RecordedUpload {
            filename: file.filename.clone(),
            mime_type: file.mime_type.clone(),
            size_bytes: file.size_bytes(),
            metadata,
        });

        if self.fail_upload_filenames.lock().unwrap().contains(&file.filename) {
            return Err(ApiError::ServerError {
                status: 507,
                message: format!("scripted upload failure for {}", file.filename),
            });
        }

        let id = self.next_file_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(UploadedFile {
            id: format!("file-{id}"),
            file_path: format!("/uploads/{}", file.filename),
            mime_type: file.mime_type,
            size_bytes: file.size_bytes(),
        })
    }

    async fn update_file_association(
        &self,
        file_id: &str,
        real_owner_id: &str,
    ) -> Result<(), ApiError> {
        self.association_calls
            .lock()
            .unwrap()
            .push((file_id.to_string(), real_owner_id.to_string()));

        if self.fail_association_ids.lock().unwrap().contains(file_id) {
            return Err(ApiError::ServerError {
                status: 409,
                message: format!("scripted association failure for {file_id}"),
            });
        }
        Ok(())
    }
}
