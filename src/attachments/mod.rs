//! Attachment lifecycle management.
//!
//! Files are uploaded against a *temporary* owner key, because the thread
//! or reply that will own them does not exist on the server yet. Once the
//! owning entity is durably created, [`AttachmentManager::bind`] re-links
//! every pending file to the real owner id. The per-attachment state
//! machine is:
//!
//! ```text
//! Pending -> Bound      (association succeeded)
//! Pending -> Orphaned   (association failed; external GC reclaims bytes)
//! Pending -> Removed    (author cancelled before binding began)
//! ```
//!
//! `Bound`, `Orphaned`, and `Removed` are terminal here. Uploads are
//! issued eagerly and run concurrently with the author still typing;
//! removing a pending attachment aborts its upload task if it is still in
//! flight.

mod constraints;

pub use constraints::UploadContext;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AttachmentError, BindFailure, UploadError};
use crate::models::{AttachmentRef, AttachmentState};
use crate::traits::{ApiError, FileApi, FileMetadata, UploadFile};

/// Outcome of a bind call: per-file results, never an all-or-nothing error.
///
/// A reply is created successfully even when some of its attachments fail
/// to bind; the failures surface as warnings and the affected attachments
/// drop out of the display list.
#[derive(Debug, Clone, Default)]
pub struct BindResult {
    /// Attachments now associated with their real owner, in request order
    pub bound: Vec<AttachmentRef>,
    /// Per-file failures; these attachments are orphaned
    pub failures: Vec<BindFailure>,
}

impl BindResult {
    /// True when every requested attachment bound.
    pub fn is_fully_bound(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Entry {
    state: AttachmentState,
    /// Bind has started for this id; remove() is a no-op from here on
    binding: bool,
    temp_owner_id: String,
    /// Storage-side file id, known once the upload completes
    storage_id: Option<String>,
    /// The reference handed to callers, filled in when the upload completes
    attachment: Option<AttachmentRef>,
    /// Last upload error, kept for reporting
    upload_error: Option<ApiError>,
    /// In-flight upload task, abortable on remove()
    task: Option<JoinHandle<()>>,
}

/// Manages upload, temporary association, and re-association of binary
/// attachments.
///
/// Cheap to clone; clones share state, which is how spawned upload tasks
/// write their results back.
pub struct AttachmentManager<A: FileApi + 'static> {
    api: Arc<A>,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl<A: FileApi + 'static> Clone for AttachmentManager<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<A: FileApi + 'static> AttachmentManager<A> {
    /// Create a manager over the given storage collaborator.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Begin uploading a file eagerly, without waiting for completion.
    ///
    /// Validation happens here, at selection time: a constraint violation
    /// rejects this file immediately and touches nothing else. On success
    /// the attachment is registered `Pending` and its id returned; the
    /// upload proceeds concurrently while the author keeps typing.
    pub fn start_upload(
        &self,
        file: UploadFile,
        context: UploadContext,
        temp_owner_id: &str,
    ) -> Result<String, AttachmentError> {
        let attachment_id = Uuid::new_v4().to_string();

        {
            let mut entries = self.entries.lock().unwrap();
            let current = entries
                .values()
                .filter(|e| {
                    e.temp_owner_id == temp_owner_id
                        && matches!(e.state, AttachmentState::Pending | AttachmentState::Bound)
                })
                .count();
            constraints::validate_file(context, &file, current)?;

            entries.insert(
                attachment_id.clone(),
                Entry {
                    state: AttachmentState::Pending,
                    binding: false,
                    temp_owner_id: temp_owner_id.to_string(),
                    storage_id: None,
                    attachment: None,
                    upload_error: None,
                    task: None,
                },
            );
        }

        let manager = self.clone();
        let id = attachment_id.clone();
        let owner = temp_owner_id.to_string();
        let task = tokio::spawn(async move {
            manager.run_upload(id, file, context, owner).await;
        });

        if let Some(entry) = self.entries.lock().unwrap().get_mut(&attachment_id) {
            entry.task = Some(task);
        }

        Ok(attachment_id)
    }

    /// Upload a file and wait for the result.
    ///
    /// Equivalent to [`start_upload`](Self::start_upload) followed by
    /// awaiting completion; returns the pending [`AttachmentRef`].
    pub async fn upload(
        &self,
        file: UploadFile,
        context: UploadContext,
        temp_owner_id: &str,
    ) -> Result<AttachmentRef, AttachmentError> {
        let id = self.start_upload(file, context, temp_owner_id)?;
        self.await_uploads(std::slice::from_ref(&id)).await;

        let entries = self.entries.lock().unwrap();
        let Some(entry) = entries.get(&id) else {
            return Err(UploadError::Cancelled.into());
        };
        match (&entry.attachment, &entry.upload_error) {
            (Some(attachment), _) => Ok(attachment.clone()),
            (None, Some(err)) => Err(UploadError::Api(err.clone()).into()),
            // No result and no error: removed while in flight
            (None, None) => Err(UploadError::Cancelled.into()),
        }
    }

    /// The upload task body: talks to storage, then writes the outcome
    /// back unless the attachment was removed mid-flight.
    async fn run_upload(
        &self,
        attachment_id: String,
        file: UploadFile,
        context: UploadContext,
        temp_owner_id: String,
    ) {
        let metadata = FileMetadata {
            alt_text: None,
            caption: None,
            entity_type: context.entity_type().to_string(),
            temp_owner_id: temp_owner_id.clone(),
        };
        let filename = file.filename.clone();
        let mime_type = file.mime_type.clone();
        let size_bytes = file.size_bytes();

        let outcome = self.api.upload_file(file, metadata).await;

        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.get_mut(&attachment_id) else {
            return;
        };
        if entry.state == AttachmentState::Removed {
            // Cancelled while the request was in flight; the stored bytes
            // are the external garbage collector's problem
            debug!(%attachment_id, "upload finished after removal, dropping result");
            return;
        }

        match outcome {
            Ok(uploaded) => {
                debug!(%attachment_id, file_id = %uploaded.id, "upload complete");
                entry.storage_id = Some(uploaded.id);
                entry.attachment = Some(AttachmentRef {
                    id: attachment_id,
                    temp_owner_id: Some(temp_owner_id),
                    real_owner_id: None,
                    filename,
                    mime_type,
                    size_bytes,
                    storage_path: uploaded.file_path,
                });
            }
            Err(err) => {
                warn!(%attachment_id, %filename, error = %err, "upload failed");
                entry.upload_error = Some(err);
                entry.state = AttachmentState::Removed;
            }
        }
    }

    /// Wait until every named upload task has settled (completed, failed,
    /// or been aborted).
    pub async fn await_uploads(&self, ids: &[String]) {
        let handles: Vec<JoinHandle<()>> = {
            let mut entries = self.entries.lock().unwrap();
            ids.iter()
                .filter_map(|id| entries.get_mut(id).and_then(|e| e.task.take()))
                .collect()
        };
        for handle in handles {
            // An aborted task is a settled task; nothing to propagate
            let _ = handle.await;
        }
    }

    /// Associate uploaded attachments with their now-existing owner.
    ///
    /// Must be called after the owning entity was durably created, once per
    /// submission. Outcomes are per file: each failure orphans only that
    /// attachment and is reported in the result, never as an error for the
    /// whole call.
    pub async fn bind(&self, ids: &[String], real_owner_id: &str) -> BindResult {
        self.await_uploads(ids).await;

        // Mark binding before any network call so a concurrent remove()
        // becomes a no-op from here on
        let mut jobs: Vec<(String, String)> = Vec::new();
        let mut result = BindResult::default();
        {
            let mut entries = self.entries.lock().unwrap();
            for id in ids {
                match entries.get_mut(id) {
                    None => result.failures.push(BindFailure {
                        attachment_id: id.clone(),
                        reason: "unknown attachment".to_string(),
                    }),
                    Some(entry) if entry.binding => result.failures.push(BindFailure {
                        attachment_id: id.clone(),
                        reason: "binding already begun".to_string(),
                    }),
                    Some(entry) => match (entry.state, &entry.storage_id) {
                        (AttachmentState::Pending, Some(storage_id)) => {
                            entry.binding = true;
                            jobs.push((id.clone(), storage_id.clone()));
                        }
                        (AttachmentState::Removed, _) => result.failures.push(BindFailure {
                            attachment_id: id.clone(),
                            reason: match &entry.upload_error {
                                Some(err) => format!("upload failed: {err}"),
                                None => "removed before binding".to_string(),
                            },
                        }),
                        (AttachmentState::Pending, None) => result.failures.push(BindFailure {
                            attachment_id: id.clone(),
                            reason: "upload not complete".to_string(),
                        }),
                        (state, _) => result.failures.push(BindFailure {
                            attachment_id: id.clone(),
                            reason: format!("not pending (state: {state:?})"),
                        }),
                    },
                }
            }
        }

        let outcomes = join_all(jobs.iter().map(|(_, storage_id)| {
            self.api.update_file_association(storage_id, real_owner_id)
        }))
        .await;

        let mut entries = self.entries.lock().unwrap();
        for ((id, _), outcome) in jobs.into_iter().zip(outcomes) {
            let Some(entry) = entries.get_mut(&id) else {
                continue;
            };
            match outcome {
                Ok(()) => {
                    entry.state = AttachmentState::Bound;
                    if let Some(attachment) = entry.attachment.as_mut() {
                        attachment.real_owner_id = Some(real_owner_id.to_string());
                        result.bound.push(attachment.clone());
                    }
                }
                Err(err) => {
                    warn!(attachment_id = %id, error = %err, "bind failed, attachment orphaned");
                    entry.state = AttachmentState::Orphaned;
                    result.failures.push(BindFailure {
                        attachment_id: id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        result
    }

    /// Cancel a pending attachment.
    ///
    /// Aborts the upload task if it is still in flight. A strict no-op
    /// (returning false) once binding has begun or the state is terminal:
    /// there is no retroactive un-binding.
    pub fn remove(&self, attachment_id: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.get_mut(attachment_id) else {
            return false;
        };
        if entry.binding || entry.state != AttachmentState::Pending {
            return false;
        }
        if let Some(task) = entry.task.take() {
            task.abort();
        }
        entry.state = AttachmentState::Removed;
        debug!(%attachment_id, "pending attachment removed");
        true
    }

    /// Current lifecycle state of an attachment.
    pub fn state(&self, attachment_id: &str) -> Option<AttachmentState> {
        self.entries
            .lock()
            .unwrap()
            .get(attachment_id)
            .map(|e| e.state)
    }

    /// Number of live (pending or bound) attachments for an owner key.
    pub fn live_count(&self, temp_owner_id: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| {
                e.temp_owner_id == temp_owner_id
                    && matches!(e.state, AttachmentState::Pending | AttachmentState::Bound)
            })
            .count()
    }
}
