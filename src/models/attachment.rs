use serde::{Deserialize, Serialize};

/// Lifecycle state of an uploaded attachment.
///
/// Transitions are `Pending -> Bound`, `Pending -> Orphaned`, and
/// `Pending -> Removed` (user cancellation). `Bound`, `Orphaned`, and
/// `Removed` are terminal within this crate; orphaned storage bytes are
/// reclaimed by an external garbage-collection collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentState {
    /// Uploaded (or uploading) against a temporary owner key
    Pending,
    /// Associated with its real owning entity
    Bound,
    /// Binding failed or never happened; awaiting external reclamation
    Orphaned,
    /// Cancelled by the author before binding began
    Removed,
}

impl AttachmentState {
    /// Whether the state permits no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttachmentState::Pending)
    }
}

/// Reference to an uploaded file owned by a thread or reply.
///
/// Created with `temp_owner_id` set before the owning entity exists on the
/// server, then re-linked to `real_owner_id` once the entity is persisted.
/// The storage bytes themselves are owned by the external storage
/// collaborator; this is only the reference the reply carries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Attachment id, assigned by the engine at upload start so the
    /// reference exists before the storage collaborator has answered
    pub id: String,
    /// Temporary owner key used before the owning entity exists
    #[serde(default)]
    pub temp_owner_id: Option<String>,
    /// Id of the owning thread or reply, set at bind time
    #[serde(default)]
    pub real_owner_id: Option<String>,
    /// Original filename as selected by the author
    pub filename: String,
    /// Declared MIME type (e.g. "image/png")
    pub mime_type: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Storage path returned by the upload collaborator
    pub storage_path: String,
}

impl AttachmentRef {
    /// Whether the declared MIME type is an image type.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Format the file size for display (e.g. "1.2 KB", "3.4 MB").
    pub fn format_size(&self) -> String {
        let bytes = self.size_bytes;
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}
