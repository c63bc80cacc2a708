//! Draft state for a post being written.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Default autosave file name under the user's home directory.
const AUTOSAVE_FILE: &str = ".voltboard_draft.json";

/// A formatting command the editor toolbar can apply to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    Strikethrough,
    InlineCode,
}

impl Format {
    fn marker(&self) -> &'static str {
        match self {
            Format::Bold => "**",
            Format::Italic => "*",
            Format::Strikethrough => "~~",
            Format::InlineCode => "`",
        }
    }
}

/// Everything a post-in-progress is: content, selection, pending
/// attachments, and undo history.
///
/// Serializable by design so the whole authoring state can be autosaved
/// and restored after a crash. The temporary owner key is generated with
/// the draft and identifies its uploads until the real entity exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Draft {
    /// Owner key for uploads made before the post exists
    pub temp_owner_id: String,
    /// Thread title (new-thread drafts only)
    #[serde(default)]
    pub title: Option<String>,
    /// Topic tags (new-thread drafts only)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Parent reply id (nested-reply drafts only)
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Markdown source as typed so far
    #[serde(default)]
    pub content: String,
    /// Selected byte range of `content`, if any
    #[serde(default)]
    pub selection: Option<(usize, usize)>,
    /// Attachment ids staged with the attachment manager
    #[serde(default)]
    pub pending_attachment_ids: Vec<String>,
    #[serde(default)]
    undo_stack: Vec<String>,
    #[serde(default)]
    redo_stack: Vec<String>,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

impl Draft {
    /// Empty draft for a new thread or a direct reply.
    pub fn new() -> Self {
        Self {
            temp_owner_id: Uuid::new_v4().to_string(),
            title: None,
            tags: Vec::new(),
            parent_id: None,
            content: String::new(),
            selection: None,
            pending_attachment_ids: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Empty draft replying to an existing reply.
    pub fn reply_to(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::new()
        }
    }

    /// Whether the content is empty after trimming.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Replace the content, recording the previous text for undo.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.snapshot();
        self.content = content.into();
        self.selection = None;
    }

    /// Wrap the current selection in the command's markers.
    ///
    /// With no selection the markers are appended as an empty pair, ready
    /// to be typed into. The selection is adjusted to keep covering the
    /// same text afterwards.
    pub fn apply_format(&mut self, format: Format) {
        let marker = format.marker();
        self.snapshot();
        match self.selection {
            Some((start, end)) if start < end && end <= self.content.len() => {
                let (start, end) = (floor_char_boundary(&self.content, start), floor_char_boundary(&self.content, end));
                self.content.insert_str(end, marker);
                self.content.insert_str(start, marker);
                self.selection = Some((start + marker.len(), end + marker.len()));
            }
            _ => {
                self.content.push_str(marker);
                let cursor = self.content.len();
                self.content.push_str(marker);
                self.selection = Some((cursor, cursor));
            }
        }
    }

    /// Record a pending attachment staged with the attachment manager.
    pub fn add_attachment(&mut self, attachment_id: impl Into<String>) {
        self.pending_attachment_ids.push(attachment_id.into());
    }

    /// Forget a pending attachment (the manager cancels the upload).
    pub fn remove_attachment(&mut self, attachment_id: &str) {
        self.pending_attachment_ids.retain(|id| id != attachment_id);
    }

    /// Undo the last content change.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                self.redo_stack.push(std::mem::replace(&mut self.content, previous));
                self.selection = None;
                true
            }
            None => false,
        }
    }

    /// Redo the last undone change.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                self.undo_stack.push(std::mem::replace(&mut self.content, next));
                self.selection = None;
                true
            }
            None => false,
        }
    }

    /// Reset to an empty draft with a fresh temporary owner key.
    ///
    /// Called after a successful submission; a failed one keeps the draft
    /// untouched.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn snapshot(&mut self) {
        self.undo_stack.push(self.content.clone());
        self.redo_stack.clear();
    }

    /// Persist the draft as JSON.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    /// Load a draft from JSON; None when the file does not exist or does
    /// not parse (a corrupt autosave never blocks composing).
    pub fn load_from(path: &Path) -> Option<Self> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    fn autosave_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(AUTOSAVE_FILE))
    }

    /// Autosave to the default location, if there is one.
    pub fn autosave(&self) -> std::io::Result<()> {
        let Some(path) = Self::autosave_path() else {
            return Ok(());
        };
        debug!(path = %path.display(), "autosaving draft");
        self.save_to(&path)
    }

    /// Restore the last autosaved draft, if any.
    pub fn restore() -> Option<Self> {
        Self::load_from(&Self::autosave_path()?)
    }
}

/// Largest index `<= index` that lies on a char boundary.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
