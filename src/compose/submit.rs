//! Validation and submission of drafts.
//!
//! The submission sequence is fixed: validate, create the post, bind
//! attachments to the returned id, insert into the tree, clear the draft.
//! Binding never runs before the create call has succeeded (the entity
//! must exist before files can be associated with it), and a failed
//! submission leaves the draft and its pending attachments untouched.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::attachments::{AttachmentManager, UploadContext};
use crate::error::{
    AttachmentError, BindFailure, CreationError, InvariantViolation, SubmissionError,
    ValidationError,
};
use crate::markdown;
use crate::models::{AttachmentState, Reply, Thread};
use crate::traits::{CreatePostRequest, FileApi, PostApi, UploadFile};
use crate::tree::ReplyTree;

use super::Draft;

/// Minimum reply length in characters, after trimming.
pub const MIN_REPLY_CHARS: usize = 10;
/// Maximum reply length in characters.
pub const MAX_REPLY_CHARS: usize = 5000;

/// A successfully created reply plus any non-fatal attachment warnings.
#[derive(Debug, Clone)]
pub struct Submission {
    /// The reply, already inserted into the tree
    pub reply: Reply,
    /// Per-file bind failures; the affected attachments are orphaned and
    /// absent from the reply's attachment list
    pub warnings: Vec<BindFailure>,
}

/// A successfully created thread plus any non-fatal attachment warnings.
#[derive(Debug, Clone)]
pub struct ThreadSubmission {
    /// The new thread; wrap it in a [`ReplyTree`] to start accepting replies
    pub thread: Thread,
    /// Per-file bind failures for the thread's images
    pub warnings: Vec<BindFailure>,
}

/// Orchestrates authoring: staging attachments eagerly, validating drafts,
/// and driving them through create, bind, and insert.
pub struct Composer<A: PostApi + FileApi + 'static> {
    api: Arc<A>,
    attachments: AttachmentManager<A>,
}

impl<A: PostApi + FileApi + 'static> Composer<A> {
    /// Create a composer over the given backend collaborator.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            attachments: AttachmentManager::new(Arc::clone(&api)),
            api,
        }
    }

    /// The attachment manager, for state queries and cancellation.
    pub fn attachments(&self) -> &AttachmentManager<A> {
        &self.attachments
    }

    /// Stage an inline image for a reply draft.
    ///
    /// The upload starts immediately and runs while the author keeps
    /// typing; it is not gated on submission. A constraint violation
    /// rejects only this file.
    pub fn stage_reply_image(
        &self,
        draft: &mut Draft,
        file: UploadFile,
    ) -> Result<String, AttachmentError> {
        self.stage(draft, file, UploadContext::ReplyImage)
    }

    /// Stage an image for a new-thread draft.
    pub fn stage_thread_image(
        &self,
        draft: &mut Draft,
        file: UploadFile,
    ) -> Result<String, AttachmentError> {
        self.stage(draft, file, UploadContext::ThreadImage)
    }

    /// Stage a general attachment for a post draft.
    pub fn stage_post_attachment(
        &self,
        draft: &mut Draft,
        file: UploadFile,
    ) -> Result<String, AttachmentError> {
        self.stage(draft, file, UploadContext::PostAttachment)
    }

    fn stage(
        &self,
        draft: &mut Draft,
        file: UploadFile,
        context: UploadContext,
    ) -> Result<String, AttachmentError> {
        let id = self
            .attachments
            .start_upload(file, context, &draft.temp_owner_id)?;
        draft.add_attachment(id.clone());
        Ok(id)
    }

    /// Cancel a staged attachment and drop it from the draft.
    ///
    /// A no-op for attachments whose binding has already begun.
    pub fn unstage(&self, draft: &mut Draft, attachment_id: &str) {
        if self.attachments.remove(attachment_id) {
            draft.remove_attachment(attachment_id);
        }
    }

    /// Submit a reply draft into the given thread's tree.
    ///
    /// On success the reply is in the tree and the draft is cleared. On
    /// failure nothing is inserted, the draft keeps the typed content, and
    /// pending attachments stay pending for the retry.
    pub async fn submit_reply(
        &self,
        tree: &mut ReplyTree,
        draft: &mut Draft,
        author_ref: &str,
    ) -> Result<Submission, SubmissionError> {
        let content = draft.content.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyContent.into());
        }
        let chars = content.chars().count();
        if chars < MIN_REPLY_CHARS {
            return Err(ValidationError::ContentTooShort { len: chars, min: MIN_REPLY_CHARS }.into());
        }
        if chars > MAX_REPLY_CHARS {
            return Err(ValidationError::ContentTooLong { len: chars, max: MAX_REPLY_CHARS }.into());
        }
        self.check_attachment_count(draft, UploadContext::ReplyImage)?;

        // Contract checks before any network effect: the affordance to
        // reply here must actually exist
        let nesting_level = match &draft.parent_id {
            Some(parent_id) => {
                let parent = tree.get(parent_id).ok_or_else(|| {
                    InvariantViolation::UnknownParent { parent_id: parent_id.clone() }
                })?;
                if !parent.can_reply_to() {
                    return Err(InvariantViolation::NestingTooDeep {
                        level: parent.nesting_level + 1,
                    }
                    .into());
                }
                parent.nesting_level + 1
            }
            None => 0,
        };

        let thread = tree.thread();
        if thread.is_locked {
            return Err(CreationError::ThreadLocked { thread_id: thread.id.clone() }.into());
        }

        let created = self
            .api
            .create_post(CreatePostRequest {
                thread_id: Some(thread.id.clone()),
                parent_id: draft.parent_id.clone(),
                title: None,
                content: draft.content.clone(),
                tags: None,
            })
            .await
            .map_err(CreationError::Api)?;

        // The entity exists now; attachments may be re-associated
        let bind = self
            .attachments
            .bind(&draft.pending_attachment_ids, &created.id)
            .await;
        for failure in &bind.failures {
            warn!(%failure, "attachment dropped from reply");
        }

        let reply = Reply {
            id: created.id,
            thread_id: thread.id.clone(),
            parent_id: draft.parent_id.clone(),
            author_ref: author_ref.to_string(),
            rendered_content: markdown::render(&draft.content),
            content: draft.content.clone(),
            attachments: bind.bound,
            created_at: created.created_at,
            edited_at: None,
            nesting_level,
        };

        tree.insert(reply.clone())?;
        info!(reply_id = %reply.id, thread_id = %reply.thread_id, "reply submitted");

        draft.clear();
        Ok(Submission {
            reply,
            warnings: bind.failures,
        })
    }

    /// Submit a new-thread draft.
    ///
    /// Threads have no minimum content length, only non-emptiness, and
    /// need a title. The returned thread is ready to be wrapped in a
    /// [`ReplyTree`].
    pub async fn submit_thread(
        &self,
        draft: &mut Draft,
        author_ref: &str,
    ) -> Result<ThreadSubmission, SubmissionError> {
        if draft.is_empty() {
            return Err(ValidationError::EmptyContent.into());
        }
        let title = match draft.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => return Err(ValidationError::EmptyTitle.into()),
        };
        self.check_attachment_count(draft, UploadContext::ThreadImage)?;

        let tags: BTreeSet<String> = draft.tags.iter().cloned().collect();
        let created = self
            .api
            .create_post(CreatePostRequest {
                thread_id: None,
                parent_id: None,
                title: Some(title.clone()),
                content: draft.content.clone(),
                tags: Some(tags.iter().cloned().collect()),
            })
            .await
            .map_err(CreationError::Api)?;

        let bind = self
            .attachments
            .bind(&draft.pending_attachment_ids, &created.id)
            .await;
        for failure in &bind.failures {
            warn!(%failure, "attachment dropped from thread");
        }

        let thread = Thread::new(created.id, title, author_ref, created.created_at, tags);
        info!(thread_id = %thread.id, "thread submitted");

        draft.clear();
        Ok(ThreadSubmission {
            thread,
            warnings: bind.failures,
        })
    }

    /// Defense in depth: the staging calls already enforce limits, but the
    /// submission boundary re-checks the live count in case the draft was
    /// assembled some other way.
    fn check_attachment_count(
        &self,
        draft: &Draft,
        context: UploadContext,
    ) -> Result<(), ValidationError> {
        let Some(limit) = context.max_count() else {
            return Ok(());
        };
        let live = draft
            .pending_attachment_ids
            .iter()
            .filter(|id| {
                matches!(
                    self.attachments.state(id),
                    Some(AttachmentState::Pending | AttachmentState::Bound)
                )
            })
            .count();
        if live > limit {
            return Err(ValidationError::TooManyAttachments {
                filename: String::new(),
                limit,
            });
        }
        Ok(())
    }
}
