//! End-to-end submission flow tests.
//!
//! Drives the composer, attachment manager, tree, and markdown pipeline
//! together against the recording mock, the way the presentation layer
//! would.

mod common;

use std::time::Duration;

use common::{composer, empty_tree, pdf_file, png_file};
use voltboard::compose::Draft;
use voltboard::error::{SubmissionError, ValidationError};
use voltboard::markdown::{to_html, RenderedNode};
use voltboard::models::AttachmentState;
use voltboard::tree::{sort_threads, ReplySortMode, ThreadSortMode};

#[tokio::test]
async fn test_full_thread_lifecycle() {
    let (composer, _api) = composer();

    // Author a thread with an image
    let mut draft = Draft::new();
    draft.title = Some("Trip report: coast highway".to_string());
    draft.tags = vec!["travel".to_string()];
    draft.set_content("Set off with 96% charge.");
    composer.stage_thread_image(&mut draft, png_file("coast.png")).unwrap();

    let thread = composer.submit_thread(&mut draft, "user-1").await.unwrap();
    assert!(thread.warnings.is_empty());

    // First reply, then a nested one
    let mut tree = voltboard::tree::ReplyTree::new(thread.thread);
    let mut reply_draft = Draft::new();
    reply_draft.set_content("How many charging stops did you need?");
    let first = composer.submit_reply(&mut tree, &mut reply_draft, "user-2").await.unwrap();

    let mut nested_draft = Draft::reply_to(first.reply.id.clone());
    nested_draft.set_content("Asking the same thing here!");
    let nested = composer.submit_reply(&mut tree, &mut nested_draft, "user-3").await.unwrap();

    assert_eq!(nested.reply.nesting_level, 1);
    assert_eq!(tree.children(&first.reply.id).len(), 1);
    assert_eq!(tree.thread().reply_count, 2);
    assert_eq!(tree.roots().len(), 1);
}

#[tokio::test]
async fn test_uploads_run_while_author_keeps_typing() {
    let (composer, api) = composer();
    let mut tree = empty_tree();
    api.set_upload_delay(Duration::from_millis(50));

    let mut draft = Draft::new();
    draft.set_content("started typing");
    let staged = composer.stage_reply_image(&mut draft, png_file("mid.png")).unwrap();

    // The upload is in flight; the author keeps editing meanwhile
    assert_eq!(composer.attachments().state(&staged), Some(AttachmentState::Pending));
    draft.set_content("started typing and kept going to a full reply");

    let submission = composer.submit_reply(&mut tree, &mut draft, "user-2").await.unwrap();
    assert_eq!(submission.reply.attachments.len(), 1);
    assert_eq!(submission.reply.attachments[0].filename, "mid.png");
    assert_eq!(composer.attachments().state(&staged), Some(AttachmentState::Bound));
}

#[tokio::test]
async fn test_fourth_image_rejected_while_first_three_survive_submission() {
    let (composer, _api) = composer();
    let mut tree = empty_tree();

    let mut draft = Draft::new();
    draft.set_content("a reply carrying the maximum of three images");
    for i in 0..3 {
        composer.stage_reply_image(&mut draft, png_file(&format!("{i}.png"))).unwrap();
    }

    let err = composer
        .stage_reply_image(&mut draft, png_file("fourth.png"))
        .unwrap_err();
    assert!(err.to_string().contains("fourth.png"));

    let submission = composer.submit_reply(&mut tree, &mut draft, "user-2").await.unwrap();
    assert_eq!(submission.reply.attachments.len(), 3);
}

#[tokio::test]
async fn test_mixed_attachment_contexts_do_not_share_limits() {
    let (composer, _api) = composer();

    // General post attachments are unbounded in count
    let mut draft = Draft::new();
    draft.set_content("a pile of PDFs attached to one post");
    for i in 0..6 {
        composer
            .stage_post_attachment(&mut draft, pdf_file(&format!("doc{i}.pdf")))
            .unwrap();
    }
    assert_eq!(composer.attachments().live_count(&draft.temp_owner_id), 6);
}

#[tokio::test]
async fn test_validation_failure_leaves_no_trace() {
    let (composer, api) = composer();
    let mut tree = empty_tree();

    let mut draft = Draft::new();
    draft.set_content("nine char"); // one below the reply minimum

    let err = composer.submit_reply(&mut tree, &mut draft, "user-2").await.unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::Validation(ValidationError::ContentTooShort { .. })
    ));
    assert!(api.create_calls().is_empty());
    assert!(api.association_calls().is_empty());
    assert!(tree.is_empty());
    assert_eq!(draft.content, "nine char");
}

#[tokio::test]
async fn test_submitted_content_renders_for_display() {
    let (composer, _api) = composer();
    let mut tree = empty_tree();

    let mut draft = Draft::new();
    draft.set_content("**Bold** claim with a [source](https://example.com/data).");
    let submission = composer.submit_reply(&mut tree, &mut draft, "user-2").await.unwrap();

    let rendered = &submission.reply.rendered_content;
    assert!(matches!(rendered[0], RenderedNode::Paragraph { .. }));
    let html = to_html(rendered);
    assert!(html.contains("<strong>Bold</strong>"));
    assert!(html.contains("href=\"https://example.com/data\""));
}

#[tokio::test]
async fn test_edit_recomputes_rendered_content() {
    let (composer, _api) = composer();
    let mut tree = empty_tree();

    let mut draft = Draft::new();
    draft.set_content("original text of the reply");
    let submission = composer.submit_reply(&mut tree, &mut draft, "user-2").await.unwrap();
    let id = submission.reply.id;

    tree.edit(&id, "edited to ~~strike~~ something".to_string()).unwrap();
    let edited = tree.get(&id).unwrap();
    assert!(edited.is_edited());
    assert!(to_html(&edited.rendered_content).contains("<del>strike</del>"));
    // Shape untouched by the edit
    assert_eq!(edited.nesting_level, 0);
}

#[tokio::test]
async fn test_sibling_sort_after_submissions() {
    let (composer, _api) = composer();
    let mut tree = empty_tree();

    for content in [
        "the first reply to arrive",
        "the second reply to arrive",
        "the third reply to arrive",
    ] {
        let mut draft = Draft::new();
        draft.set_content(content);
        composer.submit_reply(&mut tree, &mut draft, "user-2").await.unwrap();
    }

    tree.sort_siblings(None, ReplySortMode::Newest);
    let newest_first: Vec<&str> = tree.roots().iter().map(|r| r.content.as_str()).collect();
    assert_eq!(newest_first[0], "the third reply to arrive");

    tree.sort_siblings(None, ReplySortMode::Oldest);
    let oldest_first: Vec<&str> = tree.roots().iter().map(|r| r.content.as_str()).collect();
    assert_eq!(oldest_first[0], "the first reply to arrive");
}

#[tokio::test]
async fn test_thread_list_sorting_keeps_pinned_first() {
    let (composer, _api) = composer();

    let mut threads = Vec::new();
    for (title, body) in [
        ("Winter tires", "thread one body"),
        ("Announcements", "thread two body"),
        ("Charging map", "thread three body"),
    ] {
        let mut draft = Draft::new();
        draft.title = Some(title.to_string());
        draft.set_content(body);
        threads.push(composer.submit_thread(&mut draft, "user-1").await.unwrap().thread);
    }
    threads[1].is_pinned = true;
    threads[2].view_count = 50_000;

    sort_threads(&mut threads, ThreadSortMode::Popular);
    assert_eq!(threads[0].title, "Announcements");
    assert_eq!(threads[1].title, "Charging map");

    sort_threads(&mut threads, ThreadSortMode::Newest);
    assert_eq!(threads[0].title, "Announcements");
}
