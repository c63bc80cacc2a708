//! Sorting for sibling reply sets and thread lists.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Reply, Thread};

/// View count above which a thread counts as trending.
pub const TRENDING_VIEWS_THRESHOLD: u64 = 1000;

/// Ordering for one sibling set of replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySortMode {
    /// Oldest first, by creation time
    Oldest,
    /// Newest first, by creation time
    Newest,
}

/// Ordering for a thread list.
///
/// Whatever the mode, pinned threads always sort before unpinned ones:
/// pinned-first is a standing tie-break, not a selectable mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadSortMode {
    /// Oldest first, by creation time
    Oldest,
    /// Newest first, by creation time
    Newest,
    /// Most recent reply activity first
    LatestActivity,
    /// Most viewed first
    Popular,
    /// Most replies first
    Replies,
    /// Threads above [`TRENDING_VIEWS_THRESHOLD`] views first (by views),
    /// the remainder by latest activity
    Trending,
}

/// Reorder a sibling id list by the creation time of the replies it names.
pub(crate) fn sort_reply_ids(
    ids: &mut [String],
    replies: &HashMap<String, Reply>,
    mode: ReplySortMode,
) {
    ids.sort_by(|a, b| {
        let (Some(ra), Some(rb)) = (replies.get(a), replies.get(b)) else {
            return Ordering::Equal;
        };
        match mode {
            ReplySortMode::Oldest => ra.created_at.cmp(&rb.created_at),
            ReplySortMode::Newest => rb.created_at.cmp(&ra.created_at),
        }
    });
}

/// Sort a thread list in place.
///
/// Pinned threads come first regardless of mode; the chosen mode orders
/// each group. The sort is stable, so equal keys keep their relative order.
pub fn sort_threads(threads: &mut [Thread], mode: ThreadSortMode) {
    threads.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| compare_by_mode(a, b, mode))
    });
}

fn compare_by_mode(a: &Thread, b: &Thread, mode: ThreadSortMode) -> Ordering {
    match mode {
        ThreadSortMode::Oldest => a.created_at.cmp(&b.created_at),
        ThreadSortMode::Newest => b.created_at.cmp(&a.created_at),
        ThreadSortMode::LatestActivity => b.last_activity_at.cmp(&a.last_activity_at),
        ThreadSortMode::Popular => b.view_count.cmp(&a.view_count),
        ThreadSortMode::Replies => b.reply_count.cmp(&a.reply_count),
        ThreadSortMode::Trending => {
            let a_trending = a.view_count > TRENDING_VIEWS_THRESHOLD;
            let b_trending = b.view_count > TRENDING_VIEWS_THRESHOLD;
            b_trending.cmp(&a_trending).then_with(|| {
                if a_trending && b_trending {
                    b.view_count.cmp(&a.view_count)
                } else {
                    b.last_activity_at.cmp(&a.last_activity_at)
                }
            })
        }
    }
}
