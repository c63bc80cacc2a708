//! Memoization cache for markdown rendering.
//!
//! Caches rendered output keyed by a hash of the input content. Reply
//! content is re-displayed far more often than it is edited, and an edit
//! regenerates the rendered form wholesale, so hashing the raw text is a
//! correct cache key.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use super::{render, RenderedNode, MARKDOWN_CACHE_MAX_ENTRIES};

/// Memoization cache for [`render`].
///
/// Keyed by content hash with insertion-order eviction once
/// [`MARKDOWN_CACHE_MAX_ENTRIES`] is exceeded. Because `render` is pure,
/// a hit is structurally identical to a fresh render.
pub struct MarkdownCache {
    /// Cache entries keyed by content hash
    entries: HashMap<u64, Vec<RenderedNode>>,
    /// Insertion order for eviction (oldest first)
    insertion_order: Vec<u64>,
    /// Statistics: cache hits
    hits: u64,
    /// Statistics: cache misses
    misses: u64,
}

impl Default for MarkdownCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: Vec::new(),
            hits: 0,
            misses: 0,
        }
    }

    fn hash_content(content: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }

    /// Render markdown with caching.
    pub fn render(&mut self, content: &str) -> Vec<RenderedNode> {
        let hash = Self::hash_content(content);

        if let Some(cached) = self.entries.get(&hash) {
            self.hits += 1;
            return cached.clone();
        }

        self.misses += 1;
        let nodes = render(content);

        if self.entries.len() >= MARKDOWN_CACHE_MAX_ENTRIES {
            if let Some(oldest) = self.insertion_order.first().copied() {
                self.insertion_order.remove(0);
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(hash, nodes.clone());
        self.insertion_order.push(hash);
        nodes
    }

    /// Drop all cached entries, keeping the statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }

    /// (hits, misses) counters since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
