//! Ordered tag collection owned by the store actor

use std::collections::HashSet;

use crate::types::{Tag, TagIdentity};

/// Insertion-ordered set of tags keyed by identity
#[derive(Debug, Default)]
pub struct TagSet {
    tags: Vec<Tag>,
    index: HashSet<TagIdentity>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert tags whose identity is not yet present; returns the inserted ones
    pub fn add(&mut self, tags: Vec<Tag>) -> Vec<Tag> {
        let mut added = Vec::new();
        for tag in tags {
            if self.index.insert(tag.identity()) {
                added.push(tag.clone());
                self.tags.push(tag);
            }
        }
        added
    }

    /// Remove tags matching by identity; returns the stored entries removed
    pub fn delete(&mut self, tags: Vec<Tag>) -> Vec<Tag> {
        let mut removed = Vec::new();
        for tag in tags {
            if self.index.remove(&tag.identity()) {
                if let Some(pos) = self.tags.iter().position(|t| *t == tag) {
                    removed.push(self.tags.remove(pos));
                }
            }
        }
        removed
    }

    /// Snapshot of all tags in insertion order
    pub fn snapshot(&self) -> Vec<Tag> {
        self.tags.clone()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
