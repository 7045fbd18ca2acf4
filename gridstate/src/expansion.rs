//! Row expansion state.
//!
//! One level of nesting: an expanded row reveals caller-rendered
//! sub-content directly below it on the same page. Expansion is tracked by
//! row id, so it survives sort, filter and page changes for identity-stable
//! rows. Expanding a row never implicitly collapses another; callers
//! wanting single-expansion call [`Expansion::collapse_all`] first.

use std::collections::HashSet;

/// Id-based expansion state.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    expanded: HashSet<String>,
}

impl Expansion {
    /// Create a new state with every row collapsed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all expanded ids (sorted for deterministic ordering).
    pub fn expanded(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.expanded.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Check if a row is expanded.
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Get the number of expanded rows.
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    /// Check if every row is collapsed.
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    /// Toggle a row's expansion. Returns whether the row is now expanded.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    /// Expand a row.
    pub fn expand(&mut self, id: &str) {
        self.expanded.insert(id.to_string());
    }

    /// Collapse a row.
    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    /// Collapse every row.
    /// Returns the ids that were expanded.
    pub fn collapse_all(&mut self) -> Vec<String> {
        self.expanded.drain().collect()
    }

    pub(crate) fn ids(&self) -> &HashSet<String> {
        &self.expanded
    }
}
