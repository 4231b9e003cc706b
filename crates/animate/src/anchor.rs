//! Sibling anchors and deletion markers
//!
//! Two side-tables for removed elements. The anchor remembers where an
//! element sat when it was removed so its exit can be replayed in place;
//! the marker set remembers which elements are exiting so their own
//! reinsertion is not mistaken for a fresh mutation.

use ahash::{AHashMap, AHashSet};
use dom::NodeId;
use serde::{Deserialize, Serialize};

/// Neighbours of a removed element at removal time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiblingContext {
    pub previous: Option<NodeId>,
    pub next: Option<NodeId>,
}

#[derive(Debug, Default)]
pub struct SiblingAnchor {
    contexts: AHashMap<NodeId, SiblingContext>,
}

impl SiblingAnchor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later removals of the same element overwrite earlier ones
    pub fn record(&mut self, node: NodeId, context: SiblingContext) {
        self.contexts.insert(node, context);
    }

    pub fn get(&self, node: NodeId) -> Option<SiblingContext> {
        self.contexts.get(&node).copied()
    }

    pub fn forget(&mut self, node: NodeId) -> Option<SiblingContext> {
        self.contexts.remove(&node)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

/// Elements whose exit animation has started. Never cleared.
#[derive(Debug, Default)]
pub struct DeletionMarkers {
    exiting: AHashSet<NodeId>,
}

impl DeletionMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, node: NodeId) {
        self.exiting.insert(node);
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.exiting.contains(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_overwrite_and_forget() {
        let mut anchors = SiblingAnchor::new();
        anchors.record(
            2,
            SiblingContext {
                previous: Some(1),
                next: Some(3),
            },
        );
        anchors.record(
            2,
            SiblingContext {
                previous: None,
                next: Some(3),
            },
        );

        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors.get(2).and_then(|c| c.previous), None);
        assert!(anchors.forget(2).is_some());
        assert!(anchors.forget(2).is_none());
        assert!(anchors.is_empty());
    }

    #[test]
    fn test_markers() {
        let mut markers = DeletionMarkers::new();
        assert!(!markers.contains(9));
        markers.mark(9);
        markers.mark(9);
        assert!(markers.contains(9));
    }
}
