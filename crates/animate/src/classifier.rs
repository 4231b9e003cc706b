//! Mutation classification
//!
//! Reduces one batch of child-list records to the ordered, deduplicated set
//! of elements that need a transition. For every record the target and its
//! current element children are affected, plus every removed element, whose
//! neighbours are captured as a [`SiblingContext`].
//!
//! A batch touching any exiting element (as a current child or as a removed
//! node) is the echo of an exit reinsertion or detachment and is dropped
//! whole. This is coarse: unrelated genuine records in the same batch are
//! dropped with it.

use ahash::AHashSet;
use dom::{MutationRecord, NodeId};
use smallvec::SmallVec;

use crate::anchor::{DeletionMarkers, SiblingAnchor, SiblingContext};
use crate::host::Host;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Echo of the engine's own DOM edits
    Ignore,
    /// Elements to transition, in first-seen order
    Affected(Vec<NodeId>),
}

pub fn classify(
    host: &dyn Host,
    records: &[MutationRecord],
    markers: &DeletionMarkers,
    anchors: &mut SiblingAnchor,
) -> Classification {
    let mut seen = AHashSet::new();
    let mut affected = Vec::new();
    let mut removals: SmallVec<[(NodeId, SiblingContext); 4]> = SmallVec::new();

    for record in records {
        if !host.is_element(record.target) {
            continue;
        }

        if seen.insert(record.target) {
            affected.push(record.target);
            for child in host.children(record.target) {
                if markers.contains(child) {
                    return Classification::Ignore;
                }
                if seen.insert(child) {
                    affected.push(child);
                }
            }
        }

        for &removed in &record.removed_nodes {
            if markers.contains(removed) {
                return Classification::Ignore;
            }
            if !host.is_element(removed) {
                continue;
            }
            if seen.insert(removed) {
                affected.push(removed);
            }
            removals.push((
                removed,
                SiblingContext {
                    previous: record.previous_sibling,
                    next: record.next_sibling,
                },
            ));
        }
    }

    // Anchors are only committed for batches that are actually processed
    for (node, context) in removals {
        anchors.record(node, context);
    }

    Classification::Affected(affected)
}
