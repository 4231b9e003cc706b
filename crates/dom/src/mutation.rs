//! Child-list mutation observation
//!
//! Each registration keeps its own FIFO of records. Nothing is delivered
//! eagerly: the embedder drains `take_records` at its checkpoint, which is
//! the moral equivalent of the microtask that fires MutationObserver
//! callbacks in a browser.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::arena::DomArena;
use crate::types::NodeId;

/// Observer registration handle
pub type ObserverId = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub subtree: bool,
}

impl MutationObserverInit {
    /// childList on the whole subtree
    pub fn subtree_child_list() -> Self {
        Self {
            child_list: true,
            subtree: true,
        }
    }
}

/// A single child-list change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added_nodes: SmallVec<[NodeId; 2]>,
    pub removed_nodes: SmallVec<[NodeId; 2]>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

#[derive(Debug)]
struct Registration {
    target: NodeId,
    options: MutationObserverInit,
    queue: Vec<MutationRecord>,
}

impl Registration {
    fn interested_in(&self, record: &MutationRecord, arena: &DomArena) -> bool {
        if !self.options.child_list {
            return false;
        }
        record.target == self.target
            || (self.options.subtree && arena.is_inclusive_ancestor(self.target, record.target))
    }
}

/// All observer registrations of one document
#[derive(Debug, Default)]
pub struct MutationObservers {
    next_id: ObserverId,
    registrations: AHashMap<ObserverId, Registration>,
}

impl MutationObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.registrations.insert(
            id,
            Registration {
                target,
                options,
                queue: Vec::new(),
            },
        );
        id
    }

    /// Drop the registration and anything still queued for it
    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        self.registrations.remove(&observer).is_some()
    }

    /// Fan a record out to every interested registration
    pub fn queue(&mut self, record: MutationRecord, arena: &DomArena) {
        for registration in self.registrations.values_mut() {
            if registration.interested_in(&record, arena) {
                registration.queue.push(record.clone());
            }
        }
    }

    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.registrations
            .get_mut(&observer)
            .map(|r| std::mem::take(&mut r.queue))
            .unwrap_or_default()
    }
}
