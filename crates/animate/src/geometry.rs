//! Coordinate tracking
//!
//! An [`ElementBox`] is a page-relative snapshot of an element: its client
//! rect pushed back by the parent's scroll offset. The tracker keeps the
//! last snapshot per element so the next batch can diff against it.

use ahash::AHashMap;
use dom::{BoxSizing, ComputedStyle, NodeId};
use serde::{Deserialize, Serialize};

use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Snapshot an element's box right now
pub fn capture(host: &dyn Host, node: NodeId) -> ElementBox {
    let rect = host.bounding_rect(node);
    let (scroll_left, scroll_top) = host
        .parent(node)
        .map(|parent| host.scroll_offset(parent))
        .unwrap_or((0.0, 0.0));

    ElementBox {
        top: rect.y + scroll_top,
        left: rect.x + scroll_left,
        width: rect.width,
        height: rect.height,
    }
}

/// Old/new dimensions as the element's `width`/`height` properties see them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSize {
    pub old_width: f64,
    pub old_height: f64,
    pub new_width: f64,
    pub new_height: f64,
}

/// Normalize two boxes to the element's sizing model.
///
/// Boxes are border boxes. Under `content-box` the `width`/`height`
/// properties exclude padding and border, so both sides lose them. The
/// same (current) style is applied to both boxes.
pub fn transition_size(style: &ComputedStyle, old: &ElementBox, new: &ElementBox) -> TransitionSize {
    let mut size = TransitionSize {
        old_width: old.width,
        old_height: old.height,
        new_width: new.width,
        new_height: new.height,
    };

    if style.box_sizing == BoxSizing::ContentBox {
        let delta_x = style.padding.horizontal() + style.border.horizontal();
        let delta_y = style.padding.vertical() + style.border.vertical();
        size.old_width -= delta_x;
        size.new_width -= delta_x;
        size.old_height -= delta_y;
        size.new_height -= delta_y;
    }

    size
}

/// Last-known box per element, scoped to one engine instance
#[derive(Debug, Default)]
pub struct CoordinateTracker {
    boxes: AHashMap<NodeId, ElementBox>,
}

impl CoordinateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, node: NodeId, element_box: ElementBox) {
        self.boxes.insert(node, element_box);
    }

    pub fn lookup(&self, node: NodeId) -> Option<ElementBox> {
        self.boxes.get(&node).copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.boxes.contains_key(&node)
    }

    pub fn forget(&mut self, node: NodeId) -> Option<ElementBox> {
        self.boxes.remove(&node)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
