//! Host platform seam
//!
//! The engine never touches a document directly. Everything it needs from
//! the platform (geometry, styles, tree edits, observation, animation
//! playback) goes through [`Host`]. `DomService` is the in-tree
//! implementation; a browser binding would implement the same trait over
//! real DOM handles mapped to `NodeId`s.
//!
//! Queries are infallible on purpose: unknown nodes read as detached,
//! unstyled and zero-sized, which is what the engine's degrade-to-no-op
//! error policy wants.

use dom::{
    AnimationId, AnimationTiming, ComputedStyle, DomRect, DomService, Keyframe,
    MutationObserverInit, MutationRecord, NodeId, ObserverId,
};

pub trait Host {
    /// Border box in viewport coordinates
    fn bounding_rect(&self, node: NodeId) -> DomRect;

    /// (scrollLeft, scrollTop)
    fn scroll_offset(&self, node: NodeId) -> (f64, f64);

    fn computed_style(&self, node: NodeId) -> ComputedStyle;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Element children in tree order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn is_connected(&self, node: NodeId) -> bool;

    fn is_element(&self, node: NodeId) -> bool;

    fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> dom::Result<()>;

    fn append_child(&mut self, parent: NodeId, node: NodeId) -> dom::Result<()> {
        self.insert_before(parent, node, None)
    }

    fn remove(&mut self, node: NodeId) -> dom::Result<()>;

    /// Set one inline style declaration
    fn set_style(&mut self, node: NodeId, name: &str, value: &str) -> dom::Result<()>;

    fn animate(
        &mut self,
        node: NodeId,
        keyframes: Vec<Keyframe>,
        timing: AnimationTiming,
    ) -> dom::Result<AnimationId>;

    fn observe(&mut self, root: NodeId, options: MutationObserverInit) -> ObserverId;

    fn disconnect(&mut self, observer: ObserverId) -> bool;

    /// Drain queued records for one observer, oldest first
    fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord>;

    /// Drain completion notifications of finished animations
    fn take_finished(&mut self) -> Vec<AnimationId>;
}

impl Host for DomService {
    fn bounding_rect(&self, node: NodeId) -> DomRect {
        self.bounding_client_rect(node).unwrap_or_else(|_| DomRect::zero())
    }

    fn scroll_offset(&self, node: NodeId) -> (f64, f64) {
        DomService::scroll_offset(self, node).unwrap_or((0.0, 0.0))
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        DomService::computed_style(self, node).unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        DomService::parent(self, node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        DomService::children(self, node)
    }

    fn is_connected(&self, node: NodeId) -> bool {
        DomService::is_connected(self, node)
    }

    fn is_element(&self, node: NodeId) -> bool {
        DomService::is_element(self, node)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> dom::Result<()> {
        DomService::insert_before(self, parent, node, reference)
    }

    fn remove(&mut self, node: NodeId) -> dom::Result<()> {
        DomService::remove(self, node)
    }

    fn set_style(&mut self, node: NodeId, name: &str, value: &str) -> dom::Result<()> {
        self.set_style_property(node, name, value)
    }

    fn animate(
        &mut self,
        node: NodeId,
        keyframes: Vec<Keyframe>,
        timing: AnimationTiming,
    ) -> dom::Result<AnimationId> {
        DomService::animate(self, node, keyframes, timing)
    }

    fn observe(&mut self, root: NodeId, options: MutationObserverInit) -> ObserverId {
        DomService::observe(self, root, options)
    }

    fn disconnect(&mut self, observer: ObserverId) -> bool {
        DomService::disconnect(self, observer)
    }

    fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        DomService::take_records(self, observer)
    }

    fn take_finished(&mut self) -> Vec<AnimationId> {
        DomService::take_finished(self)
    }
}
