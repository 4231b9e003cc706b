//! DOM Service - Main entry point for DOM operations
//!
//! A live document: tree mutation, mutation observation, style resolution,
//! layout and an animation timeline behind one owner. Every tree or style
//! mutation relayouts immediately, so geometry queries are always current.
//!
//! ```text
//! #document
//!   └── body   (layout root, viewport wide)
//!         └── ... fixture trees
//! ```

use serde_json::Value;
use smallvec::{smallvec, SmallVec};

use crate::animation::{Animation, AnimationId, AnimationTimeline, AnimationTiming, Keyframe};
use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::layout;
use crate::mutation::{MutationObserverInit, MutationObservers, MutationRecord, ObserverId};
use crate::types::*;

/// Configuration for DOM service
#[derive(Debug, Clone)]
pub struct DomServiceConfig {
    pub viewport_width: f64,
}

impl Default for DomServiceConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1024.0,
        }
    }
}

/// Main DOM service
pub struct DomService {
    config: DomServiceConfig,
    arena: DomArena,
    document: NodeId,
    body: NodeId,
    observers: MutationObservers,
    timeline: AnimationTimeline,
}

impl DomService {
    /// Create new DOM service with default config
    pub fn new() -> Self {
        Self::with_config(DomServiceConfig::default())
    }

    /// Create DOM service with custom config
    pub fn with_config(config: DomServiceConfig) -> Self {
        let mut arena = DomArena::new();
        let document = arena.add_node(DomNode::new(0, NodeType::Document, "#document".into()));

        let mut body = DomNode::new(0, NodeType::Element, "body".into());
        body.parent_id = Some(document);
        let body = arena.add_node(body);
        if let Ok(doc) = arena.get_mut(document) {
            doc.children_ids.push(body);
        }

        let mut service = Self {
            config,
            arena,
            document,
            body,
            observers: MutationObservers::new(),
            timeline: AnimationTimeline::new(),
        };
        service.relayout();
        service
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena
            .add_node(DomNode::new(0, NodeType::Element, tag.to_string()))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Text, "#text".to_string());
        node.node_value = text.to_string();
        self.arena.add_node(node)
    }

    /// Replace an element's stylesheet-level style
    pub fn set_base_style(&mut self, node: NodeId, style: ComputedStyle) -> Result<()> {
        self.arena.get_mut(node)?.style = style;
        self.relayout();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tree queries
    // ------------------------------------------------------------------

    /// Attached to the document (ancestor chain reaches `#document`)
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.arena.is_inclusive_ancestor(self.document, node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.parent_id(node).ok().flatten()
    }

    /// Element children only
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.arena.element_children(node).unwrap_or_default()
    }

    /// All child nodes, text included
    pub fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.arena
            .get(node)
            .map(|n| n.children_ids.to_vec())
            .unwrap_or_default()
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.arena.element(node).is_ok()
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.arena.find_by_id(id)
    }

    // ------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end).
    ///
    /// A child that already has a parent is removed first, which queues its
    /// own record, exactly like the DOM.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        self.ensure_can_insert(parent, child)?;

        let mut reference = reference;
        if let Some(reference_id) = reference {
            if self.arena.get(reference_id)?.parent_id != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference_id,
                });
            }
            if reference_id == child {
                reference = self.arena.siblings(child)?.1;
            }
        }

        if self.arena.get(child)?.parent_id.is_some() {
            self.detach(child)?;
        }

        let children = &self.arena.get(parent)?.children_ids;
        let index = match reference {
            Some(reference_id) => children
                .iter()
                .position(|&c| c == reference_id)
                .unwrap_or(children.len()),
            None => children.len(),
        };
        let previous_sibling = index.checked_sub(1).map(|i| children[i]);

        self.arena.get_mut(parent)?.children_ids.insert(index, child);
        self.arena.get_mut(child)?.parent_id = Some(parent);

        self.queue_record(MutationRecord {
            target: parent,
            added_nodes: smallvec![child],
            removed_nodes: SmallVec::new(),
            previous_sibling,
            next_sibling: reference,
        });
        self.relayout();
        Ok(())
    }

    /// Detach `node` from its parent. No-op for parentless nodes.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        if self.arena.get(node)?.parent_id.is_none() {
            return Ok(());
        }
        self.detach(node)?;
        self.relayout();
        Ok(())
    }

    /// Swap `old` for `new` in place, as a single record
    pub fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> Result<()> {
        if self.arena.get(old)?.parent_id != Some(parent) {
            return Err(DomError::NotAChild { parent, child: old });
        }
        if new == old {
            return Ok(());
        }
        self.ensure_can_insert(parent, new)?;

        if self.arena.get(new)?.parent_id.is_some() {
            self.detach(new)?;
        }

        let (previous_sibling, next_sibling) = self.arena.siblings(old)?;
        let index = self
            .arena
            .index_in_parent(old)?
            .ok_or(DomError::NotAChild { parent, child: old })?;

        self.arena.get_mut(parent)?.children_ids[index] = new;
        self.arena.get_mut(new)?.parent_id = Some(parent);
        self.arena.get_mut(old)?.parent_id = None;

        self.queue_record(MutationRecord {
            target: parent,
            added_nodes: smallvec![new],
            removed_nodes: smallvec![old],
            previous_sibling,
            next_sibling,
        });
        self.relayout();
        Ok(())
    }

    fn ensure_can_insert(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.arena.get(parent)?;
        self.arena.get(child)?;
        if parent_node.node_type == NodeType::Text
            || self.arena.is_inclusive_ancestor(child, parent)
        {
            return Err(DomError::HierarchyRequest { parent, node: child });
        }
        Ok(())
    }

    /// Unlink without relayout; queues the removal record
    fn detach(&mut self, node: NodeId) -> Result<()> {
        let Some(parent) = self.arena.get(node)?.parent_id else {
            return Ok(());
        };
        let (previous_sibling, next_sibling) = self.arena.siblings(node)?;

        self.arena
            .get_mut(parent)?
            .children_ids
            .retain(|c| *c != node);
        self.arena.get_mut(node)?.parent_id = None;

        self.queue_record(MutationRecord {
            target: parent,
            added_nodes: SmallVec::new(),
            removed_nodes: smallvec![node],
            previous_sibling,
            next_sibling,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutation observation
    // ------------------------------------------------------------------

    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        self.observers.observe(target, options)
    }

    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        self.observers.disconnect(observer)
    }

    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers.take_records(observer)
    }

    fn queue_record(&mut self, record: MutationRecord) {
        self.observers.queue(record, &self.arena);
    }

    // ------------------------------------------------------------------
    // Style and geometry
    // ------------------------------------------------------------------

    pub fn set_style_property(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.arena.get_mut(node)?.set_inline(name, value.to_string());
        self.relayout();
        Ok(())
    }

    /// Raw inline declaration
    pub fn style_property(&self, node: NodeId, name: &str) -> Option<String> {
        self.arena
            .get(node)
            .ok()
            .and_then(|n| n.inline(name).map(String::from))
    }

    pub fn computed_style(&self, node: NodeId) -> Result<ComputedStyle> {
        Ok(self.arena.get(node)?.computed_style())
    }

    pub fn set_scroll(&mut self, node: NodeId, left: f64, top: f64) -> Result<()> {
        let node = self.arena.get_mut(node)?;
        node.scroll_left = left;
        node.scroll_top = top;
        Ok(())
    }

    /// (scrollLeft, scrollTop)
    pub fn scroll_offset(&self, node: NodeId) -> Result<(f64, f64)> {
        let node = self.arena.get(node)?;
        Ok((node.scroll_left, node.scroll_top))
    }

    /// Border box in viewport coordinates: page box minus ancestor scrolling.
    ///
    /// Unrendered nodes report a zero rect, like `getBoundingClientRect`.
    pub fn bounding_client_rect(&self, node: NodeId) -> Result<DomRect> {
        let Some(rect) = self.arena.get(node)?.layout else {
            return Ok(DomRect::zero());
        };

        let (mut dx, mut dy) = (0.0, 0.0);
        let mut current = self.arena.get(node)?.parent_id;
        while let Some(id) = current {
            let ancestor = self.arena.get(id)?;
            dx -= ancestor.scroll_left;
            dy -= ancestor.scroll_top;
            current = ancestor.parent_id;
        }
        Ok(rect.offset(dx, dy))
    }

    fn relayout(&mut self) {
        // Every node id handed to layout comes from the arena itself
        let result = layout::layout_tree(&mut self.arena, self.body, self.config.viewport_width);
        debug_assert!(result.is_ok(), "layout failed: {:?}", result);
    }

    // ------------------------------------------------------------------
    // Animation
    // ------------------------------------------------------------------

    pub fn animate(
        &mut self,
        node: NodeId,
        keyframes: Vec<Keyframe>,
        timing: AnimationTiming,
    ) -> Result<AnimationId> {
        self.arena.get(node)?;
        Ok(self.timeline.play(node, keyframes, timing))
    }

    /// Advance the document clock by `elapsed_ms`
    pub fn advance(&mut self, elapsed_ms: f64) {
        self.timeline.advance(elapsed_ms);
    }

    pub fn take_finished(&mut self) -> Vec<AnimationId> {
        self.timeline.take_finished()
    }

    pub fn animation(&self, id: AnimationId) -> Option<&Animation> {
        self.timeline.get(id)
    }

    pub fn animations_for(&self, node: NodeId) -> Vec<&Animation> {
        self.timeline.for_target(node)
    }

    // ------------------------------------------------------------------
    // Fixtures
    // ------------------------------------------------------------------

    /// Build a subtree from a JSON description and append it to `body`.
    ///
    /// Input format:
    /// ```json
    /// {
    ///   "tag": "ul",
    ///   "id": "list",
    ///   "style": { "position": "relative", "padding": { "top": 4 } },
    ///   "children": [ { "tag": "li", "style": { "height": 50 } }, { "text": "hi" } ]
    /// }
    /// ```
    pub fn parse_tree(&mut self, fixture: &Value) -> Result<NodeId> {
        let root = self.parse_fragment(fixture)?;
        let body = self.body;
        self.append_child(body, root)?;
        Ok(root)
    }

    /// Build a detached subtree; no records are queued
    pub fn parse_fragment(&mut self, fixture: &Value) -> Result<NodeId> {
        let node_id = self.parse_node(fixture)?;

        if let Some(children) = fixture.get("children") {
            let children = children
                .as_array()
                .ok_or_else(|| DomError::InvalidFixture("'children' must be an array".into()))?;

            for child in children {
                let child_id = self.parse_fragment(child)?;
                self.arena.get_mut(child_id)?.parent_id = Some(node_id);
                self.arena.get_mut(node_id)?.children_ids.push(child_id);
            }
        }

        Ok(node_id)
    }

    fn parse_node(&mut self, fixture: &Value) -> Result<NodeId> {
        if let Some(text) = fixture.get("text").and_then(|v| v.as_str()) {
            return Ok(self.create_text(text));
        }

        let tag = fixture
            .get("tag")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DomError::InvalidFixture(format!("missing 'tag' in {}", fixture)))?;

        let mut node = DomNode::new(0, NodeType::Element, tag.to_string());
        if let Some(id) = fixture.get("id").and_then(|v| v.as_str()) {
            node.attributes.insert("id".to_string(), id.to_string());
        }
        if let Some(style) = fixture.get("style") {
            node.style = serde_json::from_value(style.clone())?;
        }
        Ok(self.arena.add_node(node))
    }
}

impl Default for DomService {
    fn default() -> Self {
        Self::new()
    }
}
