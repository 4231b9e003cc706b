//! Arena-based DOM tree storage
//!
//! Nodes are never freed: a removed node keeps its slot and can be
//! reinserted later, exactly like a detached DOM node that script still
//! holds a reference to.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};

/// Arena allocator for DOM nodes
#[derive(Debug, Default)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Add a node to the arena, returns its ID
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        self.nodes.push(node);
        node_id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get element by ID, rejecting non-element nodes
    pub fn element(&self, node_id: NodeId) -> Result<&DomNode> {
        let node = self.get(node_id)?;
        if node.is_element() {
            Ok(node)
        } else {
            Err(DomError::InvalidNodeType {
                expected: "Element".to_string(),
                actual: format!("{:?}", node.node_type),
            })
        }
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| i as NodeId)
    }

    /// Element children of a node, in tree order
    pub fn element_children(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.get(node_id)?;
        Ok(node
            .children_ids
            .iter()
            .copied()
            .filter(|&child| {
                self.get(child)
                    .map(|c| c.node_type == NodeType::Element)
                    .unwrap_or(false)
            })
            .collect())
    }

    /// Parent of a node
    pub fn parent_id(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.parent_id)
    }

    /// Position of a node among its parent's children
    pub fn index_in_parent(&self, node_id: NodeId) -> Result<Option<usize>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(self
                .get(parent_id)?
                .children_ids
                .iter()
                .position(|&c| c == node_id)),
            None => Ok(None),
        }
    }

    /// Previous and next sibling (any node type)
    pub fn siblings(&self, node_id: NodeId) -> Result<(Option<NodeId>, Option<NodeId>)> {
        let node = self.get(node_id)?;
        let Some(parent_id) = node.parent_id else {
            return Ok((None, None));
        };
        let children = &self.get(parent_id)?.children_ids;
        let Some(index) = children.iter().position(|&c| c == node_id) else {
            return Ok((None, None));
        };
        let previous = index.checked_sub(1).map(|i| children[i]);
        let next = children.get(index + 1).copied();
        Ok((previous, next))
    }

    /// True if `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).ok().and_then(|n| n.parent_id);
        }
        false
    }

    /// Find first node matching predicate
    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes.iter().enumerate().find_map(|(idx, node)| {
            if predicate(node) {
                Some(idx as NodeId)
            } else {
                None
            }
        })
    }

    /// Find element by ID attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_one(|node| node.node_type == NodeType::Element && node.attr("id") == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(arena: &mut DomArena, tag: &str) -> NodeId {
        arena.add_node(DomNode::new(0, NodeType::Element, tag.to_string()))
    }

    fn link(arena: &mut DomArena, parent: NodeId, children: &[NodeId]) {
        for &child in children {
            arena.get_mut(child).unwrap().parent_id = Some(parent);
            arena.get_mut(parent).unwrap().children_ids.push(child);
        }
    }

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();
        let id = element(&mut arena, "div");
        assert_eq!(id, 0);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.node_name, "div");
        assert!(matches!(arena.get(7), Err(DomError::NodeNotFound(7))));
    }

    #[test]
    fn test_siblings_and_ancestry() {
        let mut arena = DomArena::new();
        let root = element(&mut arena, "ul");
        let a = element(&mut arena, "li");
        let b = element(&mut arena, "li");
        let c = element(&mut arena, "li");
        link(&mut arena, root, &[a, b, c]);

        assert_eq!(arena.siblings(b).unwrap(), (Some(a), Some(c)));
        assert_eq!(arena.siblings(a).unwrap(), (None, Some(b)));
        assert_eq!(arena.siblings(root).unwrap(), (None, None));
        assert_eq!(arena.index_in_parent(c).unwrap(), Some(2));
        assert!(arena.is_inclusive_ancestor(root, c));
        assert!(arena.is_inclusive_ancestor(c, c));
        assert!(!arena.is_inclusive_ancestor(a, c));
    }

    #[test]
    fn test_element_children_skip_text() {
        let mut arena = DomArena::new();
        let root = element(&mut arena, "ul");
        let text = arena.add_node(DomNode::new(0, NodeType::Text, "#text".to_string()));
        let li = element(&mut arena, "li");
        link(&mut arena, root, &[text, li]);

        assert_eq!(arena.element_children(root).unwrap(), vec![li]);
        assert!(arena.element(text).is_err());
    }
}
