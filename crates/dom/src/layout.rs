//! Block layout
//!
//! Deliberately small: in-flow children stack vertically inside the
//! parent's content box, auto width fills the container, auto height wraps
//! in-flow children. Absolutely positioned boxes are laid out in a second
//! pass against the padding box of their nearest positioned ancestor.
//! No margin collapsing, no inline formatting, no relative offsets.

use std::collections::VecDeque;

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{BoxSizing, ComputedStyle, Display, DomRect, NodeId, NodeType, Position};

/// Recompute `layout` for every node reachable from `root`.
///
/// Nodes that are not reachable (detached) end up with `layout = None`.
pub fn layout_tree(arena: &mut DomArena, root: NodeId, viewport_width: f64) -> Result<()> {
    for node_id in arena.node_ids().collect::<Vec<_>>() {
        arena.get_mut(node_id)?.layout = None;
    }

    let mut absolutes = VecDeque::new();
    layout_block(arena, root, 0.0, 0.0, viewport_width, &mut absolutes)?;

    while let Some(node_id) = absolutes.pop_front() {
        let Some(container) = containing_block(arena, node_id, root)? else {
            continue;
        };
        let style = arena.get(node_id)?.computed_style();
        let x = container.x + style.left.unwrap_or(0.0);
        let y = container.y + style.top.unwrap_or(0.0);
        layout_block(arena, node_id, x, y, container.width, &mut absolutes)?;
    }

    Ok(())
}

/// Padding box of the nearest positioned ancestor, falling back to `root`
fn containing_block(arena: &DomArena, node_id: NodeId, root: NodeId) -> Result<Option<DomRect>> {
    let mut current = arena.get(node_id)?.parent_id;
    while let Some(id) = current {
        let node = arena.get(id)?;
        let style = node.computed_style();
        if id == root || style.position.is_positioned() {
            return Ok(node.layout.map(|rect| padding_box(rect, &style)));
        }
        current = node.parent_id;
    }
    Ok(None)
}

fn padding_box(border_box: DomRect, style: &ComputedStyle) -> DomRect {
    DomRect::new(
        border_box.x + style.border.left,
        border_box.y + style.border.top,
        border_box.width - style.border.horizontal(),
        border_box.height - style.border.vertical(),
    )
}

/// Lay out one block at (x, y) and return its outer height (margins included).
fn layout_block(
    arena: &mut DomArena,
    node_id: NodeId,
    x: f64,
    y: f64,
    available_width: f64,
    absolutes: &mut VecDeque<NodeId>,
) -> Result<f64> {
    let (style, children) = {
        let node = arena.get(node_id)?;
        (node.computed_style(), node.children_ids.clone())
    };

    if style.display == Display::None {
        return Ok(0.0);
    }

    let insets_x = style.padding.horizontal() + style.border.horizontal();
    let insets_y = style.padding.vertical() + style.border.vertical();

    let border_width = match style.width {
        Some(width) => outer_size(width, insets_x, style.box_sizing),
        None => (available_width - style.margin.horizontal()).max(insets_x),
    };

    let left = x + style.margin.left;
    let top = y + style.margin.top;
    let content_x = left + style.border.left + style.padding.left;
    let content_y = top + style.border.top + style.padding.top;
    let content_width = border_width - insets_x;

    let mut cursor = content_y;
    for child_id in children {
        let child = arena.get(child_id)?;
        if child.node_type != NodeType::Element {
            continue;
        }
        if child.computed_style().position == Position::Absolute {
            absolutes.push_back(child_id);
            continue;
        }
        cursor += layout_block(arena, child_id, content_x, cursor, content_width, absolutes)?;
    }

    let border_height = match style.height {
        Some(height) => outer_size(height, insets_y, style.box_sizing),
        None => (cursor - content_y) + insets_y,
    };

    arena.get_mut(node_id)?.layout = Some(DomRect::new(left, top, border_width, border_height));

    Ok(style.margin.top + border_height + style.margin.bottom)
}

fn outer_size(specified: f64, insets: f64, sizing: BoxSizing) -> f64 {
    match sizing {
        BoxSizing::ContentBox => specified + insets,
        BoxSizing::BorderBox => specified.max(insets),
    }
}
