//! Core type definitions for the live document model
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (avoid heap allocation)
//! 3. Styles are plain values; layout writes into the node, never the other way

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::utils::parse_px;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any webpage
pub type NodeId = u32;

/// Node type matching the subset of the DOM specification we model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
}

/// Rectangle with coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DomRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Apply offset (scroll compensation)
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Four-sided box edge widths (margin, padding, border)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn all(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// left + right
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// top + bottom
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Block,
    None,
}

impl Display {
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "block" => Some(Display::Block),
            "none" => Some(Display::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
}

impl Position {
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "static" => Some(Position::Static),
            "relative" => Some(Position::Relative),
            "absolute" => Some(Position::Absolute),
            _ => None,
        }
    }

    /// Establishes a containing block for absolutely positioned descendants
    pub fn is_positioned(&self) -> bool {
        !matches!(self, Position::Static)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxSizing {
    #[default]
    ContentBox,
    BorderBox,
}

impl BoxSizing {
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "content-box" => Some(BoxSizing::ContentBox),
            "border-box" => Some(BoxSizing::BorderBox),
            _ => None,
        }
    }
}

/// Resolved style of an element
///
/// `width`/`height` of `None` mean `auto`. Whether they describe the content
/// box or the border box depends on `box_sizing`, as in CSS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComputedStyle {
    pub display: Display,
    pub position: Position,
    pub box_sizing: BoxSizing,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub margin: Edges,
    pub padding: Edges,
    pub border: Edges,
}

impl ComputedStyle {
    /// Layer inline declarations over this style.
    ///
    /// Declarations the layout engine does not understand are kept on the
    /// node but have no effect here.
    pub fn with_inline(&self, declarations: &[(String, String)]) -> Self {
        let mut style = self.clone();
        for (name, value) in declarations {
            match name.as_str() {
                "display" => {
                    if let Some(display) = Display::from_css(value) {
                        style.display = display;
                    }
                }
                "position" => {
                    if let Some(position) = Position::from_css(value) {
                        style.position = position;
                    }
                }
                "box-sizing" => {
                    if let Some(sizing) = BoxSizing::from_css(value) {
                        style.box_sizing = sizing;
                    }
                }
                "width" => style.width = parse_length(value),
                "height" => style.height = parse_length(value),
                "top" => style.top = parse_length(value),
                "left" => style.left = parse_length(value),
                "margin" => style.margin = Edges::all(parse_px(value)),
                "padding" => style.padding = Edges::all(parse_px(value)),
                "border-width" => style.border = Edges::all(parse_px(value)),
                _ => {}
            }
        }
        style
    }
}

fn parse_length(value: &str) -> Option<f64> {
    if value.trim() == "auto" {
        None
    } else {
        Some(parse_px(value))
    }
}

/// The main DOM tree node structure
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
/// - `layout` is owned by the layout pass; `None` means not rendered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    pub node_name: String,
    pub node_value: String,
    pub attributes: HashMap<String, String>,

    // Style: stylesheet values plus ordered inline declarations
    pub style: ComputedStyle,
    pub inline_style: Vec<(String, String)>,

    // Scroll state (scrollLeft / scrollTop)
    pub scroll_left: f64,
    pub scroll_top: f64,

    /// Border box in page coordinates
    pub layout: Option<DomRect>,
}

impl DomNode {
    /// Create a new node with required fields
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: String) -> Self {
        Self {
            node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name,
            node_value: String::new(),
            attributes: HashMap::new(),
            style: ComputedStyle::default(),
            inline_style: Vec::new(),
            scroll_left: 0.0,
            scroll_top: 0.0,
            layout: None,
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Raw inline declaration value
    pub fn inline(&self, name: &str) -> Option<&str> {
        self.inline_style
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set or replace an inline declaration, preserving declaration order
    pub fn set_inline(&mut self, name: &str, value: String) {
        match self.inline_style.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.inline_style.push((name.to_string(), value)),
        }
    }

    /// Base style with inline overrides applied
    pub fn computed_style(&self) -> ComputedStyle {
        self.style.with_inline(&self.inline_style)
    }
}
