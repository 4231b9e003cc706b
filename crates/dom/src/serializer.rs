//! DOM Serializer - render the live tree as indented markup
//!
//! Used for debugging output and for asserting tree shape in tests:
//!
//! ```text
//! <ul id="list" style="position: relative">
//!   <li id="a"> [0,0 1024x50]
//! ```

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;

/// Serializer configuration
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    pub include_attributes: Vec<String>,
    pub include_inline_style: bool,
    pub include_layout: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            include_attributes: vec!["id".to_string(), "class".to_string()],
            include_inline_style: true,
            include_layout: false,
        }
    }
}

/// DOM Tree Serializer
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Serialize the subtree rooted at `root`
    pub fn serialize(&self, arena: &DomArena, root: NodeId) -> Result<String> {
        let mut output = String::with_capacity(1024);
        self.serialize_node(arena, root, 0, &mut output)?;
        Ok(output)
    }

    fn serialize_node(
        &self,
        arena: &DomArena,
        node_id: NodeId,
        depth: usize,
        output: &mut String,
    ) -> Result<()> {
        let node = arena.get(node_id)?;
        let indent = "  ".repeat(depth);

        match node.node_type {
            NodeType::Element => {
                output.push_str(&indent);
                output.push('<');
                output.push_str(&node.node_name);

                for attr_name in &self.config.include_attributes {
                    if let Some(attr_value) = node.attr(attr_name) {
                        output.push_str(&format!(" {}=\"{}\"", attr_name, attr_value));
                    }
                }

                if self.config.include_inline_style && !node.inline_style.is_empty() {
                    let declarations: Vec<String> = node
                        .inline_style
                        .iter()
                        .map(|(name, value)| format!("{}: {}", name, value))
                        .collect();
                    output.push_str(&format!(" style=\"{}\"", declarations.join("; ")));
                }

                output.push('>');

                if self.config.include_layout {
                    if let Some(rect) = node.layout {
                        output.push_str(&format!(
                            " [{},{} {}x{}]",
                            rect.x, rect.y, rect.width, rect.height
                        ));
                    }
                }
                output.push('\n');

                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, depth + 1, output)?;
                }
            }
            NodeType::Text => {
                let text = node.node_value.trim();
                if !text.is_empty() {
                    output.push_str(&indent);
                    output.push_str(text);
                    output.push('\n');
                }
            }
            NodeType::Document => {
                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, depth, output)?;
                }
            }
            NodeType::Comment => {}
        }

        Ok(())
    }
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::DomService;

    #[test]
    fn test_serialize_simple_dom() {
        let mut service = DomService::new();
        let root = service
            .parse_tree(&serde_json::json!({
                "tag": "ul",
                "id": "list",
                "children": [
                    { "tag": "li", "id": "a", "style": { "height": 50 }, "children": [{ "text": " Hello " }] }
                ]
            }))
            .unwrap();
        service.set_style_property(root, "position", "relative").unwrap();

        let output = DomSerializer::new().serialize(service.arena(), root).unwrap();

        assert_eq!(
            output,
            "<ul id=\"list\" style=\"position: relative\">\n  <li id=\"a\">\n    Hello\n"
        );
    }

    #[test]
    fn test_serialize_with_layout() {
        let mut service = DomService::new();
        let root = service
            .parse_tree(&serde_json::json!({ "tag": "div", "style": { "width": 10, "height": 20 } }))
            .unwrap();

        let serializer = DomSerializer::with_config(SerializerConfig {
            include_layout: true,
            ..Default::default()
        });
        let output = serializer.serialize(service.arena(), root).unwrap();

        assert_eq!(output, "<div> [0,0 10x20]\n");
    }
}
