//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. No over-engineering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: u32, child: u32 },

    #[error("Hierarchy request error: cannot insert {node} into {parent}")]
    HierarchyRequest { parent: u32, node: u32 },

    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}
