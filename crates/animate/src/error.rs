//! Error types for engine setup
//!
//! Only installation can fail. Once a root is being observed, every
//! transition problem degrades to "no animation" and is logged instead.

use dom::{DomError, NodeId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnimateError>;

#[derive(Debug, Error)]
pub enum AnimateError {
    #[error("Invalid duration: {0} (expected a positive number of milliseconds)")]
    InvalidDuration(f64),

    #[error("Invalid easing: {0}")]
    InvalidEasing(String),

    #[error("Root {0} is not a connected element")]
    InvalidRoot(NodeId),

    #[error("Options parse error: {0}")]
    OptionsParse(#[from] serde_json::Error),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
