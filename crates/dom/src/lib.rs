//! Live DOM model
//!
//! An arena-backed document with the host-side pieces an animation engine
//! needs: child-list mutation observation, block layout with bounding
//! boxes, computed styles, scrolling and a declarative animation timeline.
//!
//! ## Core Design
//!
//! ```text
//! DomService ── DomArena (Vec<DomNode>, NodeId = u32)
//!     │    ├── MutationObservers (per-observer record queues)
//!     │    └── AnimationTimeline (play / advance / take_finished)
//!     └── layout::layout_tree after every mutation
//! ```

pub mod animation;
pub mod arena;
pub mod error;
pub mod layout;
pub mod mutation;
pub mod serializer;
pub mod service;
pub mod types;
pub mod utils;

pub use animation::{Animation, AnimationId, AnimationTiming, Keyframe, PlayState, Transform};
pub use arena::DomArena;
pub use error::{DomError, Result};
pub use mutation::{MutationObserverInit, MutationRecord, ObserverId};
pub use serializer::DomSerializer;
pub use service::{DomService, DomServiceConfig};
pub use types::*;
