//! Automatic FLIP transitions for a DOM subtree
//!
//! Attach an [`AutoAnimate`] to a root and every child-list change under it
//! animates: new elements fade in, surviving elements slide from their old
//! box to the new one, removed elements are pinned in place and fade out
//! before they are really detached.
//!
//! # Architecture
//!
//! ```text
//! records ──▶ classifier ──▶ TransitionEngine ──▶ Host::animate
//!                 │                 │
//!          DeletionMarkers   CoordinateTracker / SiblingAnchor
//! ```
//!
//! All state is owned by the instance of one root; nothing is process-wide.
//! The platform is reached only through [`Host`].

pub mod anchor;
pub mod classifier;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod host;
pub mod orchestrator;
pub mod registry;
pub mod transition;

pub use anchor::{DeletionMarkers, SiblingAnchor, SiblingContext};
pub use classifier::{classify, Classification};
pub use config::{AnimateOptions, Easing, StepPosition};
pub use error::{AnimateError, Result};
pub use events::{AnimateEvent, EventBus};
pub use geometry::{capture, transition_size, CoordinateTracker, ElementBox, TransitionSize};
pub use host::Host;
pub use orchestrator::AutoAnimate;
pub use registry::AnimationRegistry;
pub use transition::{Action, TransitionEngine};
