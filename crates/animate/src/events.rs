//! Lifecycle notifications
//!
//! Every transition the engine starts or completes is published here.
//! Subscribers are optional and lagging ones simply miss events.

use dom::{AnimationId, NodeId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// What happened to an observed element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnimateEvent {
    Entered { node: NodeId },
    Remained { node: NodeId, dx: f64, dy: f64 },
    ExitStarted { node: NodeId, animation: AnimationId },
    Detached { node: NodeId },
    /// A batch was recognised as the echo of an exit reinsertion
    BatchIgnored { records: usize },
}

/// Broadcast fan-out of [`AnimateEvent`]s, one bus per observed root
pub struct EventBus {
    tx: broadcast::Sender<AnimateEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    pub fn publish(&self, event: AnimateEvent) {
        // Err only means nobody is listening
        let _ = self.tx.send(event);
    }

    /// Receives events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<AnimateEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
