//! Registry of animated roots
//!
//! Setup is idempotent per root: attaching a root that already has an
//! instance hands back the existing one instead of stacking a second
//! observer on it. The registry also owns the event loop when several
//! roots share one host, since finish notifications are host-wide.
//!
//! A detached root stops observing immediately but its instance is kept
//! aside until the exits it already started have finished.

use dom::NodeId;
use tracing::{debug, info};

use crate::config::AnimateOptions;
use crate::error::Result;
use crate::host::Host;
use crate::orchestrator::AutoAnimate;

#[derive(Default)]
pub struct AnimationRegistry {
    instances: Vec<AutoAnimate>,
    /// Detached, still owning running exits
    draining: Vec<AutoAnimate>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animate `root`, or return its existing instance.
    ///
    /// `options` only apply to a fresh instance.
    pub fn attach(
        &mut self,
        host: &mut dyn Host,
        root: NodeId,
        options: AnimateOptions,
    ) -> Result<&mut AutoAnimate> {
        let index = match self.position(root) {
            Some(index) => {
                debug!("[AutoAnimate] root {} already animated, reusing instance", root);
                index
            }
            None => {
                self.instances.push(AutoAnimate::setup(host, root, options)?);
                self.instances.len() - 1
            }
        };
        Ok(&mut self.instances[index])
    }

    /// Stop animating `root`. Returns whether it was attached.
    pub fn detach(&mut self, host: &mut dyn Host, root: NodeId) -> bool {
        let Some(index) = self.position(root) else {
            return false;
        };
        let mut instance = self.instances.remove(index);
        instance.disconnect(host);
        info!(
            "[AutoAnimate] detached root {} ({} exits still running)",
            root,
            instance.pending_exits()
        );
        if instance.pending_exits() > 0 {
            self.draining.push(instance);
        }
        true
    }

    pub fn get(&self, root: NodeId) -> Option<&AutoAnimate> {
        self.instances.iter().find(|instance| instance.root() == root)
    }

    pub fn get_mut(&mut self, root: NodeId) -> Option<&mut AutoAnimate> {
        self.instances
            .iter_mut()
            .find(|instance| instance.root() == root)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Detached instances waiting for their exits
    pub fn draining(&self) -> usize {
        self.draining.len()
    }

    /// Settle every instance: deliver record batches in attach order, then
    /// route each finish notification to whichever instance started it.
    pub fn pump(&mut self, host: &mut dyn Host) {
        loop {
            let mut progressed = false;
            for instance in self.instances.iter_mut() {
                while instance.drain_records(host) {
                    progressed = true;
                }
            }
            for animation in host.take_finished() {
                for instance in self.instances.iter_mut().chain(self.draining.iter_mut()) {
                    if instance.on_animation_finished(host, animation) {
                        progressed = true;
                        break;
                    }
                }
            }
            if !progressed {
                break;
            }
        }
        self.draining.retain(|instance| instance.pending_exits() > 0);
    }

    fn position(&self, root: NodeId) -> Option<usize> {
        self.instances
            .iter()
            .position(|instance| instance.root() == root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnimateError;
    use dom::DomService;
    use serde_json::json;

    fn two_lists(service: &mut DomService) -> (NodeId, NodeId) {
        let fixture = json!({
            "tag": "ul",
            "children": [
                { "tag": "li", "style": { "height": 30 } },
                { "tag": "li", "style": { "height": 30 } }
            ]
        });
        let first = service.parse_tree(&fixture).unwrap();
        let second = service.parse_tree(&fixture).unwrap();
        (first, second)
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut service = DomService::new();
        let (root, _) = two_lists(&mut service);
        let mut registry = AnimationRegistry::new();

        let first = registry
            .attach(&mut service, root, AnimateOptions::default())
            .unwrap()
            .id();
        let second = registry
            .attach(&mut service, root, AnimateOptions::default().with_duration(900.0))
            .unwrap()
            .id();

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(root).map(|a| a.options().duration), Some(250.0));

        let fresh = service.create_element("li");
        service.append_child(root, fresh).unwrap();
        registry.pump(&mut service);

        // One observer, one enter animation
        assert_eq!(service.animations_for(fresh).len(), 1);
    }

    #[test]
    fn test_roots_are_isolated() {
        let mut service = DomService::new();
        let (first, second) = two_lists(&mut service);
        let mut registry = AnimationRegistry::new();
        registry
            .attach(&mut service, first, AnimateOptions::default())
            .unwrap();
        registry
            .attach(&mut service, second, AnimateOptions::default().with_duration(100.0))
            .unwrap();

        let removed = service.children(first)[0];
        service.remove(removed).unwrap();
        registry.pump(&mut service);

        assert!(registry.get(first).is_some_and(|a| a.is_exiting(removed)));
        assert!(registry.get(second).is_some_and(|a| !a.is_exiting(removed)));
        assert!(registry.get(second).is_some_and(|a| a.tracked_box(removed).is_none()));

        // Shifted by the first list's collapse, but nothing under it mutated
        let moved = service.children(second)[0];
        assert!(service.animations_for(moved).is_empty());

        service.advance(250.0);
        registry.pump(&mut service);
        assert!(!service.is_connected(removed));
        assert_eq!(registry.get(first).map(|a| a.pending_exits()), Some(0));
    }

    #[test]
    fn test_detach() {
        let mut service = DomService::new();
        let (root, _) = two_lists(&mut service);
        let mut registry = AnimationRegistry::new();
        registry
            .attach(&mut service, root, AnimateOptions::default())
            .unwrap();

        assert!(registry.detach(&mut service, root));
        assert!(!registry.detach(&mut service, root));
        assert!(registry.is_empty());
        assert!(registry.get_mut(root).is_none());
    }

    #[test]
    fn test_detach_lets_running_exits_finish() {
        let mut service = DomService::new();
        let (root, _) = two_lists(&mut service);
        let mut registry = AnimationRegistry::new();
        registry
            .attach(&mut service, root, AnimateOptions::default())
            .unwrap();

        let removed = service.children(root)[0];
        service.remove(removed).unwrap();
        registry.pump(&mut service);
        assert!(service.is_connected(removed));

        assert!(registry.detach(&mut service, root));
        assert!(registry.get(root).is_none());
        assert_eq!(registry.draining(), 1);

        service.advance(1000.0);
        registry.pump(&mut service);

        assert!(!service.is_connected(removed));
        assert_eq!(registry.draining(), 0);
    }

    #[test]
    fn test_failed_attach_registers_nothing() {
        let mut service = DomService::new();
        let detached = service.create_element("ul");
        let mut registry = AnimationRegistry::new();

        assert!(matches!(
            registry.attach(&mut service, detached, AnimateOptions::default()),
            Err(AnimateError::InvalidRoot(_))
        ));
        assert!(registry.is_empty());
    }
}
