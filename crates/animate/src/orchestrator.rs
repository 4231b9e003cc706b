//! AutoAnimate - one observed root
//!
//! Installs the positioning prerequisite, seeds coordinates, subscribes to
//! child-list mutations and routes every delivered batch through the
//! classifier into the transition engine.

use dom::{AnimationId, MutationObserverInit, MutationRecord, NodeId, ObserverId, Position};
use tokio::sync::broadcast;
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::anchor::SiblingContext;
use crate::classifier::{classify, Classification};
use crate::config::AnimateOptions;
use crate::error::{AnimateError, Result};
use crate::events::{AnimateEvent, EventBus};
use crate::geometry::ElementBox;
use crate::host::Host;
use crate::transition::TransitionEngine;

pub struct AutoAnimate {
    id: Uuid,
    root: NodeId,
    observer: Option<ObserverId>,
    engine: TransitionEngine,
    events: EventBus,
}

impl AutoAnimate {
    /// Start animating the children of `root`
    pub fn setup(host: &mut dyn Host, root: NodeId, options: AnimateOptions) -> Result<Self> {
        options.validate()?;

        if !host.is_element(root) || !host.is_connected(root) {
            return Err(AnimateError::InvalidRoot(root));
        }

        // Exit animations position against the root
        if host.computed_style(root).position == Position::Static {
            host.set_style(root, "position", "relative")?;
        }

        let mut engine = TransitionEngine::new(root, options);
        engine.seed(&*host, root);
        let observer = host.observe(root, MutationObserverInit::subtree_child_list());

        let id = Uuid::now_v7();
        info!(
            "[AutoAnimate] {} observing root {} ({}ms, {})",
            id,
            root,
            engine.options().duration,
            engine.options().easing
        );

        Ok(Self {
            id,
            root,
            observer: Some(observer),
            engine,
            events: EventBus::new(),
        })
    }

    /// Process one delivered batch of records
    pub fn handle_batch(&mut self, host: &mut dyn Host, records: &[MutationRecord]) {
        let engine = &mut self.engine;
        match classify(&*host, records, &engine.markers, &mut engine.anchors) {
            Classification::Ignore => {
                trace!(
                    "[AutoAnimate] ignoring echo batch of {} records on {}",
                    records.len(),
                    self.root
                );
                self.events.publish(AnimateEvent::BatchIgnored {
                    records: records.len(),
                });
            }
            Classification::Affected(nodes) => {
                debug!(
                    "[AutoAnimate] {} records affect {} elements under {}",
                    records.len(),
                    nodes.len(),
                    self.root
                );
                for node in nodes {
                    if let Some(event) = self.engine.dispatch(host, node) {
                        self.events.publish(event);
                    }
                }
            }
        }
    }

    /// Deliver whatever is queued for this observer as one batch.
    ///
    /// Returns `false` when nothing was pending.
    pub fn drain_records(&mut self, host: &mut dyn Host) -> bool {
        let Some(observer) = self.observer else {
            return false;
        };
        let records = host.take_records(observer);
        if records.is_empty() {
            return false;
        }
        self.handle_batch(host, &records);
        true
    }

    /// Completion notification for an animation. `true` if it was one of
    /// this instance's exits.
    pub fn on_animation_finished(&mut self, host: &mut dyn Host, animation: AnimationId) -> bool {
        match self.engine.finish_exit(host, animation) {
            Some(event) => {
                self.events.publish(event);
                true
            }
            None => false,
        }
    }

    /// Run the event loop until it settles: record batches first (each
    /// round delivers what the previous round queued), then finished
    /// animations.
    ///
    /// Finish notifications not belonging to this instance are consumed;
    /// with several roots on one host go through `AnimationRegistry::pump`.
    pub fn pump(&mut self, host: &mut dyn Host) {
        loop {
            let mut progressed = false;
            while self.drain_records(host) {
                progressed = true;
            }
            for animation in host.take_finished() {
                progressed |= self.on_animation_finished(host, animation);
            }
            if !progressed {
                break;
            }
        }
    }

    /// Stop observing. Exits already running still complete.
    pub fn disconnect(&mut self, host: &mut dyn Host) {
        if let Some(observer) = self.observer.take() {
            host.disconnect(observer);
            info!("[AutoAnimate] {} stopped observing root {}", self.id, self.root);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AnimateEvent> {
        self.events.subscribe()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn options(&self) -> &AnimateOptions {
        self.engine.options()
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    pub fn tracked_box(&self, node: NodeId) -> Option<ElementBox> {
        self.engine.tracked_box(node)
    }

    pub fn sibling_context(&self, node: NodeId) -> Option<SiblingContext> {
        self.engine.sibling_context(node)
    }

    pub fn is_exiting(&self, node: NodeId) -> bool {
        self.engine.is_exiting(node)
    }

    pub fn pending_exits(&self) -> usize {
        self.engine.pending_exits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Easing;
    use dom::{DomService, Transform};
    use serde_json::json;

    fn list(service: &mut DomService, count: usize) -> (NodeId, Vec<NodeId>) {
        let children: Vec<_> = (0..count)
            .map(|i| json!({ "tag": "li", "id": format!("item-{i}"), "style": { "height": 50 } }))
            .collect();
        let root = service
            .parse_tree(&json!({ "tag": "ul", "id": "list", "children": children }))
            .unwrap();
        let items = service.children(root);
        (root, items)
    }

    fn first_translate(service: &DomService, node: NodeId) -> Option<Transform> {
        service
            .animations_for(node)
            .last()
            .and_then(|animation| animation.keyframes[0].transform)
    }

    fn drain(rx: &mut broadcast::Receiver<AnimateEvent>) -> Vec<AnimateEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_setup_positions_root_and_seeds() {
        let mut service = DomService::new();
        let (root, items) = list(&mut service, 3);

        let auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();

        assert_eq!(service.computed_style(root).unwrap().position, Position::Relative);
        assert!(auto.is_observing());
        assert_eq!(auto.tracked_box(root).map(|b| b.height), Some(150.0));
        assert_eq!(auto.tracked_box(items[2]).map(|b| b.top), Some(100.0));
    }

    #[test]
    fn test_setup_keeps_positioned_root() {
        let mut service = DomService::new();
        let root = service
            .parse_tree(&json!({ "tag": "div", "style": { "position": "absolute", "top": 7 } }))
            .unwrap();

        AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();

        assert_eq!(service.computed_style(root).unwrap().position, Position::Absolute);
        assert_eq!(service.style_property(root, "position"), None);
    }

    #[test]
    fn test_setup_rejects_bad_input() {
        let mut service = DomService::new();
        let (root, _) = list(&mut service, 1);

        let zero = AnimateOptions::default().with_duration(0.0);
        assert!(matches!(
            AutoAnimate::setup(&mut service, root, zero),
            Err(AnimateError::InvalidDuration(_))
        ));

        let detached = service.create_element("ul");
        assert!(matches!(
            AutoAnimate::setup(&mut service, detached, AnimateOptions::default()),
            Err(AnimateError::InvalidRoot(_))
        ));

        let text = service.create_text("plain");
        service.append_child(root, text).unwrap();
        assert!(matches!(
            AutoAnimate::setup(&mut service, text, AnimateOptions::default()),
            Err(AnimateError::InvalidRoot(_))
        ));
    }

    #[test]
    fn test_remove_middle_item() {
        let mut service = DomService::new();
        let (root, items) = list(&mut service, 3);
        let (a, b, c) = (items[0], items[1], items[2]);
        let mut auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();
        let mut rx = auto.subscribe();

        service.remove(b).unwrap();
        auto.pump(&mut service);

        // Back between its neighbours, pinned at its old box
        assert_eq!(service.children(root), vec![a, b, c]);
        assert_eq!(auto.sibling_context(b), Some(SiblingContext { previous: Some(a), next: Some(c) }));
        let style = service.computed_style(b).unwrap();
        assert_eq!(style.position, Position::Absolute);
        assert_eq!(style.top, Some(50.0));
        assert_eq!(service.bounding_client_rect(b).unwrap().y, 50.0);
        assert!(auto.is_exiting(b));

        let exit = service.animations_for(b);
        assert_eq!(exit.len(), 1);
        assert_eq!(exit[0].timing.duration, 250.0);
        assert_eq!(exit[0].timing.easing, "ease-out");

        // C slides up from where it was
        assert_eq!(first_translate(&service, c), Some(Transform::translate(0.0, 50.0)));
        assert_eq!(first_translate(&service, a), Some(Transform::translate(0.0, 0.0)));

        // The list collapses
        let shrink = service.animations_for(root);
        assert_eq!(shrink[0].keyframes[0].height, Some(150.0));
        assert_eq!(shrink[0].keyframes[1].height, Some(100.0));

        let events = drain(&mut rx);
        assert!(events.contains(&AnimateEvent::Remained { node: c, dx: 0.0, dy: 50.0 }));
        assert!(events.contains(&AnimateEvent::ExitStarted { node: b, animation: exit[0].id }));
        assert!(events.contains(&AnimateEvent::BatchIgnored { records: 1 }));

        service.advance(249.0);
        auto.pump(&mut service);
        assert!(service.is_connected(b));
        assert!(auto.tracked_box(b).is_some());
        assert!(auto.sibling_context(b).is_some());

        service.advance(1.0);
        auto.pump(&mut service);
        assert!(!service.is_connected(b));
        assert_eq!(service.children(root), vec![a, c]);
        assert!(auto.tracked_box(b).is_none());
        assert!(auto.sibling_context(b).is_none());
        assert_eq!(auto.pending_exits(), 0);

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                AnimateEvent::Detached { node: b },
                AnimateEvent::BatchIgnored { records: 1 },
            ]
        );
    }

    #[test]
    fn test_reinsertion_echo_does_not_exit_twice() {
        let mut service = DomService::new();
        let (root, items) = list(&mut service, 3);
        let mut auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();

        service.remove(items[1]).unwrap();
        auto.pump(&mut service);
        auto.pump(&mut service);

        assert_eq!(service.animations_for(items[1]).len(), 1);
        assert_eq!(service.animations_for(items[2]).len(), 1);
        assert_eq!(auto.pending_exits(), 1);
    }

    #[test]
    fn test_insert_at_index() {
        let mut service = DomService::new();
        let (root, items) = list(&mut service, 3);
        let mut auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();

        let d = service
            .parse_fragment(&json!({ "tag": "li", "id": "d", "style": { "height": 50 } }))
            .unwrap();
        service.insert_before(root, d, Some(items[1])).unwrap();
        auto.pump(&mut service);

        let enter = service.animations_for(d);
        assert_eq!(enter.len(), 1);
        assert_eq!(enter[0].timing.duration, 375.0);
        assert_eq!(enter[0].keyframes[0].transform, Some(Transform::scale(0.98)));
        assert!(auto.tracked_box(d).is_some());

        assert_eq!(first_translate(&service, items[0]), Some(Transform::translate(0.0, 0.0)));
        assert_eq!(first_translate(&service, items[1]), Some(Transform::translate(0.0, -50.0)));
        assert_eq!(first_translate(&service, items[2]), Some(Transform::translate(0.0, -50.0)));
    }

    #[test]
    fn test_swap_gives_opposite_deltas() {
        let mut service = DomService::new();
        let (root, items) = list(&mut service, 2);
        let (a, b) = (items[0], items[1]);
        let options = AnimateOptions::default().with_easing(Easing::Linear);
        let mut auto = AutoAnimate::setup(&mut service, root, options).unwrap();

        service.insert_before(root, b, Some(a)).unwrap();
        auto.pump(&mut service);

        assert_eq!(service.children(root), vec![b, a]);
        assert_eq!(first_translate(&service, b), Some(Transform::translate(0.0, 50.0)));
        assert_eq!(first_translate(&service, a), Some(Transform::translate(0.0, -50.0)));
        assert_eq!(service.animations_for(b)[0].timing.easing, "linear");
        assert!(!auto.is_exiting(b));
        assert_eq!(auto.sibling_context(b), None);
    }

    #[test]
    fn test_adjacent_removals_pin_at_own_boxes() {
        let mut service = DomService::new();
        let (root, items) = list(&mut service, 4);
        let mut auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();

        service.remove(items[1]).unwrap();
        service.remove(items[2]).unwrap();
        auto.pump(&mut service);

        assert_eq!(auto.pending_exits(), 2);
        assert_eq!(service.bounding_client_rect(items[1]).unwrap().y, 50.0);
        assert_eq!(service.bounding_client_rect(items[2]).unwrap().y, 100.0);
        assert_eq!(first_translate(&service, items[3]), Some(Transform::translate(0.0, 100.0)));

        service.advance(250.0);
        auto.pump(&mut service);
        assert_eq!(service.children(root), vec![items[0], items[3]]);
    }

    #[test]
    fn test_removing_sole_child_falls_back_to_root() {
        let mut service = DomService::new();
        let (root, items) = list(&mut service, 1);
        let mut auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();

        service.remove(items[0]).unwrap();
        auto.pump(&mut service);

        assert_eq!(service.parent(items[0]), Some(root));
        assert_eq!(service.computed_style(items[0]).unwrap().top, Some(0.0));
        assert_eq!(auto.pending_exits(), 1);
    }

    #[test]
    fn test_nested_mutations_are_observed() {
        let mut service = DomService::new();
        let root = service
            .parse_tree(&json!({
                "tag": "ul",
                "children": [ { "tag": "li", "children": [ { "tag": "div" } ] } ]
            }))
            .unwrap();
        let inner = service.children(service.children(root)[0])[0];
        let mut auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();
        let mut rx = auto.subscribe();

        let span = service.create_element("span");
        service.append_child(inner, span).unwrap();
        auto.pump(&mut service);

        assert!(drain(&mut rx).contains(&AnimateEvent::Entered { node: span }));
    }

    fn nested(service: &mut DomService, group_style: serde_json::Value) -> (NodeId, NodeId) {
        let root = service
            .parse_tree(&json!({
                "tag": "ul",
                "children": [
                    { "tag": "li", "style": { "height": 40 } },
                    {
                        "tag": "li",
                        "style": group_style,
                        "children": [
                            { "tag": "div", "style": { "height": 20 } },
                            { "tag": "div", "style": { "height": 20 } }
                        ]
                    }
                ]
            }))
            .unwrap();
        let group = service.children(root)[1];
        (root, service.children(group)[1])
    }

    #[test]
    fn test_nested_removal_under_static_parent_stays_in_place() {
        let mut service = DomService::new();
        let (root, removed) = nested(&mut service, json!({}));
        let mut auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();
        let old = auto.tracked_box(removed).unwrap();
        assert_eq!(old.top, 60.0);

        service.remove(removed).unwrap();
        auto.pump(&mut service);

        // Resolved against the root, the nearest positioned ancestor
        assert_eq!(service.computed_style(removed).unwrap().top, Some(60.0));
        let pinned = service.bounding_client_rect(removed).unwrap();
        assert_eq!((pinned.x, pinned.y), (old.left, old.top));
        assert_eq!(pinned.height, old.height);
    }

    #[test]
    fn test_nested_removal_under_positioned_parent_stays_in_place() {
        let mut service = DomService::new();
        let (root, removed) = nested(
            &mut service,
            json!({ "position": "relative", "border": { "top": 2 } }),
        );
        let mut auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();
        let old = auto.tracked_box(removed).unwrap();
        assert_eq!(old.top, 62.0);

        service.remove(removed).unwrap();
        auto.pump(&mut service);

        // Group border box starts at 40, its padding box at 42
        assert_eq!(service.computed_style(removed).unwrap().top, Some(20.0));
        assert_eq!(service.bounding_client_rect(removed).unwrap().y, old.top);
    }

    #[test]
    fn test_disconnect_keeps_running_exits() {
        let mut service = DomService::new();
        let (root, items) = list(&mut service, 2);
        let mut auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();

        service.remove(items[0]).unwrap();
        auto.pump(&mut service);
        auto.disconnect(&mut service);
        assert!(service.is_connected(items[0]));

        service.advance(250.0);
        auto.pump(&mut service);

        assert!(!service.is_connected(items[0]));
        assert_eq!(auto.pending_exits(), 0);
    }

    #[test]
    fn test_disconnect_stops_observation() {
        let mut service = DomService::new();
        let (root, items) = list(&mut service, 2);
        let mut auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();

        auto.disconnect(&mut service);
        service.remove(items[0]).unwrap();
        auto.pump(&mut service);

        assert!(!auto.is_observing());
        assert!(!service.is_connected(items[0]));
        assert!(service.animations_for(items[1]).is_empty());
    }

    #[test]
    fn test_added_and_removed_in_one_batch_is_skipped() {
        let mut service = DomService::new();
        let (root, _) = list(&mut service, 1);
        let mut auto = AutoAnimate::setup(&mut service, root, AnimateOptions::default()).unwrap();

        let flash = service.create_element("li");
        service.append_child(root, flash).unwrap();
        service.remove(flash).unwrap();
        auto.pump(&mut service);

        assert!(service.animations_for(flash).is_empty());
        assert!(auto.tracked_box(flash).is_none());
        assert!(!service.is_connected(flash));
    }
}
