//! Transition engine
//!
//! Per-element lifecycle:
//!
//! ```text
//! Untracked ──enter──▶ Tracked ──remain──▶ Tracked ...
//!                         │
//!                         └──exit──▶ (animating) ──finish──▶ Detached
//! ```
//!
//! Enter and remain only read geometry and start an animation. Exit is the
//! interesting one: the element is already gone from the tree, so it is put
//! back where it was, pinned with absolute positioning at its last box, and
//! faded out. Only the finish notification really detaches it.

use ahash::AHashMap;
use dom::utils::format_px;
use dom::{AnimationId, AnimationTiming, Keyframe, NodeId, Transform};
use tracing::{debug, trace};

use crate::anchor::{DeletionMarkers, SiblingAnchor, SiblingContext};
use crate::config::AnimateOptions;
use crate::events::AnimateEvent;
use crate::geometry::{capture, transition_size, CoordinateTracker, ElementBox, TransitionSize};
use crate::host::Host;

const HIDDEN_SCALE: f64 = 0.98;
const EXIT_Z_INDEX: &str = "100";

/// What a batch means for one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Enter,
    Remain,
    Exit,
    /// Already exiting, or appeared and vanished within one batch
    Skip,
}

/// Per-root transition state
pub struct TransitionEngine {
    root: NodeId,
    options: AnimateOptions,
    pub(crate) tracker: CoordinateTracker,
    pub(crate) anchors: SiblingAnchor,
    pub(crate) markers: DeletionMarkers,
    pending_exits: AHashMap<AnimationId, NodeId>,
}

impl TransitionEngine {
    pub fn new(root: NodeId, options: AnimateOptions) -> Self {
        Self {
            root,
            options,
            tracker: CoordinateTracker::new(),
            anchors: SiblingAnchor::new(),
            markers: DeletionMarkers::new(),
            pending_exits: AHashMap::new(),
        }
    }

    pub fn options(&self) -> &AnimateOptions {
        &self.options
    }

    /// Record the current box of `root` and all of its descendants
    pub fn seed(&mut self, host: &dyn Host, root: NodeId) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            self.tracker.record(node, capture(host, node));
            stack.extend(host.children(node).into_iter().rev());
        }
    }

    pub fn resolve(&self, host: &dyn Host, node: NodeId) -> Action {
        if self.markers.contains(node) {
            return Action::Skip;
        }
        match (self.tracker.contains(node), host.is_connected(node)) {
            (true, true) => Action::Remain,
            (true, false) => Action::Exit,
            (false, true) => Action::Enter,
            (false, false) => Action::Skip,
        }
    }

    /// Resolve and play the transition for one element
    pub fn dispatch(&mut self, host: &mut dyn Host, node: NodeId) -> Option<AnimateEvent> {
        let action = self.resolve(host, node);
        trace!("[AutoAnimate] node {} resolved to {:?}", node, action);
        match action {
            Action::Enter => self.enter(host, node),
            Action::Remain => self.remain(host, node),
            Action::Exit => self.exit(host, node),
            Action::Skip => None,
        }
    }

    fn enter(&mut self, host: &mut dyn Host, node: NodeId) -> Option<AnimateEvent> {
        self.tracker.record(node, capture(host, node));

        let timing = AnimationTiming::new(self.options.enter_duration(), "ease-in");
        match host.animate(node, enter_keyframes(), timing) {
            Ok(_) => Some(AnimateEvent::Entered { node }),
            Err(e) => {
                debug!("[AutoAnimate] enter animation for {} failed: {}", node, e);
                None
            }
        }
    }

    fn remain(&mut self, host: &mut dyn Host, node: NodeId) -> Option<AnimateEvent> {
        // A move queues a removal too; the element never left
        self.anchors.forget(node);

        let old = self.tracker.lookup(node)?;
        let new = capture(host, node);
        let size = transition_size(&host.computed_style(node), &old, &new);

        let dx = old.left - new.left;
        let dy = old.top - new.top;
        let keyframes = remain_keyframes(dx, dy, &size);
        let timing = AnimationTiming::new(self.options.duration, self.options.easing.to_string());

        let result = host.animate(node, keyframes, timing);
        self.tracker.record(node, new);

        match result {
            Ok(_) => Some(AnimateEvent::Remained { node, dx, dy }),
            Err(e) => {
                debug!("[AutoAnimate] remain animation for {} failed: {}", node, e);
                None
            }
        }
    }

    fn exit(&mut self, host: &mut dyn Host, node: NodeId) -> Option<AnimateEvent> {
        let Some(context) = self.anchors.get(node) else {
            debug!("[AutoAnimate] no sibling context for {}, skipping exit", node);
            return None;
        };
        let old = self.tracker.lookup(node)?;

        self.markers.mark(node);

        if let Err(e) = self.reinsert(host, node, context) {
            debug!("[AutoAnimate] could not reinsert {}: {}", node, e);
            return None;
        }

        let size = transition_size(&host.computed_style(node), &old, &old);
        let container = self.containing_block(&*host, node);
        let container_border = host.computed_style(container).border;
        let container_box = self
            .tracker
            .lookup(container)
            .unwrap_or_else(|| capture(host, container));

        let top = round_half_up(old.top - container_box.top) - container_border.top;
        let left = round_half_up(old.left - container_box.left) - container_border.left;

        if let Err(e) = freeze(host, node, top, left, &size) {
            debug!("[AutoAnimate] could not pin {} for exit: {}", node, e);
        }

        let timing = AnimationTiming::new(self.options.duration, "ease-out");
        match host.animate(node, exit_keyframes(), timing) {
            Ok(animation) => {
                self.pending_exits.insert(animation, node);
                Some(AnimateEvent::ExitStarted { node, animation })
            }
            Err(e) => {
                debug!("[AutoAnimate] exit animation for {} failed: {}", node, e);
                None
            }
        }
    }

    /// Box that `top`/`left` of an absolutely positioned `node` resolve
    /// against: its nearest positioned ancestor, never above the root
    fn containing_block(&self, host: &dyn Host, node: NodeId) -> NodeId {
        let mut current = host.parent(node);
        while let Some(ancestor) = current {
            if ancestor == self.root || host.computed_style(ancestor).position.is_positioned() {
                return ancestor;
            }
            current = host.parent(ancestor);
        }
        self.root
    }

    /// Put a removed element back next to its old neighbours
    fn reinsert(
        &self,
        host: &mut dyn Host,
        node: NodeId,
        context: SiblingContext,
    ) -> dom::Result<()> {
        if let Some(next) = context.next {
            if let Some(parent) = host.parent(next) {
                return host.insert_before(parent, node, Some(next));
            }
        }
        if let Some(previous) = context.previous {
            if let Some(parent) = host.parent(previous) {
                return host.append_child(parent, node);
            }
        }
        host.append_child(self.root, node)
    }

    /// Completion of an exit animation: detach for real and drop all state.
    ///
    /// Returns `None` for animations this engine did not start.
    pub fn finish_exit(&mut self, host: &mut dyn Host, animation: AnimationId) -> Option<AnimateEvent> {
        let node = self.pending_exits.remove(&animation)?;

        if let Err(e) = host.remove(node) {
            debug!("[AutoAnimate] could not detach {}: {}", node, e);
        }
        self.tracker.forget(node);
        self.anchors.forget(node);

        Some(AnimateEvent::Detached { node })
    }

    pub fn tracked_box(&self, node: NodeId) -> Option<ElementBox> {
        self.tracker.lookup(node)
    }

    pub fn sibling_context(&self, node: NodeId) -> Option<SiblingContext> {
        self.anchors.get(node)
    }

    pub fn is_exiting(&self, node: NodeId) -> bool {
        self.markers.contains(node)
    }

    pub fn pending_exits(&self) -> usize {
        self.pending_exits.len()
    }
}

/// Pin an exiting element over its old spot so siblings can reflow freely
fn freeze(
    host: &mut dyn Host,
    node: NodeId,
    top: f64,
    left: f64,
    size: &TransitionSize,
) -> dom::Result<()> {
    let declarations = [
        ("position", "absolute".to_string()),
        ("top", format_px(top)),
        ("left", format_px(left)),
        ("width", format_px(size.old_width)),
        ("height", format_px(size.old_height)),
        ("margin", "0".to_string()),
        ("pointer-events", "none".to_string()),
        ("transform-origin", "center".to_string()),
        ("z-index", EXIT_Z_INDEX.to_string()),
    ];
    for (name, value) in declarations {
        host.set_style(node, name, &value)?;
    }
    Ok(())
}

/// `Math.round` semantics: halves round towards +∞
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Fade and grow in, holding invisible for the first half
pub fn enter_keyframes() -> Vec<Keyframe> {
    vec![
        Keyframe::new()
            .transform(Transform::scale(HIDDEN_SCALE))
            .opacity(0.0),
        Keyframe::new()
            .offset(0.5)
            .transform(Transform::scale(HIDDEN_SCALE))
            .opacity(0.0),
        Keyframe::new().transform(Transform::scale(1.0)).opacity(1.0),
    ]
}

/// Inverted translate back to identity.
///
/// Width and height only appear when they actually change: equal endpoints
/// under a non-linear easing still interpolate through fractional values
/// and jitter.
pub fn remain_keyframes(dx: f64, dy: f64, size: &TransitionSize) -> Vec<Keyframe> {
    let mut start = Keyframe::new().transform(Transform::translate(dx, dy));
    let mut end = Keyframe::new().transform(Transform::translate(0.0, 0.0));

    if size.old_height != size.new_height {
        start = start.height(size.old_height);
        end = end.height(size.new_height);
    }
    if size.old_width != size.new_width {
        start = start.width(size.old_width);
        end = end.width(size.new_width);
    }

    vec![start, end]
}

pub fn exit_keyframes() -> Vec<Keyframe> {
    vec![
        Keyframe::new().transform(Transform::scale(1.0)).opacity(1.0),
        Keyframe::new()
            .transform(Transform::scale(HIDDEN_SCALE))
            .opacity(0.0),
    ]
}
