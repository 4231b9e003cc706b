//! Declarative animation playback
//!
//! The document owns one timeline. Animations are fire-and-forget: callers
//! hand over keyframes and timing, then learn about completion by draining
//! `take_finished()` after advancing the clock.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::NodeId;

/// Animation identifier (monotonic per timeline)
pub type AnimationId = u32;

/// Transform functions the engine animates through
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    Scale { factor: f64 },
    Translate { x: f64, y: f64 },
}

impl Transform {
    pub fn scale(factor: f64) -> Self {
        Transform::Scale { factor }
    }

    pub fn translate(x: f64, y: f64) -> Self {
        Transform::Translate { x, y }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Scale { factor } => write!(f, "scale({})", factor),
            Transform::Translate { x, y } => write!(f, "translate({}px, {}px)", x, y),
        }
    }
}

/// One keyframe. Absent properties are simply not animated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Keyframe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }
}

/// Duration (ms) and CSS easing expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationTiming {
    pub duration: f64,
    pub easing: String,
}

impl AnimationTiming {
    pub fn new(duration: f64, easing: impl Into<String>) -> Self {
        Self {
            duration,
            easing: easing.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayState {
    Running,
    Finished,
    /// Replaced by a newer animation on the same node; never notifies
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animation {
    pub id: AnimationId,
    pub target: NodeId,
    pub keyframes: Vec<Keyframe>,
    pub timing: AnimationTiming,
    pub start_time: f64,
    pub play_state: PlayState,
}

impl Animation {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.timing.duration
    }
}

/// Document timeline
#[derive(Debug, Default)]
pub struct AnimationTimeline {
    now: f64,
    next_id: AnimationId,
    animations: Vec<Animation>,
    finished: Vec<AnimationId>,
}

impl AnimationTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an animation, cancelling whatever was still running on `target`
    pub fn play(
        &mut self,
        target: NodeId,
        keyframes: Vec<Keyframe>,
        timing: AnimationTiming,
    ) -> AnimationId {
        for animation in self.animations.iter_mut() {
            if animation.target == target && animation.play_state == PlayState::Running {
                animation.play_state = PlayState::Cancelled;
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.animations.push(Animation {
            id,
            target,
            keyframes,
            timing,
            start_time: self.now,
            play_state: PlayState::Running,
        });
        id
    }

    /// Move the clock forward; due animations finish in start order
    pub fn advance(&mut self, elapsed_ms: f64) {
        self.now += elapsed_ms.max(0.0);
        let now = self.now;
        for animation in self.animations.iter_mut() {
            if animation.play_state == PlayState::Running && animation.end_time() <= now {
                animation.play_state = PlayState::Finished;
                self.finished.push(animation.id);
            }
        }
    }

    /// Drain completion notifications
    pub fn take_finished(&mut self) -> Vec<AnimationId> {
        std::mem::take(&mut self.finished)
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.iter().find(|a| a.id == id)
    }

    /// All animations ever started on `target`, oldest first
    pub fn for_target(&self, target: NodeId) -> Vec<&Animation> {
        self.animations
            .iter()
            .filter(|a| a.target == target)
            .collect()
    }
}
