//! Crossfading animation state machine over named motion clips.
//!
//! Deferred work (one-shot auto-return, queued transitions) is stored as
//! `{fire_at, target}` records checked against the blender's own clock in
//! [`AnimationBlender::update`], so a host can step it frame by frame.

use std::collections::{HashMap, VecDeque};

use crate::config::AnimationConfig;
use crate::error::AnimationError;
use crate::model::MotionClip;
use crate::utils::move_towards;

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRecord {
    /// `None` for the first activation after construction or reset
    pub from: Option<String>,
    pub to: String,
    pub duration: f32,
    /// Blender clock when the transition started
    pub timestamp: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTransition {
    pub fire_at: f32,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    target: f32,
    /// Weight units per second
    rate: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct Layer {
    state: String,
    weight: f32,
}

pub struct AnimationBlender {
    clips: HashMap<String, Box<dyn MotionClip>>,
    current: Option<String>,
    queued: Option<ScheduledTransition>,
    one_shot: Option<ScheduledTransition>,
    transitions: HashMap<(String, String), f32>,
    default_duration: f32,
    history: VecDeque<TransitionRecord>,
    history_capacity: usize,
    fades: HashMap<String, Fade>,
    layer: Option<Layer>,
    clock: f32,
    changes: Vec<String>,
}

impl AnimationBlender {
    pub fn new(config: &AnimationConfig) -> Self {
        let transitions = config
            .transitions
            .iter()
            .map(|(from, to, d)| ((from.clone(), to.clone()), *d))
            .collect();
        Self {
            clips: HashMap::new(),
            current: None,
            queued: None,
            one_shot: None,
            transitions,
            default_duration: config.default_blend_duration,
            history: VecDeque::new(),
            history_capacity: config.history_capacity.max(1),
            fades: HashMap::new(),
            layer: None,
            clock: 0.0,
            changes: Vec::new(),
        }
    }

    pub fn register(&mut self, state: impl Into<String>, clip: impl MotionClip + 'static) {
        let state = state.into();
        tracing::debug!(state = %state, duration = clip.duration(), "registered animation clip");
        self.clips.insert(state, Box::new(clip));
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.clips.contains_key(state)
    }

    pub fn set_transition(&mut self, from: &str, to: &str, duration: f32) {
        self.transitions.insert((from.to_owned(), to.to_owned()), duration.max(0.0));
    }

    /// Per-pair override if present, else the global default
    pub fn transition_duration(&self, from: Option<&str>, to: &str) -> f32 {
        from.and_then(|f| self.transitions.get(&(f.to_owned(), to.to_owned())))
            .copied()
            .unwrap_or(self.default_duration)
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn queued_state(&self) -> Option<&str> {
        self.queued.as_ref().map(|q| q.target.as_str())
    }

    pub fn layer_state(&self) -> Option<&str> {
        self.layer.as_ref().map(|l| l.state.as_str())
    }

    /// Target weight of the secondary layer, 0 when no layer is set
    pub fn layer_weight(&self) -> f32 {
        self.layer.as_ref().map(|l| l.weight).unwrap_or(0.0)
    }

    pub fn history(&self) -> &VecDeque<TransitionRecord> {
        &self.history
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Current influence of a state's clip; 0 for unknown states
    pub fn weight(&self, state: &str) -> f32 {
        self.clips.get(state).map(|c| c.weight()).unwrap_or(0.0)
    }

    pub fn clip(&self, state: &str) -> Option<&dyn MotionClip> {
        self.clips.get(state).map(|c| c.as_ref())
    }

    pub fn is_one_shot_active(&self) -> bool {
        self.one_shot.is_some()
    }

    /// State names entered since the last drain, oldest first
    pub fn drain_changes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.changes)
    }

    /// Crossfade to `state` using the table/default duration. Returns whether a
    /// transition started; unknown states are logged and ignored.
    pub fn blend_to(&mut self, state: &str) -> bool {
        self.blend_to_with(state, None)
    }

    pub fn blend_to_with(&mut self, state: &str, duration: Option<f32>) -> bool {
        match self.start_transition(state, duration) {
            Ok(started) => {
                if started {
                    // An explicit request supersedes any pending deferred transition
                    self.one_shot = None;
                    self.queued = None;
                }
                started
            }
            Err(err) => {
                tracing::warn!("animation request ignored: {err}");
                false
            }
        }
    }

    /// Blend to `state`, then back to `return_state` once the clip's own
    /// duration has elapsed on the blender clock.
    pub fn play_once(&mut self, state: &str, return_state: &str, blend: Option<f32>) -> bool {
        let duration = match (self.clips.get(state), self.clips.get(return_state)) {
            (Some(clip), Some(_)) => clip.duration(),
            (None, _) => return self.reject(AnimationError::UnknownState(state.to_owned())),
            (_, None) => return self.reject(AnimationError::UnknownState(return_state.to_owned())),
        };

        if self.current.as_deref() == Some(state) {
            // Retrigger from the top
            if let Some(clip) = self.clips.get_mut(state) {
                clip.set_current_time(0.0);
            }
        } else if let Err(err) = self.start_transition(state, blend) {
            return self.reject(err);
        }

        self.queued = None;
        self.one_shot = Some(ScheduledTransition {
            fire_at: self.clock + duration,
            target: return_state.to_owned(),
        });
        tracing::debug!(state, return_state, duration, "one-shot scheduled");
        true
    }

    /// Change where a pending one-shot returns to. No-op without a pending
    /// one-shot or when `return_state` has no clip.
    pub fn retarget_one_shot(&mut self, return_state: &str) -> bool {
        if !self.clips.contains_key(return_state) {
            return false;
        }
        match self.one_shot.as_mut() {
            Some(pending) if pending.target != return_state => {
                tracing::trace!(from = %pending.target, to = return_state, "one-shot return retargeted");
                pending.target = return_state.to_owned();
                true
            }
            _ => false,
        }
    }

    /// Defer a transition until the current clip's remaining time has elapsed
    pub fn queue_animation(&mut self, state: &str) -> bool {
        if !self.has_state(state) {
            return self.reject(AnimationError::UnknownState(state.to_owned()));
        }
        let remaining = match self.current.as_deref().and_then(|c| self.clips.get(c)) {
            Some(clip) => clip.remaining(),
            None => {
                tracing::debug!(state, "nothing playing, queued animation starts now");
                return self.blend_to(state);
            }
        };
        self.queued = Some(ScheduledTransition {
            fire_at: self.clock + remaining,
            target: state.to_owned(),
        });
        tracing::debug!(state, remaining, "animation queued");
        true
    }

    /// Play `state` on the secondary layer at a partial weight, alongside the base state
    pub fn set_layer(&mut self, state: &str, weight: f32) -> bool {
        if !self.has_state(state) {
            return self.reject(AnimationError::UnknownState(state.to_owned()));
        }
        if self.current.as_deref() == Some(state) {
            tracing::warn!(state, "layer state is already the base state, ignored");
            return false;
        }
        let weight = weight.clamp(0.0, 1.0);
        if let Some(old) = self.layer.take() {
            if old.state != state {
                self.fade(&old.state, 0.0, self.default_duration);
            }
        }
        if self.weight(state) == 0.0 {
            if let Some(clip) = self.clips.get_mut(state) {
                clip.set_current_time(0.0);
            }
        }
        self.fade(state, weight, self.default_duration);
        self.layer = Some(Layer { state: state.to_owned(), weight });
        true
    }

    pub fn clear_layer(&mut self) {
        if let Some(layer) = self.layer.take() {
            self.fade(&layer.state, 0.0, self.default_duration);
        }
    }

    /// Stop every clip and forget all state, history and pending timers
    pub fn reset(&mut self) {
        for clip in self.clips.values_mut() {
            clip.set_weight(0.0);
            clip.set_current_time(0.0);
        }
        self.current = None;
        self.queued = None;
        self.one_shot = None;
        self.history.clear();
        self.fades.clear();
        self.layer = None;
        self.changes.clear();
        tracing::debug!("animation blender reset");
    }

    /// Advance clock, playback and fades by `dt`, then fire due deferred transitions
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.clock += dt;

        for (name, clip) in self.clips.iter_mut() {
            if clip.weight() > 0.0 || self.fades.contains_key(name) {
                clip.advance(dt);
            }
        }

        let clips = &mut self.clips;
        self.fades.retain(|name, fade| {
            let Some(clip) = clips.get_mut(name) else {
                return false;
            };
            let w = move_towards(clip.weight(), fade.target, fade.rate * dt);
            clip.set_weight(w);
            w != fade.target
        });

        if let Some(due) = self.one_shot.take_if_due(self.clock) {
            tracing::debug!(return_to = %due.target, "one-shot finished, returning");
            if let Err(err) = self.start_transition(&due.target, None) {
                tracing::warn!("one-shot return ignored: {err}");
            }
        }
        if let Some(due) = self.queued.take_if_due(self.clock) {
            if let Err(err) = self.start_transition(&due.target, None) {
                tracing::warn!("queued animation ignored: {err}");
            }
        }
    }

    fn reject(&self, err: AnimationError) -> bool {
        tracing::warn!("animation request ignored: {err}");
        false
    }

    fn start_transition(&mut self, next: &str, duration: Option<f32>) -> Result<bool, AnimationError> {
        if !self.clips.contains_key(next) {
            return Err(AnimationError::UnknownState(next.to_owned()));
        }
        if self.current.as_deref() == Some(next) {
            return Ok(false);
        }

        let from = self.current.clone();
        let duration = duration.unwrap_or_else(|| self.transition_duration(from.as_deref(), next)).max(0.0);

        if self.layer.as_ref().is_some_and(|l| l.state == next) {
            self.layer = None;
        }
        let layer_state = self.layer.as_ref().map(|l| l.state.clone());

        let outgoing: Vec<String> = self
            .clips
            .iter()
            .filter(|(name, clip)| {
                name.as_str() != next
                    && layer_state.as_deref() != Some(name.as_str())
                    && (clip.weight() > 0.0 || self.fades.get(*name).is_some_and(|f| f.target > 0.0))
            })
            .map(|(name, _)| name.clone())
            .collect();
        for name in outgoing {
            self.fade(&name, 0.0, duration);
        }

        if self.weight(next) == 0.0 {
            if let Some(clip) = self.clips.get_mut(next) {
                clip.set_current_time(0.0);
            }
        }
        self.fade(next, 1.0, duration);

        tracing::debug!(from = from.as_deref().unwrap_or("-"), to = next, duration, "crossfade");
        self.history.push_back(TransitionRecord {
            from,
            to: next.to_owned(),
            duration,
            timestamp: self.clock,
        });
        while self.history.len() > self.history_capacity {
            self.history.pop_front();
        }
        self.current = Some(next.to_owned());
        self.changes.push(next.to_owned());
        Ok(true)
    }

    /// Zero-length fades apply immediately
    fn fade(&mut self, state: &str, target: f32, duration: f32) {
        if duration <= 0.0 {
            if let Some(clip) = self.clips.get_mut(state) {
                clip.set_weight(target);
            }
            self.fades.remove(state);
        } else {
            self.fades.insert(state.to_owned(), Fade { target, rate: 1.0 / duration });
        }
    }
}

trait TakeIfDue {
    fn take_if_due(&mut self, clock: f32) -> Option<ScheduledTransition>;
}

impl TakeIfDue for Option<ScheduledTransition> {
    fn take_if_due(&mut self, clock: f32) -> Option<ScheduledTransition> {
        if self.as_ref().is_some_and(|s| clock >= s.fire_at) {
            self.take()
        } else {
            None
        }
    }
}
