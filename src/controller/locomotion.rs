use glam::Vec3;

use crate::config::MovementConfig;
use crate::controller::animation::AnimationBlender;
use crate::model::{CharacterState, InputIntent};
use crate::utils::{angle_delta, dir_from_yaw, horizontal, intent_to_world, safe_normalize2, yaw_of};

/// Speed-driven locomotion clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionClass {
    Idle,
    Walk,
    Run,
}

impl MotionClass {
    pub fn as_str(self) -> &'static str {
        match self {
            MotionClass::Idle => "idle",
            MotionClass::Walk => "walk",
            MotionClass::Run => "run",
        }
    }
}

pub const JUMP_STATE: &str = "jump";
pub const LAND_STATE: &str = "land";

/// Pure speed -> clip mapping
pub fn classify_speed(speed: f32, config: &MovementConfig) -> MotionClass {
    if speed < config.walk_anim_threshold {
        MotionClass::Idle
    } else if speed < config.run_anim_threshold {
        MotionClass::Walk
    } else {
        MotionClass::Run
    }
}

/// What the pre-physics pass decided
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocomotionFrame {
    pub moving: bool,
    pub jumped: bool,
}

/// Input -> velocity -> facing, plus stamina and animation requests
pub struct LocomotionController {
    config: MovementConfig,
    speed: f32,
    /// Last non-zero world movement direction
    move_dir: Vec3,
    /// Set when stamina ran dry; cleared once it refills to the re-entry threshold
    exhausted: bool,
    /// Speed state whose clip is missing, to avoid re-requesting it every frame
    missing: Option<MotionClass>,
}

impl LocomotionController {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            speed: 0.0,
            move_dir: Vec3::NEG_Z,
            exhausted: false,
            missing: None,
        }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Smoothed scalar speed
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn reset(&mut self) {
        self.speed = 0.0;
        self.move_dir = Vec3::NEG_Z;
        self.exhausted = false;
        self.missing = None;
    }

    pub fn target_speed(&self, moving: bool, sprinting: bool) -> f32 {
        match (moving, sprinting) {
            (false, _) => 0.0,
            (true, false) => self.config.walk_speed,
            (true, true) => self.config.run_speed,
        }
    }

    /// Pre-physics pass: steer velocity and facing from intent, handle jump and stamina
    pub fn update(&mut self, state: &mut CharacterState, intent: &InputIntent, dt: f32) -> LocomotionFrame {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let cfg = &self.config;

        // Diagonal input is normalized so it is no faster than cardinal input
        let dir2 = safe_normalize2(intent.direction);
        let moving = dir2 != glam::Vec2::ZERO;

        state.is_sprinting =
            moving && intent.sprint && !self.exhausted && state.stamina > cfg.sprint_min_stamina;

        let target = self.target_speed(moving, state.is_sprinting);
        let factor = if target > self.speed { cfg.accel_factor } else { cfg.decel_factor };
        self.speed += (target - self.speed) * (factor * dt).min(1.0);

        if moving {
            let world_dir = intent_to_world(dir2);
            self.move_dir = world_dir;

            // Shortest signed turn, never past the target
            let current = yaw_of(state.facing_direction);
            let delta = angle_delta(current, yaw_of(world_dir));
            let step = delta * (cfg.rotation_speed * dt).min(1.0);
            state.facing_direction = dir_from_yaw(current + step);

            state.velocity.x = world_dir.x * self.speed;
            state.velocity.z = world_dir.z * self.speed;
        } else {
            // No intent: drag does the stopping, only cap at the decaying speed
            let h = horizontal(state.velocity).clamp_length_max(self.speed);
            state.velocity.x = h.x;
            state.velocity.z = h.z;
        }

        let mut jumped = false;
        if intent.jump {
            if state.is_grounded && state.velocity.y.abs() < cfg.jump_epsilon {
                state.velocity.y = cfg.jump_impulse;
                jumped = true;
                tracing::debug!(impulse = cfg.jump_impulse, "jump");
            } else {
                tracing::trace!("jump ignored while airborne");
            }
        }

        self.update_stamina(state, moving);
        LocomotionFrame { moving, jumped }
    }

    fn update_stamina(&mut self, state: &mut CharacterState, moving: bool) {
        let cfg = &self.config;
        if state.is_sprinting {
            state.stamina -= cfg.stamina_drain;
            if state.stamina <= 0.0 {
                state.stamina = 0.0;
                state.is_sprinting = false;
                self.exhausted = true;
                tracing::debug!("stamina depleted, sprint locked");
            }
        } else if moving {
            state.stamina += cfg.stamina_regen_walk;
        } else {
            state.stamina += cfg.stamina_regen_idle;
        }
        state.stamina = state.stamina.clamp(0.0, cfg.max_stamina);

        if self.exhausted && state.stamina >= cfg.sprint_reentry_stamina {
            self.exhausted = false;
            tracing::debug!(stamina = state.stamina, "sprint unlocked");
        }
    }

    /// Post-physics pass: pick the animation from resolved speed and events.
    /// Jump and land are one-shots that return to the speed-based state.
    pub fn animate(
        &mut self,
        state: &CharacterState,
        frame: LocomotionFrame,
        landed: bool,
        blender: &mut AnimationBlender,
    ) {
        let class = classify_speed(state.horizontal_speed(), &self.config);

        // Without a jump/land clip, fall through to the speed-based state
        if frame.jumped && blender.play_once(JUMP_STATE, class.as_str(), None) {
            return;
        }
        if landed && blender.play_once(LAND_STATE, class.as_str(), None) {
            return;
        }
        if blender.is_one_shot_active() {
            // Return to whatever the actor is doing when the one-shot ends
            blender.retarget_one_shot(class.as_str());
            return;
        }
        if blender.current_state() == Some(class.as_str()) {
            return;
        }
        // Only skip while the clip is still absent; it may be registered later
        if self.missing == Some(class) && !blender.has_state(class.as_str()) {
            return;
        }
        if blender.blend_to(class.as_str()) {
            self.missing = None;
        } else {
            self.missing = Some(class);
        }
    }
}
