use glam::Vec3;

use crate::config::SimConfig;
use crate::controller::{
    Action, AnimationBlender, CameraRig, InputEvent, InputProcessor, InputState, LocomotionController,
    PhysicsSystem, ShortcutDispatcher,
};
use crate::error::PhysicsError;
use crate::events::{EventQueue, SimEvent};
use crate::model::{
    CameraMode, CameraTransform, CameraUniform, CharacterSnapshot, CharacterState, Collider, MotionClip,
    StaticWorld, WorldQuery,
};

/// Longest frame the simulation will integrate in one step
pub const MAX_FRAME_DT: f32 = 0.1;

/// Owns every subsystem for one character and runs the ordered per-frame pass:
/// input -> locomotion -> physics -> animation request -> camera
pub struct Simulation {
    config: SimConfig,
    character: CharacterState,
    spawn_point: Vec3,
    last_good_position: Vec3,
    input: InputState,
    processor: InputProcessor,
    shortcuts: ShortcutDispatcher,
    physics: PhysicsSystem,
    locomotion: LocomotionController,
    blender: AnimationBlender,
    rig: CameraRig,
    world: StaticWorld,
    events: EventQueue,
    frame: u64,
    time: f64,
}

impl Simulation {
    pub fn new(config: SimConfig, world: StaticWorld, spawn_point: Vec3) -> Self {
        tracing::info!(colliders = world.len(), ?spawn_point, "spawning character");
        let mut sim = Self {
            character: CharacterState::new(spawn_point),
            spawn_point,
            last_good_position: spawn_point,
            input: InputState::new(),
            processor: InputProcessor::default(),
            shortcuts: ShortcutDispatcher::default(),
            physics: PhysicsSystem::new(config.physics.clone()),
            locomotion: LocomotionController::new(config.movement.clone()),
            blender: AnimationBlender::new(&config.animation),
            rig: CameraRig::new(config.camera.clone(), 800, 600),
            world,
            events: EventQueue::new(),
            frame: 0,
            time: 0.0,
            config,
        };
        sim.rig.snap(sim.character.position, sim.character.facing_direction, &sim.world);
        sim
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn character(&self) -> &CharacterState {
        &self.character
    }

    pub fn blender(&self) -> &AnimationBlender {
        &self.blender
    }

    pub fn blender_mut(&mut self) -> &mut AnimationBlender {
        &mut self.blender
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn world(&self) -> &StaticWorld {
        &self.world
    }

    pub fn locomotion(&self) -> &LocomotionController {
        &self.locomotion
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutDispatcher {
        &mut self.shortcuts
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds since spawn
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn register_clip(&mut self, state: impl Into<String>, clip: impl MotionClip + 'static) {
        self.blender.register(state, clip);
    }

    /// Colliders may be appended mid-session but never removed
    pub fn add_collider(&mut self, collider: Collider) {
        self.world.add_collider(collider);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.rig.set_aspect(width, height);
    }

    pub fn set_camera_mode(&mut self, mode: CameraMode) {
        self.rig.set_mode(mode);
    }

    pub fn set_camera_distance(&mut self, distance: f32) {
        self.rig.set_distance(distance);
    }

    /// Feed one host input event. Shortcuts fire on the key-down transition only.
    pub fn handle_event(&mut self, event: InputEvent) {
        if let InputEvent::KeyDown(key) = &event {
            if !self.input.is_key_pressed(key) {
                if let Some(action) = self.shortcuts.dispatch(key) {
                    self.apply_action(action);
                }
            }
        }
        self.input.process_event(&event);
    }

    fn apply_action(&mut self, action: Action) {
        tracing::debug!(?action, "shortcut");
        match action {
            Action::CycleCameraMode => self.rig.cycle_mode(),
            Action::SetCameraMode(mode) => self.rig.set_mode(mode),
            Action::ResetCamera => {
                self.rig.reset();
                self.rig.snap(self.character.position, self.character.facing_direction, &self.world);
            }
            Action::Respawn => self.respawn(self.spawn_point),
        }
    }

    /// Put the character back at `position` with fresh state
    pub fn respawn(&mut self, position: Vec3) {
        let position = if position.is_finite() { position } else { self.spawn_point };
        tracing::info!(?position, "respawn");
        let was_grounded = self.character.is_grounded;
        self.character = CharacterState::new(position);
        if was_grounded {
            self.events.push(SimEvent::GroundedChanged(false));
        }
        self.last_good_position = position;
        self.locomotion.reset();
        self.blender.reset();
        self.input.clear();
        self.processor.reset();
        self.rig.snap(position, self.character.facing_direction, &self.world);
    }

    /// Advance one frame by `dt` seconds (clamped to [0, MAX_FRAME_DT])
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        self.frame += 1;
        self.time += f64::from(dt);

        let intent = self.processor.intent(&self.input);
        let drag = self.input.consume_drag();
        let wheel = self.input.consume_wheel();

        let loco = self.locomotion.update(&mut self.character, &intent, dt);

        let was_grounded = self.character.is_grounded;
        let result = self.physics.step(
            self.character.position,
            self.character.velocity,
            was_grounded,
            self.world.colliders(),
            dt,
        );
        self.character.position = result.position;
        self.character.velocity = result.velocity;
        self.character.is_grounded = result.is_grounded;
        self.sanitize();

        if self.character.is_grounded != was_grounded {
            self.events.push(SimEvent::GroundedChanged(self.character.is_grounded));
        }
        let landed = !was_grounded && self.character.is_grounded;

        self.locomotion.animate(&self.character, loco, landed, &mut self.blender);
        self.blender.update(dt);
        self.events
            .extend(self.blender.drain_changes().into_iter().map(SimEvent::AnimationChanged));

        self.rig.apply_orbit(drag.x, drag.y);
        self.rig.apply_zoom(wheel);
        self.rig
            .update(self.character.position, self.character.facing_direction, &self.world, dt);
    }

    /// Restore the last known-good position if physics produced NaN/inf
    fn sanitize(&mut self) {
        if self.character.is_finite() {
            self.last_good_position = self.character.position;
        } else {
            let field = if self.character.position.is_finite() { "velocity" } else { "position" };
            let err = PhysicsError::NonFinite { field };
            tracing::warn!(frame = self.frame, "{err}");
            self.character.position = self.last_good_position;
            self.character.velocity = Vec3::ZERO;
        }
        if !self.character.facing_direction.is_finite() {
            self.character.facing_direction = Vec3::NEG_Z;
        }
        if !self.character.stamina.is_finite() {
            self.character.stamina = 0.0;
        }
    }

    pub fn snapshot(&self) -> CharacterSnapshot {
        self.character.snapshot(self.blender.current_state())
    }

    pub fn camera_transform(&self) -> CameraTransform {
        self.rig.transform()
    }

    pub fn camera_uniform(&self) -> CameraUniform {
        self.rig.uniform()
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    #[cfg(test)]
    fn character_mut(&mut self) -> &mut CharacterState {
        &mut self.character
    }
}
