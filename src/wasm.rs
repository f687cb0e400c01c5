//! Browser entry points. The host owns the render loop and calls `step` once
//! per animation frame with the elapsed milliseconds.

use glam::Vec3;
use wasm_bindgen::prelude::wasm_bindgen;
use web_sys::{Event, KeyboardEvent, MouseEvent};

use crate::config::SimConfig;
use crate::controller::input::wasm::{keyboard_event_to_input, mouse_drag_to_input, mouse_wheel_to_input};
use crate::controller::InputEvent;
use crate::frame_loop::Simulation;
use crate::logging;
use crate::model::{CameraMode, Clip, Collider, StaticWorld};

#[wasm_bindgen(start)]
pub fn start() {
    logging::init();
    tracing::info!("wayfarer wasm module loaded");
}

#[wasm_bindgen]
pub struct WasmSimulation {
    sim: Simulation,
}

#[wasm_bindgen]
impl WasmSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(spawn_x: f32, spawn_y: f32, spawn_z: f32) -> WasmSimulation {
        logging::init();
        let sim = Simulation::new(SimConfig::default(), StaticWorld::new(), Vec3::new(spawn_x, spawn_y, spawn_z));
        WasmSimulation { sim }
    }

    /// Append a box collider; `rigid = false` makes a trigger volume
    pub fn add_collider(&mut self, cx: f32, cy: f32, cz: f32, hx: f32, hy: f32, hz: f32, rigid: bool) {
        let center = Vec3::new(cx, cy, cz);
        let half = Vec3::new(hx, hy, hz);
        let collider = if rigid { Collider::new(center, half) } else { Collider::trigger(center, half) };
        self.sim.add_collider(collider);
    }

    pub fn register_clip(&mut self, state: &str, duration: f32, looping: bool) {
        let clip = if looping { Clip::looping(duration) } else { Clip::once(duration) };
        self.sim.register_clip(state, clip);
    }

    pub fn on_key(&mut self, event: &KeyboardEvent, is_down: bool) {
        self.sim.handle_event(keyboard_event_to_input(event, is_down));
    }

    pub fn on_pointer_drag(&mut self, event: &MouseEvent) {
        self.sim.handle_event(mouse_drag_to_input(event));
    }

    pub fn on_wheel(&mut self, event: &Event) {
        if let Some(input) = mouse_wheel_to_input(event) {
            self.sim.handle_event(input);
        }
    }

    pub fn on_blur(&mut self) {
        self.sim.handle_event(InputEvent::FocusLost);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.sim.set_viewport(width, height);
    }

    /// 0 follow, 1 orbit, 2 fixed angle, 3 cinematic
    pub fn set_camera_mode(&mut self, mode: u8) {
        let mode = match mode {
            0 => CameraMode::Follow,
            1 => CameraMode::Orbit,
            2 => CameraMode::FixedAngle,
            3 => CameraMode::Cinematic,
            other => {
                tracing::warn!(mode = other, "unknown camera mode");
                return;
            }
        };
        self.sim.set_camera_mode(mode);
    }

    pub fn set_camera_distance(&mut self, distance: f32) {
        self.sim.set_camera_distance(distance);
    }

    pub fn respawn(&mut self, x: f32, y: f32, z: f32) {
        self.sim.respawn(Vec3::new(x, y, z));
    }

    pub fn step(&mut self, dt_ms: f64) {
        self.sim.step((dt_ms / 1000.0) as f32);
    }

    pub fn position(&self) -> Vec<f32> {
        self.sim.character().position.to_array().to_vec()
    }

    pub fn facing(&self) -> Vec<f32> {
        self.sim.character().facing_direction.to_array().to_vec()
    }

    pub fn stamina(&self) -> f32 {
        self.sim.character().stamina
    }

    pub fn animation_state(&self) -> Option<String> {
        self.sim.blender().current_state().map(str::to_owned)
    }

    pub fn camera_position(&self) -> Vec<f32> {
        self.sim.camera_transform().position.to_array().to_vec()
    }

    /// Column-major 4x4, ready for a uniform buffer
    pub fn view_proj(&self) -> Vec<f32> {
        bytemuck::cast_slice(&self.sim.camera_uniform().view_proj).to_vec()
    }
}
