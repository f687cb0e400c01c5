//! Tuning tables for the simulation core, loaded from TOML with env overrides.

use anyhow::{bail, Context, Result};
use glam::Vec3;
use serde::Deserialize;
use std::path::Path;

// Locomotion
pub const WALK_SPEED: f32 = 4.0;
pub const RUN_SPEED: f32 = 8.0;
/// Speeding up is snappier than slowing down
pub const ACCEL_FACTOR: f32 = 10.0;
pub const DECEL_FACTOR: f32 = 6.0;
/// Radians of remaining turn closed per second
pub const ROTATION_SPEED: f32 = 12.0;
pub const JUMP_IMPULSE: f32 = 8.0;
pub const JUMP_EPSILON: f32 = 0.01;
pub const WALK_ANIM_THRESHOLD: f32 = 0.1;
pub const RUN_ANIM_THRESHOLD: f32 = 5.0;

// Stamina (per frame)
pub const MAX_STAMINA: f32 = 100.0;
pub const STAMINA_DRAIN: f32 = 0.5;
pub const STAMINA_REGEN_IDLE: f32 = 0.4;
pub const STAMINA_REGEN_WALK: f32 = 0.15;
pub const SPRINT_MIN_STAMINA: f32 = 0.0;
pub const SPRINT_REENTRY_STAMINA: f32 = 20.0;

// Physics
pub const GRAVITY: f32 = -9.8;
pub const MAX_FALL_SPEED: f32 = 20.0;
pub const GROUND_DRAG: f32 = 0.85;
pub const AIR_DRAG: f32 = 0.98;
pub const WALL_BOUNCE: f32 = -0.2;
pub const CONTACT_SKIN: f32 = 1e-3;
pub const CHARACTER_SIZE: Vec3 = Vec3::new(0.6, 1.8, 0.6);

// Animation
pub const DEFAULT_BLEND_DURATION: f32 = 0.2;
pub const HISTORY_CAPACITY: usize = 16;

// Camera
pub const MIN_ZOOM: f32 = 2.0;
pub const MAX_ZOOM: f32 = 15.0;
pub const DEFAULT_DISTANCE: f32 = 6.0;
pub const ZOOM_SENSITIVITY: f32 = 0.01;
pub const ZOOM_DAMPING: f32 = 0.85;
pub const CAMERA_SMOOTHING: f32 = 0.1;
pub const ORBIT_SENSITIVITY: f32 = 0.005;
/// Keeps pitch away from the poles
pub const PHI_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.1;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub movement: MovementConfig,
    pub physics: PhysicsConfig,
    pub animation: AnimationConfig,
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub accel_factor: f32,
    pub decel_factor: f32,
    pub rotation_speed: f32,
    pub jump_impulse: f32,
    pub jump_epsilon: f32,
    pub walk_anim_threshold: f32,
    pub run_anim_threshold: f32,
    pub max_stamina: f32,
    pub stamina_drain: f32,
    pub stamina_regen_idle: f32,
    pub stamina_regen_walk: f32,
    pub sprint_min_stamina: f32,
    pub sprint_reentry_stamina: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: WALK_SPEED,
            run_speed: RUN_SPEED,
            accel_factor: ACCEL_FACTOR,
            decel_factor: DECEL_FACTOR,
            rotation_speed: ROTATION_SPEED,
            jump_impulse: JUMP_IMPULSE,
            jump_epsilon: JUMP_EPSILON,
            walk_anim_threshold: WALK_ANIM_THRESHOLD,
            run_anim_threshold: RUN_ANIM_THRESHOLD,
            max_stamina: MAX_STAMINA,
            stamina_drain: STAMINA_DRAIN,
            stamina_regen_idle: STAMINA_REGEN_IDLE,
            stamina_regen_walk: STAMINA_REGEN_WALK,
            sprint_min_stamina: SPRINT_MIN_STAMINA,
            sprint_reentry_stamina: SPRINT_REENTRY_STAMINA,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub ground_drag: f32,
    pub air_drag: f32,
    /// Factor applied to the velocity component along a wall's normal on impact
    pub wall_bounce: f32,
    pub contact_skin: f32,
    pub character_size: Vec3,
    /// 1 = single ordered pass over the collider list. Higher values keep
    /// re-running the pass until nothing overlaps or the cap is reached.
    pub relaxation_passes: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            ground_drag: GROUND_DRAG,
            air_drag: AIR_DRAG,
            wall_bounce: WALL_BOUNCE,
            contact_skin: CONTACT_SKIN,
            character_size: CHARACTER_SIZE,
            relaxation_passes: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub default_blend_duration: f32,
    pub history_capacity: usize,
    /// Explicit (from, to, seconds) crossfade overrides
    pub transitions: Vec<(String, String, f32)>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_blend_duration: DEFAULT_BLEND_DURATION,
            history_capacity: HISTORY_CAPACITY,
            transitions: vec![
                ("idle".into(), "walk".into(), 0.25),
                ("walk".into(), "run".into(), 0.15),
                ("run".into(), "walk".into(), 0.2),
                ("jump".into(), "land".into(), 0.1),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub distance: f32,
    pub zoom_sensitivity: f32,
    /// Fraction of zoom momentum kept each frame
    pub zoom_damping: f32,
    /// Lerp factor towards the ideal position per frame
    pub smoothing: f32,
    pub orbit_sensitivity: f32,
    pub phi_limit: f32,
    pub follow_height: f32,
    pub shoulder_offset: f32,
    pub look_height: f32,
    pub fixed_offset: Vec3,
    pub cinematic_speed: f32,
    pub cinematic_height: f32,
    pub cinematic_bob: f32,
    /// Gap kept between the camera and an occluding surface
    pub occlusion_clearance: f32,
    pub base_fov_deg: f32,
    pub max_fov_deg: f32,
    pub fov_ease: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            distance: DEFAULT_DISTANCE,
            zoom_sensitivity: ZOOM_SENSITIVITY,
            zoom_damping: ZOOM_DAMPING,
            smoothing: CAMERA_SMOOTHING,
            orbit_sensitivity: ORBIT_SENSITIVITY,
            phi_limit: PHI_LIMIT,
            follow_height: 2.0,
            shoulder_offset: 0.0,
            look_height: 0.6,
            fixed_offset: Vec3::new(1.0, 1.2, 1.0),
            cinematic_speed: 0.4,
            cinematic_height: 3.0,
            cinematic_bob: 0.75,
            occlusion_clearance: 0.2,
            base_fov_deg: 60.0,
            max_fov_deg: 72.0,
            fov_ease: 0.08,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        let m = &self.movement;
        if m.walk_speed <= 0.0 || m.run_speed < m.walk_speed {
            bail!("movement: need 0 < walk_speed <= run_speed (got {} / {})", m.walk_speed, m.run_speed);
        }
        if m.sprint_reentry_stamina > m.max_stamina {
            bail!("movement: sprint_reentry_stamina exceeds max_stamina");
        }
        let p = &self.physics;
        for (name, v) in [("ground_drag", p.ground_drag), ("air_drag", p.air_drag)] {
            if !(v > 0.0 && v <= 1.0) {
                bail!("physics: {name} must be in (0, 1], got {v}");
            }
        }
        if p.relaxation_passes == 0 {
            bail!("physics: relaxation_passes must be at least 1");
        }
        let c = &self.camera;
        if c.min_zoom <= 0.0 || c.min_zoom > c.max_zoom {
            bail!("camera: need 0 < min_zoom <= max_zoom (got {} / {})", c.min_zoom, c.max_zoom);
        }
        Ok(())
    }
}

/// Parse a TOML config file
pub fn load(path: &Path) -> Result<SimConfig> {
    let txt = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SimConfig = toml::from_str(&txt).context("parse wayfarer TOML")?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from `WAYFARER_CONFIG` if set, else defaults, then apply env overrides
pub fn load_default() -> Result<SimConfig> {
    let mut cfg = match std::env::var("WAYFARER_CONFIG") {
        Ok(path) => load(Path::new(&path))?,
        Err(_) => SimConfig::default(),
    };
    // Env overrides for quick tuning (optional)
    if let Some(v) = env_f32("WAYFARER_WALK_SPEED") {
        cfg.movement.walk_speed = v;
    }
    if let Some(v) = env_f32("WAYFARER_RUN_SPEED") {
        cfg.movement.run_speed = v;
    }
    if let Some(v) = env_f32("WAYFARER_GRAVITY") {
        cfg.physics.gravity = v;
    }
    if let Some(v) = env_f32("WAYFARER_MIN_ZOOM") {
        cfg.camera.min_zoom = v;
    }
    if let Some(v) = env_f32("WAYFARER_MAX_ZOOM") {
        cfg.camera.max_zoom = v;
    }
    cfg.validate()?;
    tracing::info!("config loaded");
    Ok(cfg)
}

fn env_f32(key: &str) -> Option<f32> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: SimConfig = toml::from_str(
            r#"
            [movement]
            walk_speed = 3.0

            [camera]
            max_zoom = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.movement.walk_speed, 3.0);
        assert_eq!(cfg.movement.run_speed, RUN_SPEED);
        assert_eq!(cfg.camera.max_zoom, 20.0);
        assert_eq!(cfg.physics.gravity, GRAVITY);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_transition_overrides_parse() {
        let cfg: SimConfig = toml::from_str(
            r#"
            [animation]
            transitions = [["idle", "jump", 0.05]]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.animation.transitions, vec![("idle".to_string(), "jump".to_string(), 0.05)]);
        assert_eq!(cfg.animation.history_capacity, HISTORY_CAPACITY);
    }

    #[test]
    fn test_inverted_zoom_rejected() {
        let mut cfg = SimConfig::default();
        cfg.camera.min_zoom = 10.0;
        cfg.camera.max_zoom = 5.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_drag_out_of_range_rejected() {
        let mut cfg = SimConfig::default();
        cfg.physics.air_drag = 1.5;
        assert!(cfg.validate().is_err());
    }
}
