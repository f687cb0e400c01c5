use glam::Vec3;

use crate::config::CameraConfig;
use crate::model::{Camera, CameraMode, CameraState, CameraTransform, CameraUniform, WorldQuery};

/// Frames the tracked character: mode-specific ideal position, occlusion
/// pull-in, then exponential smoothing toward the result.
pub struct CameraRig {
    config: CameraConfig,
    state: CameraState,
    camera: Camera,
}

impl CameraRig {
    pub fn new(config: CameraConfig, width: u32, height: u32) -> Self {
        let distance = config.distance.clamp(config.min_zoom, config.max_zoom);
        let state = CameraState::new(distance, config.base_fov_deg.to_radians());
        let mut camera = Camera::new(width, height);
        camera.fov_y = state.fov_y;
        Self { config, state, camera }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mode(&self) -> CameraMode {
        self.state.mode
    }

    pub fn distance(&self) -> f32 {
        self.state.distance
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Takes effect from the next update; position keeps smoothing from where it is
    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode == self.state.mode {
            return;
        }
        tracing::debug!(from = ?self.state.mode, to = ?mode, "camera mode");
        self.state.mode = mode;
        if mode == CameraMode::Cinematic {
            self.state.cinematic_time = 0.0;
        }
    }

    pub fn cycle_mode(&mut self) {
        self.set_mode(self.state.mode.next());
    }

    /// Jump straight to a distance, dropping any zoom momentum
    pub fn set_distance(&mut self, distance: f32) {
        if !distance.is_finite() {
            tracing::warn!(distance, "ignoring non-finite camera distance");
            return;
        }
        self.state.distance = distance.clamp(self.config.min_zoom, self.config.max_zoom);
        self.state.zoom_velocity = 0.0;
    }

    /// Wheel input feeds zoom momentum; positive zooms out
    pub fn apply_zoom(&mut self, delta_y: f32) {
        if delta_y.is_finite() {
            self.state.zoom_velocity += delta_y * self.config.zoom_sensitivity;
        }
    }

    /// Pointer drag rotates the orbit; pitch stays clear of the poles
    pub fn apply_orbit(&mut self, dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        let s = self.config.orbit_sensitivity;
        let limit = self.config.phi_limit;
        let orbit = &mut self.state.orbit;
        orbit.theta = crate::utils::wrap_angle(orbit.theta - dx * s);
        orbit.phi = (orbit.phi + dy * s).clamp(-limit, limit);
    }

    /// Back to the configured distance, angles and FOV. Mode is kept.
    pub fn reset(&mut self) {
        let mode = self.state.mode;
        let distance = self.config.distance.clamp(self.config.min_zoom, self.config.max_zoom);
        self.state = CameraState::new(distance, self.config.base_fov_deg.to_radians());
        self.state.mode = mode;
        self.camera.fov_y = self.state.fov_y;
    }

    /// Point the camera looks at
    pub fn focus(&self, target: Vec3) -> Vec3 {
        target + Vec3::Y * self.config.look_height
    }

    /// Where the active mode wants the eye, before occlusion
    pub fn ideal_position(&self, target: Vec3, facing: Vec3) -> Vec3 {
        let cfg = &self.config;
        let focus = self.focus(target);
        let d = self.state.distance;
        match self.state.mode {
            CameraMode::Follow => {
                let forward = crate::utils::horizontal(facing).try_normalize().unwrap_or(Vec3::NEG_Z);
                let right = forward.cross(Vec3::Y);
                target - forward * d + Vec3::Y * cfg.follow_height + right * cfg.shoulder_offset
            }
            CameraMode::Orbit => {
                let o = self.state.orbit;
                let offset = Vec3::new(o.phi.cos() * o.theta.sin(), o.phi.sin(), o.phi.cos() * o.theta.cos());
                focus + offset * d
            }
            CameraMode::FixedAngle => {
                let dir = cfg.fixed_offset.try_normalize().unwrap_or(Vec3::new(0.0, 0.5, 1.0).normalize());
                focus + dir * d
            }
            CameraMode::Cinematic => {
                let t = self.state.cinematic_time;
                let angle = t * cfg.cinematic_speed;
                let bob = cfg.cinematic_bob * (t * 0.5).sin();
                focus + Vec3::new(angle.sin() * d, cfg.cinematic_height + bob, angle.cos() * d)
            }
        }
    }

    /// Pull `ideal` toward `focus` if something solid sits between them.
    /// An inconclusive query leaves `ideal` untouched.
    fn occlusion_corrected(&self, focus: Vec3, ideal: Vec3, world: &dyn WorldQuery) -> Vec3 {
        let offset = ideal - focus;
        let len = offset.length();
        if !(len > 1e-4) {
            return ideal;
        }
        let dir = offset / len;
        match world.raycast(focus, dir, len) {
            Some(hit) if hit.is_finite() && hit < len => {
                let pulled = (hit - self.config.occlusion_clearance).max(0.0);
                tracing::trace!(hit, pulled, "camera occluded");
                focus + dir * pulled
            }
            _ => ideal,
        }
    }

    fn advance_zoom(&mut self) {
        let s = &mut self.state;
        s.distance += s.zoom_velocity;
        s.zoom_velocity *= self.config.zoom_damping;
        let clamped = s.distance.clamp(self.config.min_zoom, self.config.max_zoom);
        if clamped != s.distance {
            s.distance = clamped;
            s.zoom_velocity = 0.0;
        }
        if s.zoom_velocity.abs() < 1e-4 {
            s.zoom_velocity = 0.0;
        }
    }

    fn advance_fov(&mut self) {
        let cfg = &self.config;
        let span = (cfg.max_zoom - cfg.min_zoom).max(f32::EPSILON);
        let t = ((self.state.distance - cfg.min_zoom) / span).clamp(0.0, 1.0);
        let target = (cfg.base_fov_deg + (cfg.max_fov_deg - cfg.base_fov_deg) * t).to_radians();
        self.state.fov_y += (target - self.state.fov_y) * cfg.fov_ease;
    }

    /// Per-frame update. A non-finite target leaves the camera where it was.
    pub fn update(&mut self, target: Vec3, facing: Vec3, world: &dyn WorldQuery, dt: f32) -> CameraTransform {
        if !target.is_finite() {
            tracing::warn!("camera target not finite, holding last position");
            return self.camera.transform();
        }
        if self.state.mode == CameraMode::Cinematic && dt.is_finite() {
            self.state.cinematic_time += dt.max(0.0);
        }
        self.advance_zoom();
        self.advance_fov();

        let focus = self.focus(target);
        let ideal = self.occlusion_corrected(focus, self.ideal_position(target, facing), world);

        let next = match self.state.smoothed_position {
            Some(prev) => prev.lerp(ideal, self.config.smoothing),
            None => ideal,
        };
        if next.is_finite() {
            self.state.smoothed_position = Some(next);
            self.camera.eye = next;
            self.camera.target = focus;
        }
        self.camera.fov_y = self.state.fov_y;
        self.camera.transform()
    }

    /// Place the camera on its (occlusion-corrected) ideal position with no lag
    pub fn snap(&mut self, target: Vec3, facing: Vec3, world: &dyn WorldQuery) -> CameraTransform {
        if target.is_finite() {
            let focus = self.focus(target);
            let ideal = self.occlusion_corrected(focus, self.ideal_position(target, facing), world);
            self.state.smoothed_position = Some(ideal);
            self.camera.eye = ideal;
            self.camera.target = focus;
        }
        self.camera.transform()
    }

    pub fn transform(&self) -> CameraTransform {
        self.camera.transform()
    }

    pub fn uniform(&self) -> CameraUniform {
        self.camera.uniform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Collider, StaticWorld};
    use approx::assert_abs_diff_eq;

    const DT: f32 = 1.0 / 60.0;

    fn rig() -> CameraRig {
        CameraRig::new(CameraConfig::default(), 800, 600)
    }

    #[test]
    fn test_zoom_clamped_both_ways() {
        let cfg = CameraConfig::default();
        let world = StaticWorld::new();
        let mut r = rig();
        for _ in 0..200 {
            r.apply_zoom(-500.0);
            r.update(Vec3::ZERO, Vec3::NEG_Z, &world, DT);
            assert!(r.distance() >= cfg.min_zoom);
        }
        assert_abs_diff_eq!(r.distance(), cfg.min_zoom);
        for _ in 0..200 {
            r.apply_zoom(500.0);
            r.update(Vec3::ZERO, Vec3::NEG_Z, &world, DT);
            assert!(r.distance() <= cfg.max_zoom);
        }
        assert_abs_diff_eq!(r.distance(), cfg.max_zoom);
    }

    #[test]
    fn test_zoom_has_momentum() {
        let world = StaticWorld::new();
        let mut r = rig();
        let start = r.distance();
        r.apply_zoom(100.0);
        r.update(Vec3::ZERO, Vec3::NEG_Z, &world, DT);
        let first = r.distance() - start;
        r.update(Vec3::ZERO, Vec3::NEG_Z, &world, DT);
        let second = r.distance() - start - first;
        assert!(first > 0.0);
        assert!(second > 0.0 && second < first, "momentum should decay, got {first} then {second}");
    }

    #[test]
    fn test_set_distance_clamps() {
        let cfg = CameraConfig::default();
        let mut r = rig();
        r.set_distance(100.0);
        assert_eq!(r.distance(), cfg.max_zoom);
        r.set_distance(0.0);
        assert_eq!(r.distance(), cfg.min_zoom);
        r.set_distance(f32::NAN);
        assert_eq!(r.distance(), cfg.min_zoom);
    }

    #[test]
    fn test_orbit_pitch_clamped() {
        let cfg = CameraConfig::default();
        let mut r = rig();
        r.apply_orbit(0.0, 1e6);
        assert_abs_diff_eq!(r.state().orbit.phi, cfg.phi_limit);
        r.apply_orbit(0.0, -1e6);
        assert_abs_diff_eq!(r.state().orbit.phi, -cfg.phi_limit);
    }

    #[test]
    fn test_follow_stays_behind_facing() {
        let world = StaticWorld::new();
        let mut r = rig();
        let t = r.snap(Vec3::ZERO, Vec3::X, &world);
        assert!(t.position.x < -1.0, "camera should sit behind +X facing, got {:?}", t.position);
        assert_abs_diff_eq!(t.position.z, 0.0, epsilon = 1e-5);

        let t = r.snap(Vec3::ZERO, Vec3::NEG_Z, &world);
        assert!(t.position.z > 1.0);
        assert!(t.position.y > 0.0);
    }

    #[test]
    fn test_shoulder_offset_skews_right() {
        let world = StaticWorld::new();
        let cfg = CameraConfig { shoulder_offset: 0.5, ..CameraConfig::default() };
        let mut r = CameraRig::new(cfg, 800, 600);
        let t = r.snap(Vec3::ZERO, Vec3::NEG_Z, &world);
        assert_abs_diff_eq!(t.position.x, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_occlusion_pulls_camera_in() {
        let cfg = CameraConfig::default();
        let wall = Collider::new(Vec3::new(0.0, 2.0, 3.0), Vec3::new(5.0, 5.0, 0.5));
        let world = StaticWorld::with_colliders(vec![wall]);
        let mut r = rig();
        let t = r.snap(Vec3::new(0.0, 0.9, 0.0), Vec3::NEG_Z, &world);
        assert!(t.position.z < 2.5, "camera must stay in front of the wall, got {:?}", t.position);
        let focus = Vec3::new(0.0, 0.9 + cfg.look_height, 0.0);
        assert!(t.position.distance(focus) < r.distance());
    }

    #[test]
    fn test_trigger_volume_does_not_occlude() {
        let trigger = Collider::trigger(Vec3::new(0.0, 2.0, 3.0), Vec3::new(5.0, 5.0, 0.5));
        let world = StaticWorld::with_colliders(vec![trigger]);
        let mut r = rig();
        let t = r.snap(Vec3::ZERO, Vec3::NEG_Z, &world);
        assert_abs_diff_eq!(t.position.z, r.distance(), epsilon = 1e-5);
    }

    #[test]
    fn test_smoothing_lerps_by_fixed_factor() {
        let cfg = CameraConfig::default();
        let world = StaticWorld::new();
        let mut r = rig();
        let start = r.snap(Vec3::ZERO, Vec3::NEG_Z, &world).position;
        let target = Vec3::new(10.0, 0.0, 0.0);
        let ideal = r.ideal_position(target, Vec3::NEG_Z);
        let t = r.update(target, Vec3::NEG_Z, &world, DT);
        let expected = start.lerp(ideal, cfg.smoothing);
        assert_abs_diff_eq!(t.position.x, expected.x, epsilon = 1e-4);
        assert_abs_diff_eq!(t.position.z, expected.z, epsilon = 1e-4);
    }

    #[test]
    fn test_fov_widens_when_zoomed_out() {
        let world = StaticWorld::new();
        let mut r = rig();
        let before = r.state().fov_y;
        r.set_distance(CameraConfig::default().max_zoom);
        for _ in 0..120 {
            r.update(Vec3::ZERO, Vec3::NEG_Z, &world, DT);
        }
        assert!(r.state().fov_y > before);
        assert!(r.state().fov_y <= CameraConfig::default().max_fov_deg.to_radians() + 1e-5);
    }

    #[test]
    fn test_cinematic_is_function_of_time() {
        let world = StaticWorld::new();
        let mut a = rig();
        let mut b = rig();
        a.set_mode(CameraMode::Cinematic);
        b.set_mode(CameraMode::Cinematic);
        for _ in 0..30 {
            a.update(Vec3::ZERO, Vec3::NEG_Z, &world, DT);
            b.update(Vec3::ZERO, Vec3::X, &world, DT);
        }
        assert_eq!(a.ideal_position(Vec3::ZERO, Vec3::NEG_Z), b.ideal_position(Vec3::ZERO, Vec3::X));
    }

    #[test]
    fn test_non_finite_target_holds_position() {
        let world = StaticWorld::new();
        let mut r = rig();
        let before = r.snap(Vec3::ZERO, Vec3::NEG_Z, &world);
        let after = r.update(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::NEG_Z, &world, DT);
        assert_eq!(before.position, after.position);
    }

    #[test]
    fn test_mode_cycle_and_reset() {
        let mut r = rig();
        r.cycle_mode();
        assert_eq!(r.mode(), CameraMode::Orbit);
        r.apply_orbit(100.0, 50.0);
        r.set_distance(12.0);
        r.reset();
        assert_eq!(r.mode(), CameraMode::Orbit);
        assert_eq!(r.distance(), CameraConfig::default().distance);
        assert_eq!(r.state().orbit.theta, 0.0);
    }
}
