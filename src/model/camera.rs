use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Renderer-facing camera: where the eye is and where it looks
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 6.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }

    pub fn transform(&self) -> CameraTransform {
        CameraTransform {
            position: self.eye,
            target: self.target,
            fov_y: self.fov_y,
        }
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CameraMode {
    /// Behind and above the target, turning with its facing
    #[default]
    Follow,
    /// Spherical coordinates around the target, driven by pointer drag
    Orbit,
    /// Constant offset, ignores facing
    FixedAngle,
    /// Time-driven sweep
    Cinematic,
}

impl CameraMode {
    pub fn next(self) -> Self {
        match self {
            CameraMode::Follow => CameraMode::Orbit,
            CameraMode::Orbit => CameraMode::FixedAngle,
            CameraMode::FixedAngle => CameraMode::Cinematic,
            CameraMode::Cinematic => CameraMode::Follow,
        }
    }
}

/// Yaw `theta` and pitch `phi` around the target, radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitAngles {
    pub theta: f32,
    pub phi: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    pub mode: CameraMode,
    /// Clamped to [min_zoom, max_zoom]
    pub distance: f32,
    pub zoom_velocity: f32,
    pub orbit: OrbitAngles,
    /// Actual (lerped) eye position; `None` until the first frame
    pub smoothed_position: Option<Vec3>,
    pub fov_y: f32,
    /// Seconds since Cinematic mode was entered
    pub cinematic_time: f32,
}

impl CameraState {
    pub fn new(distance: f32, fov_y: f32) -> Self {
        Self {
            mode: CameraMode::Follow,
            distance,
            zoom_velocity: 0.0,
            orbit: OrbitAngles { theta: 0.0, phi: 0.3 },
            smoothed_position: None,
            fov_y,
            cinematic_time: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraTransform {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_cycle_returns_to_follow() {
        let mut mode = CameraMode::Follow;
        for _ in 0..4 {
            mode = mode.next();
        }
        assert_eq!(mode, CameraMode::Follow);
    }

    #[test]
    fn test_view_proj_is_finite() {
        let mut cam = Camera::new(800, 600);
        cam.eye = Vec3::new(0.0, 3.0, 6.0);
        cam.target = Vec3::new(0.0, 1.0, 0.0);
        assert!(cam.view_proj().is_finite());
        let uniform = cam.uniform();
        assert_eq!(bytemuck::bytes_of(&uniform).len(), 64);
    }
}
