use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Wrap an angle in radians into [-π, π]
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Shortest signed angular delta going from `from` to `to`
pub fn angle_delta(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Yaw (radians) of a horizontal direction; yaw 0 looks down -Z
pub fn yaw_of(dir: Vec3) -> f32 {
    dir.x.atan2(-dir.z)
}

/// Horizontal unit direction for a yaw angle
pub fn dir_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, -yaw.cos())
}

/// Map a 2D intent (x = strafe right, y = forward) onto the world XZ plane
pub fn intent_to_world(intent: Vec2) -> Vec3 {
    Vec3::new(intent.x, 0.0, -intent.y)
}

/// Normalize unless the vector is zero-length or non-finite (returns zero then)
pub fn safe_normalize2(v: Vec2) -> Vec2 {
    if !v.is_finite() || v.length_squared() <= f32::EPSILON {
        Vec2::ZERO
    } else {
        v.normalize()
    }
}

pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Move a scalar towards a target by at most `max_delta`
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}
