use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::config::MAX_STAMINA;

/// Authoritative simulation record for one controllable actor
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterState {
    /// Centre of the character box, world space
    pub position: Vec3,
    pub velocity: Vec3,
    /// Unit horizontal vector
    pub facing_direction: Vec3,
    /// Kept in [0, MAX_STAMINA]
    pub stamina: f32,
    pub is_grounded: bool,
    pub is_sprinting: bool,
}

impl CharacterState {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            facing_direction: Vec3::NEG_Z,
            stamina: MAX_STAMINA,
            is_grounded: false,
            is_sprinting: false,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }

    pub fn horizontal_speed(&self) -> f32 {
        Vec2::new(self.velocity.x, self.velocity.z).length()
    }

    pub fn snapshot(&self, animation_state: Option<&str>) -> CharacterSnapshot {
        CharacterSnapshot {
            position: self.position,
            velocity: self.velocity,
            facing_direction: self.facing_direction,
            is_sprinting: self.is_sprinting,
            stamina: self.stamina,
            is_grounded: self.is_grounded,
            animation_state: animation_state.map(str::to_owned),
        }
    }
}

/// Per-frame desired movement, rebuilt from held input every frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputIntent {
    /// x = right, y = forward; not normalized
    pub direction: Vec2,
    pub sprint: bool,
    /// Set only on the frame the jump key went down
    pub jump: bool,
}

/// Read-only view handed to HUD and autosave collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub facing_direction: Vec3,
    pub is_sprinting: bool,
    pub stamina: f32,
    pub is_grounded: bool,
    pub animation_state: Option<String>,
}
