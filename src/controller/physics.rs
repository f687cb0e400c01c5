use glam::Vec3;

use crate::config::PhysicsConfig;
use crate::model::{Aabb, Collider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Axis of smallest penetration. Ties go to Y, then X, then Z.
pub fn min_translation_axis(overlap: Vec3) -> Axis {
    let mut best = (Axis::Y, overlap.y);
    if overlap.x < best.1 {
        best = (Axis::X, overlap.x);
    }
    if overlap.z < best.1 {
        best = (Axis::Z, overlap.z);
    }
    best.0
}

/// Axis to resolve along. Boxes that only touch within the contact skin
/// (non-positive overlap) are resolved vertically when the touch is on Y and
/// ignored when it is on a side, so seams between tiles never act as walls.
pub fn contact_axis(overlap: Vec3) -> Option<Axis> {
    if overlap.x <= 0.0 || overlap.z <= 0.0 {
        return None;
    }
    if overlap.y <= 0.0 {
        return Some(Axis::Y);
    }
    Some(min_translation_axis(overlap))
}

/// One resolved overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub axis: Axis,
    pub depth: f32,
    /// Resolved upward out of a supporting box
    pub grounded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsResult {
    pub position: Vec3,
    pub velocity: Vec3,
    pub is_grounded: bool,
}

/// Handles character physics (gravity, drag, collision, grounding)
pub struct PhysicsSystem {
    config: PhysicsConfig,
}

impl PhysicsSystem {
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn half_size(&self) -> Vec3 {
        self.config.character_size * 0.5
    }

    /// Integrate one frame and resolve against the collider list.
    /// `was_grounded` is last frame's flag; grounding is recomputed from scratch.
    pub fn step(
        &self,
        position: Vec3,
        velocity: Vec3,
        was_grounded: bool,
        colliders: &[Collider],
        dt: f32,
    ) -> PhysicsResult {
        let cfg = &self.config;
        let mut vel = velocity;

        // Gravity, capped at terminal velocity
        if !was_grounded {
            vel.y = (vel.y + cfg.gravity * dt).max(-cfg.max_fall_speed);
        }

        let drag = if was_grounded { cfg.ground_drag } else { cfg.air_drag };
        vel.x *= drag;
        vel.z *= drag;

        let mut pos = position + vel * dt;
        let mut is_grounded = false;

        // Collider-list order, re-testing against the updated position after every push
        for pass in 0..cfg.relaxation_passes.max(1) {
            let mut pushed = false;
            for collider in colliders.iter().filter(|c| c.is_rigid) {
                if let Some(contact) = self.resolve(&mut pos, &mut vel, collider) {
                    is_grounded |= contact.grounded;
                    pushed |= contact.depth > cfg.contact_skin;
                }
            }
            if !pushed {
                break;
            }
            if pass > 0 {
                tracing::trace!(pass, "relaxation pass still pushing");
            }
        }

        PhysicsResult {
            position: pos,
            velocity: vel,
            is_grounded,
        }
    }

    /// Push the character box out of `collider` along the axis of least penetration
    pub fn resolve(&self, pos: &mut Vec3, vel: &mut Vec3, collider: &Collider) -> Option<Contact> {
        let half = self.half_size();
        let body = Aabb::from_center(*pos, half);
        let solid = collider.aabb();
        if !body.intersects(&solid, self.config.contact_skin) {
            return None;
        }

        let overlap = body.overlap(&solid);
        let axis = contact_axis(overlap)?;
        let i = axis.index();
        let depth = overlap[i].max(0.0);
        let from_positive_side = pos[i] >= solid.center()[i];

        pos[i] = if from_positive_side {
            solid.max[i] + half[i]
        } else {
            solid.min[i] - half[i]
        };

        let mut grounded = false;
        match axis {
            Axis::Y => {
                if from_positive_side {
                    // Landing or resting; an upward (separating) velocity is left alone
                    if vel.y <= 0.0 {
                        vel.y = 0.0;
                        grounded = true;
                    }
                } else if vel.y > 0.0 {
                    // Ceiling only cancels upward motion
                    vel.y = 0.0;
                }
            }
            Axis::X | Axis::Z => {
                let into_wall = if from_positive_side { vel[i] < 0.0 } else { vel[i] > 0.0 };
                if into_wall {
                    vel[i] *= self.config.wall_bounce;
                }
            }
        }

        if depth > self.config.contact_skin {
            tracing::trace!(?axis, depth, grounded, "resolved collision");
        }
        Some(Contact { axis, depth, grounded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DT: f32 = 1.0 / 60.0;

    fn system() -> PhysicsSystem {
        PhysicsSystem::new(PhysicsConfig::default())
    }

    fn floor() -> Collider {
        Collider::new(Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0))
    }

    #[test]
    fn test_min_translation_axis_picks_smallest() {
        assert_eq!(min_translation_axis(Vec3::new(1.0, 5.0, 3.0)), Axis::X);
        assert_eq!(min_translation_axis(Vec3::new(4.0, 5.0, 3.0)), Axis::Z);
        assert_eq!(min_translation_axis(Vec3::new(2.0, 2.0, 2.0)), Axis::Y);
    }

    #[test]
    fn test_resolution_uses_smallest_penetration_axis() {
        // Box sized so that it overlaps the collider by (1, 5, 3)
        let physics = PhysicsSystem::new(PhysicsConfig {
            character_size: Vec3::new(2.0, 5.0, 3.0),
            ..PhysicsConfig::default()
        });
        let collider = Collider::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(1.5, 10.0, 10.0));
        let mut pos = Vec3::ZERO;
        let mut vel = Vec3::ZERO;
        let body = Aabb::from_center(pos, physics.half_size());
        let o = body.overlap(&collider.aabb());
        assert_abs_diff_eq!(o.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(o.y, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(o.z, 3.0, epsilon = 1e-6);

        let contact = physics.resolve(&mut pos, &mut vel, &collider).unwrap();
        assert_eq!(contact.axis, Axis::X);
        assert_abs_diff_eq!(pos.x, -1.0, epsilon = 1e-6);
        assert_eq!(pos.y, 0.0);
        assert_eq!(pos.z, 0.0);
    }

    #[test]
    fn test_skin_only_side_contact_is_not_a_wall() {
        assert_eq!(contact_axis(Vec3::new(-0.0004, 0.0, 0.6)), None);
        assert_eq!(contact_axis(Vec3::new(0.3, -0.0004, 0.6)), Some(Axis::Y));
        assert_eq!(contact_axis(Vec3::new(0.3, 1.8, 0.6)), Some(Axis::X));
    }

    #[test]
    fn test_crossing_tile_seam_keeps_velocity() {
        let physics = system();
        let half = physics.half_size();
        // Second floor tile starts 0.0004 past the character's leading face
        let tile = Collider::new(Vec3::new(5.0004, -0.5, 0.0), Vec3::new(5.0, 0.5, 5.0));
        let mut pos = Vec3::new(-half.x, 0.9, 0.0);
        let mut vel = Vec3::new(4.0, 0.0, 0.0);
        assert!(physics.resolve(&mut pos, &mut vel, &tile).is_none());
        assert_eq!(vel, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(pos, Vec3::new(-half.x, 0.9, 0.0));
    }

    #[test]
    fn test_enclosed_character_is_pushed_out() {
        let physics = system();
        let block = Collider::new(Vec3::ZERO, Vec3::splat(5.0));
        let r = physics.step(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, true, &[block], DT);
        assert!(r.position.is_finite());
        assert!(r.velocity.is_finite());
        let body = Aabb::from_center(r.position, physics.half_size());
        let o = body.overlap(&block.aabb());
        assert!(o.min_element() <= physics.config().contact_skin, "still inside the block: {o:?}");
    }

    #[test]
    fn test_gravity_only_when_airborne_and_capped() {
        let physics = system();
        let airborne = physics.step(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO, false, &[], DT);
        assert!(airborne.velocity.y < 0.0);
        assert!(!airborne.is_grounded);

        let grounded = physics.step(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO, true, &[], DT);
        assert_eq!(grounded.velocity.y, 0.0);

        let fast = physics.step(Vec3::new(0.0, 50.0, 0.0), Vec3::new(0.0, -100.0, 0.0), false, &[], DT);
        assert_eq!(fast.velocity.y, -physics.config().max_fall_speed);
    }

    #[test]
    fn test_ground_drag_stronger_than_air_drag() {
        let physics = system();
        let v = Vec3::new(4.0, 0.0, 0.0);
        let on_ground = physics.step(Vec3::new(0.0, 0.9, 0.0), v, true, &[floor()], DT);
        let in_air = physics.step(Vec3::new(0.0, 20.0, 0.0), v, false, &[floor()], DT);
        assert_abs_diff_eq!(on_ground.velocity.x, 4.0 * physics.config().ground_drag, epsilon = 1e-5);
        assert_abs_diff_eq!(in_air.velocity.x, 4.0 * physics.config().air_drag, epsilon = 1e-5);
        assert!(on_ground.velocity.x < in_air.velocity.x);
    }

    #[test]
    fn test_resting_on_floor_stays_grounded() {
        let physics = system();
        let colliders = [floor()];
        let mut pos = Vec3::new(0.0, 0.9, 0.0);
        let mut vel = Vec3::ZERO;
        let mut grounded = true;
        for frame in 0..120 {
            let r = physics.step(pos, vel, grounded, &colliders, DT);
            assert!(r.is_grounded, "lost ground contact on frame {frame}");
            assert_eq!(r.velocity.y, 0.0);
            pos = r.position;
            vel = r.velocity;
            grounded = r.is_grounded;
        }
        assert_abs_diff_eq!(pos.y, 0.9, epsilon = 1e-5);
    }

    #[test]
    fn test_landing_zeroes_vertical_velocity() {
        let physics = system();
        let r = physics.step(Vec3::new(0.0, 0.95, 0.0), Vec3::new(0.0, -6.0, 0.0), false, &[floor()], DT);
        assert!(r.is_grounded);
        assert_eq!(r.velocity.y, 0.0);
        assert_abs_diff_eq!(r.position.y, 0.9, epsilon = 1e-5);
    }

    #[test]
    fn test_wall_bounce_damps_instead_of_stopping() {
        let physics = system();
        let wall = Collider::new(Vec3::new(1.5, 2.0, 0.0), Vec3::new(0.5, 2.0, 5.0));
        let half = physics.half_size();
        // Just short of the wall face at x = 1.0
        let start = Vec3::new(1.0 - half.x - 0.05, 2.0, 0.0);
        let r = physics.step(start, Vec3::new(8.0, 0.0, 0.0), false, &[wall], DT);

        let expected = 8.0 * physics.config().air_drag * physics.config().wall_bounce;
        assert!(r.velocity.x < 0.0, "should bounce back, got {}", r.velocity.x);
        assert_abs_diff_eq!(r.velocity.x, expected, epsilon = 1e-5);
        assert_abs_diff_eq!(r.position.x + half.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ceiling_only_cancels_upward_motion() {
        let physics = system();
        let ceiling = Collider::new(Vec3::new(0.0, 3.5, 0.0), Vec3::new(5.0, 0.5, 5.0));
        // Head at 2.95 moving up into the slab starting at 3.0
        let r = physics.step(Vec3::new(0.0, 2.05, 0.0), Vec3::new(1.0, 6.0, 0.0), false, &[ceiling], DT);
        assert_eq!(r.velocity.y, 0.0);
        assert!(!r.is_grounded);
        assert_abs_diff_eq!(r.position.y, 3.0 - 0.9, epsilon = 1e-5);
        assert!(r.velocity.x > 0.0);
    }

    #[test]
    fn test_trigger_colliders_are_ignored() {
        let physics = system();
        let trigger = Collider::trigger(Vec3::ZERO, Vec3::splat(5.0));
        let r = physics.step(Vec3::ZERO, Vec3::ZERO, true, &[trigger], DT);
        assert_eq!(r.position, Vec3::ZERO);
        assert!(!r.is_grounded);
    }

    fn corner_colliders() -> [Collider; 2] {
        // Wall on +x covering only the upper body, listed before the step it gets pushed into
        let wall = Collider {
            center: Vec3::new(1.925, 3.475, 0.0),
            half_extents: Vec3::new(1.075, 1.525, 5.0),
            is_rigid: true,
        };
        let step = Collider {
            center: Vec3::new(-1.2, -0.35, 0.0),
            half_extents: Vec3::new(1.8, 0.65, 5.0),
            is_rigid: true,
        };
        [wall, step]
    }

    #[test]
    fn test_single_pass_can_leave_nested_overlap() {
        let physics = system();
        let colliders = corner_colliders();
        let r = physics.step(Vec3::new(0.6, 1.0, 0.0), Vec3::ZERO, true, &colliders, DT);
        let body = Aabb::from_center(r.position, physics.half_size());
        let o = body.overlap(&colliders[0].aabb());
        assert!(o.x > 0.01 && o.y > 0.0, "expected leftover overlap with the wall, got {o:?}");
        assert!(r.is_grounded);
    }

    #[test]
    fn test_relaxation_passes_clear_nested_overlap() {
        let physics = PhysicsSystem::new(PhysicsConfig {
            relaxation_passes: 4,
            ..PhysicsConfig::default()
        });
        let colliders = corner_colliders();
        let r = physics.step(Vec3::new(0.6, 1.0, 0.0), Vec3::ZERO, true, &colliders, DT);
        let body = Aabb::from_center(r.position, physics.half_size());
        for c in &colliders {
            let o = body.overlap(&c.aabb());
            assert!(o.min_element() <= physics.config().contact_skin, "still overlapping {o:?}");
        }
        assert!(r.is_grounded);
    }
}
