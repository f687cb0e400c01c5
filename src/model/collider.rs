use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Overlap depth per axis; a negative component means separated on that axis
    pub fn overlap(&self, other: &Aabb) -> Vec3 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// Boxes closer than `skin` on every axis count as touching
    pub fn intersects(&self, other: &Aabb, skin: f32) -> bool {
        let o = self.overlap(other);
        o.x > -skin && o.y > -skin && o.z > -skin
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Slab test. Returns the entry distance along `dir` (unit), or `None`
    /// when the ray misses or the box lies beyond `max_dist`. A ray starting
    /// inside the box reports 0.
    pub fn ray_hit(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<f32> {
        let mut t_min = 0.0f32;
        let mut t_max = max_dist;
        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

/// Static or kinematic box owned by the level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub center: Vec3,
    pub half_extents: Vec3,
    /// Non-rigid colliders are trigger volumes: never pushed against, never occlude
    pub is_rigid: bool,
}

impl Collider {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self { center, half_extents, is_rigid: true }
    }

    pub fn trigger(center: Vec3, half_extents: Vec3) -> Self {
        Self { center, half_extents, is_rigid: false }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.center, self.half_extents)
    }
}

/// What the simulation needs from the level
pub trait WorldQuery {
    fn colliders(&self) -> &[Collider];

    /// Distance to the first solid surface along `dir` (unit) within `max_dist`
    fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<f32>;
}

/// Collider list populated at level load; append-only afterwards
#[derive(Debug, Clone, Default)]
pub struct StaticWorld {
    colliders: Vec<Collider>,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colliders(colliders: Vec<Collider>) -> Self {
        Self { colliders }
    }

    pub fn add_collider(&mut self, collider: Collider) {
        self.colliders.push(collider);
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl WorldQuery for StaticWorld {
    fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<f32> {
        if !origin.is_finite() || !dir.is_finite() || !max_dist.is_finite() {
            return None;
        }
        self.colliders
            .iter()
            .filter(|c| c.is_rigid)
            // A box enclosing the origin would pin the camera to the target; skip it
            .filter(|c| !c.aabb().contains_point(origin))
            .filter_map(|c| c.aabb().ray_hit(origin, dir, max_dist))
            .min_by(|a, b| a.total_cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_overlap_depths() {
        let a = Aabb::from_center(Vec3::ZERO, Vec3::splat(1.0));
        let b = Aabb::from_center(Vec3::new(1.5, 0.0, 0.0), Vec3::splat(1.0));
        let o = a.overlap(&b);
        assert_abs_diff_eq!(o.x, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(o.y, 2.0, epsilon = 1e-6);
        assert!(a.intersects(&b, 0.0));
    }

    #[test]
    fn test_touching_counts_within_skin() {
        let a = Aabb::from_center(Vec3::new(0.0, 1.0, 0.0), Vec3::splat(1.0));
        let floor = Aabb::from_center(Vec3::new(0.0, -0.5, 0.0), Vec3::new(5.0, 0.5, 5.0));
        assert!(a.intersects(&floor, 1e-3));
        let lifted = Aabb::from_center(Vec3::new(0.0, 1.01, 0.0), Vec3::splat(1.0));
        assert!(!lifted.intersects(&floor, 1e-3));
    }

    #[test]
    fn test_ray_hit_distance() {
        let b = Aabb::from_center(Vec3::new(0.0, 0.0, -5.0), Vec3::splat(1.0));
        let t = b.ray_hit(Vec3::ZERO, Vec3::NEG_Z, 10.0).unwrap();
        assert_abs_diff_eq!(t, 4.0, epsilon = 1e-5);
        assert!(b.ray_hit(Vec3::ZERO, Vec3::NEG_Z, 3.0).is_none());
        assert!(b.ray_hit(Vec3::ZERO, Vec3::Z, 10.0).is_none());
    }

    #[test]
    fn test_world_raycast_nearest_rigid() {
        let mut world = StaticWorld::new();
        world.add_collider(Collider::new(Vec3::new(0.0, 0.0, -8.0), Vec3::splat(1.0)));
        world.add_collider(Collider::new(Vec3::new(0.0, 0.0, -4.0), Vec3::splat(1.0)));
        world.add_collider(Collider::trigger(Vec3::new(0.0, 0.0, -2.0), Vec3::splat(0.5)));
        let t = world.raycast(Vec3::ZERO, Vec3::NEG_Z, 20.0).unwrap();
        assert_abs_diff_eq!(t, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_empty_world_raycast_is_inconclusive() {
        let world = StaticWorld::new();
        assert!(world.raycast(Vec3::ZERO, Vec3::X, 10.0).is_none());
        assert!(world.raycast(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::X, 10.0).is_none());
    }
}
