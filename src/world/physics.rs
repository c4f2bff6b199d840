//! Arena geometry: boxes, circle push-out and ray casts, plus the
//! collision systems that keep tanks out of walls and each other.

use bevy::prelude::*;

use crate::constants::*;
use crate::tank::{Tank, Velocity};
use crate::world::Wall;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        center.clamp(self.min, self.max).distance_squared(center) <= radius * radius
    }
}

/// Minimum translation that moves a circle out of a box, or None if they
/// don't overlap. A centre inside the box exits through the nearest face.
pub fn circle_aabb_push(center: Vec2, radius: f32, aabb: &Aabb) -> Option<Vec2> {
    if aabb.contains(center) {
        let to_left = center.x - aabb.min.x;
        let to_right = aabb.max.x - center.x;
        let to_bottom = center.y - aabb.min.y;
        let to_top = aabb.max.y - center.y;
        let min = to_left.min(to_right).min(to_bottom).min(to_top);
        let push = if min == to_left {
            Vec2::new(-(to_left + radius), 0.0)
        } else if min == to_right {
            Vec2::new(to_right + radius, 0.0)
        } else if min == to_bottom {
            Vec2::new(0.0, -(to_bottom + radius))
        } else {
            Vec2::new(0.0, to_top + radius)
        };
        return Some(push);
    }

    let closest = center.clamp(aabb.min, aabb.max);
    let offset = center - closest;
    let distance = offset.length();
    if distance >= radius || distance <= f32::EPSILON {
        return None;
    }
    Some(offset / distance * (radius - distance))
}

/// Slab test. `dir` must be normalised; returns the entry distance along the
/// ray if the box is hit within `max_dist` (0 when starting inside).
pub fn ray_aabb(origin: Vec2, dir: Vec2, max_dist: f32, aabb: &Aabb) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = max_dist;

    for axis in 0..2 {
        let o = origin[axis];
        let d = dir[axis];
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
        if d.abs() < 1e-8 {
            // Parallel to this slab: must already be between its planes
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t1 = (lo - o) * inv;
        let mut t2 = (hi - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}

/// Nearest wall hit along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec2,
}

pub fn raycast_walls(
    origin: Vec2,
    dir: Vec2,
    max_dist: f32,
    walls: impl IntoIterator<Item = Aabb>,
) -> Option<RayHit> {
    walls
        .into_iter()
        .filter_map(|aabb| ray_aabb(origin, dir, max_dist, &aabb))
        .min_by(|a, b| a.total_cmp(b))
        .map(|distance| RayHit {
            distance,
            point: origin + dir * distance,
        })
}

/// True when no wall blocks the straight line between two points
pub fn line_of_sight(from: Vec2, to: Vec2, walls: impl IntoIterator<Item = Aabb>) -> bool {
    let delta = to - from;
    let distance = delta.length();
    if distance <= f32::EPSILON {
        return true;
    }
    raycast_walls(from, delta / distance, distance, walls).is_none()
}

/// Collect wall boxes for ray casts and AI
pub fn wall_boxes<'a>(walls: impl IntoIterator<Item = (&'a Transform, &'a Wall)>) -> Vec<Aabb> {
    walls
        .into_iter()
        .map(|(transform, wall)| wall.aabb(transform.translation.truncate()))
        .collect()
}

/// Push tanks out of walls and drop the velocity component driving into them
pub fn resolve_tank_walls(
    mut tanks: Query<(&mut Transform, &mut Velocity), (With<Tank>, Without<Wall>)>,
    walls: Query<(&Transform, &Wall), Without<Tank>>,
) {
    let boxes = wall_boxes(&walls);
    for (mut transform, mut velocity) in &mut tanks {
        for aabb in &boxes {
            let center = transform.translation.truncate();
            let Some(push) = circle_aabb_push(center, TANK_RADIUS, aabb) else {
                continue;
            };
            transform.translation.x += push.x;
            transform.translation.y += push.y;

            let normal = push.normalize_or_zero();
            let into_wall = velocity.0.dot(normal);
            if into_wall < 0.0 {
                velocity.0 -= normal * into_wall;
            }
        }
    }
}

/// Separate overlapping tanks, each moving half the overlap
pub fn separate_tanks(mut tanks: Query<&mut Transform, With<Tank>>) {
    let mut pairs = tanks.iter_combinations_mut();
    while let Some([mut a, mut b]) = pairs.fetch_next() {
        let offset = a.translation.truncate() - b.translation.truncate();
        let distance = offset.length();
        let overlap = TANK_RADIUS * 2.0 - distance;
        if overlap <= 0.0 {
            continue;
        }
        let normal = if distance > f32::EPSILON { offset / distance } else { Vec2::X };
        let push = normal * (overlap * 0.5);
        a.translation.x += push.x;
        a.translation.y += push.y;
        b.translation.x -= push.x;
        b.translation.y -= push.y;
    }
}

/// Keep tanks inside the playable area even if they tunnel through a border
pub fn clamp_to_arena(mut tanks: Query<&mut Transform, With<Tank>>) {
    let limit = arena_inner_half() - Vec2::splat(TANK_RADIUS);
    for mut transform in &mut tanks {
        transform.translation.x = transform.translation.x.clamp(-limit.x, limit.x);
        transform.translation.y = transform.translation.y.clamp(-limit.y, limit.y);
    }
}

/// Half extents of the area inside the border walls
pub fn arena_inner_half() -> Vec2 {
    Vec2::new(
        ARENA_WIDTH / 2.0 - WALL_THICKNESS,
        ARENA_HEIGHT / 2.0 - WALL_THICKNESS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_center_size(Vec2::ZERO, Vec2::new(100.0, 100.0))
    }

    #[test]
    fn test_circle_push_from_outside() {
        let push = circle_aabb_push(Vec2::new(60.0, 0.0), 20.0, &unit_box()).unwrap();
        assert!((push - Vec2::new(10.0, 0.0)).length() < 1e-4);

        assert!(circle_aabb_push(Vec2::new(80.0, 0.0), 20.0, &unit_box()).is_none());
    }

    #[test]
    fn test_circle_push_from_inside_uses_nearest_face() {
        let push = circle_aabb_push(Vec2::new(0.0, 45.0), 10.0, &unit_box()).unwrap();
        assert!((push - Vec2::new(0.0, 15.0)).length() < 1e-4);
    }

    #[test]
    fn test_ray_aabb_hits_and_misses() {
        let aabb = unit_box();
        let hit = ray_aabb(Vec2::new(-200.0, 0.0), Vec2::X, 500.0, &aabb).unwrap();
        assert!((hit - 150.0).abs() < 1e-4);

        // Too short
        assert!(ray_aabb(Vec2::new(-200.0, 0.0), Vec2::X, 100.0, &aabb).is_none());
        // Parallel and outside
        assert!(ray_aabb(Vec2::new(-200.0, 80.0), Vec2::X, 500.0, &aabb).is_none());
        // Pointing away
        assert!(ray_aabb(Vec2::new(-200.0, 0.0), Vec2::NEG_X, 500.0, &aabb).is_none());
        // Starting inside
        assert_eq!(ray_aabb(Vec2::ZERO, Vec2::Y, 10.0, &aabb), Some(0.0));
    }

    #[test]
    fn test_raycast_returns_nearest() {
        let near = Aabb::from_center_size(Vec2::new(100.0, 0.0), Vec2::splat(20.0));
        let far = Aabb::from_center_size(Vec2::new(300.0, 0.0), Vec2::splat(20.0));
        let hit = raycast_walls(Vec2::ZERO, Vec2::X, 1000.0, [far, near]).unwrap();
        assert!((hit.distance - 90.0).abs() < 1e-4);
        assert!((hit.point - Vec2::new(90.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_line_of_sight() {
        let wall = Aabb::from_center_size(Vec2::ZERO, Vec2::new(20.0, 200.0));
        assert!(!line_of_sight(Vec2::new(-100.0, 0.0), Vec2::new(100.0, 0.0), [wall]));
        assert!(line_of_sight(Vec2::new(-100.0, 150.0), Vec2::new(100.0, 150.0), [wall]));
        // Target in front of the wall
        assert!(line_of_sight(Vec2::new(-100.0, 0.0), Vec2::new(-50.0, 0.0), [wall]));
        assert!(line_of_sight(Vec2::ONE, Vec2::ONE, [wall]));
    }
}
