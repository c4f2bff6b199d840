//! World components for the arena and its walls

mod physics;

pub use physics::*;

use bevy::prelude::*;

use crate::constants::*;

/// Static axis-aligned obstacle
#[derive(Component, Debug, Clone, Copy)]
pub struct Wall {
    pub size: Vec2,
}

impl Wall {
    pub fn aabb(&self, center: Vec2) -> Aabb {
        Aabb::from_center_size(center, self.size)
    }
}

/// Everything spawned for the current level (despawned on level change)
#[derive(Component)]
pub struct LevelEntity;

// ============================================================================
// Arena spawning functions (shared between main game and test runner)
// ============================================================================

/// Spawn a single wall block
pub fn spawn_wall(commands: &mut Commands, center: Vec2, size: Vec2, color: Color) -> Entity {
    commands
        .spawn((
            Sprite::from_color(color, size),
            Transform::from_xyz(center.x, center.y, 0.0),
            Wall { size },
            LevelEntity,
        ))
        .id()
}

/// Spawn arena border walls (top, bottom, left, right)
pub fn spawn_arena_borders(commands: &mut Commands) {
    let half_w = ARENA_WIDTH / 2.0;
    let half_h = ARENA_HEIGHT / 2.0;
    let horizontal = Vec2::new(ARENA_WIDTH, WALL_THICKNESS);
    let vertical = Vec2::new(WALL_THICKNESS, ARENA_HEIGHT);

    let borders = [
        (Vec2::new(0.0, half_h - WALL_THICKNESS / 2.0), horizontal),
        (Vec2::new(0.0, -half_h + WALL_THICKNESS / 2.0), horizontal),
        (Vec2::new(-half_w + WALL_THICKNESS / 2.0, 0.0), vertical),
        (Vec2::new(half_w - WALL_THICKNESS / 2.0, 0.0), vertical),
    ];
    for (center, size) in borders {
        spawn_wall(commands, center, size, BORDER_COLOR);
    }
}
