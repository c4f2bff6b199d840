//! Health bars floating above tanks
//!
//! Bars are separate entities rather than hull children so they stay level
//! while the hull rotates.

use bevy::prelude::*;

use crate::constants::*;
use crate::tank::{Health, Tank};
use crate::world::LevelEntity;

#[derive(Component)]
pub struct HealthBar {
    pub tank: Entity,
}

#[derive(Component)]
pub struct HealthBarFill;

/// Width and x offset of a left-anchored fill
pub fn fill_geometry(fraction: f32) -> (f32, f32) {
    let width = HEALTH_BAR_SIZE.x * fraction.clamp(0.0, 1.0);
    (width, (width - HEALTH_BAR_SIZE.x) / 2.0)
}

pub fn spawn_health_bars(mut commands: Commands, tanks: Query<(Entity, &Transform), Added<Tank>>) {
    for (tank, transform) in &tanks {
        let pos = transform.translation.truncate() + Vec2::Y * HEALTH_BAR_OFFSET;
        commands
            .spawn((
                Sprite::from_color(HEALTH_BAR_BG_COLOR, HEALTH_BAR_SIZE),
                Transform::from_xyz(pos.x, pos.y, 5.0),
                HealthBar { tank },
                LevelEntity,
            ))
            .with_children(|bar| {
                bar.spawn((
                    Sprite::from_color(HEALTH_BAR_COLOR, HEALTH_BAR_SIZE),
                    Transform::from_xyz(0.0, 0.0, 0.1),
                    HealthBarFill,
                ));
            });
    }
}

/// Follow the tank, resize the fill, and drop bars whose tank is gone
pub fn update_health_bars(
    mut commands: Commands,
    tanks: Query<(&Transform, &Health), With<Tank>>,
    mut bars: Query<(Entity, &HealthBar, &mut Transform, &Children), Without<Tank>>,
    mut fills: Query<(&mut Sprite, &mut Transform), (With<HealthBarFill>, Without<HealthBar>, Without<Tank>)>,
) {
    for (bar_entity, bar, mut bar_transform, children) in &mut bars {
        let Ok((tank_transform, health)) = tanks.get(bar.tank) else {
            commands.entity(bar_entity).despawn();
            continue;
        };
        let pos = tank_transform.translation.truncate() + Vec2::Y * HEALTH_BAR_OFFSET;
        bar_transform.translation.x = pos.x;
        bar_transform.translation.y = pos.y;

        let (width, offset) = fill_geometry(health.fraction());
        for child in children.iter() {
            if let Ok((mut sprite, mut transform)) = fills.get_mut(child) {
                sprite.custom_size = Some(Vec2::new(width, HEALTH_BAR_SIZE.y));
                transform.translation.x = offset;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_stays_left_anchored() {
        let (width, offset) = fill_geometry(1.0);
        assert_eq!(width, HEALTH_BAR_SIZE.x);
        assert_eq!(offset, 0.0);

        let (width, offset) = fill_geometry(0.5);
        assert_eq!(width, HEALTH_BAR_SIZE.x / 2.0);
        // Left edge unchanged
        assert!((offset - width / 2.0 + HEALTH_BAR_SIZE.x / 2.0).abs() < 1e-5);

        assert_eq!(fill_geometry(-1.0).0, 0.0);
    }
}
