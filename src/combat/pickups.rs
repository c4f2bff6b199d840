//! Ammo crates

use bevy::prelude::*;

use crate::constants::*;
use crate::events::{EventBus, TankEvent};
use crate::tank::{Ammo, Tank, TankId};
use crate::world::{Aabb, LevelEntity};

#[derive(Component, Debug, Clone)]
pub struct AmmoCrate {
    pub amount: u32,
    /// Seconds until the crate reappears; 0 while active
    pub respawn_timer: f32,
}

impl AmmoCrate {
    pub fn new(amount: u32) -> Self {
        Self {
            amount,
            respawn_timer: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.respawn_timer <= 0.0
    }

    /// Hand ammo to a tank. Full tanks leave the crate alone.
    pub fn try_collect(&mut self, ammo: &mut Ammo) -> Option<u32> {
        if !self.is_active() || ammo.is_full() {
            return None;
        }
        let added = ammo.refill(self.amount);
        self.respawn_timer = AMMO_RESPAWN_TIME;
        Some(added)
    }
}

pub fn spawn_ammo_crate(commands: &mut Commands, pos: Vec2, amount: u32) -> Entity {
    commands
        .spawn((
            Sprite::from_color(AMMO_CRATE_COLOR, AMMO_CRATE_SIZE),
            Transform::from_xyz(pos.x, pos.y, 1.0),
            AmmoCrate::new(amount),
            LevelEntity,
        ))
        .id()
}

/// Tanks driving over an active crate pick it up
pub fn collect_ammo(
    mut bus: ResMut<EventBus>,
    mut crates: Query<(&Transform, &mut AmmoCrate, Option<&mut Visibility>), Without<Tank>>,
    mut tanks: Query<(&Transform, &TankId, &mut Ammo), With<Tank>>,
) {
    for (crate_transform, mut ammo_crate, visibility) in &mut crates {
        if !ammo_crate.is_active() {
            continue;
        }
        let bounds = Aabb::from_center_size(crate_transform.translation.truncate(), AMMO_CRATE_SIZE);
        for (tank_transform, id, mut ammo) in &mut tanks {
            if !bounds.overlaps_circle(tank_transform.translation.truncate(), TANK_RADIUS) {
                continue;
            }
            if let Some(added) = ammo_crate.try_collect(&mut ammo) {
                bus.emit(TankEvent::AmmoPickup {
                    tank: id.0,
                    amount: added,
                });
                break;
            }
        }
        if let Some(mut visibility) = visibility {
            if !ammo_crate.is_active() {
                *visibility = Visibility::Hidden;
            }
        }
    }
}

/// Bring picked-up crates back after their timer runs out
pub fn tick_ammo_crates(
    time: Res<Time>,
    mut crates: Query<(&mut AmmoCrate, Option<&mut Visibility>)>,
) {
    let dt = time.delta_secs();
    for (mut ammo_crate, visibility) in &mut crates {
        if ammo_crate.is_active() {
            continue;
        }
        ammo_crate.respawn_timer = (ammo_crate.respawn_timer - dt).max(0.0);
        if let Some(mut visibility) = visibility {
            if ammo_crate.is_active() {
                *visibility = Visibility::Inherited;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_caps_at_max_and_starts_respawn() {
        let mut ammo_crate = AmmoCrate::new(10);
        let mut ammo = Ammo::new(35, 40);

        assert_eq!(ammo_crate.try_collect(&mut ammo), Some(5));
        assert_eq!(ammo.current, 40);
        assert!(!ammo_crate.is_active());

        // Inactive crate gives nothing
        let mut other = Ammo::new(0, 40);
        assert_eq!(ammo_crate.try_collect(&mut other), None);
        assert_eq!(other.current, 0);
    }

    #[test]
    fn test_full_tank_leaves_crate() {
        let mut ammo_crate = AmmoCrate::new(10);
        let mut ammo = Ammo::new(40, 40);
        assert_eq!(ammo_crate.try_collect(&mut ammo), None);
        assert!(ammo_crate.is_active());
    }

    #[test]
    fn test_crate_hides_and_respawns() {
        use std::time::Duration;

        let mut app = App::new();
        app.insert_resource(Time::<()>::default());
        app.insert_resource(EventBus::new());
        app.add_systems(Update, (collect_ammo, tick_ammo_crates).chain());

        let ammo_crate = app
            .world_mut()
            .spawn((Transform::default(), AmmoCrate::new(10), Visibility::Inherited))
            .id();
        let tank = app
            .world_mut()
            .spawn((Tank, TankId(0), Transform::default(), Ammo::new(0, 40)))
            .id();

        app.update();
        assert_eq!(app.world().get::<Ammo>(tank).map(|a| a.current), Some(10));
        assert_eq!(app.world().get::<Visibility>(ammo_crate), Some(&Visibility::Hidden));
        assert_eq!(app.world_mut().resource_mut::<EventBus>().drain().len(), 1);

        // Drive away and wait most of the respawn time
        app.world_mut().entity_mut(tank).insert(Transform::from_xyz(500.0, 0.0, 0.0));
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(AMMO_RESPAWN_TIME - 1.0));
        app.update();
        assert_eq!(app.world().get::<Visibility>(ammo_crate), Some(&Visibility::Hidden));

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(1.5));
        app.update();
        let respawned = app.world().get::<AmmoCrate>(ammo_crate).map(|c| c.is_active());
        assert_eq!(respawned, Some(true));
        assert_eq!(app.world().get::<Visibility>(ammo_crate), Some(&Visibility::Inherited));
    }
}
