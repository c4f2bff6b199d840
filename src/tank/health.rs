//! Hull health, hit flashes and destruction

use bevy::prelude::*;

use crate::constants::*;
use crate::effects::spawn_burst;
use crate::events::{EventBus, TankEvent};
use crate::helpers::GameRng;
use crate::tank::components::*;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    /// TankId of whoever dealt the last damage
    pub last_attacker: Option<u32>,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            last_attacker: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Subtract damage, clamped at zero. Returns true only on the hit that kills.
    pub fn apply_damage(&mut self, amount: f32, attacker: Option<u32>) -> bool {
        if self.is_dead() {
            return false;
        }
        self.current = (self.current - amount.max(0.0)).max(0.0);
        if attacker.is_some() {
            self.last_attacker = attacker;
        }
        self.is_dead()
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }
}

/// Count down hit flashes and tint hull sprites while they run
pub fn tick_hit_flash(
    time: Res<Time>,
    mut tanks: Query<(&mut HitFlash, &TankColor, Option<&mut Sprite>), With<Tank>>,
) {
    let dt = time.delta_secs();
    for (mut flash, base, sprite) in &mut tanks {
        if flash.0 > 0.0 {
            flash.0 = (flash.0 - dt).max(0.0);
        }
        if let Some(mut sprite) = sprite {
            sprite.color = if flash.0 > 0.0 { HIT_FLASH_COLOR } else { base.0 };
        }
    }
}

/// Despawn tanks at zero health, leaving an explosion behind
pub fn destroy_dead_tanks(
    mut commands: Commands,
    mut bus: ResMut<EventBus>,
    mut rng: ResMut<GameRng>,
    tanks: Query<(Entity, &Health, &TankId, &Team, &Transform), With<Tank>>,
) {
    for (entity, health, id, team, transform) in &tanks {
        if !health.is_dead() {
            continue;
        }
        let pos = transform.translation.truncate();
        info!("Tank {} ({}) destroyed", id.0, team);
        bus.emit(TankEvent::Destroyed {
            tank: id.0,
            team: *team,
            by: health.last_attacker,
        });
        spawn_burst(
            &mut commands,
            &mut rng.0,
            pos,
            EXPLOSION_PARTICLES,
            EXPLOSION_COLOR,
            PARTICLE_SPEED,
        );
        commands.entity(entity).despawn();
    }
}
