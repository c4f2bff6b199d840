//! Bullets: spawning, lifetime and contact handling

use bevy::prelude::*;

use crate::constants::*;
use crate::effects::spawn_burst;
use crate::events::{EventBus, TankEvent};
use crate::helpers::{GameRng, heading_vector};
use crate::tank::{Health, HitFlash, Tank, TankId, Team, Velocity};
use crate::world::{LevelEntity, Wall, arena_inner_half};

#[derive(Component, Debug, Clone)]
#[require(Velocity)]
pub struct Bullet {
    pub owner: Entity,
    /// TankId of the shooter (survives the shooter being despawned)
    pub owner_id: u32,
    pub team: Team,
    pub damage: f32,
    pub lifetime: f32,
    pub radius: f32,
}

/// What a bullet touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Wall,
    Tank(Team),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Bullet stops, nothing is damaged
    Absorb,
    /// Bullet passes through
    Ignore,
    /// Bullet stops and damages what it hit
    Damage,
}

/// Tag switch deciding what a contact does
pub fn bullet_contact_outcome(bullet_team: Team, contact: Contact) -> ContactOutcome {
    match contact {
        Contact::Wall => ContactOutcome::Absorb,
        Contact::Tank(team) if team == bullet_team => ContactOutcome::Ignore,
        Contact::Tank(_) => ContactOutcome::Damage,
    }
}

pub struct BulletSpawn {
    pub owner: Entity,
    pub owner_id: u32,
    pub team: Team,
    pub position: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub damage: f32,
    pub lifetime: f32,
}

pub fn spawn_bullet(commands: &mut Commands, spawn: BulletSpawn) -> Entity {
    commands
        .spawn((
            Sprite::from_color(BULLET_COLOR, Vec2::splat(BULLET_RADIUS * 2.0)),
            Transform::from_xyz(spawn.position.x, spawn.position.y, 3.0)
                .with_rotation(Quat::from_rotation_z(spawn.angle)),
            Velocity(heading_vector(spawn.angle) * spawn.speed),
            Bullet {
                owner: spawn.owner,
                owner_id: spawn.owner_id,
                team: spawn.team,
                damage: spawn.damage,
                lifetime: spawn.lifetime,
                radius: BULLET_RADIUS,
            },
            LevelEntity,
        ))
        .id()
}

/// Expire old bullets and bullets that left the arena
pub fn tick_bullets(
    mut commands: Commands,
    time: Res<Time>,
    mut bullets: Query<(Entity, &mut Bullet, &Transform)>,
) {
    let dt = time.delta_secs();
    let bounds = arena_inner_half() + Vec2::splat(WALL_THICKNESS);
    for (entity, mut bullet, transform) in &mut bullets {
        bullet.lifetime -= dt;
        let pos = transform.translation.truncate();
        if bullet.lifetime <= 0.0 || pos.x.abs() > bounds.x || pos.y.abs() > bounds.y {
            commands.entity(entity).despawn();
        }
    }
}

/// Resolve bullet contacts against tanks, then walls
pub fn bullet_collisions(
    mut commands: Commands,
    mut bus: ResMut<EventBus>,
    mut rng: ResMut<GameRng>,
    bullets: Query<(Entity, &Bullet, &Transform)>,
    walls: Query<(&Transform, &Wall), Without<Bullet>>,
    mut tanks: Query<
        (&Transform, &Team, &TankId, &mut Health, &mut HitFlash),
        (With<Tank>, Without<Bullet>),
    >,
) {
    for (entity, bullet, transform) in &bullets {
        let pos = transform.translation.truncate();
        let mut stopped = false;

        for (tank_transform, team, id, mut health, mut flash) in &mut tanks {
            if health.is_dead() {
                continue;
            }
            let reach = TANK_RADIUS + bullet.radius;
            if tank_transform.translation.truncate().distance_squared(pos) > reach * reach {
                continue;
            }
            match bullet_contact_outcome(bullet.team, Contact::Tank(*team)) {
                ContactOutcome::Ignore => continue,
                ContactOutcome::Absorb => {}
                ContactOutcome::Damage => {
                    health.apply_damage(bullet.damage, Some(bullet.owner_id));
                    flash.0 = HIT_FLASH_DURATION;
                    bus.emit(TankEvent::Hit {
                        target: id.0,
                        shooter: bullet.owner_id,
                        damage: bullet.damage,
                        remaining: health.current,
                    });
                }
            }
            stopped = true;
            break;
        }

        if !stopped
            && walls.iter().any(|(wall_transform, wall)| {
                wall.aabb(wall_transform.translation.truncate())
                    .overlaps_circle(pos, bullet.radius)
            })
        {
            stopped = bullet_contact_outcome(bullet.team, Contact::Wall) != ContactOutcome::Ignore;
        }

        if stopped {
            spawn_burst(&mut commands, &mut rng.0, pos, SPARK_PARTICLES, SPARK_COLOR, PARTICLE_SPEED);
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_outcomes() {
        assert_eq!(
            bullet_contact_outcome(Team::Player, Contact::Wall),
            ContactOutcome::Absorb
        );
        assert_eq!(
            bullet_contact_outcome(Team::Player, Contact::Tank(Team::Player)),
            ContactOutcome::Ignore
        );
        assert_eq!(
            bullet_contact_outcome(Team::Enemy, Contact::Tank(Team::Enemy)),
            ContactOutcome::Ignore
        );
        assert_eq!(
            bullet_contact_outcome(Team::Enemy, Contact::Tank(Team::Player)),
            ContactOutcome::Damage
        );
    }
}
