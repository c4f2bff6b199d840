//! Cannon aiming and firing

use bevy::prelude::*;

use crate::combat::{BulletSpawn, spawn_bullet};
use crate::constants::*;
use crate::effects::spawn_burst;
use crate::events::{EventBus, TankEvent};
use crate::helpers::{GameRng, heading_angle, heading_vector, rotate_toward};
use crate::tank::components::*;
use crate::tuning::TankTweaks;

/// Turret state. The angle is world-space so the turret keeps pointing at
/// its target while the hull turns underneath it.
#[derive(Component, Debug, Clone)]
pub struct Cannon {
    pub angle: f32,
    pub turn_speed: f32,
    /// Seconds until the next shot is allowed
    pub cooldown: f32,
    pub fire_interval: f32,
}

impl Cannon {
    pub fn new(angle: f32, turn_speed: f32, fire_interval: f32) -> Self {
        Self {
            angle,
            turn_speed,
            cooldown: 0.0,
            fire_interval,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }
}

/// Where bullets leave the barrel
pub fn muzzle_position(hull: Vec2, cannon_angle: f32) -> Vec2 {
    hull + heading_vector(cannon_angle) * BARREL_LENGTH
}

/// Angle the cannon should turn toward, or None to hold
pub fn cannon_target(aim: AimInput, current: f32, origin: Vec2, max_step: f32) -> Option<f32> {
    match aim {
        AimInput::Hold => None,
        AimInput::Direction(dir) => {
            (dir.length_squared() > INPUT_EPSILON).then(|| heading_angle(dir))
        }
        AimInput::Point(point) => {
            let dir = point - origin;
            (dir.length_squared() > 1.0).then(|| heading_angle(dir))
        }
        AimInput::Rotate(rate) => {
            let rate = rate.clamp(-1.0, 1.0);
            (rate.abs() > INPUT_EPSILON).then(|| current + rate * max_step)
        }
    }
}

/// Count down the cooldown and decide whether a round leaves the barrel.
/// Consumes ammo on success; an empty tank never fires.
pub fn try_fire(cannon: &mut Cannon, ammo: &mut Ammo, fire_held: bool, dt: f32) -> bool {
    cannon.cooldown = (cannon.cooldown - dt).max(0.0);
    if !fire_held || !cannon.is_ready() {
        return false;
    }
    if !ammo.consume() {
        return false;
    }
    cannon.cooldown = cannon.fire_interval;
    true
}

/// Push tuning changes into every cannon
pub fn sync_cannon_params(tweaks: Res<TankTweaks>, mut cannons: Query<&mut Cannon>) {
    if !tweaks.is_changed() {
        return;
    }
    for mut cannon in &mut cannons {
        cannon.turn_speed = tweaks.cannon_turn_speed;
        cannon.fire_interval = tweaks.fire_interval;
    }
}

/// Rotate cannons toward their aim input (rate-limited, shortest arc)
pub fn aim_cannon(time: Res<Time>, mut tanks: Query<(&Transform, &TankInput, &mut Cannon), With<Tank>>) {
    let dt = time.delta_secs();
    for (transform, input, mut cannon) in &mut tanks {
        let max_step = cannon.turn_speed * dt;
        let origin = transform.translation.truncate();
        if let Some(target) = cannon_target(input.aim, cannon.angle, origin, max_step) {
            cannon.angle = rotate_toward(cannon.angle, target, max_step);
        }
    }
}

/// Fire bullets for every tank holding the trigger
pub fn fire_cannon(
    mut commands: Commands,
    time: Res<Time>,
    tweaks: Res<TankTweaks>,
    mut bus: ResMut<EventBus>,
    mut rng: ResMut<GameRng>,
    mut tanks: Query<
        (
            Entity,
            &Transform,
            &TankInput,
            &TankId,
            &Team,
            &mut Cannon,
            &mut Ammo,
        ),
        With<Tank>,
    >,
) {
    let dt = time.delta_secs();
    for (entity, transform, input, id, team, mut cannon, mut ammo) in &mut tanks {
        if !try_fire(&mut cannon, &mut ammo, input.fire_held, dt) {
            continue;
        }

        let muzzle = muzzle_position(transform.translation.truncate(), cannon.angle);
        spawn_bullet(
            &mut commands,
            BulletSpawn {
                owner: entity,
                owner_id: id.0,
                team: *team,
                position: muzzle,
                angle: cannon.angle,
                speed: tweaks.bullet_speed,
                damage: tweaks.bullet_damage,
                lifetime: tweaks.bullet_lifetime,
            },
        );
        spawn_burst(
            &mut commands,
            &mut rng.0,
            muzzle,
            MUZZLE_PARTICLES,
            BULLET_COLOR,
            PARTICLE_SPEED * 0.5,
        );
        bus.emit(TankEvent::Fired {
            tank: id.0,
            team: *team,
            pos: (muzzle.x, muzzle.y),
            angle: cannon.angle,
            ammo_left: ammo.current,
        });
    }
}

/// Keep turret children pointing along the cannon (relative to the hull)
pub fn sync_turret_sprites(
    hulls: Query<(&Cannon, &Heading)>,
    mut turrets: Query<(&ChildOf, &mut Transform), With<TurretSprite>>,
) {
    for (child_of, mut transform) in &mut turrets {
        if let Ok((cannon, heading)) = hulls.get(child_of.parent()) {
            transform.rotation = Quat::from_rotation_z(cannon.angle - heading.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_fire_respects_cooldown_and_ammo() {
        let mut cannon = Cannon::new(0.0, CANNON_TURN_SPEED, 0.5);
        let mut ammo = Ammo::new(2, 10);

        assert!(try_fire(&mut cannon, &mut ammo, true, 0.016));
        assert_eq!(ammo.current, 1);

        // Still cooling down
        assert!(!try_fire(&mut cannon, &mut ammo, true, 0.1));
        assert_eq!(ammo.current, 1);

        assert!(try_fire(&mut cannon, &mut ammo, true, 0.5));
        assert_eq!(ammo.current, 0);

        // Empty: nothing happens even when ready
        assert!(!try_fire(&mut cannon, &mut ammo, true, 1.0));
        assert_eq!(ammo.current, 0);
    }

    #[test]
    fn test_trigger_released_does_not_fire() {
        let mut cannon = Cannon::new(0.0, CANNON_TURN_SPEED, 0.5);
        let mut ammo = Ammo::new(5, 10);
        assert!(!try_fire(&mut cannon, &mut ammo, false, 0.016));
        assert_eq!(ammo.current, 5);
    }

    #[test]
    fn test_cannon_target_modes() {
        let origin = Vec2::new(100.0, 100.0);
        assert_eq!(cannon_target(AimInput::Hold, 0.3, origin, 0.1), None);

        let left = cannon_target(AimInput::Direction(Vec2::NEG_X), 0.0, origin, 0.1).unwrap();
        assert!((left - FRAC_PI_2).abs() < 1e-5);

        let up = cannon_target(AimInput::Point(Vec2::new(100.0, 300.0)), 0.0, origin, 0.1).unwrap();
        assert!(up.abs() < 1e-5);

        let spun = cannon_target(AimInput::Rotate(-1.0), 1.0, origin, 0.1).unwrap();
        assert!((spun - 0.9).abs() < 1e-5);

        // Aiming at our own position has no direction
        assert_eq!(cannon_target(AimInput::Point(origin), 0.0, origin, 0.1), None);
    }

    #[test]
    fn test_muzzle_is_ahead_of_barrel() {
        let muzzle = muzzle_position(Vec2::ZERO, 0.0);
        assert!((muzzle - Vec2::new(0.0, BARREL_LENGTH)).length() < 1e-4);
    }
}
