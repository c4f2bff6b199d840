//! Particle effects - muzzle flashes, sparks and explosions

use bevy::prelude::*;
use rand::Rng;

use crate::constants::*;
use crate::tank::Velocity;
use crate::world::LevelEntity;

/// Short-lived square that drifts, slows and fades
#[derive(Component)]
#[require(Velocity)]
pub struct Particle {
    pub lifetime: f32,
    pub max_lifetime: f32,
}

/// Spawn `count` particles flying out from `pos` in random directions.
/// They belong to the level so a reload clears them.
pub fn spawn_burst(
    commands: &mut Commands,
    rng: &mut impl Rng,
    pos: Vec2,
    count: usize,
    color: Color,
    speed: f32,
) {
    for _ in 0..count {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let speed = speed * rng.gen_range(0.4..1.0);
        let lifetime = PARTICLE_LIFETIME * rng.gen_range(0.6..1.0);
        commands.spawn((
            Sprite::from_color(color, Vec2::splat(PARTICLE_SIZE)),
            Transform::from_xyz(pos.x, pos.y, 5.0),
            Velocity(Vec2::from_angle(angle) * speed),
            Particle {
                lifetime,
                max_lifetime: lifetime,
            },
            LevelEntity,
        ));
    }
}

/// Age particles, apply drag and fade them out. Runs every frame, countdown
/// or not.
pub fn update_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut particles: Query<(Entity, &mut Particle, &mut Velocity, Option<&mut Sprite>)>,
) {
    let dt = time.delta_secs();
    let drag = PARTICLE_DRAG.powf(dt);
    for (entity, mut particle, mut velocity, sprite) in &mut particles {
        particle.lifetime -= dt;
        if particle.lifetime <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }
        velocity.0 *= drag;
        if let Some(mut sprite) = sprite {
            let alpha = particle.lifetime / particle.max_lifetime;
            sprite.color = sprite.color.with_alpha(alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn burst(mut commands: Commands) {
        let mut rng = StdRng::seed_from_u64(4);
        spawn_burst(&mut commands, &mut rng, Vec2::ZERO, 6, Color::WHITE, 100.0);
    }

    #[test]
    fn test_burst_belongs_to_level_and_fades_out() {
        let mut app = App::new();
        app.insert_resource(Time::<()>::default());
        app.add_systems(Startup, burst);
        app.add_systems(Update, update_particles);

        app.update();
        let world = app.world_mut();
        let tagged = world
            .query_filtered::<&Particle, With<LevelEntity>>()
            .iter(world)
            .count();
        assert_eq!(tagged, 6);

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(PARTICLE_LIFETIME * 0.5));
        app.update();
        let world = app.world_mut();
        for (particle, velocity) in world.query::<(&Particle, &Velocity)>().iter(world) {
            assert!(particle.lifetime < particle.max_lifetime);
            assert!(velocity.0.length() < 100.0);
        }

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(PARTICLE_LIFETIME));
        app.update();
        let world = app.world_mut();
        assert_eq!(world.query::<&Particle>().iter(world).count(), 0);
    }
}
