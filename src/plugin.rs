//! Gameplay plugin shared by the windowed game, simulations and scenario tests
//!
//! Registers the fixed-step pipeline (AI → drive → cannon → integrate →
//! collide → combat → match outcome → recorder) and the per-frame level and
//! event plumbing. Input capture, HUD and replay live in the binaries.

use bevy::prelude::*;

use crate::ai::{AiProfileDatabase, ai_update, sync_ai_speed_scale};
use crate::combat::{bullet_collisions, collect_ammo, tick_ammo_crates, tick_bullets};
use crate::countdown::{MatchCountdown, not_in_countdown, update_countdown};
use crate::effects::update_particles;
use crate::events::{EventBus, process_bus_events, update_event_bus_time};
use crate::helpers::GameRng;
use crate::input::{PlayerInput, copy_player_input};
use crate::levels::{LevelDatabase, PlayerPilot};
use crate::match_state::{
    CurrentLevel, LevelLoadRequest, MatchState, check_match_outcome, load_level_on_request, match_playing,
};
use crate::recorder::{Recorder, record_frame, save_finished_recording};
use crate::replay::{ReplayMode, not_replay_active};
use crate::tank::{
    aim_cannon, apply_angular_velocity, apply_drive, apply_velocity, destroy_dead_tanks, fire_cannon,
    sync_cannon_params, sync_drive_params, sync_turret_sprites, tick_hit_flash,
};
use crate::tuning::TankTweaks;
use crate::world::{clamp_to_arena, resolve_tank_walls, separate_tanks};

/// Fixed simulation rate (Hz)
pub const FIXED_HZ: f64 = 60.0;

/// Ordering of the fixed-step pipeline
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameplaySet {
    Decide,
    Drive,
    Physics,
    Combat,
    Resolve,
    Record,
}

/// Everything needed to play a level. Resources already inserted by the
/// caller (databases, recorder, rng, countdown) are left alone. The fixed-step
/// pipeline stays idle while a replay is showing.
pub struct CoreGameplayPlugin;

impl Plugin for CoreGameplayPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(FIXED_HZ));

        if !app.world().contains_resource::<EventBus>() {
            app.insert_resource(EventBus::new());
        }
        if !app.world().contains_resource::<Recorder>() {
            app.insert_resource(Recorder::disabled());
        }
        if !app.world().contains_resource::<LevelDatabase>() {
            app.insert_resource(LevelDatabase::load_from_file(crate::constants::LEVELS_FILE));
        }
        app.init_resource::<AiProfileDatabase>()
            .init_resource::<TankTweaks>()
            .init_resource::<GameRng>()
            .init_resource::<PlayerPilot>()
            .init_resource::<PlayerInput>()
            .init_resource::<MatchCountdown>()
            .init_resource::<MatchState>()
            .init_resource::<CurrentLevel>()
            .init_resource::<LevelLoadRequest>()
            .init_resource::<ReplayMode>();

        app.configure_sets(
            FixedUpdate,
            (
                GameplaySet::Decide,
                GameplaySet::Drive,
                GameplaySet::Physics,
                GameplaySet::Combat,
                GameplaySet::Resolve,
                GameplaySet::Record,
            )
                .chain()
                .distributive_run_if(not_in_countdown)
                .distributive_run_if(not_replay_active),
        );

        app.add_systems(
            FixedUpdate,
            (
                ai_update.in_set(GameplaySet::Decide).run_if(match_playing),
                (
                    sync_drive_params,
                    sync_ai_speed_scale,
                    sync_cannon_params,
                    apply_drive,
                    aim_cannon,
                    fire_cannon.run_if(match_playing),
                )
                    .chain()
                    .in_set(GameplaySet::Drive),
                (
                    apply_velocity,
                    apply_angular_velocity,
                    resolve_tank_walls,
                    separate_tanks,
                    clamp_to_arena,
                )
                    .chain()
                    .in_set(GameplaySet::Physics),
                (
                    tick_bullets,
                    bullet_collisions,
                    collect_ammo,
                    tick_ammo_crates,
                )
                    .chain()
                    .in_set(GameplaySet::Combat),
                (
                    tick_hit_flash,
                    destroy_dead_tanks,
                    check_match_outcome,
                )
                    .chain()
                    .in_set(GameplaySet::Resolve),
                record_frame.in_set(GameplaySet::Record),
            ),
        );

        app.add_systems(
            Update,
            (
                update_event_bus_time,
                load_level_on_request,
                update_countdown,
                copy_player_input,
                sync_turret_sprites,
                update_particles,
                process_bus_events,
                save_finished_recording,
            )
                .chain(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::HeadlessAppBuilder;
    use crate::effects::Particle;
    use crate::tank::{Health, Tank, TankId, Team};

    #[test]
    fn test_level_loads_and_tanks_spawn() {
        let mut app = HeadlessAppBuilder::new()
            .with_level_db(LevelDatabase::default_levels())
            .with_level(0)
            .build();

        app.update();
        app.update();

        let world = app.world_mut();
        let mut tanks = world.query_filtered::<(&TankId, &Team, &Health), With<Tank>>();
        let spawned: Vec<_> = tanks.iter(world).map(|(id, team, _)| (id.0, *team)).collect();
        assert!(spawned.contains(&(0, Team::Player)));
        assert!(spawned.iter().any(|(_, team)| *team == Team::Enemy));
        assert_eq!(world.resource::<CurrentLevel>().0, 0);
    }

    #[test]
    fn test_replay_mode_idles_the_match() {
        let mut app = HeadlessAppBuilder::new().build();
        app.insert_resource(ReplayMode::new("replays.db".to_string(), None));
        for _ in 0..10 {
            app.update();
        }

        let world = app.world();
        assert!(
            world
                .resource::<EventBus>()
                .processed()
                .iter()
                .all(|e| e.event.kind() != "match_end")
        );
        assert!(!world.resource::<MatchState>().is_over());
    }

    #[test]
    fn test_particles_fade_during_countdown() {
        let mut app = HeadlessAppBuilder::new().build();
        {
            let mut countdown = app.world_mut().resource_mut::<MatchCountdown>();
            countdown.active = true;
            countdown.timer = 100.0;
        }
        let spark = app
            .world_mut()
            .spawn(Particle {
                lifetime: 0.1,
                max_lifetime: 0.1,
            })
            .id();

        for _ in 0..10 {
            app.update();
        }

        assert!(app.world().resource::<MatchCountdown>().active);
        assert!(app.world().get_entity(spark).is_err());
    }
}
