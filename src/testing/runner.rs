//! Test execution engine

use bevy::prelude::*;
use std::collections::BTreeMap;
use std::fs;

use crate::ai::AiController;
use crate::combat::Bullet;
use crate::constants::LEVELS_FILE;
use crate::events::EventBus;
use crate::helpers::wrap_angle;
use crate::input::PlayerInput;
use crate::levels::LevelDatabase;
use crate::match_state::MatchState;
use crate::simulation::HeadlessAppBuilder;
use crate::tank::{Ammo, Cannon, Heading, Health, Tank, TankId, Velocity};

use super::TEST_LEVELS_FILE;
use super::assertions::{AssertionError, CapturedEvent, TankState, WorldState, check_counts, check_sequence, check_state};
use super::input::ScriptedInputs;
use super::parser::TestDefinition;

/// Frames run when a scenario gives no input, checks or frame count
const DEFAULT_FRAMES: u64 = 60;

/// Result of running a test
#[derive(Debug)]
pub enum TestResult {
    Pass { frames: u64 },
    Fail { error: AssertionError },
    Error { message: String },
}

/// Find a level by name in the test levels, then the game levels
fn find_level(name: &str) -> Result<(LevelDatabase, usize), String> {
    let mut available = Vec::new();

    // A missing test levels file is fine; parse() would otherwise hand back the defaults
    if let Ok(content) = fs::read_to_string(TEST_LEVELS_FILE) {
        let db = LevelDatabase::parse(&content);
        if let Some(index) = db.index_of(name) {
            return Ok((db, index));
        }
        available.extend(db.levels.iter().map(|l| l.name.clone()));
    }

    let db = LevelDatabase::load_from_file(LEVELS_FILE);
    if let Some(index) = db.index_of(name) {
        return Ok((db, index));
    }
    available.extend(db.levels.iter().map(|l| l.name.clone()));
    Err(format!("Level '{}' not found. Available: {:?}", name, available))
}

fn snapshot(world: &mut World) -> WorldState {
    let mut query = world.query_filtered::<(&TankId, &Transform, &Heading, &Cannon, &Velocity, &Health, &Ammo), With<Tank>>();
    let tanks: BTreeMap<String, TankState> = query
        .iter(world)
        .map(|(id, transform, heading, cannon, velocity, health, ammo)| {
            (
                WorldState::tank_key(id.0),
                TankState {
                    x: transform.translation.x,
                    y: transform.translation.y,
                    heading: wrap_angle(heading.0).to_degrees(),
                    cannon: wrap_angle(cannon.angle).to_degrees(),
                    speed: velocity.0.length(),
                    health: health.current,
                    ammo: ammo.current,
                },
            )
        })
        .collect();
    let bullets = world.query_filtered::<(), With<Bullet>>().iter(world).count() as u32;

    WorldState {
        tanks,
        phase: world.resource::<MatchState>().phase,
        bullets,
    }
}

/// Run a single test and return the result.
///
/// Every `app.update()` after the first advances exactly one fixed step.
/// Input scripted for frame N drives step N+1; events and checks use the
/// number of completed steps as their frame.
pub fn run_test(test: &TestDefinition) -> TestResult {
    let (level_db, level_index) = match find_level(&test.setup.level) {
        Ok(found) => found,
        Err(message) => return TestResult::Error { message },
    };

    let mut scripted = ScriptedInputs::from_inputs(&test.input);
    for state in &test.expect.state {
        scripted.set_max_frame(state.after_frame);
    }
    scripted.set_max_frame(test.setup.frames);
    if scripted.max_frame == 0 {
        scripted.max_frame = DEFAULT_FRAMES;
    }

    let mut app = HeadlessAppBuilder::new()
        .with_level_db(level_db)
        .with_level(level_index)
        .with_seed(test.setup.seed.unwrap_or(0))
        .build();

    // Level spawns on the first update; no time passes yet
    scripted.apply(0, &mut app.world_mut().resource_mut::<PlayerInput>());
    app.update();

    if test.setup.idle_enemies {
        let world = app.world_mut();
        let controlled: Vec<Entity> = world
            .query_filtered::<Entity, With<AiController>>()
            .iter(world)
            .collect();
        for entity in controlled {
            world.entity_mut(entity).remove::<AiController>();
        }
    }

    let mut state_checks = test.expect.state.clone();
    state_checks.sort_by_key(|s| s.after_frame);
    let mut next_check = 0;
    let mut captured = Vec::new();
    let mut cursor = 0;

    for frame in 1..=scripted.max_frame {
        scripted.apply(frame, &mut app.world_mut().resource_mut::<PlayerInput>());
        app.update();

        let (new_events, next) = app.world().resource::<EventBus>().processed_since(cursor);
        captured.extend(new_events.iter().map(|e| CapturedEvent::new(frame, &e.event)));
        cursor = next;

        while next_check < state_checks.len() && state_checks[next_check].after_frame <= frame {
            let state = snapshot(app.world_mut());
            if let Err(error) = check_state(&state_checks[next_check], &state) {
                return TestResult::Fail {
                    error: AssertionError {
                        message: format!("[frame {}] {}", frame, error.message),
                        ..error
                    },
                };
            }
            next_check += 1;
        }
    }

    if let Err(error) = check_sequence(&test.expect.sequence, &captured) {
        return TestResult::Fail { error };
    }
    if let Err(error) = check_counts(&test.expect.count, &captured) {
        return TestResult::Fail { error };
    }

    TestResult::Pass {
        frames: scripted.max_frame,
    }
}
