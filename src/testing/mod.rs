//! Scenario testing system for deterministic game testing
//!
//! Scenarios are TOML files that script the player tank's input frame by
//! frame and then check tank state and the event sequence. They run
//! headless through the same gameplay plugin as the game.

pub mod assertions;
pub mod input;
pub mod parser;
pub mod runner;

pub use assertions::{AssertionError, CapturedEvent, TankState, WorldState, check_counts, check_sequence, check_state};
pub use input::ScriptedInputs;
pub use parser::{
    ExpectedCount, ExpectedEvent, FrameInput, StateAssertion, TestDefinition, TestExpectations, TestSetup,
    parse_test_file,
};
pub use runner::{TestResult, run_test};

/// Default path for test scenarios
pub const SCENARIOS_DIR: &str = "tests/scenarios";

/// Levels used only by scenarios
pub const TEST_LEVELS_FILE: &str = "config/test_levels.txt";
