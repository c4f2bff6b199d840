//! AI Simulation Tool - headless matches for AI tuning
//!
//! An AI profile pilots the player tank against each level's enemies
//! without rendering, and the results are written as JSON.
//!
//! Usage:
//!   cargo run --bin simulate -- --help
//!   cargo run --bin simulate -- --level Duel --profile Balanced --matches 10
//!   cargo run --bin simulate -- --sweep 5 --parallel 8 --output sweep.json

use tankbattle::simulation::{SimConfig, run_simulation};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let Some(config) = SimConfig::from_args(&args) else {
        return;
    };
    if let Err(e) = run_simulation(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
