//! Gameplay events
//!
//! Systems emit `TankEvent`s on the `EventBus`; `process_bus_events` drains
//! it once per frame into the log, the match stats and the recorder.

mod bus;
mod types;

pub use bus::{BusEvent, EventBus, update_event_bus_time};
pub use types::TankEvent;

use bevy::prelude::*;

use crate::match_state::MatchState;
use crate::recorder::Recorder;

/// Drain the bus and fan events out to their consumers
pub fn process_bus_events(
    mut bus: ResMut<EventBus>,
    mut match_state: ResMut<MatchState>,
    recorder: Option<ResMut<Recorder>>,
) {
    let events = bus.drain();
    if events.is_empty() {
        return;
    }
    let mut recorder = recorder;

    for BusEvent { time_ms, event } in &events {
        match event {
            TankEvent::Destroyed { tank, team, by } => match by {
                Some(attacker) => info!("[{}ms] {} tank {} destroyed by tank {}", time_ms, team, tank, attacker),
                None => info!("[{}ms] {} tank {} destroyed", time_ms, team, tank),
            },
            TankEvent::MatchEnd { winner, duration } => {
                info!("[{}ms] Match won by {} in {:.1}s", time_ms, winner, duration)
            }
            _ => debug!("[{}ms] {:?}", time_ms, event),
        }

        match_state.stats.record(event);

        if let Some(recorder) = recorder.as_mut() {
            recorder.record_event(event);
            if let TankEvent::MatchEnd { winner, .. } = event {
                recorder.finish(*winner);
            }
        }
    }
}
