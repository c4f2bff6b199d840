//! Event bus resource
//!
//! Events are stamped with the app clock on `emit` and sit in `pending`
//! until `process_bus_events` drains them. Drained events stay in the
//! history until the next level load so headless runs can inspect the
//! whole match afterwards.

use bevy::prelude::*;

use super::types::TankEvent;

#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    /// App clock when the event was emitted (ms)
    pub time_ms: u32,
    pub event: TankEvent,
}

#[derive(Resource, Default)]
pub struct EventBus {
    pending: Vec<BusEvent>,
    history: Vec<BusEvent>,
    /// Events dropped from the front of the history by `clear_history`
    cleared: usize,
    now_ms: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_clock(&mut self, elapsed_secs: f32) {
        self.now_ms = (elapsed_secs * 1000.0) as u32;
    }

    pub fn emit(&mut self, event: TankEvent) {
        self.pending.push(BusEvent {
            time_ms: self.now_ms,
            event,
        });
    }

    /// Take this frame's events; they are also appended to the history
    pub fn drain(&mut self) -> Vec<BusEvent> {
        let events = std::mem::take(&mut self.pending);
        self.history.extend_from_slice(&events);
        events
    }

    /// Every drained event, oldest first
    pub fn processed(&self) -> &[BusEvent] {
        &self.history
    }

    /// Drained events from `cursor` on, plus the cursor for the next call.
    /// Cursors count every event ever drained, so they survive `clear_history`.
    pub fn processed_since(&self, cursor: usize) -> (&[BusEvent], usize) {
        let start = cursor.saturating_sub(self.cleared).min(self.history.len());
        (&self.history[start..], self.cleared + self.history.len())
    }

    /// Forget drained events; called when a new level starts
    pub fn clear_history(&mut self) {
        self.cleared += self.history.len();
        self.history.clear();
    }
}

pub fn update_event_bus_time(mut bus: ResMut<EventBus>, time: Res<Time>) {
    bus.set_clock(time.elapsed_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pickup(tank: u32) -> TankEvent {
        TankEvent::AmmoPickup { tank, amount: 10 }
    }

    #[test]
    fn test_drained_events_keep_their_stamp() {
        let mut bus = EventBus::new();
        bus.set_clock(1.5);
        bus.emit(pickup(0));

        let events = bus.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time_ms, 1500);
        assert!(bus.drain().is_empty());
        assert_eq!(bus.processed(), events.as_slice());
    }

    #[test]
    fn test_cursor_only_returns_new_events() {
        let mut bus = EventBus::new();
        bus.emit(pickup(0));
        bus.drain();
        let (first, cursor) = bus.processed_since(0);
        assert_eq!(first.len(), 1);

        bus.emit(pickup(1));
        bus.emit(pickup(2));
        bus.drain();
        let (next, cursor) = bus.processed_since(cursor);
        assert_eq!(next.len(), 2);
        assert_eq!(cursor, 3);
        assert!(bus.processed_since(cursor).0.is_empty());
        assert!(bus.processed_since(99).0.is_empty());
    }

    #[test]
    fn test_cursor_survives_clear() {
        let mut bus = EventBus::new();
        bus.emit(pickup(0));
        bus.emit(pickup(1));
        bus.drain();
        let (_, cursor) = bus.processed_since(0);

        bus.clear_history();
        assert!(bus.processed().is_empty());
        bus.emit(pickup(2));
        bus.drain();

        let (new_events, cursor) = bus.processed_since(cursor);
        assert_eq!(new_events.len(), 1);
        assert_eq!(new_events[0].event, pickup(2));
        assert_eq!(cursor, 3);
    }
}
