//! UI module - HUD, match banner, health bars and debug overlay

mod debug;
mod health_bars;
mod hud;

pub use debug::*;
pub use health_bars::*;
pub use hud::*;
