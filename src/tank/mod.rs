//! Tank module - components, drive model, cannon and health

mod cannon;
mod components;
mod health;
mod movement;

pub use cannon::*;
pub use components::*;
pub use health::*;
pub use movement::*;
