//! Combat module - bullets and ammo pickups

mod bullet;
mod pickups;

pub use bullet::*;
pub use pickups::*;
