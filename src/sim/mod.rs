//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-driven only (no wall-clock reads, no interval timers)
//! - Seeded RNG only
//! - Stable object ordering (by spawn ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod player;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::resolve_collisions;
pub use player::PlayerState;
pub use spawn::{ObjectKind, Spawner, WorldObject, advance_world};
pub use state::{GameEvent, GameState, GameStatus};
pub use tick::{TickInput, tick};
