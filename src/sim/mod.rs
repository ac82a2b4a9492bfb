//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed time comes in clamped, never read from a wall clock
//! - Seeded RNG only
//! - Stable iteration order (insertion order, compacted once per tick)
//! - No rendering, audio or platform dependencies

pub mod arena;
pub mod clock;
pub mod collision;
pub mod difficulty;
pub mod movement;
pub mod pickup;
pub mod registry;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod upgrades;

pub use arena::{ArenaGeometry, ArenaLayout, EdgeSide};
pub use clock::FrameClock;
pub use collision::destroy_adversary;
pub use difficulty::{DIFFICULTY_LEVELS, Difficulty, DifficultyLevel};
pub use pickup::{capture, coin_value};
pub use registry::{EntityId, Registry, Tracked};
pub use snapshot::{ActiveSpecial, HudSnapshot};
pub use state::{
    Adversary, AdversaryKind, Ally, DeathCause, GameEvent, GamePhase, LifeLoss, Notification, NotificationStyle,
    Particle, ParticleKind, Pickup, PickupKind, PlayerShip, Projectile, SimulationWorld,
};
pub use tick::{TickInput, damage_player, game_over, lose_life, tick};
pub use upgrades::{Activation, ActiveEffect, SpecialWeapon, Upgrade};
