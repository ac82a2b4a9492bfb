//! Lane Survivor - A lane-defence survival arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, collisions, game state)
//! - `session`: Menu/shop/settings state machine around the simulation
//! - `persistence`: Meta-progression save with lenient recovery
//! - `settings`: Player preferences
//! - `audio`: Sound cue taxonomy and the audio sink seam

pub mod audio;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::Session;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest elapsed time a single frame may feed the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Step used by the headless driver and tests (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Lane geometry
    pub const SINGLE_LANE_MAX_WIDTH: f32 = 600.0;
    pub const MAX_MAIN_COLUMNS: u32 = 6;
    pub const COLUMN_WIDTH: f32 = 50.0;
    pub const EDGE_LANE_WIDTH: f32 = 60.0;
    pub const LANE_PADDING: f32 = 20.0;
    pub const MIN_MAIN_HALF: f32 = 50.0;
    /// Keep adversaries this far inside the main band
    pub const SPAWN_MARGIN: f32 = 20.0;
    /// Entities enter this far above the top edge
    pub const SPAWN_Y: f32 = -50.0;
    /// Slack past the top/bottom edges before something counts as off-arena
    pub const OFFSCREEN_MARGIN: f32 = 50.0;

    /// Player ship
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    pub const PLAYER_BASE_HP: f32 = 100.0;
    pub const HP_PER_HEALTH_LEVEL: f32 = 20.0;
    pub const PICKUP_RANGE: f32 = 100.0;
    pub const KEYBOARD_SPEED: f32 = 400.0;
    pub const STARTING_LIVES: u32 = 10;
    /// Fraction of the ship box used for contact hits
    pub const HITBOX_FACTOR: f32 = 0.8;
    pub const CONTACT_DAMAGE: f32 = 10.0;
    /// Adversaries this close (vertically) die when a heart is lost
    pub const HEART_LOST_CLEAR_RANGE: f32 = 300.0;

    /// Primary weapon
    pub const WEAPON_COOLDOWN: f32 = 0.5;
    pub const WEAPON_BASE_DAMAGE: f32 = 15.0;
    pub const DAMAGE_PER_DAMAGE_LEVEL: f32 = 2.0;
    pub const PROJECTILE_SPEED: f32 = 600.0;
    pub const MIN_FIRE_INTERVAL: f32 = 0.1;
    pub const SHOT_SPACING: f32 = 10.0;
    pub const MUZZLE_OFFSET: f32 = 20.0;
    pub const MAX_SHOT_COUNT: u32 = 30;
    pub const MAX_PIERCE: u32 = 5;

    /// Projectiles
    pub const PROJECTILE_RADIUS: f32 = 4.0;
    pub const HOMING_RANGE: f32 = 600.0;
    /// Radians per second per radian of bearing error
    pub const HOMING_TURN_RATE: f32 = 8.0;

    /// Pickups
    pub const MAGNET_SPEED: f32 = 500.0;
    /// Squared capture distance (30 px)
    pub const CAPTURE_DIST_SQ: f32 = 900.0;
    pub const PICKUP_FALL_SPEED_SINGLE: f32 = 40.0;
    pub const PICKUP_FALL_SPEED_THREE: f32 = 150.0;
    pub const COIN_PICKUP_RADIUS: f32 = 6.0;
    pub const POWER_PICKUP_RADIUS: f32 = 15.0;
    pub const COIN_DROP_AMOUNT: u32 = 10;
    pub const MAX_ALLY_COINS: u32 = 10;

    /// Ambient spawning
    pub const BASE_SPAWN_INTERVAL_MS: f32 = 1000.0;
    pub const SPAWN_DECAY: f32 = 0.98;
    pub const SPAWN_FLOOR_MS: f32 = 200.0;

    /// Wave cycle
    pub const FIRST_WAVE_BREAK: f32 = 3.0;
    pub const WAVE_BREAK: f32 = 5.0;
    pub const WAVE_DURATION: f32 = 30.0;
    pub const BOSS_WAVE_EVERY: u32 = 5;
    pub const BOSS_DELAY: f32 = 1.0;

    /// Lane drops
    pub const SPECIAL_WEAPON_INTERVAL: f32 = 10.0;
    pub const ALLY_INTERVAL_MIN: f32 = 8.0;
    pub const ALLY_INTERVAL_JITTER: f32 = 4.0;
    pub const STRONG_ALLY_CHANCE: f32 = 0.1;
    pub const HEAL_DROP_INTERVAL: f32 = 45.0;

    /// Allies
    pub const MAX_ALLIES: usize = 30;
    pub const ALLY_FORMATION_RADIUS: f32 = 60.0;
    pub const ALLY_FORMATION_SPIN: f32 = 0.5;
    pub const ALLY_RANGE: f32 = 800.0;

    /// Effects
    pub const NOTIFICATION_LIFE: f32 = 2.0;
    pub const NOTIFICATION_RISE: f32 = 50.0;
    pub const PARTICLE_FRICTION: f32 = 0.95;
}

/// Wrap an angle to (-π, π]
#[inline]
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    angle = (angle + PI).rem_euclid(TAU) - PI;
    if angle <= -PI { PI } else { angle }
}

/// Unit vector pointing along `angle`
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Bearing from `from` to `to`
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
