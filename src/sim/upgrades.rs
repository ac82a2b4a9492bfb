//! Run upgrades and timed special weapons
//!
//! Both are plain tags. Their effects are applied by the functions here rather
//! than by behaviour carried on the pickup itself.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use super::state::PlayerShip;
use crate::consts::{MAX_PIERCE, MAX_SHOT_COUNT};

/// Permanent-for-the-run stat boosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Upgrade {
    Damage,
    FireRate,
    MoveSpeed,
    Heart,
    Multishot,
    Pierce,
    /// Scheduled main-lane repair, never part of the drop pool
    Repair,
}

impl Upgrade {
    /// Upgrades that can drop from kills
    pub const POOL: [Upgrade; 6] = [
        Upgrade::Damage,
        Upgrade::FireRate,
        Upgrade::MoveSpeed,
        Upgrade::Heart,
        Upgrade::Multishot,
        Upgrade::Pierce,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Upgrade::Damage => "DAMAGE UP",
            Upgrade::FireRate => "FIRE RATE UP",
            Upgrade::MoveSpeed => "SPEED UP",
            Upgrade::Heart => "HEART",
            Upgrade::Multishot => "MULTISHOT",
            Upgrade::Pierce => "PIERCE UP",
            Upgrade::Repair => "REPAIR",
        }
    }

    /// Relative drop weight
    pub fn weight(self) -> f32 {
        match self {
            Upgrade::Damage | Upgrade::FireRate | Upgrade::MoveSpeed => 1.0,
            Upgrade::Heart => 0.8,
            Upgrade::Multishot => 0.1,
            Upgrade::Pierce => 0.5,
            Upgrade::Repair => 0.0,
        }
    }

    /// Draw a weighted random upgrade
    pub fn roll(rng: &mut impl Rng) -> Upgrade {
        match WeightedIndex::new(Self::POOL.iter().map(|u| u.weight())) {
            Ok(dist) => Self::POOL[dist.sample(rng)],
            Err(_) => Upgrade::Damage,
        }
    }

    /// Mutate the ship. Returns true when the upgrade also grants a life.
    pub fn apply(self, ship: &mut PlayerShip) -> bool {
        match self {
            Upgrade::Damage => ship.stats.damage_mult += 0.2,
            Upgrade::FireRate => ship.stats.fire_rate_mult += 0.15,
            Upgrade::MoveSpeed => ship.stats.move_speed_mult += 0.1,
            Upgrade::Heart => {
                ship.max_hp += 10.0;
                ship.heal(100.0);
                return true;
            }
            Upgrade::Multishot => {
                if ship.weapon.count < MAX_SHOT_COUNT {
                    ship.weapon.count += 1;
                }
            }
            Upgrade::Pierce => {
                if ship.weapon.pierce < MAX_PIERCE {
                    ship.weapon.pierce += 1;
                }
            }
            Upgrade::Repair => ship.heal(50.0),
        }
        false
    }
}

/// Timed weapon modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialWeapon {
    Homing,
    RapidFire,
    MegaDamage,
    SpreadShot,
    PierceShot,
}

/// Whether an activation started a new effect or refreshed a running one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Started,
    Refreshed,
}

/// A special weapon currently mutating the ship
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub weapon: SpecialWeapon,
    /// Run time (seconds) at which the effect reverts
    pub expires_at: f32,
}

impl SpecialWeapon {
    pub const ALL: [SpecialWeapon; 5] = [
        SpecialWeapon::Homing,
        SpecialWeapon::RapidFire,
        SpecialWeapon::MegaDamage,
        SpecialWeapon::SpreadShot,
        SpecialWeapon::PierceShot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SpecialWeapon::Homing => "HOMING BULLETS",
            SpecialWeapon::RapidFire => "RAPID FIRE",
            SpecialWeapon::MegaDamage => "MEGA DAMAGE",
            SpecialWeapon::SpreadShot => "SPREAD SHOT",
            SpecialWeapon::PierceShot => "PIERCE SHOT",
        }
    }

    /// Seconds the effect lasts
    pub fn duration(self) -> f32 {
        match self {
            SpecialWeapon::Homing | SpecialWeapon::SpreadShot => 15.0,
            SpecialWeapon::RapidFire | SpecialWeapon::PierceShot => 12.0,
            SpecialWeapon::MegaDamage => 10.0,
        }
    }

    /// Uniform pick
    pub fn roll(rng: &mut impl Rng) -> SpecialWeapon {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    fn engage(self, ship: &mut PlayerShip) {
        match self {
            // Homing is read from the effect list when firing
            SpecialWeapon::Homing => {}
            SpecialWeapon::RapidFire => ship.stats.fire_rate_mult += 1.0,
            SpecialWeapon::MegaDamage => ship.stats.damage_mult += 1.0,
            SpecialWeapon::SpreadShot => ship.weapon.bonus_count += 3,
            SpecialWeapon::PierceShot => ship.weapon.bonus_pierce += 3,
        }
    }

    fn disengage(self, ship: &mut PlayerShip) {
        match self {
            SpecialWeapon::Homing => {}
            SpecialWeapon::RapidFire => ship.stats.fire_rate_mult -= 1.0,
            SpecialWeapon::MegaDamage => ship.stats.damage_mult -= 1.0,
            SpecialWeapon::SpreadShot => ship.weapon.bonus_count = ship.weapon.bonus_count.saturating_sub(3),
            SpecialWeapon::PierceShot => ship.weapon.bonus_pierce = ship.weapon.bonus_pierce.saturating_sub(3),
        }
    }

    /// Start the effect, or push back its expiry if it is already running
    pub fn activate(self, ship: &mut PlayerShip, now: f32) -> Activation {
        let expires_at = now + self.duration();
        if let Some(effect) = ship.effects.iter_mut().find(|e| e.weapon == self) {
            effect.expires_at = effect.expires_at.max(expires_at);
            return Activation::Refreshed;
        }
        self.engage(ship);
        ship.effects.push(ActiveEffect { weapon: self, expires_at });
        Activation::Started
    }
}

/// Revert and drop every effect whose time is up. Returns what expired.
pub fn expire_effects(ship: &mut PlayerShip, now: f32) -> Vec<SpecialWeapon> {
    let expired: Vec<SpecialWeapon> = ship
        .effects
        .iter()
        .filter(|e| e.expires_at <= now)
        .map(|e| e.weapon)
        .collect();
    for weapon in &expired {
        weapon.disengage(ship);
    }
    ship.effects.retain(|e| e.expires_at > now);
    expired
}
