//! Read-only HUD snapshot handed to the presentation layer each tick

use serde::Serialize;

use super::state::SimulationWorld;
use super::upgrades::SpecialWeapon;

/// A special weapon with its seconds remaining
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveSpecial {
    pub weapon: SpecialWeapon,
    pub remaining: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub hp: f32,
    pub max_hp: f32,
    pub run_time: f32,
    pub kills: u32,
    pub coins: u32,
    pub lives: u32,
    pub wave: u32,
    pub wave_active: bool,
    pub score: u64,
    pub allies: usize,
    pub damage: f32,
    pub fire_rate: f32,
    pub shot_count: u32,
    pub pierce: u32,
    pub specials: Vec<ActiveSpecial>,
    pub difficulty: &'static str,
}

impl HudSnapshot {
    pub fn capture(world: &SimulationWorld) -> Self {
        let ship = &world.player;
        Self {
            hp: ship.hp.max(0.0),
            max_hp: ship.max_hp,
            run_time: world.run_time,
            kills: world.kills,
            coins: world.coins_run,
            lives: world.lives,
            wave: world.spawner.wave,
            wave_active: world.spawner.wave_active,
            score: world.score(),
            allies: ship.allies.len(),
            damage: ship.weapon.damage * ship.stats.damage_mult,
            fire_rate: ship.stats.fire_rate_mult,
            shot_count: ship.weapon.shot_count(),
            pierce: ship.weapon.shot_pierce(),
            specials: ship
                .effects
                .iter()
                .map(|e| ActiveSpecial {
                    weapon: e.weapon,
                    remaining: (e.expires_at - world.run_time).max(0.0),
                })
                .collect(),
            difficulty: world.level().name,
        }
    }

    /// Health as a 0..=1 fraction
    pub fn health_fraction(&self) -> f32 {
        if self.max_hp <= 0.0 {
            return 0.0;
        }
        (self.hp / self.max_hp).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MetaProgress;
    use crate::sim::arena::{ArenaGeometry, ArenaLayout};
    use crate::sim::difficulty::Difficulty;

    #[test]
    fn test_snapshot_reports_specials() {
        let arena = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 800.0, 1000.0);
        let mut world = SimulationWorld::new(1, arena, MetaProgress::default());
        world.reset(Difficulty::new(1));
        world.run_time = 4.0;
        SpecialWeapon::RapidFire.activate(&mut world.player, 0.0);
        let hud = HudSnapshot::capture(&world);
        assert_eq!(hud.specials.len(), 1);
        assert_eq!(hud.specials[0].remaining, 8.0);
        assert_eq!(hud.difficulty, "LEVEL 2");
        assert_eq!(hud.lives, 10);
        assert_eq!(hud.health_fraction(), 1.0);
    }
}
