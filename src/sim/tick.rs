//! Per-frame simulation tick
//!
//! Sequences every stage in a fixed order and owns run-level state:
//! lives, game over and the one-time currency merge.

use super::collision::{destroy_adversary, resolve_player_contacts, resolve_projectile_hits};
use super::movement::{advance_adversaries, advance_allies, advance_effects, advance_projectiles, fire_player_weapon, move_player};
use super::pickup::resolve_pickups;
use super::registry::EntityId;
use super::snapshot::HudSnapshot;
use super::spawner;
use super::state::{DeathCause, GameEvent, GamePhase, LifeLoss, NotificationStyle, SimulationWorld};
use super::upgrades::expire_effects;
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer drag since the last tick, applied 1:1 (px)
    pub lateral_delta: f32,
    /// Held movement keys, -1 (left) ..= 1 (right)
    pub lateral_axis: f32,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the world by `dt` seconds
pub fn tick(world: &mut SimulationWorld, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match world.phase {
            GamePhase::Playing => {
                world.phase = GamePhase::Paused;
                log::info!("Paused at {:.1}s", world.run_time);
                return;
            }
            GamePhase::Paused => world.phase = GamePhase::Playing,
            _ => {}
        }
    }

    if world.phase != GamePhase::Playing {
        return;
    }
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };

    world.run_time += dt;
    for weapon in expire_effects(&mut world.player, world.run_time) {
        log::debug!("{} expired", weapon.name());
        world.emit(GameEvent::SpecialExpired { weapon });
    }

    spawner::run_timers(world, dt);

    let axis = if input.lateral_axis.is_finite() { input.lateral_axis.clamp(-1.0, 1.0) } else { 0.0 };
    let delta = if input.lateral_delta.is_finite() { input.lateral_delta } else { 0.0 };
    let keyboard = axis * KEYBOARD_SPEED * world.player.stats.move_speed_mult * dt;
    move_player(world, delta + keyboard);
    fire_player_weapon(world, dt);
    advance_allies(world, dt);

    advance_projectiles(world, dt);
    for id in advance_adversaries(world, dt) {
        breach(world, id);
    }
    if world.phase != GamePhase::Playing {
        world.hud = HudSnapshot::capture(world);
        return;
    }

    resolve_pickups(world, dt);
    advance_effects(world, dt);

    world.adversaries.compact();
    world.projectiles.compact();

    resolve_projectile_hits(world);
    resolve_player_contacts(world);

    world.hud = HudSnapshot::capture(world);
}

fn breach(world: &mut SimulationWorld, id: EntityId) {
    if destroy_adversary(world, id, DeathCause::Breach) {
        world.notify("BREACH!", NotificationStyle::Normal);
        lose_life(world, LifeLoss::Breach);
    }
}

/// Subtract health from the ship. Running out costs a life; if lives remain
/// health is restored and nearby adversaries are cleared.
pub fn damage_player(world: &mut SimulationWorld, amount: f32) {
    if world.phase != GamePhase::Playing {
        return;
    }
    world.player.hp -= amount.max(0.0);
    if world.player.hp > 0.0 {
        return;
    }
    world.player.hp = 0.0;

    lose_life(world, LifeLoss::HealthDepleted);
    if world.phase != GamePhase::Playing {
        return;
    }

    world.player.hp = world.player.max_hp;
    world.notify("HEART LOST!", NotificationStyle::Big);
    let player_y = world.player.pos.y;
    let threats: Vec<EntityId> = world
        .adversaries
        .live()
        .filter(|a| (a.pos.y - player_y).abs() < HEART_LOST_CLEAR_RANGE)
        .map(|a| a.id)
        .collect();
    for id in threats {
        destroy_adversary(world, id, DeathCause::Purged);
    }
}

/// Take one life; the last one ends the run
pub fn lose_life(world: &mut SimulationWorld, cause: LifeLoss) {
    if world.phase != GamePhase::Playing || world.lives == 0 {
        return;
    }
    world.lives -= 1;
    world.emit(GameEvent::LifeLost {
        cause,
        lives: world.lives,
    });
    log::info!("Life lost ({:?}), {} remaining", cause, world.lives);

    if world.lives == 0 {
        game_over(world);
    }
}

/// End the run and bank its currency exactly once
pub fn game_over(world: &mut SimulationWorld) {
    if world.phase == GamePhase::GameOver {
        return;
    }
    world.phase = GamePhase::GameOver;
    if !world.currency_merged {
        world.meta.coins = world.meta.coins.saturating_add(world.coins_run as u64);
        world.currency_merged = true;
    }
    world.emit(GameEvent::GameOver {
        coins: world.coins_run,
        kills: world.kills,
        run_time: world.run_time,
    });
    world.hud = HudSnapshot::capture(world);
    log::info!(
        "Game over: {:.1}s, {} kills, wave {}, {} coins banked (total {})",
        world.run_time,
        world.kills,
        world.spawner.wave,
        world.coins_run,
        world.meta.coins
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MetaProgress;
    use crate::sim::arena::{ArenaGeometry, ArenaLayout};
    use crate::sim::difficulty::Difficulty;
    use crate::sim::state::AdversaryKind;
    use crate::sim::upgrades::SpecialWeapon;
    use glam::Vec2;

    fn world() -> SimulationWorld {
        let arena = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 800.0, 1000.0);
        let mut world = SimulationWorld::new(12345, arena, MetaProgress::default());
        world.reset(Difficulty::EASIEST);
        world
    }

    #[test]
    fn test_tick_pause() {
        let mut world = world();
        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut world, &input, SIM_DT);
        assert_eq!(world.phase, GamePhase::Paused);

        // Frozen while paused
        let t = world.run_time;
        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.run_time, t);

        tick(&mut world, &input, SIM_DT);
        assert_eq!(world.phase, GamePhase::Playing);
        assert!(world.run_time > t);
    }

    #[test]
    fn test_menu_does_not_tick() {
        let arena = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 800.0, 1000.0);
        let mut world = SimulationWorld::new(1, arena, MetaProgress::default());
        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.run_time, 0.0);
        assert!(world.adversaries.is_empty());
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut world = world();
        tick(&mut world, &TickInput::default(), 5.0);
        assert!((world.run_time - MAX_FRAME_DT).abs() < 1e-6);
        tick(&mut world, &TickInput::default(), -1.0);
        assert!((world.run_time - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_keyboard_moves_at_speed() {
        let mut world = world();
        let input = TickInput {
            lateral_axis: 1.0,
            ..Default::default()
        };
        tick(&mut world, &input, 0.05);
        assert!((world.player.pos.x - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_health_loss_costs_life_and_restores() {
        let mut world = world();
        world.lives = 3;
        world.spawn_adversary(AdversaryKind::Basic, world.player.pos - Vec2::new(0.0, 200.0));
        world.spawn_adversary(AdversaryKind::Basic, Vec2::new(0.0, 100.0));
        world.player.hp = 5.0;
        damage_player(&mut world, 10.0);
        assert_eq!(world.lives, 2);
        assert_eq!(world.player.hp, world.player.max_hp);
        assert_eq!(world.phase, GamePhase::Playing);
        // Only the nearby adversary was cleared
        assert_eq!(world.adversaries.live_count(), 1);
        assert!(world.notifications.iter().any(|n| n.text == "HEART LOST!"));
    }

    #[test]
    fn test_last_life_ends_run_and_merges_once() {
        let mut world = world();
        world.lives = 1;
        world.coins_run = 40;
        world.meta.coins = 100;
        world.player.hp = 1.0;
        damage_player(&mut world, 10.0);
        assert_eq!(world.lives, 0);
        assert_eq!(world.phase, GamePhase::GameOver);
        assert_eq!(world.meta.coins, 140);

        game_over(&mut world);
        lose_life(&mut world, LifeLoss::Breach);
        assert_eq!(world.meta.coins, 140);
        let overs = world
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_breach_costs_life_not_health() {
        let mut world = world();
        world.spawner.ambient_timer_ms = f32::MAX;
        let line = world.arena.breach_line();
        world.spawn_adversary(AdversaryKind::Fast, Vec2::new(0.0, line - 0.5));
        let hp = world.player.hp;
        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.lives, STARTING_LIVES - 1);
        assert_eq!(world.player.hp, hp);
        assert_eq!(world.kills, 0);
        assert!(world.adversaries.is_empty());
    }

    #[test]
    fn test_special_expiry_emits_event() {
        let mut world = world();
        SpecialWeapon::MegaDamage.activate(&mut world.player, 0.0);
        world.run_time = 9.99;
        tick(&mut world, &TickInput::default(), 0.05);
        assert!(world.events.contains(&GameEvent::SpecialExpired {
            weapon: SpecialWeapon::MegaDamage
        }));
        assert_eq!(world.player.stats.damage_mult, 1.0);
    }

    #[test]
    fn test_hud_refreshed_each_tick() {
        let mut world = world();
        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.hud.run_time, world.run_time);
        assert_eq!(world.hud.lives, world.lives);
    }

    #[test]
    fn test_determinism() {
        // Two worlds with the same seed should produce identical results
        let mut world1 = world();
        let mut world2 = world();

        let inputs = [
            TickInput {
                lateral_axis: 1.0,
                ..Default::default()
            },
            TickInput {
                lateral_delta: -35.0,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for step in 0..1200 {
            let input = &inputs[step % inputs.len()];
            tick(&mut world1, input, SIM_DT);
            tick(&mut world2, input, SIM_DT);
        }

        assert_eq!(world1.hud, world2.hud);
        assert_eq!(world1.adversaries.len(), world2.adversaries.len());
        assert_eq!(world1.player.pos, world2.player.pos);
    }
}
