//! Pickup capture protocol
//!
//! A pickup is granted at most once: [`capture`] claims it through the
//! registry's removal flag before applying anything.

use super::movement::advance_pickup;
use super::registry::EntityId;
use super::state::{Ally, GameEvent, NotificationStyle, PickupKind, SimulationWorld};
use super::upgrades::Activation;
use crate::consts::*;

/// Coins credited for a coin pickup: `ceil(amount × (1 + 0.2 × level))` in integer math
pub fn coin_value(amount: u32, coin_gain_level: u32) -> u32 {
    let scaled = amount as u64 * (5 + coin_gain_level as u64);
    scaled.div_ceil(5).min(u32::MAX as u64) as u32
}

/// Move pickups, capture the magnetised ones that reached the ship, drop the
/// ones that fell out of the arena, then compact
pub fn resolve_pickups(world: &mut SimulationWorld, dt: f32) {
    let target = world.player.pos;
    let range = world.player.pickup_range;
    let fall_speed = world.arena.pickup_fall_speed();
    let floor = world.arena.breach_line();

    let mut captured: Vec<EntityId> = Vec::new();
    for pickup in world.pickups.iter_mut() {
        if pickup.removed {
            continue;
        }
        advance_pickup(pickup, target, range, fall_speed, dt);
        if pickup.magnetized && pickup.pos.distance_squared(target) < CAPTURE_DIST_SQ {
            captured.push(pickup.id);
        } else if !pickup.magnetized && pickup.pos.y > floor {
            pickup.removed = true;
        }
    }

    for id in captured {
        capture(world, id);
    }
    world.pickups.compact();
}

/// Grant a pickup to the player. Returns false if it was already taken.
pub fn capture(world: &mut SimulationWorld, id: EntityId) -> bool {
    let Some(kind) = world.pickups.get(id).filter(|p| !p.removed).map(|p| p.kind) else {
        return false;
    };
    if !world.pickups.mark_removed(id) {
        return false;
    }

    match kind {
        PickupKind::Upgrade(upgrade) => {
            if upgrade.apply(&mut world.player) {
                world.lives += 1;
                world.notify("EXTRA LIFE!", NotificationStyle::Normal);
            }
            world.notify(upgrade.name(), NotificationStyle::Normal);
        }
        PickupKind::Coin(amount) => {
            let value = coin_value(amount, world.meta.upgrades.coin_gain);
            world.coins_run = world.coins_run.saturating_add(value);
        }
        PickupKind::Ally { strong } => {
            if world.player.allies.len() < MAX_ALLIES {
                world.player.allies.push(Ally::new(world.player.pos, strong));
                let text = if strong { "STRONG ALLY!" } else { "ALLY JOINED!" };
                world.notify(text, NotificationStyle::Normal);
                log::debug!("Ally joined ({} total)", world.player.allies.len());
            } else {
                world.coins_run = world.coins_run.saturating_add(MAX_ALLY_COINS);
                world.notify(format!("MAX ALLIES +{MAX_ALLY_COINS}"), NotificationStyle::Normal);
            }
        }
        PickupKind::SpecialWeapon(weapon) => {
            let text = match weapon.activate(&mut world.player, world.run_time) {
                Activation::Started => weapon.name().to_string(),
                Activation::Refreshed => format!("{} REFRESHED", weapon.name()),
            };
            world.notify(text, NotificationStyle::Normal);
        }
    }

    world.emit(GameEvent::PickupCaptured { kind });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MetaProgress;
    use crate::sim::arena::{ArenaGeometry, ArenaLayout};
    use crate::sim::difficulty::Difficulty;
    use crate::sim::upgrades::{SpecialWeapon, Upgrade};
    use glam::Vec2;

    fn world() -> SimulationWorld {
        let arena = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 800.0, 1000.0);
        let mut world = SimulationWorld::new(9, arena, MetaProgress::default());
        world.reset(Difficulty::EASIEST);
        world
    }

    #[test]
    fn test_coin_value_rounds_up() {
        assert_eq!(coin_value(10, 0), 10);
        assert_eq!(coin_value(10, 2), 14);
        assert_eq!(coin_value(10, 1), 12);
        assert_eq!(coin_value(7, 1), 9);
    }

    #[test]
    fn test_capture_is_idempotent() {
        let mut world = world();
        world.meta.upgrades.coin_gain = 2;
        let id = world.spawn_pickup(PickupKind::Coin(10), world.player.pos);
        assert!(capture(&mut world, id));
        assert!(!capture(&mut world, id));
        assert_eq!(world.coins_run, 14);
    }

    #[test]
    fn test_heart_grants_life() {
        let mut world = world();
        let lives = world.lives;
        let id = world.spawn_pickup(PickupKind::Upgrade(Upgrade::Heart), world.player.pos);
        capture(&mut world, id);
        assert_eq!(world.lives, lives + 1);
        assert_eq!(world.notifications.last().map(|n| n.text.as_str()), Some("HEART"));
    }

    #[test]
    fn test_ally_cap_pays_coins() {
        let mut world = world();
        for _ in 0..MAX_ALLIES {
            let id = world.spawn_pickup(PickupKind::Ally { strong: false }, world.player.pos);
            capture(&mut world, id);
        }
        assert_eq!(world.player.allies.len(), MAX_ALLIES);
        let id = world.spawn_pickup(PickupKind::Ally { strong: true }, world.player.pos);
        capture(&mut world, id);
        assert_eq!(world.player.allies.len(), MAX_ALLIES);
        assert_eq!(world.coins_run, MAX_ALLY_COINS);
    }

    #[test]
    fn test_special_weapon_activates() {
        let mut world = world();
        let id = world.spawn_pickup(PickupKind::SpecialWeapon(SpecialWeapon::Homing), world.player.pos);
        capture(&mut world, id);
        assert!(world.player.has_effect(SpecialWeapon::Homing));
        assert!(world.events.contains(&GameEvent::PickupCaptured {
            kind: PickupKind::SpecialWeapon(SpecialWeapon::Homing)
        }));
    }

    #[test]
    fn test_resolve_captures_and_compacts() {
        let mut world = world();
        let near = world.player.pos - Vec2::new(0.0, 10.0);
        world.spawn_pickup(PickupKind::Coin(10), near);
        world.spawn_pickup(PickupKind::Coin(10), Vec2::new(0.0, -40.0));
        resolve_pickups(&mut world, 0.016);
        assert_eq!(world.coins_run, 10);
        assert_eq!(world.pickups.len(), 1);
        assert!(!world.pickups.as_slice()[0].magnetized);
    }

    #[test]
    fn test_unmagnetized_overlap_not_captured() {
        let mut world = world();
        world.player.pickup_range = 0.0;
        world.spawn_pickup(PickupKind::Coin(10), world.player.pos);
        resolve_pickups(&mut world, 0.016);
        assert_eq!(world.coins_run, 0);
        assert_eq!(world.pickups.len(), 1);
    }

    #[test]
    fn test_missed_pickup_falls_out_and_is_dropped() {
        let mut world = world();
        let edge = world.arena.edge_lane_center(crate::sim::arena::EdgeSide::Right).expect("right lane");
        let floor = world.arena.breach_line();
        let id = world.spawn_pickup(PickupKind::Ally { strong: false }, Vec2::new(edge, floor - 3.0));
        resolve_pickups(&mut world, 0.016);
        assert_eq!(world.pickups.len(), 1);
        resolve_pickups(&mut world, 0.016);
        assert!(world.pickups.get(id).is_none());
        assert!(world.player.allies.is_empty());
    }

    #[test]
    fn test_magnetized_pickup_below_floor_still_chases() {
        let mut world = world();
        let floor = world.arena.breach_line();
        let id = world.spawn_pickup(PickupKind::Coin(10), Vec2::new(0.0, floor + 5.0));
        world.pickups.get_mut(id).expect("pickup").magnetized = true;
        resolve_pickups(&mut world, 0.016);
        assert!(world.pickups.get(id).is_some());
    }
}
