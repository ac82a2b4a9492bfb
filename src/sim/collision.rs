//! Collision and damage resolution
//!
//! Projectile ↔ adversary overlaps use squared-distance circle tests.
//! Adversary ↔ player contact uses a shrunken box around the ship.
//! Every adversary death, whatever the cause, goes through [`destroy_adversary`].

use glam::Vec2;
use rand::Rng;

use super::arena::ArenaLayout;
use super::registry::EntityId;
use super::state::{AdversaryKind, DeathCause, GameEvent, GamePhase, ParticleKind, PickupKind, SimulationWorld};
use super::tick::damage_player;
use super::upgrades::Upgrade;
use crate::consts::*;

/// Circle overlap without a square root
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let radii = ra + rb;
    a.distance_squared(b) < radii * radii
}

/// Box test between the ship's shrunken hitbox and an adversary center
pub fn hits_ship(ship_pos: Vec2, ship_width: f32, ship_height: f32, other: Vec2) -> bool {
    let d = other - ship_pos;
    d.x.abs() < ship_width * HITBOX_FACTOR && d.y.abs() < ship_height * HITBOX_FACTOR
}

/// Run every projectile against every adversary.
///
/// Adversaries killed earlier in the pass are skipped by later projectiles.
pub fn resolve_projectile_hits(world: &mut SimulationWorld) {
    for pi in 0..world.projectiles.len() {
        if world.projectiles.as_slice()[pi].removed {
            continue;
        }
        for ai in 0..world.adversaries.len() {
            let (target_id, target_pos, target_radius) = {
                let a = &world.adversaries.as_slice()[ai];
                if a.removed {
                    continue;
                }
                (a.id, a.pos, a.radius)
            };

            let shot = &mut world.projectiles.as_mut_slice()[pi];
            if shot.has_struck(target_id) || !circles_overlap(shot.pos, shot.radius, target_pos, target_radius) {
                continue;
            }
            shot.struck.push(target_id);
            let damage = shot.damage;
            let spent = shot.pierce_spent();
            if spent {
                shot.removed = true;
            }

            let killed = world.adversaries.as_mut_slice()[ai].take_damage(damage);
            world.emit(GameEvent::Hit);
            world.burst(target_pos, ParticleKind::Spark, 2, 50.0);
            if killed {
                destroy_adversary(world, target_id, DeathCause::Killed);
            }
            if spent {
                break;
            }
        }
    }
}

/// Ram check: contact costs the ship a fixed amount of health and always kills the adversary
pub fn resolve_player_contacts(world: &mut SimulationWorld) {
    for ai in 0..world.adversaries.len() {
        if world.phase != GamePhase::Playing {
            return;
        }
        let (id, pos) = {
            let a = &world.adversaries.as_slice()[ai];
            if a.removed {
                continue;
            }
            (a.id, a.pos)
        };
        let ship = &world.player;
        if hits_ship(ship.pos, ship.width, ship.height, pos) {
            damage_player(world, CONTACT_DAMAGE);
            if world.phase == GamePhase::Playing {
                destroy_adversary(world, id, DeathCause::Contact);
            } else {
                // Run is over: the final tally is already out
                world.adversaries.mark_removed(id);
            }
        }
    }
}

/// The single death path. Flags the adversary for removal and applies the
/// consequences of `cause` exactly once; later calls for the same id return false.
pub fn destroy_adversary(world: &mut SimulationWorld, id: EntityId, cause: DeathCause) -> bool {
    let Some((kind, pos)) = world.adversaries.get(id).filter(|a| !a.removed).map(|a| (a.kind, a.pos)) else {
        return false;
    };
    if !world.adversaries.mark_removed(id) {
        return false;
    }
    if cause == DeathCause::Breach {
        return true;
    }

    world.kills += 1;
    let (count, speed) = match kind {
        AdversaryKind::Boss => (50, 500.0),
        _ => (20, 300.0),
    };
    world.burst(pos, ParticleKind::Debris(kind), count, speed);
    drop_rewards(world, kind, pos);
    world.emit(GameEvent::Explosion { kind });
    true
}

fn drop_rewards(world: &mut SimulationWorld, kind: AdversaryKind, pos: Vec2) {
    if kind == AdversaryKind::Boss {
        world.spawn_pickup(PickupKind::Coin(50), pos);
        if world.rng.random::<f32>() < 0.5 {
            world.spawn_pickup(PickupKind::Coin(30), pos + Vec2::new(20.0, 0.0));
        }
        log::info!("Boss destroyed at {:.1}s", world.run_time);
        return;
    }

    let roll = world.rng.random::<f32>();
    match world.arena.layout {
        ArenaLayout::SingleLane => {
            if roll < 0.4 {
                let upgrade = Upgrade::roll(&mut world.rng);
                world.spawn_pickup(PickupKind::Upgrade(upgrade), pos);
            } else if roll < 0.6 {
                world.spawn_pickup(PickupKind::Coin(COIN_DROP_AMOUNT), pos);
            }
        }
        ArenaLayout::ThreeLane => {
            if roll < 0.2 {
                world.spawn_pickup(PickupKind::Coin(COIN_DROP_AMOUNT), pos);
            }
        }
    }
}
