//! Movement and physics step
//!
//! Integrates every entity by `velocity × dt`. Nothing here destroys an
//! adversary directly: breaches are reported back to the orchestrator.

use glam::Vec2;

use super::registry::{EntityId, Registry};
use super::state::{Adversary, GameEvent, Pickup, Projectile, SimulationWorld};
use super::upgrades::SpecialWeapon;
use crate::consts::*;
use crate::{bearing, heading, wrap_angle};

/// Nearest live adversary within `range` of `from`
pub fn nearest_adversary(adversaries: &Registry<Adversary>, from: Vec2, range: f32) -> Option<&Adversary> {
    let range_sq = range * range;
    adversaries
        .live()
        .map(|a| (a, a.pos.distance_squared(from)))
        .filter(|(_, d)| *d < range_sq)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(a, _)| a)
}

/// Move the ship by a lateral delta, then clamp into the arena
pub fn move_player(world: &mut SimulationWorld, lateral_delta: f32) {
    let ship = &mut world.player;
    ship.pos.x = world.arena.clamp_lateral(ship.pos.x + lateral_delta, ship.width);
}

/// Tick the primary weapon and fire a volley when it is ready
pub fn fire_player_weapon(world: &mut SimulationWorld, dt: f32) {
    world.player.weapon.fire_timer -= dt;
    if world.player.weapon.fire_timer > 0.0 {
        return;
    }

    let ship = &world.player;
    let weapon = &ship.weapon;
    let homing = ship.has_effect(SpecialWeapon::Homing);
    let mega = ship.has_effect(SpecialWeapon::MegaDamage);
    let damage = weapon.damage * ship.stats.damage_mult;
    let (speed, pierce, count) = (weapon.projectile_speed, weapon.shot_pierce(), weapon.shot_count());
    let spread = (count.saturating_sub(1)) as f32 * SHOT_SPACING;
    let start = Vec2::new(ship.pos.x - spread / 2.0, ship.pos.y - MUZZLE_OFFSET);
    let interval = weapon.interval(ship.stats.fire_rate_mult);

    for i in 0..count {
        let id = world.next_entity_id();
        let pos = start + Vec2::new(i as f32 * SHOT_SPACING, 0.0);
        let mut shot = Projectile::new(id, pos, -std::f32::consts::FRAC_PI_2, speed, damage, pierce);
        shot.homing = homing;
        shot.mega = mega;
        world.spawn_projectile(shot);
    }
    world.player.weapon.fire_timer = interval;
    world.emit(GameEvent::Shot);
}

/// Fly allies in a rotating ring around the ship and let each fire on its own cooldown
pub fn advance_allies(world: &mut SimulationWorld, dt: f32) {
    let count = world.player.allies.len();
    if count == 0 {
        return;
    }
    let center = world.player.pos;
    let spin = world.run_time * ALLY_FORMATION_SPIN;
    let damage_scale = (1.0 + world.run_time * 0.001).min(2.0);

    let mut volleys: Vec<Projectile> = Vec::new();
    for (index, ally) in world.player.allies.iter_mut().enumerate() {
        ally.formation_angle = index as f32 / count as f32 * std::f32::consts::TAU;
        ally.pos = center + heading(ally.formation_angle + spin) * ALLY_FORMATION_RADIUS;

        ally.fire_timer -= dt;
        if ally.fire_timer > 0.0 {
            continue;
        }
        // Hold fire (timer stays expired) until something is in range
        if let Some(target) = nearest_adversary(&world.adversaries, ally.pos, ally.range) {
            let angle = bearing(ally.pos, target.pos);
            volleys.push(Projectile::new(0, ally.pos, angle, PROJECTILE_SPEED, ally.damage * damage_scale, 1));
            ally.fire_timer = ally.cooldown;
        }
    }

    for mut shot in volleys {
        shot.id = world.next_entity_id();
        world.spawn_projectile(shot);
        world.emit(GameEvent::Shot);
    }
}

/// Steer homing shots, integrate every projectile and flag those leaving the arena
pub fn advance_projectiles(world: &mut SimulationWorld, dt: f32) {
    let SimulationWorld {
        projectiles,
        adversaries,
        arena,
        ..
    } = world;

    for shot in projectiles.iter_mut() {
        if shot.removed {
            continue;
        }
        if shot.homing {
            steer_homing(shot, adversaries, dt);
        }
        shot.pos += heading(shot.angle) * shot.speed * dt;
        if !arena.contains_projectile(shot.pos) {
            shot.removed = true;
        }
    }
}

fn steer_homing(shot: &mut Projectile, adversaries: &Registry<Adversary>, dt: f32) {
    if shot.target.is_none() {
        shot.target = nearest_adversary(adversaries, shot.pos, HOMING_RANGE).map(|a| a.id);
    }
    let Some(target_id) = shot.target else {
        return;
    };
    match adversaries.get(target_id).filter(|a| !a.removed) {
        Some(target) => {
            let diff = wrap_angle(bearing(shot.pos, target.pos) - shot.angle);
            shot.angle = wrap_angle(shot.angle + diff * HOMING_TURN_RATE * dt);
        }
        // Target gone: fly straight this tick, pick a new one next tick
        None => shot.target = None,
    }
}

/// Descend every adversary. Returns the ids that crossed the breach line.
pub fn advance_adversaries(world: &mut SimulationWorld, dt: f32) -> Vec<EntityId> {
    let breach_line = world.arena.breach_line();
    let mut breached = Vec::new();
    for adversary in world.adversaries.iter_mut() {
        if adversary.removed {
            continue;
        }
        adversary.pos.y += adversary.speed * dt;
        if adversary.pos.y > breach_line {
            breached.push(adversary.id);
        }
    }
    breached
}

/// Magnetise within range, then either chase the ship or keep falling
pub fn advance_pickup(pickup: &mut Pickup, target: Vec2, range: f32, fall_speed: f32, dt: f32) {
    if pickup.pos.distance_squared(target) < range * range {
        pickup.magnetized = true;
    }
    if pickup.magnetized {
        let to_target = target - pickup.pos;
        let step = MAGNET_SPEED * dt;
        if to_target.length_squared() <= step * step {
            pickup.pos = target;
        } else {
            pickup.pos += to_target.normalize_or_zero() * step;
        }
    } else {
        pickup.pos.y += fall_speed * dt;
    }
}

/// Fade particles and floating text, dropping the expired
pub fn advance_effects(world: &mut SimulationWorld, dt: f32) {
    let frames = dt * 60.0;
    for particle in world.particles.iter_mut() {
        particle.life -= particle.decay * frames;
        particle.pos += particle.vel * dt;
        particle.vel *= PARTICLE_FRICTION;
    }
    world.particles.retain(|p| p.life > 0.0);

    for note in world.notifications.iter_mut() {
        note.life -= dt;
        note.pos.y -= NOTIFICATION_RISE * dt;
    }
    world.notifications.retain(|n| n.life > 0.0);
}
