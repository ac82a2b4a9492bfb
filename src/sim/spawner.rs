//! Spawner and wave scheduler
//!
//! Three cooperating sources feed the arena:
//! - an ambient trickle whose interval decays exponentially with run time
//! - numbered waves alternating between a break and an active burst
//! - lane timers dropping special weapons, allies and repairs
//!
//! Staggered wave spawns and boss arrivals are queued as [`Schedule`] entries
//! keyed on run time and consulted once per tick, so pausing freezes them for free.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::EdgeSide;
use super::state::{AdversaryKind, GameEvent, GamePhase, NotificationStyle, PickupKind, SimulationWorld};
use super::upgrades::{SpecialWeapon, Upgrade};
use crate::consts::*;

/// Deferred spawner work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Release the next adversary of a wave burst
    WaveSpawn { wave: u32, spawned: u32, total: u32 },
    /// Drop the boss of a boss wave at lane center
    BossSpawn { wave: u32 },
    /// Close an active wave and start the break
    WaveEnd { wave: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Scheduled {
    at: f32,
    task: Task,
}

/// Run-time keyed queue of pending tasks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    entries: Vec<Scheduled>,
}

impl Schedule {
    pub fn push(&mut self, at: f32, task: Task) {
        self.entries.push(Scheduled { at, task });
    }

    /// Remove and return every task due at `now`, earliest first.
    /// Equal times keep insertion order.
    pub fn take_due(&mut self, now: f32) -> Vec<Task> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.entries.retain(|s| {
            if s.at <= now {
                due.push(*s);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.at.total_cmp(&b.at));
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Countdown timers owned by the spawner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnerState {
    /// Milliseconds until the next ambient adversary
    pub ambient_timer_ms: f32,
    /// Current (or last) wave number, 0 before the first wave
    pub wave: u32,
    pub wave_active: bool,
    /// Seconds of break left before the next wave
    pub wave_break: f32,
    pub special_timer: f32,
    pub ally_timer: f32,
    pub repair_timer: f32,
}

impl Default for SpawnerState {
    fn default() -> Self {
        Self {
            ambient_timer_ms: 0.0,
            wave: 0,
            wave_active: false,
            wave_break: FIRST_WAVE_BREAK,
            special_timer: SPECIAL_WEAPON_INTERVAL,
            ally_timer: 0.0,
            repair_timer: HEAL_DROP_INTERVAL,
        }
    }
}

/// Ambient spawn interval (ms) at a given run time
pub fn ambient_interval_ms(run_time: f32) -> f32 {
    (BASE_SPAWN_INTERVAL_MS * SPAWN_DECAY.powf(run_time / 10.0)).max(SPAWN_FLOOR_MS)
}

/// Time-gated type roll for ambient spawns
pub fn ambient_kind(roll: f32, run_time: f32) -> AdversaryKind {
    let mut kind = AdversaryKind::Basic;
    if run_time > 60.0 && roll < 0.2 {
        kind = AdversaryKind::Fast;
    }
    if run_time > 120.0 && roll < 0.05 {
        kind = AdversaryKind::Tank;
    }
    kind
}

/// Wave-gated type roll for burst spawns
pub fn wave_kind(roll: f32, wave: u32) -> AdversaryKind {
    let mut kind = AdversaryKind::Basic;
    if wave > 2 && roll < 0.3 {
        kind = AdversaryKind::Fast;
    }
    if wave > 4 && roll < 0.1 {
        kind = AdversaryKind::Tank;
    }
    kind
}

/// Adversaries released by a wave
pub fn burst_size(wave: u32) -> u32 {
    5 + 5 * wave
}

/// Base gap (seconds) between staggered wave spawns
pub fn stagger_interval(wave: u32) -> f32 {
    (1.0 - 0.05 * wave as f32).max(0.2)
}

pub fn is_boss_wave(wave: u32) -> bool {
    wave > 0 && wave % BOSS_WAVE_EVERY == 0
}

/// Random lateral position inside the main band
fn spawn_x(world: &mut SimulationWorld) -> f32 {
    let half = world.arena.spawn_half_width();
    if half <= 0.0 {
        return 0.0;
    }
    world.rng.random_range(-half..=half)
}

/// Advance every spawner timer by `dt` seconds
pub fn run_timers(world: &mut SimulationWorld, dt: f32) {
    for task in world.schedule.take_due(world.run_time) {
        run_task(world, task);
    }

    run_ambient(world, dt);
    run_wave_cycle(world, dt);
    run_lane_drops(world, dt);
}

fn run_ambient(world: &mut SimulationWorld, dt: f32) {
    world.spawner.ambient_timer_ms -= dt * 1000.0 * world.level().spawn_mult;
    if world.spawner.ambient_timer_ms <= 0.0 {
        let roll = world.rng.random::<f32>();
        let kind = ambient_kind(roll, world.run_time);
        let x = spawn_x(world);
        world.spawn_adversary(kind, Vec2::new(x, SPAWN_Y));
        world.spawner.ambient_timer_ms = ambient_interval_ms(world.run_time);
    }
}

fn run_wave_cycle(world: &mut SimulationWorld, dt: f32) {
    if !world.spawner.wave_active && world.spawner.wave_break <= 0.0 {
        start_wave(world, world.spawner.wave + 1);
    }
    if !world.spawner.wave_active {
        world.spawner.wave_break -= dt;
    }
}

/// Open a wave: schedule its burst, its end and (every fifth wave) its boss
pub fn start_wave(world: &mut SimulationWorld, wave: u32) {
    world.spawner.wave = wave;
    world.spawner.wave_active = true;
    let now = world.run_time;

    world.notify(format!("WAVE {wave}\nSTART!"), NotificationStyle::Big);
    world.emit(GameEvent::WaveStarted { wave });
    log::info!("Wave {} started: {} adversaries", wave, burst_size(wave));

    if is_boss_wave(wave) {
        world.schedule.push(now + BOSS_DELAY, Task::BossSpawn { wave });
    }
    world.schedule.push(now + WAVE_DURATION, Task::WaveEnd { wave });

    // First of the burst goes out immediately
    run_task(
        world,
        Task::WaveSpawn {
            wave,
            spawned: 0,
            total: burst_size(wave),
        },
    );
}

fn wave_is_live(world: &SimulationWorld, wave: u32) -> bool {
    world.phase == GamePhase::Playing && world.spawner.wave_active && world.spawner.wave == wave
}

fn run_task(world: &mut SimulationWorld, task: Task) {
    match task {
        Task::WaveSpawn { wave, spawned, total } => {
            if spawned >= total || !wave_is_live(world, wave) {
                return;
            }
            let roll = world.rng.random::<f32>();
            let x = spawn_x(world);
            world.spawn_adversary(wave_kind(roll, wave), Vec2::new(x, SPAWN_Y));

            let spawned = spawned + 1;
            if spawned < total {
                let base = stagger_interval(wave);
                let gap = base + world.rng.random::<f32>() * base * 0.5;
                world
                    .schedule
                    .push(world.run_time + gap, Task::WaveSpawn { wave, spawned, total });
            }
        }
        Task::BossSpawn { wave } => {
            if !wave_is_live(world, wave) {
                return;
            }
            world.spawn_adversary(AdversaryKind::Boss, Vec2::new(0.0, SPAWN_Y));
            world.notify("BOSS\nINCOMING!", NotificationStyle::Big);
            world.emit(GameEvent::BossIncoming { wave });
            log::info!("Boss spawned for wave {}", wave);
        }
        Task::WaveEnd { wave } => {
            if world.spawner.wave != wave || !world.spawner.wave_active {
                return;
            }
            world.spawner.wave_active = false;
            world.spawner.wave_break = WAVE_BREAK;
            world.notify(format!("WAVE {wave}\nCOMPLETE!"), NotificationStyle::Big);
            world.emit(GameEvent::WaveCompleted { wave });
            log::info!("Wave {} complete", wave);
        }
    }
}

fn run_lane_drops(world: &mut SimulationWorld, dt: f32) {
    // Raw elapsed time: lane drops ignore the difficulty spawn multiplier
    world.spawner.special_timer -= dt;
    if world.spawner.special_timer <= 0.0 {
        if let Some(x) = world.arena.edge_lane_center(EdgeSide::Left) {
            let weapon = SpecialWeapon::roll(&mut world.rng);
            world.spawn_pickup(PickupKind::SpecialWeapon(weapon), Vec2::new(x, SPAWN_Y));
        }
        world.spawner.special_timer = SPECIAL_WEAPON_INTERVAL;
    }

    world.spawner.ally_timer -= dt;
    if world.spawner.ally_timer <= 0.0 {
        if let Some(x) = world.arena.edge_lane_center(EdgeSide::Right) {
            let strong = world.rng.random::<f32>() < STRONG_ALLY_CHANCE;
            world.spawn_pickup(PickupKind::Ally { strong }, Vec2::new(x, SPAWN_Y));
        }
        world.spawner.ally_timer = ALLY_INTERVAL_MIN + world.rng.random::<f32>() * ALLY_INTERVAL_JITTER;
    }

    world.spawner.repair_timer -= dt;
    if world.spawner.repair_timer <= 0.0 {
        world.spawn_pickup(PickupKind::Upgrade(Upgrade::Repair), Vec2::new(0.0, SPAWN_Y));
        world.spawner.repair_timer = HEAL_DROP_INTERVAL;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MetaProgress;
    use crate::sim::arena::{ArenaGeometry, ArenaLayout};
    use crate::sim::difficulty::Difficulty;

    fn playing_world(layout: ArenaLayout) -> SimulationWorld {
        let arena = ArenaGeometry::from_viewport(layout, 400.0, 800.0);
        let mut world = SimulationWorld::new(11, arena, MetaProgress::default());
        world.reset(Difficulty::EASIEST);
        world
    }

    /// Step spawner timers only, advancing run time like the orchestrator does
    fn step(world: &mut SimulationWorld, seconds: f32, dt: f32) {
        let steps = (seconds / dt).round() as u32;
        for _ in 0..steps {
            world.run_time += dt;
            run_timers(world, dt);
        }
    }

    #[test]
    fn test_ambient_interval_decays_to_floor() {
        assert_eq!(ambient_interval_ms(0.0), 1000.0);
        assert!(ambient_interval_ms(100.0) < 1000.0);
        assert_eq!(ambient_interval_ms(10_000.0), SPAWN_FLOOR_MS);
    }

    #[test]
    fn test_ambient_kind_is_time_gated() {
        assert_eq!(ambient_kind(0.01, 10.0), AdversaryKind::Basic);
        assert_eq!(ambient_kind(0.1, 61.0), AdversaryKind::Fast);
        assert_eq!(ambient_kind(0.01, 121.0), AdversaryKind::Tank);
        assert_eq!(ambient_kind(0.5, 500.0), AdversaryKind::Basic);
    }

    #[test]
    fn test_wave_kind_is_wave_gated() {
        assert_eq!(wave_kind(0.05, 1), AdversaryKind::Basic);
        assert_eq!(wave_kind(0.05, 3), AdversaryKind::Fast);
        assert_eq!(wave_kind(0.05, 5), AdversaryKind::Tank);
    }

    #[test]
    fn test_first_tick_spawns_ambient() {
        let mut world = playing_world(ArenaLayout::SingleLane);
        run_timers(&mut world, 0.016);
        assert_eq!(world.adversaries.len(), 1);
        let a = &world.adversaries.as_slice()[0];
        assert!(a.pos.x.abs() <= world.arena.spawn_half_width());
        assert_eq!(a.pos.y, SPAWN_Y);
    }

    #[test]
    fn test_first_wave_after_break() {
        let mut world = playing_world(ArenaLayout::ThreeLane);
        step(&mut world, 2.9, 0.1);
        assert_eq!(world.spawner.wave, 0);
        step(&mut world, 0.3, 0.1);
        assert_eq!(world.spawner.wave, 1);
        assert!(world.spawner.wave_active);
        assert!(world.events.contains(&GameEvent::WaveStarted { wave: 1 }));
    }

    #[test]
    fn test_wave_ends_and_breaks() {
        let mut world = playing_world(ArenaLayout::ThreeLane);
        start_wave(&mut world, 1);
        step(&mut world, WAVE_DURATION + 0.1, 0.1);
        assert!(!world.spawner.wave_active);
        assert!(world.events.contains(&GameEvent::WaveCompleted { wave: 1 }));
    }

    #[test]
    fn test_wave_burst_is_staggered_and_complete() {
        let mut world = playing_world(ArenaLayout::ThreeLane);
        // Silence the ambient source so only the burst counts
        world.spawner.ambient_timer_ms = f32::MAX;
        start_wave(&mut world, 1);
        assert_eq!(world.adversaries.len(), 1);
        step(&mut world, 0.5, 0.1);
        assert!(world.adversaries.len() < burst_size(1) as usize);
        step(&mut world, 20.0, 0.1);
        let burst = world
            .adversaries
            .iter()
            .filter(|a| a.kind != AdversaryKind::Boss)
            .count();
        assert_eq!(burst, burst_size(1) as usize);
    }

    #[test]
    fn test_boss_wave_spawns_one_boss_after_delay() {
        let mut world = playing_world(ArenaLayout::ThreeLane);
        world.spawner.ambient_timer_ms = f32::MAX;
        start_wave(&mut world, 5);
        let bosses = |w: &SimulationWorld| w.adversaries.iter().filter(|a| a.kind == AdversaryKind::Boss).count();
        assert_eq!(bosses(&world), 0);
        step(&mut world, 1.1, 0.1);
        assert_eq!(bosses(&world), 1);
        let boss = world.adversaries.iter().find(|a| a.kind == AdversaryKind::Boss).expect("boss");
        assert_eq!(boss.pos.x, 0.0);
        step(&mut world, 10.0, 0.1);
        assert_eq!(bosses(&world), 1);
    }

    #[test]
    fn test_staggered_spawns_stop_when_not_playing() {
        let mut world = playing_world(ArenaLayout::ThreeLane);
        world.spawner.ambient_timer_ms = f32::MAX;
        start_wave(&mut world, 2);
        world.phase = GamePhase::GameOver;
        step(&mut world, 10.0, 0.1);
        assert_eq!(world.adversaries.len(), 1);
    }

    #[test]
    fn test_edge_lane_drops_only_in_three_lane() {
        let mut three = playing_world(ArenaLayout::ThreeLane);
        step(&mut three, 10.5, 0.1);
        let left = three.arena.edge_lane_center(EdgeSide::Left).expect("left lane");
        assert!(three
            .pickups
            .iter()
            .any(|p| matches!(p.kind, PickupKind::SpecialWeapon(_)) && p.pos.x == left));
        assert!(three.pickups.iter().any(|p| matches!(p.kind, PickupKind::Ally { .. })));

        let mut single = playing_world(ArenaLayout::SingleLane);
        step(&mut single, 20.0, 0.1);
        assert!(single
            .pickups
            .iter()
            .all(|p| !matches!(p.kind, PickupKind::SpecialWeapon(_) | PickupKind::Ally { .. })));
    }

    #[test]
    fn test_repair_drop_on_interval() {
        let mut world = playing_world(ArenaLayout::SingleLane);
        step(&mut world, HEAL_DROP_INTERVAL + 0.2, 0.1);
        let repairs = world
            .pickups
            .iter()
            .filter(|p| p.kind == PickupKind::Upgrade(Upgrade::Repair))
            .count();
        assert_eq!(repairs, 1);
    }

    #[test]
    fn test_schedule_orders_by_time() {
        let mut schedule = Schedule::default();
        schedule.push(2.0, Task::WaveEnd { wave: 2 });
        schedule.push(1.0, Task::WaveEnd { wave: 1 });
        schedule.push(5.0, Task::WaveEnd { wave: 5 });
        let due = schedule.take_due(3.0);
        assert_eq!(due, vec![Task::WaveEnd { wave: 1 }, Task::WaveEnd { wave: 2 }]);
        assert_eq!(schedule.len(), 1);
    }
}
