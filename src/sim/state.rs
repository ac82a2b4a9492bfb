//! Game state and core simulation types
//!
//! Everything a run mutates lives in one owned [`SimulationWorld`] that each
//! stage of the tick receives explicitly.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::ArenaGeometry;
use super::difficulty::{Difficulty, DifficultyLevel};
use super::registry::{EntityId, Registry, Tracked};
use super::snapshot::HudSnapshot;
use super::spawner::{Schedule, SpawnerState};
use super::upgrades::{ActiveEffect, SpecialWeapon, Upgrade};
use crate::consts::*;
use crate::persistence::MetaProgress;

/// Top-level state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, difficulty selection
    Menu,
    /// Simulation running
    Playing,
    /// Run frozen mid-way
    Paused,
    /// Run ended, results showing
    GameOver,
    /// Meta-upgrade shop
    Shop,
    /// Preferences screen (entered from Menu or Paused)
    Settings,
}

/// Adversary archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdversaryKind {
    Basic,
    Fast,
    Tank,
    Boss,
}

impl AdversaryKind {
    /// Hit-points at run start on the easiest difficulty
    pub fn base_hp(self) -> f32 {
        match self {
            AdversaryKind::Basic => 20.0,
            AdversaryKind::Fast => 10.0,
            AdversaryKind::Tank => 100.0,
            AdversaryKind::Boss => 500.0,
        }
    }

    /// Hit-points gained per second of run time
    pub fn hp_per_second(self) -> f32 {
        match self {
            AdversaryKind::Basic => 2.0,
            AdversaryKind::Fast => 1.0,
            AdversaryKind::Tank => 5.0,
            AdversaryKind::Boss => 10.0,
        }
    }

    /// Descent speed (px/s)
    pub fn speed(self) -> f32 {
        match self {
            AdversaryKind::Basic => 80.0,
            AdversaryKind::Fast => 150.0,
            AdversaryKind::Tank => 40.0,
            AdversaryKind::Boss => 30.0,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            AdversaryKind::Basic => 15.0,
            AdversaryKind::Fast => 12.0,
            AdversaryKind::Tank => 25.0,
            AdversaryKind::Boss => 125.0,
        }
    }

    /// Score value
    pub fn reward(self) -> u32 {
        match self {
            AdversaryKind::Basic => 10,
            AdversaryKind::Fast => 15,
            AdversaryKind::Tank => 50,
            AdversaryKind::Boss => 250,
        }
    }

    /// Hit-points for a fresh spawn at `run_time` seconds
    pub fn hit_points(self, run_time: f32, level: &DifficultyLevel) -> f32 {
        (self.base_hp() + self.hp_per_second() * run_time.max(0.0)) * level.hp_mult
    }
}

/// A descending hostile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adversary {
    pub id: EntityId,
    pub kind: AdversaryKind,
    pub pos: Vec2,
    pub hp: f32,
    pub speed: f32,
    pub radius: f32,
    pub reward: u32,
    pub removed: bool,
}

impl Adversary {
    pub fn new(id: EntityId, kind: AdversaryKind, pos: Vec2, run_time: f32, level: &DifficultyLevel) -> Self {
        Self {
            id,
            kind,
            pos,
            hp: kind.hit_points(run_time, level),
            speed: kind.speed(),
            radius: kind.radius(),
            reward: kind.reward(),
            removed: false,
        }
    }

    /// Subtract hit-points, clamping at zero. Returns true only on the hit that
    /// takes it from alive to zero.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.hp <= 0.0 {
            return false;
        }
        self.hp = (self.hp - amount.max(0.0)).max(0.0);
        self.hp == 0.0
    }
}

impl Tracked for Adversary {
    fn id(&self) -> EntityId {
        self.id
    }
    fn is_removed(&self) -> bool {
        self.removed
    }
    fn flag_removed(&mut self) {
        self.removed = true;
    }
}

/// A shot from the player or an ally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec2,
    /// Travel direction (radians, screen space; -π/2 is straight up)
    pub angle: f32,
    pub speed: f32,
    pub damage: f32,
    /// Distinct adversaries this shot may damage
    pub pierce: u32,
    /// Adversaries already damaged by this shot
    pub struck: Vec<EntityId>,
    pub radius: f32,
    pub homing: bool,
    /// Fired under mega damage (presentation only)
    pub mega: bool,
    /// Bound homing target
    pub target: Option<EntityId>,
    pub removed: bool,
}

impl Projectile {
    pub fn new(id: EntityId, pos: Vec2, angle: f32, speed: f32, damage: f32, pierce: u32) -> Self {
        Self {
            id,
            pos,
            angle,
            speed,
            damage,
            pierce: pierce.max(1),
            struck: Vec::new(),
            radius: PROJECTILE_RADIUS,
            homing: false,
            mega: false,
            target: None,
            removed: false,
        }
    }

    pub fn has_struck(&self, id: EntityId) -> bool {
        self.struck.contains(&id)
    }

    pub fn pierce_spent(&self) -> bool {
        self.struck.len() >= self.pierce as usize
    }
}

impl Tracked for Projectile {
    fn id(&self) -> EntityId {
        self.id
    }
    fn is_removed(&self) -> bool {
        self.removed
    }
    fn flag_removed(&mut self) {
        self.removed = true;
    }
}

/// What a pickup grants on capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Upgrade(Upgrade),
    Coin(u32),
    Ally { strong: bool },
    SpecialWeapon(SpecialWeapon),
}

/// A collectible falling down a lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: EntityId,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Sticky once set
    pub magnetized: bool,
    pub removed: bool,
}

impl Pickup {
    pub fn new(id: EntityId, kind: PickupKind, pos: Vec2) -> Self {
        let radius = match kind {
            PickupKind::Coin(_) => COIN_PICKUP_RADIUS,
            _ => POWER_PICKUP_RADIUS,
        };
        Self {
            id,
            kind,
            pos,
            radius,
            magnetized: false,
            removed: false,
        }
    }
}

impl Tracked for Pickup {
    fn id(&self) -> EntityId {
        self.id
    }
    fn is_removed(&self) -> bool {
        self.removed
    }
    fn flag_removed(&mut self) {
        self.removed = true;
    }
}

/// Companion ship flying in formation around the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ally {
    pub pos: Vec2,
    pub strong: bool,
    pub cooldown: f32,
    pub fire_timer: f32,
    pub damage: f32,
    pub range: f32,
    /// Slot angle in the formation ring
    pub formation_angle: f32,
}

impl Ally {
    pub fn new(pos: Vec2, strong: bool) -> Self {
        Self {
            pos,
            strong,
            cooldown: if strong { 0.3 } else { 0.4 },
            fire_timer: 0.0,
            damage: if strong { 20.0 } else { 12.0 },
            range: ALLY_RANGE,
            formation_angle: 0.0,
        }
    }
}

/// Run-scoped multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub damage_mult: f32,
    pub fire_rate_mult: f32,
    pub move_speed_mult: f32,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            damage_mult: 1.0,
            fire_rate_mult: 1.0,
            move_speed_mult: 1.0,
        }
    }
}

/// Primary weapon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub cooldown: f32,
    pub fire_timer: f32,
    pub damage: f32,
    pub projectile_speed: f32,
    /// Shots per volley from run upgrades
    pub count: u32,
    /// Pierce from run upgrades
    pub pierce: u32,
    /// Shots added by active special weapons
    pub bonus_count: u32,
    /// Pierce added by active special weapons
    pub bonus_pierce: u32,
}

impl Weapon {
    pub fn new(damage_level: u32) -> Self {
        Self {
            cooldown: WEAPON_COOLDOWN,
            fire_timer: 0.0,
            damage: WEAPON_BASE_DAMAGE + damage_level as f32 * DAMAGE_PER_DAMAGE_LEVEL,
            projectile_speed: PROJECTILE_SPEED,
            count: 1,
            pierce: 1,
            bonus_count: 0,
            bonus_pierce: 0,
        }
    }

    /// Shots per volley including special-weapon bonuses
    pub fn shot_count(&self) -> u32 {
        self.count + self.bonus_count
    }

    /// Pierce including special-weapon bonuses
    pub fn shot_pierce(&self) -> u32 {
        self.pierce + self.bonus_pierce
    }

    /// Seconds between volleys at the given fire-rate multiplier
    pub fn interval(&self, fire_rate_mult: f32) -> f32 {
        (self.cooldown / fire_rate_mult.max(f32::EPSILON)).max(MIN_FIRE_INTERVAL)
    }
}

/// The player-controlled ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerShip {
    /// x is the lateral offset from lane center, y is fixed near the bottom
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub pickup_range: f32,
    pub stats: RunStats,
    pub weapon: Weapon,
    pub effects: Vec<ActiveEffect>,
    pub allies: Vec<Ally>,
}

impl PlayerShip {
    pub fn new(max_health_level: u32, damage_level: u32) -> Self {
        let max_hp = PLAYER_BASE_HP + max_health_level as f32 * HP_PER_HEALTH_LEVEL;
        Self {
            pos: Vec2::ZERO,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            hp: max_hp,
            max_hp,
            pickup_range: PICKUP_RANGE,
            stats: RunStats::default(),
            weapon: Weapon::new(damage_level),
            effects: Vec::new(),
            allies: Vec::new(),
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    pub fn has_effect(&self, weapon: SpecialWeapon) -> bool {
        self.effects.iter().any(|e| e.weapon == weapon)
    }
}

/// Visual flavour of a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Spark,
    Debris(AdversaryKind),
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    pub life: f32, // 0-1, decreases over time
    /// Life lost per 1/60 s
    pub decay: f32,
    pub size: f32,
}

/// How a notification is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationStyle {
    /// Small text floating above the ship
    Normal,
    /// Banner in the upper third of the screen
    Big,
}

/// Floating text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
    pub style: NotificationStyle,
    pub pos: Vec2,
    /// Seconds remaining
    pub life: f32,
}

/// Why a life was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeLoss {
    HealthDepleted,
    Breach,
}

/// Why an adversary left the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Hit-points reached zero
    Killed,
    /// Rammed the player
    Contact,
    /// Cleared when the player lost a heart
    Purged,
    /// Slipped past the defence line
    Breach,
}

/// Things that happened during a tick, drained by collaborators (audio, UI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Shot,
    Hit,
    Explosion { kind: AdversaryKind },
    LifeLost { cause: LifeLoss, lives: u32 },
    PickupCaptured { kind: PickupKind },
    SpecialExpired { weapon: SpecialWeapon },
    WaveStarted { wave: u32 },
    WaveCompleted { wave: u32 },
    BossIncoming { wave: u32 },
    GameOver { coins: u32, kills: u32, run_time: f32 },
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct SimulationWorld {
    pub seed: u64,
    pub rng: Pcg32,
    pub arena: ArenaGeometry,
    /// Fixed for the duration of a run
    pub difficulty: Difficulty,
    pub phase: GamePhase,
    /// Where the settings screen returns to
    pub settings_return: GamePhase,
    /// Seconds of simulated play this run
    pub run_time: f32,
    pub lives: u32,
    pub kills: u32,
    /// Currency earned this run
    pub coins_run: u32,
    /// Permanent progression record
    pub meta: MetaProgress,
    pub player: PlayerShip,
    pub adversaries: Registry<Adversary>,
    pub projectiles: Registry<Projectile>,
    pub pickups: Registry<Pickup>,
    pub particles: Vec<Particle>,
    pub notifications: Vec<Notification>,
    pub spawner: SpawnerState,
    pub schedule: Schedule,
    pub events: Vec<GameEvent>,
    pub hud: HudSnapshot,
    pub particle_cap: usize,
    /// Guards the one-time currency merge on game over
    pub currency_merged: bool,
    next_id: EntityId,
}

impl SimulationWorld {
    /// Create a world sitting at the menu
    pub fn new(seed: u64, arena: ArenaGeometry, meta: MetaProgress) -> Self {
        let mut world = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            arena,
            difficulty: Difficulty::EASIEST,
            phase: GamePhase::Menu,
            settings_return: GamePhase::Menu,
            run_time: 0.0,
            lives: STARTING_LIVES,
            kills: 0,
            coins_run: 0,
            player: PlayerShip::new(meta.upgrades.max_health, meta.upgrades.damage),
            meta,
            adversaries: Registry::new(),
            projectiles: Registry::new(),
            pickups: Registry::new(),
            particles: Vec::new(),
            notifications: Vec::new(),
            spawner: SpawnerState::default(),
            schedule: Schedule::default(),
            events: Vec::new(),
            hud: HudSnapshot::default(),
            particle_cap: 256,
            currency_merged: false,
            next_id: 1,
        };
        world.player.pos.y = world.arena.player_y();
        world
    }

    /// Reinitialise everything run-scoped and enter Playing
    pub fn reset(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.run_time = 0.0;
        self.lives = STARTING_LIVES;
        self.kills = 0;
        self.coins_run = 0;
        self.player = PlayerShip::new(self.meta.upgrades.max_health, self.meta.upgrades.damage);
        self.player.pos.y = self.arena.player_y();
        self.adversaries.clear();
        self.projectiles.clear();
        self.pickups.clear();
        self.particles.clear();
        self.notifications.clear();
        self.spawner = SpawnerState::default();
        self.schedule = Schedule::default();
        self.events.clear();
        self.currency_merged = false;
        self.next_id = 1;
        self.phase = GamePhase::Playing;
        self.hud = HudSnapshot::capture(self);
        log::info!(
            "Run started: {} (hp x{}, spawn x{})",
            self.difficulty.level().name,
            self.difficulty.level().hp_mult,
            self.difficulty.level().spawn_mult
        );
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn level(&self) -> &'static DifficultyLevel {
        self.difficulty.level()
    }

    /// Apply a new viewport, keeping the ship inside the new bounds
    pub fn resize(&mut self, arena: ArenaGeometry) {
        self.arena = arena;
        self.player.pos.y = arena.player_y();
        self.player.pos.x = arena.clamp_lateral(self.player.pos.x, self.player.width);
    }

    pub fn spawn_adversary(&mut self, kind: AdversaryKind, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let adversary = Adversary::new(id, kind, pos, self.run_time, self.level());
        self.adversaries.add(adversary);
        id
    }

    pub fn spawn_pickup(&mut self, kind: PickupKind, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.pickups.add(Pickup::new(id, kind, pos));
        id
    }

    pub fn spawn_projectile(&mut self, projectile: Projectile) {
        self.projectiles.add(projectile);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand queued events to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queue floating text above the ship
    pub fn notify(&mut self, text: impl Into<String>, style: NotificationStyle) {
        let pos = match style {
            NotificationStyle::Normal => self.player.pos - Vec2::new(0.0, 50.0),
            NotificationStyle::Big => Vec2::new(0.0, self.arena.height * 0.3),
        };
        self.notifications.push(Notification {
            text: text.into(),
            style,
            pos,
            life: NOTIFICATION_LIFE,
        });
    }

    /// Scatter particles, respecting the particle cap
    pub fn burst(&mut self, pos: Vec2, kind: ParticleKind, count: usize, max_speed: f32) {
        let room = self.particle_cap.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
            let speed = self.rng.random::<f32>() * max_speed;
            self.particles.push(Particle {
                pos,
                vel: crate::heading(angle) * speed,
                kind,
                life: 1.0,
                decay: self.rng.random_range(0.02..0.05),
                size: self.rng.random_range(2.0..6.0),
            });
        }
    }

    /// Score shown on the HUD
    pub fn score(&self) -> u64 {
        self.kills as u64 * 10 + self.run_time.max(0.0).floor() as u64 + self.spawner.wave as u64 * 50
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena::ArenaLayout;
    use crate::sim::difficulty::DIFFICULTY_LEVELS;

    #[test]
    fn test_basic_hp_at_start() {
        let hp = AdversaryKind::Basic.hit_points(0.0, &DIFFICULTY_LEVELS[0]);
        assert_eq!(hp, 20.0);
    }

    #[test]
    fn test_damage_clamps_and_reports_once() {
        let mut a = Adversary::new(1, AdversaryKind::Basic, Vec2::ZERO, 0.0, &DIFFICULTY_LEVELS[0]);
        assert!(a.take_damage(25.0));
        assert_eq!(a.hp, 0.0);
        assert!(!a.take_damage(5.0));
        assert_eq!(a.hp, 0.0);
    }

    #[test]
    fn test_partial_damage_does_not_kill() {
        let mut a = Adversary::new(1, AdversaryKind::Tank, Vec2::ZERO, 0.0, &DIFFICULTY_LEVELS[0]);
        assert!(!a.take_damage(30.0));
        assert_eq!(a.hp, 70.0);
    }

    #[test]
    fn test_weapon_interval_floor() {
        let w = Weapon::new(0);
        assert_eq!(w.interval(1.0), 0.5);
        assert_eq!(w.interval(100.0), MIN_FIRE_INTERVAL);
    }

    #[test]
    fn test_meta_levels_shape_ship() {
        let ship = PlayerShip::new(2, 3);
        assert_eq!(ship.max_hp, 140.0);
        assert_eq!(ship.weapon.damage, 21.0);
    }

    #[test]
    fn test_reset_clears_run() {
        let arena = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 400.0, 800.0);
        let mut world = SimulationWorld::new(1, arena, MetaProgress::default());
        world.spawn_adversary(AdversaryKind::Basic, Vec2::ZERO);
        world.kills = 4;
        world.reset(Difficulty::new(2));
        assert!(world.adversaries.is_empty());
        assert_eq!(world.kills, 0);
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.difficulty.index(), 2);
        assert_eq!(world.player.pos.y, arena.player_y());
    }

    #[test]
    fn test_burst_respects_cap() {
        let arena = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 400.0, 800.0);
        let mut world = SimulationWorld::new(1, arena, MetaProgress::default());
        world.particle_cap = 10;
        world.burst(Vec2::ZERO, ParticleKind::Spark, 50, 100.0);
        assert_eq!(world.particles.len(), 10);
    }
}
