//! Session: the screen state machine around a simulation world
//!
//! MENU → PLAYING ⇄ PAUSED, PLAYING → GAME_OVER, MENU ⇄ SHOP,
//! MENU/PAUSED ⇄ SETTINGS. Only PLAYING feeds elapsed time to the world;
//! every other state holds the clock so resuming never jumps.

use std::path::Path;

use crate::audio::{AudioManager, AudioSink};
use crate::persistence::{JsonStore, MetaProgress, PurchaseError, ShopItem};
use crate::settings::Settings;
use crate::sim::{
    ArenaGeometry, ArenaLayout, Difficulty, FrameClock, GameEvent, GamePhase, HudSnapshot, SimulationWorld, TickInput,
    tick,
};

const SAVE_FILE: &str = "save.json";
const SETTINGS_FILE: &str = "settings.json";

pub struct Session {
    pub world: SimulationWorld,
    pub settings: Settings,
    clock: FrameClock,
    audio: AudioManager,
    meta_store: Option<JsonStore>,
    settings_store: Option<JsonStore>,
    viewport: (f32, f32),
}

impl Session {
    /// In-memory session: nothing is read from or written to disk
    pub fn new(seed: u64, viewport: (f32, f32), settings: Settings, meta: MetaProgress, sink: Box<dyn AudioSink>) -> Self {
        let arena = ArenaGeometry::from_viewport(settings.layout, viewport.0, viewport.1);
        let mut world = SimulationWorld::new(seed, arena, meta);
        world.particle_cap = settings.max_particles();
        let mut audio = AudioManager::new(sink);
        audio.apply_settings(&settings);
        Self {
            world,
            settings,
            clock: FrameClock::default(),
            audio,
            meta_store: None,
            settings_store: None,
            viewport,
        }
    }

    /// Session backed by `save.json` and `settings.json` inside `dir`
    pub fn with_storage(seed: u64, viewport: (f32, f32), dir: &Path, sink: Box<dyn AudioSink>) -> Self {
        let meta_store = JsonStore::new(dir.join(SAVE_FILE));
        let settings_store = JsonStore::new(dir.join(SETTINGS_FILE));
        let settings = Settings::load(&settings_store);
        let meta = MetaProgress::load(&meta_store);
        let mut session = Self::new(seed, viewport, settings, meta, sink);
        session.meta_store = Some(meta_store);
        session.settings_store = Some(settings_store);
        session
    }

    pub fn phase(&self) -> GamePhase {
        self.world.phase
    }

    pub fn hud(&self) -> &HudSnapshot {
        &self.world.hud
    }

    pub fn meta(&self) -> &MetaProgress {
        &self.world.meta
    }

    /// Begin a fresh run from the menu or the results screen
    pub fn start_run(&mut self) -> bool {
        if !matches!(self.world.phase, GamePhase::Menu | GamePhase::GameOver) {
            return false;
        }
        let arena = ArenaGeometry::from_viewport(self.settings.layout, self.viewport.0, self.viewport.1);
        self.world.resize(arena);
        self.world.particle_cap = self.settings.max_particles();
        self.world.reset(self.settings.difficulty);
        self.clock = FrameClock::default();
        true
    }

    /// Advance one display frame
    pub fn frame(&mut self, now_ms: f64, input: &TickInput) -> &HudSnapshot {
        let dt = match self.world.phase {
            GamePhase::Playing => self.clock.frame(now_ms),
            _ => {
                self.clock.hold(now_ms);
                0.0
            }
        };
        tick(&mut self.world, input, dt);

        let events = self.world.drain_events();
        self.audio.play_events(&events);
        if events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })) {
            self.save_meta();
        }
        &self.world.hud
    }

    pub fn toggle_pause(&mut self) -> GamePhase {
        match self.world.phase {
            GamePhase::Playing => self.world.phase = GamePhase::Paused,
            GamePhase::Paused => self.world.phase = GamePhase::Playing,
            _ => {}
        }
        self.world.phase
    }

    /// Abandon the current run (or leave the results screen). Unbanked coins are lost.
    pub fn quit_to_menu(&mut self) -> bool {
        if !matches!(self.world.phase, GamePhase::Paused | GamePhase::GameOver) {
            return false;
        }
        self.world.phase = GamePhase::Menu;
        true
    }

    pub fn open_shop(&mut self) -> bool {
        if self.world.phase != GamePhase::Menu {
            return false;
        }
        self.world.phase = GamePhase::Shop;
        true
    }

    pub fn close_shop(&mut self) -> bool {
        if self.world.phase != GamePhase::Shop {
            return false;
        }
        self.world.phase = GamePhase::Menu;
        true
    }

    /// Buy the next level of a permanent upgrade
    pub fn buy_upgrade(&mut self, item: ShopItem) -> Result<u32, PurchaseError> {
        if self.world.phase != GamePhase::Shop {
            return Err(PurchaseError::ShopClosed);
        }
        let level = self.world.meta.purchase(item)?;
        log::info!("Bought {} level {} ({} coins left)", item.name(), level, self.world.meta.coins);
        self.save_meta();
        Ok(level)
    }

    pub fn open_settings(&mut self) -> bool {
        if !matches!(self.world.phase, GamePhase::Menu | GamePhase::Paused) {
            return false;
        }
        self.world.settings_return = self.world.phase;
        self.world.phase = GamePhase::Settings;
        true
    }

    /// Leave settings, returning to wherever they were opened from
    pub fn close_settings(&mut self) -> bool {
        if self.world.phase != GamePhase::Settings {
            return false;
        }
        self.world.phase = self.world.settings_return;
        self.world.particle_cap = self.settings.max_particles();
        self.audio.apply_settings(&self.settings);
        if let Some(store) = &self.settings_store {
            self.settings.save(store);
        }
        true
    }

    /// Step the difficulty selection; only allowed from the menu
    pub fn change_difficulty(&mut self, delta: i32) -> Option<Difficulty> {
        if self.world.phase != GamePhase::Menu {
            return None;
        }
        self.settings.difficulty = self.settings.difficulty.step(delta);
        let level = self.settings.difficulty.level();
        log::info!(
            "Difficulty {} - {} (HP x{}, Spawn x{})",
            level.name,
            level.description,
            level.hp_mult,
            level.spawn_mult
        );
        Some(self.settings.difficulty)
    }

    /// Pick the lane layout for the next run; only allowed from the menu
    pub fn set_layout(&mut self, layout: ArenaLayout) -> bool {
        if self.world.phase != GamePhase::Menu {
            return false;
        }
        self.settings.layout = layout;
        true
    }

    /// New viewport size; lanes are recomputed and the ship re-clamped
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
        let arena = ArenaGeometry::from_viewport(self.world.arena.layout, width, height);
        self.world.resize(arena);
    }

    /// Window focus change; mutes while unfocused if configured to
    pub fn set_focus(&mut self, focused: bool) {
        self.audio.set_muted(!focused && self.settings.mute_on_blur);
    }

    fn save_meta(&self) {
        let Some(store) = &self.meta_store else {
            return;
        };
        if let Err(e) = store.save(&self.world.meta) {
            log::warn!("Failed to save progress: {e}");
        }
    }
}
