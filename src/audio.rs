//! Audio cues
//!
//! The simulation only names cues; whatever plays them sits behind
//! [`AudioSink`] and must never block the tick.

use crate::settings::Settings;
use crate::sim::{GameEvent, LifeLoss, PickupKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player or ally fired
    Shoot,
    /// Projectile struck an adversary
    Hit,
    /// Adversary destroyed
    Explode,
    /// Health ran out or an adversary got through
    Damage,
    /// Upgrade, ally or special weapon collected
    Powerup,
    /// Coin collected
    Coin,
    /// Wave started
    WaveStart,
    /// Boss arrived
    Boss,
    /// Game over
    GameOver,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn from_event(event: &GameEvent) -> Option<SoundEffect> {
        match event {
            GameEvent::Shot => Some(SoundEffect::Shoot),
            GameEvent::Hit => Some(SoundEffect::Hit),
            GameEvent::Explosion { .. } => Some(SoundEffect::Explode),
            GameEvent::LifeLost {
                cause: LifeLoss::HealthDepleted | LifeLoss::Breach,
                ..
            } => Some(SoundEffect::Damage),
            GameEvent::PickupCaptured {
                kind: PickupKind::Coin(_),
            } => Some(SoundEffect::Coin),
            GameEvent::PickupCaptured { .. } => Some(SoundEffect::Powerup),
            GameEvent::WaveStarted { .. } => Some(SoundEffect::WaveStart),
            GameEvent::BossIncoming { .. } => Some(SoundEffect::Boss),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::SpecialExpired { .. } | GameEvent::WaveCompleted { .. } => None,
        }
    }

    /// Relative loudness
    pub fn gain(self) -> f32 {
        match self {
            SoundEffect::Shoot => 0.3,
            SoundEffect::Hit => 0.5,
            _ => 1.0,
        }
    }
}

/// Fire-and-forget cue player
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Discards every cue
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Writes cues to the log and keeps a tally (headless runs)
#[derive(Debug, Default)]
pub struct LogAudio {
    pub played: usize,
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.played += 1;
        match effect {
            SoundEffect::Shoot | SoundEffect::Hit => log::trace!("sfx {:?} @ {:.2}", effect, volume),
            _ => log::debug!("sfx {:?} @ {:.2}", effect, volume),
        }
    }
}

/// Volume and mute gate in front of a sink
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullAudio))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 0.5,
            muted: false,
        }
    }

    /// Copy volumes from settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume() * effect.gain();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// Play the cue for every event that has one
    pub fn play_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::from_event) {
            self.play(effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<(SoundEffect, f32)>>>);

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            self.0.borrow_mut().push((effect, volume));
        }
    }

    fn manager() -> (AudioManager, Rc<RefCell<Vec<(SoundEffect, f32)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (AudioManager::new(Box::new(Recorder(log.clone()))), log)
    }

    #[test]
    fn test_events_map_to_cues() {
        assert_eq!(
            SoundEffect::from_event(&GameEvent::PickupCaptured { kind: PickupKind::Coin(10) }),
            Some(SoundEffect::Coin)
        );
        assert_eq!(
            SoundEffect::from_event(&GameEvent::PickupCaptured {
                kind: PickupKind::Ally { strong: false }
            }),
            Some(SoundEffect::Powerup)
        );
        assert_eq!(SoundEffect::from_event(&GameEvent::WaveCompleted { wave: 1 }), None);
    }

    #[test]
    fn test_mute_silences() {
        let (mut audio, log) = manager();
        audio.set_muted(true);
        audio.play(SoundEffect::Explode);
        assert!(log.borrow().is_empty());
        audio.set_muted(false);
        audio.play(SoundEffect::Explode);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_volume_scales() {
        let (mut audio, log) = manager();
        audio.set_master_volume(1.0);
        audio.set_sfx_volume(0.5);
        audio.play_events(&[GameEvent::Shot, GameEvent::Explosion { kind: crate::sim::AdversaryKind::Basic }]);
        let log = log.borrow();
        assert_eq!(log[0], (SoundEffect::Shoot, 0.15));
        assert_eq!(log[1], (SoundEffect::Explode, 0.5));
    }
}
