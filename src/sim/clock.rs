//! Frame clock
//!
//! Turns raw frame timestamps into a clamped per-tick elapsed time. While the
//! simulation is not running the caller should `hold` instead of `frame`, so the
//! time spent in menus or paused never arrives as one giant step on resume.

use crate::consts::MAX_FRAME_DT;

#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Timestamp of the previous frame (milliseconds)
    last_ms: Option<f64>,
    /// Upper bound on a single step (seconds)
    max_dt: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self { last_ms: None, max_dt }
    }

    /// Elapsed seconds since the previous frame, clamped to `[0, max_dt]`
    pub fn frame(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt.clamp(0.0, self.max_dt)
    }

    /// Record the timestamp without producing elapsed time
    pub fn hold(&mut self, now_ms: f64) {
        self.last_ms = Some(now_ms);
    }
}
