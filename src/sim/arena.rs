//! Arena geometry
//!
//! The play-field is a vertical channel centered on x = 0. Screen space is
//! used for y (0 at the top, growing downward), so adversaries descend toward
//! the player with positive y velocity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which lane bands the arena provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArenaLayout {
    /// One wide lane, no edge bands
    SingleLane,
    /// Main band flanked by a left and a right edge lane
    #[default]
    ThreeLane,
}

/// Left or right edge lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSide {
    Left,
    Right,
}

/// Lane boundaries derived from the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaGeometry {
    pub layout: ArenaLayout,
    pub width: f32,
    pub height: f32,
    /// Half-width of the main band
    pub main_half: f32,
    /// Width of each edge lane (0 for single lane)
    pub edge_width: f32,
    /// Number of whole columns in the main band
    pub columns: u32,
}

impl ArenaGeometry {
    /// Compute lanes for a viewport. Degenerate sizes clamp to the minimum band.
    pub fn from_viewport(layout: ArenaLayout, width: f32, height: f32) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        match layout {
            ArenaLayout::SingleLane => {
                let main_half = (width.min(SINGLE_LANE_MAX_WIDTH) / 2.0).max(MIN_MAIN_HALF);
                Self {
                    layout,
                    width,
                    height,
                    main_half,
                    edge_width: 0.0,
                    columns: ((main_half * 2.0) / COLUMN_WIDTH).floor().max(1.0) as u32,
                }
            }
            ArenaLayout::ThreeLane => {
                let max_main = MAX_MAIN_COLUMNS as f32 * COLUMN_WIDTH;
                let available = (width - EDGE_LANE_WIDTH * 2.0 - LANE_PADDING * 2.0).max(0.0);
                let main_half = (available.min(max_main) / 2.0).max(MIN_MAIN_HALF);
                let columns = ((main_half * 2.0) / COLUMN_WIDTH).floor() as u32;
                Self {
                    layout,
                    width,
                    height,
                    main_half,
                    edge_width: EDGE_LANE_WIDTH,
                    columns: columns.clamp(1, MAX_MAIN_COLUMNS),
                }
            }
        }
    }

    /// Outer half-width the player may occupy (main band plus edge lanes)
    pub fn outer_half(&self) -> f32 {
        self.main_half + self.edge_width
    }

    /// Lateral limits for a ship of the given width
    pub fn movement_bounds(&self, ship_width: f32) -> (f32, f32) {
        let half = (self.outer_half() - ship_width / 2.0).max(0.0);
        (-half, half)
    }

    /// Clamp a lateral position into the movement bounds
    pub fn clamp_lateral(&self, x: f32, ship_width: f32) -> f32 {
        let (min, max) = self.movement_bounds(ship_width);
        x.clamp(min, max)
    }

    /// Half-width of the band adversaries spawn into
    pub fn spawn_half_width(&self) -> f32 {
        (self.main_half - SPAWN_MARGIN).max(0.0)
    }

    /// Center of an edge lane, if this layout has one
    pub fn edge_lane_center(&self, side: EdgeSide) -> Option<f32> {
        if self.edge_width <= 0.0 {
            return None;
        }
        let center = self.main_half + self.edge_width / 2.0;
        Some(match side {
            EdgeSide::Left => -center,
            EdgeSide::Right => center,
        })
    }

    /// Fixed vertical position of the player ship
    pub fn player_y(&self) -> f32 {
        self.height - (self.height * 0.15).max(120.0)
    }

    /// Adversaries past this line have breached the defence
    pub fn breach_line(&self) -> f32 {
        self.height + OFFSCREEN_MARGIN
    }

    /// Whether a projectile at `pos` is still inside the arena
    pub fn contains_projectile(&self, pos: Vec2) -> bool {
        let half = (self.width / 2.0).max(self.outer_half());
        pos.y >= -OFFSCREEN_MARGIN && pos.y <= self.height + OFFSCREEN_MARGIN && pos.x.abs() <= half
    }

    /// Pickup fall speed for this layout
    pub fn pickup_fall_speed(&self) -> f32 {
        match self.layout {
            ArenaLayout::SingleLane => PICKUP_FALL_SPEED_SINGLE,
            ArenaLayout::ThreeLane => PICKUP_FALL_SPEED_THREE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_lane_wide_screen_caps_columns() {
        let arena = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 1920.0, 1080.0);
        assert_eq!(arena.main_half, 150.0);
        assert_eq!(arena.columns, 6);
        assert_eq!(arena.edge_lane_center(EdgeSide::Left), Some(-180.0));
        assert_eq!(arena.edge_lane_center(EdgeSide::Right), Some(180.0));
    }

    #[test]
    fn test_three_lane_narrow_screen() {
        // 360 - 120 - 40 = 200 available
        let arena = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 360.0, 640.0);
        assert_eq!(arena.main_half, 100.0);
        assert_eq!(arena.columns, 4);
        let (min, max) = arena.movement_bounds(PLAYER_WIDTH);
        assert_eq!(min, -140.0);
        assert_eq!(max, 140.0);
    }

    #[test]
    fn test_tiny_viewport_keeps_minimum_band() {
        let arena = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 10.0, 10.0);
        assert_eq!(arena.main_half, MIN_MAIN_HALF);
        assert!(arena.columns >= 1);
    }

    #[test]
    fn test_single_lane_has_no_edges() {
        let arena = ArenaGeometry::from_viewport(ArenaLayout::SingleLane, 1000.0, 800.0);
        assert_eq!(arena.main_half, 300.0);
        assert_eq!(arena.edge_lane_center(EdgeSide::Left), None);
        assert_eq!(arena.movement_bounds(PLAYER_WIDTH), (-280.0, 280.0));
    }

    #[test]
    fn test_player_y_keeps_clear_of_bottom() {
        let arena = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 400.0, 600.0);
        assert_eq!(arena.player_y(), 480.0);
        let tall = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 400.0, 2000.0);
        assert_eq!(tall.player_y(), 1700.0);
    }

    #[test]
    fn test_projectile_bounds() {
        let arena = ArenaGeometry::from_viewport(ArenaLayout::ThreeLane, 400.0, 600.0);
        assert!(arena.contains_projectile(Vec2::new(0.0, 300.0)));
        assert!(!arena.contains_projectile(Vec2::new(0.0, -60.0)));
        assert!(!arena.contains_projectile(Vec2::new(250.0, 300.0)));
        assert!(!arena.contains_projectile(Vec2::new(0.0, 700.0)));
    }
}
