//! Difficulty table
//!
//! Selected from the menu before a run; the run keeps its copy untouched.

use serde::{Deserialize, Serialize};

/// One row of the difficulty table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifficultyLevel {
    pub name: &'static str,
    pub description: &'static str,
    /// Multiplies adversary hit-points
    pub hp_mult: f32,
    /// Multiplies how fast the ambient spawn timer drains
    pub spawn_mult: f32,
}

pub const DIFFICULTY_LEVELS: [DifficultyLevel; 6] = [
    DifficultyLevel { name: "LEVEL 1", description: "Easiest", hp_mult: 1.0, spawn_mult: 1.0 },
    DifficultyLevel { name: "LEVEL 2", description: "Easy", hp_mult: 1.2, spawn_mult: 1.5 },
    DifficultyLevel { name: "LEVEL 3", description: "Normal", hp_mult: 1.5, spawn_mult: 2.2 },
    DifficultyLevel { name: "LEVEL 4", description: "Hard", hp_mult: 2.5, spawn_mult: 4.0 },
    DifficultyLevel { name: "LEVEL 5", description: "Expert", hp_mult: 4.0, spawn_mult: 6.0 },
    DifficultyLevel { name: "LEVEL 6", description: "INSANE", hp_mult: 8.0, spawn_mult: 12.0 },
];

/// Index into [`DIFFICULTY_LEVELS`], always in range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "usize", into = "usize")]
pub struct Difficulty(usize);

impl Difficulty {
    pub const EASIEST: Difficulty = Difficulty(0);

    /// Out-of-range indices clamp to the nearest level
    pub fn new(index: usize) -> Self {
        Self(index.min(DIFFICULTY_LEVELS.len() - 1))
    }

    /// Step up or down the table, clamping at either end
    pub fn step(self, delta: i32) -> Self {
        let index = (self.0 as i64 + delta as i64).max(0) as usize;
        Self::new(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn level(self) -> &'static DifficultyLevel {
        &DIFFICULTY_LEVELS[self.0]
    }
}

impl From<usize> for Difficulty {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

impl From<Difficulty> for usize {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_clamps() {
        assert_eq!(Difficulty::new(42).index(), 5);
        assert_eq!(Difficulty::new(3).level().name, "LEVEL 4");
    }

    #[test]
    fn test_step_clamps_both_ends() {
        assert_eq!(Difficulty::EASIEST.step(-1), Difficulty::EASIEST);
        assert_eq!(Difficulty::new(5).step(1).index(), 5);
        assert_eq!(Difficulty::new(2).step(1).index(), 3);
    }

    #[test]
    fn test_table_is_monotonic() {
        for pair in DIFFICULTY_LEVELS.windows(2) {
            assert!(pair[1].hp_mult >= pair[0].hp_mult);
            assert!(pair[1].spawn_mult >= pair[0].spawn_mult);
        }
    }

    #[test]
    fn test_deserialize_out_of_range() {
        let d: Difficulty = serde_json::from_str("17").expect("number");
        assert_eq!(d.index(), 5);
    }
}
