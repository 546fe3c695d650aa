//! Options injected into a session: board size, fall speed, grace length, seed.

use crate::grid::{DEFAULT_COLS, DEFAULT_ROWS};
use clap::ValueEnum;
use std::time::Duration;
use thiserror::Error;

/// Largest board side accepted; keeps the terminal layout inside `u16` cells.
pub const MAX_SIDE: usize = 64;

/// Grace window after a cascade merge.
pub const DEFAULT_GRACE: Duration = Duration::from_millis(1200);

/// Fall speed tiers. Expert is the fastest and the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Expert,
}

impl Difficulty {
    pub const ALL: [Self; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Expert];

    /// Time between fall ticks.
    pub fn fall_interval(self) -> Duration {
        Duration::from_millis(match self {
            Self::Easy => 500,
            Self::Medium => 300,
            Self::Hard => 200,
            Self::Expert => 120,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Expert => "Expert",
        }
    }

    /// Next tier, wrapping from Expert back to Easy.
    pub fn cycle(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard => Self::Expert,
            Self::Expert => Self::Easy,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board needs at least one row and one column (got {rows}x{cols})")]
    EmptyBoard { rows: usize, cols: usize },
    #[error("board is limited to {max}x{max} (got {rows}x{cols})")]
    TooLarge { rows: usize, cols: usize, max: usize },
    #[error("grace window must be longer than zero")]
    ZeroGrace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub difficulty: Difficulty,
    pub grace: Duration,
    /// Fixed seed for spawns; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            difficulty: Difficulty::default(),
            grace: DEFAULT_GRACE,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyBoard {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.rows > MAX_SIDE || self.cols > MAX_SIDE {
            return Err(ConfigError::TooLarge {
                rows: self.rows,
                cols: self.cols,
                max: MAX_SIDE,
            });
        }
        if self.grace.is_zero() {
            return Err(ConfigError::ZeroGrace);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_get_faster() {
        let intervals: Vec<_> = Difficulty::ALL.iter().map(|d| d.fall_interval()).collect();
        assert!(intervals.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(Difficulty::default().fall_interval(), Duration::from_millis(120));
    }

    #[test]
    fn test_cycle_visits_every_tier() {
        let mut d = Difficulty::Easy;
        for expected in [
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Expert,
            Difficulty::Easy,
        ] {
            d = d.cycle();
            assert_eq!(d, expected);
        }
    }

    #[test]
    fn test_validate() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
        let flat = GameConfig {
            rows: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            flat.validate(),
            Err(ConfigError::EmptyBoard { rows: 0, cols: 4 })
        );
        let rushed = GameConfig {
            grace: Duration::ZERO,
            ..GameConfig::default()
        };
        assert_eq!(rushed.validate(), Err(ConfigError::ZeroGrace));
    }

    #[test]
    fn test_validate_rejects_oversized_board() {
        let edge = GameConfig {
            rows: MAX_SIDE,
            cols: MAX_SIDE,
            ..GameConfig::default()
        };
        assert_eq!(edge.validate(), Ok(()));
        let wide = GameConfig {
            cols: 10_000,
            ..GameConfig::default()
        };
        assert_eq!(
            wide.validate(),
            Err(ConfigError::TooLarge {
                rows: 5,
                cols: 10_000,
                max: MAX_SIDE
            })
        );
    }
}
