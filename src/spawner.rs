//! Next-block policy: value from board progress, uniform column, top-row overflow.

use crate::grid::{Block, BlockId, Grid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Once the board holds a block at least this large, 8s join the spawn pool.
pub const HIGH_TIER_THRESHOLD: u32 = 128;
/// Chance of a 2 (else 4) below the high tier.
const TWO_PROBABILITY: f64 = 0.9;
const HIGH_TIER_VALUES: [u32; 3] = [2, 4, 8];

/// Uniform draws in `[0, 1)`.
pub trait UniformSource {
    fn next_unit(&mut self) -> f64;
}

/// `StdRng`-backed draws; seedable for reproducible games.
#[derive(Debug, Clone)]
pub struct RngDraws {
    rng: StdRng,
}

impl RngDraws {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl UniformSource for RngDraws {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted. Used to script spawns.
/// An empty script draws 0.0 every time.
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedDraws {
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        Self {
            draws: draws.into(),
            cursor: 0,
        }
    }
}

impl UniformSource for ScriptedDraws {
    fn next_unit(&mut self) -> f64 {
        let u = self
            .draws
            .get(self.cursor % self.draws.len().max(1))
            .copied()
            .unwrap_or(0.0);
        self.cursor += 1;
        u
    }
}

/// Result of asking for the next block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned(Block),
    /// The chosen top-row column is taken: game over.
    Overflow { col: usize },
}

/// Map a draw onto `0..len`, guarding against draws at or past 1.0.
#[inline]
fn pick_index(u: f64, len: usize) -> usize {
    ((u * len as f64).floor() as usize).min(len.saturating_sub(1))
}

/// Value for the next block given the largest value on the board.
pub fn choose_value(max_on_board: u32, u: f64) -> u32 {
    if max_on_board >= HIGH_TIER_THRESHOLD {
        HIGH_TIER_VALUES[pick_index(u, HIGH_TIER_VALUES.len())]
    } else if u < TWO_PROBABILITY {
        2
    } else {
        4
    }
}

/// Entry column; uniform over all columns regardless of occupancy.
pub fn choose_column(cols: usize, u: f64) -> usize {
    pick_index(u, cols)
}

/// Decides value and column for each new active block. Value is drawn before column.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spawner;

impl Spawner {
    pub fn spawn_next(
        &self,
        grid: &Grid,
        draws: &mut dyn UniformSource,
        id: BlockId,
    ) -> SpawnOutcome {
        let max_on_board = grid.max_value();
        let value = choose_value(max_on_board, draws.next_unit());
        let col = choose_column(grid.cols(), draws.next_unit());

        if grid.get(0, col).is_some() {
            debug!(col, "spawn column occupied");
            return SpawnOutcome::Overflow { col };
        }
        debug!(%id, value, col, max_on_board, "spawned block");
        SpawnOutcome::Spawned(Block::new(id, value, 0, col))
    }
}
