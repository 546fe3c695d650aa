//! Game session: grid, active block, score, moves, clock and grace timer in one place.

use crate::clock::GameClock;
use crate::config::{ConfigError, Difficulty, GameConfig};
use crate::event::{GameEvent, GameOverReport, Ledger};
use crate::grid::{Block, BlockId, Grid};
use crate::merge::{Descent, MergeEngine, Move, Phase, Shift};
use crate::spawner::{RngDraws, SpawnOutcome, Spawner, UniformSource};
use crate::timer::TimerHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// On-demand report for the summary consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Sum of every settled block's value.
    pub total_value: u64,
    pub moves: u32,
    pub elapsed_secs: u64,
}

pub struct GameSession {
    config: GameConfig,
    grid: Grid,
    engine: MergeEngine,
    spawner: Spawner,
    clock: GameClock,
    draws: Box<dyn UniformSource>,
    ledger: Ledger,
    next_id: u64,
    moves: u32,
    started_at: Instant,
    game_over: Option<GameOverReport>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("grid", &self.grid)
            .field("phase", self.engine.phase())
            .field("score", &self.ledger.score())
            .field("moves", &self.moves)
            .field("game_over", &self.game_over)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// New session with spawns drawn from `config.seed` (or the OS when unset).
    pub fn new(config: GameConfig, now: Instant) -> Result<Self, ConfigError> {
        let draws: Box<dyn UniformSource> = match config.seed {
            Some(seed) => Box::new(RngDraws::seeded(seed)),
            None => Box::new(RngDraws::from_os()),
        };
        Self::with_draws(config, draws, now)
    }

    /// New session with an injected randomness source. The first block spawns immediately.
    pub fn with_draws(
        config: GameConfig,
        draws: Box<dyn UniformSource>,
        now: Instant,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut session = Self {
            grid: Grid::new(config.rows, config.cols),
            engine: MergeEngine::new(config.grace),
            spawner: Spawner,
            clock: GameClock::new(config.difficulty.fall_interval()),
            draws,
            ledger: Ledger::default(),
            next_id: 1,
            moves: 0,
            started_at: now,
            game_over: None,
            config,
        };
        info!(
            rows = session.config.rows,
            cols = session.config.cols,
            difficulty = session.config.difficulty.label(),
            "session started"
        );
        session.spawn();
        Ok(session)
    }

    /// Start over on the same board size: empty grid, zero score and moves, grace timer
    /// cancelled, clock baseline cleared. Difficulty is kept.
    pub fn reset(&mut self, now: Instant) {
        info!(score = self.ledger.score(), moves = self.moves, "session reset");
        self.engine.reset();
        self.clock.reset();
        self.grid.clear();
        self.ledger.reset();
        self.ledger.record(GameEvent::BoardCleared);
        self.moves = 0;
        self.started_at = now;
        self.game_over = None;
        self.spawn();
    }

    /// Advance timers to `now`: grace expiry first, then the fall clock. A turn that starts
    /// inside the grace window keeps the clock suspended even if the window closes in it, so
    /// the next block always gets a full interval at the top.
    pub fn update(&mut self, now: Instant) {
        if self.is_over() {
            return;
        }
        let suspended = self.engine.is_grace_open();
        if let Some(handle) = self.engine.grace_due(now) {
            self.on_grace_expired(handle);
        }
        if self.clock.poll(now, suspended) {
            self.fall_tick(now);
        }
    }

    /// One fall step for the active block. Does nothing during grace or after game over.
    pub fn fall_tick(&mut self, now: Instant) -> Descent {
        if self.is_over() {
            return Descent::Idle;
        }
        let descent = self.engine.descend_or_settle(&mut self.grid, &mut self.ledger, now);
        self.after_descent(descent);
        descent
    }

    /// Grace timer callback. Stale handles are ignored.
    pub fn on_grace_expired(&mut self, handle: TimerHandle) -> bool {
        if self.is_over() {
            return false;
        }
        let closed = self.engine.expire_grace(handle, &self.grid, &mut self.ledger);
        if closed {
            self.spawn();
        }
        closed
    }

    /// Apply one directional input. Returns false if the input was not accepted (game over,
    /// nothing active, or `down` during grace); accepted input counts as a move even when the
    /// board cannot change.
    pub fn handle(&mut self, mv: Move, now: Instant) -> bool {
        if self.is_over() || !self.engine.has_active() {
            return false;
        }
        match mv {
            Move::Left | Move::Right => {
                let shift = self.engine.shift(mv, &mut self.grid, &mut self.ledger, now);
                if shift == Shift::Merged {
                    debug!(score = self.ledger.score(), "lateral merge scored");
                }
            }
            Move::Down => {
                if self.engine.is_grace_open() {
                    return false;
                }
                let descent = self.engine.descend_or_settle(&mut self.grid, &mut self.ledger, now);
                self.after_descent(descent);
            }
        }
        self.moves += 1;
        true
    }

    fn after_descent(&mut self, descent: Descent) {
        if let Descent::Settled(outcome) = descent {
            if !outcome.merged {
                self.spawn();
            }
        }
    }

    fn spawn(&mut self) {
        let id = BlockId(self.next_id);
        match self.spawner.spawn_next(&self.grid, self.draws.as_mut(), id) {
            SpawnOutcome::Spawned(block) => {
                self.next_id += 1;
                self.ledger.record(GameEvent::BlockSpawned {
                    id: block.id,
                    value: block.value,
                    row: block.row,
                    col: block.col,
                });
                self.engine.begin_falling(block);
            }
            SpawnOutcome::Overflow { col } => {
                let report = GameOverReport::no_space(self.ledger.score());
                info!(col, score = report.score, moves = self.moves, "game over");
                self.engine.reset();
                self.ledger.record(GameEvent::GameOver(report.clone()));
                self.game_over = Some(report);
            }
        }
    }

    /// Board value, move count and whole seconds since start. No side effects.
    pub fn summary(&self, now: Instant) -> SessionSummary {
        SessionSummary {
            total_value: self.grid.total_value(),
            moves: self.moves,
            elapsed_secs: self.elapsed(now).as_secs(),
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// Change fall speed in place; the running interval restarts on the next tick.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
        self.clock.set_interval(difficulty.fall_interval());
        debug!(difficulty = difficulty.label(), "difficulty changed");
    }

    /// Events since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.ledger.drain()
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.ledger.score()
    }

    #[inline]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    #[inline]
    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    pub fn game_over_report(&self) -> Option<&GameOverReport> {
        self.game_over.as_ref()
    }

    pub fn phase(&self) -> &Phase {
        self.engine.phase()
    }

    /// Falling block or grace focus.
    pub fn active_block(&self) -> Option<&Block> {
        self.engine.active_block(&self.grid)
    }

    /// Airborne block only; it is not in the grid yet.
    pub fn falling_block(&self) -> Option<&Block> {
        self.engine.falling()
    }

    #[inline]
    pub fn in_grace(&self) -> bool {
        self.engine.is_grace_open()
    }

    pub fn grace_remaining(&self, now: Instant) -> Option<Duration> {
        self.engine.grace_remaining(now)
    }

    pub fn grace_duration(&self) -> Duration {
        self.engine.grace_duration()
    }

    /// Grid access for arranging positions in tests and tools.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}
