//! Mergefall core: falling value blocks that merge on landing and, briefly, sideways.
//!
//! Everything here is presentation-free. Drive a [`GameSession`] with
//! [`GameSession::update`] and [`GameSession::handle`], then drain
//! [`GameEvent`]s to mirror the board.

pub mod clock;
pub mod config;
pub mod event;
pub mod game;
pub mod grid;
pub mod merge;
pub mod spawner;
pub mod timer;

pub use config::{ConfigError, DEFAULT_GRACE, Difficulty, GameConfig};
pub use event::{GameEvent, GameOverReport};
pub use game::{GameSession, SessionSummary};
pub use grid::{Block, BlockId, Grid, Position};
pub use merge::{CascadeOutcome, Descent, Move, Phase, Shift};
