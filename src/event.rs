//! What the core tells the renderer, and the running score the engine credits merges to.

use crate::grid::BlockId;

/// Terminal report handed to the game-over consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOverReport {
    pub title: String,
    pub message: String,
    pub score: u32,
}

impl GameOverReport {
    /// Spawn column already taken in the top row.
    pub fn no_space(score: u32) -> Self {
        Self {
            title: "No space".to_string(),
            message: format!("Top row full. Score: {}.", score),
            score,
        }
    }
}

/// State changes the renderer mirrors. The core never draws; it only reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    BlockSpawned {
        id: BlockId,
        value: u32,
        row: usize,
        col: usize,
    },
    BlockMoved {
        id: BlockId,
        row: usize,
        col: usize,
    },
    /// `id` survived with the doubled `value`; `absorbed` no longer exists.
    BlockMerged {
        id: BlockId,
        absorbed: BlockId,
        value: u32,
        row: usize,
        col: usize,
    },
    GraceOpened {
        id: BlockId,
    },
    GraceClosed {
        id: BlockId,
    },
    /// Every block is gone (session reset).
    BoardCleared,
    GameOver(GameOverReport),
}

/// Score plus the event outbox. Passed by reference into the engine so merges credit points
/// and report themselves in one place.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    score: u32,
    events: Vec<GameEvent>,
}

impl Ledger {
    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Add a merge result to the score. Saturates instead of wrapping.
    pub fn credit(&mut self, value: u32) {
        self.score = self.score.saturating_add(value);
    }

    pub fn record(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Zero the score and drop pending events.
    pub fn reset(&mut self) {
        self.score = 0;
        self.events.clear();
    }
}
