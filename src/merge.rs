//! Descent, vertical cascade, lateral moves and the grace window.
//!
//! The engine owns the active slot. While a block falls it lives here, outside the grid; at
//! settle time it is written into the grid and the cascade runs from its cell. If the cascade
//! merged anything, the survivor becomes the grace focus: it stays in the grid, auto-descent
//! stops, and left/right may slide it or merge it into an equal neighbour until the grace
//! timer runs out.

use crate::event::{GameEvent, Ledger};
use crate::grid::{Block, BlockId, Grid, Position};
use crate::timer::{TimerHandle, TimerSlot};
use std::time::{Duration, Instant};
use tracing::debug;

/// Directional input. Nothing else reaches the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Left,
    Right,
    Down,
}

impl Move {
    /// Column delta for lateral moves.
    pub fn lateral(self) -> Option<isize> {
        match self {
            Self::Left => Some(-1),
            Self::Right => Some(1),
            Self::Down => None,
        }
    }
}

/// Who controls what right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// No active block (between a settle and the next spawn, or after game over).
    Idle,
    /// Airborne block; not in the grid.
    Falling(Block),
    /// Settled survivor of a merge, still steerable until `timer` fires.
    Grace { focus: Position, timer: TimerHandle },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Where the settled block (or what it merged into) ended up.
    pub survivor: Option<Position>,
    pub merged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descent {
    /// Nothing is falling.
    Idle,
    Moved,
    Settled(CascadeOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// Out of bounds, blocked, mismatched, or nothing to move.
    Ignored,
    Moved,
    /// Grace focus absorbed into its neighbour; the window restarted.
    Merged,
}

#[derive(Debug, Clone)]
pub struct MergeEngine {
    phase: Phase,
    grace: TimerSlot,
    grace_duration: Duration,
}

impl MergeEngine {
    pub fn new(grace_duration: Duration) -> Self {
        Self {
            phase: Phase::Idle,
            grace: TimerSlot::new(),
            grace_duration,
        }
    }

    #[inline]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[inline]
    pub fn grace_duration(&self) -> Duration {
        self.grace_duration
    }

    #[inline]
    pub fn is_grace_open(&self) -> bool {
        matches!(self.phase, Phase::Grace { .. })
    }

    pub fn has_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// The block under control: the falling one, or the grace focus in the grid.
    pub fn active_block<'a>(&'a self, grid: &'a Grid) -> Option<&'a Block> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Falling(block) => Some(block),
            Phase::Grace { focus, .. } => grid.get(focus.row, focus.col),
        }
    }

    /// Only the airborne block (not the grace focus).
    pub fn falling(&self) -> Option<&Block> {
        match &self.phase {
            Phase::Falling(block) => Some(block),
            _ => None,
        }
    }

    pub fn grace_remaining(&self, now: Instant) -> Option<Duration> {
        self.grace.remaining(now)
    }

    /// Hand a freshly spawned block to the active slot.
    pub fn begin_falling(&mut self, block: Block) {
        self.grace.cancel();
        self.phase = Phase::Falling(block);
    }

    /// Drop control of everything and disarm the grace timer.
    pub fn reset(&mut self) {
        self.grace.cancel();
        self.phase = Phase::Idle;
    }

    /// One fall step: move down if the cell below is free, otherwise settle and cascade.
    pub fn descend_or_settle(
        &mut self,
        grid: &mut Grid,
        ledger: &mut Ledger,
        now: Instant,
    ) -> Descent {
        let mut block = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Falling(block) => block,
            other => {
                self.phase = other;
                return Descent::Idle;
            }
        };

        let below = block.row + 1;
        if grid.is_vacant(below, block.col) {
            block.row = below;
            ledger.record(GameEvent::BlockMoved {
                id: block.id,
                row: block.row,
                col: block.col,
            });
            self.phase = Phase::Falling(block);
            return Descent::Moved;
        }

        let (row, col) = (block.row, block.col);
        debug!(id = %block.id, value = block.value, row, col, "settle");
        grid.set(row, col, Some(block));
        let outcome = Self::cascade(grid, row, col, ledger);
        if outcome.merged {
            if let Some(focus) = outcome.survivor {
                self.open_grace(grid, focus, now, ledger);
            }
        }
        Descent::Settled(outcome)
    }

    /// Walk straight down from (row, col): fall into gaps, merge into equal values, stop at a
    /// different value or the floor. Each merge doubles the lower block, credits the new value
    /// and continues with the lower block as the current one.
    pub fn cascade(grid: &mut Grid, row: usize, col: usize, ledger: &mut Ledger) -> CascadeOutcome {
        if grid.get(row, col).is_none() {
            return CascadeOutcome {
                survivor: None,
                merged: false,
            };
        }

        let mut row = row;
        let mut merged = false;
        while row + 1 < grid.rows() {
            let below = row + 1;
            let Some(current) = grid.get(row, col).map(|b| (b.id, b.value)) else {
                break;
            };
            match grid.get(below, col).map(|b| b.value) {
                None => {
                    grid.relocate(Position::new(row, col), Position::new(below, col));
                    ledger.record(GameEvent::BlockMoved {
                        id: current.0,
                        row: below,
                        col,
                    });
                }
                Some(value) if value == current.1 => {
                    grid.take(row, col);
                    Self::absorb(grid, current.0, Position::new(below, col), ledger);
                    merged = true;
                }
                Some(_) => break,
            }
            row = below;
        }

        CascadeOutcome {
            survivor: Some(Position::new(row, col)),
            merged,
        }
    }

    /// Route left/right/down to whichever rules apply in the current phase.
    pub fn shift(&mut self, mv: Move, grid: &mut Grid, ledger: &mut Ledger, now: Instant) -> Shift {
        let Some(dc) = mv.lateral() else {
            return Shift::Ignored;
        };
        match &mut self.phase {
            Phase::Idle => Shift::Ignored,
            Phase::Falling(block) => {
                let Some(col) = block.col.checked_add_signed(dc) else {
                    return Shift::Ignored;
                };
                if !grid.is_vacant(block.row, col) {
                    return Shift::Ignored;
                }
                block.col = col;
                ledger.record(GameEvent::BlockMoved {
                    id: block.id,
                    row: block.row,
                    col,
                });
                Shift::Moved
            }
            Phase::Grace { focus, .. } => {
                let focus = *focus;
                self.shift_focus(focus, dc, grid, ledger, now)
            }
        }
    }

    /// Grace-window lateral rule. A plain slide keeps the running timer; only a merge
    /// restarts it.
    fn shift_focus(
        &mut self,
        focus: Position,
        dc: isize,
        grid: &mut Grid,
        ledger: &mut Ledger,
        now: Instant,
    ) -> Shift {
        let Some(col) = focus.col.checked_add_signed(dc).filter(|&c| c < grid.cols()) else {
            return Shift::Ignored;
        };
        let target = Position::new(focus.row, col);
        let Some((id, value)) = grid.get(focus.row, focus.col).map(|b| (b.id, b.value)) else {
            return Shift::Ignored;
        };

        match grid.get(target.row, target.col).map(|b| b.value) {
            None => {
                grid.relocate(focus, target);
                ledger.record(GameEvent::BlockMoved {
                    id,
                    row: target.row,
                    col: target.col,
                });
                if let Phase::Grace { focus, .. } = &mut self.phase {
                    *focus = target;
                }
                Shift::Moved
            }
            Some(other) if other == value => {
                grid.take(focus.row, focus.col);
                Self::absorb(grid, id, target, ledger);
                debug!(absorbed = %id, row = target.row, col = target.col, "lateral merge");
                self.open_grace(grid, target, now, ledger);
                Shift::Merged
            }
            Some(_) => Shift::Ignored,
        }
    }

    /// Double the block at `into`, credit the new value, report `absorbed` as gone.
    fn absorb(grid: &mut Grid, absorbed: BlockId, into: Position, ledger: &mut Ledger) {
        let Some(survivor) = grid.get_mut(into.row, into.col) else {
            return;
        };
        survivor.value = survivor.value.saturating_mul(2);
        ledger.credit(survivor.value);
        ledger.record(GameEvent::BlockMerged {
            id: survivor.id,
            absorbed,
            value: survivor.value,
            row: into.row,
            col: into.col,
        });
    }

    /// Focus `at` and (re)start the grace timer, replacing any pending one.
    fn open_grace(&mut self, grid: &Grid, at: Position, now: Instant, ledger: &mut Ledger) {
        let timer = self.grace.schedule(now, self.grace_duration);
        self.phase = Phase::Grace { focus: at, timer };
        if let Some(block) = grid.get(at.row, at.col) {
            debug!(id = %block.id, value = block.value, "grace opened");
            ledger.record(GameEvent::GraceOpened { id: block.id });
        }
    }

    /// Live grace timer handle if it has run out at `now`.
    pub fn grace_due(&self, now: Instant) -> Option<TimerHandle> {
        self.grace.due(now)
    }

    /// Grace timer callback. Closes the window and releases the focus to the grid for good.
    /// Returns false for a stale handle, which changes nothing.
    pub fn expire_grace(&mut self, handle: TimerHandle, grid: &Grid, ledger: &mut Ledger) -> bool {
        let focus = match &self.phase {
            Phase::Grace { focus, timer } if *timer == handle => *focus,
            _ => return false,
        };
        if !self.grace.consume(handle) {
            return false;
        }
        self.phase = Phase::Idle;
        if let Some(block) = grid.get(focus.row, focus.col) {
            debug!(id = %block.id, "grace closed");
            ledger.record(GameEvent::GraceClosed { id: block.id });
        }
        true
    }
}
