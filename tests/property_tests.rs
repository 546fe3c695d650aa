//! Random move/tick sequences against board and score invariants.

use mergefall::{GameConfig, GameEvent, GameSession, Move};
use quickcheck_macros::quickcheck;
use std::time::{Duration, Instant};

enum Step {
    Input(Move),
    Wait(Duration),
}

fn step(op: u8) -> Step {
    match op % 6 {
        0 => Step::Input(Move::Left),
        1 => Step::Input(Move::Right),
        2 => Step::Input(Move::Down),
        3 | 4 => Step::Wait(Duration::from_millis(130)),
        _ => Step::Wait(Duration::from_millis(1300)),
    }
}

/// Every stored block sits where its cell is and holds a power of two.
fn board_is_consistent(s: &GameSession) -> bool {
    let grid = s.grid();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            if let Some(b) = grid.get(row, col) {
                if b.row != row || b.col != col || b.value < 2 || !b.value.is_power_of_two() {
                    return false;
                }
            }
        }
    }
    match s.falling_block() {
        Some(b) => grid.in_bounds(b.row, b.col) && grid.is_vacant(b.row, b.col),
        None => true,
    }
}

fn run(seed: u64, ops: &[u8]) -> bool {
    let mut now = Instant::now();
    let config = GameConfig {
        seed: Some(seed),
        ..GameConfig::default()
    };
    let Ok(mut s) = GameSession::new(config, now) else {
        return false;
    };
    s.drain_events();
    s.update(now);

    for &op in ops {
        let before = (s.score(), s.moves());
        match step(op) {
            Step::Input(mv) => {
                s.handle(mv, now);
            }
            Step::Wait(d) => {
                now += d;
                s.update(now);
            }
        }
        let merged: u32 = s
            .drain_events()
            .iter()
            .filter_map(|e| match e {
                GameEvent::BlockMerged { value, .. } => Some(*value),
                _ => None,
            })
            .sum();
        if s.score() < before.0 || s.score() - before.0 != merged {
            return false;
        }
        if s.moves() < before.1 || !board_is_consistent(&s) {
            return false;
        }
    }
    true
}

#[quickcheck]
fn prop_board_and_score_stay_consistent(seed: u64, ops: Vec<u8>) -> bool {
    run(seed, &ops)
}

#[quickcheck]
fn prop_game_over_freezes_session(seed: u64, ops: Vec<u8>) -> bool {
    let mut now = Instant::now();
    let config = GameConfig {
        seed: Some(seed),
        ..GameConfig::default()
    };
    let Ok(mut s) = GameSession::new(config, now) else {
        return false;
    };
    // Drop straight down until the top row fills.
    for _ in 0..500 {
        if s.is_over() {
            break;
        }
        if !s.handle(Move::Down, now) {
            now += Duration::from_millis(1300);
            s.update(now);
        }
    }
    if !s.is_over() {
        return true;
    }
    let frozen = (s.score(), s.moves(), s.grid().clone());
    for &op in &ops {
        match step(op) {
            Step::Input(mv) => {
                if s.handle(mv, now) {
                    return false;
                }
            }
            Step::Wait(d) => {
                now += d;
                s.update(now);
            }
        }
    }
    (s.score(), s.moves(), s.grid().clone()) == frozen && s.falling_block().is_none()
}
