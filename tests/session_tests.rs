//! Session scenarios driven through the public API with scripted draws and explicit time.

use mergefall::spawner::ScriptedDraws;
use mergefall::{
    Block, BlockId, Descent, Difficulty, GameConfig, GameEvent, GameSession, Move, Phase,
};
use std::time::{Duration, Instant};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// 5x4 board, expert speed (120 ms), every spawn a 2 in column 0.
fn column_zero_twos(t0: Instant) -> GameSession {
    GameSession::with_draws(
        GameConfig::default(),
        Box::new(ScriptedDraws::new(vec![0.0, 0.0])),
        t0,
    )
    .unwrap()
}

#[test]
fn test_default_config_is_five_by_four_expert() {
    let config = GameConfig::default();
    assert_eq!((config.rows, config.cols), (5, 4));
    assert_eq!(config.difficulty, Difficulty::Expert);
    assert_eq!(config.grace, ms(1200));
}

#[test]
fn test_block_falls_to_floor_then_next_spawns() {
    let t0 = Instant::now();
    let mut s = column_zero_twos(t0);
    s.update(t0); // baseline

    for k in 1..=4 {
        s.update(t0 + ms(121 * k));
        assert_eq!(s.falling_block().map(|b| b.row), Some(k as usize));
    }
    assert_eq!(s.grid().occupied(), 0);

    // Fifth tick: nothing below row 4, settle without merge, next block right away.
    s.update(t0 + ms(121 * 5));
    let settled = s.grid().get(4, 0).unwrap();
    assert_eq!((settled.id, settled.value), (BlockId(1), 2));
    let next = s.falling_block().unwrap();
    assert_eq!((next.id, next.row, next.col), (BlockId(2), 0, 0));
    assert_eq!(s.score(), 0);
    assert!(!s.in_grace());
}

#[test]
fn test_clock_needs_strictly_more_than_interval() {
    let t0 = Instant::now();
    let mut s = column_zero_twos(t0);
    s.update(t0);
    s.update(t0 + ms(120));
    assert_eq!(s.falling_block().map(|b| b.row), Some(0));
    s.update(t0 + ms(121));
    assert_eq!(s.falling_block().map(|b| b.row), Some(1));
}

#[test]
fn test_landing_merge_opens_grace_and_expiry_spawns() {
    let t0 = Instant::now();
    let mut s = column_zero_twos(t0);
    s.grid_mut().set(4, 0, Some(Block::new(BlockId(90), 2, 4, 0)));

    for _ in 0..3 {
        assert!(s.handle(Move::Down, t0));
    }
    assert!(s.handle(Move::Down, t0));
    assert!(s.in_grace());
    assert_eq!(s.score(), 4);
    assert_eq!(s.grid().get(4, 0).map(|b| b.value), Some(4));
    assert!(s.falling_block().is_none());

    // Down is refused during grace and not counted.
    assert!(!s.handle(Move::Down, t0 + ms(10)));
    assert_eq!(s.moves(), 4);

    s.update(t0 + ms(1199));
    assert!(s.in_grace());
    s.update(t0 + ms(1200));
    assert!(!s.in_grace());
    assert_eq!(s.falling_block().map(|b| (b.row, b.col)), Some((0, 0)));

    let events = s.drain_events();
    assert!(events.contains(&GameEvent::GraceOpened { id: BlockId(90) }));
    assert!(events.contains(&GameEvent::GraceClosed { id: BlockId(90) }));
}

#[test]
fn test_block_after_grace_waits_full_interval_when_polled_rarely() {
    let t0 = Instant::now();
    let mut rare = column_zero_twos(t0);
    let mut frequent = column_zero_twos(t0);
    for s in [&mut rare, &mut frequent] {
        s.grid_mut().set(4, 0, Some(Block::new(BlockId(90), 2, 4, 0)));
        s.update(t0);
        // Rows 1..3, then the fourth tick lands on the 2 and opens grace.
        for k in 1..=4 {
            s.update(t0 + ms(121 * k));
        }
        assert!(s.in_grace());
    }
    let opened = t0 + ms(121 * 4);
    let expiry = opened + ms(1200);

    let mut now = opened;
    while now < expiry {
        now += ms(16);
        frequent.update(now.min(expiry));
    }
    rare.update(expiry);

    for s in [&rare, &frequent] {
        assert!(!s.in_grace());
        assert_eq!(s.falling_block().map(|b| b.row), Some(0));
    }
    rare.update(expiry + ms(120));
    assert_eq!(rare.falling_block().map(|b| b.row), Some(0));
    rare.update(expiry + ms(121));
    assert_eq!(rare.falling_block().map(|b| b.row), Some(1));
}

#[test]
fn test_lateral_merge_restarts_grace_window() {
    let t0 = Instant::now();
    let mut s = column_zero_twos(t0);
    s.grid_mut().set(4, 0, Some(Block::new(BlockId(90), 2, 4, 0)));
    s.grid_mut().set(4, 1, Some(Block::new(BlockId(91), 4, 4, 1)));
    for _ in 0..4 {
        s.handle(Move::Down, t0);
    }
    assert!(s.in_grace());
    let first = match s.phase() {
        Phase::Grace { timer, .. } => *timer,
        other => panic!("expected grace, got {other:?}"),
    };

    s.update(t0 + ms(1199));
    assert!(s.handle(Move::Right, t0 + ms(1199)));
    assert_eq!(s.score(), 4 + 8);
    assert_eq!(s.grid().get(4, 1).map(|b| (b.id, b.value)), Some((BlockId(91), 8)));
    assert!(s.grid().get(4, 0).is_none());

    // The replaced timer is inert.
    assert!(!s.on_grace_expired(first));
    assert!(s.in_grace());

    s.update(t0 + ms(2398));
    assert!(s.in_grace());
    s.update(t0 + ms(2399));
    assert!(!s.in_grace());
    assert!(s.falling_block().is_some());
    assert_eq!(s.moves(), 5);
}

#[test]
fn test_grace_slide_keeps_deadline() {
    let t0 = Instant::now();
    let mut s = column_zero_twos(t0);
    s.grid_mut().set(4, 0, Some(Block::new(BlockId(90), 2, 4, 0)));
    for _ in 0..4 {
        s.handle(Move::Down, t0);
    }
    assert!(s.handle(Move::Right, t0 + ms(1000)));
    assert_eq!(s.grid().get(4, 1).map(|b| b.value), Some(4));
    assert!(s.grid().get(4, 0).is_none());
    assert_eq!(s.active_block().map(|b| b.position()), s.grid().get(4, 1).map(|b| b.position()));

    s.update(t0 + ms(1200));
    assert!(!s.in_grace());
}

#[test]
fn test_cascade_chain_scores_every_merge() {
    let t0 = Instant::now();
    let mut s = GameSession::with_draws(
        GameConfig::default(),
        Box::new(ScriptedDraws::new(vec![0.0, 0.6])),
        t0,
    )
    .unwrap();
    s.grid_mut().set(4, 2, Some(Block::new(BlockId(80), 4, 4, 2)));
    s.grid_mut().set(3, 2, Some(Block::new(BlockId(81), 2, 3, 2)));
    // Rows 0 -> 2, then the tick lands on the 2 at row 3.
    for _ in 0..2 {
        s.handle(Move::Down, t0);
    }
    assert!(matches!(s.fall_tick(t0), Descent::Settled(o) if o.merged));
    assert_eq!(s.score(), 4 + 8);
    assert_eq!(s.grid().get(4, 2).map(|b| (b.id, b.value)), Some((BlockId(80), 8)));
    assert_eq!(s.grid().occupied(), 1);
}

#[test]
fn test_restart_after_game_over() {
    let t0 = Instant::now();
    let mut s = column_zero_twos(t0);
    s.grid_mut().set(1, 0, Some(Block::new(BlockId(99), 16, 1, 0)));
    s.handle(Move::Down, t0);
    assert!(s.is_over());

    s.reset(t0 + ms(50));
    assert!(!s.is_over());
    assert_eq!((s.score(), s.moves()), (0, 0));
    assert_eq!(s.grid().occupied(), 0);
    assert!(s.falling_block().is_some());
}

#[test]
fn test_seeded_sessions_repeat() {
    let t0 = Instant::now();
    let config = GameConfig {
        seed: Some(7),
        ..GameConfig::default()
    };
    let mut a = GameSession::new(config.clone(), t0).unwrap();
    let mut b = GameSession::new(config, t0).unwrap();
    for k in 0..40 {
        let now = t0 + ms(121 * k);
        a.update(now);
        b.update(now);
    }
    assert_eq!(a.grid(), b.grid());
    assert_eq!(a.score(), b.score());
    assert_eq!(a.drain_events(), b.drain_events());
}

#[test]
fn test_invalid_config_is_rejected() {
    let t0 = Instant::now();
    let config = GameConfig {
        rows: 0,
        ..GameConfig::default()
    };
    assert!(GameSession::new(config, t0).is_err());
}
