//! Layout and drawing: board tiles, sidebar, merge pulses, summary and game-over overlays.

use crate::app::Screen;
use crate::theme::Theme;
use mergefall::{BlockId, GameEvent, GameSession, Position};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Terminal cells per board cell.
const TILE_W: u16 = 7;
const TILE_H: u16 = 3;
const SIDEBAR_WIDTH: u16 = 24;
/// Length of the flash on a tile that just merged.
const MERGE_PULSE_MS: u32 = 220;

/// A merge flash that follows its block.
struct Pulse {
    id: BlockId,
    at: Position,
    effect: Effect,
}

/// Renderer-side mirror of core events. Only presentation state lives here.
#[derive(Default)]
pub struct BoardView {
    pulses: Vec<Pulse>,
    last_frame: Option<Instant>,
}

impl BoardView {
    /// Apply core events: start pulses on merges, follow moves, detach absorbed blocks.
    pub fn observe(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::BlockMerged {
                    id,
                    absorbed,
                    row,
                    col,
                    ..
                } => {
                    self.pulses.retain(|p| p.id != *absorbed && p.id != *id);
                    self.pulses.push(Pulse {
                        id: *id,
                        at: Position::new(*row, *col),
                        effect: fx::fade_from(
                            Color::White,
                            Color::White,
                            (MERGE_PULSE_MS, Interpolation::QuadOut),
                        ),
                    });
                }
                GameEvent::BlockMoved { id, row, col } => {
                    for p in self.pulses.iter_mut().filter(|p| p.id == *id) {
                        p.at = Position::new(*row, *col);
                    }
                }
                GameEvent::BoardCleared => self.pulses.clear(),
                GameEvent::BlockSpawned { .. }
                | GameEvent::GraceOpened { .. }
                | GameEvent::GraceClosed { .. }
                | GameEvent::GameOver(_) => {}
            }
        }
    }

    fn frame_delta(&mut self, now: Instant) -> TfxDuration {
        let delta = self
            .last_frame
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(std::time::Duration::ZERO);
        self.last_frame = Some(now);
        TfxDuration::from_millis(delta.as_millis().min(u32::MAX as u128) as u32)
    }
}

/// Outer playfield size (border included) for a board.
fn playfield_size(rows: usize, cols: usize) -> (u16, u16) {
    (cols as u16 * TILE_W + 2, rows as u16 * TILE_H + 2)
}

fn tile_rect(board: Rect, pos: Position) -> Rect {
    Rect {
        x: board.x + pos.col as u16 * TILE_W,
        y: board.y + pos.row as u16 * TILE_H,
        width: TILE_W,
        height: TILE_H,
    }
    .intersection(board)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn draw(
    frame: &mut Frame,
    session: &GameSession,
    theme: &Theme,
    view: &mut BoardView,
    screen: Screen,
    show_summary: bool,
    now: Instant,
) {
    let area = frame.area();
    let grid = session.grid();
    let (pw, ph) = playfield_size(grid.rows(), grid.cols());
    let total_w = pw + SIDEBAR_WIDTH;

    // Center horizontally, then vertically
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph.max(18)),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let playfield_area = Rect {
        height: ph.min(inner[0].height),
        ..inner[0]
    };

    let board = draw_playfield(frame, session, theme, playfield_area);
    draw_pulses(frame, view, board, now);
    draw_sidebar(frame, session, theme, inner[1], now);

    if screen == Screen::GameOver {
        draw_game_over(frame, session, theme, area);
    } else if show_summary {
        draw_summary(frame, session, theme, area, now);
    }
}

/// Draw border, empty cells, settled tiles and the falling block. Returns the board rect.
fn draw_playfield(frame: &mut Frame, session: &GameSession, theme: &Theme, area: Rect) -> Rect {
    let title = if session.in_grace() {
        " Mergefall  | MERGE! "
    } else {
        " Mergefall "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, theme.title));
    let board = block.inner(area);
    block.render(area, frame.buffer_mut());

    let grid = session.grid();
    let focus = session
        .in_grace()
        .then(|| session.active_block().map(|b| b.position()))
        .flatten();

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let pos = Position::new(row, col);
            let rect = tile_rect(board, pos);
            match grid.get(row, col) {
                Some(b) => draw_tile(frame, theme, b.value, rect, focus == Some(pos)),
                None => draw_empty(frame, theme, rect),
            }
        }
    }
    if let Some(b) = session.falling_block() {
        draw_tile(frame, theme, b.value, tile_rect(board, b.position()), false);
    }
    board
}

fn draw_empty(frame: &mut Frame, theme: &Theme, rect: Rect) {
    let buf = frame.buffer_mut();
    let style = Style::default().fg(theme.div_line).bg(theme.bg);
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            buf[(x, y)].set_symbol(" ").set_style(style);
        }
    }
    if rect.width > 0 && rect.height > 0 {
        let mid = (rect.x + rect.width / 2, rect.y + rect.height / 2);
        buf[mid].set_symbol("·");
    }
}

fn draw_tile(frame: &mut Frame, theme: &Theme, value: u32, rect: Rect, focused: bool) {
    let bg = theme.tile_color(value);
    let fg = theme.tile_text(value);
    let tile = Block::default().style(Style::default().bg(bg));
    let tile = if focused {
        tile.borders(Borders::ALL)
            .border_style(Style::default().fg(theme.focus).bg(bg).bold())
    } else {
        tile
    };
    tile.render(rect, frame.buffer_mut());
    let label_row = Rect {
        y: rect.y + rect.height / 2,
        height: rect.height.min(1),
        ..rect
    };
    Paragraph::new(Line::from(Span::styled(
        value.to_string(),
        Style::default().fg(fg).bg(bg).bold(),
    )))
    .alignment(Alignment::Center)
    .render(label_row, frame.buffer_mut());
}

/// Run merge flashes over their tiles; finished ones are dropped.
fn draw_pulses(frame: &mut Frame, view: &mut BoardView, board: Rect, now: Instant) {
    let delta = view.frame_delta(now);
    for pulse in &mut view.pulses {
        let rect = tile_rect(board, pulse.at);
        frame.render_effect(&mut pulse.effect, rect, delta);
    }
    view.pulses.retain(|p| !p.effect.done());
}

fn draw_sidebar(frame: &mut Frame, session: &GameSession, theme: &Theme, area: Rect, now: Instant) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Stats
            Constraint::Length(1), // gap
            Constraint::Length(3), // Grace gauge
            Constraint::Length(1), // gap
            Constraint::Length(7), // Keys
        ])
        .split(area);

    // --- Stats: Score, Moves, Time, Difficulty ---
    let elapsed = session.elapsed(now).as_secs();
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(session.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Moves: ", title_style),
            Span::styled(session.moves().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Time: ", title_style),
            Span::styled(format!("{:02}:{:02}", elapsed / 60, elapsed % 60), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Speed: ", title_style),
            Span::styled(session.difficulty().label(), fg_style),
        ]),
    ];
    Paragraph::new(stats_lines)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[0], frame.buffer_mut());

    // --- Grace gauge ---
    let total = session.grace_duration().as_millis().max(1) as f64;
    let (ratio, label) = match session.grace_remaining(now) {
        Some(left) if session.in_grace() => {
            let ms = left.as_millis();
            ((ms as f64 / total).clamp(0.0, 1.0), format!("{} ms", ms))
        }
        _ => (0.0, "-".to_string()),
    };
    Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled("Grace", title_style)),
        )
        .gauge_style(Style::default().fg(theme.focus).bg(theme.bg))
        .ratio(ratio)
        .label(label)
        .render(chunks[2], frame.buffer_mut());

    // --- Keys ---
    let hint = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(k, title_style),
            Span::styled(what, Style::default().fg(theme.inactive_fg)),
        ])
    };
    Paragraph::new(vec![
        hint("←/→ ", "move / merge"),
        hint("↓   ", "drop a row"),
        hint("S   ", "summary"),
        hint("D   ", "speed"),
        hint("R Q ", "restart, quit"),
    ])
    .block(Block::default().borders(Borders::ALL).border_style(border_style))
    .render(chunks[4], frame.buffer_mut());
}

fn draw_summary(frame: &mut Frame, session: &GameSession, theme: &Theme, area: Rect, now: Instant) {
    let summary = session.summary(now);
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Session summary ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Block total: {} ", summary.total_value), fg)),
        Line::from(Span::styled(format!(" Moves: {} ", summary.moves), fg)),
        Line::from(Span::styled(format!(" Time: {} sec ", summary.elapsed_secs), fg)),
        Line::from(""),
        Line::from(Span::styled(" S: Close ", Style::default().fg(theme.inactive_fg))),
    ];
    let popup = centered(area, 30, lines.len() as u16 + 2);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .style(Style::default().bg(theme.bg))
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, session: &GameSession, theme: &Theme, area: Rect) {
    let Some(report) = session.game_over_report() else {
        return;
    };
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {} ", report.title),
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" {} ", report.message), fg)),
        Line::from(Span::styled(format!(" Score: {} ", report.score), fg)),
        Line::from(""),
        Line::from(Span::styled(" R: Restart    Q: Quit ", fg)),
        Line::from(""),
    ];
    let width = (report.message.chars().count() as u16 + 6).max(30);
    let popup = centered(area, width, lines.len() as u16 + 2);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Mergefall ", theme.title)),
        )
        .style(Style::default().bg(theme.bg))
        .render(popup, frame.buffer_mut());
}
