//! App: terminal init, main loop, timer polling and key handling.

use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, BoardView};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use mergefall::{GameConfig, GameSession};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tracing::info;

/// Frame budget (~60 FPS). Also bounds how late a fall tick or grace expiry can be noticed.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

pub struct App {
    theme: Theme,
    session: GameSession,
    screen: Screen,
    show_summary: bool,
    view: BoardView,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Result<Self> {
        let session = GameSession::new(config, Instant::now())?;
        Ok(Self {
            theme,
            session,
            screen: Screen::Playing,
            show_summary: false,
            view: BoardView::default(),
        })
    }

    fn restart(&mut self, now: Instant) {
        self.session.reset(now);
        self.screen = Screen::Playing;
        self.show_summary = false;
    }

    /// Returns false when the app should exit.
    fn apply_action(&mut self, action: Action, now: Instant) -> bool {
        match action {
            Action::Quit => return false,
            Action::Restart => self.restart(now),
            Action::Summary => self.show_summary = !self.show_summary,
            Action::CycleDifficulty => {
                let next = self.session.difficulty().cycle();
                self.session.set_difficulty(next);
            }
            Action::Move(mv) => {
                if self.screen == Screen::Playing {
                    self.session.handle(mv, now);
                }
            }
            Action::None => {}
        }
        true
    }

    /// Push timers forward and hand core events to the renderer.
    fn advance(&mut self, now: Instant) {
        self.session.update(now);
        let events = self.session.drain_events();
        self.view.observe(&events);
        if self.screen == Screen::Playing && self.session.is_over() {
            self.screen = Screen::GameOver;
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        if let Some(report) = self.session.game_over_report() {
            info!(score = report.score, "exited after game over");
        }
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.advance(now);

            terminal.draw(|f| {
                ui::draw(
                    f,
                    &self.session,
                    &self.theme,
                    &mut self.view,
                    self.screen,
                    self.show_summary,
                    now,
                );
            })?;

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        // Input is applied between timer turns, never inside one.
                        if !self.apply_action(key_to_action(key), Instant::now()) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
