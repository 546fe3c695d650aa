//! Mergefall: falling-block merge puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use mergefall::{DEFAULT_GRACE, Difficulty, GameConfig};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_tracing(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig {
        rows: args.rows,
        cols: args.cols,
        difficulty: args.difficulty,
        grace: Duration::from_millis(args.grace_ms),
        seed: args.seed,
    };
    let mut app = App::new(config, theme)?;
    app.run()?;
    Ok(())
}

/// Traces go to a file; the terminal belongs to the UI.
fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Falling-block merge puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "mergefall",
    version,
    about = "Falling-block merge puzzle in the terminal. Equal values merge on landing; after a merge you get a short window to merge sideways.",
    long_about = "Mergefall drops numbered blocks into a small board.\n\n\
        A block that lands on an equal value merges into it, and the result keeps merging \
        downward. After any merge the survivor stays under your control for a short grace \
        window: slide it left/right into an equal neighbour to merge again (which restarts \
        the window). The game ends when a new block has no room in the top row.\n\n\
        CONTROLS:\n  Left/Right (h/l)  Move / slide-merge    Down (j)  Drop one row\n  \
        S  Summary    D  Cycle difficulty    R  Restart    Q / Esc  Quit"
)]
pub struct Args {
    /// Fall speed: easy (500 ms), medium (300 ms), hard (200 ms), expert (120 ms).
    #[arg(short, long, default_value = "expert")]
    pub difficulty: Difficulty,

    /// Board height in rows (1-64).
    #[arg(long, default_value = "5", value_name = "ROWS")]
    pub rows: usize,

    /// Board width in columns (1-64).
    #[arg(long, default_value = "4", value_name = "COLS")]
    pub cols: usize,

    /// Grace window after a merge, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_GRACE.as_millis() as u64, value_name = "MS")]
    pub grace_ms: u64,

    /// Seed for block values and columns (same seed, same sequence).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write trace logs here (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["mergefall"]);
        assert_eq!(args.difficulty, Difficulty::Expert);
        assert_eq!((args.rows, args.cols), (5, 4));
        assert_eq!(args.grace_ms, 1200);
        assert_eq!(args.palette, Palette::Normal);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "mergefall", "-d", "easy", "--rows", "8", "--seed", "9", "--palette", "contrast",
        ]);
        assert_eq!(args.difficulty, Difficulty::Easy);
        assert_eq!(args.rows, 8);
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.palette, Palette::HighContrast);
    }
}
