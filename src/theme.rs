//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Number of tile colour classes: 2, 4, ... 8192. Larger values reuse the last one.
pub const TILE_CLASSES: usize = 13;

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// One Dark based tile ramp, cool to warm.
const ONEDARK_TILES: [u32; TILE_CLASSES] = [
    0x5C6370, 0x61AFEF, 0x56B6C2, 0x98C379, 0xB5C77A, 0xE5C07B, 0xD19A66, 0xE06C75, 0xBE5046,
    0xC678DD, 0xA35BC2, 0xEEEEEE, 0xFFD700,
];

const HIGH_CONTRAST_TILES: [u32; TILE_CLASSES] = [
    0x808080, 0x0088FF, 0x00FFFF, 0x00FF00, 0x88FF00, 0xFFFF00, 0xFF8800, 0xFF0000, 0xFF0088,
    0xFF00FF, 0x8800FF, 0xFFFFFF, 0xFFD700,
];

/// Blue/orange ramp; never relies on red vs green alone.
const COLORBLIND_TILES: [u32; TILE_CLASSES] = [
    0xBBBBBB, 0x88CCEE, 0x44AA99, 0x0077BB, 0x332288, 0xDDCC77, 0xEE7733, 0xCC6677, 0xCC3311,
    0x882255, 0xAA4499, 0xEEEEEE, 0xFFD700,
];

fn ramp(hex: [u32; TILE_CLASSES]) -> [Color; TILE_CLASSES] {
    hex.map(rgb)
}

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile background per value class (index 0 = 2, index 12 = 8192 and up).
    pub tiles: [Color; TILE_CLASSES],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, moves).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Empty cells and secondary text.
    pub inactive_fg: Color,
    /// Grace focus outline.
    pub focus: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// Hardcoded One Dark defaults.
    pub fn onedark_default() -> Self {
        Self {
            tiles: ramp(ONEDARK_TILES),
            bg: rgb(0x31353F),          // meter_bg
            div_line: rgb(0x3F444F),    // div_line
            main_fg: rgb(0xABB2BF),     // main_fg
            title: rgb(0xE5C07B),       // title
            inactive_fg: rgb(0x5C6370), // inactive_fg
            focus: rgb(0x56B6C2),       // hi_fg
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or file is missing.
    /// `palette` overrides the tile ramp for high-contrast or colorblind play.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => self.tiles = ramp(HIGH_CONTRAST_TILES),
            crate::Palette::Colorblind => self.tiles = ramp(COLORBLIND_TILES),
        }
    }

    /// Keys `tile_2` .. `tile_8192` set the ramp; the rest follow btop names.
    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let base = Self::onedark_default();
        let mut tiles = base.tiles;
        for (i, slot) in tiles.iter_mut().enumerate() {
            if let Some(c) = get(&format!("tile_{}", 2u32 << i)) {
                *slot = c;
            }
        }
        Self {
            tiles,
            bg: get("meter_bg").unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
            focus: get("hi_fg").unwrap_or(base.focus),
        }
    }

    /// Tile background for a block value.
    pub fn tile_color(&self, value: u32) -> Color {
        self.tiles[tile_class(value)]
    }

    /// Readable text colour on top of `tile_color(value)`.
    pub fn tile_text(&self, value: u32) -> Color {
        match self.tile_color(value) {
            Color::Rgb(r, g, b) if luma(r, g, b) > 150 => Color::Black,
            _ => Color::White,
        }
    }
}

/// 2 → 0, 4 → 1, ... 8192 and above → 12.
pub fn tile_class(value: u32) -> usize {
    let exp = value.max(2).ilog2() as usize;
    (exp - 1).min(TILE_CLASSES - 1)
}

fn luma(r: u8, g: u8, b: u8) -> u32 {
    (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    match s.len() {
        6 => u32::from_str_radix(s, 16).map(rgb).map_err(|_| invalid()),
        3 => {
            let v = u32::from_str_radix(s, 16).map_err(|_| invalid())?;
            let (r, g, b) = ((v >> 8) & 0xF, (v >> 4) & 0xF, v & 0xF);
            Ok(Color::Rgb((r * 17) as u8, (g * 17) as u8, (b * 17) as u8))
        }
        _ => Err(invalid()),
    }
}
