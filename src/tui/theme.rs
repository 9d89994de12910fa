use ratatui::style::Color;

use crate::model::UiConfig;
use crate::model::node::{PRIORITY_MAX, PRIORITY_MIN, clamp_priority};

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub green: Color,
    pub selection_bg: Color,
    /// Edges between a node and its parent
    pub edge: Color,
    pub category: Color,
    pub root: Color,
    /// Star colors for priorities 1 through 5
    pub priority: [Color; 5],
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x07, 0x0B, 0x1E),
            text: Color::Rgb(0xB8, 0xC0, 0xE0),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFF, 0xE0, 0x66),
            dim: Color::Rgb(0x6A, 0x72, 0x9A),
            red: Color::Rgb(0xFF, 0x5C, 0x6C),
            green: Color::Rgb(0x7C, 0xF2, 0xA6),
            selection_bg: Color::Rgb(0x1F, 0x27, 0x4F),
            edge: Color::Rgb(0x3A, 0x44, 0x70),
            category: Color::Rgb(0x8F, 0xB8, 0xFF),
            root: Color::Rgb(0xFF, 0xF4, 0xC2),
            priority: [
                Color::Rgb(0xFF, 0xFF, 0xFF),
                Color::Rgb(0xF5, 0xF3, 0xDC),
                Color::Rgb(0xFF, 0xE0, 0x66),
                Color::Rgb(0xFF, 0xCC, 0x33),
                Color::Rgb(0xFF, 0x9F, 0xA3),
            ],
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from the `[ui]` config, falling back to defaults.
    /// Priority colors are keyed `priority1` .. `priority5`.
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "green" => theme.green = color,
                "selection_bg" => theme.selection_bg = color,
                "edge" => theme.edge = color,
                "category" => theme.category = color,
                "root" => theme.root = color,
                other => {
                    if let Some(n) = other.strip_prefix("priority")
                        && let Ok(n) = n.parse::<i64>()
                        && (PRIORITY_MIN..=PRIORITY_MAX).contains(&n)
                    {
                        theme.priority[(n - 1) as usize] = color;
                    }
                }
            }
        }

        theme
    }

    /// Star color for a priority; out-of-range values are clamped first
    pub fn priority_color(&self, priority: i64) -> Color {
        self.priority[(clamp_priority(priority) - 1) as usize]
    }
}
