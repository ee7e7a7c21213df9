use ratatui::style::Color;

use crate::model::UiConfig;

/// Parsed color theme for the TUI.
/// Defaults stick to the terminal's own palette.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    /// Rank badges and prioritized tasks
    pub highlight: Color,
    pub dim: Color,
    /// Section headers, box borders and rules
    pub accent: Color,
    pub red: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Reset,
            text: Color::Reset,
            text_bright: Color::Indexed(7),
            highlight: Color::Indexed(4),
            dim: Color::Indexed(8),
            accent: Color::Indexed(0),
            red: Color::Indexed(1),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from the [ui] config, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                tracing::warn!(key = %key, value = %value, "ignoring invalid color");
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "accent" => theme.accent = color,
                "red" => theme.red = color,
                _ => tracing::warn!(key = %key, "ignoring unknown color slot"),
            }
        }

        theme
    }
}
