//! Theme for the Tabula dashboard.
//!
//! A dark base palette with per-element overrides from the `style` section
//! of the configuration, mirroring the color hooks of the original page
//! (message, date, weather, search, highlight, tiles).

use ratatui::style::Color;
use tabula_core::StyleConfig;

/// Resolved color set for the dashboard.
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub message_fg: Color,
    pub date_fg: Color,
    pub weather_fg: Color,
    pub search_fg: Color,
    pub highlight_bg: Color,
    pub tile_fg: Color,
    pub border: Color,
    pub dim: Color,
}

impl Theme {
    /// Base dark palette.
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(30, 30, 46),
            fg: Color::Rgb(205, 214, 244),
            message_fg: Color::Rgb(205, 214, 244),
            date_fg: Color::Rgb(166, 173, 200),
            weather_fg: Color::Rgb(166, 173, 200),
            search_fg: Color::Rgb(205, 214, 244),
            highlight_bg: Color::Rgb(69, 71, 90),
            tile_fg: Color::Rgb(180, 190, 254),
            border: Color::Rgb(69, 71, 90),
            dim: Color::Rgb(127, 132, 156),
        }
    }

    /// Dark palette with configured color overrides applied. Malformed hex
    /// strings are ignored.
    pub fn from_style(style: &StyleConfig) -> Self {
        let mut theme = Self::dark();
        apply(&mut theme.bg, &style.background_color);
        apply(&mut theme.message_fg, &style.message_color);
        apply(&mut theme.date_fg, &style.date_color);
        apply(&mut theme.weather_fg, &style.weather_color);
        apply(&mut theme.search_fg, &style.search_color);
        apply(&mut theme.highlight_bg, &style.highlight_color);
        apply(&mut theme.tile_fg, &style.tile_color);
        theme
    }
}

fn apply(slot: &mut Color, configured: &Option<String>) {
    if let Some(color) = configured.as_deref().and_then(parse_hex_color) {
        *slot = color;
    }
}

/// Parse `#rgb` or `#rrggbb` into a ratatui color.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let digits = s.strip_prefix('#')?;
    let (r, g, b) = match digits.len() {
        3 => {
            let mut chars = digits.chars();
            let r = chars.next()?.to_digit(16)? as u8;
            let g = chars.next()?.to_digit(16)? as u8;
            let b = chars.next()?.to_digit(16)? as u8;
            (r * 17, g * 17, b * 17)
        }
        6 => (
            u8::from_str_radix(&digits[0..2], 16).ok()?,
            u8::from_str_radix(&digits[2..4], 16).ok()?,
            u8::from_str_radix(&digits[4..6], 16).ok()?,
        ),
        _ => return None,
    };
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_six_digit_hex() {
        assert_eq!(parse_hex_color("#1a2b3c"), Some(Color::Rgb(26, 43, 60)));
        assert_eq!(parse_hex_color("#FFFFFF"), Some(Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_three_digit_hex_expands() {
        assert_eq!(parse_hex_color("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex_color("#a0c"), Some(Color::Rgb(170, 0, 204)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_hex_color("fff"), None);
        assert_eq!(parse_hex_color("#ffff"), None);
        assert_eq!(parse_hex_color("#xyz"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn test_overrides_apply_and_malformed_ignored() {
        let style = StyleConfig {
            message_color: Some("#ff0000".into()),
            date_color: Some("bogus".into()),
            ..Default::default()
        };
        let theme = Theme::from_style(&style);
        assert_eq!(theme.message_fg, Color::Rgb(255, 0, 0));
        assert_eq!(theme.date_fg, Theme::dark().date_fg);
    }
}
