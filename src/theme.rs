//! Theme colors for the price view
//! Dark and light presets, with per-color hex overrides from config

use ratatui::style::Color;

use crate::config::ThemeConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,      // Active borders, key hints
    pub success: Color,     // Price text
    pub warning: Color,     // Pending message
    pub danger: Color,      // Error text
    pub text: Color,        // Input text
    pub text_dim: Color,    // Labels, footer
    pub inactive: Color,    // Idle borders
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Catppuccin Mocha-ish
    pub fn dark() -> Self {
        Self {
            accent: Color::Rgb(137, 180, 250),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
        }
    }

    /// Catppuccin Latte-ish, for white terminals
    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(30, 102, 245),
            success: Color::Rgb(64, 160, 43),
            warning: Color::Rgb(254, 100, 11),
            danger: Color::Rgb(210, 15, 57),
            text: Color::Rgb(76, 79, 105),
            text_dim: Color::Rgb(108, 111, 133),
            inactive: Color::Rgb(172, 176, 190),
        }
    }

    pub fn from_config(config: &ThemeConfig) -> Self {
        let mut theme = match config.preset.to_ascii_lowercase().as_str() {
            "light" | "white" => Self::light(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!("Unknown theme preset '{}', using dark", other);
                Self::dark()
            }
        };

        let overrides = [
            (&config.accent, &mut theme.accent),
            (&config.success, &mut theme.success),
            (&config.warning, &mut theme.warning),
            (&config.danger, &mut theme.danger),
            (&config.text, &mut theme.text),
            (&config.text_dim, &mut theme.text_dim),
            (&config.inactive, &mut theme.inactive),
        ];

        for (value, slot) in overrides {
            if let Some(hex) = value {
                match Self::parse_hex_color(hex) {
                    Some(color) => *slot = color,
                    None => tracing::warn!("Ignoring invalid theme color '{}'", hex),
                }
            }
        }

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
