//! Fixed mnemonic table for palette codes
//!
//! Palette rules never name colors directly; every field is a two-letter
//! mnemonic (`DB` = dark blue, `Lg` = light gray, `BO` = bold, `_` = default).
//! Lookup is case-sensitive: `LG` (light green) and `Lg` (light gray) differ.

use ratatui::style::{Color, Modifier, Style};

/// A resolved palette code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// Terminal default (`_`)
    Default,
    /// A foreground/background color
    Color(Color),
    /// A font attribute
    Font(Modifier),
}

const MNEMONICS: &[(&str, Code)] = &[
    // Colors
    ("WH", Code::Color(Color::White)),
    ("BL", Code::Color(Color::Black)),
    ("YL", Code::Color(Color::LightYellow)),
    ("BR", Code::Color(Color::Yellow)),
    ("LR", Code::Color(Color::LightRed)),
    ("LG", Code::Color(Color::LightGreen)),
    ("LB", Code::Color(Color::LightBlue)),
    ("LC", Code::Color(Color::LightCyan)),
    ("LM", Code::Color(Color::LightMagenta)),
    ("Lg", Code::Color(Color::Gray)),
    ("DR", Code::Color(Color::Red)),
    ("DG", Code::Color(Color::Green)),
    ("DB", Code::Color(Color::Blue)),
    ("DC", Code::Color(Color::Cyan)),
    ("DM", Code::Color(Color::Magenta)),
    ("Dg", Code::Color(Color::DarkGray)),
    // Font attributes
    ("SO", Code::Font(Modifier::REVERSED)),
    ("BO", Code::Font(Modifier::BOLD)),
    ("UL", Code::Font(Modifier::UNDERLINED)),
    ("_", Code::Default),
];

/// Look up a mnemonic, returning `None` for codes outside the table
pub fn lookup(code: &str) -> Option<Code> {
    MNEMONICS
        .iter()
        .find(|(mnemonic, _)| *mnemonic == code)
        .map(|(_, resolved)| *resolved)
}

impl Code {
    /// Apply this code as a foreground field
    pub fn apply_fg(self, style: Style) -> Style {
        match self {
            Code::Default => style.fg(Color::Reset),
            Code::Color(color) => style.fg(color),
            Code::Font(modifier) => style.add_modifier(modifier),
        }
    }

    /// Apply this code as a background field
    pub fn apply_bg(self, style: Style) -> Style {
        match self {
            Code::Default => style.bg(Color::Reset),
            Code::Color(color) => style.bg(color),
            Code::Font(modifier) => style.add_modifier(modifier),
        }
    }

    /// Apply this code as a font field
    pub fn apply_font(self, style: Style) -> Style {
        match self {
            Code::Default => style,
            Code::Color(color) => style.fg(color),
            Code::Font(modifier) => style.add_modifier(modifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(lookup("LG"), Some(Code::Color(Color::LightGreen)));
        assert_eq!(lookup("Lg"), Some(Code::Color(Color::Gray)));
        assert_eq!(lookup("lg"), None);
    }

    #[test]
    fn test_font_codes() {
        assert_eq!(lookup("BO"), Some(Code::Font(Modifier::BOLD)));
        assert_eq!(lookup("_"), Some(Code::Default));
        assert_eq!(lookup("XX"), None);
    }
}
