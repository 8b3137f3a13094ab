use ratatui::style::{Color, Modifier, Style};

/// Palette every dialog is layered over, itself layered over the console palette
pub const DEFAULT_DIALOG_PALETTE: &str = "
dialog        : BL, Lg, SO
header        : WH, DC, BO
shadow        : WH, BL, SO
shadow.border : BL,  _, SO
Button        : BL, Lg, SO
Button*       : WH, DM, BO
Edit          : BL, WH, SO
Edit*         : DM, WH, BO
";

/// Palette names the footer looks up before falling back to the theme
pub const INFO_STYLE: &str = "info";
pub const TOOLTIP_STYLE: &str = "tooltip";

/// Colors for the parts of the screen no description styles
pub struct Theme {
    pub info_fg: Color,
    pub info_bg: Color,
    pub tooltip_fg: Color,
    pub tooltip_bg: Color,
    pub cursor: Color, // Edit cursor cell
    pub border: Color, // List box frames
}

impl Theme {
    pub fn info(&self) -> Style {
        Style::default().fg(self.info_fg).bg(self.info_bg)
    }

    pub fn tooltip(&self) -> Style {
        Style::default()
            .fg(self.tooltip_fg)
            .bg(self.tooltip_bg)
            .add_modifier(Modifier::ITALIC)
    }
}

pub const DEFAULT_THEME: Theme = Theme {
    info_fg: Color::White,
    info_bg: Color::Blue,
    tooltip_fg: Color::Black,
    tooltip_bg: Color::Gray,
    cursor: Color::Yellow,
    border: Color::DarkGray,
};
