use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the list view
#[derive(Clone, Debug)]
pub struct Theme {
    /// Background color for the document area
    pub background: Color,

    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the current file name in the status bar
    pub filename_color: Color,

    /// Color for bullets, counters and checkboxes
    pub marker_color: Color,

    /// Foreground color for the text of checked checklist items
    pub checked_fg: Color,

    /// Foreground color for `<mark>` text
    pub highlight_fg: Color,

    /// Background color for `<mark>` text
    pub highlight_bg: Color,

    /// Color for links
    pub link_color: Color,

    /// Marker color of the block holding the caret
    pub active_marker_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            filename_color: Color::LightYellow,
            marker_color: Color::DarkGray,
            checked_fg: Color::DarkGray,
            highlight_fg: Color::Black,
            highlight_bg: Color::LightYellow,
            link_color: Color::Blue,
            active_marker_color: Color::LightBlue,
        }
    }
}

impl Theme {
    /// Create a new theme with default colors
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    /// Get the style for the filename in the status bar
    pub fn filename_style(&self) -> Style {
        Style::default().fg(self.filename_color)
    }

    /// Get the style for list markers
    pub fn marker_style(&self, active: bool) -> Style {
        let color = if active {
            self.active_marker_color
        } else {
            self.marker_color
        };
        Style::default().fg(color)
    }

    /// Get the style for the text of a checked item
    pub fn checked_style(&self) -> Style {
        Style::default()
            .fg(self.checked_fg)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    /// Get the style for highlighted text
    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.highlight_fg).bg(self.highlight_bg)
    }

    /// Get the style for links
    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link_color)
            .add_modifier(Modifier::UNDERLINED)
    }
}
