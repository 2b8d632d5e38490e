mod grid_view;
mod help;
mod logs;
mod rate_plot;

use crossterm::event::{Event, KeyCode, KeyEventKind};
pub use grid_view::GridView;
pub(super) use help::render_help;
pub use logs::Logs;
pub use rate_plot::RatePlot;
use ratatui::style::Color;

const AGENT_COLORS: [Color; 6] = [
    Color::Blue,
    Color::Magenta,
    Color::Green,
    Color::Cyan,
    Color::LightRed,
    Color::LightBlue,
];

/// Display color of an agent
pub(super) fn agent_color(id: usize) -> Color {
    AGENT_COLORS[id % AGENT_COLORS.len()]
}

/// Takes an event, checks if it is a key press event, and returns the [`KeyCode`]
pub(super) fn event_keycode(event: &Event) -> Option<KeyCode> {
    let Event::Key(key) = event else {
        return None;
    };

    if key.kind != KeyEventKind::Press {
        return None;
    }

    Some(key.code)
}
