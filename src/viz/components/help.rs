use ratatui::{prelude::*, widgets::*};

use crate::config::Mode;

fn key_line(key: &'static str, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::from(key).light_cyan().bold(),
        Span::raw(" : "),
        Span::raw(text),
    ])
}

/// Centered popup listing the key bindings of the selected tab
pub fn render_help(area: Rect, buf: &mut Buffer, selected_tab: usize, mode: Mode) {
    let mut lines = vec![
        key_line("  q  ", "Stop the session and exit"),
        key_line("  h  ", "Toggle this help"),
        key_line("Space", "Pause or resume ticking"),
        key_line(" Tab ", "Switch tabs"),
    ];

    match selected_tab {
        0 if mode == Mode::Train => {
            lines.push(key_line("  r  ", "Reset: new grid, new cats, untrained agents"))
        }
        0 => lines.push(key_line("  r  ", "Reset and retrain on a new grid")),
        2 => lines.extend([
            key_line("  s  ", "Toggle the target selector"),
            key_line("  f  ", "Focus on the selected target only"),
            key_line("⬆ / ⬇", "Switch log target"),
            key_line("⬅ / ➡", "Show fewer/more log levels"),
            key_line("- / +", "Capture fewer/more log levels"),
            key_line("PgUp ", "Page mode, scroll up"),
            key_line("PgDn ", "Page mode, scroll down"),
            key_line(" Esc ", "Leave page mode"),
        ]),
        _ => {}
    }

    let [_, center_vert, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length((lines.len() + 4) as u16),
        Constraint::Fill(1),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(70),
        Constraint::Fill(1),
    ])
    .areas(center_vert);

    Clear.render(center, buf);

    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .padding(Padding::horizontal(1))
                .title("Help"),
        )
        .wrap(Wrap { trim: false })
        .render(center, buf);
}
