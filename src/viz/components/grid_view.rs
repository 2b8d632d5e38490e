use ratatui::{prelude::*, widgets::*};

use crate::{
    collab::{AgentView, Renderer},
    grid::{Cell, Grid},
};

use super::agent_color;

/// Draws the latest grid snapshot it was handed, two terminal columns per cell
#[derive(Debug, Default)]
pub struct GridView {
    grid: Option<Grid>,
    agents: Vec<AgentView>,
}

impl GridView {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell_style(cell: Cell) -> Style {
        let bg = match cell {
            Cell::Empty => Color::White,
            Cell::Wall => Color::DarkGray,
            Cell::Goal => Color::Yellow,
            Cell::Hazard => Color::Red,
        };
        Style::default().bg(bg)
    }

    fn lines(&self, grid: &Grid) -> Vec<Line<'static>> {
        (0..grid.rows())
            .map(|row| {
                let spans = (0..grid.cols())
                    .map(|col| {
                        let pos = (row, col);
                        let style = Self::cell_style(grid.cell(pos));
                        let mut here = self.agents.iter().filter(|a| a.pos == pos);
                        match (here.next(), here.count()) {
                            (None, _) => Span::styled("  ", style),
                            (Some(agent), 0) => {
                                Span::styled("()", style.fg(agent_color(agent.id)).bold())
                            }
                            (Some(_), more) => Span::styled(
                                format!("{:<2}", (more + 1).min(99)),
                                style.fg(Color::Black).bold(),
                            ),
                        }
                    })
                    .collect::<Vec<_>>();
                Line::from(spans)
            })
            .collect()
    }
}

impl Renderer for GridView {
    fn render(&mut self, grid: &Grid, agents: &[AgentView]) {
        if self.grid.as_ref() != Some(grid) {
            self.grid = Some(grid.clone());
        }
        self.agents.clear();
        self.agents.extend_from_slice(agents);
    }
}

impl WidgetRef for GridView {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("Grid");

        let Some(grid) = &self.grid else {
            Paragraph::new("waiting for the first tick")
                .block(block)
                .render(area, buf);
            return;
        };

        Paragraph::new(self.lines(grid))
            .block(block.padding(Padding::uniform(1)))
            .render(area, buf);
    }
}
