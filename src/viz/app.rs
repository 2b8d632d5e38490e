use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event, KeyCode};
use log::{error, info, LevelFilter};
use ratatui::{prelude::*, widgets::*};

use super::{
    components::{event_keycode, render_help, GridView, Logs, RatePlot},
    terminal::TerminalGuard,
};
use crate::session::{SessionEvent, TrainingSession};

const TABS: [&str; 3] = ["Grid", "Plot", "Logs"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum State {
    #[default]
    Running,
    Paused,
    Quit,
}

/// The root TUI component: owns the session and acts as its scheduler
///
/// Ticks the session every `tick_interval` of its config and redraws in between, until `q` is
/// pressed. Stopping a session (e.g. a finished demo) freezes the view but keeps the UI open.
pub struct App {
    session: TrainingSession,
    state: State,
    selected_tab: usize,
    show_help: bool,
    grid_view: GridView,
    plot: RatePlot,
    logs: Logs,
    ticks: u64,
}

impl App {
    pub fn new(session: TrainingSession) -> Self {
        let agents = session.config().agents;
        let mut grid_view = GridView::new();
        session.render(&mut grid_view);
        Self {
            session,
            state: State::default(),
            selected_tab: 0,
            show_help: false,
            grid_view,
            plot: RatePlot::new(agents),
            logs: Logs::new(LevelFilter::Info),
            ticks: 0,
        }
    }

    /// Initialize the terminal and run the main loop
    ///
    /// Restores the terminal on exit
    pub fn run(&mut self) -> io::Result<()> {
        let mut guard = TerminalGuard::new()?;
        let interval = self.session.config().tick_interval;
        let mut last_tick = Instant::now();

        while self.state != State::Quit {
            guard
                .terminal()
                .draw(|frame| frame.render_widget(&*self, frame.size()))?;

            let timeout = interval.saturating_sub(last_tick.elapsed());
            if event::poll(timeout.max(Duration::from_millis(1)))? {
                let event = event::read()?;
                self.handle_event(&event);
            }

            if last_tick.elapsed() >= interval {
                if self.state == State::Running {
                    self.tick();
                }
                last_tick = Instant::now();
            }
        }

        self.session.stop();
        Ok(())
    }

    fn tick(&mut self) {
        let resets = self.session.resets();
        let event = self.session.tick(&mut self.plot);
        if let SessionEvent::Trained { episodes } = event {
            info!("trained {episodes} episodes");
        }
        if self.session.resets() != resets {
            self.plot.clear();
        }
        self.session.render(&mut self.grid_view);
        self.ticks += 1;
    }

    fn reset(&mut self) {
        if let Err(e) = self.session.reset() {
            error!("reset failed: {e}");
            return;
        }
        self.plot.clear();
        self.session.render(&mut self.grid_view);
    }

    fn handle_event(&mut self, event: &Event) {
        if self.selected_tab == 2 && self.logs.handle_event(event) {
            return;
        }

        let Some(key) = event_keycode(event) else {
            return;
        };

        match key {
            KeyCode::Char('q') => self.state = State::Quit,
            KeyCode::Char('h') => self.show_help = !self.show_help,
            KeyCode::Char(' ') => {
                self.state = match self.state {
                    State::Running => State::Paused,
                    State::Paused => State::Running,
                    State::Quit => State::Quit,
                }
            }
            KeyCode::Tab => self.selected_tab = (self.selected_tab + 1) % TABS.len(),
            KeyCode::Char('r') if self.selected_tab == 0 => self.reset(),
            _ => {}
        }
    }

    fn status_line(&self) -> Line<'_> {
        let state = if !self.session.is_running() {
            "finished".light_red()
        } else if self.state == State::Paused {
            "paused".yellow()
        } else {
            "running".light_green()
        };

        let episodes = self
            .session
            .agents()
            .iter()
            .map(|a| a.episode().to_string())
            .collect::<Vec<_>>()
            .join("/");
        let epsilon = self
            .session
            .agents()
            .first()
            .map_or(0.0, |a| a.epsilon());

        Line::from(vec![
            state.bold(),
            Span::raw(format!(
                "  tick {}  episodes {episodes}  ε {epsilon:.2}  resets {}",
                self.ticks,
                self.session.resets()
            )),
        ])
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Layout
        let [menu_area, main_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        // Menu
        Tabs::new(TABS)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        // Main
        match self.selected_tab {
            0 => self.grid_view.render_ref(main_area, buf),
            1 => self.plot.render_ref(main_area, buf),
            2 => self.logs.render_ref(main_area, buf),
            _ => {}
        }

        // Status
        let [status, gauge] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Percentage(30)]).areas(status_area);

        Paragraph::new(self.status_line())
            .block(Block::bordered().border_type(BorderType::Rounded))
            .render(status, buf);

        let rate = self
            .session
            .agents()
            .first()
            .map_or(0.0, |a| a.history().rate() as f64);
        Gauge::default()
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Success rate"),
            )
            .gauge_style(Color::Cyan)
            .ratio(rate.clamp(0.0, 1.0))
            .render(gauge, buf);

        if self.show_help {
            render_help(area, buf, self.selected_tab, self.session.config().mode);
        }
    }
}
