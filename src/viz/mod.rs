//! Terminal front-end: draws the grid, plots the success rate, shows logs, and ticks the session
//! on a timer.

use std::io;

use crate::session::TrainingSession;

mod app;
mod components;
mod terminal;

pub use app::{App, State};
pub use components::{GridView, Logs, RatePlot};

/// Run the terminal UI on `session` until the user quits
///
/// Install a logger with [`tui_logger::init_logger`] beforehand to fill the log tab.
pub fn run(session: TrainingSession) -> io::Result<()> {
    App::new(session).run()
}
