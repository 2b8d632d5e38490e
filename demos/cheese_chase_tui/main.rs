use std::{error::Error, time::Duration};

use cheese_chase::{
    config::{Config, Mode},
    session::TrainingSession,
    viz,
};
use log::LevelFilter;

const NUM_AGENTS: usize = 3;

fn main() -> Result<(), Box<dyn Error>> {
    tui_logger::init_logger(LevelFilter::Debug)?;
    tui_logger::set_default_level(LevelFilter::Debug);

    // `cargo run --example cheese_chase_tui --features viz -- demo` plays a trained policy instead
    let demo = std::env::args().nth(1).is_some_and(|arg| arg == "demo");
    let config = if demo {
        Config {
            mode: Mode::Demo,
            tick_interval: Duration::from_millis(200),
            ..Default::default()
        }
    } else {
        Config {
            agents: NUM_AGENTS,
            ..Default::default()
        }
    };

    let session = TrainingSession::new(config)?;
    viz::run(session)?;

    Ok(())
}
