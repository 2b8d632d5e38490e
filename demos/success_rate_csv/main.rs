use std::{error::Error, fs, path::Path};

use cheese_chase::{collab::Diagnostics, config::Config, session::TrainingSession};

const NUM_BATCHES: u32 = 50;
const BATCH_SIZE: u32 = 100;

/// Collects `(episode, success rate)` rows
#[derive(Default)]
struct Rows {
    episode: u32,
    rows: Vec<(u32, f32)>,
}

impl Diagnostics for Rows {
    fn episode(&mut self, report: &cheese_chase::algo::EpisodeReport) {
        self.episode = report.episode;
    }

    fn success_rate(&mut self, _agent: usize, rate: f32, _window: usize) {
        self.rows.push((self.episode, rate));
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let path = Path::new("demos/success_rate_csv");

    let mut session = TrainingSession::new(Config {
        seed: Some(2024),
        ..Default::default()
    })?;
    let mut rows = Rows::default();

    for _ in 0..NUM_BATCHES {
        session.train_fast(BATCH_SIZE, &mut rows);
    }

    fs::create_dir_all(path.join("out"))?;

    let mut wtr = csv::Writer::from_path(path.join("out/data.csv"))?;
    wtr.write_record(["episode", "success_rate"])?;
    for (episode, rate) in rows.rows {
        wtr.write_record([episode.to_string(), rate.to_string()])?;
    }
    wtr.flush()?;

    println!("{}", session.grid());
    Ok(())
}
