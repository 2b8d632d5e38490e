use ratatui::{prelude::*, widgets::*};

use crate::{
    algo::EpisodeReport,
    collab::{Diagnostics, LogDiagnostics},
    ds::RingBuffer,
};

use super::agent_color;

/// Points kept per agent
const MAX_POINTS: usize = 2000;

/// Success rate over episodes, one series per agent
///
/// Doubles as the session's diagnostics sink: everything it receives is also logged.
pub struct RatePlot {
    series: Vec<RingBuffer<(f64, f64)>>,
    last_episode: Vec<u32>,
    x_max: f64,
}

impl RatePlot {
    pub fn new(agents: usize) -> Self {
        Self {
            series: (0..agents).map(|_| RingBuffer::new(MAX_POINTS)).collect(),
            last_episode: vec![0; agents],
            x_max: 1.0,
        }
    }

    /// Drop all points, e.g. after the session was reset
    pub fn clear(&mut self) {
        self.series.iter_mut().for_each(RingBuffer::clear);
        self.last_episode.fill(0);
        self.x_max = 1.0;
    }

    /// Latest recorded rate of an agent
    pub fn latest(&self, agent: usize) -> Option<f64> {
        self.series.get(agent)?.iter().last().map(|&(_, rate)| rate)
    }
}

impl Diagnostics for RatePlot {
    fn episode(&mut self, report: &EpisodeReport) {
        LogDiagnostics.episode(report);
        if let Some(last) = self.last_episode.get_mut(report.agent) {
            *last = report.episode;
        }
    }

    fn success_rate(&mut self, agent: usize, rate: f32, window: usize) {
        LogDiagnostics.success_rate(agent, rate, window);
        let (Some(series), Some(&episode)) =
            (self.series.get_mut(agent), self.last_episode.get(agent))
        else {
            return;
        };
        let x = episode as f64;
        series.push((x, rate as f64));
        self.x_max = self.x_max.max(x);
    }
}

impl WidgetRef for RatePlot {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let points = self
            .series
            .iter()
            .map(|s| s.iter().copied().collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let x_min = points
            .iter()
            .filter_map(|p| p.first())
            .map(|&(x, _)| x)
            .fold(self.x_max, f64::min);

        let datasets = points
            .iter()
            .enumerate()
            .map(|(id, data)| {
                Dataset::default()
                    .name(format!("agent {id}"))
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(agent_color(id)))
                    .data(data)
            })
            .collect();

        let x_axis = Axis::default()
            .title("Episode")
            .dark_gray()
            .labels(vec![
                format!("{x_min:.0}").bold(),
                format!("{:.0}", self.x_max).bold(),
            ])
            .bounds([x_min, self.x_max]);

        let y_axis = Axis::default()
            .title("Success rate")
            .dark_gray()
            .labels(vec!["0".bold(), "0.5".bold(), "1".bold()])
            .bounds([0.0, 1.0]);

        Chart::new(datasets)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Success rate"),
            )
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }
}
