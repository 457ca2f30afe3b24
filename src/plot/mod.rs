//! Offline charts comparing two execution time series in the terminal.

use std::path::{Path, PathBuf};

use crate::{error::Result, record::read_execution_times, stats::Summary};

pub mod app;
pub mod terminal;
pub mod ui;

pub use app::{ChartApp, View};

pub const BASELINE_LABEL: &str = "Without Load";
pub const LOADED_LABEL: &str = "With Load";

#[derive(Debug, Clone)]
pub struct PlotSettings {
    /// Results collected on an idle system.
    pub baseline: PathBuf,
    /// Results collected under load.
    pub loaded: PathBuf,
}

/// Paths given on the command line; each one replaces its config key.
#[derive(Debug, Clone, Default)]
pub struct PlotOverrides {
    pub baseline: Option<PathBuf>,
    pub loaded: Option<PathBuf>,
}

/// A labelled, ordered series of execution times in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    pub fn load(label: impl Into<String>, path: &Path) -> Result<Self> {
        let values = read_execution_times(path)?;
        tracing::debug!(path = %path.display(), count = values.len(), "loaded series");
        Ok(Self::new(label, values))
    }

    /// `(round, millis)` pairs with 0-based rounds.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect()
    }

    pub fn summary(&self) -> Result<Summary> {
        Summary::compute(&self.label, &self.values)
    }
}

/// Read both result files named in `settings`.
pub fn load_series(settings: &PlotSettings) -> Result<(Series, Series)> {
    Ok((
        Series::load(BASELINE_LABEL, &settings.baseline)?,
        Series::load(LOADED_LABEL, &settings.loaded)?,
    ))
}

/// Show both series as line charts over a shared round axis.
pub fn plot_comparison(baseline: &Series, loaded: &Series) -> Result<()> {
    let mut app = ChartApp::new(baseline.clone(), loaded.clone(), &[View::Comparison])?;
    terminal::run_charts(&mut app)
}

/// Show min and mean of both series as a grouped bar chart.
pub fn plot_statistics(baseline: &Series, loaded: &Series) -> Result<()> {
    let mut app = ChartApp::new(baseline.clone(), loaded.clone(), &[View::Statistics])?;
    terminal::run_charts(&mut app)
}

/// Comparison chart followed by the statistics chart in one terminal session.
pub fn plot_all(baseline: Series, loaded: Series) -> Result<()> {
    let mut app = ChartApp::new(baseline, loaded, &[View::Comparison, View::Statistics])?;
    terminal::run_charts(&mut app)
}

/// Statistics as a Markdown table, for non-interactive output.
pub fn summary_markdown(summaries: &[Summary]) -> String {
    let mut md = String::from("| Series | Rounds | Min (ms) | Mean (ms) |\n|:-|-:|-:|-:|\n");
    for s in summaries {
        md.push_str(&format!(
            "| {} | {} | {:.3} | {:.3} |\n",
            s.label, s.count, s.min, s.mean
        ));
    }
    md
}
