//! Per-series summary statistics shown in the statistics chart.

use serde::Serialize;

use crate::error::{Error, Result};

/// Minimum and arithmetic mean of one series. Variance is not computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub label: String,
    pub count: usize,
    pub min: f64,
    pub mean: f64,
}

impl Summary {
    pub fn compute(label: &str, values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptySeries(label.to_string()));
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Ok(Self {
            label: label.to_string(),
            count: values.len(),
            min,
            mean,
        })
    }

    /// Values in chart order: `Min`, then `Mean`.
    pub fn bars(&self) -> [f64; 2] {
        [self.min, self.mean]
    }
}
