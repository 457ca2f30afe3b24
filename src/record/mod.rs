//! Execution time records: extraction from client output and the
//! `Round <n>: Execution time = <value> ms` text format.

use std::{
    fs,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::error::{Error, Result};

/// Marker printed by the client binary.
const OUTPUT_MARKER: &str = "Execution time: ";
/// Marker written to (and searched in) result files.
const FILE_MARKER: &str = "Execution time = ";
const LINE_FILTER: &str = "Execution time";
const UNIT_SUFFIX: &str = " ms";

/// Find the first `Execution time: <number> ms` in the given output.
///
/// `<number>` is a run of digits and dots. An occurrence whose run does not
/// parse as a float (e.g. `1.2.3`) is skipped.
pub fn extract_execution_time(text: &str) -> Option<f64> {
    text.match_indices(OUTPUT_MARKER).find_map(|(idx, _)| {
        let rest = &text[idx + OUTPUT_MARKER.len()..];
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if end == 0 || !rest[end..].starts_with(UNIT_SUFFIX) {
            return None;
        }
        rest[..end].parse::<f64>().ok()
    })
}

/// Render a value the way result files store it: shortest round-trip form,
/// always with a decimal point.
///
/// Very small or very large magnitudes use Rust's exponent form (`1e-5`,
/// `1e16`), not Python's (`1e-05`, `1e+16`). Both parse back to the same value.
pub fn format_millis(value: f64) -> String {
    format!("{:?}", value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTime {
    /// 1-based position among successful rounds.
    pub round: usize,
    pub millis: f64,
}

impl RoundTime {
    pub fn to_line(&self) -> String {
        format!(
            "Round {}: {}{}{}",
            self.round,
            FILE_MARKER,
            format_millis(self.millis),
            UNIT_SUFFIX
        )
    }
}

/// Ordered series of successful rounds collected during one client run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionRecord {
    rounds: Vec<RoundTime>,
}

impl ExecutionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measurement and return the round number it was filed under.
    pub fn push(&mut self, millis: f64) -> usize {
        let round = self.rounds.len() + 1;
        self.rounds.push(RoundTime { round, millis });
        round
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn rounds(&self) -> &[RoundTime] {
        &self.rounds
    }

    pub fn values(&self) -> Vec<f64> {
        self.rounds.iter().map(|r| r.millis).collect()
    }

    /// Truncate `path` and write one line per round.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(fs::File::create(path)?);
        for round in &self.rounds {
            writeln!(out, "{}", round.to_line())?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Read every execution time from a result file, in file order.
///
/// Lines without the `Execution time` marker are skipped; a marked line
/// whose value cannot be read is an error.
pub fn read_execution_times(path: &Path) -> Result<Vec<f64>> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut times = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if !line.contains(LINE_FILTER) {
            continue;
        }
        let value = parse_file_line(&line).ok_or_else(|| Error::MalformedRecord {
            path: path.to_path_buf(),
            line: idx + 1,
            content: line.clone(),
        })?;
        times.push(value);
    }
    Ok(times)
}

fn parse_file_line(line: &str) -> Option<f64> {
    let (_, after) = line.split_once(FILE_MARKER)?;
    let raw = after.split(UNIT_SUFFIX).next().unwrap_or(after);
    raw.trim().parse::<f64>().ok()
}
