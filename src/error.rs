//! Error types shared by the runners and the plotter.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line carried the execution time marker but no readable value.
    #[error("{}:{line}: malformed execution time record: {content:?}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// Statistics requested for a series without samples.
    #[error("no execution times recorded for series '{0}'")]
    EmptySeries(String),

    /// A config file named explicitly could not be read.
    #[error("cannot read config file {}: {source}", .path.display())]
    ConfigFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidConfig {
        key: String,
        value: String,
        reason: String,
    },

    #[error("command line is empty")]
    EmptyCommand,

    /// Terminal setup or drawing failed.
    #[error("terminal error: {0}")]
    Terminal(String),
}
