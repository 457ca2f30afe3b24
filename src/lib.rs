//! Latency benchmark tooling: a measuring client runner, a restarting
//! server runner, and terminal charts comparing recorded results.

pub mod config;
pub mod error;
pub mod plot;
pub mod printer;
pub mod process;
pub mod record;
pub mod runner;
pub mod shutdown;
pub mod stats;

pub use error::{Error, Result};
