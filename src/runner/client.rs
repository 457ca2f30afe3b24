//! Repeatedly run the client binary and record its self-reported execution time.

use std::{path::PathBuf, time::Duration};

use tracing::{error, info, warn};

use crate::{
    error::Result,
    process::{self, CommandSpec},
    record::{extract_execution_time, format_millis, ExecutionRecord},
    shutdown::Shutdown,
};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub command: CommandSpec,
    pub rounds: usize,
    /// Truncated and rewritten at the end of every run.
    pub output: PathBuf,
    /// Pause between two consecutive rounds.
    pub round_delay: Duration,
}

/// Values given on the command line; each one replaces its config key.
#[derive(Debug, Clone, Default)]
pub struct ClientOverrides {
    pub command: Option<CommandSpec>,
    pub rounds: Option<usize>,
    pub output: Option<PathBuf>,
    pub round_delay: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientReport {
    /// Rounds for which the client was launched (or a launch was attempted).
    pub attempts: usize,
    pub record: ExecutionRecord,
    pub interrupted: bool,
}

impl ClientReport {
    pub fn successes(&self) -> usize {
        self.record.len()
    }
}

/// Run `settings.command` up to `settings.rounds` times and write every
/// extracted execution time to `settings.output`.
///
/// Launch failures and rounds without a readable time are logged and
/// skipped. An interrupt ends the loop early; whatever was collected so far
/// is still written. Only a failure to write the output file is returned.
pub async fn run_client(settings: &ClientSettings, shutdown: &Shutdown) -> Result<ClientReport> {
    let mut report = ClientReport::default();

    for round in 1..=settings.rounds {
        if shutdown.is_triggered() {
            report.interrupted = true;
            break;
        }
        info!(round, "starting client round");
        report.attempts += 1;

        match process::run_captured(&settings.command, shutdown).await {
            Ok(Some(captured)) => {
                if !captured.status.success() {
                    warn!(round, status = %captured.status, "client exited with failure status");
                }
                let value = extract_execution_time(&captured.stdout)
                    .or_else(|| extract_execution_time(&captured.stderr));
                match value {
                    Some(millis) => {
                        let filed_as = report.record.push(millis);
                        info!(round, filed_as, "Round {}: Execution time = {} ms", round, format_millis(millis));
                    }
                    None => warn!(round, "failed to extract execution time"),
                }
            }
            Ok(None) => {
                report.interrupted = true;
                break;
            }
            Err(e) => {
                error!(round, command = %settings.command, error = %e, "failed to launch client");
            }
        }

        if round < settings.rounds && shutdown.sleep(settings.round_delay).await {
            report.interrupted = true;
            break;
        }
    }

    if report.interrupted {
        warn!(attempts = report.attempts, "client runner interrupted");
    }
    report.record.write_to(&settings.output)?;
    info!(
        path = %settings.output.display(),
        rounds = report.successes(),
        "execution times written"
    );
    Ok(report)
}
