//! Keep the server binary running, relaunching it whenever it exits.

use std::{fmt, str::FromStr, time::Duration};

use tracing::{error, info, warn};

use crate::{
    process::{self, CommandSpec},
    shutdown::Shutdown,
};

/// What to do when the server exits with status zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    /// Relaunch regardless of exit status.
    #[default]
    Always,
    /// Relaunch only after a failure; a clean exit ends supervision.
    OnFailure,
}

impl FromStr for RestartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "on-failure" | "on_failure" => Ok(Self::OnFailure),
            other => Err(format!("unknown restart policy '{}' (expected always|on-failure)", other)),
        }
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::OnFailure => f.write_str("on-failure"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub command: CommandSpec,
    /// Fixed pause before every relaunch; never grows.
    pub restart_delay: Duration,
    pub restart_policy: RestartPolicy,
}

/// Values given on the command line; each one replaces its config key.
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    pub command: Option<CommandSpec>,
    pub restart_delay: Option<Duration>,
    pub restart_policy: Option<RestartPolicy>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerReport {
    pub launches: usize,
}

/// Supervise the server until interrupted.
///
/// There is no retry limit. With [`RestartPolicy::OnFailure`] a zero exit
/// status also ends the loop.
pub async fn run_server_forever(settings: &ServerSettings, shutdown: &Shutdown) -> ServerReport {
    let mut report = ServerReport::default();

    loop {
        if shutdown.is_triggered() {
            break;
        }
        info!(command = %settings.command, launch = report.launches + 1, "starting server");
        report.launches += 1;

        match process::run_inherited(&settings.command, shutdown).await {
            Ok(Some(status)) if status.success() => {
                if settings.restart_policy == RestartPolicy::OnFailure {
                    info!("server exited cleanly, not restarting");
                    break;
                }
                info!(%status, "server exited, restarting");
            }
            Ok(Some(status)) => {
                warn!(%status, "server terminated unexpectedly, restarting");
            }
            Ok(None) => break,
            Err(e) => {
                error!(command = %settings.command, error = %e, "failed to launch server, retrying");
            }
        }

        if shutdown.sleep(settings.restart_delay).await {
            break;
        }
    }

    info!(launches = report.launches, "server runner stopped");
    report
}
