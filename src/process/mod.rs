//! External process management: command lines, spawning and output capture.

use std::{
    fmt,
    io,
    process::{ExitStatus, Stdio},
};

use tokio::process::Command;

use crate::{
    error::{Error, Result},
    shutdown::Shutdown,
};

/// Program plus argument list, opaque to the runners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from an argv vector; the first element is the program.
    pub fn from_argv(argv: Vec<String>) -> Result<Self> {
        let mut it = argv.into_iter();
        let program = it.next().filter(|p| !p.trim().is_empty()).ok_or(Error::EmptyCommand)?;
        Ok(Self {
            program,
            args: it.collect(),
        })
    }

    /// Split a command line on whitespace. No quoting is supported.
    pub fn parse(line: &str) -> Result<Self> {
        Self::from_argv(line.split_whitespace().map(str::to_string).collect())
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Everything a finished child left behind.
#[derive(Debug, Clone)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run to completion with piped stdout/stderr.
///
/// Returns `Ok(None)` if `shutdown` fires first; the child is killed.
pub async fn run_captured(spec: &CommandSpec, shutdown: &Shutdown) -> io::Result<Option<Captured>> {
    let child = spec
        .command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    tokio::select! {
        output = child.wait_with_output() => {
            let output = output?;
            Ok(Some(Captured {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }))
        }
        // Dropping the wait future drops the child, which kills it.
        _ = shutdown.wait() => Ok(None),
    }
}

/// Run to completion with the parent's stdio.
///
/// Returns `Ok(None)` if `shutdown` fires first; the child is killed.
pub async fn run_inherited(spec: &CommandSpec, shutdown: &Shutdown) -> io::Result<Option<ExitStatus>> {
    let mut child = spec.command().spawn()?;

    let status = tokio::select! {
        status = child.wait() => Some(status),
        _ = shutdown.wait() => None,
    };
    match status {
        Some(status) => status.map(Some),
        None => {
            if let Err(e) = child.kill().await {
                tracing::debug!(error = %e, "child already gone");
            }
            Ok(None)
        }
    }
}
