// src/relay/runner.rs

//! Individual command process runner.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::relay::events::{CommandEvent, CommandId, CommandOutput, LogLevel};
use crate::relay::Relay;

/// Build a shell command appropriate for the platform.
fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

/// Run `command` through the relay, streaming its output.
///
/// Emits `Started`, per-line `Log` (stdout as `Info`, stderr as `Error`) and
/// `Finished` events tagged with a fresh [`CommandId`], and returns the
/// aggregate output. A spawn failure does not error out: it is reported as
/// an `Error` log plus `Finished` with exit code 1, so subscribers always
/// see a complete start/end lifecycle.
pub async fn run(relay: &Relay, command: &str) -> Result<CommandOutput> {
    run_with_id(relay, command, CommandId::generate()).await
}

/// Like [`run`] but with a caller-provided correlation id.
pub async fn run_with_id(relay: &Relay, command: &str, id: CommandId) -> Result<CommandOutput> {
    info!(id = %id, cmd = %command, "starting command");

    relay.emit(CommandEvent::Started {
        id: id.clone(),
        command: command.to_string(),
    });

    let mut cmd = shell_command(command);
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(id = %id, error = %err, "failed to spawn command");
            relay.emit(CommandEvent::Log {
                id: id.clone(),
                line: format!("spawn error: {err}"),
                level: LogLevel::Error,
            });
            relay.emit(CommandEvent::Finished { id, exit_code: 1 });
            return Ok(CommandOutput {
                stdout: String::new(),
                stderr: err.to_string(),
                exit_code: 1,
            });
        }
    };

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    // Both pipes are drained concurrently with waiting for the child, so
    // full pipe buffers can never deadlock the process.
    let (status, stdout, stderr) = tokio::join!(
        child.wait(),
        consume_lines(relay, &id, stdout_pipe, LogLevel::Info),
        consume_lines(relay, &id, stderr_pipe, LogLevel::Error),
    );

    let status = status.with_context(|| format!("waiting for command '{command}'"))?;
    let exit_code = status.code().unwrap_or(-1);
    debug!(id = %id, exit_code, "command exited");

    relay.emit(CommandEvent::Finished { id, exit_code });

    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code,
    })
}

/// Run `command` quietly, without emitting any relay events.
///
/// Used by version/path probes that should not clutter the log stream. The
/// exit code is reported in the output rather than as an error, so callers
/// can fall back to alternative commands.
pub async fn capture(command: &str) -> Result<CommandOutput> {
    let output = shell_command(command)
        .output()
        .await
        .with_context(|| format!("running command '{command}'"))?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Read lines from a child pipe, emitting each as a `Log` event and
/// accumulating the full text (with newlines restored).
async fn consume_lines<R>(
    relay: &Relay,
    id: &CommandId,
    pipe: Option<R>,
    level: LogLevel,
) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(pipe) = pipe else {
        return String::new();
    };

    let mut collected = String::new();
    let reader = BufReader::new(pipe);
    let mut lines = reader.lines();

    while let Ok(Some(line)) = lines.next_line().await {
        collected.push_str(&line);
        collected.push('\n');
        relay.emit(CommandEvent::Log {
            id: id.clone(),
            line,
            level,
        });
    }

    collected
}
