// src/relay/events.rs

//! Event types flowing out of the command relay.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Correlation id tagging every event produced by one command invocation.
///
/// Format: `cmd_<unix-millis>_<seq>` where `<seq>` is a process-wide counter,
/// so concurrent invocations in the same millisecond stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandId(String);

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

impl CommandId {
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
        CommandId(format!("cmd_{millis}_{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity of a single streamed output line.
///
/// Stdout lines are `Info`, stderr lines are `Error`; `Warning` is available
/// to subscribers that classify lines further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// Notifications emitted while a command runs.
#[derive(Debug, Clone)]
pub enum CommandEvent {
    /// The command process was (or failed to be) spawned.
    Started { id: CommandId, command: String },
    /// One line of stdout or stderr.
    Log {
        id: CommandId,
        line: String,
        level: LogLevel,
    },
    /// The command exited (or spawning failed, reported as exit code 1).
    Finished { id: CommandId, exit_code: i32 },
}

/// The three event kinds a subscriber can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Started,
    Log,
    Finished,
}

impl CommandEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CommandEvent::Started { .. } => EventKind::Started,
            CommandEvent::Log { .. } => EventKind::Log,
            CommandEvent::Finished { .. } => EventKind::Finished,
        }
    }

    pub fn id(&self) -> &CommandId {
        match self {
            CommandEvent::Started { id, .. }
            | CommandEvent::Log { id, .. }
            | CommandEvent::Finished { id, .. } => id,
        }
    }
}

/// Aggregate result of one command invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
