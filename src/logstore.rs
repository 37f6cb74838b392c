// src/logstore.rs

//! In-memory log store fed by the command relay.
//!
//! The store holds a flat stream of timestamped lines plus *command groups*:
//! one entry per relay command, keyed by its correlation id, carrying the
//! command line, run status and the streamed output lines. Groups start
//! collapsed and auto-expand when the command fails.

use std::sync::{Arc, Mutex};

use chrono::Local;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::relay::{CommandEvent, CommandId, LogLevel, Relay};

/// Severity of a stored line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl From<LogLevel> for EntryLevel {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Info => EntryLevel::Info,
            LogLevel::Warning => EntryLevel::Warning,
            LogLevel::Error => EntryLevel::Error,
        }
    }
}

/// Lifecycle state of a command group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Running,
    Success,
    Error,
}

/// One line inside a command group.
#[derive(Debug, Clone)]
pub struct GroupLine {
    pub level: EntryLevel,
    pub message: String,
    pub time: String,
}

/// A single store entry.
#[derive(Debug, Clone)]
pub enum LogEntry {
    Line {
        level: EntryLevel,
        message: String,
        time: String,
    },
    CommandGroup {
        id: CommandId,
        command: String,
        status: CommandStatus,
        exit_code: Option<i32>,
        collapsed: bool,
        time: String,
        lines: Vec<GroupLine>,
    },
}

/// The log store itself. Plain in-memory state; callers wrap it in a mutex
/// when sharing it with the relay subscriber task.
#[derive(Debug, Default)]
pub struct LogStore {
    entries: Vec<LogEntry>,
}

fn time_string() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

impl LogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn push(&mut self, level: EntryLevel, message: impl Into<String>) {
        self.entries.push(LogEntry::Line {
            level,
            message: message.into(),
            time: time_string(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(EntryLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(EntryLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(EntryLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(EntryLevel::Error, message);
    }

    /// Append raw multi-line text as individual info lines.
    ///
    /// Only a trailing empty line (from a terminating newline) is dropped;
    /// interior blank lines are preserved.
    pub fn raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let time = time_string();
        let lines: Vec<&str> = text.split('\n').collect();
        let count = lines.len();
        for (idx, line) in lines.into_iter().enumerate() {
            if idx == count - 1 && line.is_empty() {
                continue;
            }
            self.entries.push(LogEntry::Line {
                level: EntryLevel::Info,
                message: line.to_string(),
                time: time.clone(),
            });
        }
    }

    /// Open a command group in the stream. Groups start collapsed.
    pub fn start_command(&mut self, command: &str, id: CommandId) {
        self.entries.push(LogEntry::CommandGroup {
            id,
            command: command.to_string(),
            status: CommandStatus::Running,
            exit_code: None,
            collapsed: true,
            time: time_string(),
            lines: Vec::new(),
        });
    }

    /// Append output lines to the group with the given id.
    ///
    /// Multi-line messages are split like [`raw`](Self::raw). Unknown ids are
    /// ignored (the group may have been cleared).
    pub fn add_command_log(&mut self, id: &CommandId, message: &str, level: EntryLevel) {
        let time = time_string();
        let Some(lines) = self.group_lines_mut(id) else {
            debug!(id = %id, "log for unknown command group dropped");
            return;
        };

        let parts: Vec<&str> = message.split('\n').collect();
        let count = parts.len();
        for (idx, part) in parts.into_iter().enumerate() {
            if idx == count - 1 && part.is_empty() {
                continue;
            }
            lines.push(GroupLine {
                level,
                message: part.to_string(),
                time: time.clone(),
            });
        }
    }

    /// Close the group: record the exit code and final status. A failed
    /// command expands its group so the output is immediately visible.
    pub fn end_command(&mut self, id: &CommandId, code: i32) {
        if let Some(LogEntry::CommandGroup {
            status,
            exit_code,
            collapsed,
            ..
        }) = self.find_group_mut(id)
        {
            *exit_code = Some(code);
            *status = if code == 0 {
                CommandStatus::Success
            } else {
                CommandStatus::Error
            };
            if code != 0 {
                *collapsed = false;
            }
        }
    }

    pub fn toggle_collapsed(&mut self, id: &CommandId) {
        if let Some(LogEntry::CommandGroup { collapsed, .. }) = self.find_group_mut(id) {
            *collapsed = !*collapsed;
        }
    }

    /// Apply one relay event to the store.
    pub fn apply(&mut self, event: CommandEvent) {
        match event {
            CommandEvent::Started { id, command } => self.start_command(&command, id),
            CommandEvent::Log { id, line, level } => {
                self.add_command_log(&id, &line, level.into())
            }
            CommandEvent::Finished { id, exit_code } => self.end_command(&id, exit_code),
        }
    }

    fn find_group_mut(&mut self, id: &CommandId) -> Option<&mut LogEntry> {
        self.entries.iter_mut().find(
            |entry| matches!(entry, LogEntry::CommandGroup { id: gid, .. } if gid == id),
        )
    }

    fn group_lines_mut(&mut self, id: &CommandId) -> Option<&mut Vec<GroupLine>> {
        match self.find_group_mut(id) {
            Some(LogEntry::CommandGroup { lines, .. }) => Some(lines),
            _ => None,
        }
    }
}

/// Spawn a task that drains relay events into the store.
///
/// Registers the store for all three event kinds; the task ends when the
/// relay (and its senders) are dropped.
pub fn attach_to_relay(store: Arc<Mutex<LogStore>>, relay: &Relay) -> JoinHandle<()> {
    let mut rx = relay.subscribe_all();

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            store.lock().expect("log store poisoned").apply(event);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_at(store: &LogStore, idx: usize) -> (&CommandStatus, &bool, &Vec<GroupLine>) {
        match &store.entries()[idx] {
            LogEntry::CommandGroup {
                status,
                collapsed,
                lines,
                ..
            } => (status, collapsed, lines),
            other => panic!("expected command group, got {other:?}"),
        }
    }

    #[test]
    fn raw_splits_lines_and_drops_trailing_empty() {
        let mut store = LogStore::new();
        store.raw("one\ntwo\n");
        assert_eq!(store.entries().len(), 2);

        store.clear();
        store.raw("one\n\ntwo");
        assert_eq!(store.entries().len(), 3);
    }

    #[test]
    fn failed_command_group_auto_expands() {
        let mut store = LogStore::new();
        let id = CommandId::generate();
        store.start_command("pip install nope", id.clone());
        store.add_command_log(&id, "error: not found", EntryLevel::Error);
        store.end_command(&id, 1);

        let (status, collapsed, lines) = group_at(&store, 0);
        assert_eq!(*status, CommandStatus::Error);
        assert!(!collapsed);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn successful_command_group_stays_collapsed() {
        let mut store = LogStore::new();
        let id = CommandId::generate();
        store.start_command("pip list", id.clone());
        store.end_command(&id, 0);

        let (status, collapsed, _) = group_at(&store, 0);
        assert_eq!(*status, CommandStatus::Success);
        assert!(*collapsed);
    }

    #[test]
    fn logs_for_unknown_groups_are_ignored() {
        let mut store = LogStore::new();
        store.add_command_log(&CommandId::generate(), "orphan", EntryLevel::Info);
        assert!(store.entries().is_empty());
    }

    #[test]
    fn toggle_flips_collapse_state() {
        let mut store = LogStore::new();
        let id = CommandId::generate();
        store.start_command("pip list", id.clone());
        store.toggle_collapsed(&id);
        let (_, collapsed, _) = group_at(&store, 0);
        assert!(!collapsed);
    }
}
