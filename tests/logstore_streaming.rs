// tests/logstore_streaming.rs

//! End-to-end: relay events land in the log store as command groups.

use std::error::Error;
use std::sync::{Arc, Mutex};

use pytoolbox::logstore::{attach_to_relay, CommandStatus, LogEntry, LogStore};
use pytoolbox::relay::{self, Relay};
use pytoolbox_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn a_streamed_command_becomes_one_command_group() -> TestResult {
    with_timeout(async {
        init_tracing();

        let relay = Relay::new();
        let store = Arc::new(Mutex::new(LogStore::new()));
        let task = attach_to_relay(Arc::clone(&store), &relay);

        relay::run(&relay, "echo streamed").await?;
        drop(relay);
        task.await?;

        let store = store.lock().unwrap();
        assert_eq!(store.entries().len(), 1);

        match &store.entries()[0] {
            LogEntry::CommandGroup {
                command,
                status,
                exit_code,
                collapsed,
                lines,
                ..
            } => {
                assert_eq!(command, "echo streamed");
                assert_eq!(*status, CommandStatus::Success);
                assert_eq!(*exit_code, Some(0));
                assert!(*collapsed);
                assert!(lines.iter().any(|l| l.message.contains("streamed")));
            }
            other => panic!("expected a command group, got {other:?}"),
        }

        Ok(())
    })
    .await
}

#[tokio::test]
async fn failed_commands_arrive_expanded() -> TestResult {
    with_timeout(async {
        init_tracing();

        let relay = Relay::new();
        let store = Arc::new(Mutex::new(LogStore::new()));
        let task = attach_to_relay(Arc::clone(&store), &relay);

        relay::run(&relay, "exit 2").await?;
        drop(relay);
        task.await?;

        let store = store.lock().unwrap();
        match &store.entries()[0] {
            LogEntry::CommandGroup {
                status,
                exit_code,
                collapsed,
                ..
            } => {
                assert_eq!(*status, CommandStatus::Error);
                assert_eq!(*exit_code, Some(2));
                assert!(!collapsed);
            }
            other => panic!("expected a command group, got {other:?}"),
        }

        Ok(())
    })
    .await
}

#[tokio::test]
async fn consecutive_commands_stay_separate_groups() -> TestResult {
    with_timeout(async {
        init_tracing();

        let relay = Relay::new();
        let store = Arc::new(Mutex::new(LogStore::new()));
        let task = attach_to_relay(Arc::clone(&store), &relay);

        relay::run(&relay, "echo first").await?;
        relay::run(&relay, "echo second").await?;
        drop(relay);
        task.await?;

        let store = store.lock().unwrap();
        assert_eq!(store.entries().len(), 2);

        Ok(())
    })
    .await
}
