//! Integration tests for Dasa
//!
//! These tests exercise the full supervision workflow against real
//! short-lived OS processes (`sleep`, `true`, `false`).

use dasa::config::DasaConfig;
use dasa::roster::{LaunchSpec, Role, Roster};
use dasa::status::{RoleState, StatusReporter};
use dasa::supervisor::{Supervisor, WorkerHandle, WorkerState};
use dasa::DasaError;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Helper to create a test role backed by a real command
fn command_role(id: &str, program: &str, args: &[&str]) -> Role {
    Role::new(id, id, "test persona")
        .with_launch(LaunchSpec::new(program).with_args(args.iter().copied()))
}

fn two_role_roster() -> Arc<Roster> {
    Arc::new(
        Roster::new(vec![
            command_role("a", "sleep", &["30"]),
            command_role("b", "sleep", &["30"]),
        ])
        .unwrap(),
    )
}

fn supervisor_over(roster: &Arc<Roster>) -> Arc<Supervisor> {
    Arc::new(Supervisor::new(Arc::clone(roster)).with_grace(Duration::from_secs(2)))
}

async fn wait_for_terminal(supervisor: &Supervisor, role_id: &str) -> WorkerHandle {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(handle) = supervisor.status(role_id) {
            if handle.state.is_terminal() {
                return handle;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "worker '{}' never reached a terminal state",
            role_id
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_role_lifecycle() {
        let roster = two_role_roster();
        let supervisor = supervisor_over(&roster);

        // spawn(A) → Running
        let first = supervisor.spawn("a").await.unwrap();
        assert_eq!(first.state, WorkerState::Running);

        // spawn(A) again → RoleBusy, existing handle untouched
        assert!(matches!(
            supervisor.spawn("a").await,
            Err(DasaError::RoleBusy(_))
        ));
        assert_eq!(supervisor.status("a").unwrap().pid, first.pid);

        // terminate(A) → Terminated
        supervisor.terminate("a").await.unwrap();
        assert_eq!(
            supervisor.status("a").unwrap().state,
            WorkerState::Terminated
        );

        // reap(A) → handle gone
        supervisor.reap("a").unwrap();
        assert!(supervisor.status("a").is_none());

        // spawn(A) → fresh handle
        let second = supervisor.spawn("a").await.unwrap();
        assert_eq!(second.state, WorkerState::Running);
        assert!(second.started_at >= first.started_at);
        assert_ne!(second.pid, first.pid);

        supervisor.shutdown_all().await;
    }

    #[tokio::test]
    async fn test_unknown_role_creates_no_handle() {
        let roster = two_role_roster();
        let supervisor = supervisor_over(&roster);

        assert!(matches!(
            supervisor.spawn("unknown").await,
            Err(DasaError::RoleNotFound(_))
        ));
        assert!(supervisor.status("unknown").is_none());
        assert!(supervisor.list_active().is_empty());
    }

    #[tokio::test]
    async fn test_self_exit_observed_without_polling() {
        let roster = Arc::new(
            Roster::new(vec![
                command_role("ok", "true", &[]),
                command_role("bad", "false", &[]),
            ])
            .unwrap(),
        );
        let supervisor = supervisor_over(&roster);

        supervisor.spawn("ok").await.unwrap();
        supervisor.spawn("bad").await.unwrap();

        assert_eq!(
            wait_for_terminal(&supervisor, "ok").await.state,
            WorkerState::Exited(0)
        );
        assert_eq!(
            wait_for_terminal(&supervisor, "bad").await.state,
            WorkerState::Exited(1)
        );
    }

    #[tokio::test]
    async fn test_reap_misuse_leaves_state_untouched() {
        let roster = two_role_roster();
        let supervisor = supervisor_over(&roster);

        let handle = supervisor.spawn("a").await.unwrap();

        assert!(matches!(
            supervisor.reap("a"),
            Err(DasaError::StillActive(_))
        ));
        assert_eq!(supervisor.status("a").unwrap().pid, handle.pid);
        assert!(supervisor.status("a").unwrap().state.is_live());

        supervisor.shutdown_all().await;
    }

    #[tokio::test]
    async fn test_session_teardown_drains_all_workers() {
        let roster = two_role_roster();
        let supervisor = supervisor_over(&roster);

        supervisor.spawn("a").await.unwrap();
        supervisor.spawn("b").await.unwrap();

        // The dispatcher's `up` teardown path
        let stopped = supervisor.shutdown_all().await;
        assert_eq!(stopped, 2);
        assert!(supervisor.list_active().is_empty());

        for id in ["a", "b"] {
            assert_eq!(
                supervisor.status(id).unwrap().state,
                WorkerState::Terminated
            );
        }
    }
}

mod snapshot_tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_is_roster_shaped() {
        let roster = two_role_roster();
        let supervisor = supervisor_over(&roster);
        let reporter = StatusReporter::new(Arc::clone(&roster), Arc::clone(&supervisor));

        // Idle roster
        let snapshot = reporter.snapshot();
        assert_eq!(snapshot.len(), roster.len());
        assert!(snapshot.iter().all(|s| matches!(s.state, RoleState::Idle)));

        // One worker up: still |roster| entries, in roster order
        supervisor.spawn("b").await.unwrap();
        let snapshot = reporter.snapshot();
        assert_eq!(snapshot.len(), roster.len());
        assert_eq!(snapshot[0].role.id, "a");
        assert_eq!(snapshot[1].role.id, "b");
        assert!(!snapshot[0].state.is_active());
        assert!(snapshot[1].state.is_active());

        supervisor.shutdown_all().await;
    }

    #[tokio::test]
    async fn test_snapshot_with_builtin_roster() {
        let roster = Arc::new(Roster::builtin());
        let supervisor = Arc::new(Supervisor::new(Arc::clone(&roster)));
        let reporter = StatusReporter::new(Arc::clone(&roster), supervisor);

        let snapshot = reporter.snapshot();
        assert_eq!(snapshot.len(), 10);
        assert_eq!(snapshot[0].role.id, "patih");
        assert_eq!(snapshot[9].role.id, "rsi");
    }
}

mod dispatcher_tests {
    use super::*;
    use dasa::dispatch::{Command, Dispatcher};
    use std::path::PathBuf;

    fn dispatcher_over(roster: Arc<Roster>) -> Dispatcher {
        let supervisor = supervisor_over(&roster);
        let reporter = StatusReporter::new(Arc::clone(&roster), Arc::clone(&supervisor));
        Dispatcher::new(
            DasaConfig::new(),
            PathBuf::from("unused-config.yaml"),
            roster,
            supervisor,
            reporter,
        )
    }

    #[tokio::test]
    async fn test_unknown_run_lists_exactly_the_configured_ids() {
        let dispatcher = dispatcher_over(two_role_roster());

        let result = dispatcher
            .dispatch(Command::Run {
                role_id: "ghost".to_string(),
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, DasaError::RoleNotFound(_)));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            dispatcher.available_roles_line(),
            "Available personas: a, b"
        );
    }

    #[tokio::test]
    async fn test_builtin_roster_hint_names_all_ten_personas() {
        let dispatcher = dispatcher_over(Arc::new(Roster::builtin()));

        let line = dispatcher.available_roles_line();
        for id in [
            "patih", "kala", "widya", "dharma", "sastra", "dwipa", "mpu", "nala", "indra", "rsi",
        ] {
            assert!(line.contains(id), "hint is missing persona '{}'", id);
        }
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_config_roundtrip_with_roster_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");

        let mut config = DasaConfig::new();
        config.grace_secs = 3;
        config.roster = Some(vec![
            command_role("x", "worker-x", &["--serve"]),
            command_role("y", "worker-y", &[]),
        ]);
        config.save(&path).unwrap();

        let loaded = DasaConfig::load(&path).unwrap();
        assert_eq!(loaded.grace_secs, 3);

        let roster = loaded.build_roster().unwrap();
        assert_eq!(roster.ids(), vec!["x", "y"]);
        assert_eq!(roster.resolve("x").unwrap().launch.args, vec!["--serve"]);
    }

    #[test]
    fn test_workspace_scaffold_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let report = dasa::workspace::scaffold(temp_dir.path(), &config_path).unwrap();
        assert!(report.logs_dir.is_dir());
        assert!(report.config_created);

        // The scaffolded config points the supervisor's logs at the tree
        let config = DasaConfig::load(&config_path).unwrap();
        assert_eq!(config.logs_dir(), report.logs_dir);
    }
}
