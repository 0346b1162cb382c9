//! Worker handle and lifecycle states
//!
//! A WorkerHandle is the per-spawn record the supervisor keeps for one
//! worker process: which persona it belongs to, where it is in its
//! lifecycle, and when it started and ended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Lifecycle state of a worker process
///
/// Transitions are totally ordered per handle:
/// Pending → Running → {Exited | Failed | Terminated}.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Launch requested, process not yet confirmed
    Pending,

    /// Process is running
    Running,

    /// Process ended on its own with this exit code
    Exited(i32),

    /// Process died without an exit code (signal) or could not be awaited
    Failed(String),

    /// Process was stopped on request (gracefully or force-killed after the
    /// grace period)
    Terminated,
}

impl WorkerState {
    /// Whether the worker still occupies its role slot as a live process
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// Whether the worker reached a terminal state
    pub fn is_terminal(&self) -> bool {
        !self.is_live()
    }

    /// Short label for tables and logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Exited(_) => "exited",
            Self::Failed(_) => "failed",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited({})", code),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
            other => f.write_str(other.label()),
        }
    }
}

/// Record of one spawned worker process
///
/// Created by `Supervisor::spawn`, mutated only behind the supervisor's
/// lock, and removed only by `reap` — a terminal handle stays queryable
/// until the caller acknowledges it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerHandle {
    /// Roster id of the persona this worker belongs to
    pub role_id: String,

    /// Current lifecycle state
    pub state: WorkerState,

    /// When the spawn was requested
    pub started_at: DateTime<Utc>,

    /// When the worker reached a terminal state
    pub ended_at: Option<DateTime<Utc>>,

    /// OS process id, once the launch succeeded
    pub pid: Option<u32>,
}

impl WorkerHandle {
    /// Create a fresh Pending handle for a role
    pub fn new(role_id: impl Into<String>) -> Self {
        Self {
            role_id: role_id.into(),
            state: WorkerState::Pending,
            started_at: Utc::now(),
            ended_at: None,
            pid: None,
        }
    }

    /// How long the worker has been (or was) alive
    pub fn runtime(&self) -> Duration {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).to_std().unwrap_or_default()
    }

    /// Format runtime as a human-readable string
    pub fn format_runtime(&self) -> String {
        let secs = self.runtime().as_secs();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
        }
    }

    /// One-line description for logs and plain status output
    pub fn status_line(&self) -> String {
        let pid = self
            .pid
            .map(|p| format!("pid {}", p))
            .unwrap_or_else(|| "no pid".to_string());

        format!("{} ({}, up {})", self.state, pid, self.format_runtime())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_handle_is_pending() {
        let handle = WorkerHandle::new("patih");

        assert_eq!(handle.role_id, "patih");
        assert_eq!(handle.state, WorkerState::Pending);
        assert!(handle.ended_at.is_none());
        assert!(handle.pid.is_none());
    }

    #[test]
    fn test_state_classification() {
        assert!(WorkerState::Pending.is_live());
        assert!(WorkerState::Running.is_live());
        assert!(WorkerState::Exited(0).is_terminal());
        assert!(WorkerState::Failed("signal 9".into()).is_terminal());
        assert!(WorkerState::Terminated.is_terminal());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(WorkerState::Running.to_string(), "running");
        assert_eq!(WorkerState::Exited(3).to_string(), "exited(3)");
        assert_eq!(
            WorkerState::Failed("killed by signal 9".into()).to_string(),
            "failed: killed by signal 9"
        );
    }

    #[test]
    fn test_runtime_uses_ended_at_when_set() {
        let mut handle = WorkerHandle::new("kala");
        handle.started_at = Utc::now() - chrono::Duration::seconds(90);
        handle.ended_at = Some(handle.started_at + chrono::Duration::seconds(30));

        assert_eq!(handle.runtime().as_secs(), 30);
        assert_eq!(handle.format_runtime(), "30s");
    }

    #[test]
    fn test_format_runtime_minutes_and_hours() {
        let mut handle = WorkerHandle::new("kala");
        handle.started_at = Utc::now() - chrono::Duration::seconds(125);
        assert_eq!(handle.format_runtime(), "2m 5s");

        handle.started_at = Utc::now() - chrono::Duration::seconds(3660);
        assert_eq!(handle.format_runtime(), "1h 01m");
    }

    #[test]
    fn test_json_roundtrip() {
        let handle = WorkerHandle::new("rsi");
        let json = serde_json::to_string(&handle).unwrap();
        let parsed: WorkerHandle = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.role_id, "rsi");
        assert_eq!(parsed.state, WorkerState::Pending);
    }
}
