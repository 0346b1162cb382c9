//! Supervisor for persona worker processes
//!
//! Owns the live worker-handle table and serializes every mutation behind a
//! single lock. Each spawned worker gets a monitor task that records the
//! process exit asynchronously, so status is ground truth even when nobody
//! is polling.

use crate::roster::Roster;
use crate::supervisor::handle::{WorkerHandle, WorkerState};
use crate::{DasaError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Default grace period between SIGTERM and SIGKILL
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// One occupied role slot: the handle plus the control channels shared with
/// the worker's monitor task
struct Slot {
    handle: WorkerHandle,
    stop_tx: Option<oneshot::Sender<()>>,
    state_rx: watch::Receiver<WorkerState>,
}

/// Type alias for the shared handle table to reduce complexity
type WorkerTable = Arc<RwLock<HashMap<String, Slot>>>;

/// Supervisor
///
/// Central owner of worker lifecycle state. At most one live worker exists
/// per role at any time; a terminal handle keeps its slot until `reap`
/// acknowledges it, so post-mortem status stays queryable.
pub struct Supervisor {
    roster: Arc<Roster>,
    table: WorkerTable,
    grace: Duration,
    log_dir: Option<PathBuf>,
}

impl Supervisor {
    /// Create a supervisor over a roster
    pub fn new(roster: Arc<Roster>) -> Self {
        Self {
            roster,
            table: Arc::new(RwLock::new(HashMap::new())),
            grace: DEFAULT_GRACE_PERIOD,
            log_dir: None,
        }
    }

    /// Set the termination grace period
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Set the directory worker stdout/stderr is appended to
    /// (`<dir>/<role>.log`); without it worker output is discarded
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Spawn a worker for a role
    ///
    /// Returns once the OS has accepted the launch; completion is observed
    /// by the monitor task, never awaited here. The role slot is reserved
    /// with a Pending handle under the write lock, so concurrent spawns of
    /// the same role cannot both win.
    pub async fn spawn(&self, role_id: &str) -> Result<WorkerHandle> {
        let role = self
            .roster
            .resolve(role_id)
            .ok_or_else(|| DasaError::RoleNotFound(role_id.to_string()))?
            .clone();

        let (state_tx, state_rx) = watch::channel(WorkerState::Pending);
        let (stop_tx, stop_rx) = oneshot::channel();

        // Reserve the slot. A retained terminal handle also blocks the
        // role until it is reaped.
        {
            let mut table = self.table.write().unwrap();
            if table.contains_key(&role.id) {
                return Err(DasaError::RoleBusy(role.id.clone()));
            }
            table.insert(
                role.id.clone(),
                Slot {
                    handle: WorkerHandle::new(&role.id),
                    stop_tx: Some(stop_tx),
                    state_rx,
                },
            );
        }

        let (stdout, stderr) = self.log_stdio(&role.id);
        let mut command = Command::new(&role.launch.program);
        command
            .args(&role.launch.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                // Roll back the reservation; the role stays free.
                self.table.write().unwrap().remove(&role.id);
                return Err(DasaError::LaunchFailed {
                    role: role.id.clone(),
                    source: e,
                });
            }
        };

        let pid = child.id();
        let handle = {
            let mut table = self.table.write().unwrap();
            match table.get_mut(&role.id) {
                Some(slot) => {
                    slot.handle.state = WorkerState::Running;
                    slot.handle.pid = pid;
                    slot.handle.clone()
                }
                None => {
                    // Reservation vanished mid-launch; don't leak the child.
                    let _ = child.start_kill();
                    return Err(DasaError::Other(format!(
                        "Worker table entry for '{}' disappeared during launch",
                        role.id
                    )));
                }
            }
        };
        let _ = state_tx.send(WorkerState::Running);

        info!(role = %role.id, pid = ?pid, "Spawned worker");

        let table = Arc::clone(&self.table);
        let grace = self.grace;
        let monitored_role = role.id.clone();
        tokio::spawn(async move {
            monitor(table, monitored_role, child, state_tx, stop_rx, grace).await;
        });

        Ok(handle)
    }

    /// Snapshot of one role's handle, if any is live or retained
    pub fn status(&self, role_id: &str) -> Option<WorkerHandle> {
        let table = self.table.read().unwrap();
        table.get(role_id).map(|slot| slot.handle.clone())
    }

    /// Live (Pending or Running) handles, in roster order
    pub fn list_active(&self) -> Vec<WorkerHandle> {
        let table = self.table.read().unwrap();
        self.roster
            .all()
            .iter()
            .filter_map(|role| table.get(&role.id))
            .filter(|slot| slot.handle.state.is_live())
            .map(|slot| slot.handle.clone())
            .collect()
    }

    /// Request graceful termination of a role's worker
    ///
    /// Suspends until the handle reaches a terminal state: the worker gets
    /// SIGTERM, the grace period to comply, then SIGKILL.
    pub async fn terminate(&self, role_id: &str) -> Result<()> {
        if self.roster.resolve(role_id).is_none() {
            return Err(DasaError::RoleNotFound(role_id.to_string()));
        }

        let (stop_tx, mut state_rx) = {
            let mut table = self.table.write().unwrap();
            let slot = table
                .get_mut(role_id)
                .ok_or_else(|| DasaError::NotRunning(role_id.to_string()))?;
            if !slot.handle.state.is_live() {
                return Err(DasaError::NotRunning(role_id.to_string()));
            }
            (slot.stop_tx.take(), slot.state_rx.clone())
        };

        if let Some(tx) = stop_tx {
            debug!(role = %role_id, "Requesting worker termination");
            let _ = tx.send(());
        }

        // The monitor records the terminal state in the table before it
        // publishes on the watch channel, so waking here means the table
        // is already consistent.
        if state_rx.wait_for(|s| s.is_terminal()).await.is_err() {
            warn!(role = %role_id, "Monitor ended before confirming termination");
        }

        info!(role = %role_id, "Worker terminated");
        Ok(())
    }

    /// Remove a terminal handle, freeing the role for respawn
    pub fn reap(&self, role_id: &str) -> Result<()> {
        if self.roster.resolve(role_id).is_none() {
            return Err(DasaError::RoleNotFound(role_id.to_string()));
        }

        let mut table = self.table.write().unwrap();
        match table.get(role_id) {
            None => Err(DasaError::NotRunning(role_id.to_string())),
            Some(slot) if slot.handle.state.is_live() => {
                Err(DasaError::StillActive(role_id.to_string()))
            }
            Some(_) => {
                table.remove(role_id);
                debug!(role = %role_id, "Reaped worker handle");
                Ok(())
            }
        }
    }

    /// Reap a terminal handle if one is retained, then spawn
    ///
    /// Retry is always a caller decision; this is the convenience for it.
    /// A still-live worker makes this fail with RoleBusy, same as `spawn`.
    pub async fn respawn(&self, role_id: &str) -> Result<WorkerHandle> {
        if self.roster.resolve(role_id).is_none() {
            return Err(DasaError::RoleNotFound(role_id.to_string()));
        }

        {
            let mut table = self.table.write().unwrap();
            if let Some(slot) = table.get(role_id) {
                if slot.handle.state.is_terminal() {
                    table.remove(role_id);
                }
            }
        }

        self.spawn(role_id).await
    }

    /// Terminate every live worker and wait for each to finish
    ///
    /// Signals all workers first so they wind down in parallel, then awaits
    /// each confirmation. Returns how many workers were stopped. Used on
    /// dashboard shutdown so nothing outlives the controller.
    pub async fn shutdown_all(&self) -> usize {
        let waiters: Vec<(String, watch::Receiver<WorkerState>)> = {
            let mut table = self.table.write().unwrap();
            table
                .iter_mut()
                .filter(|(_, slot)| slot.handle.state.is_live())
                .map(|(id, slot)| {
                    if let Some(tx) = slot.stop_tx.take() {
                        let _ = tx.send(());
                    }
                    (id.clone(), slot.state_rx.clone())
                })
                .collect()
        };

        let stopped = waiters.len();
        for (role_id, mut state_rx) in waiters {
            if state_rx.wait_for(|s| s.is_terminal()).await.is_err() {
                warn!(role = %role_id, "Monitor ended before confirming shutdown");
            }
            debug!(role = %role_id, "Worker shut down");
        }

        if stopped > 0 {
            info!(stopped, "All workers shut down");
        }
        stopped
    }

    /// stdout/stderr sinks for a worker: append to `<log_dir>/<role>.log`
    /// when the log directory exists, otherwise discard
    fn log_stdio(&self, role_id: &str) -> (Stdio, Stdio) {
        if let Some(dir) = &self.log_dir {
            if dir.is_dir() {
                let path = dir.join(format!("{}.log", role_id));
                if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
                    if let Ok(clone) = file.try_clone() {
                        return (Stdio::from(file), Stdio::from(clone));
                    }
                }
                warn!(path = %path.display(), "Could not open worker log, discarding output");
            }
        }
        (Stdio::null(), Stdio::null())
    }
}

/// Per-worker monitor: owns the child, records its terminal state
///
/// The single post-Running writer for its role. Table update happens before
/// the watch publish so no reader can observe states out of order.
async fn monitor(
    table: WorkerTable,
    role_id: String,
    mut child: Child,
    state_tx: watch::Sender<WorkerState>,
    stop_rx: oneshot::Receiver<()>,
    grace: Duration,
) {
    let state = tokio::select! {
        status = child.wait() => match status {
            Ok(status) => exit_state(status),
            Err(e) => WorkerState::Failed(format!("wait failed: {}", e)),
        },
        _ = stop_rx => {
            request_stop(&mut child);
            if tokio::time::timeout(grace, child.wait()).await.is_err() {
                warn!(role = %role_id, "Grace period elapsed, killing worker");
                let _ = child.kill().await;
            }
            WorkerState::Terminated
        }
    };

    info!(role = %role_id, state = %state, "Worker reached terminal state");

    {
        let mut table = table.write().unwrap();
        if let Some(slot) = table.get_mut(&role_id) {
            slot.handle.state = state.clone();
            slot.handle.ended_at = Some(Utc::now());
        }
    }
    let _ = state_tx.send(state);
}

/// Map a process exit status to a worker state
fn exit_state(status: std::process::ExitStatus) -> WorkerState {
    if let Some(code) = status.code() {
        return WorkerState::Exited(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return WorkerState::Failed(format!("killed by signal {}", sig));
        }
    }

    WorkerState::Failed("exited without a status code".to_string())
}

/// Ask a worker to stop: SIGTERM on unix, immediate kill elsewhere
fn request_stop(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            tracing::debug!(pid, "Sending SIGTERM");
            let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
    }

    #[cfg(not(unix))]
    {
        let _ = child.start_kill();
    }
}
