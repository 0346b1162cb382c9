//! Status reporting
//!
//! Derives renderable snapshots from supervisor state. A snapshot covers
//! every persona in roster order, substituting Idle for roles without a
//! worker handle, and is computed fresh on every call so polling callers
//! never see stale data.

use crate::roster::{Role, Roster};
use crate::supervisor::{Supervisor, WorkerHandle};
use serde::Serialize;
use std::sync::Arc;

/// Display state of one roster entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleState {
    /// No worker handle exists for this role
    Idle,

    /// A worker handle exists (live or retained terminal)
    Worker(WorkerHandle),
}

impl RoleState {
    /// Short label for tables
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Worker(handle) => handle.state.label(),
        }
    }

    /// The worker handle, if one exists
    pub fn handle(&self) -> Option<&WorkerHandle> {
        match self {
            Self::Idle => None,
            Self::Worker(handle) => Some(handle),
        }
    }

    /// Whether a live worker backs this entry
    pub fn is_active(&self) -> bool {
        self.handle().is_some_and(|h| h.state.is_live())
    }
}

/// One row of a status snapshot
#[derive(Debug, Clone, Serialize)]
pub struct RoleStatus {
    /// The roster entry
    pub role: Role,

    /// Its current display state
    pub state: RoleState,
}

/// Status reporter
///
/// Read-only view over the supervisor; never mutates worker state.
#[derive(Clone)]
pub struct StatusReporter {
    roster: Arc<Roster>,
    supervisor: Arc<Supervisor>,
}

impl StatusReporter {
    /// Create a reporter over a roster and supervisor
    pub fn new(roster: Arc<Roster>, supervisor: Arc<Supervisor>) -> Self {
        Self { roster, supervisor }
    }

    /// Point-in-time snapshot: one entry per roster role, in roster order
    pub fn snapshot(&self) -> Vec<RoleStatus> {
        self.roster
            .all()
            .iter()
            .map(|role| {
                let state = match self.supervisor.status(&role.id) {
                    Some(handle) => RoleState::Worker(handle),
                    None => RoleState::Idle,
                };
                RoleStatus {
                    role: role.clone(),
                    state,
                }
            })
            .collect()
    }

    /// Number of live workers in the current snapshot
    pub fn active_count(&self) -> usize {
        self.supervisor.list_active().len()
    }
}
