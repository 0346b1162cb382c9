//! Worker process supervision
//!
//! Lifecycle management for persona worker processes: spawning, exit
//! monitoring, graceful termination, and post-mortem handle retention.
//!
//! # Overview
//!
//! - **Spawn**: launch a role's worker as a real OS process; the role slot
//!   is held by exactly one live worker at a time
//! - **Monitor**: a per-worker task awaits the process and records its
//!   terminal state with no caller polling
//! - **Terminate**: SIGTERM, a bounded grace period, then SIGKILL
//! - **Reap**: terminal handles stay queryable until explicitly removed,
//!   which frees the role for respawning
//!
//! # Example
//!
//! ```ignore
//! use dasa::roster::Roster;
//! use dasa::supervisor::Supervisor;
//! use std::sync::Arc;
//!
//! let supervisor = Supervisor::new(Arc::new(Roster::builtin()));
//!
//! let handle = supervisor.spawn("widya").await?;
//! println!("widya worker pid: {:?}", handle.pid);
//!
//! supervisor.terminate("widya").await?;
//! supervisor.reap("widya")?;
//! ```

mod handle;
mod manager;

pub use handle::{WorkerHandle, WorkerState};
pub use manager::{Supervisor, DEFAULT_GRACE_PERIOD};
