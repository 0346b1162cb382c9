//! Dasa - Persona Process Supervisor and Task Dispatcher
//!
//! Dasa manages a fixed roster of ten named "persona" worker roles. Each
//! persona maps to an external program; Dasa spawns those programs as real
//! OS processes, tracks their lifecycle, multiplexes status back to a live
//! dashboard, and guarantees that no worker outlives the controlling
//! session.
//!
//! # Architecture
//!
//! - **roster**: immutable persona registry (id, name, responsibility,
//!   launch command)
//! - **supervisor**: worker lifecycle — spawn, exit monitoring, graceful
//!   termination, reaping
//! - **status**: point-in-time snapshots of every persona for rendering
//! - **dispatch**: translates CLI commands into supervisor calls and owns
//!   error-to-exit-code mapping
//! - **dashboard**: ratatui display sink for `dasa up`
//! - **config**: ~/.config/dasa/config.yaml handling
//! - **workspace**: `.dasa/` scaffolding behind `dasa init`

// Core modules
pub mod config;
pub mod error;
pub mod roster;
pub mod supervisor;

// Components
pub mod dashboard;
pub mod dispatch;
pub mod logging;
pub mod status;
pub mod workspace;

// Re-exports
pub use error::{DasaError, Result};
