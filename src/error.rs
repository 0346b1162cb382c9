//! Error types for Dasa
//!
//! Defines the error enum covering all failure modes across the system.
//! Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for Dasa operations
pub type Result<T> = std::result::Result<T, DasaError>;

/// Comprehensive error type for Dasa operations
#[derive(Error, Debug)]
pub enum DasaError {
    /// Unknown persona id (user error)
    #[error("Persona '{0}' not found")]
    RoleNotFound(String),

    /// Spawn attempted while the role already holds a worker handle
    #[error("Persona '{0}' already has a worker (reap it before respawning)")]
    RoleBusy(String),

    /// The OS refused to launch the worker process
    #[error("Failed to launch worker for persona '{role}': {source}")]
    LaunchFailed {
        role: String,
        #[source]
        source: std::io::Error,
    },

    /// Terminate/reap called for a role with no matching worker
    #[error("Persona '{0}' has no worker to act on")]
    NotRunning(String),

    /// Reap called while the worker is still live
    #[error("Persona '{0}' is still active; terminate it first")]
    StillActive(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl DasaError {
    /// Process exit code for this error.
    ///
    /// The dispatcher translates every core error into a message plus an
    /// exit code; `main` is the only place that actually exits.
    pub fn exit_code(&self) -> i32 {
        match self {
            DasaError::LaunchFailed { .. } => 2,
            _ => 1,
        }
    }
}
