//! Workspace scaffolding
//!
//! The collaborator behind `dasa init`: creates the `.dasa/` working tree
//! (worker logs) and writes a default config file when none exists. On any
//! failure the roster and supervisor are untouched, because neither is
//! involved here.

use crate::config::DasaConfig;
use crate::{DasaError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the working directory created inside the workspace root
pub const WORKSPACE_DIR: &str = ".dasa";

/// Name of the logs directory inside the working directory
pub const LOGS_DIR: &str = "logs";

/// What `scaffold` created (or found already present)
#[derive(Debug)]
pub struct ScaffoldReport {
    /// The `.dasa/` working directory
    pub workspace_dir: PathBuf,

    /// The worker logs directory
    pub logs_dir: PathBuf,

    /// Where the config file lives
    pub config_path: PathBuf,

    /// Whether a fresh default config was written
    pub config_created: bool,
}

/// Create the workspace tree under `root` and a default config at
/// `config_path` if missing
pub fn scaffold(root: impl AsRef<Path>, config_path: impl AsRef<Path>) -> Result<ScaffoldReport> {
    let root = root.as_ref();
    let config_path = config_path.as_ref();

    let workspace_dir = root.join(WORKSPACE_DIR);
    let logs_dir = workspace_dir.join(LOGS_DIR);

    fs::create_dir_all(&logs_dir).map_err(|e| {
        DasaError::Config(format!(
            "Failed to create workspace directory {}: {}",
            logs_dir.display(),
            e
        ))
    })?;

    let config_created = if config_path.exists() {
        false
    } else {
        let mut config = DasaConfig::new();
        config.workspace = root.to_path_buf();
        config.save(config_path)?;
        true
    };

    tracing::info!(
        workspace = %workspace_dir.display(),
        config = %config_path.display(),
        config_created,
        "Workspace scaffolded"
    );

    Ok(ScaffoldReport {
        workspace_dir,
        logs_dir,
        config_path: config_path.to_path_buf(),
        config_created,
    })
}
