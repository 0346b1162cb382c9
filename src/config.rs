//! Configuration file handling
//!
//! Loads and manages the ~/.config/dasa/config.yaml file: dashboard refresh
//! rate, termination grace period, workspace location, and an optional
//! roster override.

use crate::roster::{Role, Roster};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_refresh_ms() -> u64 {
    500
}

fn default_grace_secs() -> u64 {
    5
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Dasa configuration
///
/// Represents the complete ~/.config/dasa/config.yaml file. Every field has
/// a default, so a missing file behaves the same as an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DasaConfig {
    /// Dashboard refresh interval in milliseconds
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,

    /// Grace period for worker termination, in seconds (SIGTERM → SIGKILL)
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,

    /// Directory that holds the `.dasa/` working tree (logs etc.)
    #[serde(default = "default_workspace_dir")]
    pub workspace: PathBuf,

    /// Optional roster override; the built-in ten personas are used when absent
    #[serde(default)]
    pub roster: Option<Vec<Role>>,
}

impl Default for DasaConfig {
    fn default() -> Self {
        Self {
            refresh_ms: default_refresh_ms(),
            grace_secs: default_grace_secs(),
            workspace: default_workspace_dir(),
            roster: None,
        }
    }
}

impl DasaConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::DasaError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading Dasa configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        Ok(config)
    }

    /// Load from the default path, falling back to defaults when the file
    /// does not exist yet (`run`/`up` work before `init`)
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!("No config file; using built-in defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving Dasa configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/dasa/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("dasa");
        path.push("config.yaml");
        path
    }

    /// Dashboard refresh interval
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(50))
    }

    /// Worker termination grace period
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }

    /// Directory for per-persona worker logs (`<workspace>/.dasa/logs`)
    pub fn logs_dir(&self) -> PathBuf {
        self.workspace.join(".dasa").join("logs")
    }

    /// Build the effective roster: the configured override, or the built-in
    /// ten personas
    pub fn build_roster(&self) -> Result<Roster> {
        match &self.roster {
            Some(roles) => Roster::new(roles.clone()),
            None => Ok(Roster::builtin()),
        }
    }
}
