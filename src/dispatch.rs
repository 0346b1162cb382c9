//! Command dispatching
//!
//! Translates external commands into supervisor/workspace calls. The
//! dispatcher owns no worker state and processes one command at a time;
//! the workers it spawns run concurrently on their own. It is also the
//! only place core errors become user-visible messages — `main` just
//! forwards the exit code.

use crate::config::DasaConfig;
use crate::dashboard;
use crate::roster::Roster;
use crate::status::StatusReporter;
use crate::supervisor::Supervisor;
use crate::workspace;
use crate::{DasaError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A command accepted by the dispatcher
#[derive(Debug, Clone)]
pub enum Command {
    /// Scaffold the workspace and default config
    Init,

    /// Run the live dashboard until cancelled, then drain all workers
    Up { refresh_ms: Option<u64> },

    /// Spawn one persona's worker
    Run { role_id: String },

    /// Print a one-shot status snapshot
    Status { json: bool },

    /// Terminate one persona's worker
    Stop { role_id: String },

    /// List the configured personas
    Roles,
}

/// Command dispatcher
pub struct Dispatcher {
    config: DasaConfig,
    config_path: PathBuf,
    roster: Arc<Roster>,
    supervisor: Arc<Supervisor>,
    reporter: StatusReporter,
}

impl Dispatcher {
    /// Create a dispatcher over the assembled core components
    pub fn new(
        config: DasaConfig,
        config_path: PathBuf,
        roster: Arc<Roster>,
        supervisor: Arc<Supervisor>,
        reporter: StatusReporter,
    ) -> Self {
        Self {
            config,
            config_path,
            roster,
            supervisor,
            reporter,
        }
    }

    /// Handle one command to completion
    pub async fn dispatch(&self, command: Command) -> Result<()> {
        match command {
            Command::Init => self.init(),
            Command::Up { refresh_ms } => self.up(refresh_ms).await,
            Command::Run { role_id } => self.run_role(&role_id).await,
            Command::Status { json } => self.status(json),
            Command::Stop { role_id } => self.stop_role(&role_id).await,
            Command::Roles => {
                self.roles();
                Ok(())
            }
        }
    }

    /// The hint printed alongside unknown-persona errors
    pub fn available_roles_line(&self) -> String {
        format!("Available personas: {}", self.roster.ids().join(", "))
    }

    fn init(&self) -> Result<()> {
        println!("Initializing Dasa workspace...");

        let report = workspace::scaffold(&self.config.workspace, &self.config_path)?;

        println!("✓ Workspace ready at {}", report.workspace_dir.display());
        if report.config_created {
            println!(
                "✓ Created configuration at {}",
                report.config_path.display()
            );
        } else {
            println!(
                "Configuration already exists at {}",
                report.config_path.display()
            );
        }
        println!();
        println!("Next steps:");
        println!("  dasa run <id>   Spawn a persona worker");
        println!("  dasa up         Boot the live dashboard");
        println!("  dasa roles      See the available personas");

        Ok(())
    }

    async fn up(&self, refresh_ms: Option<u64>) -> Result<()> {
        let refresh = refresh_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.config.refresh_interval());

        // The dashboard loop blocks this thread; monitor tasks keep running
        // on the rest of the runtime.
        tokio::task::block_in_place(|| dashboard::run(&self.reporter, refresh))?;

        // Nothing may outlive the controlling session.
        let stopped = self.supervisor.shutdown_all().await;
        if stopped > 0 {
            println!("Terminated {} active workers.", stopped);
        }
        println!("Dashboard closed.");

        Ok(())
    }

    async fn run_role(&self, role_id: &str) -> Result<()> {
        match self.supervisor.spawn(role_id).await {
            Ok(handle) => {
                // resolve() cannot fail after a successful spawn
                let responsibility = self
                    .roster
                    .resolve(role_id)
                    .map(|r| r.responsibility.as_str())
                    .unwrap_or_default();
                let pid = handle
                    .pid
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "?".to_string());
                println!(
                    "[OK] Persona '{}' is running in the background (pid {}): {}",
                    role_id, pid, responsibility
                );
                Ok(())
            }
            Err(e @ DasaError::RoleNotFound(_)) => {
                eprintln!("{}", self.available_roles_line());
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn status(&self, json: bool) -> Result<()> {
        let snapshot = self.reporter.snapshot();

        if json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            return Ok(());
        }

        let active = snapshot.iter().filter(|s| s.state.is_active()).count();
        if active == 0 {
            println!("[ IDLE ] All {} personas are currently resting", snapshot.len());
        } else {
            println!("{} of {} personas active", active, snapshot.len());
        }
        println!();

        for entry in &snapshot {
            let detail = match entry.state.handle() {
                Some(handle) => handle.status_line(),
                None => entry.role.responsibility.clone(),
            };
            println!(
                "  [ {:<10} ] {:<8} {}",
                entry.state.label().to_uppercase(),
                entry.role.id,
                detail
            );
        }

        Ok(())
    }

    async fn stop_role(&self, role_id: &str) -> Result<()> {
        match self.supervisor.terminate(role_id).await {
            Ok(()) => {
                println!("Persona '{}' terminated.", role_id);
                Ok(())
            }
            Err(e @ DasaError::RoleNotFound(_)) => {
                eprintln!("{}", self.available_roles_line());
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn roles(&self) {
        println!("Configured personas ({}):", self.roster.len());
        println!();
        for role in self.roster.all() {
            println!(
                "  {:<8} {:<10} {}",
                role.id, role.display_name, role.responsibility
            );
        }
    }
}
