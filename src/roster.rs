//! Persona roster
//!
//! Immutable registry of the worker roles Dasa can supervise. The ten Dasa
//! personas are built in; a config file can replace the table without any
//! change to the supervisor contract.

use crate::{DasaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Command used to launch a persona's worker process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSpec {
    /// Program name or path
    pub program: String,

    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,
}

impl LaunchSpec {
    /// Create a launch spec with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Set the argument list
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// A persona worker role
///
/// Defined once at startup and never mutated. The supervisor treats the
/// launch spec as opaque; what the program actually does is up to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier (e.g. "patih")
    pub id: String,

    /// Human-readable name for dashboards
    pub display_name: String,

    /// One-line description of what this persona is for
    pub responsibility: String,

    /// How to launch this persona's worker
    pub launch: LaunchSpec,
}

impl Role {
    /// Create a role whose worker is `dasa-<id>` with no arguments
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        responsibility: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let launch = LaunchSpec::new(format!("dasa-{}", id));
        Self {
            id,
            display_name: display_name.into(),
            responsibility: responsibility.into(),
            launch,
        }
    }

    /// Override the launch spec
    pub fn with_launch(mut self, launch: LaunchSpec) -> Self {
        self.launch = launch;
        self
    }
}

/// Ordered, immutable collection of roles
///
/// Order is fixed at construction and drives dashboard rendering, so two
/// snapshots always list personas the same way.
#[derive(Debug, Clone)]
pub struct Roster {
    roles: Vec<Role>,
}

impl Roster {
    /// Build a roster from a role list, rejecting duplicate ids
    pub fn new(roles: Vec<Role>) -> Result<Self> {
        if roles.is_empty() {
            return Err(DasaError::Config("Roster must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for role in &roles {
            if !seen.insert(role.id.as_str()) {
                return Err(DasaError::Config(format!(
                    "Duplicate persona id in roster: {}",
                    role.id
                )));
            }
        }

        Ok(Self { roles })
    }

    /// The built-in ten-persona Dasa roster
    pub fn builtin() -> Self {
        let roles = vec![
            Role::new("patih", "Patih", "Orchestrating workflows"),
            Role::new("kala", "Kala", "Project tracking"),
            Role::new("widya", "Widya", "Data research"),
            Role::new("dharma", "Dharma", "Security & secrets"),
            Role::new("sastra", "Sastra", "Docs & API specs"),
            Role::new("dwipa", "Dwipa", "Integrating external tools"),
            Role::new("mpu", "Mpu", "Backend architecture"),
            Role::new("nala", "Nala", "Frontend & UI matching"),
            Role::new("indra", "Indra", "Testing & QA verification"),
            Role::new("rsi", "Rsi", "Deep architectural consultation"),
        ];

        // Built-in ids are distinct by construction
        Self { roles }
    }

    /// Look up a role by id
    pub fn resolve(&self, id: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    /// All roles, in roster order
    pub fn all(&self) -> &[Role] {
        &self.roles
    }

    /// All role ids, in roster order (for error messages and listings)
    pub fn ids(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.id.as_str()).collect()
    }

    /// Number of roles
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether the roster is empty (never true for a constructed roster)
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
