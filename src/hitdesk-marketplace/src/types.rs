//! Marketplace data types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Marketplace operating environment. Sandbox and live are fully isolated
/// worker sites; every API call targets exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    Live,
}

impl Environment {
    /// The opposite environment.
    pub fn toggled(self) -> Self {
        match self {
            Environment::Sandbox => Environment::Live,
            Environment::Live => Environment::Sandbox,
        }
    }

    pub fn is_sandbox(self) -> bool {
        matches!(self, Environment::Sandbox)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Sandbox => write!(f, "sandbox"),
            Environment::Live => write!(f, "live"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sandbox" => Ok(Environment::Sandbox),
            "live" => Ok(Environment::Live),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// A published HIT as reported by the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    pub hit_id: String,
    pub title: String,
    pub max_assignments: u32,
    /// Reward per assignment, dollars.cents.
    pub reward: String,
    pub duration_hours: u32,
    pub expiration: Option<String>,
    pub status: String,
}

/// One worker's acceptance of a HIT, subject to approve/reject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: String,
    pub hit_id: String,
    pub worker_id: String,
    pub status: String,
}

/// Parameters for publishing a new HIT. Fully validated by the shell before
/// it reaches the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HitRequest {
    pub environment: Environment,
    pub max_assignments: u32,
    /// Dollars.cents, e.g. "2.00". Validated against `^\d*\.\d\d$`.
    pub reward: String,
    pub duration_hours: u32,
}

/// Server acknowledgement of a created HIT.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedHit {
    pub hit_id: String,
}

/// Account balance for the targeted environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
    pub available: String,
    pub currency: String,
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.available, self.currency)
    }
}
