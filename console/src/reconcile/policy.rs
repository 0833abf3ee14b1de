//! Server reassignment rules

use serde::{Deserialize, Serialize};

use fleet_models::UNASSIGNED;

use crate::errors::ConsoleError;

/// Which assignment changes an operator may make
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReassignmentPolicy {
    /// Any online server, `Unassigned`, or the current value
    #[default]
    Free,

    /// As `Free`, but an assigned station must be released to `Unassigned`
    /// before it can move to another server
    StrictOneHop,
}

impl ReassignmentPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReassignmentPolicy::Free => "free",
            ReassignmentPolicy::StrictOneHop => "strict_one_hop",
        }
    }

    /// Check a change from `current` to `target`
    ///
    /// `current` is the effective assignment, [`UNASSIGNED`] when unset.
    pub fn check(&self, current: &str, target: &str, online: &[String]) -> Result<(), ConsoleError> {
        if target == current || target == UNASSIGNED {
            return Ok(());
        }
        if !online.iter().any(|s| s == target) {
            return Err(ConsoleError::ValidationError(format!(
                "Server {} is not online",
                target
            )));
        }
        if *self == ReassignmentPolicy::StrictOneHop && current != UNASSIGNED {
            return Err(ConsoleError::ValidationError(format!(
                "Station is assigned to {}; set it to {} before moving it to {}",
                current, UNASSIGNED, target
            )));
        }
        Ok(())
    }

    /// Values the operator may pick, `Unassigned` first
    pub fn assignment_options(&self, current: &str, online: &[String]) -> Vec<String> {
        let mut servers: Vec<String> = match self {
            ReassignmentPolicy::StrictOneHop if current != UNASSIGNED => vec![current.to_string()],
            _ => {
                let mut servers = online.to_vec();
                if current != UNASSIGNED {
                    servers.push(current.to_string());
                }
                servers
            }
        };
        servers.retain(|s| s != UNASSIGNED);
        servers.sort();
        servers.dedup();

        let mut options = Vec::with_capacity(servers.len() + 1);
        options.push(UNASSIGNED.to_string());
        options.extend(servers);
        options
    }
}

impl std::fmt::Display for ReassignmentPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
