//! Role model shared across the portal.
//!
//! Roles are stored as lowercase strings by the backing store; the closed
//! enumeration here replaces ad-hoc string comparison so authorization
//! checks are exhaustive matches.

use serde::{Deserialize, Serialize};

/// Application-level role carried by a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End customer booking flights
    Client,
    /// Charter-operator company user
    Company,
    /// Platform administrator
    Superadmin,
}

impl Role {
    /// Whether this role grants access to the company portal.
    pub fn has_company_access(&self) -> bool {
        matches!(self, Role::Company | Role::Superadmin)
    }

    /// Stable string form, matching the stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Company => "company",
            Role::Superadmin => "superadmin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
