//! Configuration management for the HeliConnect portal.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub auth: AuthConfig,
    pub routes: RouteConfig,
}

/// Knobs forwarded to the identity service client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Storage key under which the session is persisted client-side
    pub storage_key: String,
    /// Keep the session across restarts
    pub persist_session: bool,
    /// Let the identity service refresh tokens in the background
    pub auto_refresh_token: bool,
}

/// Route targets consumed by the gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Sign-in entry point for unauthenticated visitors
    pub sign_in_path: String,
    /// Default landing page once authenticated with company access
    pub dashboard_path: String,
    /// Public site that non-company users are sent to
    pub external_site_url: String,
}

impl PortalConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            auth: AuthConfig {
                storage_key: "heliconnect-company-auth".to_string(),
                persist_session: true,
                auto_refresh_token: true,
            },
            routes: RouteConfig {
                sign_in_path: "/login".to_string(),
                dashboard_path: "/dashboard".to_string(),
                external_site_url: "https://heliconnect.fr".to_string(),
            },
        }
    }
}
