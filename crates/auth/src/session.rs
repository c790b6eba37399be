//! Session and identity records issued by the external identity service.
//!
//! Both types are treated as opaque snapshots of what the service last
//! reported: they are stored and replaced wholesale, never mutated field
//! by field.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimal user record issued by the identity service.
///
/// Distinct from the application [`Profile`](crate::Profile): an identity
/// exists as soon as credentials are established, while the profile is
/// resolved asynchronously afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque identifier, also the profile key
    pub id: String,
    /// Email the identity was registered with, if known
    pub email: Option<String>,
    /// Raw metadata as issued by the identity service
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Identity {
    /// Create an identity carrying only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            metadata: HashMap::new(),
        }
    }
}

/// Opaque proof of authentication issued by the identity service.
///
/// A session always embeds the identity it was issued for (1:1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token presented to the backend on every query
    pub access_token: String,
    /// Token used by the service to mint fresh access tokens
    pub refresh_token: Option<String>,
    /// Expiry as Unix epoch seconds, if the service reports one
    pub expires_at: Option<u64>,
    /// The identity this session belongs to
    pub identity: Identity,
}

impl Session {
    /// Identity id this session was issued for.
    pub fn identity_id(&self) -> &str {
        &self.identity.id
    }
}
