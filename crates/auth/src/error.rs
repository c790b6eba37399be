//! Error types for session and account resolution.

use thiserror::Error;

/// Errors surfaced to callers of the auth actions.
///
/// Only `sign_in` propagates an error to the UI; everything else is
/// absorbed by the resolver and reflected as absent snapshot fields.
/// The `Display` form is the user-facing message.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials rejected by the identity service. The message comes
    /// from the service and is suitable for inline display.
    #[error("{0}")]
    Credential(String),

    /// Identity service transport or internal failure. The detail is for
    /// logs; the displayed message stays generic.
    #[error("An unexpected error occurred, please try again")]
    Service(String),

    /// The resolver task is no longer running.
    #[error("session resolver is not running")]
    ResolverClosed,
}

/// Errors from the profile and membership store boundaries.
///
/// A missing row is not an error; stores report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the query
    #[error("store query failed: {0}")]
    Query(String),

    /// The backend could not be reached
    #[error("store unreachable: {0}")]
    Unreachable(String),
}
