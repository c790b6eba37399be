//! Core functionality for the HeliConnect company portal.
//!
//! This crate provides the foundation shared by the portal's crates:
//! configuration, logging initialization, and the role model that
//! drives authorization decisions.

pub mod config;
pub mod logging;
pub mod types;

pub use config::{AuthConfig, PortalConfig, RouteConfig};
pub use types::Role;
