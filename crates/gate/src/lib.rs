//! Route authorization gates.
//!
//! Thin consumers of the resolver's snapshot: given the current
//! [`AuthSnapshot`] they decide what a route should do. Decisions are
//! pure; performing the redirect (and performing the external exit only
//! once) is the caller's job.
//!
//! The protected gate never redirects while the resolver is still
//! bootstrapping: a premature redirect during bootstrap would bounce a
//! logged-in user through the sign-in page on every reload.

use heliconnect_auth::AuthSnapshot;
use heliconnect_core::RouteConfig;
use tracing::debug;

/// What a protected route should do for a given snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectedDecision {
    /// Bootstrap still running: show a loading affordance, nothing else
    Loading,
    /// Not authenticated: go to the sign-in entry point
    RedirectToSignIn(String),
    /// Authenticated but the role has no company access: leave the
    /// portal for the public site. A deliberate exit, not an error.
    ExternalRedirect(String),
    /// Render the protected content
    Render,
}

/// What a public route (the sign-in page) should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicDecision {
    /// Show the page; also the answer while bootstrap is still running,
    /// so first paint is never blocked
    Render,
    /// Already signed in with company access: go to the landing page
    RedirectToDashboard(String),
}

/// Gate decisions for the configured route targets.
#[derive(Debug, Clone)]
pub struct RouteGate {
    routes: RouteConfig,
}

impl RouteGate {
    pub fn new(routes: RouteConfig) -> Self {
        Self { routes }
    }

    /// Decide for a protected route.
    pub fn protected(&self, snapshot: &AuthSnapshot) -> ProtectedDecision {
        if snapshot.bootstrapping {
            return ProtectedDecision::Loading;
        }
        if !snapshot.is_authenticated() {
            return ProtectedDecision::RedirectToSignIn(self.routes.sign_in_path.clone());
        }
        if !snapshot.has_company_access() {
            debug!("authenticated profile without company access, exiting to public site");
            return ProtectedDecision::ExternalRedirect(self.routes.external_site_url.clone());
        }
        ProtectedDecision::Render
    }

    /// Decide for the public sign-in route.
    ///
    /// Keys on the role alone: it does not wait for the company or
    /// membership rows, which only affects how early the transient
    /// redirect fires.
    pub fn public(&self, snapshot: &AuthSnapshot) -> PublicDecision {
        if !snapshot.bootstrapping && snapshot.is_authenticated() && snapshot.has_company_access() {
            return PublicDecision::RedirectToDashboard(self.routes.dashboard_path.clone());
        }
        PublicDecision::Render
    }
}
