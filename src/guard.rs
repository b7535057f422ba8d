//! Route Guard
//!
//! Decides whether a route may be entered. The decision is fully resolved,
//! including the optional server-side token check, before the caller renders
//! anything, so a guarded screen never shows while verification is pending
//! or after it failed.

use crate::api::auth;
use crate::http::{ApiClient, ApiResult};
use crate::models::Role;
use crate::session::Session;

pub const LOGIN_PATH: &str = "/login";

/// Client-side routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    /// `/dashboard`: whichever dashboard the session's role owns
    Dashboard,
    RoleDashboard(Role),
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let path = path.split(&['?', '#'][..]).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["dashboard"] => Route::Dashboard,
            ["dashboard", role] => role
                .parse::<Role>()
                .map(Route::RoleDashboard)
                .unwrap_or(Route::NotFound),
            _ => Route::NotFound,
        }
    }

    /// Whether entering this route needs a session
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::RoleDashboard(_))
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::RoleDashboard(role) => role.dashboard_path(),
            Route::NotFound => "/404".to_string(),
        }
    }
}

/// Why the guard sent the user elsewhere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    NoSession,
    SessionRejected,
    WrongRole,
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Public route, no session involved
    Public,
    /// Protected route entered with this session
    Allow(Session),
    Redirect { to: String, reason: RedirectReason },
}

impl GuardDecision {
    fn to_login(reason: RedirectReason) -> Self {
        GuardDecision::Redirect {
            to: LOGIN_PATH.to_string(),
            reason,
        }
    }
}

/// Gate in front of every dashboard route
pub struct RouteGuard<'a> {
    client: &'a ApiClient,
    verify: bool,
}

impl<'a> RouteGuard<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            verify: false,
        }
    }

    /// Also check the token against the server before allowing entry
    pub fn verify_with_server(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Resolve a route to an entry decision.
    ///
    /// Transport failures while verifying are returned as errors, never as
    /// an `Allow`.
    pub async fn authorize(&self, route: Route) -> ApiResult<GuardDecision> {
        if !route.is_protected() {
            return Ok(GuardDecision::Public);
        }

        let Some(session) = self.client.current_session()? else {
            tracing::debug!(route = %route.path(), "No session, redirecting to login");
            return Ok(GuardDecision::to_login(RedirectReason::NoSession));
        };

        if self.verify {
            match auth::verify(self.client).await {
                Ok(()) => {}
                Err(e) if e.is_session_expired() => {
                    // The client already cleared the rejected session
                    tracing::info!(route = %route.path(), "Stored token rejected by server");
                    return Ok(GuardDecision::to_login(RedirectReason::SessionRejected));
                }
                Err(e) => return Err(e),
            }
        }

        match route {
            Route::RoleDashboard(role) if role != session.role() => {
                tracing::debug!(requested = %role, actual = %session.role(), "Role mismatch, redirecting");
                Ok(GuardDecision::Redirect {
                    to: session.role().dashboard_path(),
                    reason: RedirectReason::WrongRole,
                })
            }
            _ => Ok(GuardDecision::Allow(session)),
        }
    }

    /// Parse and authorize a path
    pub async fn authorize_path(&self, path: &str) -> ApiResult<GuardDecision> {
        self.authorize(Route::parse(path)).await
    }
}
