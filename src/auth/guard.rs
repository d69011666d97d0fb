//! Route guard
//!
//! Decides, per navigation, whether the current identity may see a
//! destination. Pure function of (identity, route); no state.

use crate::auth::models::{Identity, Role};
use std::fmt;

/// Navigable destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Profile,
    Roster,
    Stats,
}

/// Who may see a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected { required_role: Option<Role> },
}

/// Outcome of a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render(Route),
    Redirect(Route),
}

impl Route {
    pub fn access(&self) -> Access {
        match self {
            Route::Login | Route::Register => Access::Public,
            Route::Dashboard => Access::Protected { required_role: None },
            Route::Profile => Access::Protected {
                required_role: Some(Role::Student),
            },
            Route::Roster | Route::Stats => Access::Protected {
                required_role: Some(Role::Admin),
            },
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Profile => "/dashboard/profile",
            Route::Roster => "/dashboard/students",
            Route::Stats => "/dashboard/stats",
        }
    }

    /// Map a path onto a route, following the redirects the router applies
    /// (`/` goes to login, unknown dashboard sub-paths land on the dashboard)
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.trim_end_matches('/');
        match path {
            "" | "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/dashboard/profile" => Some(Route::Profile),
            "/dashboard/students" => Some(Route::Roster),
            "/dashboard/stats" => Some(Route::Stats),
            p if p == "/dashboard" || p.starts_with("/dashboard/") => Some(Route::Dashboard),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where an authenticated user lands when a role check fails
pub const DEFAULT_AUTHENTICATED_ROUTE: Route = Route::Dashboard;

/// Resolve a navigation against the current identity
pub fn resolve(identity: Option<&Identity>, route: Route) -> GuardDecision {
    match route.access() {
        Access::Public => GuardDecision::Render(route),
        Access::Protected { required_role } => match identity {
            None => GuardDecision::Redirect(Route::Login),
            Some(identity) => match required_role {
                Some(role) if role != identity.role => {
                    GuardDecision::Redirect(DEFAULT_AUTHENTICATED_ROUTE)
                }
                _ => GuardDecision::Render(route),
            },
        },
    }
}

/// Screen the dashboard shows for a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Profile,
    Roster,
}

impl Screen {
    pub fn for_role(role: Role) -> Screen {
        match role {
            Role::Student => Screen::Profile,
            Role::Admin => Screen::Roster,
        }
    }
}
