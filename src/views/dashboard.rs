//! Role-specific dashboard
//!
//! Students get their profile; admins get the roster and the aggregate
//! stats. Admin mutations are followed by a reload of both, never by a
//! local patch.

use crate::api::gateway::ApiGateway;
use crate::api::models::AdminStats;
use crate::auth::guard::{Route, Screen};
use crate::auth::models::{Identity, Role};
use crate::auth::session::SessionStore;
use crate::views::profile::ProfileViewModel;
use crate::views::roster::RosterViewModel;
use crate::views::MutationOutcome;

pub const STATS_FAILED: &str = "Failed to fetch stats";

pub enum Dashboard {
    Student(ProfileViewModel),
    Admin(AdminDashboard),
}

impl Dashboard {
    pub fn for_identity(identity: &Identity, page_size: usize) -> Self {
        match identity.role {
            Role::Student => Dashboard::Student(ProfileViewModel::new()),
            Role::Admin => Dashboard::Admin(AdminDashboard::new(page_size)),
        }
    }

    pub fn screen(&self) -> Screen {
        match self {
            Dashboard::Student(_) => Screen::Profile,
            Dashboard::Admin(_) => Screen::Roster,
        }
    }
}

pub struct AdminDashboard {
    pub roster: RosterViewModel,
    stats: Option<AdminStats>,
    stats_error: Option<String>,
}

impl AdminDashboard {
    pub fn new(page_size: usize) -> Self {
        Self {
            roster: RosterViewModel::new(page_size),
            stats: None,
            stats_error: None,
        }
    }

    pub fn stats(&self) -> Option<&AdminStats> {
        self.stats.as_ref()
    }

    pub fn stats_error(&self) -> Option<&str> {
        self.stats_error.as_deref()
    }

    /// Reload the roster, then the stats
    pub async fn refresh(&mut self, gateway: &dyn ApiGateway) {
        self.roster.load(gateway).await;
        self.refresh_stats(gateway).await;
    }

    pub async fn refresh_stats(&mut self, gateway: &dyn ApiGateway) -> bool {
        match gateway.fetch_stats().await {
            Ok(stats) => {
                self.stats = Some(stats);
                self.stats_error = None;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stats");
                self.stats_error = Some(e.user_message(STATS_FAILED));
                false
            }
        }
    }

    /// Reload after an applied mutation; returns whether a reload ran
    pub async fn settle(&mut self, gateway: &dyn ApiGateway, outcome: MutationOutcome) -> bool {
        if !outcome.requires_reload() {
            return false;
        }
        self.refresh(gateway).await;
        true
    }
}

/// End the session and return to the login screen
pub fn logout(session: &SessionStore) -> Route {
    if let Err(e) = session.logout() {
        tracing::warn!(error = %e, "Failed to clear persisted token");
    }
    Route::Login
}
