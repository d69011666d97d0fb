//! View-models
//!
//! Screen state for the portal, independent of how it is rendered. Each
//! view-model talks to the backend through [`ApiGateway`](crate::api::ApiGateway)
//! and to the session through [`SessionStore`](crate::auth::SessionStore).

pub mod dashboard;
pub mod login;
pub mod profile;
pub mod record_form;
pub mod register;
pub mod roster;
pub mod validate;

#[cfg(test)]
pub(crate) mod fake;

pub use dashboard::{AdminDashboard, Dashboard};
pub use login::LoginForm;
pub use profile::{EditableProfile, ProfileState, ProfileViewModel};
pub use record_form::RecordForm;
pub use register::RegisterForm;
pub use roster::{Confirm, FormMode, Page, RecordEditor, RosterViewModel};

/// Result of a user-initiated mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The backend accepted the change
    Applied,
    /// Nothing was sent: the user declined or there was nothing to send
    Declined,
    /// Validation or the backend refused; the error slot holds the reason
    Rejected,
}

impl MutationOutcome {
    /// Whether the caller should reload from the backend
    pub fn requires_reload(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}
