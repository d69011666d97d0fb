//! Profile view-model
//!
//! A student views their own identity and edits a working copy of the
//! mutable fields. The session's identity only changes once the backend
//! has accepted the update.

use crate::api::gateway::ApiGateway;
use crate::api::models::ProfileUpdate;
use crate::auth::models::Identity;
use crate::auth::session::SessionStore;
use crate::core::error::Result;
use crate::views::validate;
use crate::views::MutationOutcome;
use std::mem;

pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile";
pub const PROFILE_UPDATED: &str = "Profile updated successfully!";

/// Fields a student may change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableProfile {
    pub full_name: String,
    pub phone: String,
    pub course: String,
    pub enrollment_year: i32,
}

impl EditableProfile {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            full_name: identity.full_name.clone(),
            phone: identity.phone.clone(),
            course: identity.course.clone().unwrap_or_default(),
            enrollment_year: identity
                .enrollment_year
                .unwrap_or_else(validate::current_year),
        }
    }

    fn to_update(&self) -> Result<ProfileUpdate> {
        validate::required("Full name", &self.full_name)?;
        validate::required("Phone", &self.phone)?;
        validate::enrollment_year(self.enrollment_year)?;
        Ok(ProfileUpdate {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            course: self.course.trim().to_string(),
            enrollment_year: self.enrollment_year,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProfileState {
    #[default]
    Viewing,
    Editing(EditableProfile),
    Submitting,
}

#[derive(Debug, Default)]
pub struct ProfileViewModel {
    state: ProfileState,
    error: Option<String>,
    success: Option<String>,
}

impl ProfileViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ProfileState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, ProfileState::Editing(_))
    }

    pub fn draft(&self) -> Option<&EditableProfile> {
        match &self.state {
            ProfileState::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Clear the notices after they have been shown
    pub fn acknowledge(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Seed a working copy from the current identity
    pub fn begin_edit(&mut self, session: &SessionStore) -> bool {
        if !matches!(self.state, ProfileState::Viewing) {
            return false;
        }
        let Some(identity) = session.identity() else {
            return false;
        };
        self.acknowledge();
        self.state = ProfileState::Editing(EditableProfile::from_identity(&identity));
        true
    }

    /// Discard the working copy
    pub fn cancel(&mut self) {
        if self.is_editing() {
            self.state = ProfileState::Viewing;
            self.error = None;
        }
    }

    /// Edit the working copy; returns false outside editing
    pub fn update_draft(&mut self, edit: impl FnOnce(&mut EditableProfile)) -> bool {
        match &mut self.state {
            ProfileState::Editing(draft) => {
                edit(draft);
                self.error = None;
                self.success = None;
                true
            }
            _ => false,
        }
    }

    /// Send the working copy to the backend
    ///
    /// Invalid drafts are not sent. On rejection the draft is kept so the
    /// user can correct it.
    pub async fn submit(&mut self, gateway: &dyn ApiGateway, session: &SessionStore) -> MutationOutcome {
        let draft = match mem::replace(&mut self.state, ProfileState::Submitting) {
            ProfileState::Editing(draft) => draft,
            other => {
                self.state = other;
                return MutationOutcome::Declined;
            }
        };

        let result = match draft.to_update() {
            Ok(update) => gateway.update_profile(&update).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(identity) => {
                tracing::info!(user_id = %identity.id, "Profile updated");
                session.set_identity(identity);
                self.state = ProfileState::Viewing;
                self.error = None;
                self.success = Some(PROFILE_UPDATED.to_string());
                MutationOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "Profile update rejected");
                self.state = ProfileState::Editing(draft);
                self.error = Some(e.user_message(PROFILE_UPDATE_FAILED));
                MutationOutcome::Rejected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::MemoryTokenStore;
    use crate::views::fake::{Call, FakeGateway};
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn student_session() -> SessionStore {
        let session = SessionStore::new(Arc::new(MemoryTokenStore::with_token("T")));
        let identity = serde_json::from_value(json!({
            "id": "me",
            "fullName": "Ada",
            "email": "me@x.com",
            "phone": "555",
            "role": "student",
            "course": "Maths",
            "enrollmentYear": 2021,
            "status": "Active"
        }))
        .unwrap();
        session.set_identity(identity);
        session
    }

    #[test]
    fn test_missing_year_seeded_with_current_year() {
        let identity: Identity = serde_json::from_value(json!({ "role": "student" })).unwrap();
        let draft = EditableProfile::from_identity(&identity);
        assert_eq!(draft.enrollment_year, validate::current_year());
        assert_eq!(draft.course, "");
    }

    #[test]
    fn test_begin_edit_requires_identity() {
        let session = SessionStore::new(Arc::new(MemoryTokenStore::new()));
        let mut profile = ProfileViewModel::new();
        assert!(!profile.begin_edit(&session));
        assert_eq!(profile.state(), &ProfileState::Viewing);
    }

    #[test]
    fn test_cancel_discards_draft() {
        let session = student_session();
        let mut profile = ProfileViewModel::new();
        assert!(profile.begin_edit(&session));
        profile.update_draft(|d| d.full_name = "Changed".into());
        profile.cancel();

        assert_eq!(profile.state(), &ProfileState::Viewing);
        assert_eq!(session.identity().unwrap().full_name, "Ada");
        assert!(!profile.update_draft(|d| d.phone.clear()));
    }

    #[tokio::test]
    async fn test_blank_phone_sends_nothing() {
        let gateway = FakeGateway::new();
        let session = student_session();
        let mut profile = ProfileViewModel::new();
        profile.begin_edit(&session);
        profile.update_draft(|d| d.phone = "  ".into());

        let outcome = profile.submit(&gateway, &session).await;

        assert_eq!(outcome, MutationOutcome::Rejected);
        assert!(profile.is_editing());
        assert_eq!(profile.error(), Some("Phone is required"));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_success_replaces_identity() {
        let gateway = FakeGateway::new();
        let session = student_session();
        let mut changes = session.subscribe();
        let mut profile = ProfileViewModel::new();
        profile.begin_edit(&session);
        profile.update_draft(|d| {
            d.full_name = "Ada King".into();
            d.course = String::new();
        });

        let outcome = profile.submit(&gateway, &session).await;

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(profile.state(), &ProfileState::Viewing);
        assert_eq!(profile.success(), Some(PROFILE_UPDATED));
        assert!(changes.has_changed().unwrap());
        assert_eq!(session.identity().unwrap().full_name, "Ada King");

        let sent = gateway
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::Profile(update) => Some(update),
                _ => None,
            })
            .unwrap();
        assert_eq!(sent.course, "");
        assert_eq!(sent.enrollment_year, 2021);

        profile.acknowledge();
        assert_eq!(profile.success(), None);
    }

    #[tokio::test]
    async fn test_rejection_keeps_draft() {
        let gateway = FakeGateway::new();
        gateway.reject_next(StatusCode::BAD_REQUEST, Some("Phone number is invalid"));
        let session = student_session();
        let mut profile = ProfileViewModel::new();
        profile.begin_edit(&session);
        profile.update_draft(|d| d.phone = "abc".into());

        let outcome = profile.submit(&gateway, &session).await;

        assert_eq!(outcome, MutationOutcome::Rejected);
        assert_eq!(profile.draft().unwrap().phone, "abc");
        assert_eq!(profile.error(), Some("Phone number is invalid"));
        assert_eq!(session.identity().unwrap().phone, "555");
    }

    #[tokio::test]
    async fn test_rejection_without_message_uses_fallback() {
        let gateway = FakeGateway::new();
        gateway.reject_next(StatusCode::INTERNAL_SERVER_ERROR, None);
        let session = student_session();
        let mut profile = ProfileViewModel::new();
        profile.begin_edit(&session);

        profile.submit(&gateway, &session).await;
        assert_eq!(profile.error(), Some(PROFILE_UPDATE_FAILED));
    }

    #[tokio::test]
    async fn test_submit_outside_editing_is_declined() {
        let gateway = FakeGateway::new();
        let session = student_session();
        let mut profile = ProfileViewModel::new();

        assert_eq!(profile.submit(&gateway, &session).await, MutationOutcome::Declined);
        assert!(gateway.calls().is_empty());
    }
}
