//! Login form

use crate::api::gateway::ApiGateway;
use crate::auth::guard::Route;
use crate::auth::models::LoginRequest;
use crate::auth::session::SessionStore;
use crate::core::error::Result;
use crate::views::validate;

pub const LOGIN_FAILED: &str = "Login failed";

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    email: String,
    password: String,
    error: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.error = None;
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
        self.error = None;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn request(&self) -> Result<LoginRequest> {
        validate::required("Email", &self.email)?;
        validate::required("Password", &self.password)?;
        Ok(LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }

    /// Authenticate and start a session
    ///
    /// Returns where to navigate on success. On failure the form keeps its
    /// contents and exposes the reason through [`LoginForm::error`].
    pub async fn submit(&mut self, gateway: &dyn ApiGateway, session: &SessionStore) -> Option<Route> {
        let result = match self.request() {
            Ok(request) => gateway.login(&request).await,
            Err(e) => Err(e),
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "Login failed");
                self.error = Some(e.user_message(LOGIN_FAILED));
                return None;
            }
        };

        if let Err(e) = session.begin(&response.token, response.user) {
            tracing::error!(error = %e, "Failed to persist session token");
            self.error = Some(LOGIN_FAILED.to_string());
            return None;
        }

        self.password.clear();
        self.error = None;
        Some(Route::Dashboard)
    }
}
