//! Self-service registration form

use crate::api::gateway::ApiGateway;
use crate::auth::guard::Route;
use crate::auth::models::{RegisterRequest, Role};
use crate::core::error::Result;
use crate::views::validate;

pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const REGISTRATION_SUCCEEDED: &str = "Registration successful! Please login.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
    pub course: String,
    pub enrollment_year: i32,
    error: Option<String>,
    notice: Option<String>,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            password: String::new(),
            role: Role::Student,
            course: String::new(),
            enrollment_year: validate::current_year(),
            error: None,
            notice: None,
        }
    }
}

impl RegisterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Message to carry to the login screen after a successful registration
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn request(&self) -> Result<RegisterRequest> {
        validate::required("Full name", &self.full_name)?;
        validate::email(&self.email)?;
        validate::required("Phone", &self.phone)?;
        validate::password(&self.password)?;

        let (course, enrollment_year) = match self.role {
            Role::Student => {
                validate::enrollment_year(self.enrollment_year)?;
                let course = self.course.trim();
                (
                    (!course.is_empty()).then(|| course.to_string()),
                    Some(self.enrollment_year),
                )
            }
            Role::Admin => (None, None),
        };

        Ok(RegisterRequest {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
            course,
            enrollment_year,
        })
    }

    /// Create the account; on success navigate to login, never auto-login
    pub async fn submit(&mut self, gateway: &dyn ApiGateway) -> Option<Route> {
        self.notice = None;
        let result = match self.request() {
            Ok(request) => gateway.register(&request).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::info!(email = %self.email.trim(), role = %self.role, "Account registered");
                self.error = None;
                self.password.clear();
                self.notice = Some(REGISTRATION_SUCCEEDED.to_string());
                Some(Route::Login)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "Registration failed");
                self.error = Some(e.user_message(REGISTRATION_FAILED));
                None
            }
        }
    }
}
