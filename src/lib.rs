//! Student Portal Library
//!
//! Client-side core of the student records portal: the session store and
//! route guard, the backend gateway, and the profile and roster
//! view-models rendered by the `student-portal` binary.

pub mod api;
pub mod auth;
pub mod console;
pub mod core;
pub mod views;

// Re-export commonly used types
pub use crate::api::{ApiGateway, HttpGateway};
pub use crate::auth::{GuardDecision, Route, SessionStore};
pub use crate::core::{Config, PortalError};
pub use crate::views::{Dashboard, MutationOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
