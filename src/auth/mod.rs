//! Authentication module
//!
//! This module provides:
//! - Identity, role and status models
//! - Credential token decoding
//! - The session store and token persistence
//! - The route guard

pub mod guard;
pub mod jwt;
pub mod models;
pub mod session;

pub use guard::{resolve, Access, GuardDecision, Route, Screen};
pub use jwt::decode_identity;
pub use models::{Identity, LoginRequest, LoginResponse, RegisterRequest, Role, Status, StatusFilter};
pub use session::{FileTokenStore, MemoryTokenStore, SessionStore, TokenStore};
