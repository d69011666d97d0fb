//! Typed seam to the backend
//!
//! View-models talk to the backend only through [`ApiGateway`], so they can
//! be driven by an in-process fake in tests.

use crate::api::models::{AdminStats, ProfileUpdate, RecordPatch, StudentDraft, StudentRecord};
use crate::auth::models::{Identity, LoginRequest, LoginResponse, RegisterRequest};
use crate::core::error::Result;
use async_trait::async_trait;

/// Backend operations the front-end consumes
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// POST /api/auth/login
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;

    /// POST /api/auth/register
    async fn register(&self, request: &RegisterRequest) -> Result<()>;

    /// GET /api/admin/stats
    async fn fetch_stats(&self) -> Result<AdminStats>;

    /// GET /api/admin/users
    async fn list_records(&self) -> Result<Vec<StudentRecord>>;

    /// POST /api/admin/users
    async fn create_record(&self, draft: &StudentDraft) -> Result<()>;

    /// PUT /api/admin/users/{id}
    async fn update_record(&self, id: &str, patch: &RecordPatch) -> Result<()>;

    /// DELETE /api/admin/users/{id}
    async fn delete_record(&self, id: &str) -> Result<()>;

    /// PUT /api/users/profile
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Identity>;
}
