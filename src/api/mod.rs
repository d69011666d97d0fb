//! Backend API module
//!
//! - Request/response models for the REST endpoints
//! - The gateway trait the view-models depend on
//! - The reqwest-backed implementation

pub mod client;
pub mod gateway;
pub mod models;

pub use client::{HttpGateway, TRACE_ID_HEADER};
pub use gateway::ApiGateway;
pub use models::{AdminStats, ProfileUpdate, RecordPatch, StudentDraft, StudentRecord};
