use crate::auth::models::{Identity, Role, Status};
use serde::{Deserialize, Serialize};

// Roster models

/// Server-owned student record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_year: Option<i32>,
    pub status: Status,
}

/// Request body for POST /api/admin/users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_year: Option<i32>,
    pub status: Status,
}

/// Request body for PUT /api/admin/users/{id}; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl RecordPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// Profile models

/// Request body for PUT /api/users/profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: String,
    pub phone: String,
    pub course: String,
    pub enrollment_year: i32,
}

/// Response for PUT /api/users/profile
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: Identity,
}

// Dashboard models

/// Aggregate counts by status, from GET /api/admin/stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(default, alias = "totalStudents")]
    pub total: u64,
    #[serde(default, alias = "activeStudents")]
    pub active: u64,
    #[serde(default, alias = "graduatedStudents")]
    pub graduated: u64,
    #[serde(default, alias = "droppedStudents")]
    pub dropped: u64,
}

// Common models

/// Error body the backend sends with rejections
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Acknowledgement body for mutations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_backend_payload() {
        let record: StudentRecord = serde_json::from_value(json!({
            "_id": "r1",
            "fullName": "Alan Turing",
            "email": "alan@x.com",
            "phone": "0",
            "role": "student",
            "course": "Logic",
            "enrollmentYear": 2020,
            "status": "Graduated",
            "password": "never-shown"
        }))
        .unwrap();
        assert_eq!(record.id, "r1");
        assert_eq!(record.status, Status::Graduated);
        assert_eq!(record.enrollment_year, Some(2020));
    }

    #[test]
    fn test_status_patch_sends_only_status() {
        let value = serde_json::to_value(RecordPatch::status(Status::Graduated)).unwrap();
        assert_eq!(value, json!({"status": "Graduated"}));

        let value = serde_json::to_value(RecordPatch::role(Role::Admin)).unwrap();
        assert_eq!(value, json!({"role": "admin"}));
        assert!(RecordPatch::default().is_empty());
    }

    #[test]
    fn test_stats_accepts_long_names() {
        let stats: AdminStats = serde_json::from_value(json!({
            "totalStudents": 25,
            "activeStudents": 20,
            "graduatedStudents": 2,
            "droppedStudents": 3
        }))
        .unwrap();
        assert_eq!(stats.total, 25);
        assert_eq!(stats.dropped, 3);
    }
}
