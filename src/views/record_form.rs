//! Working copy behind the roster's add and edit forms

use crate::api::models::{RecordPatch, StudentDraft, StudentRecord};
use crate::auth::models::{Role, Status};
use crate::core::error::Result;
use crate::views::validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// Blank on edit means "keep the current password"
    pub password: String,
    pub role: Role,
    pub course: String,
    pub enrollment_year: i32,
    pub status: Status,
}

impl Default for RecordForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            password: String::new(),
            role: Role::Student,
            course: String::new(),
            enrollment_year: validate::current_year(),
            status: Status::Active,
        }
    }
}

impl RecordForm {
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            full_name: record.full_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            password: String::new(),
            role: record.role,
            course: record.course.clone().unwrap_or_default(),
            enrollment_year: record
                .enrollment_year
                .unwrap_or_else(validate::current_year),
            status: record.status,
        }
    }

    fn validate_common(&self) -> Result<()> {
        validate::required("Full name", &self.full_name)?;
        validate::email(&self.email)?;
        validate::required("Phone", &self.phone)?;
        match self.role {
            Role::Student => validate::enrollment_year(self.enrollment_year),
            Role::Admin => Ok(()),
        }
    }

    /// Course and enrollment year only apply to students
    fn student_fields(&self) -> (Option<String>, Option<i32>) {
        match self.role {
            Role::Student => (
                Some(self.course.trim().to_string()),
                Some(self.enrollment_year),
            ),
            Role::Admin => (None, None),
        }
    }

    /// Validate for creation and build the request body
    pub fn to_draft(&self) -> Result<StudentDraft> {
        self.validate_common()?;
        validate::password(&self.password)?;

        let (course, enrollment_year) = self.student_fields();
        Ok(StudentDraft {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
            course,
            enrollment_year,
            status: self.status,
        })
    }

    /// Validate for a full edit and build the patch
    pub fn to_patch(&self) -> Result<RecordPatch> {
        self.validate_common()?;
        let password = if self.password.is_empty() {
            None
        } else {
            validate::password(&self.password)?;
            Some(self.password.clone())
        };

        let (course, enrollment_year) = self.student_fields();
        Ok(RecordPatch {
            full_name: Some(self.full_name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            phone: Some(self.phone.trim().to_string()),
            password,
            role: Some(self.role),
            course,
            enrollment_year,
            status: Some(self.status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fake::record;

    fn filled() -> RecordForm {
        RecordForm {
            full_name: " Ada Lovelace ".into(),
            email: "ada@x.com".into(),
            phone: "555".into(),
            password: "secret".into(),
            role: Role::Student,
            course: "Maths".into(),
            enrollment_year: 2024,
            status: Status::Active,
        }
    }

    #[test]
    fn test_draft_trims_and_keeps_student_fields() {
        let draft = filled().to_draft().unwrap();
        assert_eq!(draft.full_name, "Ada Lovelace");
        assert_eq!(draft.course.as_deref(), Some("Maths"));
        assert_eq!(draft.enrollment_year, Some(2024));
    }

    #[test]
    fn test_admin_draft_drops_student_fields() {
        let form = RecordForm {
            role: Role::Admin,
            enrollment_year: 1900,
            ..filled()
        };
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.course, None);
        assert_eq!(draft.enrollment_year, None);
    }

    #[test]
    fn test_create_requires_password() {
        let form = RecordForm {
            password: "123".into(),
            ..filled()
        };
        assert!(form.to_draft().is_err());
    }

    #[test]
    fn test_edit_with_blank_password_keeps_it() {
        let form = RecordForm::from_record(&record("s1", "Ada", Status::Dropped));
        assert!(form.password.is_empty());

        let patch = form.to_patch().unwrap();
        assert_eq!(patch.password, None);
        assert_eq!(patch.status, Some(Status::Dropped));
    }

    #[test]
    fn test_edit_with_short_password_rejected() {
        let mut form = RecordForm::from_record(&record("s1", "Ada", Status::Active));
        form.password = "abc".into();
        assert!(form.to_patch().is_err());
    }

    #[test]
    fn test_missing_phone_rejected() {
        let form = RecordForm {
            phone: "".into(),
            ..filled()
        };
        let err = form.to_draft().unwrap_err();
        assert_eq!(err.user_message("fallback"), "Phone is required");
    }
}
