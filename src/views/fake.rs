//! In-process backend used by the view-model tests

use crate::api::gateway::ApiGateway;
use crate::api::models::{AdminStats, ProfileUpdate, RecordPatch, StudentDraft, StudentRecord};
use crate::auth::models::{Identity, LoginRequest, LoginResponse, RegisterRequest, Role, Status};
use crate::core::error::{PortalError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login(String),
    Register(String),
    Stats,
    List,
    Create(String),
    Update(String, RecordPatch),
    Delete(String),
    Profile(ProfileUpdate),
}

/// Keeps server-side records and applies mutations to them, so reloads
/// observe the effect of confirmed writes
pub struct FakeGateway {
    records: Mutex<Vec<StudentRecord>>,
    calls: Mutex<Vec<Call>>,
    reject_next: Mutex<Option<(StatusCode, Option<String>)>>,
    fail_list: Mutex<bool>,
    credentials: Mutex<Option<(String, String, LoginResponse)>>,
    next_id: Mutex<u32>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<StudentRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            calls: Mutex::new(Vec::new()),
            reject_next: Mutex::new(None),
            fail_list: Mutex::new(false),
            credentials: Mutex::new(None),
            next_id: Mutex::new(1000),
        }
    }

    /// Accept exactly these credentials at login
    pub fn accept_login(&self, email: &str, password: &str, response: LoginResponse) {
        *self.credentials.lock().unwrap() = Some((email.into(), password.into(), response));
    }

    /// Make the next non-list request fail with this status and message
    pub fn reject_next(&self, status: StatusCode, message: Option<&str>) {
        *self.reject_next.lock().unwrap() = Some((status, message.map(str::to_string)));
    }

    pub fn fail_list(&self, fail: bool) {
        *self.fail_list.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    pub fn server_records(&self) -> Vec<StudentRecord> {
        self.records.lock().unwrap().clone()
    }

    fn log(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_rejection(&self) -> Result<()> {
        match self.reject_next.lock().unwrap().take() {
            Some((status, message)) => Err(PortalError::rejected(status, message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ApiGateway for FakeGateway {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        self.log(Call::Login(request.email.clone()));
        self.take_rejection()?;
        match &*self.credentials.lock().unwrap() {
            Some((email, password, response))
                if *email == request.email && *password == request.password =>
            {
                Ok(response.clone())
            }
            _ => Err(PortalError::rejected(
                StatusCode::UNAUTHORIZED,
                Some("Invalid credentials".into()),
            )),
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<()> {
        self.log(Call::Register(request.email.clone()));
        self.take_rejection()
    }

    async fn fetch_stats(&self) -> Result<AdminStats> {
        self.log(Call::Stats);
        self.take_rejection()?;
        let records = self.records.lock().unwrap();
        let count = |status| records.iter().filter(|r| r.status == status).count() as u64;
        Ok(AdminStats {
            total: records.len() as u64,
            active: count(Status::Active),
            graduated: count(Status::Graduated),
            dropped: count(Status::Dropped),
        })
    }

    async fn list_records(&self) -> Result<Vec<StudentRecord>> {
        self.log(Call::List);
        if *self.fail_list.lock().unwrap() {
            return Err(PortalError::NetworkError("connection refused".into()));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn create_record(&self, draft: &StudentDraft) -> Result<()> {
        self.log(Call::Create(draft.email.clone()));
        self.take_rejection()?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        self.records.lock().unwrap().push(StudentRecord {
            id: format!("s{}", next_id),
            full_name: draft.full_name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            role: draft.role,
            course: draft.course.clone(),
            enrollment_year: draft.enrollment_year,
            status: draft.status,
        });
        Ok(())
    }

    async fn update_record(&self, id: &str, patch: &RecordPatch) -> Result<()> {
        self.log(Call::Update(id.into(), patch.clone()));
        self.take_rejection()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| PortalError::rejected(StatusCode::NOT_FOUND, Some("User not found".into())))?;
        if let Some(v) = &patch.full_name {
            record.full_name = v.clone();
        }
        if let Some(v) = &patch.email {
            record.email = v.clone();
        }
        if let Some(v) = &patch.phone {
            record.phone = v.clone();
        }
        if let Some(v) = patch.role {
            record.role = v;
        }
        if let Some(v) = &patch.course {
            record.course = Some(v.clone());
        }
        if let Some(v) = patch.enrollment_year {
            record.enrollment_year = Some(v);
        }
        if let Some(v) = patch.status {
            record.status = v;
        }
        Ok(())
    }

    async fn delete_record(&self, id: &str) -> Result<()> {
        self.log(Call::Delete(id.into()));
        self.take_rejection()?;
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Identity> {
        self.log(Call::Profile(update.clone()));
        self.take_rejection()?;
        Ok(Identity {
            id: "me".into(),
            full_name: update.full_name.clone(),
            email: "me@x.com".into(),
            phone: update.phone.clone(),
            role: Role::Student,
            course: Some(update.course.clone()),
            enrollment_year: Some(update.enrollment_year),
            status: Some(Status::Active),
        })
    }
}

/// Record fixture with a predictable shape
pub fn record(id: &str, name: &str, status: Status) -> StudentRecord {
    StudentRecord {
        id: id.into(),
        full_name: name.into(),
        email: format!("{}@campus.edu", id),
        phone: "555-0100".into(),
        role: Role::Student,
        course: Some("Computer Science".into()),
        enrollment_year: Some(2022),
        status,
    }
}
