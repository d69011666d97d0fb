//! Roster view-model
//!
//! Holds the records fetched from the backend plus the search, filter and
//! pagination state derived from them. Mutations go to the backend and
//! never touch the local collection; callers reload after an
//! [`MutationOutcome::Applied`] result.

use crate::api::gateway::ApiGateway;
use crate::api::models::{RecordPatch, StudentRecord};
use crate::auth::models::{Role, Status, StatusFilter};
use crate::core::config::DEFAULT_PAGE_SIZE;
use crate::core::error::Result;
use crate::views::record_form::RecordForm;
use crate::views::MutationOutcome;

pub const FETCH_FAILED: &str = "Failed to fetch students";
pub const CREATE_FAILED: &str = "Failed to add student";
pub const UPDATE_FAILED: &str = "Failed to update student";
pub const DELETE_FAILED: &str = "Failed to delete student";
pub const STATUS_FAILED: &str = "Failed to update status";
pub const ROLE_FAILED: &str = "Failed to update role";

/// Explicit user confirmation for destructive actions
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Records matching the search term and status filter, in fetch order
///
/// The term matches case-insensitively against full name, email and
/// course. The returned iterator is lazy and can be cloned to restart it.
pub fn derive<'a>(
    records: &'a [StudentRecord],
    search_term: &str,
    status_filter: StatusFilter,
) -> impl Iterator<Item = &'a StudentRecord> + Clone + 'a {
    let needle = search_term.to_lowercase();
    records
        .iter()
        .filter(move |record| status_filter.matches(record.status) && matches_search(record, &needle))
}

fn matches_search(record: &StudentRecord, needle: &str) -> bool {
    record.full_name.to_lowercase().contains(needle)
        || record.email.to_lowercase().contains(needle)
        || record
            .course
            .as_deref()
            .map_or(false, |course| course.to_lowercase().contains(needle))
}

/// Number of pages needed for `count` items
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    count / page_size + usize::from(count % page_size != 0)
}

/// Clamp a page number into `[1, max(1, total_pages)]`
pub fn clamp_page(page: usize, count: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(count, page_size).max(1))
}

/// One page of the filtered roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    pub items: Vec<&'a StudentRecord>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl Page<'_> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slice `[(page-1)*page_size, page*page_size)` of the filtered records,
/// after clamping `page`
pub fn paginate<'a, I>(filtered: I, page: usize, page_size: usize) -> Page<'a>
where
    I: Iterator<Item = &'a StudentRecord>,
{
    let page_size = page_size.max(1);
    let matching: Vec<&'a StudentRecord> = filtered.collect();
    let total_items = matching.len();
    let page = clamp_page(page, total_items, page_size);

    let start = (page - 1).saturating_mul(page_size).min(total_items);
    let end = start.saturating_add(page_size).min(total_items);

    Page {
        items: matching[start..end].to_vec(),
        page,
        page_size,
        total_pages: total_pages(total_items, page_size),
        total_items,
    }
}

fn confirm_role_change(confirm: &dyn Confirm, role: Role) -> bool {
    confirm.confirm(&format!("Are you sure you want to change this user's role to {}?", role))
}

/// Which form is open beside the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Adding,
    Editing { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEditor {
    pub mode: FormMode,
    pub form: RecordForm,
}

pub struct RosterViewModel {
    records: Vec<StudentRecord>,
    search_term: String,
    status_filter: StatusFilter,
    page: usize,
    page_size: usize,
    loaded: bool,
    error: Option<String>,
    editor: Option<RecordEditor>,
}

impl Default for RosterViewModel {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl RosterViewModel {
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            search_term: String::new(),
            status_filter: StatusFilter::All,
            page: 1,
            page_size: page_size.max(1),
            loaded: false,
            error: None,
            editor: None,
        }
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&StudentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// False until the first successful load
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn filtered(&self) -> impl Iterator<Item = &StudentRecord> + Clone + '_ {
        derive(&self.records, &self.search_term, self.status_filter)
    }

    pub fn current_page(&self) -> Page<'_> {
        paginate(self.filtered(), self.page, self.page_size)
    }

    fn clamp(&mut self) {
        let count = self.filtered().count();
        self.page = clamp_page(self.page, count, self.page_size);
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.clamp();
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
        self.clamp();
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page;
        self.clamp();
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }

    /// Replace the collection with the backend's current view
    ///
    /// On failure the previous collection stays and the error slot is set;
    /// a successful load clears it.
    pub async fn load(&mut self, gateway: &dyn ApiGateway) -> bool {
        match gateway.list_records().await {
            Ok(records) => {
                tracing::debug!(count = records.len(), "Roster loaded");
                self.records = records;
                self.loaded = true;
                self.error = None;
                self.clamp();
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load roster");
                self.error = Some(FETCH_FAILED.to_string());
                false
            }
        }
    }

    fn settle(&mut self, result: Result<()>, fallback: &str, action: &str) -> MutationOutcome {
        match result {
            Ok(()) => {
                tracing::info!(action = %action, "Roster mutation applied");
                self.error = None;
                MutationOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(action = %action, error = %e, kind = ?e.kind(), retryable = e.is_retryable(), "Roster mutation rejected");
                self.error = Some(e.user_message(fallback));
                MutationOutcome::Rejected
            }
        }
    }

    /// Create a record from a filled-in form
    pub async fn create_record(&mut self, gateway: &dyn ApiGateway, form: &RecordForm) -> MutationOutcome {
        let result = match form.to_draft() {
            Ok(draft) => gateway.create_record(&draft).await,
            Err(e) => Err(e),
        };
        self.settle(result, CREATE_FAILED, "create")
    }

    /// Send a full or partial update; an empty patch sends nothing
    pub async fn update_record(
        &mut self,
        gateway: &dyn ApiGateway,
        id: &str,
        patch: &RecordPatch,
    ) -> MutationOutcome {
        self.patch(gateway, id, patch, UPDATE_FAILED, "update").await
    }

    async fn patch(
        &mut self,
        gateway: &dyn ApiGateway,
        id: &str,
        patch: &RecordPatch,
        fallback: &str,
        action: &str,
    ) -> MutationOutcome {
        if patch.is_empty() {
            return MutationOutcome::Declined;
        }
        let result = gateway.update_record(id, patch).await;
        self.settle(result, fallback, action)
    }

    pub async fn change_status(&mut self, gateway: &dyn ApiGateway, id: &str, status: Status) -> MutationOutcome {
        self.patch(gateway, id, &RecordPatch::status(status), STATUS_FAILED, "status")
            .await
    }

    /// Change a user's role after the user confirms
    pub async fn change_role(
        &mut self,
        gateway: &dyn ApiGateway,
        id: &str,
        role: Role,
        confirm: &dyn Confirm,
    ) -> MutationOutcome {
        if !confirm_role_change(confirm, role) {
            return MutationOutcome::Declined;
        }
        self.patch(gateway, id, &RecordPatch::role(role), ROLE_FAILED, "role")
            .await
    }

    /// Delete a record after the user confirms
    pub async fn delete_record(
        &mut self,
        gateway: &dyn ApiGateway,
        id: &str,
        confirm: &dyn Confirm,
    ) -> MutationOutcome {
        if !confirm.confirm("Are you sure you want to delete this student?") {
            return MutationOutcome::Declined;
        }
        let result = gateway.delete_record(id).await;
        self.settle(result, DELETE_FAILED, "delete")
    }

    // Add/edit form

    pub fn editor(&self) -> Option<&RecordEditor> {
        self.editor.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut RecordForm> {
        self.editor.as_mut().map(|editor| &mut editor.form)
    }

    pub fn begin_add(&mut self) {
        self.editor = Some(RecordEditor {
            mode: FormMode::Adding,
            form: RecordForm::default(),
        });
    }

    /// Open the edit form for a loaded record
    pub fn begin_edit(&mut self, id: &str) -> bool {
        let Some(record) = self.record(id) else {
            return false;
        };
        self.editor = Some(RecordEditor {
            form: RecordForm::from_record(record),
            mode: FormMode::Editing { id: id.to_string() },
        });
        true
    }

    pub fn cancel_form(&mut self) {
        self.editor = None;
    }

    /// Submit the open form; it closes only when the backend accepts it
    ///
    /// An edit that changes the record's role needs the same confirmation
    /// as [`RosterViewModel::change_role`].
    pub async fn submit_form(&mut self, gateway: &dyn ApiGateway, confirm: &dyn Confirm) -> MutationOutcome {
        let Some(editor) = self.editor.clone() else {
            return MutationOutcome::Declined;
        };

        let outcome = match &editor.mode {
            FormMode::Adding => self.create_record(gateway, &editor.form).await,
            FormMode::Editing { id } => {
                let role_changed = self
                    .record(id)
                    .map_or(false, |record| record.role != editor.form.role);
                if role_changed && !confirm_role_change(confirm, editor.form.role) {
                    return MutationOutcome::Declined;
                }
                let result = match editor.form.to_patch() {
                    Ok(patch) => gateway.update_record(id, &patch).await,
                    Err(e) => Err(e),
                };
                self.settle(result, UPDATE_FAILED, "edit")
            }
        };

        if outcome == MutationOutcome::Applied {
            self.editor = None;
        }
        outcome
    }
}
