//! Record store boundary for regularization requests.
//!
//! The engine only talks to this trait. Production uses the PostgreSQL
//! implementation in `repositories`; tests and single-process deployments
//! can use the in-memory implementation below.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::AppError;
use crate::models::regularization_request::{
    ApprovalLevel, RegularizationRequest, RegularizationType, RequestStatus,
};

/// Filter set for `query`. All fields are conjunctive; unset fields match
/// everything.
#[derive(Debug, Clone)]
pub struct RequestListFilters {
    pub requester_id: Option<String>,
    pub current_level: Option<ApprovalLevel>,
    pub status: Option<RequestStatus>,
    pub request_type: Option<RegularizationType>,
    pub submitted_from: Option<DateTime<Utc>>,
    pub submitted_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring match on the reason text.
    pub search: Option<String>,
    /// Ascending submission order when set; newest first otherwise.
    pub oldest_first: bool,
    pub page: i64,
    pub per_page: i64,
}

impl Default for RequestListFilters {
    fn default() -> Self {
        Self {
            requester_id: None,
            current_level: None,
            status: None,
            request_type: None,
            submitted_from: None,
            submitted_to: None,
            search: None,
            oldest_first: false,
            page: 1,
            per_page: 20,
        }
    }
}

impl RequestListFilters {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, 100)
    }

    pub fn matches(&self, request: &RegularizationRequest) -> bool {
        if let Some(ref requester_id) = self.requester_id {
            if &request.user_id != requester_id {
                return false;
            }
        }
        if let Some(level) = self.current_level {
            if request.current_level != Some(level) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if request.status != status {
                return false;
            }
        }
        if let Some(request_type) = self.request_type {
            if request.request_type != request_type {
                return false;
            }
        }
        if let Some(from) = self.submitted_from {
            if request.submitted_at < from {
                return false;
            }
        }
        if let Some(to) = self.submitted_to {
            if request.submitted_at > to {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            if !request
                .reason
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Durable store of regularization requests.
///
/// `save` is a versioned compare-and-swap: it succeeds only when the stored
/// record still carries `expected_version`, so two approvers racing on the
/// same request cannot silently overwrite each other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegularizationStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<RegularizationRequest>, AppError>;

    async fn insert(&self, request: &RegularizationRequest) -> Result<(), AppError>;

    async fn save(
        &self,
        request: &RegularizationRequest,
        expected_version: i64,
    ) -> Result<(), AppError>;

    async fn query(
        &self,
        filters: &RequestListFilters,
    ) -> Result<Vec<RegularizationRequest>, AppError>;
}

/// In-memory implementation with the same versioning semantics as the
/// PostgreSQL store.
#[derive(Debug, Default)]
pub struct InMemoryRegularizationStore {
    records: Mutex<HashMap<String, RegularizationRequest>>,
}

impl InMemoryRegularizationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegularizationStore for InMemoryRegularizationStore {
    async fn get(&self, id: &str) -> Result<Option<RegularizationRequest>, AppError> {
        let records = self.records.lock().expect("store lock");
        Ok(records.get(id).cloned())
    }

    async fn insert(&self, request: &RegularizationRequest) -> Result<(), AppError> {
        let mut records = self.records.lock().expect("store lock");
        if records.contains_key(&request.id) {
            return Err(AppError::InvalidState(format!(
                "Request {} already exists",
                request.id
            )));
        }
        records.insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn save(
        &self,
        request: &RegularizationRequest,
        expected_version: i64,
    ) -> Result<(), AppError> {
        let mut records = self.records.lock().expect("store lock");
        let stored = records
            .get(&request.id)
            .ok_or_else(|| AppError::NotFound("Regularization request not found".into()))?;
        if stored.version != expected_version {
            return Err(AppError::InvalidState(
                "Request was modified concurrently; reload and retry".into(),
            ));
        }
        records.insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn query(
        &self,
        filters: &RequestListFilters,
    ) -> Result<Vec<RegularizationRequest>, AppError> {
        let records = self.records.lock().expect("store lock");
        let mut matched: Vec<RegularizationRequest> = records
            .values()
            .filter(|request| filters.matches(request))
            .cloned()
            .collect();
        if filters.oldest_first {
            matched.sort_by_key(|request| request.submitted_at);
        } else {
            matched.sort_by_key(|request| std::cmp::Reverse(request.submitted_at));
        }
        let offset = filters.offset() as usize;
        let limit = filters.limit() as usize;
        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }
}
