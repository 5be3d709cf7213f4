//! Workflow engine: the only component permitted to mutate a request's
//! workflow fields.
//!
//! Every operation takes an explicit [`Actor`]; there is no ambient
//! current-user state. Transitions are persisted with a compare-and-swap on
//! the record version, so a transition racing against another approver fails
//! with `InvalidState` instead of overwriting.

use async_trait::async_trait;
use chrono_tz::Tz;
use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::models::regularization_request::{
    ApprovalLevel, ApprovalRecord, ApprovalStatus, AttachmentMeta, CreateRegularizationRequest,
    RegularizationRequest, RequestStatus,
};
use crate::models::user::{User, UserRole};
use crate::utils::time;
use crate::workflow::notify::{Notifier, WorkflowEvent};
use crate::workflow::policy::ApprovalPolicy;
use crate::workflow::store::{RegularizationStore, RequestListFilters};

const MAX_DECISION_COMMENT_LENGTH: usize = 500;

/// The authenticated principal performing a workflow operation.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub role: UserRole,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Actor {
            id: user.id.clone(),
            role: user.role,
        }
    }
}

/// Attendance-subsystem hook invoked synchronously after a terminal
/// approval. A failure here is logged but does not roll back the approval;
/// the approval and the correction are not atomic.
#[async_trait]
pub trait AttendanceCorrections: Send + Sync {
    async fn apply(&self, request: &RegularizationRequest) -> Result<(), AppError>;
}

/// No-op corrections hook for tests and deployments where the attendance
/// subsystem is wired elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCorrections;

#[async_trait]
impl AttendanceCorrections for NoopCorrections {
    async fn apply(&self, _request: &RegularizationRequest) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct WorkflowEngine {
    store: Arc<dyn RegularizationStore>,
    corrections: Arc<dyn AttendanceCorrections>,
    notifier: Arc<dyn Notifier>,
    policy: ApprovalPolicy,
    time_zone: Tz,
}

impl WorkflowEngine {
    pub fn new(
        store: Arc<dyn RegularizationStore>,
        corrections: Arc<dyn AttendanceCorrections>,
        notifier: Arc<dyn Notifier>,
        policy: ApprovalPolicy,
        time_zone: Tz,
    ) -> Self {
        Self {
            store,
            corrections,
            notifier,
            policy,
            time_zone,
        }
    }

    pub fn policy(&self) -> &ApprovalPolicy {
        &self.policy
    }

    /// Creates a new request in Pending state, parked at the entry level the
    /// policy assigns to the requester's role.
    pub async fn submit(
        &self,
        actor: &Actor,
        payload: CreateRegularizationRequest,
    ) -> Result<RegularizationRequest, AppError> {
        payload.validate()?;
        if let (Some(check_in), Some(check_out)) =
            (payload.requested_check_in, payload.requested_check_out)
        {
            if check_out <= check_in {
                return Err(AppError::InvalidArgument(
                    "requested_check_out must be later than requested_check_in".into(),
                ));
            }
        }

        let now = time::now_utc(&self.time_zone);
        let attachments: Vec<AttachmentMeta> = payload
            .attachments
            .into_iter()
            .map(|upload| AttachmentMeta {
                file_name: upload.file_name,
                stored_path: upload.stored_path,
                size_bytes: upload.size_bytes,
                mime_type: upload.mime_type,
                uploaded_at: now,
            })
            .collect();

        let request = RegularizationRequest::new(
            actor.id.clone(),
            payload.attendance_date,
            payload.request_type,
            payload.reason,
            payload.requested_check_in,
            payload.requested_check_out,
            payload.requested_status,
            attachments,
            payload.priority,
            self.policy.entry_level(actor.role),
            now,
        );

        self.store.insert(&request).await?;
        self.notifier.notify(&request, WorkflowEvent::Submitted).await;
        Ok(request)
    }

    /// Records an approval at the request's current level and escalates, or
    /// terminates with Approved when the chain is exhausted.
    pub async fn approve(
        &self,
        request_id: &str,
        actor: &Actor,
        comments: Option<String>,
    ) -> Result<RegularizationRequest, AppError> {
        if let Some(ref comments) = comments {
            validate_comment(comments)?;
        }

        let mut request = self.load(request_id).await?;
        let level = self.actionable_level(&request, actor)?;

        let now = time::now_utc(&self.time_zone);
        let record = request.approval_mut(level);
        if record.is_decided() {
            return Err(AppError::InvalidState(format!(
                "Level {} has already been decided",
                level.as_str()
            )));
        }
        *record = ApprovalRecord {
            status: ApprovalStatus::Approved,
            approver_id: Some(actor.id.clone()),
            acted_at: Some(now),
            comments,
        };

        let event = match ApprovalPolicy::next_level(level) {
            Some(next) => {
                request.status = RequestStatus::UnderReview;
                request.current_level = Some(next);
                WorkflowEvent::Advanced { to: next }
            }
            None => {
                request.status = RequestStatus::Approved;
                request.approved_at = Some(now);
                request.current_level = None;
                WorkflowEvent::Approved
            }
        };
        request.updated_at = now;

        let expected_version = request.version;
        request.version += 1;
        self.store.save(&request, expected_version).await?;

        if request.status == RequestStatus::Approved {
            // The correction is applied after the approval is durable; a
            // failure leaves the approval standing and is surfaced in logs
            // for manual follow-up.
            if let Err(err) = self.corrections.apply(&request).await {
                tracing::warn!(
                    request_code = %request.request_code,
                    error = ?err,
                    "approved request but attendance correction failed"
                );
            }
        }

        self.notifier.notify(&request, event).await;
        Ok(request)
    }

    /// Rejects at the current level. A rejection at any level is terminal;
    /// no further escalation occurs.
    pub async fn reject(
        &self,
        request_id: &str,
        actor: &Actor,
        reason: &str,
    ) -> Result<RegularizationRequest, AppError> {
        let mut request = self.load(request_id).await?;
        let level = self.actionable_level(&request, actor)?;

        if reason.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "rejection reason is required".into(),
            ));
        }
        validate_comment(reason)?;

        let now = time::now_utc(&self.time_zone);
        let record = request.approval_mut(level);
        if record.is_decided() {
            return Err(AppError::InvalidState(format!(
                "Level {} has already been decided",
                level.as_str()
            )));
        }
        *record = ApprovalRecord {
            status: ApprovalStatus::Rejected,
            approver_id: Some(actor.id.clone()),
            acted_at: Some(now),
            comments: Some(reason.to_string()),
        };

        request.status = RequestStatus::Rejected;
        request.current_level = None;
        request.rejection_reason = Some(reason.to_string());
        request.rejected_at = Some(now);
        request.updated_at = now;

        let expected_version = request.version;
        request.version += 1;
        self.store.save(&request, expected_version).await?;

        self.notifier.notify(&request, WorkflowEvent::Rejected).await;
        Ok(request)
    }

    /// Owner-only escape hatch while the request is still Pending.
    pub async fn cancel(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> Result<RegularizationRequest, AppError> {
        let mut request = self.load(request_id).await?;
        if request.user_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the requester can cancel a request".into(),
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(AppError::InvalidState(
                "Only pending requests can be cancelled".into(),
            ));
        }

        let now = time::now_utc(&self.time_zone);
        request.status = RequestStatus::Cancelled;
        request.current_level = None;
        request.cancelled_at = Some(now);
        request.updated_at = now;

        let expected_version = request.version;
        request.version += 1;
        self.store.save(&request, expected_version).await?;

        self.notifier.notify(&request, WorkflowEvent::Cancelled).await;
        Ok(request)
    }

    /// Role-scoped listing: employees see their own requests, level roles
    /// see the queue parked at their level, override roles see everything.
    pub async fn list_for(
        &self,
        actor: &Actor,
        mut filters: RequestListFilters,
    ) -> Result<Vec<RegularizationRequest>, AppError> {
        match actor.role {
            UserRole::Employee => {
                filters.requester_id = Some(actor.id.clone());
            }
            UserRole::TeamLeader | UserRole::TeamManager | UserRole::Hr => {
                // Acting roles queue on the level that maps to their role,
                // not on their own escalation entry point.
                filters.current_level = Some(match actor.role {
                    UserRole::TeamLeader => ApprovalLevel::TeamLeader,
                    UserRole::TeamManager => ApprovalLevel::TeamManager,
                    _ => ApprovalLevel::Hr,
                });
            }
            UserRole::Vp | UserRole::Admin => {}
        }
        self.store.query(&filters).await
    }

    /// The requester's own submissions, regardless of role.
    pub async fn list_own(
        &self,
        actor: &Actor,
        mut filters: RequestListFilters,
    ) -> Result<Vec<RegularizationRequest>, AppError> {
        filters.requester_id = Some(actor.id.clone());
        self.store.query(&filters).await
    }

    /// Fetches a single request, hiding other employees' requests from
    /// non-privileged actors.
    pub async fn get_for(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> Result<RegularizationRequest, AppError> {
        let request = self.load(request_id).await?;
        if request.user_id != actor.id && actor.role == UserRole::Employee {
            return Err(AppError::NotFound(
                "Regularization request not found".into(),
            ));
        }
        Ok(request)
    }

    async fn load(&self, request_id: &str) -> Result<RegularizationRequest, AppError> {
        self.store
            .get(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Regularization request not found".into()))
    }

    /// Common approve/reject guards: the request must be non-terminal with a
    /// level to act on, and the actor must be authorized for that level.
    fn actionable_level(
        &self,
        request: &RegularizationRequest,
        actor: &Actor,
    ) -> Result<ApprovalLevel, AppError> {
        if request.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Request {} is already {}",
                request.request_code,
                request.status.db_value()
            )));
        }
        let level = request.current_level.ok_or_else(|| {
            AppError::InvalidState("Request has no pending approval level".into())
        })?;
        if !self.policy.can_act(actor.role, request) {
            return Err(AppError::Forbidden(format!(
                "Role {} cannot act at level {}",
                actor.role.as_str(),
                level.as_str()
            )));
        }
        Ok(level)
    }
}

fn validate_comment(comment: &str) -> Result<(), AppError> {
    if comment.chars().count() > MAX_DECISION_COMMENT_LENGTH {
        return Err(AppError::InvalidArgument(format!(
            "comment must be at most {} characters",
            MAX_DECISION_COMMENT_LENGTH
        )));
    }
    Ok(())
}
