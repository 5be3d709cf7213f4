//! Regularization request model: one employee's request to correct an
//! attendance record, together with its approval chain state.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::attendance::AttendanceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RegularizationType {
    MissedCheckIn,
    MissedCheckOut,
    LateArrival,
    SystemError,
    WorkFromHome,
}

impl RegularizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegularizationType::MissedCheckIn => "missed_check_in",
            RegularizationType::MissedCheckOut => "missed_check_out",
            RegularizationType::LateArrival => "late_arrival",
            RegularizationType::SystemError => "system_error",
            RegularizationType::WorkFromHome => "work_from_home",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
/// Display priority. Does not affect routing, only ordering and badges.
pub enum Priority {
    Urgent,
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
/// Overall workflow status. Exactly one holds at any time.
pub enum RequestStatus {
    #[default]
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn db_value(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::UnderReview => "under_review",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Approved | RequestStatus::Rejected | RequestStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
/// The role that must act next. Present iff the request is Pending or
/// UnderReview.
pub enum ApprovalLevel {
    TeamLeader,
    TeamManager,
    Hr,
}

impl ApprovalLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalLevel::TeamLeader => "team_leader",
            ApprovalLevel::TeamManager => "team_manager",
            ApprovalLevel::Hr => "hr",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Default)]
/// One level's decision. Pending until the corresponding role acts;
/// immutable once Approved or Rejected.
pub struct ApprovalRecord {
    pub status: ApprovalStatus,
    pub approver_id: Option<String>,
    pub acted_at: Option<DateTime<Utc>>,
    pub comments: Option<String>,
}

impl ApprovalRecord {
    pub fn is_decided(&self) -> bool {
        !matches!(self.status, ApprovalStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
/// Metadata for a supporting document. Owned by the request and immutable
/// once attached; blob storage itself lives outside this service.
pub struct AttachmentMeta {
    pub file_name: String,
    pub stored_path: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegularizationRequest {
    pub id: String,
    /// Human-readable request code, e.g. `REG-20260115-3FA2C1`.
    pub request_code: String,
    /// Requesting employee. Immutable after creation.
    pub user_id: String,
    /// The attendance date being corrected.
    pub attendance_date: NaiveDate,
    pub request_type: RegularizationType,
    pub reason: String,
    pub requested_check_in: Option<NaiveDateTime>,
    pub requested_check_out: Option<NaiveDateTime>,
    pub requested_status: Option<AttendanceStatus>,
    pub attachments: Vec<AttachmentMeta>,
    pub priority: Priority,
    pub status: RequestStatus,
    pub current_level: Option<ApprovalLevel>,
    pub team_leader_approval: ApprovalRecord,
    pub team_manager_approval: ApprovalRecord,
    pub hr_approval: ApprovalRecord,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Bumped on every persisted transition; saves are compare-and-swap on
    /// this value so a stale transition fails instead of overwriting.
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl RegularizationRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        attendance_date: NaiveDate,
        request_type: RegularizationType,
        reason: String,
        requested_check_in: Option<NaiveDateTime>,
        requested_check_out: Option<NaiveDateTime>,
        requested_status: Option<AttendanceStatus>,
        attachments: Vec<AttachmentMeta>,
        priority: Priority,
        entry_level: ApprovalLevel,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            request_code: generate_request_code(attendance_date),
            user_id,
            attendance_date,
            request_type,
            reason,
            requested_check_in,
            requested_check_out,
            requested_status,
            attachments,
            priority,
            status: RequestStatus::Pending,
            current_level: Some(entry_level),
            team_leader_approval: ApprovalRecord::default(),
            team_manager_approval: ApprovalRecord::default(),
            hr_approval: ApprovalRecord::default(),
            rejection_reason: None,
            submitted_at: now,
            approved_at: None,
            rejected_at: None,
            cancelled_at: None,
            version: 0,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn approval(&self, level: ApprovalLevel) -> &ApprovalRecord {
        match level {
            ApprovalLevel::TeamLeader => &self.team_leader_approval,
            ApprovalLevel::TeamManager => &self.team_manager_approval,
            ApprovalLevel::Hr => &self.hr_approval,
        }
    }

    pub fn approval_mut(&mut self, level: ApprovalLevel) -> &mut ApprovalRecord {
        match level {
            ApprovalLevel::TeamLeader => &mut self.team_leader_approval,
            ApprovalLevel::TeamManager => &mut self.team_manager_approval,
            ApprovalLevel::Hr => &mut self.hr_approval,
        }
    }
}

/// Builds a human-readable code from the attendance date plus a short
/// random suffix.
pub fn generate_request_code(date: NaiveDate) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("REG-{}-{}", date.format("%Y%m%d"), suffix)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Attachment metadata supplied at submission time. The upload timestamp is
/// assigned by the server.
pub struct AttachmentUpload {
    pub file_name: String,
    pub stored_path: String,
    pub size_bytes: i64,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRegularizationRequest {
    pub attendance_date: NaiveDate,
    pub request_type: RegularizationType,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
    pub requested_check_in: Option<NaiveDateTime>,
    pub requested_check_out: Option<NaiveDateTime>,
    pub requested_status: Option<AttendanceStatus>,
    #[serde(default)]
    pub attachments: Vec<AttachmentUpload>,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Approval payload. Comments are optional for approvals.
pub struct ApprovePayload {
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Rejection payload. The reason is required and must be non-empty.
pub struct RejectPayload {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegularizationResponse {
    pub id: String,
    pub request_code: String,
    pub user_id: String,
    pub attendance_date: NaiveDate,
    pub request_type: RegularizationType,
    pub reason: String,
    pub requested_check_in: Option<NaiveDateTime>,
    pub requested_check_out: Option<NaiveDateTime>,
    pub requested_status: Option<AttendanceStatus>,
    pub attachments: Vec<AttachmentMeta>,
    pub priority: Priority,
    pub status: RequestStatus,
    pub current_level: Option<ApprovalLevel>,
    pub team_leader_approval: ApprovalRecord,
    pub team_manager_approval: ApprovalRecord,
    pub hr_approval: ApprovalRecord,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<RegularizationRequest> for RegularizationResponse {
    fn from(request: RegularizationRequest) -> Self {
        RegularizationResponse {
            id: request.id,
            request_code: request.request_code,
            user_id: request.user_id,
            attendance_date: request.attendance_date,
            request_type: request.request_type,
            reason: request.reason,
            requested_check_in: request.requested_check_in,
            requested_check_out: request.requested_check_out,
            requested_status: request.requested_status,
            attachments: request.attachments,
            priority: request.priority,
            status: request.status,
            current_level: request.current_level,
            team_leader_approval: request.team_leader_approval,
            team_manager_approval: request.team_manager_approval,
            hr_approval: request.hr_approval,
            rejection_reason: request.rejection_reason,
            submitted_at: request.submitted_at,
            approved_at: request.approved_at,
            rejected_at: request.rejected_at,
            cancelled_at: request.cancelled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> RegularizationRequest {
        RegularizationRequest::new(
            "user-1".into(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            RegularizationType::MissedCheckIn,
            "Forgot to check in".into(),
            None,
            None,
            None,
            Vec::new(),
            Priority::Normal,
            ApprovalLevel::TeamLeader,
            Utc::now(),
        )
    }

    #[test]
    fn new_request_starts_pending_at_entry_level() {
        let request = sample_request();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.current_level, Some(ApprovalLevel::TeamLeader));
        assert_eq!(request.version, 0);
        assert!(!request.team_leader_approval.is_decided());
        assert!(!request.team_manager_approval.is_decided());
        assert!(!request.hr_approval.is_decided());
        assert!(request.rejection_reason.is_none());
    }

    #[test]
    fn request_code_embeds_attendance_date() {
        let code = generate_request_code(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
        assert!(code.starts_with("REG-20260115-"));
        assert_eq!(code.len(), "REG-20260115-".len() + 6);
    }

    #[test]
    fn status_terminal_classification() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::UnderReview.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
    }

    #[test]
    fn status_and_type_serde_snake_case() {
        let status: RequestStatus = serde_json::from_str("\"under_review\"").unwrap();
        assert_eq!(status, RequestStatus::UnderReview);
        let emitted = serde_json::to_value(RegularizationType::WorkFromHome).unwrap();
        assert_eq!(emitted, serde_json::json!("work_from_home"));
        let level: ApprovalLevel = serde_json::from_str("\"team_manager\"").unwrap();
        assert_eq!(level, ApprovalLevel::TeamManager);
    }

    #[test]
    fn approval_accessor_matches_level() {
        let mut request = sample_request();
        request.team_manager_approval.status = ApprovalStatus::Approved;
        assert!(request.approval(ApprovalLevel::TeamManager).is_decided());
        assert!(!request.approval(ApprovalLevel::TeamLeader).is_decided());
        request.approval_mut(ApprovalLevel::Hr).status = ApprovalStatus::Rejected;
        assert!(request.hr_approval.is_decided());
    }

    #[test]
    fn create_payload_validates_reason_length() {
        use validator::Validate;
        let payload = CreateRegularizationRequest {
            attendance_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            request_type: RegularizationType::LateArrival,
            reason: String::new(),
            requested_check_in: None,
            requested_check_out: None,
            requested_status: None,
            attachments: Vec::new(),
            priority: Priority::default(),
        };
        assert!(payload.validate().is_err());
    }
}
