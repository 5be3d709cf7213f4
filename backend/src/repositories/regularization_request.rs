//! PostgreSQL implementation of the regularization record store.
//!
//! Approval sub-records and attachment metadata are persisted as JSONB
//! snapshot columns; enum-ish fields ride as TEXT via their `sqlx::Type`
//! derives.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::attendance::AttendanceStatus;
use crate::models::regularization_request::{
    ApprovalLevel, ApprovalRecord, AttachmentMeta, Priority, RegularizationRequest,
    RegularizationType, RequestStatus,
};
use crate::workflow::store::{RegularizationStore, RequestListFilters};

const SELECT_COLUMNS: &str = "id, request_code, user_id, attendance_date, request_type, reason,
        requested_check_in, requested_check_out, requested_status,
        attachments_json, priority, status, current_level,
        team_leader_approval_json, team_manager_approval_json, hr_approval_json,
        rejection_reason, submitted_at, approved_at, rejected_at, cancelled_at,
        version, updated_at";

#[derive(Debug, FromRow)]
struct RegularizationRow {
    id: String,
    request_code: String,
    user_id: String,
    attendance_date: NaiveDate,
    request_type: RegularizationType,
    reason: String,
    requested_check_in: Option<NaiveDateTime>,
    requested_check_out: Option<NaiveDateTime>,
    requested_status: Option<AttendanceStatus>,
    attachments_json: Value,
    priority: Priority,
    status: RequestStatus,
    current_level: Option<ApprovalLevel>,
    team_leader_approval_json: Value,
    team_manager_approval_json: Value,
    hr_approval_json: Value,
    rejection_reason: Option<String>,
    submitted_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    version: i64,
    updated_at: DateTime<Utc>,
}

impl RegularizationRow {
    fn into_domain(self) -> Result<RegularizationRequest, AppError> {
        Ok(RegularizationRequest {
            id: self.id,
            request_code: self.request_code,
            user_id: self.user_id,
            attendance_date: self.attendance_date,
            request_type: self.request_type,
            reason: self.reason,
            requested_check_in: self.requested_check_in,
            requested_check_out: self.requested_check_out,
            requested_status: self.requested_status,
            attachments: from_json(self.attachments_json)?,
            priority: self.priority,
            status: self.status,
            current_level: self.current_level,
            team_leader_approval: from_json(self.team_leader_approval_json)?,
            team_manager_approval: from_json(self.team_manager_approval_json)?,
            hr_approval: from_json(self.hr_approval_json)?,
            rejection_reason: self.rejection_reason,
            submitted_at: self.submitted_at,
            approved_at: self.approved_at,
            rejected_at: self.rejected_at,
            cancelled_at: self.cancelled_at,
            version: self.version,
            updated_at: self.updated_at,
        })
    }
}

fn from_json<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(|e| AppError::InternalServerError(e.into()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::InternalServerError(e.into()))
}

fn approval_json(record: &ApprovalRecord) -> Result<Value, AppError> {
    to_json(record)
}

fn attachments_json(attachments: &[AttachmentMeta]) -> Result<Value, AppError> {
    to_json(&attachments)
}

#[derive(Clone)]
pub struct PgRegularizationStore {
    db: DbPool,
}

impl PgRegularizationStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RegularizationStore for PgRegularizationStore {
    async fn get(&self, id: &str) -> Result<Option<RegularizationRequest>, AppError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM regularization_requests WHERE id = $1"
        );
        let row = sqlx::query_as::<_, RegularizationRow>(&query)
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;
        row.map(RegularizationRow::into_domain).transpose()
    }

    async fn insert(&self, request: &RegularizationRequest) -> Result<(), AppError> {
        let query = "INSERT INTO regularization_requests (
                id, request_code, user_id, attendance_date, request_type, reason,
                requested_check_in, requested_check_out, requested_status,
                attachments_json, priority, status, current_level,
                team_leader_approval_json, team_manager_approval_json, hr_approval_json,
                rejection_reason, submitted_at, approved_at, rejected_at, cancelled_at,
                version, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,$21,$22,$23)";

        sqlx::query(query)
            .bind(&request.id)
            .bind(&request.request_code)
            .bind(&request.user_id)
            .bind(request.attendance_date)
            .bind(request.request_type)
            .bind(&request.reason)
            .bind(request.requested_check_in)
            .bind(request.requested_check_out)
            .bind(request.requested_status)
            .bind(attachments_json(&request.attachments)?)
            .bind(request.priority)
            .bind(request.status)
            .bind(request.current_level)
            .bind(approval_json(&request.team_leader_approval)?)
            .bind(approval_json(&request.team_manager_approval)?)
            .bind(approval_json(&request.hr_approval)?)
            .bind(&request.rejection_reason)
            .bind(request.submitted_at)
            .bind(request.approved_at)
            .bind(request.rejected_at)
            .bind(request.cancelled_at)
            .bind(request.version)
            .bind(request.updated_at)
            .execute(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn save(
        &self,
        request: &RegularizationRequest,
        expected_version: i64,
    ) -> Result<(), AppError> {
        let query = "UPDATE regularization_requests
            SET status = $1,
                current_level = $2,
                team_leader_approval_json = $3,
                team_manager_approval_json = $4,
                hr_approval_json = $5,
                rejection_reason = $6,
                approved_at = $7,
                rejected_at = $8,
                cancelled_at = $9,
                version = $10,
                updated_at = $11
            WHERE id = $12 AND version = $13";

        let result = sqlx::query(query)
            .bind(request.status)
            .bind(request.current_level)
            .bind(approval_json(&request.team_leader_approval)?)
            .bind(approval_json(&request.team_manager_approval)?)
            .bind(approval_json(&request.hr_approval)?)
            .bind(&request.rejection_reason)
            .bind(request.approved_at)
            .bind(request.rejected_at)
            .bind(request.cancelled_at)
            .bind(request.version)
            .bind(request.updated_at)
            .bind(&request.id)
            .bind(expected_version)
            .execute(self.db.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            // Either the record vanished or another transition got there
            // first; distinguish so callers can report accurately.
            let exists: Option<(String,)> =
                sqlx::query_as("SELECT id FROM regularization_requests WHERE id = $1")
                    .bind(&request.id)
                    .fetch_optional(self.db.as_ref())
                    .await?;
            return match exists {
                Some(_) => Err(AppError::InvalidState(
                    "Request was modified by another transition".into(),
                )),
                None => Err(AppError::NotFound(
                    "Regularization request not found".into(),
                )),
            };
        }
        Ok(())
    }

    async fn query(
        &self,
        filters: &RequestListFilters,
    ) -> Result<Vec<RegularizationRequest>, AppError> {
        let order = if filters.oldest_first {
            "submitted_at ASC"
        } else {
            "submitted_at DESC"
        };
        let query = format!(
            "SELECT {SELECT_COLUMNS}
            FROM regularization_requests
            WHERE ($1::text IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR current_level = $2)
              AND ($3::text IS NULL OR status = $3)
              AND ($4::text IS NULL OR request_type = $4)
              AND ($5::timestamptz IS NULL OR submitted_at >= $5)
              AND ($6::timestamptz IS NULL OR submitted_at <= $6)
              AND ($7::text IS NULL OR reason ILIKE '%' || $7 || '%')
            ORDER BY {order}
            LIMIT $8 OFFSET $9"
        );

        let rows = sqlx::query_as::<_, RegularizationRow>(&query)
            .bind(filters.requester_id.as_deref())
            .bind(filters.current_level)
            .bind(filters.status)
            .bind(filters.request_type)
            .bind(filters.submitted_from)
            .bind(filters.submitted_to)
            .bind(filters.search.as_deref())
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(self.db.as_ref())
            .await?;

        rows.into_iter()
            .map(RegularizationRow::into_domain)
            .collect()
    }
}
