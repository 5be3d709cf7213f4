//! Attendance repository and the corrections hook that applies approved
//! regularization requests to attendance records.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::attendance::{Attendance, AttendanceStatus};
use crate::models::regularization_request::{RegularizationRequest, RegularizationType};
use crate::workflow::engine::AttendanceCorrections;

const SELECT_COLUMNS: &str =
    "id, user_id, date, check_in_time, check_out_time, status, created_at, updated_at";

#[derive(Debug, Default, Clone, Copy)]
pub struct AttendanceRepository;

impl AttendanceRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_user_and_date(
        &self,
        db: &PgPool,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, AppError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM attendance WHERE user_id = $1 AND date = $2"
        );
        Ok(sqlx::query_as::<_, Attendance>(&query)
            .bind(user_id)
            .bind(date)
            .fetch_optional(db)
            .await?)
    }

    /// Upserts the attendance row for the request's user and date, applying
    /// only the fields the request carries.
    pub async fn apply_regularization(
        &self,
        db: &PgPool,
        request: &RegularizationRequest,
    ) -> Result<Attendance, AppError> {
        let now = Utc::now();
        let status = request.requested_status.unwrap_or(match request.request_type {
            RegularizationType::WorkFromHome => AttendanceStatus::WorkFromHome,
            _ => AttendanceStatus::Present,
        });

        let query = format!(
            "INSERT INTO attendance (id, user_id, date, check_in_time, check_out_time, status, created_at, updated_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            ON CONFLICT (user_id, date) DO UPDATE SET
                check_in_time = COALESCE(EXCLUDED.check_in_time, attendance.check_in_time),
                check_out_time = COALESCE(EXCLUDED.check_out_time, attendance.check_out_time),
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            RETURNING {SELECT_COLUMNS}"
        );

        Ok(sqlx::query_as::<_, Attendance>(&query)
            .bind(Uuid::new_v4().to_string())
            .bind(&request.user_id)
            .bind(request.attendance_date)
            .bind(request.requested_check_in)
            .bind(request.requested_check_out)
            .bind(status)
            .bind(now)
            .bind(now)
            .fetch_one(db)
            .await?)
    }
}

/// Production corrections hook backed by the attendance table.
#[derive(Clone)]
pub struct PgAttendanceCorrections {
    db: DbPool,
    repository: AttendanceRepository,
}

impl PgAttendanceCorrections {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            repository: AttendanceRepository::new(),
        }
    }
}

#[async_trait]
impl AttendanceCorrections for PgAttendanceCorrections {
    async fn apply(&self, request: &RegularizationRequest) -> Result<(), AppError> {
        let attendance = self
            .repository
            .apply_regularization(self.db.as_ref(), request)
            .await?;
        tracing::info!(
            request_code = %request.request_code,
            attendance_id = %attendance.id,
            status = attendance.status.as_str(),
            "applied attendance correction"
        );
        Ok(())
    }
}
