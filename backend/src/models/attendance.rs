use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default,
)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    #[default]
    Absent,
    Late,
    HalfDay,
    WorkFromHome,
    OnLeave,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::HalfDay => "half_day",
            AttendanceStatus::WorkFromHome => "work_from_home",
            AttendanceStatus::OnLeave => "on_leave",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// One user-day attendance record. The regularization workflow is the only
/// writer of corrections; clocking itself lives in the attendance subsystem.
pub struct Attendance {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub check_in_time: Option<NaiveDateTime>,
    pub check_out_time: Option<NaiveDateTime>,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attendance {
    pub fn new(user_id: String, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            date,
            check_in_time: None,
            check_out_time: None,
            status: AttendanceStatus::Absent,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_status_serde_snake_case() {
        let status: AttendanceStatus = serde_json::from_str("\"work_from_home\"").unwrap();
        assert_eq!(status, AttendanceStatus::WorkFromHome);
        let emitted = serde_json::to_value(AttendanceStatus::HalfDay).unwrap();
        assert_eq!(emitted, serde_json::json!("half_day"));
    }

    #[test]
    fn new_attendance_defaults_to_absent() {
        let record = Attendance::new("user-1".into(), NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
        assert_eq!(record.status, AttendanceStatus::Absent);
        assert!(record.check_in_time.is_none());
    }
}
