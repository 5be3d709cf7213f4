#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

use hrms_backend::error::AppError;
use hrms_backend::models::regularization_request::{
    CreateRegularizationRequest, Priority, RegularizationRequest, RegularizationType,
};
use hrms_backend::models::user::UserRole;
use hrms_backend::workflow::{
    Actor, ApprovalPolicy, AttendanceCorrections, InMemoryRegularizationStore, Notifier,
    WorkflowEngine, WorkflowEvent,
};

/// Corrections fake that records which requests were applied. Set `fail`
/// to make every application error out.
#[derive(Default)]
pub struct RecordingCorrections {
    pub applied: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl AttendanceCorrections for RecordingCorrections {
    async fn apply(&self, request: &RegularizationRequest) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::StoreFailure(anyhow::anyhow!(
                "attendance subsystem unavailable"
            )));
        }
        self.applied
            .lock()
            .unwrap()
            .push(request.request_code.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<WorkflowEvent>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, _request: &RegularizationRequest, event: WorkflowEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct TestHarness {
    pub engine: WorkflowEngine,
    pub store: Arc<InMemoryRegularizationStore>,
    pub corrections: Arc<RecordingCorrections>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn harness() -> TestHarness {
    harness_with_corrections(RecordingCorrections::default())
}

pub fn harness_with_corrections(corrections: RecordingCorrections) -> TestHarness {
    let store = Arc::new(InMemoryRegularizationStore::new());
    let corrections = Arc::new(corrections);
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = WorkflowEngine::new(
        store.clone(),
        corrections.clone(),
        notifier.clone(),
        ApprovalPolicy::default(),
        chrono_tz::UTC,
    );
    TestHarness {
        engine,
        store,
        corrections,
        notifier,
    }
}

pub fn actor(id: &str, role: UserRole) -> Actor {
    Actor {
        id: id.to_string(),
        role,
    }
}

pub fn employee() -> Actor {
    actor("emp-1", UserRole::Employee)
}

pub fn team_leader() -> Actor {
    actor("tl-1", UserRole::TeamLeader)
}

pub fn team_manager() -> Actor {
    actor("tm-1", UserRole::TeamManager)
}

pub fn hr() -> Actor {
    actor("hr-1", UserRole::Hr)
}

pub fn vp() -> Actor {
    actor("vp-1", UserRole::Vp)
}

pub fn submission() -> CreateRegularizationRequest {
    CreateRegularizationRequest {
        attendance_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        request_type: RegularizationType::MissedCheckIn,
        reason: "forgot to badge in after an offsite meeting".into(),
        requested_check_in: NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 15, 0),
        requested_check_out: None,
        requested_status: None,
        attachments: Vec::new(),
        priority: Priority::Normal,
    }
}
