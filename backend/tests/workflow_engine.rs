mod support;

use hrms_backend::error::AppError;
use hrms_backend::models::regularization_request::{
    ApprovalLevel, ApprovalStatus, RequestStatus,
};
use hrms_backend::models::user::UserRole;
use hrms_backend::workflow::{RegularizationStore, WorkflowEvent};
use support::*;

#[tokio::test]
async fn full_chain_approval_applies_attendance_correction() {
    let h = harness();
    let request = h.engine.submit(&employee(), submission()).await.unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.current_level, Some(ApprovalLevel::TeamLeader));

    let request = h
        .engine
        .approve(&request.id, &team_leader(), Some("looks fine".into()))
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::UnderReview);
    assert_eq!(request.current_level, Some(ApprovalLevel::TeamManager));
    assert_eq!(
        request.team_leader_approval.status,
        ApprovalStatus::Approved
    );
    assert_eq!(
        request.team_leader_approval.approver_id.as_deref(),
        Some("tl-1")
    );

    let request = h
        .engine
        .approve(&request.id, &team_manager(), None)
        .await
        .unwrap();
    assert_eq!(request.current_level, Some(ApprovalLevel::Hr));

    let request = h.engine.approve(&request.id, &hr(), None).await.unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
    assert!(request.current_level.is_none());
    assert!(request.approved_at.is_some());
    assert_eq!(request.hr_approval.status, ApprovalStatus::Approved);

    let applied = h.corrections.applied.lock().unwrap();
    assert_eq!(applied.as_slice(), [request.request_code.clone()]);

    let events = h.notifier.events.lock().unwrap();
    assert_eq!(
        events.as_slice(),
        [
            WorkflowEvent::Submitted,
            WorkflowEvent::Advanced {
                to: ApprovalLevel::TeamManager
            },
            WorkflowEvent::Advanced {
                to: ApprovalLevel::Hr
            },
            WorkflowEvent::Approved,
        ]
    );
}

#[tokio::test]
async fn mid_chain_rejection_is_terminal() {
    let h = harness();
    let request = h.engine.submit(&employee(), submission()).await.unwrap();
    let request = h
        .engine
        .approve(&request.id, &team_leader(), None)
        .await
        .unwrap();

    let request = h
        .engine
        .reject(&request.id, &team_manager(), "dates do not match the badge log")
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Rejected);
    assert!(request.current_level.is_none());
    assert!(request.rejected_at.is_some());
    assert_eq!(
        request.rejection_reason.as_deref(),
        Some("dates do not match the badge log")
    );
    assert_eq!(
        request.team_manager_approval.status,
        ApprovalStatus::Rejected
    );
    // The earlier decision is preserved.
    assert_eq!(
        request.team_leader_approval.status,
        ApprovalStatus::Approved
    );

    // No attendance change for rejected requests.
    assert!(h.corrections.applied.lock().unwrap().is_empty());

    // Terminal requests accept no further decisions.
    let result = h.engine.approve(&request.id, &hr(), None).await;
    assert!(matches!(result, Err(AppError::InvalidState(_))));
}

#[tokio::test]
async fn override_role_can_act_at_any_level() {
    let h = harness();
    let request = h.engine.submit(&employee(), submission()).await.unwrap();

    // VP acts directly at the team-leader level.
    let request = h.engine.approve(&request.id, &vp(), None).await.unwrap();
    assert_eq!(request.current_level, Some(ApprovalLevel::TeamManager));
    assert_eq!(
        request.team_leader_approval.approver_id.as_deref(),
        Some("vp-1")
    );

    // And again at the team-manager level.
    let request = h.engine.approve(&request.id, &vp(), None).await.unwrap();
    assert_eq!(request.current_level, Some(ApprovalLevel::Hr));

    // Approving at the HR level terminates the chain, with the override
    // actor recorded on the HR sub-record.
    let request = h.engine.approve(&request.id, &vp(), None).await.unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
    assert_eq!(request.hr_approval.approver_id.as_deref(), Some("vp-1"));
}

#[tokio::test]
async fn non_matching_roles_are_forbidden() {
    let h = harness();
    let request = h.engine.submit(&employee(), submission()).await.unwrap();

    // The requester cannot approve their own request.
    let result = h.engine.approve(&request.id, &employee(), None).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    // A team manager cannot act while the request sits at the team-leader
    // level.
    let result = h.engine.approve(&request.id, &team_manager(), None).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    // HR cannot reject out of turn either.
    let result = h.engine.reject(&request.id, &hr(), "out of turn").await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn blank_rejection_reason_leaves_request_untouched() {
    let h = harness();
    let request = h.engine.submit(&employee(), submission()).await.unwrap();

    let result = h.engine.reject(&request.id, &team_leader(), "   ").await;
    assert!(matches!(result, Err(AppError::InvalidArgument(_))));

    let stored = h.store.get(&request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
    assert_eq!(stored.current_level, Some(ApprovalLevel::TeamLeader));
    assert_eq!(
        stored.team_leader_approval.status,
        ApprovalStatus::Pending
    );
}

#[tokio::test]
async fn leader_submission_skips_the_leader_level() {
    let h = harness();
    let leader = team_leader();
    let request = h.engine.submit(&leader, submission()).await.unwrap();
    assert_eq!(request.current_level, Some(ApprovalLevel::TeamManager));
    assert_eq!(
        request.team_leader_approval.status,
        ApprovalStatus::Pending
    );

    let request = h
        .engine
        .approve(&request.id, &team_manager(), None)
        .await
        .unwrap();
    let request = h.engine.approve(&request.id, &hr(), None).await.unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
    // The skipped level never gets a decision.
    assert_eq!(
        request.team_leader_approval.status,
        ApprovalStatus::Pending
    );
}

#[tokio::test]
async fn correction_failure_does_not_roll_back_the_approval() {
    let h = harness_with_corrections(RecordingCorrections {
        fail: true,
        ..Default::default()
    });
    let request = h.engine.submit(&employee(), submission()).await.unwrap();
    let request = h
        .engine
        .approve(&request.id, &team_leader(), None)
        .await
        .unwrap();
    let request = h
        .engine
        .approve(&request.id, &team_manager(), None)
        .await
        .unwrap();
    let request = h.engine.approve(&request.id, &hr(), None).await.unwrap();

    assert_eq!(request.status, RequestStatus::Approved);
    let stored = h.store.get(&request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Approved);
}

#[tokio::test]
async fn listing_scopes_by_role() {
    let h = harness();
    let emp_a = employee();
    let emp_b = actor("emp-2", UserRole::Employee);
    let a = h.engine.submit(&emp_a, submission()).await.unwrap();
    let b = h.engine.submit(&emp_b, submission()).await.unwrap();
    // Advance one request to the team-manager level.
    h.engine.approve(&b.id, &team_leader(), None).await.unwrap();

    let own = h
        .engine
        .list_for(&emp_a, Default::default())
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, a.id);

    let tl_queue = h
        .engine
        .list_for(&team_leader(), Default::default())
        .await
        .unwrap();
    assert_eq!(tl_queue.len(), 1);
    assert_eq!(tl_queue[0].id, a.id);

    let tm_queue = h
        .engine
        .list_for(&team_manager(), Default::default())
        .await
        .unwrap();
    assert_eq!(tm_queue.len(), 1);
    assert_eq!(tm_queue[0].id, b.id);

    let all = h.engine.list_for(&vp(), Default::default()).await.unwrap();
    assert_eq!(all.len(), 2);
}
