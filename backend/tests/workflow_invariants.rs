mod support;

use hrms_backend::error::AppError;
use hrms_backend::models::regularization_request::{
    ApprovalStatus, RegularizationRequest, RequestStatus,
};
use hrms_backend::workflow::RegularizationStore;
use support::*;

fn assert_level_consistency(request: &RegularizationRequest) {
    match request.status {
        RequestStatus::Pending | RequestStatus::UnderReview => {
            assert!(
                request.current_level.is_some(),
                "active request must carry a level"
            );
        }
        _ => assert!(
            request.current_level.is_none(),
            "terminal request must carry no level"
        ),
    }
}

fn terminal_timestamp_count(request: &RegularizationRequest) -> usize {
    [
        request.approved_at,
        request.rejected_at,
        request.cancelled_at,
    ]
    .iter()
    .filter(|t| t.is_some())
    .count()
}

#[tokio::test]
async fn current_level_is_set_exactly_while_active() {
    let h = harness();
    let request = h.engine.submit(&employee(), submission()).await.unwrap();
    assert_level_consistency(&request);
    assert_eq!(terminal_timestamp_count(&request), 0);

    let request = h
        .engine
        .approve(&request.id, &team_leader(), None)
        .await
        .unwrap();
    assert_level_consistency(&request);
    assert_eq!(terminal_timestamp_count(&request), 0);

    let request = h
        .engine
        .approve(&request.id, &team_manager(), None)
        .await
        .unwrap();
    let request = h.engine.approve(&request.id, &hr(), None).await.unwrap();
    assert_level_consistency(&request);
    assert_eq!(terminal_timestamp_count(&request), 1);
    assert!(request.approved_at.is_some());
}

#[tokio::test]
async fn cancellation_sets_exactly_one_terminal_timestamp() {
    let h = harness();
    let request = h.engine.submit(&employee(), submission()).await.unwrap();
    let request = h.engine.cancel(&request.id, &employee()).await.unwrap();
    assert_level_consistency(&request);
    assert_eq!(terminal_timestamp_count(&request), 1);
    assert!(request.cancelled_at.is_some());
}

#[tokio::test]
async fn cancellation_is_blocked_once_under_review() {
    let h = harness();
    let request = h.engine.submit(&employee(), submission()).await.unwrap();
    h.engine
        .approve(&request.id, &team_leader(), None)
        .await
        .unwrap();

    let result = h.engine.cancel(&request.id, &employee()).await;
    assert!(matches!(result, Err(AppError::InvalidState(_))));
}

#[tokio::test]
async fn escalation_never_skips_a_level() {
    let h = harness();
    let request = h.engine.submit(&employee(), submission()).await.unwrap();

    let mut levels = vec![request.current_level];
    let request = h
        .engine
        .approve(&request.id, &team_leader(), None)
        .await
        .unwrap();
    levels.push(request.current_level);
    let request = h
        .engine
        .approve(&request.id, &team_manager(), None)
        .await
        .unwrap();
    levels.push(request.current_level);
    let request = h.engine.approve(&request.id, &hr(), None).await.unwrap();
    levels.push(request.current_level);

    use hrms_backend::models::regularization_request::ApprovalLevel::*;
    assert_eq!(
        levels,
        vec![Some(TeamLeader), Some(TeamManager), Some(Hr), None]
    );
}

#[tokio::test]
async fn stale_transition_fails_without_mutation() {
    let h = harness();
    let request = h.engine.submit(&employee(), submission()).await.unwrap();

    // A second writer moves the record forward underneath the first.
    let mut stale = h.store.get(&request.id).await.unwrap().unwrap();
    h.engine
        .approve(&request.id, &team_leader(), None)
        .await
        .unwrap();

    stale.status = RequestStatus::Cancelled;
    stale.current_level = None;
    let result = h.store.save(&stale, stale.version).await;
    assert!(matches!(result, Err(AppError::InvalidState(_))));

    let stored = h.store.get(&request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::UnderReview);
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn each_level_records_its_own_approver() {
    let h = harness();
    let request = h.engine.submit(&employee(), submission()).await.unwrap();
    h.engine
        .approve(&request.id, &team_leader(), Some("ok".into()))
        .await
        .unwrap();
    h.engine
        .approve(&request.id, &team_manager(), None)
        .await
        .unwrap();
    let request = h
        .engine
        .approve(&request.id, &hr(), Some("final sign-off".into()))
        .await
        .unwrap();

    assert_eq!(
        request.team_leader_approval.approver_id.as_deref(),
        Some("tl-1")
    );
    assert_eq!(
        request.team_manager_approval.approver_id.as_deref(),
        Some("tm-1")
    );
    assert_eq!(request.hr_approval.approver_id.as_deref(), Some("hr-1"));
    assert_eq!(request.hr_approval.comments.as_deref(), Some("final sign-off"));
    for record in [
        &request.team_leader_approval,
        &request.team_manager_approval,
        &request.hr_approval,
    ] {
        assert_eq!(record.status, ApprovalStatus::Approved);
        assert!(record.acted_at.is_some());
    }
}

#[tokio::test]
async fn rejection_is_terminal_from_every_level() {
    for steps in 0..3 {
        let h = harness();
        let request = h.engine.submit(&employee(), submission()).await.unwrap();
        let approvers = [team_leader(), team_manager()];
        for approver in approvers.iter().take(steps) {
            h.engine
                .approve(&request.id, approver, None)
                .await
                .unwrap();
        }

        let rejecter = match steps {
            0 => team_leader(),
            1 => team_manager(),
            _ => hr(),
        };
        let request = h
            .engine
            .reject(&request.id, &rejecter, "insufficient evidence")
            .await
            .unwrap();
        assert_eq!(request.status, RequestStatus::Rejected);
        assert!(request.current_level.is_none());
        assert_eq!(terminal_timestamp_count(&request), 1);
        assert!(h.corrections.applied.lock().unwrap().is_empty());
    }
}
