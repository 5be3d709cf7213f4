//! Notification seam for workflow transitions.
//!
//! Delivery transport (mail, in-app feeds) is an external collaborator; the
//! engine only emits events through this trait. The default implementation
//! writes structured tracing events so transitions stay observable without
//! any transport configured.

use async_trait::async_trait;

use crate::models::regularization_request::{ApprovalLevel, RegularizationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEvent {
    Submitted,
    /// Approved at a level and escalated to the next one.
    Advanced { to: ApprovalLevel },
    Approved,
    Rejected,
    Cancelled,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, request: &RegularizationRequest, event: WorkflowEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, request: &RegularizationRequest, event: WorkflowEvent) {
        match event {
            WorkflowEvent::Submitted => tracing::info!(
                request_code = %request.request_code,
                user_id = %request.user_id,
                level = ?request.current_level,
                "regularization request submitted"
            ),
            WorkflowEvent::Advanced { to } => tracing::info!(
                request_code = %request.request_code,
                next_level = to.as_str(),
                "regularization request escalated"
            ),
            WorkflowEvent::Approved => tracing::info!(
                request_code = %request.request_code,
                user_id = %request.user_id,
                "regularization request approved"
            ),
            WorkflowEvent::Rejected => tracing::info!(
                request_code = %request.request_code,
                user_id = %request.user_id,
                "regularization request rejected"
            ),
            WorkflowEvent::Cancelled => tracing::info!(
                request_code = %request.request_code,
                user_id = %request.user_id,
                "regularization request cancelled"
            ),
        }
    }
}
