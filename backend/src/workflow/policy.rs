//! Pure approval-chain decision logic.
//!
//! Maps {requester role, request state} to {entry level, authorization,
//! next level}. This is the single source of truth for workflow
//! authorization; handlers and the engine never compare roles themselves.

use std::collections::HashMap;

use crate::models::regularization_request::{ApprovalLevel, RegularizationRequest};
use crate::models::user::UserRole;

#[derive(Debug, Clone)]
pub struct ApprovalPolicy {
    entry_levels: HashMap<UserRole, ApprovalLevel>,
}

impl ApprovalPolicy {
    /// Builds a policy from an explicit requester-role -> entry-level table,
    /// as configured per deployment.
    pub fn new(entry_levels: impl IntoIterator<Item = (UserRole, ApprovalLevel)>) -> Self {
        Self {
            entry_levels: entry_levels.into_iter().collect(),
        }
    }

    /// Every new request starts at a level determined solely by who
    /// submitted it. Roles missing from the table fall back to HR so a
    /// misconfigured deployment routes to a human rather than nowhere.
    pub fn entry_level(&self, requester_role: UserRole) -> ApprovalLevel {
        self.entry_levels
            .get(&requester_role)
            .copied()
            .unwrap_or(ApprovalLevel::Hr)
    }

    /// True iff the request is still actionable and the actor's role matches
    /// the level that must act next. Override roles (VP, Admin) may act at
    /// any level; that is an explicit authorization exception.
    pub fn can_act(&self, actor_role: UserRole, request: &RegularizationRequest) -> bool {
        if request.is_terminal() {
            return false;
        }
        let Some(level) = request.current_level else {
            return false;
        };
        if actor_role.is_override() {
            return true;
        }
        Self::role_for_level(level) == actor_role
    }

    /// Fixed escalation order: TeamLeader -> TeamManager -> HR -> terminal.
    pub fn next_level(level: ApprovalLevel) -> Option<ApprovalLevel> {
        match level {
            ApprovalLevel::TeamLeader => Some(ApprovalLevel::TeamManager),
            ApprovalLevel::TeamManager => Some(ApprovalLevel::Hr),
            ApprovalLevel::Hr => None,
        }
    }

    /// The non-override role responsible for a level.
    pub fn role_for_level(level: ApprovalLevel) -> UserRole {
        match level {
            ApprovalLevel::TeamLeader => UserRole::TeamLeader,
            ApprovalLevel::TeamManager => UserRole::TeamManager,
            ApprovalLevel::Hr => UserRole::Hr,
        }
    }
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self::new([
            (UserRole::Employee, ApprovalLevel::TeamLeader),
            (UserRole::TeamLeader, ApprovalLevel::TeamManager),
            (UserRole::TeamManager, ApprovalLevel::Hr),
            (UserRole::Hr, ApprovalLevel::Hr),
            (UserRole::Vp, ApprovalLevel::Hr),
            (UserRole::Admin, ApprovalLevel::Hr),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::regularization_request::{
        Priority, RegularizationType, RequestStatus,
    };
    use chrono::{NaiveDate, Utc};

    fn request_at(level: ApprovalLevel) -> RegularizationRequest {
        RegularizationRequest::new(
            "user-1".into(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            RegularizationType::MissedCheckOut,
            "left early, forgot to check out".into(),
            None,
            None,
            None,
            Vec::new(),
            Priority::Normal,
            level,
            Utc::now(),
        )
    }

    #[test]
    fn entry_level_follows_configured_table() {
        let policy = ApprovalPolicy::default();
        assert_eq!(policy.entry_level(UserRole::Employee), ApprovalLevel::TeamLeader);
        assert_eq!(
            policy.entry_level(UserRole::TeamLeader),
            ApprovalLevel::TeamManager
        );
        assert_eq!(policy.entry_level(UserRole::TeamManager), ApprovalLevel::Hr);
    }

    #[test]
    fn entry_level_falls_back_to_hr_for_unconfigured_roles() {
        let policy = ApprovalPolicy::new([(UserRole::Employee, ApprovalLevel::TeamLeader)]);
        assert_eq!(policy.entry_level(UserRole::Vp), ApprovalLevel::Hr);
    }

    #[test]
    fn escalation_order_is_fixed_and_never_skips() {
        assert_eq!(
            ApprovalPolicy::next_level(ApprovalLevel::TeamLeader),
            Some(ApprovalLevel::TeamManager)
        );
        assert_eq!(
            ApprovalPolicy::next_level(ApprovalLevel::TeamManager),
            Some(ApprovalLevel::Hr)
        );
        assert_eq!(ApprovalPolicy::next_level(ApprovalLevel::Hr), None);
    }

    #[test]
    fn only_matching_role_can_act_at_a_level() {
        let policy = ApprovalPolicy::default();
        let request = request_at(ApprovalLevel::TeamLeader);
        assert!(policy.can_act(UserRole::TeamLeader, &request));
        assert!(!policy.can_act(UserRole::Employee, &request));
        // HR is not an override role; it must wait for its own level.
        assert!(!policy.can_act(UserRole::Hr, &request));
    }

    #[test]
    fn override_roles_can_act_at_any_level() {
        let policy = ApprovalPolicy::default();
        for level in [
            ApprovalLevel::TeamLeader,
            ApprovalLevel::TeamManager,
            ApprovalLevel::Hr,
        ] {
            let request = request_at(level);
            assert!(policy.can_act(UserRole::Vp, &request));
            assert!(policy.can_act(UserRole::Admin, &request));
        }
    }

    #[test]
    fn nobody_can_act_on_terminal_requests() {
        let policy = ApprovalPolicy::default();
        let mut request = request_at(ApprovalLevel::Hr);
        request.status = RequestStatus::Rejected;
        request.current_level = None;
        assert!(!policy.can_act(UserRole::Hr, &request));
        assert!(!policy.can_act(UserRole::Vp, &request));
    }
}
