use anyhow::anyhow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;

use crate::models::regularization_request::ApprovalLevel;
use crate::models::user::UserRole;

/// Default escalation entry points: which approval level a new request
/// starts at, keyed by the requester's role. Deployments override this via
/// `WORKFLOW_ENTRY_LEVELS`.
const DEFAULT_ENTRY_LEVELS: &str =
    "employee=team_leader,team_leader=team_manager,team_manager=hr,hr=hr,vp=hr,admin=hr";

#[derive(Debug, thiserror::Error)]
pub enum RoutingConfigError {
    #[error("invalid routing entry '{0}', expected role=level")]
    InvalidEntry(String),
    #[error("unknown role '{0}' in routing entry")]
    UnknownRole(String),
    #[error("unknown approval level '{0}' in routing entry")]
    UnknownLevel(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    pub time_zone: Tz,
    pub port: u16,
    /// Requester role -> entry approval level, configured per deployment.
    pub entry_levels: Vec<(UserRole, ApprovalLevel)>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/hrms".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-this-in-production".to_string());

        let jwt_expiration_hours = env::var("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|_| "8".to_string())
            .parse()
            .unwrap_or(8);

        let time_zone_name = env::var("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        let routing = env::var("WORKFLOW_ENTRY_LEVELS")
            .unwrap_or_else(|_| DEFAULT_ENTRY_LEVELS.to_string());
        let entry_levels = parse_entry_levels(&routing)?;

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            time_zone,
            port,
            entry_levels,
        })
    }
}

/// Parses a `role=level,role=level` routing string. Role and level spellings
/// go through the same alias normalization as the API boundary.
pub fn parse_entry_levels(
    raw: &str,
) -> Result<Vec<(UserRole, ApprovalLevel)>, RoutingConfigError> {
    let mut entries = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (role_raw, level_raw) = item
            .split_once('=')
            .ok_or_else(|| RoutingConfigError::InvalidEntry(item.to_string()))?;
        let role = UserRole::from_alias(role_raw)
            .ok_or_else(|| RoutingConfigError::UnknownRole(role_raw.trim().to_string()))?;
        let level = match UserRole::from_alias(level_raw) {
            Some(UserRole::TeamLeader) => ApprovalLevel::TeamLeader,
            Some(UserRole::TeamManager) => ApprovalLevel::TeamManager,
            Some(UserRole::Hr) => ApprovalLevel::Hr,
            _ => return Err(RoutingConfigError::UnknownLevel(level_raw.trim().to_string())),
        };
        entries.push((role, level));
    }
    Ok(entries)
}
