//! Models that represent user accounts and role metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of an authenticated user account.
pub struct User {
    /// Unique identifier for the user.
    pub id: String,
    /// Immutable username used for login.
    pub username: String,
    /// Argon2 hash of the user's password.
    pub password_hash: String,
    /// Human-readable full name.
    pub full_name: String,
    /// Canonical role describing the user's position in the approval chain.
    pub role: UserRole,
    /// Optional department label, display only.
    pub department: Option<String>,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Canonical user roles stored in the database.
///
/// Incoming role strings are normalized here; the rest of the system never
/// compares role strings directly.
pub enum UserRole {
    #[default]
    Employee,
    TeamLeader,
    TeamManager,
    Hr,
    Vp,
    Admin,
}

impl UserRole {
    /// Returns the canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Employee => "employee",
            UserRole::TeamLeader => "team_leader",
            UserRole::TeamManager => "team_manager",
            UserRole::Hr => "hr",
            UserRole::Vp => "vp",
            UserRole::Admin => "admin",
        }
    }

    /// Normalizes an external role string into a canonical role.
    ///
    /// Source systems spell the same role several ways ("Team Lead",
    /// "team_leader", "Senior VP"); all aliases collapse here.
    pub fn from_alias(value: &str) -> Option<UserRole> {
        let normalized: String = value
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                _ => c.to_ascii_lowercase(),
            })
            .collect();
        match normalized.as_str() {
            "employee" | "staff" => Some(UserRole::Employee),
            "team_leader" | "team_lead" | "teamleader" | "tl" => Some(UserRole::TeamLeader),
            "team_manager" | "teammanager" | "manager" | "tm" => Some(UserRole::TeamManager),
            "hr" | "human_resources" | "hr_manager" => Some(UserRole::Hr),
            "vp" | "vice_president" | "senior_vp" | "svp" => Some(UserRole::Vp),
            "admin" | "administrator" | "system_admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Override-capable roles may act at any approval level.
    pub fn is_override(&self) -> bool {
        matches!(self, UserRole::Vp | UserRole::Admin)
    }
}

impl Serialize for UserRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UserRole::from_alias(&s).ok_or_else(|| {
            serde::de::Error::unknown_variant(
                &s,
                &["employee", "team_leader", "team_manager", "hr", "vp", "admin"],
            )
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Payload for creating a new user account.
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Credentials submitted by a user attempting to authenticate.
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Authentication token returned after a successful login.
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Public-facing representation of a user returned by the API.
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub department: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role.as_str().to_string(),
            department: user.department,
        }
    }
}

impl User {
    /// Constructs a new user with a freshly generated identifier.
    pub fn new(
        username: String,
        password_hash: String,
        full_name: String,
        role: UserRole,
        department: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            full_name,
            role,
            department,
            created_at: now,
            updated_at: now,
        }
    }
}
