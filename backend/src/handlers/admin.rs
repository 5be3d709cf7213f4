//! Admin-only handlers. Routes in this module sit behind the override-role
//! middleware gate.

use axum::{
    extract::{Extension, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::handlers::regularizations::RequestListQuery;
use crate::models::regularization_request::RegularizationResponse;
use crate::models::user::{CreateUser, User, UserResponse, UserRole};
use crate::models::PaginatedResponse;
use crate::repositories::UserRepository;
use crate::state::AppState;
use crate::utils::{csv::append_csv_row, password::hash_password, time};
use crate::workflow::Actor;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Extra scoping on top of [`RequestListQuery`] for admin listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AdminScopeQuery {
    /// Restrict to a single requester.
    pub user_id: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUser>,
) -> Result<Json<UserResponse>, AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::InvalidArgument("username is required".into()));
    }
    if payload.password.len() < 8 {
        return Err(AppError::InvalidArgument(
            "password must be at least 8 characters".into(),
        ));
    }

    let password_hash = hash_password(&payload.password).map_err(AppError::InternalServerError)?;
    let user = UserRepository::new()
        .create(
            state.db.as_ref(),
            payload.username.trim(),
            &password_hash,
            &payload.full_name,
            payload.role,
            payload.department.as_deref(),
        )
        .await?;

    tracing::info!(username = %user.username, role = user.role.as_str(), "created user");
    Ok(Json(UserResponse::from(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let users = UserRepository::new()
        .list(state.db.as_ref(), query.role, page, per_page)
        .await?;
    let data = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(PaginatedResponse::new(data, page, per_page)))
}

/// Unscoped listing across all requesters and levels. The middleware gate
/// guarantees the caller holds an override role, so `list_for` applies no
/// scoping beyond the explicit filters.
pub async fn list_all_regularizations(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(scope): Query<AdminScopeQuery>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<PaginatedResponse<RegularizationResponse>>, AppError> {
    let mut filters = query.into_filters();
    filters.requester_id = scope.user_id;
    let (page, per_page) = (filters.page, filters.per_page);
    let requests = state.engine.list_for(&Actor::from(&user), filters).await?;
    let data = requests
        .into_iter()
        .map(RegularizationResponse::from)
        .collect();
    Ok(Json(PaginatedResponse::new(data, page, per_page)))
}

/// CSV export of the filtered request list.
pub async fn export_regularizations(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(scope): Query<AdminScopeQuery>,
    Query(query): Query<RequestListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut filters = query.into_filters();
    filters.requester_id = scope.user_id;
    // Exports ignore the caller's pagination and walk the whole filtered set.
    filters.page = 1;
    filters.per_page = 100;
    let actor = Actor::from(&user);
    let mut requests = Vec::new();
    loop {
        let page = state.engine.list_for(&actor, filters.clone()).await?;
        let last = (page.len() as i64) < filters.per_page;
        requests.extend(page);
        if last {
            break;
        }
        filters.page += 1;
    }

    let csv_data = tokio::task::spawn_blocking(move || {
        let mut csv = String::new();
        append_csv_row(
            &mut csv,
            &[
                "request_code".into(),
                "user_id".into(),
                "attendance_date".into(),
                "request_type".into(),
                "reason".into(),
                "priority".into(),
                "status".into(),
                "current_level".into(),
                "submitted_at".into(),
                "rejection_reason".into(),
            ],
        );
        for request in requests {
            append_csv_row(
                &mut csv,
                &[
                    request.request_code.clone(),
                    request.user_id.clone(),
                    request.attendance_date.to_string(),
                    request.request_type.as_str().to_string(),
                    request.reason.clone(),
                    request.priority.as_str().to_string(),
                    request.status.db_value().to_string(),
                    request
                        .current_level
                        .map(|level| level.as_str().to_string())
                        .unwrap_or_default(),
                    request.submitted_at.to_rfc3339(),
                    request.rejection_reason.clone().unwrap_or_default(),
                ],
            );
        }
        csv
    })
    .await
    .map_err(|e| AppError::InternalServerError(e.into()))?;

    let filename = format!(
        "regularizations_export_{}.csv",
        time::today_local(&state.config.time_zone).format("%Y%m%d")
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    if let Ok(value) =
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok((headers, csv_data))
}
