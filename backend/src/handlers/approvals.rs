use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};

use crate::error::AppError;
use crate::handlers::regularizations::RequestListQuery;
use crate::models::regularization_request::{
    ApprovePayload, RegularizationResponse, RejectPayload,
};
use crate::models::user::{User, UserRole};
use crate::models::PaginatedResponse;
use crate::state::AppState;
use crate::workflow::Actor;

/// The approval queue for the acting role: requests currently parked at the
/// caller's level, or all requests for override roles.
pub async fn list_approval_queue(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<PaginatedResponse<RegularizationResponse>>, AppError> {
    if user.role == UserRole::Employee {
        return Err(AppError::Forbidden(
            "Employees do not have an approval queue".into(),
        ));
    }
    let actor = Actor::from(&user);
    let filters = query.into_filters();
    let (page, per_page) = (filters.page, filters.per_page);
    let requests = state.engine.list_for(&actor, filters).await?;
    let data = requests
        .into_iter()
        .map(RegularizationResponse::from)
        .collect();
    Ok(Json(PaginatedResponse::new(data, page, per_page)))
}

pub async fn approve_regularization(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(payload): Json<ApprovePayload>,
) -> Result<Json<RegularizationResponse>, AppError> {
    let actor = Actor::from(&user);
    let request = state.engine.approve(&id, &actor, payload.comments).await?;
    Ok(Json(RegularizationResponse::from(request)))
}

pub async fn reject_regularization(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(payload): Json<RejectPayload>,
) -> Result<Json<RegularizationResponse>, AppError> {
    let actor = Actor::from(&user);
    let request = state.engine.reject(&id, &actor, &payload.reason).await?;
    Ok(Json(RegularizationResponse::from(request)))
}
