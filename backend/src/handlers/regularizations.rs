use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::models::regularization_request::{
    CreateRegularizationRequest, RegularizationResponse, RegularizationType, RequestStatus,
};
use crate::models::user::User;
use crate::models::PaginatedResponse;
use crate::state::AppState;
use crate::workflow::{Actor, RequestListFilters};

/// Common list-filter query string shared by the listing endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RequestListQuery {
    pub status: Option<RequestStatus>,
    pub request_type: Option<RegularizationType>,
    /// Inclusive lower bound on the submission date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the submission date.
    pub to: Option<NaiveDate>,
    /// Substring match against the reason text.
    pub q: Option<String>,
    #[serde(default)]
    pub oldest_first: bool,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl RequestListQuery {
    pub fn into_filters(self) -> RequestListFilters {
        RequestListFilters {
            requester_id: None,
            current_level: None,
            status: self.status,
            request_type: self.request_type,
            submitted_from: self
                .from
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc()),
            submitted_to: self
                .to
                .and_then(|d| d.and_hms_opt(23, 59, 59))
                .map(|dt| dt.and_utc()),
            search: self.q.filter(|q| !q.trim().is_empty()),
            oldest_first: self.oldest_first,
            page: self.page.unwrap_or(1).max(1),
            per_page: self.per_page.unwrap_or(20).clamp(1, 100),
        }
    }
}

pub async fn create_regularization(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateRegularizationRequest>,
) -> Result<Json<RegularizationResponse>, AppError> {
    let actor = Actor::from(&user);
    let request = state.engine.submit(&actor, payload).await?;
    Ok(Json(RegularizationResponse::from(request)))
}

pub async fn list_my_regularizations(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<PaginatedResponse<RegularizationResponse>>, AppError> {
    let actor = Actor::from(&user);
    let filters = query.into_filters();
    let (page, per_page) = (filters.page, filters.per_page);
    let requests = state.engine.list_own(&actor, filters).await?;
    let data = requests
        .into_iter()
        .map(RegularizationResponse::from)
        .collect();
    Ok(Json(PaginatedResponse::new(data, page, per_page)))
}

pub async fn get_regularization(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<RegularizationResponse>, AppError> {
    let actor = Actor::from(&user);
    let request = state.engine.get_for(&id, &actor).await?;
    Ok(Json(RegularizationResponse::from(request)))
}

pub async fn cancel_regularization(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<RegularizationResponse>, AppError> {
    let actor = Actor::from(&user);
    let request = state.engine.cancel(&id, &actor).await?;
    Ok(Json(RegularizationResponse::from(request)))
}
