use axum::{
    extract::{Extension, State},
    Json,
};

use crate::error::AppError;
use crate::models::user::{LoginRequest, LoginResponse, User, UserResponse};
use crate::repositories::UserRepository;
use crate::state::AppState;
use crate::utils::{jwt::create_access_token, password::verify_password};

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = UserRepository::new()
        .find_by_username(state.db.as_ref(), &payload.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".into()))?;

    let matches = verify_password(&payload.password, &user.password_hash)
        .map_err(AppError::InternalServerError)?;
    if !matches {
        return Err(AppError::Unauthorized("Invalid username or password".into()));
    }

    let access_token = create_access_token(
        user.id.clone(),
        user.username.clone(),
        user.role.as_str().to_string(),
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )
    .map_err(AppError::InternalServerError)?;

    tracing::info!(username = %user.username, role = user.role.as_str(), "user logged in");

    Ok(Json(LoginResponse {
        access_token,
        user: UserResponse::from(user),
    }))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}
