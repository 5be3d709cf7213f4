use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::{
    models::user::User,
    repositories::UserRepository,
    state::AppState,
    utils::jwt::{verify_access_token, Claims},
};

/// Verifies the bearer token and loads the current user into request
/// extensions for handlers downstream.
pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    let (claims, user) = authenticate_request(auth_header.as_deref(), &state).await?;
    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Auth plus the override-role gate for admin-only routes.
pub async fn auth_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    let (claims, user) = authenticate_request(auth_header.as_deref(), &state).await?;
    if !user.role.is_override() {
        return Err(StatusCode::FORBIDDEN);
    }
    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    if let Some(space_idx) = header.find(' ') {
        let (scheme, rest) = header.split_at(space_idx);
        if scheme.eq_ignore_ascii_case("bearer") {
            return Some(rest.trim_start());
        }
    }
    None
}

async fn authenticate_request(
    auth_header: Option<&str>,
    state: &AppState,
) -> Result<(Claims, User), StatusCode> {
    let token = auth_header
        .and_then(parse_bearer_token)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = verify_access_token(token, &state.config.jwt_secret)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // The token may outlive the account; re-resolve the user on every
    // request so deleted users lose access immediately.
    let user = UserRepository::new()
        .find_by_id(state.db.as_ref(), &claims.sub)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    Ok((claims, user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_schemes_case_insensitively() {
        assert_eq!(parse_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("BEARER   abc"), Some("abc"));
        assert_eq!(parse_bearer_token("Basic abc"), None);
        assert_eq!(parse_bearer_token("abc"), None);
    }
}
