use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

use hrms_backend::{
    config::Config,
    db::{connection::create_pool, DbPool},
    docs::ApiDoc,
    handlers,
    middleware as auth_middleware,
    repositories::{PgAttendanceCorrections, PgRegularizationStore},
    state::AppState,
    workflow::{ApprovalPolicy, TracingNotifier, WorkflowEngine},
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hrms_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        jwt_secret = %mask_secret(&config.jwt_secret),
        jwt_expiration_hours = config.jwt_expiration_hours,
        time_zone = %config.time_zone,
        port = config.port,
        "Loaded configuration from environment/.env"
    );

    let pool: DbPool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(pool.as_ref()).await?;

    let engine = Arc::new(WorkflowEngine::new(
        Arc::new(PgRegularizationStore::new(pool.clone())),
        Arc::new(PgAttendanceCorrections::new(pool.clone())),
        Arc::new(TracingNotifier),
        ApprovalPolicy::new(config.entry_levels.iter().copied()),
        config.time_zone,
    ));
    let state = AppState::new(pool, config, engine);

    let public_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/docs/openapi.json", get(openapi_json));

    let user_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/regularizations",
            post(handlers::regularizations::create_regularization),
        )
        .route(
            "/api/regularizations/me",
            get(handlers::regularizations::list_my_regularizations),
        )
        .route(
            "/api/regularizations/{id}",
            get(handlers::regularizations::get_regularization),
        )
        .route(
            "/api/regularizations/{id}",
            delete(handlers::regularizations::cancel_regularization),
        )
        .route("/api/approvals", get(handlers::approvals::list_approval_queue))
        .route(
            "/api/approvals/{id}/approve",
            put(handlers::approvals::approve_regularization),
        )
        .route(
            "/api/approvals/{id}/reject",
            put(handlers::approvals::reject_regularization),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::auth::auth,
        ));

    let admin_routes = Router::new()
        .route("/api/admin/users", get(handlers::admin::list_users))
        .route("/api/admin/users", post(handlers::admin::create_user))
        .route(
            "/api/admin/regularizations",
            get(handlers::admin::list_all_regularizations),
        )
        .route(
            "/api/admin/regularizations/export",
            get(handlers::admin::export_regularizations),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::auth::auth_admin,
        ));

    let port = state.config.port;
    let app = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
