pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::revocation::InMemoryRevocationStore;
use crate::services::tokens::TokenService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub tokens: Arc<TokenService>,
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.database_max_connections).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    // Revocations are process-local and reset on restart.
    let revocations = Arc::new(InMemoryRevocationStore::new());

    let state = AppState {
        db: Arc::new(db),
        tokens: Arc::new(TokenService::new(&config.auth, revocations)),
    };

    let app = build_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // Session and profile routes
        .route("/logout", post(routes::users::logout))
        .route(
            "/user/:id",
            get(routes::users::get_user).delete(routes::users::delete_user),
        )
        // Flashcard routes
        .route(
            "/flashcard",
            get(routes::flashcards::list).post(routes::flashcards::create),
        )
        .route(
            "/flashcard/:id",
            get(routes::flashcards::get)
                .put(routes::flashcards::update)
                .delete(routes::flashcards::delete),
        )
        // Tag routes
        .route("/tag", get(routes::tags::list).post(routes::tags::create))
        .route(
            "/tag/:id",
            get(routes::tags::get).delete(routes::tags::delete),
        )
        .route(
            "/flashcard/:id/tag",
            get(routes::tags::list_for_flashcard).post(routes::tags::assign),
        )
        .route(
            "/flashcard/:id/tag/:tag_id",
            post(routes::tags::link).delete(routes::tags::unlink),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::require_access,
        ));

    let refresh_routes = Router::new()
        .route("/refresh", post(routes::users::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::require_refresh,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(routes::users::register))
        .route("/login", post(routes::users::login))
        .merge(refresh_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Method, Request, StatusCode},
        response::Response,
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::AuthConfig;

    /// State whose pool never connects; only usable for paths that fail before persistence.
    fn offline_state() -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/flashcards_offline")
            .unwrap();
        AppState {
            db: Arc::new(Database::from_pool(pool)),
            tokens: Arc::new(TokenService::new(
                &AuthConfig::with_secret("test-secret"),
                Arc::new(InMemoryRevocationStore::new()),
            )),
        }
    }

    async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn error_code(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = build_router(offline_state());
        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let app = build_router(offline_state());
        let response = send(&app, Method::GET, "/flashcard", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "authorization_required");
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let app = build_router(offline_state());
        let response = send(&app, Method::GET, "/tag", Some("garbage")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "invalid_token");
    }

    #[tokio::test]
    async fn test_refresh_token_not_accepted_as_access() {
        let state = offline_state();
        let refresh = state.tokens.issue_refresh(Uuid::new_v4(), false).unwrap();
        let app = build_router(state);

        let response = send(&app, Method::GET, "/flashcard", Some(&refresh)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "invalid_token");
    }

    #[tokio::test]
    async fn test_access_token_not_accepted_for_refresh() {
        let state = offline_state();
        let access = state.tokens.issue_access(Uuid::new_v4(), false, true).unwrap();
        let app = build_router(state);

        let response = send(&app, Method::POST, "/refresh", Some(&access)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_revokes_token_for_every_later_request() {
        let state = offline_state();
        let access = state.tokens.issue_access(Uuid::new_v4(), false, true).unwrap();
        let app = build_router(state);

        let response = send(&app, Method::POST, "/logout", Some(&access)).await;
        assert_eq!(response.status(), StatusCode::OK);

        for _ in 0..2 {
            let response = send(&app, Method::POST, "/logout", Some(&access)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(error_code(response).await, "token_revoked");
        }
    }

    #[tokio::test]
    async fn test_other_users_profile_forbidden() {
        let state = offline_state();
        let access = state.tokens.issue_access(Uuid::new_v4(), false, true).unwrap();
        let app = build_router(state);

        let uri = format!("/user/{}", Uuid::new_v4());
        let response = send(&app, Method::GET, &uri, Some(&access)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_delete_profile_requires_fresh_token() {
        let state = offline_state();
        let user_id = Uuid::new_v4();
        let stale = state.tokens.issue_access(user_id, false, false).unwrap();
        let app = build_router(state);

        let uri = format!("/user/{}", user_id);
        let response = send(&app, Method::DELETE, &uri, Some(&stale)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "fresh_token_required");
    }
}
