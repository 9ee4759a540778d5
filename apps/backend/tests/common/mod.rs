//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helpers for creating users with ready-to-use tokens
//! - Authentication header helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).

pub mod fixtures;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use uuid::Uuid;

use flashcard_api::config::AuthConfig;
use flashcard_api::db::Database;
use flashcard_api::services::password::hash_password;
use flashcard_api::services::revocation::InMemoryRevocationStore;
use flashcard_api::services::tokens::TokenService;
use flashcard_api::{build_router, AppState};
use flashcard_core::Credentials;

/// A registered user with tokens from a simulated login.
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Test context containing database connection and router.
///
/// Requires DATABASE_URL environment variable to be set.
pub struct TestContext {
    pub db: Arc<Database>,
    pub tokens: Arc<TokenService>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);
        let tokens = Arc::new(TokenService::new(
            &AuthConfig::with_secret("integration-test-secret"),
            Arc::new(InMemoryRevocationStore::new()),
        ));

        let app = build_router(AppState {
            db: db.clone(),
            tokens: tokens.clone(),
        });

        Self { db, tokens, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Insert a user directly and mint the tokens a login would return.
    pub async fn create_test_user(&self, prefix: &str) -> TestUser {
        let username = fixtures::unique_username(prefix);
        let credentials = Credentials::new(&username, fixtures::PASSWORD).unwrap();
        let hash = hash_password(fixtures::PASSWORD).unwrap();

        let user = self
            .db
            .create_user(&credentials, &hash)
            .await
            .expect("Failed to create test user");

        let pair = self
            .tokens
            .issue_pair(user.id, user.is_admin)
            .expect("Failed to issue tokens");

        TestUser {
            id: user.id,
            username,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }

    /// Remove a user; owned flashcards, tags and links cascade.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }

    /// Count rows of `table` owned by a user.
    pub async fn count_owned(&self, table: &str, user_id: Uuid) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE user_id = $1", table);
        sqlx::query_scalar(&sql)
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to count rows")
    }
}
