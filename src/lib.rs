pub mod assignment;
pub mod auth;
pub mod classroom;
pub mod config;
pub mod db;
pub mod error;
pub mod stats;

use actix_web::HttpResponse;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub use config::Settings;
pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;

pub use auth::{AuthService, AuthenticatedUser, TokenService};
pub use db::{DbOperations, Role, User};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers. Read-only after startup: the
/// settings, the connection pool and the services wired over them.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db: DbOperations,
    pub auth: AuthService,
}

impl AppState {
    /// Connects the pool, applies pending migrations and wires the services.
    pub async fn new(config: Settings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await
            .map_err(|e| {
                AppError::Database(error::DatabaseError::ConnectionError(e.to_string()))
            })?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self::from_pool(config, pool))
    }

    /// Wires the services over an existing pool. Used by tests that bring
    /// their own (possibly lazily connected) pool.
    pub fn from_pool(config: Settings, pool: PgPool) -> Self {
        let db = DbOperations::new(Arc::new(pool));
        let tokens = TokenService::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_expiry_hours,
        );
        let auth = AuthService::new(db.clone(), tokens);

        Self {
            config: Arc::new(config),
            db,
            auth,
        }
    }
}
