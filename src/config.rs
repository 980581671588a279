use crate::schemas::AppState;
use anyhow::Result;
use moka::future::Cache;
use sea_orm::{ConnectionTrait, Database};
use std::time::Duration;

/// Initialize application configuration and state from the environment
pub async fn initialize_app_state() -> Result<AppState> {
    dotenvy::dotenv().ok();
    let database_url = get_database_url();
    initialize_app_state_with_url(&database_url).await
}

/// Initialize application state against a specific database URL
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    // Connect to database
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    // SQLite needs foreign keys switched on for the schema's cascade rules
    if database_url.starts_with("sqlite") {
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    }

    // Initialize cache
    let cache = Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes
        .build();

    Ok(AppState {
        db,
        cache,
        jwt_secret: get_jwt_secret(),
    })
}

/// Get database URL from environment or use default
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://assorust.db".to_string())
}

/// Get bind address from environment or use default
pub fn get_bind_address() -> String {
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

/// Get the token signing secret from the environment. The fallback is only
/// usable for local development.
pub fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET is not set, using an insecure development secret");
        "insecure-development-secret".to_string()
    })
}
