#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use domain::identity::{self, NewAccount};
    use migration::{Migrator, MigratorTrait};
    use model::entities::member::Role;
    use moka::future::Cache;
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // The cascade rules rely on foreign keys being enforced
        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, seeded with two accounts:
    /// "admin" (administrator, via the first-account bootstrap) and
    /// "staff" (associate with no linked member).
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        // The first account always becomes an administrator
        identity::create_account(
            &db,
            NewAccount {
                username: "admin".to_string(),
                password: "password123".to_string(),
                email: "admin@example.com".to_string(),
                first_name: "Admin".to_string(),
                last_name: "User".to_string(),
                role: Role::Associate,
                member_id: None,
            },
        )
        .await
        .expect("Failed to create admin account");

        identity::create_account(
            &db,
            NewAccount {
                username: "staff".to_string(),
                password: "password123".to_string(),
                email: "staff@example.com".to_string(),
                first_name: "Staff".to_string(),
                last_name: "Login".to_string(),
                role: Role::Associate,
                member_id: None,
            },
        )
        .await
        .expect("Failed to create staff account");

        let cache = Cache::new(100);

        AppState {
            db,
            cache,
            jwt_secret: "test-secret".to_string(),
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        let router = create_router(state);
        router
    }
}
