//! Shared fixtures for the domain test suites.

use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use model::entities::{account, member, member::Role};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};

/// Create an in-memory SQLite database with the full schema applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Insert a member directly, bypassing the roster operations.
pub async fn insert_member(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
    email: &str,
    role: Role,
) -> member::Model {
    member::ActiveModel {
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        email: Set(email.to_string()),
        phone: Set(None),
        role: Set(role),
        active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert member")
}

/// Insert an account directly with a throwaway hash, bypassing the
/// identity operations (and their bootstrap rule).
pub async fn insert_account(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
    member_id: Option<i32>,
) -> account::Model {
    account::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("$argon2id$test-only".to_string()),
        email: Set(format!("{username}@example.com")),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        role: Set(role),
        member_id: Set(member_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert account")
}

/// A fixed date inside the test calendar, for deterministic clocks.
pub fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}
