use axum::http::StatusCode;
use axum::response::Json;
use common::{DashboardSummary, EventSummary, FeeStatusCount, LedgerTotals};
use domain::DomainError;
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for expensive aggregate queries
    pub cache: Cache<String, CachedData>,
    /// Secret used to sign and verify bearer tokens
    pub jwt_secret: String,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Dashboard(DashboardSummary),
    Totals(LedgerTotals),
}

/// Cache keys for the aggregate payloads.
pub const DASHBOARD_CACHE_KEY: &str = "dashboard";
pub const TOTALS_CACHE_KEY: &str = "ledger_totals";

/// Drop the cached aggregates after any write that feeds into them.
pub async fn invalidate_aggregates(cache: &Cache<String, CachedData>) {
    cache.invalidate(DASHBOARD_CACHE_KEY).await;
    cache.invalidate(TOTALS_CACHE_KEY).await;
}

/// API response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Map a domain error onto the HTTP status and error payload the API
/// returns. Uniqueness violations surface as conflicts with a field-level
/// message, never as unhandled failures.
pub fn domain_error_response(err: DomainError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code, message) = match &err {
        DomainError::DuplicateUsername(_) => (
            StatusCode::CONFLICT,
            "USERNAME_ALREADY_EXISTS",
            err.to_string(),
        ),
        DomainError::DuplicateEmail(_) => (
            StatusCode::CONFLICT,
            "EMAIL_ALREADY_EXISTS",
            err.to_string(),
        ),
        DomainError::DuplicateFeeYear { .. } => (
            StatusCode::CONFLICT,
            "FEE_YEAR_ALREADY_EXISTS",
            err.to_string(),
        ),
        DomainError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string()),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        DomainError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            err.to_string(),
        ),
        DomainError::Validation(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_ERROR",
            err.to_string(),
        ),
        DomainError::PasswordHash(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "internal server error".to_string(),
        ),
        DomainError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            "internal server error".to_string(),
        ),
    };

    (
        status,
        Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        }),
    )
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::accounts::login,
        crate::handlers::accounts::get_profile,
        crate::handlers::accounts::update_profile,
        crate::handlers::accounts::change_password,
        crate::handlers::members::get_members,
        crate::handlers::members::create_member,
        crate::handlers::members::create_member_with_account,
        crate::handlers::members::update_member,
        crate::handlers::members::delete_member,
        crate::handlers::members::get_member_fees,
        crate::handlers::fees::get_fees,
        crate::handlers::fees::create_fee,
        crate::handlers::events::get_events,
        crate::handlers::events::create_event,
        crate::handlers::events::update_event,
        crate::handlers::events::delete_event,
        crate::handlers::events::register_for_event,
        crate::handlers::events::get_event_participations,
        crate::handlers::events::update_participation,
        crate::handlers::transactions::get_transactions,
        crate::handlers::transactions::create_transaction,
        crate::handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            ApiResponse<DashboardSummary>,
            ApiResponse<LedgerTotals>,
            DashboardSummary,
            EventSummary,
            FeeStatusCount,
            LedgerTotals,
            crate::handlers::accounts::LoginRequest,
            crate::handlers::accounts::LoginResponse,
            crate::handlers::accounts::AccountResponse,
            crate::handlers::accounts::UpdateProfileRequest,
            crate::handlers::accounts::ChangePasswordRequest,
            crate::handlers::members::CreateMemberRequest,
            crate::handlers::members::CreateMemberWithAccountRequest,
            crate::handlers::members::MemberResponse,
            crate::handlers::members::MemberFeeResponse,
            crate::handlers::fees::CreateFeeRequest,
            crate::handlers::fees::FeeResponse,
            crate::handlers::events::CreateEventRequest,
            crate::handlers::events::EventResponse,
            crate::handlers::events::EventsListResponse,
            crate::handlers::events::ParticipationResponse,
            crate::handlers::events::RegistrationResponse,
            crate::handlers::events::UpdateParticipationRequest,
            crate::handlers::transactions::CreateTransactionRequest,
            crate::handlers::transactions::TransactionResponse,
            crate::handlers::transactions::TransactionsListResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login and profile self-service"),
        (name = "members", description = "Roster management endpoints"),
        (name = "fees", description = "Membership fee endpoints"),
        (name = "events", description = "Event and participation endpoints"),
        (name = "transactions", description = "Financial ledger endpoints"),
        (name = "dashboard", description = "Administrator dashboard endpoints"),
    ),
    info(
        title = "AssoRust API",
        description = "Association management API - roster, membership fees, events and bookkeeping for a small association",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
