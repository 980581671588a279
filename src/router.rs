use crate::handlers::{
    accounts::{change_password, get_profile, login, update_profile},
    dashboard::get_dashboard,
    events::{
        create_event, delete_event, get_event_participations, get_events, register_for_event,
        update_event, update_participation,
    },
    fees::{create_fee, get_fees},
    health::health_check,
    members::{
        create_member, create_member_with_account, delete_member, get_member_fees, get_members,
        update_member,
    },
    transactions::{create_transaction, get_transactions},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication and profile self-service
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/profile", get(get_profile))
        .route("/api/v1/profile", put(update_profile))
        .route("/api/v1/profile/password", put(change_password))
        // Roster routes
        .route("/api/v1/members", get(get_members))
        .route("/api/v1/members", post(create_member))
        .route("/api/v1/members/with-account", post(create_member_with_account))
        .route("/api/v1/members/:member_id", put(update_member))
        .route("/api/v1/members/:member_id", delete(delete_member))
        .route("/api/v1/members/:member_id/fees", get(get_member_fees))
        // Fee routes
        .route("/api/v1/fees", get(get_fees))
        .route("/api/v1/fees", post(create_fee))
        // Event and participation routes
        .route("/api/v1/events", get(get_events))
        .route("/api/v1/events", post(create_event))
        .route("/api/v1/events/:event_id", put(update_event))
        .route("/api/v1/events/:event_id", delete(delete_event))
        .route("/api/v1/events/:event_id/register", post(register_for_event))
        .route(
            "/api/v1/events/:event_id/participations",
            get(get_event_participations),
        )
        .route(
            "/api/v1/participations/:participation_id",
            put(update_participation),
        )
        // Ledger routes
        .route("/api/v1/transactions", get(get_transactions))
        .route("/api/v1/transactions", post(create_transaction))
        // Dashboard
        .route("/api/v1/dashboard", get(get_dashboard))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
