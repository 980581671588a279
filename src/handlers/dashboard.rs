use axum::{extract::State, http::StatusCode, response::Json};
use common::DashboardSummary;
use domain::ledger;
use tracing::{debug, instrument, trace};

use crate::auth::CurrentAccount;
use crate::schemas::{
    domain_error_response, ApiResponse, AppState, CachedData, ErrorResponse, DASHBOARD_CACHE_KEY,
};

/// Get the administrator dashboard: active member count, event count,
/// ledger totals, recent events and fee counts by status
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "Dashboard retrieved successfully", body = ApiResponse<DashboardSummary>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(account_id = current.0.id))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Json<ApiResponse<DashboardSummary>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_dashboard function");

    // The cache only short-circuits the queries; the role check always runs
    if let Some(CachedData::Dashboard(summary)) = state.cache.get(DASHBOARD_CACHE_KEY).await {
        if let Err(err) = domain::identity::require_administrator(&current.0) {
            return Err(domain_error_response(err));
        }
        debug!("Dashboard served from cache");
        let response = ApiResponse {
            data: summary,
            message: "Dashboard retrieved from cache".to_string(),
            success: true,
        };
        return Ok(Json(response));
    }

    match ledger::dashboard_summary(&state.db, &current.0).await {
        Ok(summary) => {
            state
                .cache
                .insert(
                    DASHBOARD_CACHE_KEY.to_string(),
                    CachedData::Dashboard(summary.clone()),
                )
                .await;
            let response = ApiResponse {
                data: summary,
                message: "Dashboard retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => {
            debug!("Dashboard retrieval failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}
