use axum::{extract::State, http::StatusCode, response::Json};
use chrono::NaiveDate;
use domain::fees::{self, NewFee};
use domain::identity::require_administrator;
use model::entities::membership_fee::FeeStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

use crate::auth::CurrentAccount;
use crate::schemas::{
    domain_error_response, invalidate_aggregates, ApiResponse, AppState, ErrorResponse,
};

/// Request body for recording a fee
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateFeeRequest {
    /// The member the fee belongs to
    pub member_id: i32,
    /// Defaults to the current calendar year
    pub year: Option<i32>,
    /// Fee amount
    pub amount: Decimal,
    /// Date the fee was paid, if it was
    pub payment_date: Option<NaiveDate>,
    /// "pending" or "paid"; defaults to pending
    #[schema(value_type = Option<String>)]
    pub status: Option<FeeStatus>,
}

/// Fee response model, joined with the member's name where visible
#[derive(Debug, Serialize, ToSchema)]
pub struct FeeResponse {
    pub id: i32,
    pub member_id: i32,
    /// Full name of the member, when the join produced one
    pub member_name: Option<String>,
    pub year: i32,
    pub amount: Decimal,
    pub payment_date: Option<NaiveDate>,
    #[schema(value_type = String)]
    pub status: FeeStatus,
}

/// Get the fees visible to the caller: all of them for administrators,
/// only their own for associates. An associate with no linked member gets
/// an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/fees",
    tag = "fees",
    responses(
        (status = 200, description = "Fees retrieved successfully", body = ApiResponse<Vec<FeeResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(account_id = current.0.id))]
pub async fn get_fees(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Json<ApiResponse<Vec<FeeResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_fees function");

    match fees::list_fees(&state.db, &current.0).await {
        Ok(rows) => {
            debug!("Retrieved {} fees", rows.len());
            let data = rows
                .into_iter()
                .map(|(fee, member)| FeeResponse {
                    id: fee.id,
                    member_id: fee.member_id,
                    member_name: member.map(|m| m.full_name()),
                    year: fee.year,
                    amount: fee.amount,
                    payment_date: fee.payment_date,
                    status: fee.status,
                })
                .collect();
            let response = ApiResponse {
                data,
                message: "Fees retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(domain_error_response(err)),
    }
}

/// Record a new fee; at most one per member per year
#[utoipa::path(
    post,
    path = "/api/v1/fees",
    tag = "fees",
    request_body = CreateFeeRequest,
    responses(
        (status = 201, description = "Fee created successfully", body = ApiResponse<FeeResponse>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 409, description = "Fee for this member and year already exists", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(account_id = current.0.id))]
pub async fn create_fee(
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(request): Json<CreateFeeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FeeResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_fee function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    let new_fee = NewFee {
        member_id: request.member_id,
        year: request.year,
        amount: request.amount,
        payment_date: request.payment_date,
        status: request.status.unwrap_or(FeeStatus::Pending),
    };

    match fees::create_fee(&state.db, new_fee).await {
        Ok(fee) => {
            info!(fee_id = fee.id, year = fee.year, "Fee created");
            invalidate_aggregates(&state.cache).await;
            let response = ApiResponse {
                data: FeeResponse {
                    id: fee.id,
                    member_id: fee.member_id,
                    member_name: None,
                    year: fee.year,
                    amount: fee.amount,
                    payment_date: fee.payment_date,
                    status: fee.status,
                },
                message: "Fee created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => {
            debug!("Fee creation failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}
