use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use domain::identity::require_administrator;
use domain::roster::{self, MemberFields};
use model::entities::{member, member::Role};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::CurrentAccount;
use crate::schemas::{
    domain_error_response, invalidate_aggregates, ApiResponse, AppState, ErrorResponse,
};

/// Request body for creating or updating a member
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateMemberRequest {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    /// "associate" or "administrator"; defaults to associate
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
    /// Defaults to true
    pub active: Option<bool>,
}

/// Request body for creating a member together with its login account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateMemberWithAccountRequest {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
    pub active: Option<bool>,
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Member response model
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[schema(value_type = String)]
    pub role: Role,
    pub active: bool,
}

/// Fee rows returned from the per-member fee listing
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberFeeResponse {
    pub id: i32,
    pub year: i32,
    pub amount: Decimal,
    pub payment_date: Option<NaiveDate>,
    #[schema(value_type = String)]
    pub status: model::entities::membership_fee::FeeStatus,
}

impl From<member::Model> for MemberResponse {
    fn from(model: member::Model) -> Self {
        let full_name = model.full_name();
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            full_name,
            email: model.email,
            phone: model.phone,
            role: model.role,
            active: model.active,
        }
    }
}

impl CreateMemberRequest {
    fn into_fields(self) -> MemberFields {
        MemberFields {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            role: self.role.unwrap_or(Role::Associate),
            active: self.active.unwrap_or(true),
        }
    }
}

/// Get all members, ordered by last and first name
#[utoipa::path(
    get,
    path = "/api/v1/members",
    tag = "members",
    responses(
        (status = 200, description = "Members retrieved successfully", body = ApiResponse<Vec<MemberResponse>>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(account_id = current.0.id))]
pub async fn get_members(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Json<ApiResponse<Vec<MemberResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_members function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    match roster::list_members(&state.db).await {
        Ok(members) => {
            debug!("Retrieved {} members", members.len());
            let response = ApiResponse {
                data: members.into_iter().map(MemberResponse::from).collect(),
                message: "Members retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(domain_error_response(err)),
    }
}

/// Create a new member
#[utoipa::path(
    post,
    path = "/api/v1/members",
    tag = "members",
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Member created successfully", body = ApiResponse<MemberResponse>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(account_id = current.0.id))]
pub async fn create_member(
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(request): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MemberResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_member function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    if let Err(e) = request.validate() {
        debug!("Member validation failed: {}", e);
        return Err(domain_error_response(domain::DomainError::Validation(
            e.to_string(),
        )));
    }

    match roster::create_member(&state.db, request.into_fields()).await {
        Ok(member) => {
            info!(member_id = member.id, "Member created");
            invalidate_aggregates(&state.cache).await;
            let response = ApiResponse {
                data: MemberResponse::from(member),
                message: "Member created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => {
            debug!("Member creation failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}

/// Create a member together with a login account, atomically
#[utoipa::path(
    post,
    path = "/api/v1/members/with-account",
    tag = "members",
    request_body = CreateMemberWithAccountRequest,
    responses(
        (status = 201, description = "Member and account created successfully", body = ApiResponse<MemberResponse>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 409, description = "Username or email already in use", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(account_id = current.0.id))]
pub async fn create_member_with_account(
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(request): Json<CreateMemberWithAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MemberResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_member_with_account function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    if let Err(e) = request.validate() {
        debug!("Member-with-account validation failed: {}", e);
        return Err(domain_error_response(domain::DomainError::Validation(
            e.to_string(),
        )));
    }

    let fields = MemberFields {
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        phone: request.phone,
        role: request.role.unwrap_or(Role::Associate),
        active: request.active.unwrap_or(true),
    };

    match roster::create_member_with_account(&state.db, fields, request.username, request.password)
        .await
    {
        Ok((member, account)) => {
            info!(member_id = member.id, account_id = account.id, "Member and account created");
            invalidate_aggregates(&state.cache).await;
            let response = ApiResponse {
                data: MemberResponse::from(member),
                message: "Member and account created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => {
            debug!("Member-with-account creation failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}

/// Update a member. The linked account's role follows the member role.
#[utoipa::path(
    put,
    path = "/api/v1/members/{member_id}",
    tag = "members",
    params(
        ("member_id" = i32, Path, description = "Member ID"),
    ),
    request_body = CreateMemberRequest,
    responses(
        (status = 200, description = "Member updated successfully", body = ApiResponse<MemberResponse>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(account_id = current.0.id))]
pub async fn update_member(
    Path(member_id): Path<i32>,
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(request): Json<CreateMemberRequest>,
) -> Result<Json<ApiResponse<MemberResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_member function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    if let Err(e) = request.validate() {
        debug!("Member validation failed: {}", e);
        return Err(domain_error_response(domain::DomainError::Validation(
            e.to_string(),
        )));
    }

    match roster::update_member(&state.db, member_id, request.into_fields()).await {
        Ok(member) => {
            info!(member_id, "Member updated");
            invalidate_aggregates(&state.cache).await;
            let response = ApiResponse {
                data: MemberResponse::from(member),
                message: "Member updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => {
            debug!("Member update failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}

/// Delete a member, cascading to its fees, participations and account
#[utoipa::path(
    delete,
    path = "/api/v1/members/{member_id}",
    tag = "members",
    params(
        ("member_id" = i32, Path, description = "Member ID"),
    ),
    responses(
        (status = 200, description = "Member deleted successfully", body = ApiResponse<String>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(account_id = current.0.id))]
pub async fn delete_member(
    Path(member_id): Path<i32>,
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_member function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    match roster::delete_member(&state.db, member_id).await {
        Ok(()) => {
            info!(member_id, "Member deleted");
            invalidate_aggregates(&state.cache).await;
            let response = ApiResponse {
                data: format!("Member {} deleted", member_id),
                message: "Member deleted successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => {
            debug!("Member deletion failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}

/// Get one member's fees, newest year first. Associates may only request
/// their own member; administrators may request anyone's.
#[utoipa::path(
    get,
    path = "/api/v1/members/{member_id}/fees",
    tag = "members",
    params(
        ("member_id" = i32, Path, description = "Member ID"),
    ),
    responses(
        (status = 200, description = "Fees retrieved successfully", body = ApiResponse<Vec<MemberFeeResponse>>),
        (status = 403, description = "Not allowed to view this member's fees", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(account_id = current.0.id))]
pub async fn get_member_fees(
    Path(member_id): Path<i32>,
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Json<ApiResponse<Vec<MemberFeeResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_member_fees function");

    match domain::fees::fees_for_member(&state.db, &current.0, member_id).await {
        Ok(fees) => {
            debug!("Retrieved {} fees for member {}", fees.len(), member_id);
            let data = fees
                .into_iter()
                .map(|fee| MemberFeeResponse {
                    id: fee.id,
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
        Err(err) => {
            debug!("Member fee listing failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}
