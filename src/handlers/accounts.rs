use axum::{extract::State, http::StatusCode, response::Json};
use domain::identity::{self, ProfileUpdate};
use model::entities::{account, member::Role, prelude::Member};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{issue_token, CurrentAccount};
use crate::schemas::{domain_error_response, ApiResponse, AppState, ErrorResponse};

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

/// Response for a successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// The authenticated account
    pub account: AccountResponse,
}

/// Account response model
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String)]
    pub role: Role,
    pub member_id: Option<i32>,
    /// Linked member's full name when present, the account's own name or
    /// username otherwise
    pub display_name: String,
}

/// Request body for updating the caller's own profile
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    /// Only meaningful for accounts with a linked member
    pub phone: Option<String>,
}

/// Request body for changing the caller's password
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

async fn account_response(state: &AppState, account: account::Model) -> AccountResponse {
    let linked = match account.member_id {
        Some(member_id) => Member::find_by_id(member_id).one(&state.db).await.ok().flatten(),
        None => None,
    };
    let display_name = identity::display_name(&account, linked.as_ref());
    AccountResponse {
        id: account.id,
        username: account.username,
        email: account.email,
        first_name: account.first_name,
        last_name: account.last_name,
        role: account.role,
        member_id: account.member_id,
        display_name,
    }
}

/// Authenticate and obtain a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering login function");

    let account = match identity::verify_credentials(&state.db, &request.username, &request.password)
        .await
    {
        Ok(account) => account,
        Err(err) => {
            debug!("Login failed for '{}': {}", request.username, err);
            return Err(domain_error_response(err));
        }
    };

    let token = match issue_token(&account, &state.jwt_secret) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to issue token for account {}: {}", account.id, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal server error".to_string(),
                    code: "TOKEN_ERROR".to_string(),
                    success: false,
                }),
            ));
        }
    };

    info!(account_id = account.id, "Login successful");
    let response = ApiResponse {
        data: LoginResponse {
            token,
            account: account_response(&state, account).await,
        },
        message: "Login successful".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get the caller's own profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "auth",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<AccountResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(account_id = current.0.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Json<ApiResponse<AccountResponse>> {
    let response = ApiResponse {
        data: account_response(&state, current.0).await,
        message: "Profile retrieved successfully".to_string(),
        success: true,
    };
    Json(response)
}

/// Update the caller's own profile. Shared fields propagate to the linked
/// member record.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    tag = "auth",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<AccountResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 409, description = "Username or email already in use", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(account_id = current.0.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_profile function");

    if let Err(e) = request.validate() {
        debug!("Profile update validation failed: {}", e);
        return Err(domain_error_response(domain::DomainError::Validation(
            e.to_string(),
        )));
    }

    let update = ProfileUpdate {
        username: request.username,
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        phone: request.phone,
    };

    match identity::update_profile(&state.db, current.0.id, update).await {
        Ok(account) => {
            info!(account_id = account.id, "Profile updated");
            let response = ApiResponse {
                data: account_response(&state, account).await,
                message: "Profile updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => {
            debug!("Profile update failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}

/// Change the caller's password, verifying the current one first
#[utoipa::path(
    put,
    path = "/api/v1/profile/password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed successfully", body = ApiResponse<String>),
        (status = 401, description = "Current password is wrong", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(account_id = current.0.id))]
pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering change_password function");

    if let Err(e) = request.validate() {
        debug!("Password change validation failed: {}", e);
        return Err(domain_error_response(domain::DomainError::Validation(
            e.to_string(),
        )));
    }

    match identity::change_password(
        &state.db,
        current.0.id,
        &request.old_password,
        &request.new_password,
    )
    .await
    {
        Ok(()) => {
            info!(account_id = current.0.id, "Password changed");
            let response = ApiResponse {
                data: "ok".to_string(),
                message: "Password changed successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => {
            debug!("Password change failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}
