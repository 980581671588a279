//! Bearer-token authentication for the API surface.
//!
//! `login` issues a signed JWT; [`CurrentAccount`] is the extractor every
//! authenticated handler takes, resolving the token back to the stored
//! account so role checks always run against current data.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, StatusCode};
use axum::response::Json;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use model::entities::{account, prelude::Account};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::schemas::{AppState, ErrorResponse};

/// Token lifetime, one week.
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Claims carried in the bearer token. The account is re-loaded on every
/// request, so a role change takes effect without reissuing the token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: i32,
    /// Username, for log readability only
    pub username: String,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Issue a signed token for an account.
pub fn issue_token(
    account: &account::Model,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: account.id,
        username: account.username.clone(),
        exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "UNAUTHORIZED".to_string(),
            success: false,
        }),
    )
}

/// The authenticated account making the request.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub account::Model);

#[async_trait::async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("missing authorization header"))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("authorization header is not a bearer token"))?;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            warn!("Token validation failed: {}", e);
            unauthorized("invalid or expired token")
        })?
        .claims;

        let account = Account::find_by_id(claims.sub)
            .one(&state.db)
            .await
            .map_err(|e| {
                warn!("Account lookup failed during authentication: {}", e);
                unauthorized("invalid or expired token")
            })?
            .ok_or_else(|| unauthorized("account no longer exists"))?;

        debug!(account_id = account.id, "Request authenticated");
        Ok(CurrentAccount(account))
    }
}
