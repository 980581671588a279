use axum::{extract::State, http::StatusCode, response::Json};
use chrono::NaiveDate;
use common::LedgerTotals;
use domain::identity::require_administrator;
use domain::ledger::{self, NewTransaction};
use model::entities::{event, financial_transaction, financial_transaction::TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

use crate::auth::CurrentAccount;
use crate::schemas::{
    domain_error_response, invalidate_aggregates, ApiResponse, AppState, CachedData, ErrorResponse,
    TOTALS_CACHE_KEY,
};

/// Request body for recording a transaction
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTransactionRequest {
    /// "income" or "expense"
    #[schema(value_type = String)]
    pub transaction_type: TransactionType,
    /// Unsigned amount; must be greater than zero
    pub amount: Decimal,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    /// What the money was for
    pub description: String,
    /// Optional link to an event
    pub event_id: Option<i32>,
}

/// Transaction response model
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i32,
    #[schema(value_type = String)]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    /// Positive for income, negative for expense
    pub signed_amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    pub event_id: Option<i32>,
    /// Title of the linked event, when there is one
    pub event_title: Option<String>,
}

/// The ledger listing with its running totals
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionsListResponse {
    pub transactions: Vec<TransactionResponse>,
    pub totals: LedgerTotals,
}

fn transaction_response(
    model: financial_transaction::Model,
    event: Option<event::Model>,
) -> TransactionResponse {
    let signed_amount = model.signed_amount();
    TransactionResponse {
        id: model.id,
        transaction_type: model.transaction_type,
        amount: model.amount,
        signed_amount,
        date: model.date,
        description: model.description,
        event_id: model.event_id,
        event_title: event.map(|e| e.title),
    }
}

/// Get all transactions, newest first, with income/expense/balance totals
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    tag = "transactions",
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = ApiResponse<TransactionsListResponse>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(account_id = current.0.id))]
pub async fn get_transactions(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Json<ApiResponse<TransactionsListResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_transactions function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    let rows = match ledger::list_transactions(&state.db).await {
        Ok(rows) => rows,
        Err(err) => return Err(domain_error_response(err)),
    };

    // Totals are cached between writes; the ledger only changes on create
    let totals = if let Some(CachedData::Totals(totals)) =
        state.cache.get(TOTALS_CACHE_KEY).await
    {
        debug!("Ledger totals served from cache");
        totals
    } else {
        let totals = ledger::totals(&state.db)
            .await
            .map_err(domain_error_response)?;
        state
            .cache
            .insert(TOTALS_CACHE_KEY.to_string(), CachedData::Totals(totals.clone()))
            .await;
        totals
    };

    debug!("Retrieved {} transactions", rows.len());
    let response = ApiResponse {
        data: TransactionsListResponse {
            transactions: rows
                .into_iter()
                .map(|(t, e)| transaction_response(t, e))
                .collect(),
            totals,
        },
        message: "Transactions retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Record an income or expense
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    tag = "transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded successfully", body = ApiResponse<TransactionResponse>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 404, description = "Linked event not found", body = ErrorResponse),
        (status = 422, description = "Invalid amount", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(account_id = current.0.id))]
pub async fn create_transaction(
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering create_transaction function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    let new_transaction = NewTransaction {
        transaction_type: request.transaction_type,
        amount: request.amount,
        date: request.date,
        description: request.description,
        event_id: request.event_id,
    };

    match ledger::create_transaction(&state.db, new_transaction).await {
        Ok(transaction) => {
            info!(transaction_id = transaction.id, "Transaction recorded");
            invalidate_aggregates(&state.cache).await;
            let response = ApiResponse {
                data: transaction_response(transaction, None),
                message: "Transaction recorded successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => {
            debug!("Transaction creation failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}
