//! The financial ledger and its aggregates. All money arithmetic is done
//! on `Decimal`, never floats, so totals cannot drift by cents.

use chrono::{NaiveDate, Utc};
use common::{DashboardSummary, EventSummary, FeeStatusCount, LedgerTotals};
use model::entities::{
    account, event, financial_transaction,
    financial_transaction::TransactionType,
    membership_fee,
    prelude::{Event, FinancialTransaction, Member, MembershipFee},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{info, instrument};

use crate::error::{DomainError, Result};
use crate::identity::require_administrator;

/// How many events the dashboard's recent list shows.
const RECENT_EVENTS_LIMIT: u64 = 5;

/// Fields for a new ledger entry. `amount` is the unsigned magnitude; the
/// direction comes from `transaction_type`.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub event_id: Option<i32>,
}

/// All transactions, newest first, joined with their linked event.
pub async fn list_transactions(
    db: &DatabaseConnection,
) -> Result<Vec<(financial_transaction::Model, Option<event::Model>)>> {
    let rows = FinancialTransaction::find()
        .find_also_related(Event)
        .order_by_desc(financial_transaction::Column::Date)
        .order_by_desc(financial_transaction::Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

/// Record an income or expense. Amounts are stored positive.
#[instrument(skip(db, new), fields(transaction_type = ?new.transaction_type))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    new: NewTransaction,
) -> Result<financial_transaction::Model> {
    if new.amount <= Decimal::ZERO {
        return Err(DomainError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }

    if let Some(event_id) = new.event_id {
        if Event::find_by_id(event_id).one(db).await?.is_none() {
            return Err(DomainError::NotFound("event"));
        }
    }

    let transaction = financial_transaction::ActiveModel {
        transaction_type: Set(new.transaction_type),
        amount: Set(new.amount),
        date: Set(new.date.unwrap_or_else(|| Utc::now().date_naive())),
        description: Set(new.description),
        event_id: Set(new.event_id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(transaction_id = transaction.id, "Transaction recorded");
    Ok(transaction)
}

/// Income, expense and balance over the whole ledger, folded on `Decimal`.
pub async fn totals(db: &DatabaseConnection) -> Result<LedgerTotals> {
    let transactions = FinancialTransaction::find().all(db).await?;

    let mut income_total = Decimal::ZERO;
    let mut expense_total = Decimal::ZERO;
    for transaction in &transactions {
        match transaction.transaction_type {
            TransactionType::Income => income_total += transaction.amount,
            TransactionType::Expense => expense_total += transaction.amount,
        }
    }

    Ok(LedgerTotals::new(income_total, expense_total))
}

/// The administrator dashboard aggregate: roster and event counts, ledger
/// totals, recent events and fee counts grouped by status.
#[instrument(skip(db, account), fields(account_id = account.id))]
pub async fn dashboard_summary(
    db: &DatabaseConnection,
    account: &account::Model,
) -> Result<DashboardSummary> {
    require_administrator(account)?;

    let active_member_count = Member::find()
        .filter(model::entities::member::Column::Active.eq(true))
        .count(db)
        .await?;

    let event_count = Event::find().count(db).await?;

    let ledger = totals(db).await?;

    let recent_events = Event::find()
        .order_by_desc(event::Column::Date)
        .limit(RECENT_EVENTS_LIMIT)
        .all(db)
        .await?
        .into_iter()
        .map(|e| EventSummary {
            id: e.id,
            title: e.title,
            date: e.date,
            location: e.location,
        })
        .collect();

    let status_rows: Vec<(membership_fee::FeeStatus, i64)> = MembershipFee::find()
        .select_only()
        .column(membership_fee::Column::Status)
        .column_as(membership_fee::Column::Id.count(), "count")
        .group_by(membership_fee::Column::Status)
        .order_by_asc(membership_fee::Column::Status)
        .into_tuple()
        .all(db)
        .await?;

    let fees_by_status = status_rows
        .into_iter()
        .map(|(status, count)| FeeStatusCount {
            status: status.to_value(),
            count,
        })
        .collect();

    Ok(DashboardSummary {
        active_member_count,
        event_count,
        income_total: ledger.income_total,
        expense_total: ledger.expense_total,
        balance: ledger.balance,
        recent_events,
        fees_by_status,
    })
}
