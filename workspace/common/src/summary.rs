use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregate ledger totals. `balance` is always `income_total - expense_total`,
/// computed with exact decimal arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LedgerTotals {
    /// Sum of all income amounts, zero when there are none.
    pub income_total: Decimal,
    /// Sum of all expense amounts, zero when there are none.
    pub expense_total: Decimal,
    /// Income minus expense.
    pub balance: Decimal,
}

impl LedgerTotals {
    pub fn new(income_total: Decimal, expense_total: Decimal) -> Self {
        Self {
            income_total,
            expense_total,
            balance: income_total - expense_total,
        }
    }
}

/// Fee count for one payment status, as stored in the database ("pending"
/// or "paid").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeeStatusCount {
    pub status: String,
    pub count: i64,
}

/// Compact event representation used in the dashboard's recent-events list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventSummary {
    pub id: i32,
    pub title: String,
    pub date: NaiveDateTime,
    pub location: String,
}

/// The administrator dashboard payload: roster and event counts, ledger
/// totals, the five most recent events and fee counts grouped by status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummary {
    pub active_member_count: u64,
    pub event_count: u64,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub balance: Decimal,
    pub recent_events: Vec<EventSummary>,
    pub fees_by_status: Vec<FeeStatusCount>,
}
