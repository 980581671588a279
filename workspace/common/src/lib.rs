//! Common transport-layer types shared between the backend and any client.
//! These structs mirror the aggregate payloads the handlers return so a
//! consumer can deserialize API responses without duplicating shapes.

mod summary;

pub use summary::{DashboardSummary, EventSummary, FeeStatusCount, LedgerTotals};
