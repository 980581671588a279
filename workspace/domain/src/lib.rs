//! Domain operations for the association roster and bookkeeping core:
//! identity and role synchronization, member lifecycle, annual fees,
//! events with idempotent registration, and ledger aggregation.
//!
//! Every operation takes a live connection and returns either entity models
//! or a typed [`error::DomainError`]; the HTTP layer is a thin caller.

pub mod error;
pub mod events;
pub mod fees;
pub mod identity;
pub mod ledger;
pub mod roster;

pub use error::{DomainError, Result};

#[cfg(test)]
pub(crate) mod testing;
