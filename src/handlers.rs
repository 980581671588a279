pub mod accounts;
pub mod dashboard;
pub mod events;
pub mod fees;
pub mod health;
pub mod members;
pub mod transactions;
