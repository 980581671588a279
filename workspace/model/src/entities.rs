//! This file serves as the root for all SeaORM entity modules.
//! The five relations of the association roster and bookkeeping schema are
//! defined here, plus the login account linked one-to-one to a member.

pub mod account;
pub mod event;
pub mod financial_transaction;
pub mod member;
pub mod membership_fee;
pub mod participation;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::event::Entity as Event;
    pub use super::financial_transaction::Entity as FinancialTransaction;
    pub use super::member::Entity as Member;
    pub use super::membership_fee::Entity as MembershipFee;
    pub use super::participation::Entity as Participation;
}
